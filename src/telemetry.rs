//! Subscriber setup for the demo binary. The library never installs a global
//! subscriber itself; a host process owns that decision.

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a `tracing` subscriber over `writer` honoring `RUST_LOG`,
/// defaulting to `info`. Callers typically pass `std::io::stdout`.
pub fn init<W>(writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer))
        .init();
}
