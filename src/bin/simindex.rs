//! Thin demo harness around [`simindex::Engine`]: forwards its trailing
//! arguments verbatim to `Engine::execute` against an in-process store,
//! printing `OK` for a RECORD and JSON for a CLASSIFY. Stands in for the
//! RPC/script transport that ships arguments to the engine in a real
//! deployment, which is out of scope for this crate.

use clap::Parser;
use simindex::storage::memory::InMemoryStorage;
use simindex::{telemetry, Engine, Output, RuntimeLimits};

#[derive(Parser, Debug)]
#[command(
    name = "simindex",
    author,
    version,
    about = "Similarity index command-line harness",
    long_about = Some(
        "Forwards its trailing arguments as a single engine invocation:\n\
         simindex <scope> <bands> <window> <retention> <timestamp> RECORD|CLASSIFY ..."
    )
)]
struct Cli {
    /// Full positional argument vector for one engine command.
    #[arg(trailing_var_arg = true)]
    argv: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    telemetry::init(std::io::stdout);
    let cli = Cli::parse();

    let engine = Engine::new(InMemoryStorage::new(), RuntimeLimits::from_env());
    match engine.execute(&cli.argv) {
        Ok(Output::Recorded) => {
            println!("OK");
            Ok(())
        }
        Ok(output) => {
            println!("{}", serde_json::to_string(&output)?);
            Ok(())
        }
        // Engine::execute already logs the error at `error` level before
        // returning it; the binary just needs to surface a failing exit code.
        Err(err) => Err(err.into()),
    }
}
