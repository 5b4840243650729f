use std::env;

/// Hard ceiling on `max_bands`, independent of anything an operator configures:
/// the Candidate Index packs one collision bit per band into a `u64` mask, so a
/// band count above 64 would overflow the shift that sets it.
const MAX_BANDS_CEILING: u8 = 64;

/// Process-wide guardrails validated against every incoming [`crate::config::Configuration`]
/// before a command touches storage. These have no equivalent in the bare core script; they
/// exist so a host embedding this engine can bound worst-case allocation from a single
/// malformed or hostile argument vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeLimits {
    pub max_bands: u8,
    pub max_requests_per_record: usize,
    pub max_queries_per_classify: usize,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        Self {
            max_bands: MAX_BANDS_CEILING,
            max_requests_per_record: 10_000,
            max_queries_per_classify: 256,
        }
    }
}

impl RuntimeLimits {
    /// Builds limits with `max_bands` clamped to [`MAX_BANDS_CEILING`], so the
    /// invariant the Candidate Index's collision bitmask depends on can never
    /// be configured away.
    pub fn new(
        max_bands: u8,
        max_requests_per_record: usize,
        max_queries_per_classify: usize,
    ) -> Self {
        Self {
            max_bands: max_bands.min(MAX_BANDS_CEILING),
            max_requests_per_record,
            max_queries_per_classify,
        }
    }

    /// Overrides defaults with `SIMINDEX_MAX_BANDS`, `SIMINDEX_MAX_RECORD_REQUESTS`, and
    /// `SIMINDEX_MAX_CLASSIFY_QUERIES` when present and parseable; falls back silently
    /// otherwise, since a malformed env var should not prevent the process from starting.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self::new(
            env_or(defaults.max_bands, "SIMINDEX_MAX_BANDS"),
            env_or(
                defaults.max_requests_per_record,
                "SIMINDEX_MAX_RECORD_REQUESTS",
            ),
            env_or(
                defaults.max_queries_per_classify,
                "SIMINDEX_MAX_CLASSIFY_QUERIES",
            ),
        )
    }
}

fn env_or<T: std::str::FromStr>(default: T, key: &str) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
