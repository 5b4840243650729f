use crate::error::ArgumentError;
use crate::limits::RuntimeLimits;

/// Discrete time coordinate: `floor(timestamp / window)`.
pub type TimeBucket = i64;

/// Immutable, request-scoped configuration. Constructed once at command entry
/// and threaded through the rest of the pipeline by value/reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub scope: String,
    pub bands: u16,
    pub window: i64,
    pub retention: i64,
    pub timestamp: i64,
}

impl Configuration {
    pub fn new(
        scope: String,
        bands: i64,
        window: i64,
        retention: i64,
        timestamp: i64,
        limits: &RuntimeLimits,
    ) -> Result<Self, ArgumentError> {
        if bands < 1 {
            return Err(ArgumentError::InvalidBandCount(bands));
        }
        if window <= 0 {
            return Err(ArgumentError::InvalidWindow(window));
        }
        if retention < 0 {
            return Err(ArgumentError::InvalidRetention(retention));
        }
        let bands = bands as u16;
        if bands > limits.max_bands as u16 {
            return Err(ArgumentError::TooManyBands {
                bands,
                max: limits.max_bands,
            });
        }
        Ok(Self {
            scope,
            bands,
            window,
            retention,
            timestamp,
        })
    }

    /// The time bucket `timestamp` falls into.
    pub fn current_time_bucket(&self) -> TimeBucket {
        self.timestamp.div_euclid(self.window)
    }

    /// Absolute TTL for a Candidate Index set created at `time_bucket`.
    pub fn candidate_set_expiry(&self, time_bucket: TimeBucket) -> i64 {
        (time_bucket + 1 + self.retention) * self.window
    }

    /// Absolute TTL for a Frequency Store hash touched at `self.timestamp`.
    pub fn frequency_hash_expiry(&self) -> i64 {
        self.timestamp + self.retention * self.window
    }

    /// Time buckets `[current - retention, current]`, ascending.
    pub fn retention_window(&self) -> impl Iterator<Item = TimeBucket> {
        let current = self.current_time_bucket();
        (current - self.retention)..=current
    }
}
