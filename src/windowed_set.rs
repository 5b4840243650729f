//! A logical set whose membership is partitioned into time buckets and read
//! back across a retention window. Used by the Candidate Index to give
//! observations a sliding expiration without any explicit deletion pass.

use crate::config::{Configuration, TimeBucket};
use crate::error::StorageError;
use crate::ordered::InsertionOrderedMap;
use crate::storage::Storage;

/// Builds the storage key for a given time bucket. Boxed so the Candidate
/// Index can close over `(scope, feature_index, band, bucket)` without this
/// type needing to know about any of them.
pub type KeyFn<'a> = dyn Fn(TimeBucket) -> Vec<u8> + 'a;

pub struct TimeWindowedSet<'a, S: Storage> {
    storage: &'a S,
    config: &'a Configuration,
    key_fn: Box<KeyFn<'a>>,
}

impl<'a, S: Storage> TimeWindowedSet<'a, S> {
    pub fn new(storage: &'a S, config: &'a Configuration, key_fn: Box<KeyFn<'a>>) -> Self {
        Self {
            storage,
            config,
            key_fn,
        }
    }

    /// Inserts `members` into the bucket for `self.config.timestamp`, refreshing
    /// the bucket's TTL whenever at least one member was newly added. Returns
    /// the number of members that were newly added.
    pub fn insert(&self, members: &[String]) -> Result<usize, StorageError> {
        let tb = self.config.current_time_bucket();
        let key = (self.key_fn)(tb);
        let added = self.storage.sadd(&key, members)?;
        if added > 0 {
            self.storage
                .expireat(&key, self.config.candidate_set_expiry(tb))?;
        }
        Ok(added)
    }

    /// Members observed across `[current - retention, current]`, mapped to
    /// the number of time buckets in which each was seen, in first-seen order.
    pub fn members(&self) -> Result<Vec<(String, u32)>, StorageError> {
        let mut occurrences: InsertionOrderedMap<u32> = InsertionOrderedMap::new();
        for tb in self.config.retention_window() {
            let key = (self.key_fn)(tb);
            for member in self.storage.smembers(&key)? {
                *occurrences.entry_or(&member, 0) += 1;
            }
        }
        Ok(occurrences.into_pairs())
    }
}
