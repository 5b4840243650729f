//! Per-item bucket-frequency histogram per band, persisted as a hash keyed
//! by `(scope, feature_index, item_key)`.

use crate::codec::{self, Band, Bucket};
use crate::config::Configuration;
use crate::error::{KeyFormatError, StorageError};
use crate::signature::Signature;
use crate::storage::Storage;

pub struct FrequencyStore<'a, S: Storage> {
    storage: &'a S,
    config: &'a Configuration,
}

impl<'a, S: Storage> FrequencyStore<'a, S> {
    pub fn new(storage: &'a S, config: &'a Configuration) -> Self {
        Self { storage, config }
    }

    /// Fetches and decodes the stored signature for `(feature_index, item)`.
    /// Fields whose packed `(band, bucket)` falls outside `[1, bands]` are
    /// silently ignored, for forward compatibility with signatures produced
    /// under a different band count.
    pub fn get(&self, feature_index: &str, item: &str) -> Result<Signature, FrequencyError> {
        let key = codec::frequency_hash_key(&self.config.scope, feature_index, item);
        let fields = self.storage.hgetall(&key)?;
        let mut signature = Signature::empty(self.config.bands);
        for (field, count) in fields {
            let (band, bucket) = codec::unpack(&field)?;
            if (1..=self.config.bands).contains(&band) {
                signature.add(band, bucket, count);
            }
        }
        Ok(signature)
    }

    /// Accumulates every non-zero `(band, bucket, count)` in `signature` into
    /// the stored hash, then refreshes its TTL.
    pub fn add(
        &self,
        feature_index: &str,
        item: &str,
        signature: &Signature,
    ) -> Result<(), StorageError> {
        let key = codec::frequency_hash_key(&self.config.scope, feature_index, item);
        for (band, bucket, count) in signature.entries() {
            let field = codec::pack(band, bucket);
            self.storage.hincrby(&key, &field, count)?;
        }
        self.storage
            .expireat(key.as_bytes(), self.config.frequency_hash_expiry())?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrequencyError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    KeyFormat(#[from] KeyFormatError),
}

impl From<FrequencyError> for crate::error::EngineError {
    fn from(err: FrequencyError) -> Self {
        match err {
            FrequencyError::Storage(e) => crate::error::EngineError::Storage(e),
            FrequencyError::KeyFormat(e) => crate::error::EngineError::KeyFormat(e),
        }
    }
}

/// Exposed for the Candidate Index, which needs the raw band/bucket pairs
/// independent of any Frequency Store round trip.
pub fn non_zero_band_buckets(signature: &Signature) -> impl Iterator<Item = (Band, Bucket)> + '_ {
    signature.entries().map(|(band, bucket, _)| (band, bucket))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::RuntimeLimits;
    use crate::storage::memory::InMemoryStorage;

    fn config(timestamp: i64) -> Configuration {
        Configuration::new("s".into(), 2, 60, 1, timestamp, &RuntimeLimits::default()).unwrap()
    }

    #[test]
    fn round_trip_preserves_counts() {
        let storage = InMemoryStorage::new();
        let cfg = config(120);
        let store = FrequencyStore::new(&storage, &cfg);

        let mut sig = Signature::empty(2);
        sig.add(1, 10, 3);
        sig.add(2, 20, 1);
        store.add("m", "a", &sig).unwrap();

        let fetched = store.get("m", "a").unwrap();
        assert_eq!(fetched.band(1).unwrap().get(&10), Some(&3));
        assert_eq!(fetched.band(2).unwrap().get(&20), Some(&1));
    }

    #[test]
    fn additivity_across_two_records() {
        let storage = InMemoryStorage::new();
        let cfg = config(120);
        let store = FrequencyStore::new(&storage, &cfg);

        let mut first = Signature::empty(2);
        first.add(1, 10, 1);
        let mut second = Signature::empty(2);
        second.add(1, 10, 4);
        second.add(1, 11, 2);

        store.add("m", "a", &first).unwrap();
        store.add("m", "a", &second).unwrap();

        let fetched = store.get("m", "a").unwrap();
        assert_eq!(fetched.band(1).unwrap().get(&10), Some(&5));
        assert_eq!(fetched.band(1).unwrap().get(&11), Some(&2));
    }

    #[test]
    fn add_refreshes_hash_ttl() {
        let storage = InMemoryStorage::new();
        let cfg = config(120);
        let store = FrequencyStore::new(&storage, &cfg);
        let mut sig = Signature::empty(2);
        sig.add(1, 10, 1);
        store.add("m", "a", &sig).unwrap();
        assert_eq!(storage.hash_expiry("s:f:m:a"), Some(cfg.frequency_hash_expiry()));
    }

    #[test]
    fn get_on_missing_item_is_empty_signature() {
        let storage = InMemoryStorage::new();
        let cfg = config(120);
        let store = FrequencyStore::new(&storage, &cfg);
        let sig = store.get("m", "absent").unwrap();
        assert!(sig.is_empty());
    }
}
