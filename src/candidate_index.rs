//! Inverted index from `(feature_index, band, bucket)` to the item keys
//! observed in each time bucket — classical banded LSH: any single colliding
//! band is sufficient evidence of candidacy.

use crate::codec::{self, Band, Bucket};
use crate::config::{Configuration, TimeBucket};
use crate::error::StorageError;
use crate::frequency::non_zero_band_buckets;
use crate::ordered::InsertionOrderedMap;
use crate::signature::Signature;
use crate::storage::Storage;
use crate::windowed_set::TimeWindowedSet;

pub struct CandidateIndex<'a, S: Storage> {
    storage: &'a S,
    config: &'a Configuration,
}

impl<'a, S: Storage> CandidateIndex<'a, S> {
    pub fn new(storage: &'a S, config: &'a Configuration) -> Self {
        Self { storage, config }
    }

    fn windowed_set(&self, feature_index: &str, band: Band, bucket: Bucket) -> TimeWindowedSet<'a, S> {
        let scope = self.config.scope.clone();
        let feature_index = feature_index.to_string();
        TimeWindowedSet::new(
            self.storage,
            self.config,
            Box::new(move |tb: TimeBucket| {
                codec::candidate_set_key(&scope, &feature_index, band, bucket, tb)
            }),
        )
    }

    /// Records `item` under `(feature_index, band, bucket)` at the current
    /// time bucket.
    pub fn insert(
        &self,
        feature_index: &str,
        band: Band,
        bucket: Bucket,
        item: &str,
    ) -> Result<(), StorageError> {
        self.windowed_set(feature_index, band, bucket)
            .insert(&[item.to_string()])?;
        Ok(())
    }

    /// Inserts every non-zero `(band, bucket)` in `signature` under `item`,
    /// as RECORD does after the Frequency Store has been updated.
    pub fn insert_signature(
        &self,
        feature_index: &str,
        item: &str,
        signature: &Signature,
    ) -> Result<(), StorageError> {
        for (band, bucket) in non_zero_band_buckets(signature) {
            self.insert(feature_index, band, bucket, item)?;
        }
        Ok(())
    }

    /// For every `(band, bucket)` present in `signature`, reads the live
    /// window's members and accumulates, per candidate, the set of bands in
    /// which it collided. The bitset is bounded by `Configuration::bands`,
    /// which `RuntimeLimits` caps at 64, so a `u64` mask suffices. Candidates
    /// are returned in first-seen order.
    pub fn query(
        &self,
        feature_index: &str,
        signature: &Signature,
    ) -> Result<Vec<(String, u16)>, StorageError> {
        let mut collision_masks: InsertionOrderedMap<u64> = InsertionOrderedMap::new();

        for (band, bucket) in non_zero_band_buckets(signature) {
            let members = self.windowed_set(feature_index, band, bucket).members()?;
            let bit = 1u64 << (band - 1);
            for (item, _) in members {
                *collision_masks.entry_or(&item, 0) |= bit;
            }
        }

        Ok(collision_masks
            .into_pairs()
            .into_iter()
            .map(|(item, mask)| (item, mask.count_ones() as u16))
            .collect())
    }
}
