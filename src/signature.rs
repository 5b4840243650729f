//! The per-item, per-feature signature: an ordered sequence of bands, each a
//! sparse bucket -> count histogram. Buckets absent from a band's map denote
//! zero, matching the "missing field" semantics of the underlying hash.

use crate::codec::{Band, Bucket};
use std::collections::BTreeMap;

/// Sparse `bucket -> count` histogram for a single band. `BTreeMap` keeps
/// iteration order deterministic, which matters for the similarity kernel's
/// union-of-keys walk and for reproducible tests.
pub type BucketHistogram = BTreeMap<Bucket, i64>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    bands: Vec<BucketHistogram>,
}

impl Signature {
    /// Builds an all-zero signature with exactly `bands` bands (1-indexed by
    /// callers; stored 0-indexed internally).
    pub fn empty(bands: u16) -> Self {
        Self {
            bands: vec![BucketHistogram::new(); bands as usize],
        }
    }

    pub fn bands_len(&self) -> u16 {
        self.bands.len() as u16
    }

    /// Bands are 1-indexed: valid range is `1..=bands_len()`.
    pub fn band(&self, band: Band) -> Option<&BucketHistogram> {
        self.bands.get(band.checked_sub(1)? as usize)
    }

    fn band_mut(&mut self, band: Band) -> Option<&mut BucketHistogram> {
        self.bands.get_mut(band.checked_sub(1)? as usize)
    }

    /// Adds `count` to `bucket` within `band`, ignoring bands outside
    /// `[1, bands_len()]`, for forward compatibility with encoders that emit
    /// more bands than this signature was built with.
    pub fn add(&mut self, band: Band, bucket: Bucket, count: i64) {
        if let Some(hist) = self.band_mut(band) {
            *hist.entry(bucket).or_insert(0) += count;
        }
    }

    /// A signature is empty iff band 1 has no entries (band 1 is the
    /// sentinel per the reference; see the Open Questions discussion).
    pub fn is_empty(&self) -> bool {
        self.band(1).map(BucketHistogram::is_empty).unwrap_or(true)
    }

    /// Number of bands that contain at least one non-zero bucket.
    pub fn non_empty_band_count(&self) -> u16 {
        self.bands.iter().filter(|h| !h.is_empty()).count() as u16
    }

    /// Iterates `(band, bucket, count)` for every stored, non-zero entry, in
    /// band-then-bucket order.
    pub fn entries(&self) -> impl Iterator<Item = (Band, Bucket, i64)> + '_ {
        self.bands.iter().enumerate().flat_map(|(idx, hist)| {
            let band = idx as Band + 1;
            hist.iter()
                .filter(|(_, &count)| count != 0)
                .map(move |(&bucket, &count)| (band, bucket, count))
        })
    }
}
