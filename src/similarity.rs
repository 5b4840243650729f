//! Banded Manhattan similarity over L1-normalized per-band bucket
//! histograms: total-variation distance, affinely inverted into `[0, 1]`.

use crate::signature::Signature;
use std::collections::BTreeSet;

/// `Similarity(T, O) = mean over bands of (1 - total_variation(T_b, O_b))`.
///
/// A band whose histogram sums to zero is treated as maximally distant
/// (`d_b = 2`, `s_b = 0`) by convention, rather than dividing by zero.
pub fn score(a: &Signature, b: &Signature) -> f64 {
    let bands = a.bands_len().max(b.bands_len());
    if bands == 0 {
        return 1.0;
    }
    let total: f64 = (1..=bands).map(|band| band_similarity(a, b, band)).sum();
    total / bands as f64
}

fn band_similarity(a: &Signature, b: &Signature, band: u16) -> f64 {
    let empty = std::collections::BTreeMap::new();
    let hist_a = a.band(band).unwrap_or(&empty);
    let hist_b = b.band(band).unwrap_or(&empty);

    let sum_a: i64 = hist_a.values().sum();
    let sum_b: i64 = hist_b.values().sum();
    if sum_a == 0 || sum_b == 0 {
        return 0.0;
    }

    let keys: BTreeSet<u16> = hist_a.keys().chain(hist_b.keys()).copied().collect();
    let distance: f64 = keys
        .into_iter()
        .map(|k| {
            let p = *hist_a.get(&k).unwrap_or(&0) as f64 / sum_a as f64;
            let q = *hist_b.get(&k).unwrap_or(&0) as f64 / sum_b as f64;
            (p - q).abs()
        })
        .sum();

    1.0 - distance / 2.0
}
