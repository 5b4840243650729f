//! Fixed-width binary packing for `(band, bucket)` pairs, and the storage key
//! builders layered on top of it. Mirrors the reference host's convention of a
//! compact struct-packed hash field: `band:u8 || bucket:u16`, big-endian.

use crate::error::KeyFormatError;

pub type Band = u16;
pub type Bucket = u16;

const PACKED_LEN: usize = 3;

/// Packs `(band, bucket)` into the 3-byte big-endian field used as both a
/// Frequency Store hash subkey and a Candidate Index key component.
pub fn pack(band: Band, bucket: Bucket) -> [u8; PACKED_LEN] {
    let band = band as u8;
    let [hi, lo] = bucket.to_be_bytes();
    [band, hi, lo]
}

/// Inverse of [`pack`]. Fails on anything but an exact 3-byte slice.
pub fn unpack(bytes: &[u8]) -> Result<(Band, Bucket), KeyFormatError> {
    if bytes.len() != PACKED_LEN {
        return Err(KeyFormatError::WrongLength(bytes.len()));
    }
    let band = bytes[0] as Band;
    let bucket = u16::from_be_bytes([bytes[1], bytes[2]]);
    Ok((band, bucket))
}

/// `"{scope}:f:{feature_index}:{item_key}"`
pub fn frequency_hash_key(scope: &str, feature_index: &str, item_key: &str) -> String {
    format!("{scope}:f:{feature_index}:{item_key}")
}

/// `"{scope}:{feature_index}:{pack(band,bucket)}:{time_bucket}"`.
///
/// The packed bytes are inserted verbatim (not hex-encoded): callers must
/// treat the whole key as opaque bytes, never split it on `:` naively.
pub fn candidate_set_key(
    scope: &str,
    feature_index: &str,
    band: Band,
    bucket: Bucket,
    time_bucket: i64,
) -> Vec<u8> {
    let mut key = Vec::new();
    key.extend_from_slice(scope.as_bytes());
    key.push(b':');
    key.extend_from_slice(feature_index.as_bytes());
    key.push(b':');
    key.extend_from_slice(&pack(band, bucket));
    key.push(b':');
    key.extend_from_slice(time_bucket.to_string().as_bytes());
    key
}
