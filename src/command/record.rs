//! RECORD schema: `(item_key feature_index frequencies_for_request)*` until EOF.

use super::decode_frequencies;
use crate::args::{object3, scalar_string, variadic, Cursor};
use crate::error::ArgumentError;
use crate::signature::Signature;

#[derive(Debug)]
pub struct RecordRequest {
    pub item_key: String,
    pub feature_index: String,
    pub signature: Signature,
}

pub fn decode(cursor: &mut Cursor, bands: u16) -> Result<Vec<RecordRequest>, ArgumentError> {
    variadic(cursor, |c| {
        object3(
            c,
            (
                ("item_key", scalar_string),
                ("feature_index", scalar_string),
                ("frequencies", |c: &mut Cursor| decode_frequencies(c, bands)),
            ),
            |item_key, feature_index, signature| RecordRequest {
                item_key,
                feature_index,
                signature,
            },
        )
    })
}
