//! CLASSIFY schema: `[STRICT] (feature_index threshold frequencies_for_request)*`.

use super::decode_frequencies;
use crate::args::{flag_set, object3, scalar_int, scalar_string, variadic, Cursor};
use crate::error::ArgumentError;
use crate::signature::Signature;

const FLAGS: &[&str] = &["STRICT"];

#[derive(Debug)]
pub struct ClassifyQuery {
    pub feature_index: String,
    pub threshold: i64,
    pub signature: Signature,
}

#[derive(Debug)]
pub struct ClassifyRequest {
    pub strict: bool,
    pub queries: Vec<ClassifyQuery>,
}

pub fn decode(cursor: &mut Cursor, bands: u16) -> Result<ClassifyRequest, ArgumentError> {
    let flags = flag_set(cursor, FLAGS);
    let strict = flags.contains("STRICT");
    let queries = variadic(cursor, |c| {
        object3(
            c,
            (
                ("feature_index", scalar_string),
                ("threshold", scalar_int),
                ("frequencies", |c: &mut Cursor| decode_frequencies(c, bands)),
            ),
            |feature_index, threshold, signature| ClassifyQuery {
                feature_index,
                threshold,
                signature,
            },
        )
    })?;
    Ok(ClassifyRequest { strict, queries })
}
