//! Command schemas shared by RECORD and CLASSIFY, built on top of the
//! [`crate::args`] combinators.

pub mod classify;
pub mod record;

use crate::args::{repeated, scalar_int, scalar_string, Cursor};
use crate::error::ArgumentError;
use crate::signature::Signature;

pub use classify::{ClassifyQuery, ClassifyRequest};
pub use record::RecordRequest;

#[derive(Debug)]
pub enum Command {
    Record(Vec<RecordRequest>),
    Classify(ClassifyRequest),
}

/// `frequencies_for_request := band_1 band_2 ... band_{bands}`, each
/// `band_b := <n_b:int> (<bucket:int> <count:int>){n_b}`. The total band
/// count is fixed at `bands` and is not itself repeated per request.
pub fn decode_frequencies(cursor: &mut Cursor, bands: u16) -> Result<Signature, ArgumentError> {
    let mut signature = Signature::empty(bands);
    for band in 1..=bands {
        let entries = repeated(cursor, |c| {
            let bucket_pos = c.pos();
            let bucket = scalar_int(c)?;
            let bucket: u16 = bucket
                .try_into()
                .map_err(|_| ArgumentError::BucketOutOfRange(bucket_pos, bucket))?;
            let amount = scalar_int(c)?;
            Ok((bucket, amount))
        })?;
        for (bucket, amount) in entries {
            signature.add(band, bucket, amount);
        }
    }
    Ok(signature)
}

/// Decodes the leading command-name token and routes to the matching
/// command-specific schema. The rest of `cursor` is consumed by whichever
/// schema is selected.
pub fn decode_command(cursor: &mut Cursor, bands: u16) -> Result<Command, ArgumentError> {
    let pos = cursor.pos();
    let name = scalar_string(cursor)?;
    match name.as_str() {
        "RECORD" => record::decode(cursor, bands).map(Command::Record),
        "CLASSIFY" => classify::decode(cursor, bands).map(Command::Classify),
        other => Err(ArgumentError::UnknownCommand(pos, other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn decode_frequencies_two_bands() {
        let a = argv(&["1", "10", "1", "2", "20", "1", "21", "2"]);
        let mut cursor = Cursor::new(&a);
        let sig = decode_frequencies(&mut cursor, 2).unwrap();
        assert_eq!(sig.band(1).unwrap().get(&10), Some(&1));
        assert_eq!(sig.band(2).unwrap().get(&20), Some(&1));
        assert_eq!(sig.band(2).unwrap().get(&21), Some(&2));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn decode_frequencies_rejects_out_of_range_bucket() {
        let a = argv(&["1", "70000", "1"]);
        let mut cursor = Cursor::new(&a);
        let err = decode_frequencies(&mut cursor, 1).unwrap_err();
        assert!(matches!(err, ArgumentError::BucketOutOfRange(1, 70000)));
    }

    #[test]
    fn decode_command_rejects_unknown_name() {
        let a = argv(&["DELETE"]);
        let mut cursor = Cursor::new(&a);
        let err = decode_command(&mut cursor, 2).unwrap_err();
        assert!(matches!(err, ArgumentError::UnknownCommand(0, _)));
    }
}
