//! Composable decoders over a positional argument vector. Each decoder takes
//! a `&mut Cursor` and returns a value or an [`ArgumentError`] carrying the
//! cursor position it failed at. No combinator here can panic on malformed
//! input: every decoder either succeeds or returns a typed error, never
//! both, never neither.

use crate::error::ArgumentError;
use std::collections::HashSet;

pub struct Cursor<'a> {
    argv: &'a [String],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(argv: &'a [String]) -> Self {
        Self { argv, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.argv.len()
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.argv.get(self.pos).map(String::as_str)
    }

    fn advance(&mut self) -> Result<&'a str, ArgumentError> {
        let token = self
            .argv
            .get(self.pos)
            .ok_or(ArgumentError::UnexpectedEnd(self.pos))?;
        self.pos += 1;
        Ok(token)
    }

    /// Fails unless the cursor has consumed the whole argument vector.
    pub fn expect_exhausted(&self) -> Result<(), ArgumentError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(ArgumentError::TrailingTokens(self.pos))
        }
    }
}

/// `scalar(identity)`: consume one token verbatim.
pub fn scalar_string(cursor: &mut Cursor) -> Result<String, ArgumentError> {
    cursor.advance().map(str::to_string)
}

/// `scalar(int)`: consume one token, parsed as a signed integer.
pub fn scalar_int(cursor: &mut Cursor) -> Result<i64, ArgumentError> {
    let pos = cursor.pos();
    let token = cursor.advance()?;
    token
        .parse::<i64>()
        .map_err(|_| ArgumentError::NotAnInteger(pos, token.to_string()))
}

/// `flag_set(vocabulary)`: greedily consume tokens that appear in
/// `vocabulary`, stopping at the first token that doesn't (or at end of
/// input). Cannot fail: an empty match is a valid, empty flag set.
pub fn flag_set(cursor: &mut Cursor, vocabulary: &[&str]) -> HashSet<String> {
    let mut flags = HashSet::new();
    while let Some(token) = cursor.peek() {
        if vocabulary.contains(&token) {
            flags.insert(token.to_string());
            cursor.advance().expect("peeked token must be consumable");
        } else {
            break;
        }
    }
    flags
}

/// `repeated(item_decoder)`: decode a leading integer count, then decode
/// that many items with `decode_item`.
pub fn repeated<T>(
    cursor: &mut Cursor,
    mut decode_item: impl FnMut(&mut Cursor) -> Result<T, ArgumentError>,
) -> Result<Vec<T>, ArgumentError> {
    let count = scalar_int(cursor)?;
    let count = usize::try_from(count).map_err(|_| ArgumentError::NotAnInteger(cursor.pos(), count.to_string()))?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(decode_item(cursor)?);
    }
    Ok(items)
}

/// `variadic(item_decoder)`: decode items until the cursor reaches the end
/// of the argument vector.
pub fn variadic<T>(
    cursor: &mut Cursor,
    mut decode_item: impl FnMut(&mut Cursor) -> Result<T, ArgumentError>,
) -> Result<Vec<T>, ArgumentError> {
    let mut items = Vec::new();
    while !cursor.is_at_end() {
        items.push(decode_item(cursor)?);
    }
    Ok(items)
}

/// `tuple(decoders…)`: a fixed heterogeneous sequence, decoded positionally
/// and returned as a plain tuple. Unlike `object`, the fields carry no names.
pub fn tuple5<A, B, C, D, E>(
    cursor: &mut Cursor,
    decode_a: impl FnOnce(&mut Cursor) -> Result<A, ArgumentError>,
    decode_b: impl FnOnce(&mut Cursor) -> Result<B, ArgumentError>,
    decode_c: impl FnOnce(&mut Cursor) -> Result<C, ArgumentError>,
    decode_d: impl FnOnce(&mut Cursor) -> Result<D, ArgumentError>,
    decode_e: impl FnOnce(&mut Cursor) -> Result<E, ArgumentError>,
) -> Result<(A, B, C, D, E), ArgumentError> {
    let a = decode_a(cursor)?;
    let b = decode_b(cursor)?;
    let c = decode_c(cursor)?;
    let d = decode_d(cursor)?;
    let e = decode_e(cursor)?;
    Ok((a, b, c, d, e))
}

/// `object(schema)`: an ordered `[(field, decoder), …]`, decoded positionally
/// and handed to `build`. Field names exist for self-documentation and
/// future error-context only; decoding itself is purely positional, same as
/// `tuple`.
pub fn object3<A, B, C, T>(
    cursor: &mut Cursor,
    fields: (
        (&'static str, impl FnOnce(&mut Cursor) -> Result<A, ArgumentError>),
        (&'static str, impl FnOnce(&mut Cursor) -> Result<B, ArgumentError>),
        (&'static str, impl FnOnce(&mut Cursor) -> Result<C, ArgumentError>),
    ),
    build: impl FnOnce(A, B, C) -> T,
) -> Result<T, ArgumentError> {
    let ((_, decode_a), (_, decode_b), (_, decode_c)) = fields;
    let a = decode_a(cursor)?;
    let b = decode_b(cursor)?;
    let c = decode_c(cursor)?;
    Ok(build(a, b, c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scalar_string_consumes_one_token() {
        let a = argv(&["hello", "world"]);
        let mut cursor = Cursor::new(&a);
        assert_eq!(scalar_string(&mut cursor).unwrap(), "hello");
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn scalar_int_rejects_non_numeric() {
        let a = argv(&["nope"]);
        let mut cursor = Cursor::new(&a);
        let err = scalar_int(&mut cursor).unwrap_err();
        assert!(matches!(err, ArgumentError::NotAnInteger(0, _)));
    }

    #[test]
    fn scalar_on_exhausted_cursor_fails_with_position() {
        let a: Vec<String> = vec![];
        let mut cursor = Cursor::new(&a);
        let err = scalar_string(&mut cursor).unwrap_err();
        assert!(matches!(err, ArgumentError::UnexpectedEnd(0)));
    }

    #[test]
    fn flag_set_stops_at_first_unknown_token() {
        let a = argv(&["STRICT", "m", "1"]);
        let mut cursor = Cursor::new(&a);
        let flags = flag_set(&mut cursor, &["STRICT"]);
        assert!(flags.contains("STRICT"));
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn flag_set_is_empty_when_nothing_matches() {
        let a = argv(&["m", "1"]);
        let mut cursor = Cursor::new(&a);
        let flags = flag_set(&mut cursor, &["STRICT"]);
        assert!(flags.is_empty());
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn repeated_decodes_count_then_that_many_items() {
        let a = argv(&["2", "10", "1", "20", "3"]);
        let mut cursor = Cursor::new(&a);
        let pairs = repeated(&mut cursor, |c| {
            let bucket = scalar_int(c)?;
            let count = scalar_int(c)?;
            Ok((bucket, count))
        })
        .unwrap();
        assert_eq!(pairs, vec![(10, 1), (20, 3)]);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn variadic_runs_until_exhausted() {
        let a = argv(&["1", "2", "3"]);
        let mut cursor = Cursor::new(&a);
        let items = variadic(&mut cursor, scalar_int).unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn tuple5_decodes_in_sequence() {
        let a = argv(&["s", "2", "60", "1", "120"]);
        let mut cursor = Cursor::new(&a);
        let (scope, bands, window, retention, timestamp) = tuple5(
            &mut cursor,
            scalar_string,
            scalar_int,
            scalar_int,
            scalar_int,
            scalar_int,
        )
        .unwrap();
        assert_eq!(scope, "s");
        assert_eq!((bands, window, retention, timestamp), (2, 60, 1, 120));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn tuple5_fails_at_the_field_that_runs_out() {
        let a = argv(&["s", "2"]);
        let mut cursor = Cursor::new(&a);
        let err = tuple5(
            &mut cursor,
            scalar_string,
            scalar_int,
            scalar_int,
            scalar_int,
            scalar_int,
        )
        .unwrap_err();
        assert!(matches!(err, ArgumentError::UnexpectedEnd(2)));
    }

    #[test]
    fn object3_decodes_named_fields_and_builds() {
        let a = argv(&["a", "m", "10"]);
        let mut cursor = Cursor::new(&a);
        let built = object3(
            &mut cursor,
            (
                ("item_key", scalar_string),
                ("feature_index", scalar_string),
                ("bucket", scalar_int),
            ),
            |item_key, feature_index, bucket| (item_key, feature_index, bucket),
        )
        .unwrap();
        assert_eq!(built, ("a".to_string(), "m".to_string(), 10));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn object3_fails_at_the_field_that_runs_out() {
        let a = argv(&["a"]);
        let mut cursor = Cursor::new(&a);
        let err = object3(
            &mut cursor,
            (
                ("item_key", scalar_string),
                ("feature_index", scalar_string),
                ("bucket", scalar_int),
            ),
            |item_key, feature_index, bucket| (item_key, feature_index, bucket),
        )
        .unwrap_err();
        assert!(matches!(err, ArgumentError::UnexpectedEnd(1)));
    }
}
