//! Text to scalar coercion.
//!
//! Integers are parsed as base-10 at the exact width of the target kind, so
//! `"300"` is out of range for `u8` and `"-1"` is rejected for every unsigned
//! kind. Text is copied verbatim.

use crate::descriptor::{ScalarKind, ScalarValue};
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// Raw text that could not be converted to the requested kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not convert '{text}' to {kind}: {source}")]
pub struct CoercionError {
    kind: ScalarKind,
    text: String,
    #[source]
    source: ParseIntError,
}

impl CoercionError {
    /// The kind the text was being converted to.
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// The raw text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The underlying integer parse failure.
    pub fn parse_error(&self) -> &ParseIntError {
        &self.source
    }
}

/// Converts raw text to a value of `kind`.
///
/// # Example
///
/// ```rust
/// use daedalus_core::{coerce, ScalarKind, ScalarValue};
///
/// assert_eq!(coerce(ScalarKind::U8, "255").unwrap(), ScalarValue::U8(255));
/// assert!(coerce(ScalarKind::U8, "256").is_err());
/// assert!(coerce(ScalarKind::I64, "12abc").is_err());
/// assert_eq!(
///     coerce(ScalarKind::Text, " as is ").unwrap(),
///     ScalarValue::Text(" as is ".to_string())
/// );
/// ```
pub fn coerce(kind: ScalarKind, text: &str) -> Result<ScalarValue, CoercionError> {
    let value = match kind {
        ScalarKind::I8 => ScalarValue::I8(parse_int(kind, text)?),
        ScalarKind::I16 => ScalarValue::I16(parse_int(kind, text)?),
        ScalarKind::I32 => ScalarValue::I32(parse_int(kind, text)?),
        ScalarKind::I64 => ScalarValue::I64(parse_int(kind, text)?),
        ScalarKind::Isize => ScalarValue::Isize(parse_int(kind, text)?),
        ScalarKind::U8 => ScalarValue::U8(parse_int(kind, text)?),
        ScalarKind::U16 => ScalarValue::U16(parse_int(kind, text)?),
        ScalarKind::U32 => ScalarValue::U32(parse_int(kind, text)?),
        ScalarKind::U64 => ScalarValue::U64(parse_int(kind, text)?),
        ScalarKind::Usize => ScalarValue::Usize(parse_int(kind, text)?),
        ScalarKind::Text => ScalarValue::Text(text.to_owned()),
    };
    Ok(value)
}

fn parse_int<T>(kind: ScalarKind, text: &str) -> Result<T, CoercionError>
where
    T: FromStr<Err = ParseIntError>,
{
    text.parse::<T>().map_err(|source| CoercionError {
        kind,
        text: text.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::num::IntErrorKind;

    #[test]
    fn test_signed_widths() {
        assert_eq!(coerce(ScalarKind::I8, "-128").unwrap(), ScalarValue::I8(-128));
        assert!(coerce(ScalarKind::I8, "128").is_err());
        assert_eq!(
            coerce(ScalarKind::I16, "-32768").unwrap(),
            ScalarValue::I16(-32768)
        );
        assert_eq!(
            coerce(ScalarKind::I64, "9223372036854775807").unwrap(),
            ScalarValue::I64(i64::MAX)
        );
    }

    #[test]
    fn test_unsigned_rejects_negative() {
        for kind in [
            ScalarKind::U8,
            ScalarKind::U16,
            ScalarKind::U32,
            ScalarKind::U64,
            ScalarKind::Usize,
        ] {
            let err = coerce(kind, "-1").unwrap_err();
            assert_eq!(err.kind(), kind);
            assert_eq!(err.text(), "-1");
        }
    }

    #[test]
    fn test_out_of_range_reason() {
        let err = coerce(ScalarKind::U8, "300").unwrap_err();
        assert_eq!(err.parse_error().kind(), &IntErrorKind::PosOverflow);
        assert!(err.to_string().contains("'300'"));
        assert!(err.to_string().contains("u8"));
    }

    #[test]
    fn test_non_numeric_text() {
        let err = coerce(ScalarKind::I32, "abc").unwrap_err();
        assert_eq!(err.parse_error().kind(), &IntErrorKind::InvalidDigit);

        let err = coerce(ScalarKind::I32, "").unwrap_err();
        assert_eq!(err.parse_error().kind(), &IntErrorKind::Empty);

        assert!(coerce(ScalarKind::I32, " 1").is_err());
        assert!(coerce(ScalarKind::I32, "1.5").is_err());
    }

    #[test]
    fn test_text_is_verbatim() {
        assert_eq!(
            coerce(ScalarKind::Text, "").unwrap(),
            ScalarValue::Text(String::new())
        );
        assert_eq!(
            coerce(ScalarKind::Text, "héllo wörld").unwrap(),
            ScalarValue::Text("héllo wörld".to_string())
        );
    }

    proptest! {
        #[test]
        fn prop_i32_matches_width(n in any::<i64>()) {
            let text = n.to_string();
            match i32::try_from(n) {
                Ok(expected) => prop_assert_eq!(
                    coerce(ScalarKind::I32, &text).unwrap(),
                    ScalarValue::I32(expected)
                ),
                Err(_) => prop_assert!(coerce(ScalarKind::I32, &text).is_err()),
            }
        }

        #[test]
        fn prop_u16_matches_width(n in any::<i64>()) {
            let text = n.to_string();
            match u16::try_from(n) {
                Ok(expected) => prop_assert_eq!(
                    coerce(ScalarKind::U16, &text).unwrap(),
                    ScalarValue::U16(expected)
                ),
                Err(_) => prop_assert!(coerce(ScalarKind::U16, &text).is_err()),
            }
        }

        #[test]
        fn prop_text_round_trips(s in ".*") {
            prop_assert_eq!(coerce(ScalarKind::Text, &s).unwrap(), ScalarValue::Text(s.clone()));
        }
    }
}
