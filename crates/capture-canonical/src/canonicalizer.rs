use std::fmt::Display;
use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;

use crate::value::{to_canonical_value, CanonicalValue};

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CanonicalizationError {
    /// A leaf has no canonical JSON representation (bytes, NaN, non-string keys, ...).
    #[error("unsupported value at {path}: {reason}")]
    UnsupportedValue {
        /// Location of the offending value.
        path: String,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// A number literal with no finite value, such as `1e400`.
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    /// A mapping produced the same key twice.
    #[error("duplicate key detected at {0}")]
    DuplicateKey(String),
    /// An event record was expected to be a mapping.
    #[error("event record must be a JSON object")]
    NotAnObject,
    /// Provided value could not be canonicalized.
    #[error("invalid structure: {0}")]
    InvalidStructure(String),
    /// Error raised by a `Serialize` implementation.
    #[error("serialization failed: {0}")]
    Custom(String),
}

impl serde::ser::Error for CanonicalizationError {
    fn custom<T: Display>(msg: T) -> Self {
        CanonicalizationError::Custom(msg.to_string())
    }
}

/// Encodes a canonical value tree into its unique byte form.
///
/// The output is compact JSON: no whitespace, `,` and `:` separators, object
/// keys in byte-wise order, array order preserved, non-ASCII text written as
/// raw UTF-8. Only `"`, `\` and control characters are escaped. Integers are
/// written exactly at any width; floats use the shortest round-trip digits in
/// the layout of Python's `repr` (`0.0001`, `1e-05`, `1e+16`, `2.0`).
///
/// # Errors
///
/// Returns [`CanonicalizationError::InvalidNumber`] for a float literal that
/// overflows to infinity.
pub fn canonicalize(value: &CanonicalValue) -> Result<Vec<u8>, CanonicalizationError> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
    value.serialize(&mut serializer).map_err(|err| {
        if err.is_io() {
            CanonicalizationError::InvalidNumber(err.to_string())
        } else {
            CanonicalizationError::Custom(err.to_string())
        }
    })?;
    Ok(out)
}

/// Canonical bytes for a `serde_json::Value`.
pub fn canonicalize_json(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    canonicalize(&CanonicalValue::from(value))
}

/// Canonical bytes for any serializable value.
///
/// # Errors
///
/// Returns [`CanonicalizationError`] when the value contains something with no
/// canonical representation; see [`to_canonical_value`].
pub fn canonicalize_serializable<T>(value: &T) -> Result<Vec<u8>, CanonicalizationError>
where
    T: Serialize + ?Sized,
{
    canonicalize(&to_canonical_value(value)?)
}

/// Compact `serde_json` output with numbers rewritten into canonical form.
///
/// Numbers reach the formatter as their source text, so integers of any
/// width pass through untouched and only floats are re-rendered.
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(float_repr(value)?.as_bytes())
    }

    fn write_number_str<W>(&mut self, writer: &mut W, value: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if value.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
            let parsed: f64 = value.parse().map_err(|_| invalid_number(value))?;
            writer.write_all(float_repr(parsed)?.as_bytes())
        } else if value == "-0" {
            writer.write_all(b"0")
        } else {
            writer.write_all(value.as_bytes())
        }
    }
}

fn invalid_number(literal: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{} has no finite value", literal),
    )
}

/// Lays out the shortest round-trip digits of `value` the way Python's
/// `float.__repr__` does: positional when the decimal exponent is in
/// `-4..=15`, scientific with a signed two-digit exponent otherwise.
fn float_repr(value: f64) -> io::Result<String> {
    if !value.is_finite() {
        return Err(invalid_number(&value.to_string()));
    }

    // `{:e}` yields shortest digits, e.g. `-2.5e-7` or `0e0`.
    let sci = format!("{:e}", value);
    let (mantissa, exp) = sci.split_once('e').ok_or_else(|| invalid_number(&sci))?;
    let exp: i32 = exp.parse().map_err(|_| invalid_number(&sci))?;
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let body = if (-4..=15).contains(&exp) {
        let point = exp + 1;
        let len = digits.len() as i32;
        if point <= 0 {
            format!("0.{}{}", "0".repeat((-point) as usize), digits)
        } else if point >= len {
            format!("{}{}.0", digits, "0".repeat((point - len) as usize))
        } else {
            let (int, frac) = digits.split_at(point as usize);
            format!("{}.{}", int, frac)
        }
    } else {
        let (lead, rest) = digits.split_at(1);
        let exp_sign = if exp < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{}e{}{:02}", lead, exp_sign, exp.abs())
        } else {
            format!("{}.{}e{}{:02}", lead, rest, exp_sign, exp.abs())
        }
    };
    Ok(format!("{}{}", sign, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(value: Value) -> String {
        String::from_utf8(canonicalize_json(&value).unwrap()).unwrap()
    }

    #[test]
    fn scalars_have_fixed_forms() {
        assert_eq!(encode(json!(null)), "null");
        assert_eq!(encode(json!(true)), "true");
        assert_eq!(encode(json!(false)), "false");
        assert_eq!(encode(json!(-7)), "-7");
        assert_eq!(encode(json!(1.5)), "1.5");
        assert_eq!(encode(json!("plain")), "\"plain\"");
    }

    #[test]
    fn escapes_only_quote_backslash_and_controls() {
        assert_eq!(
            encode(json!("tab\there \"q\" \\ \u{1f} €")),
            r#""tab\there \"q\" \\ \u001f €""#
        );
        assert_eq!(encode(json!("\u{08}\u{0c}\r\n")), r#""\b\f\r\n""#);
    }

    #[test]
    fn float_layout_switches_at_python_bounds() {
        let cases = [
            (0.0001, "0.0001"),
            (0.00001, "1e-05"),
            (1e15, "1000000000000000.0"),
            (1e16, "1e+16"),
            (-0.0, "-0.0"),
            (1234.5, "1234.5"),
        ];
        for (value, expected) in cases {
            assert_eq!(float_repr(value).unwrap(), expected);
        }
        assert!(float_repr(f64::INFINITY).is_err());
    }

    #[test]
    fn empty_containers() {
        assert_eq!(encode(json!({})), "{}");
        assert_eq!(encode(json!([])), "[]");
        assert_eq!(encode(json!({"a": [], "b": {}})), r#"{"a":[],"b":{}}"#);
    }
}
