//! Scalar grammar shared by the streaming and the tree decoder.

use alloc::format;
use alloc::string::String;

use sf_serial::SerialError;

use crate::lexer::SPECIAL_FLOATS_HINT;

/// `-?[0-9]+`, within the range of `i64`.
pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Whether `text` follows the JSON number grammar.
pub(crate) fn is_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut pos = usize::from(bytes.first() == Some(&b'-'));
    let digits = |pos: &mut usize| {
        let start = *pos;
        while bytes.get(*pos).is_some_and(u8::is_ascii_digit) {
            *pos += 1;
        }
        *pos > start
    };

    if !digits(&mut pos) {
        return false;
    }
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        if !digits(&mut pos) {
            return false;
        }
    }
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        if !digits(&mut pos) {
            return false;
        }
    }
    pos == bytes.len()
}

/// `NaN`, `Infinity` and `-Infinity`.
pub(crate) fn special_float(text: &str) -> Option<f64> {
    match text {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// The JSON spelling of a non-finite float.
pub(crate) fn special_float_name(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    }
}

pub(crate) fn special_float_message(value: f64) -> String {
    format!(
        "Unexpected special floating-point value {}. By default, non-finite floating point \
         values are prohibited because they do not conform to the JSON specification. \
         {SPECIAL_FLOATS_HINT}",
        special_float_name(value)
    )
}

/// Writing a non-finite float without the option.
pub(crate) fn special_float_error(value: f64) -> SerialError {
    SerialError::json_encoding(special_float_message(value))
}
