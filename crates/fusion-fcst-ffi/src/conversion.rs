//! Parameter conversion utilities for FFI functions.
//!
//! Optional numeric parameters follow the "0 or negative means None"
//! convention; NaN is used where zero is a meaningful value.

use core::ffi::{c_char, c_double, c_int};
use fusion_fcst_core::ForecastError;
use std::str::FromStr;

/// Convert a `c_int` to `Option<usize>`, where values <= 0 become None.
#[inline]
pub fn to_option_usize(value: c_int) -> Option<usize> {
    if value > 0 {
        Some(value as usize)
    } else {
        None
    }
}

/// Convert a `c_double` to `Option<f64>`, where values <= 0.0 become None.
#[inline]
pub fn to_option_f64_positive(value: c_double) -> Option<f64> {
    if value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Convert a `c_double` to `Option<f64>`, where NaN becomes None.
#[inline]
pub fn to_option_f64_not_nan(value: c_double) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

/// Read a fixed-size C string buffer up to its first null byte.
///
/// A buffer without a terminator is read in full. Returns `None` if the
/// content is not valid UTF-8.
pub fn c_buf_to_str(buf: &[c_char]) -> Option<&str> {
    // c_char is i8 or u8 depending on the target; both share u8's layout.
    let bytes = unsafe { std::slice::from_raw_parts(buf.as_ptr() as *const u8, buf.len()) };
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..end]).ok()
}

/// Parse a fixed-size C string buffer naming a model component.
pub fn parse_c_buf<T>(buf: &[c_char], param: &str) -> Result<T, ForecastError>
where
    T: FromStr<Err = ForecastError>,
{
    match c_buf_to_str(buf) {
        Some(s) => s.parse(),
        None => Err(ForecastError::invalid_parameter(
            param,
            "<non-utf8>",
            "must be a valid UTF-8 string",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_fcst_core::{SeasonalType, TrendType};

    fn buf(s: &str) -> [c_char; 16] {
        let mut out = [0 as c_char; 16];
        for (dst, &b) in out.iter_mut().zip(s.as_bytes()) {
            *dst = b as c_char;
        }
        out
    }

    #[test]
    fn test_to_option_usize() {
        assert_eq!(to_option_usize(12), Some(12));
        assert_eq!(to_option_usize(0), None);
        assert_eq!(to_option_usize(-3), None);
    }

    #[test]
    fn test_to_option_f64_positive() {
        assert_eq!(to_option_f64_positive(0.3), Some(0.3));
        assert_eq!(to_option_f64_positive(0.0), None);
        assert_eq!(to_option_f64_positive(-1.0), None);
    }

    #[test]
    fn test_to_option_f64_not_nan() {
        assert_eq!(to_option_f64_not_nan(0.0), Some(0.0));
        assert_eq!(to_option_f64_not_nan(f64::NAN), None);
    }

    #[test]
    fn test_c_buf_to_str() {
        assert_eq!(c_buf_to_str(&buf("additive")), Some("additive"));
        assert_eq!(c_buf_to_str(&buf("")), Some(""));

        let full = [b'a' as c_char; 4];
        assert_eq!(c_buf_to_str(&full), Some("aaaa"));
    }

    #[test]
    fn test_parse_c_buf() {
        let trend: TrendType = parse_c_buf(&buf("Add"), "trend").unwrap();
        assert_eq!(trend, TrendType::Additive);

        let seasonal: SeasonalType = parse_c_buf(&buf(""), "seasonal").unwrap();
        assert_eq!(seasonal, SeasonalType::None);

        let err = parse_c_buf::<TrendType>(&buf("cubic"), "trend").unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter { .. }));
    }

    #[test]
    fn test_parse_c_buf_invalid_utf8() {
        let mut bad = [0 as c_char; 16];
        bad[0] = 0xFFu8 as c_char;
        let err = parse_c_buf::<SeasonalType>(&bad, "seasonal").unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter { .. }));
    }
}
