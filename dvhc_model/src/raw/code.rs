//! Lenient decoding of codes and labels that sources store as strings or numbers.

use serde::de::{self, Deserializer, Visitor};
use std::fmt;

pub const PROVINCE_CODE_WIDTH: usize = 2;
pub const DISTRICT_CODE_WIDTH: usize = 3;
pub const WARD_CODE_WIDTH: usize = 5;

/// Left-pads a purely numeric code with zeros up to `width`. Non-numeric codes
/// and codes already at or above the width are returned trimmed but unchanged.
pub fn pad_code(code: &str, width: usize) -> String {
    let trimmed = code.trim();
    if !trimmed.is_empty() && trimmed.len() < width && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        format!("{:0>width$}", trimmed, width = width)
    } else {
        trimmed.to_string()
    }
}

struct LenientText;

impl<'de> Visitor<'de> for LenientText {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, a number or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let trimmed = v.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        self.visit_str(&v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if v.fract() == 0.0 && v.is_finite() {
            Ok(Some(format!("{}", v as i64)))
        } else {
            Ok(Some(v.to_string()))
        }
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(LenientText)
    }
}

/// `deserialize_with` helper: string or number to trimmed text, blank or null to `None`.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientText)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_text")]
        v: Option<String>,
    }

    fn probe(json: &str) -> Option<String> {
        serde_json::from_str::<Probe>(json).unwrap().v
    }

    #[test]
    fn test_pad_numeric_code() {
        assert_eq!(pad_code("1", PROVINCE_CODE_WIDTH), "01");
        assert_eq!(pad_code("400", WARD_CODE_WIDTH), "00400");
    }

    #[test]
    fn test_pad_leaves_wide_or_textual_codes() {
        assert_eq!(pad_code("00001", WARD_CODE_WIDTH), "00001");
        assert_eq!(pad_code("123456", WARD_CODE_WIDTH), "123456");
        assert_eq!(pad_code("HN", PROVINCE_CODE_WIDTH), "HN");
        assert_eq!(pad_code(" 7 ", DISTRICT_CODE_WIDTH), "007");
    }

    #[test]
    fn test_lenient_accepts_numbers_and_strings() {
        assert_eq!(probe(r#"{"v": 79}"#), Some("79".to_string()));
        assert_eq!(probe(r#"{"v": "  00100 "}"#), Some("00100".to_string()));
        assert_eq!(probe(r#"{"v": 12.0}"#), Some("12".to_string()));
    }

    #[test]
    fn test_lenient_blank_and_null_are_none() {
        assert_eq!(probe(r#"{"v": ""}"#), None);
        assert_eq!(probe(r#"{"v": null}"#), None);
        assert_eq!(probe(r#"{}"#), None);
    }
}
