//! Parsing of free-text predecessor descriptions.
//!
//! A new unit lists the old units it was formed from, e.g.
//! `"Phường Bến Nghé (Quận 1), phần còn lại (huyện Cần Giờ)"`. Each
//! comma-separated part becomes one [`SourceFragment`].

use dvhc_model::types::UnitType;
use regex::Regex;

use crate::normalize::{normalize_vietnamese, split_unit_prefix};

const TRAILING_QUALIFIER: &str = r"^(.*?)\s*\(([^()]*)\)\s*$";

/// Normalized form of the remainder marker "phần còn lại".
const REMAINDER_KEY: &str = "phan con lai";

/// One parsed piece of a predecessor description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFragment {
    /// The fragment as written, whitespace collapsed.
    pub raw: String,
    /// Unit name with type prefix and qualifier removed.
    pub name: String,
    pub unit_type: Option<UnitType>,
    /// Old district named in a trailing parenthetical.
    pub parent_district_name: Option<String>,
    /// Set for "phần còn lại" (the rest of the district).
    pub is_partial: bool,
}

/// Splits predecessor text into fragments. Never fails on input; malformed
/// parts degrade to whatever could be extracted.
#[derive(Debug, Clone)]
pub struct FragmentParser {
    qualifier: Regex,
}

impl FragmentParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            qualifier: Regex::new(TRAILING_QUALIFIER)?,
        })
    }

    pub fn parse(&self, text: &str) -> Vec<SourceFragment> {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| self.parse_fragment(part))
            .collect()
    }

    fn parse_fragment(&self, part: &str) -> SourceFragment {
        let is_partial = normalize_vietnamese(part).contains(REMAINDER_KEY);

        let (body, parent_district_name) = match self.qualifier.captures(part) {
            Some(caps) => {
                let body = caps.get(1).map_or("", |m| m.as_str());
                let qualifier = caps.get(2).map_or("", |m| m.as_str()).trim();
                (body, (!qualifier.is_empty()).then(|| qualifier.to_string()))
            }
            None => (part, None),
        };

        let (unit_type, name) = split_unit_prefix(body);

        SourceFragment {
            raw: part.to_string(),
            name: name.trim().to_string(),
            unit_type,
            parent_district_name,
            is_partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> FragmentParser {
        FragmentParser::new().unwrap()
    }

    #[test]
    fn test_parse_qualified_fragments() {
        let fragments = parser().parse("Phường Bến Nghé (Quận 1), Phường Bến Thành (Quận 1)");
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].name, "Bến Nghé");
        assert_eq!(fragments[0].unit_type, Some(UnitType::Ward));
        assert_eq!(fragments[0].parent_district_name.as_deref(), Some("Quận 1"));
        assert!(!fragments[0].is_partial);
        assert_eq!(fragments[1].raw, "Phường Bến Thành (Quận 1)");
    }

    #[test]
    fn test_parse_collapses_whitespace_and_newlines() {
        let fragments = parser().parse("Phường Bến Nghé (Quận 1),\n   Phường  Bến\tThành");
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[1].name, "Bến Thành");
        assert_eq!(fragments[1].parent_district_name, None);
    }

    #[test]
    fn test_parse_township_prefix() {
        let fragments = parser().parse("Thị trấn Cần Thạnh");
        assert_eq!(fragments[0].unit_type, Some(UnitType::Township));
        assert_eq!(fragments[0].name, "Cần Thạnh");
    }

    #[test]
    fn test_parse_remainder_marker() {
        let fragments = parser().parse("phần còn lại (huyện Cần Giờ)");
        assert!(fragments[0].is_partial);
        assert_eq!(fragments[0].parent_district_name.as_deref(), Some("huyện Cần Giờ"));
        assert_eq!(fragments[0].unit_type, None);
    }

    #[test]
    fn test_parse_remainder_any_spelling() {
        assert!(parser().parse("PHẦN CÒN LẠI của xã Long Hòa")[0].is_partial);
        assert!(parser().parse("Xã Long Hòa (phan con lai)")[0].is_partial);
    }

    #[test]
    fn test_parse_skips_empty_parts() {
        assert!(parser().parse("").is_empty());
        assert_eq!(parser().parse(" , Xã Long Hòa ,, ").len(), 1);
    }

    #[test]
    fn test_parse_unbalanced_parenthesis() {
        let fragments = parser().parse("Phường Đa Kao (Quận 1");
        assert_eq!(fragments[0].parent_district_name, None);
        assert_eq!(fragments[0].name, "Đa Kao (Quận 1");
    }

    #[test]
    fn test_parse_empty_qualifier() {
        let fragments = parser().parse("Phường 4 ()");
        assert_eq!(fragments[0].parent_district_name, None);
        assert_eq!(fragments[0].name, "4");
    }
}
