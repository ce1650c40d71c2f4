//! Vietnamese name normalization.
//!
//! Every name comparison in the crate goes through these functions. Two names
//! match only when their keys are equal; there is no fuzzy matching.

use dvhc_model::types::UnitType;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Ward-level type tokens, longest first.
const WARD_PREFIXES: &[&str] = &["thi tran", "phuong", "xa"];

/// District-level type tokens, longest first.
const DISTRICT_PREFIXES: &[&str] = &["thanh pho", "thi xa", "thu do", "quan", "huyen", "tp"];

/// Province-level type tokens.
const PROVINCE_PREFIXES: &[&str] = &["thanh pho", "thu do", "tinh", "tp"];

/// Spellings of Ho Chi Minh City left over once the province prefix is gone.
const HCM_ALIASES: &[&str] = &[
    "tphcm",
    "tp hcm",
    "hcm",
    "hcmc",
    "tp ho chi minh",
    "ho chi minh city",
];

const HCM_KEY: &str = "ho chi minh";

/// Normalize a Vietnamese name into a comparison key.
///
/// Steps:
/// 1. Map "đ"/"Đ" to "d" (it has no canonical decomposition)
/// 2. Unicode NFD decomposition
/// 3. Drop combining marks
/// 4. Lowercase
/// 5. Replace every non-alphanumeric run with one space
/// 6. Trim
///
/// Returns an empty string for empty input.
pub fn normalize_vietnamese(input: &str) -> String {
    let folded: String = input
        .chars()
        .map(|c| match c {
            'đ' | 'Đ' => 'd',
            other => other,
        })
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_one_prefix<'k>(key: &'k str, prefixes: &[&str]) -> Option<&'k str> {
    prefixes
        .iter()
        .find_map(|prefix| key.strip_prefix(prefix).and_then(|r| r.strip_prefix(' ')))
}

/// Normalize a name and drop one leading administrative type token, ward
/// level ("phường", "xã", "thị trấn") first, then district level ("quận",
/// "huyện", "thị xã", "thành phố", ...).
pub fn strip_admin_prefix(name: &str) -> String {
    let key = normalize_vietnamese(name);
    strip_one_prefix(&key, WARD_PREFIXES)
        .or_else(|| strip_one_prefix(&key, DISTRICT_PREFIXES))
        .map(str::to_string)
        .unwrap_or(key)
}

/// Normalize a district name and drop one leading district-level type token.
pub fn strip_district_prefix(name: &str) -> String {
    let key = normalize_vietnamese(name);
    strip_one_prefix(&key, DISTRICT_PREFIXES)
        .map(str::to_string)
        .unwrap_or(key)
}

/// Normalize a province name: drop one leading "tỉnh"/"thành phố"/"thủ đô"
/// token and fold the many spellings of Ho Chi Minh City into one key.
pub fn normalize_province_name(name: &str) -> String {
    let normalized = normalize_vietnamese(name);
    let key = strip_one_prefix(&normalized, PROVINCE_PREFIXES).unwrap_or(&normalized);
    if HCM_ALIASES.contains(&key) {
        return HCM_KEY.to_string();
    }
    key.to_string()
}

/// Split a display name into its leading unit type and the bare name,
/// preserving the original spelling of the remainder.
///
/// `"Thị trấn Cần Thạnh"` gives `(Some(Township), "Cần Thạnh")`. A name that
/// is only a type word (e.g. `"Xã"`) is treated as a bare name.
pub fn split_unit_prefix(name: &str) -> (Option<UnitType>, &str) {
    let trimmed = name.trim();
    let mut words = trimmed.split_whitespace();
    let first = words.next().map(normalize_vietnamese).unwrap_or_default();
    let second = words.next().map(normalize_vietnamese).unwrap_or_default();

    let (unit_type, width) = match (first.as_str(), second.as_str()) {
        ("thi", "tran") => (Some(UnitType::Township), 2),
        ("dac", "khu") => (Some(UnitType::SpecialZone), 2),
        (single, _) => match UnitType::from_key(single) {
            Some(t) => (Some(t), 1),
            None => (None, 0),
        },
    };

    let Some(unit_type) = unit_type else {
        return (None, trimmed);
    };
    let rest = skip_words(trimmed, width);
    if rest.is_empty() {
        return (None, trimmed);
    }
    (Some(unit_type), rest)
}

/// Unit type implied by the leading token of a name, if any.
pub fn infer_unit_type(name: &str) -> Option<UnitType> {
    split_unit_prefix(name).0
}

/// Parse a free-text type label such as "Phường" or "thị trấn".
pub fn parse_unit_type(label: &str) -> Option<UnitType> {
    UnitType::from_key(&normalize_vietnamese(label))
}

fn skip_words(text: &str, count: usize) -> &str {
    let mut rest = text;
    for _ in 0..count {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = &rest[end..];
    }
    rest.trim()
}
