//! Month stems for the annual/monthly cycles.

use crate::types::Stem;
use Stem::*;

/// Month-stem tables checked against a published almanac, month 1 first.
const MONTH_STEM_TABLES: &[(i32, [Stem; 12])] = &[
    (2025, [Wu, Ji, Geng, Xin, Ren, Gui, Jia, Yi, Bing, Ding, Wu, Ji]),
    (2026, [Geng, Xin, Ren, Gui, Jia, Yi, Bing, Ding, Wu, Ji, Geng, Xin]),
];

/// Where a year's month stems came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthStemSource {
    /// Supplied by the caller for this request
    Override,
    /// Literal table
    Table,
    /// Derived from the year stem
    Derived,
}

/// Month stems for years without a table: month 1 takes the year's own
/// stem, then one stem per month.
pub fn derive_month_stems(year: i32) -> [Stem; 12] {
    let first = Stem::of_year(year);
    std::array::from_fn(|i| first.offset(i as i64))
}

/// Month stems for `year`, preferring an explicit override, then the
/// literal tables, then derivation.
pub fn month_stems(year: i32, overrides: Option<&[Stem; 12]>) -> ([Stem; 12], MonthStemSource) {
    if let Some(stems) = overrides {
        return (*stems, MonthStemSource::Override);
    }
    if let Some((_, stems)) = MONTH_STEM_TABLES.iter().find(|(y, _)| *y == year) {
        return (*stems, MonthStemSource::Table);
    }
    (derive_month_stems(year), MonthStemSource::Derived)
}

/// Separators tolerated between stems, alongside whitespace.
const STEM_SEPARATORS: &[char] = &[',', '，', '、', ';', '；'];

/// Parse a 12-character stem string such as "庚辛壬癸甲乙丙丁戊己庚辛".
pub fn parse_month_stems(s: &str) -> Option<[Stem; 12]> {
    let stems: Vec<Stem> = s
        .chars()
        .filter(|c| !c.is_whitespace() && !STEM_SEPARATORS.contains(c))
        .map(Stem::from_char)
        .collect::<Option<_>>()?;
    stems.try_into().ok()
}
