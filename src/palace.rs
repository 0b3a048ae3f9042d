//! Palace columns, the per-chart registry, and canonical column ordering.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::stars::StarClass;
use crate::types::{CANONICAL_ORDER, ColumnCode, Palace};

// ── Ordered, deduplicated star list ────────────────────────────────

/// Star names in order of first appearance; pushing a name twice is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StarList(Vec<String>);

impl StarList {
    /// Append `star` unless already present. Returns whether it was added.
    pub fn push(&mut self, star: &str) -> bool {
        if self.contains(star) {
            return false;
        }
        self.0.push(star.to_string());
        true
    }

    pub fn contains(&self, star: &str) -> bool {
        self.0.iter().any(|s| s == star)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cell text: names joined with "/".
    pub fn joined(&self) -> String {
        self.0.join("/")
    }
}

// ── Decade range (大限) ────────────────────────────────────────────

/// Inclusive age range of a great cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecadeRange {
    pub lo: u32,
    pub hi: u32,
}

impl DecadeRange {
    pub fn contains(&self, age: i32) -> bool {
        i64::from(self.lo) <= i64::from(age) && i64::from(age) <= i64::from(self.hi)
    }

    /// Distance from `age` to the nearer boundary; 0 when inside.
    pub fn gap(&self, age: i32) -> u64 {
        if self.contains(age) {
            return 0;
        }
        let age = i64::from(age);
        let lo = (age - i64::from(self.lo)).unsigned_abs();
        let hi = (age - i64::from(self.hi)).unsigned_abs();
        lo.min(hi)
    }
}

impl fmt::Display for DecadeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.lo, self.hi)
    }
}

// ── Palace column ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PalaceColumn {
    pub code: ColumnCode,
    /// Bracketed palace name as written, e.g. "命宮-身宮"
    pub palace_name: String,
    /// `None` when the name matched no known palace
    pub palace: Option<Palace>,
    pub main: StarList,
    pub aux: StarList,
    pub minor: StarList,
    pub decade: Option<DecadeRange>,
    /// 小限 ages listed in the block
    pub small_cycle_ages: Vec<u32>,
}

impl PalaceColumn {
    pub fn new(code: ColumnCode, palace_name: &str) -> Self {
        Self {
            code,
            palace_name: palace_name.to_string(),
            palace: Palace::from_name(palace_name),
            main: StarList::default(),
            aux: StarList::default(),
            minor: StarList::default(),
            decade: None,
            small_cycle_ages: Vec::new(),
        }
    }

    pub fn add_star(&mut self, class: StarClass, star: &str) -> bool {
        match class {
            StarClass::Main => self.main.push(star),
            StarClass::Aux => self.aux.push(star),
            StarClass::Minor => self.minor.push(star),
        }
    }

    /// True when any of the three star lists holds `star`.
    pub fn holds(&self, star: &str) -> bool {
        self.main.contains(star) || self.aux.contains(star) || self.minor.contains(star)
    }

    /// Natal palace abbreviation, or "" when unresolved.
    pub fn abbr_cell(&self) -> String {
        self.palace.map(|p| p.abbr().to_string()).unwrap_or_default()
    }
}

// ── Registry ───────────────────────────────────────────────────────

/// All columns of one chart, keyed by code, remembering discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PalaceRegistry {
    columns: Vec<PalaceColumn>,
    #[serde(skip)]
    index: HashMap<ColumnCode, usize>,
}

impl PalaceRegistry {
    /// Insert a column. The first column for a code wins; later
    /// duplicates are dropped and `false` is returned.
    pub fn insert(&mut self, column: PalaceColumn) -> bool {
        if self.index.contains_key(&column.code) {
            warn!(code = %column.code, "duplicate palace block ignored");
            return false;
        }
        self.index.insert(column.code, self.columns.len());
        self.columns.push(column);
        true
    }

    pub fn get(&self, code: &ColumnCode) -> Option<&PalaceColumn> {
        self.index.get(code).map(|&i| &self.columns[i])
    }

    /// Codes in the order their blocks were discovered.
    pub fn discovery_order(&self) -> Vec<ColumnCode> {
        self.columns.iter().map(|c| c.code).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PalaceColumn> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Arrange columns in canonical palace order (命 → 父).
///
/// For each canonical palace the first discovered column carrying it is
/// placed; every column left over (unresolved name, or a second column
/// claiming an already placed palace) follows in discovery order.
pub fn reorder(registry: &PalaceRegistry) -> Vec<ColumnCode> {
    let discovered = registry.discovery_order();
    let mut placed: Vec<ColumnCode> = Vec::with_capacity(discovered.len());

    for palace in CANONICAL_ORDER {
        let slot = discovered.iter().find(|code| {
            registry.get(code).and_then(|c| c.palace) == Some(palace)
        });
        if let Some(code) = slot {
            placed.push(*code);
        }
    }

    let tail: Vec<ColumnCode> = discovered
        .iter()
        .filter(|code| !placed.contains(code))
        .copied()
        .collect();
    if !tail.is_empty() {
        let names: Vec<String> = tail.iter().map(ToString::to_string).collect();
        debug!(tail = %names.join("、"), "columns without a canonical slot appended");
    }
    placed.extend(tail);

    debug!(
        discovered = %format_order(&discovered, registry),
        reordered = %format_order(&placed, registry),
        "column order"
    );
    placed
}

fn format_order(codes: &[ColumnCode], registry: &PalaceRegistry) -> String {
    codes
        .iter()
        .enumerate()
        .map(|(i, code)| {
            let abbr = registry
                .get(code)
                .map(|c| c.abbr_cell())
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| "?".to_string());
            format!("{}.{}({})", i + 1, code, abbr)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> ColumnCode {
        ColumnCode::parse(s).unwrap()
    }

    fn registry(cols: &[(&str, &str)]) -> PalaceRegistry {
        let mut reg = PalaceRegistry::default();
        for (c, name) in cols {
            reg.insert(PalaceColumn::new(code(c), name));
        }
        reg
    }

    #[test]
    fn test_star_list_dedup_preserves_order() {
        let mut list = StarList::default();
        assert!(list.push("紫微"));
        assert!(list.push("天府"));
        assert!(!list.push("紫微"));
        assert_eq!(list.joined(), "紫微/天府");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_decade_range_boundaries() {
        let r = DecadeRange { lo: 36, hi: 45 };
        assert!(r.contains(36));
        assert!(r.contains(45));
        assert!(!r.contains(46));
        assert_eq!(r.gap(40), 0);
        assert_eq!(r.gap(47), 2);
        assert_eq!(r.gap(30), 6);
        assert_eq!(r.to_string(), "36~45");
    }

    #[test]
    fn test_duplicate_code_first_wins() {
        let mut reg = registry(&[("丙寅", "命宮")]);
        assert!(!reg.insert(PalaceColumn::new(code("丙寅"), "兄弟宮")));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(&code("丙寅")).unwrap().palace, Some(Palace::Life));
    }

    #[test]
    fn test_reorder_canonical() {
        let reg = registry(&[
            ("戊辰", "夫妻宮"),
            ("丁卯", "兄弟宮"),
            ("丙寅", "命宮"),
        ]);
        assert_eq!(
            reorder(&reg),
            vec![code("丙寅"), code("丁卯"), code("戊辰")]
        );
    }

    #[test]
    fn test_reorder_unresolved_appended_in_discovery_order() {
        let reg = registry(&[
            ("甲子", "某宮"),
            ("丁卯", "兄弟宮"),
            ("乙丑", "不明"),
            ("丙寅", "命宮-身宮"),
        ]);
        assert_eq!(
            reorder(&reg),
            vec![code("丙寅"), code("丁卯"), code("甲子"), code("乙丑")]
        );
    }

    #[test]
    fn test_reorder_second_claimant_goes_to_tail() {
        let reg = registry(&[("丙寅", "命宮"), ("丁卯", "命宮"), ("戊辰", "兄弟宮")]);
        assert_eq!(
            reorder(&reg),
            vec![code("丙寅"), code("戊辰"), code("丁卯")]
        );
    }

    #[test]
    fn test_reorder_empty() {
        assert!(reorder(&PalaceRegistry::default()).is_empty());
    }
}
