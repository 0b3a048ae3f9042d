//! Cycle anchors (decade, annual, monthly) and palace-label rotation.
//!
//! Every cycle assigns the twelve canonical palaces to the ordered columns
//! by rotation from an anchor column, which acts as that cycle's 命 palace.
//! Only the way the anchor is found differs between cycles.

use tracing::debug;

use crate::palace::PalaceRegistry;
use crate::types::{Branch, CANONICAL_ORDER, ColumnCode, Palace};

/// The natal column whose palace aligns month 1 with the annual cycle.
pub const MONTH_ALIGNMENT_BRANCH: Branch = Branch::Yin;

// ── Rotation ───────────────────────────────────────────────────────

/// A palace-label assignment over the ordered columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Index into the ordered columns of this cycle's 命 palace
    pub anchor: Option<usize>,
    /// One label per ordered column; all `None` when there is no anchor
    pub labels: Vec<Option<Palace>>,
}

impl Cycle {
    /// Rotate the canonical order starting at `anchor`: the column at
    /// `(anchor + k) mod n` gets `CANONICAL_ORDER[k mod 12]`.
    pub fn rotate(anchor: Option<usize>, width: usize) -> Self {
        let mut labels = vec![None; width];
        let anchor = anchor.filter(|&a| a < width);
        if let Some(start) = anchor {
            for offset in 0..width {
                labels[(start + offset) % width] = Some(CANONICAL_ORDER[offset % CANONICAL_ORDER.len()]);
            }
        }
        Self { anchor, labels }
    }

    /// Index of the column carrying `palace` in this cycle.
    pub fn position_of(&self, palace: Palace) -> Option<usize> {
        self.labels.iter().position(|l| *l == Some(palace))
    }

    /// Column carrying `palace` in this cycle.
    pub fn column_of(&self, palace: Palace, columns: &[ColumnCode]) -> Option<ColumnCode> {
        self.position_of(palace).and_then(|i| columns.get(i).copied())
    }

    /// Label cells for the table; "" where unassigned.
    pub fn cells(&self) -> Vec<String> {
        self.labels
            .iter()
            .map(|l| l.map(|p| p.abbr().to_string()).unwrap_or_default())
            .collect()
    }
}

// ── Decade (大限) ──────────────────────────────────────────────────

/// Column whose decade range contains `age` (inclusive).
pub fn find_decade_column(columns: &[ColumnCode], registry: &PalaceRegistry, age: i32) -> Option<usize> {
    columns.iter().position(|code| {
        registry
            .get(code)
            .and_then(|c| c.decade)
            .is_some_and(|r| r.contains(age))
    })
}

/// Decade anchor for `age`: the containing range, or failing that the
/// range whose nearer boundary is closest (first column wins ties).
pub fn decade_anchor(columns: &[ColumnCode], registry: &PalaceRegistry, age: i32) -> Option<usize> {
    if let Some(i) = find_decade_column(columns, registry, age) {
        debug!(age, column = %columns[i], "decade anchor hit");
        return Some(i);
    }

    let mut best: Option<(usize, u64)> = None;
    for (i, code) in columns.iter().enumerate() {
        let Some(range) = registry.get(code).and_then(|c| c.decade) else {
            continue;
        };
        let gap = range.gap(age);
        if best.is_none_or(|(_, g)| gap < g) {
            best = Some((i, gap));
        }
    }
    if let Some((i, gap)) = best {
        debug!(age, column = %columns[i], gap, "decade anchor missed; using nearest range");
    }
    best.map(|(i, _)| i)
}

/// Decade cycle for the given birth and reference years.
/// No birth year means no age, hence no anchor.
pub fn decade_cycle(
    columns: &[ColumnCode],
    registry: &PalaceRegistry,
    birth_year: Option<i32>,
    reference_year: i32,
) -> Cycle {
    let anchor = birth_year.and_then(|b| decade_anchor(columns, registry, reference_year - b));
    Cycle::rotate(anchor, columns.len())
}

// ── Annual (流年) ──────────────────────────────────────────────────

/// First ordered column carrying `branch`.
pub fn column_with_branch(columns: &[ColumnCode], branch: Branch) -> Option<usize> {
    columns.iter().position(|c| c.branch == branch)
}

/// Annual anchor: the column of the year's branch.
pub fn annual_anchor(columns: &[ColumnCode], year: i32) -> Option<usize> {
    column_with_branch(columns, Branch::of_year(year))
}

pub fn annual_cycle(columns: &[ColumnCode], year: i32) -> Cycle {
    Cycle::rotate(annual_anchor(columns, year), columns.len())
}

// ── Monthly (流月) ─────────────────────────────────────────────────

/// Month 1 anchor index.
///
/// Take the natal palace of the 寅 column, then find where that palace
/// sits in the annual cycle.
pub fn month_base_index(columns: &[ColumnCode], registry: &PalaceRegistry, annual: &Cycle) -> Option<usize> {
    let yin = column_with_branch(columns, MONTH_ALIGNMENT_BRANCH)?;
    let natal = registry.get(&columns[yin]).and_then(|c| c.palace);
    let base = natal.and_then(|p| annual.position_of(p));
    debug!(
        column = %columns[yin],
        natal = ?natal.map(|p| p.abbr()),
        base = ?base,
        "month base"
    );
    base
}

/// Anchor of month `month` (1-based): `(base − (month − 1)) mod width`.
pub fn month_anchor(base: usize, month: u32, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    let back = (month.saturating_sub(1) as usize) % width;
    (base % width + width - back) % width
}

pub fn month_cycle(base: Option<usize>, month: u32, width: usize) -> Cycle {
    Cycle::rotate(base.map(|b| month_anchor(b, month, width)), width)
}
