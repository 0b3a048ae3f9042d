use serde::{Deserialize, Serialize};

/// Header cells that precede the column codes in a rendered table.
pub const HEADER_LABEL: &str = "原始資料";
pub const HEADER_SUB_LABEL: &str = "宮干支";

// ── Table row ────────────────────────────────────────────────────────────

/// One output row: a row label, a sub-label, and one cell per chart column.
///
/// Cells are never omitted; "not applicable" is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub label: String,
    pub sub_label: String,
    pub cells: Vec<String>,
}

impl TableRow {
    pub fn new(label: impl Into<String>, sub_label: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            label: label.into(),
            sub_label: sub_label.into(),
            cells,
        }
    }

    /// True when every cell is empty.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }
}

// ── Whole table ──────────────────────────────────────────────────────────

/// Interpreted chart: ordered column codes plus rows aligned to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartTable {
    /// Stem-branch codes, canonical palace order first, unresolved columns after.
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl ChartTable {
    /// Find the first row whose sub-label matches exactly.
    pub fn row_by_sub_label(&self, sub_label: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.sub_label == sub_label)
    }

    /// Find the first row whose label matches exactly.
    pub fn row_by_label(&self, label: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Cell of `row` under the column `code`, if both exist.
    pub fn cell<'a>(&'a self, row: &'a TableRow, code: &str) -> Option<&'a str> {
        let idx = self.columns.iter().position(|c| c == code)?;
        row.cells.get(idx).map(String::as_str)
    }

    /// True when every row has exactly one cell per column.
    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|r| r.cells.len() == self.columns.len())
    }
}
