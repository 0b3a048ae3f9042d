//! Per-request inputs and output-row switches.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{Palace, Stem};

// ── Request context ────────────────────────────────────────────────

/// Everything a single interpretation depends on besides the chart text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Gregorian birth year; `None` leaves decade rows blank
    pub birth_year: Option<i32>,
    /// The year treated as "this year" for annual and monthly cycles
    pub reference_year: i32,
    /// Month stems for `reference_year`, month 1 first
    pub month_stems: Option<[Stem; 12]>,
}

impl RequestContext {
    pub fn new(reference_year: i32) -> Self {
        Self {
            birth_year: None,
            reference_year,
            month_stems: None,
        }
    }

    pub fn with_birth_year(mut self, birth_year: Option<i32>) -> Self {
        self.birth_year = birth_year;
        self
    }

    pub fn with_month_stems(mut self, stems: Option<[Stem; 12]>) -> Self {
        self.month_stems = stems;
        self
    }

    /// Age used for the decade cycle: reference year minus birth year.
    pub fn age(&self) -> Option<i32> {
        self.birth_year.map(|b| self.reference_year - b)
    }
}

// ── Output switches ────────────────────────────────────────────────

/// One switch per palace for a family of twelve per-palace rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PalaceSwitches {
    pub life: bool,
    pub siblings: bool,
    pub spouse: bool,
    pub children: bool,
    pub wealth: bool,
    pub health: bool,
    pub travel: bool,
    pub friends: bool,
    pub career: bool,
    pub property: bool,
    pub fortune: bool,
    pub parents: bool,
}

impl Default for PalaceSwitches {
    fn default() -> Self {
        Self {
            life: true,
            siblings: true,
            spouse: true,
            children: true,
            wealth: true,
            health: true,
            travel: true,
            friends: true,
            career: true,
            property: true,
            fortune: true,
            parents: true,
        }
    }
}

impl PalaceSwitches {
    pub fn enabled(&self, palace: Palace) -> bool {
        match palace {
            Palace::Life => self.life,
            Palace::Siblings => self.siblings,
            Palace::Spouse => self.spouse,
            Palace::Children => self.children,
            Palace::Wealth => self.wealth,
            Palace::Health => self.health,
            Palace::Travel => self.travel,
            Palace::Friends => self.friends,
            Palace::Career => self.career,
            Palace::Property => self.property,
            Palace::Fortune => self.fortune,
            Palace::Parents => self.parents,
        }
    }
}

fn all_months() -> BTreeSet<u32> {
    (1..=12).collect()
}

/// Monthly rows: which months, and which of the two rows per month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthSwitches {
    pub months: BTreeSet<u32>,
    pub palace_row: bool,
    pub transformation_row: bool,
}

impl Default for MonthSwitches {
    fn default() -> Self {
        Self {
            months: all_months(),
            palace_row: true,
            transformation_row: true,
        }
    }
}

impl MonthSwitches {
    pub fn month_enabled(&self, month: u32) -> bool {
        self.months.contains(&month)
    }
}

/// Optional-row switches. The default enables every row; a JSON file
/// only needs to name the switches it turns off.
///
/// ```json
/// { "decade": { "health": false }, "months": { "months": [1, 2, 3] } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSwitches {
    /// 大{palace}四化 rows
    pub decade: PalaceSwitches,
    /// 流{palace}四化 rows
    pub annual: PalaceSwitches,
    /// 流命四化 row under the calendar-year stem
    pub annual_year_stem_row: bool,
    /// 流命四化 row under the annual branch column's stem
    pub annual_branch_stem_row: bool,
    pub months: MonthSwitches,
}

impl Default for OutputSwitches {
    fn default() -> Self {
        Self {
            decade: PalaceSwitches::default(),
            annual: PalaceSwitches::default(),
            annual_year_stem_row: true,
            annual_branch_stem_row: true,
            months: MonthSwitches::default(),
        }
    }
}
