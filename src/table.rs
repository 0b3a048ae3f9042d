//! Table assembly: every cycle's rows, aligned to the ordered columns.

use chart_types::{ChartTable, TableRow};
use tracing::debug;

use crate::calendar::{MonthStemSource, month_stems};
use crate::config::{OutputSwitches, RequestContext};
use crate::cycle::{
    Cycle, annual_cycle, column_with_branch, decade_cycle, month_base_index, month_cycle,
};
use crate::palace::{PalaceColumn, PalaceRegistry, StarList, reorder};
use crate::parser::Chart;
use crate::transform::locate_logged;
use crate::types::{Branch, CANONICAL_ORDER, ColumnCode, Palace, Stem};

/// "生年四化（庚）", or "生年四化" when the stem is unknown.
fn with_stem(name: &str, stem: Option<Stem>) -> String {
    match stem {
        Some(s) => format!("{name}（{s}）"),
        None => name.to_string(),
    }
}

/// Per-palace rows keep their parentheses: "大命四化（）" when no column
/// carries the palace.
fn with_cycle_stem(name: &str, stem: Option<Stem>) -> String {
    let stem = stem.map(|s| s.to_string()).unwrap_or_default();
    format!("{name}（{stem}）")
}

/// Builds rows over one chart's ordered columns.
struct Assembler<'a> {
    registry: &'a PalaceRegistry,
    columns: Vec<ColumnCode>,
    rows: Vec<TableRow>,
}

impl<'a> Assembler<'a> {
    fn new(registry: &'a PalaceRegistry) -> Self {
        Self {
            registry,
            columns: reorder(registry),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, label: impl Into<String>, sub_label: impl Into<String>, cells: Vec<String>) {
        debug_assert_eq!(cells.len(), self.columns.len());
        self.rows.push(TableRow::new(label, sub_label, cells));
    }

    fn star_row(&mut self, name: &str, pick: impl Fn(&PalaceColumn) -> &StarList) {
        let cells = self
            .columns
            .iter()
            .map(|c| self.registry.get(c).map(|col| pick(col).joined()).unwrap_or_default())
            .collect();
        self.push("", name, cells);
    }

    fn transformation_row(&mut self, label: &str, name: &str, stem: Option<Stem>) {
        let located = locate_logged(name, stem, &self.columns, self.registry);
        self.push(label, with_stem(name, stem), located.joined_cells());
    }

    fn palace_transformation_row(&mut self, name: &str, stem: Option<Stem>) {
        let located = locate_logged(name, stem, &self.columns, self.registry);
        self.push("", with_cycle_stem(name, stem), located.joined_cells());
    }

    /// Leading stem of the column carrying `palace` in `cycle`.
    fn governing_stem(&self, cycle: &Cycle, palace: Palace) -> Option<Stem> {
        cycle.column_of(palace, &self.columns).map(|c| c.stem)
    }

    // ── Natal ──────────────────────────────────────────────────────

    fn natal_rows(&mut self, birth_stem: Option<Stem>) {
        self.star_row("主星", |c| &c.main);
        self.star_row("輔星", |c| &c.aux);
        self.star_row("小星", |c| &c.minor);

        let decades = self
            .columns
            .iter()
            .map(|c| {
                self.registry
                    .get(c)
                    .and_then(|col| col.decade)
                    .map(|r| r.to_string())
                    .unwrap_or_default()
            })
            .collect();
        self.push("", "大限", decades);

        let natal = self
            .columns
            .iter()
            .map(|c| self.registry.get(c).map(|col| col.abbr_cell()).unwrap_or_default())
            .collect();
        self.push("本命", "宮位", natal);

        self.transformation_row("", "生年四化", birth_stem);
    }

    // ── Decade ─────────────────────────────────────────────────────

    fn decade_rows(&mut self, ctx: &RequestContext, switches: &OutputSwitches) {
        let cycle = decade_cycle(&self.columns, self.registry, ctx.birth_year, ctx.reference_year);
        if ctx.birth_year.is_none() {
            debug!("no birth year; decade rows left blank");
        }
        self.push("大限命", "宮位", cycle.cells());

        for palace in CANONICAL_ORDER {
            if !switches.decade.enabled(palace) {
                continue;
            }
            let stem = self.governing_stem(&cycle, palace);
            self.palace_transformation_row(&format!("大{palace}四化"), stem);
        }
    }

    // ── Annual ─────────────────────────────────────────────────────

    fn annual_rows(&mut self, ctx: &RequestContext, switches: &OutputSwitches) -> Cycle {
        let year = ctx.reference_year;
        let cycle = annual_cycle(&self.columns, year);
        self.push(format!("流年命（{year}）"), "宮位", cycle.cells());

        let year_stem = Stem::of_year(year);
        let branch_stem = column_with_branch(&self.columns, Branch::of_year(year))
            .map(|i| self.columns[i].stem);

        match branch_stem {
            Some(bs) if bs != year_stem => {
                debug!(year_stem = %year_stem, branch_stem = %bs, "annual stems differ; two rows");
                if switches.annual_year_stem_row {
                    self.transformation_row("", "流命四化", Some(year_stem));
                }
                if switches.annual_branch_stem_row {
                    self.transformation_row("", "流命四化", Some(bs));
                }
            }
            _ => {
                if switches.annual_year_stem_row {
                    self.transformation_row("", "流命四化", Some(year_stem));
                }
            }
        }

        for palace in CANONICAL_ORDER {
            if !switches.annual.enabled(palace) {
                continue;
            }
            let stem = self.governing_stem(&cycle, palace);
            self.palace_transformation_row(&format!("流{palace}四化"), stem);
        }
        cycle
    }

    // ── Monthly ────────────────────────────────────────────────────

    fn monthly_rows(&mut self, ctx: &RequestContext, switches: &OutputSwitches, annual: &Cycle) {
        let year = ctx.reference_year;
        let base = month_base_index(&self.columns, self.registry, annual);
        let (stems, source) = month_stems(year, ctx.month_stems.as_ref());
        if source == MonthStemSource::Derived {
            let listed: String = stems.iter().map(|s| s.as_char()).collect();
            debug!(year, stems = %listed, "no month-stem table; derived from year stem");
        }

        for month in 1..=12u32 {
            if !switches.months.month_enabled(month) {
                continue;
            }
            if switches.months.palace_row {
                let cycle = month_cycle(base, month, self.columns.len());
                self.push(format!("流月命（{year}-{month:02}）"), "宮位", cycle.cells());
            }
            if switches.months.transformation_row {
                let stem = stems[(month - 1) as usize];
                self.transformation_row("", "流月四化", Some(stem));
            }
        }
    }

    fn finish(self) -> ChartTable {
        ChartTable {
            columns: self.columns.iter().map(ToString::to_string).collect(),
            rows: self.rows,
        }
    }
}

/// Assemble the full table for a parsed chart.
pub fn build_table(chart: &Chart, ctx: &RequestContext, switches: &OutputSwitches) -> ChartTable {
    let mut asm = Assembler::new(&chart.registry);
    asm.natal_rows(chart.birth_stem);
    asm.decade_rows(ctx, switches);
    let annual = asm.annual_rows(ctx, switches);
    asm.monthly_rows(ctx, switches, &annual);
    asm.finish()
}
