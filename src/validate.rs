//! Advisory checks over a parsed chart. Nothing here changes the table.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::palace::reorder;
use crate::parser::Chart;
use crate::stars::MAIN_STARS;
use crate::transform::locate;
use crate::types::ColumnCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum Diagnostic {
    /// No palace blocks were recognized at all
    NoPalaces,
    /// Fewer or more than twelve columns
    ColumnCount(usize),
    /// Main stars that appear in no column
    MissingMainStars(Vec<String>),
    /// Columns without a 大限 range
    MissingDecade(Vec<ColumnCode>),
    /// Columns whose palace name matched no known palace
    UnresolvedPalace(Vec<ColumnCode>),
    /// No 陽曆 year in the preface
    MissingBirthYear,
    /// No 干支 stem in the preface
    MissingBirthStem,
    /// Natal transformation labels whose star is in no column
    UnlocatedTransformations(Vec<String>),
    /// Natal transformation star found in several columns
    MultiplyLocated { label: String, columns: usize },
}

fn join_codes(codes: &[ColumnCode]) -> String {
    codes.iter().map(ToString::to_string).collect::<Vec<_>>().join("、")
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPalaces => write!(f, "no palace blocks recognized"),
            Self::ColumnCount(n) => write!(f, "expected 12 palace columns, found {n}"),
            Self::MissingMainStars(stars) => {
                write!(f, "main stars not found in input: {}", stars.join("、"))
            }
            Self::MissingDecade(codes) => {
                write!(f, "columns missing 大限: {}", join_codes(codes))
            }
            Self::UnresolvedPalace(codes) => {
                write!(f, "columns with unrecognized palace name: {}", join_codes(codes))
            }
            Self::MissingBirthYear => write!(f, "no 陽曆 birth year; decade rows will be blank"),
            Self::MissingBirthStem => write!(f, "no 干支 birth stem; natal 四化 row will be blank"),
            Self::UnlocatedTransformations(labels) => {
                write!(f, "natal 四化 stars not located: {}", labels.join("、"))
            }
            Self::MultiplyLocated { label, columns } => {
                write!(f, "natal 四化 {label} located in {columns} columns")
            }
        }
    }
}

/// Collect every diagnostic for `chart`.
pub fn validate(chart: &Chart) -> Vec<Diagnostic> {
    let registry = &chart.registry;
    let mut out = Vec::new();

    if registry.is_empty() {
        out.push(Diagnostic::NoPalaces);
    } else if registry.len() != 12 {
        out.push(Diagnostic::ColumnCount(registry.len()));
    }

    if !registry.is_empty() {
        let missing: Vec<String> = MAIN_STARS
            .iter()
            .filter(|s| !registry.iter().any(|c| c.main.contains(s)))
            .map(|s| s.to_string())
            .collect();
        if !missing.is_empty() {
            out.push(Diagnostic::MissingMainStars(missing));
        }
    }

    let no_decade: Vec<ColumnCode> = registry
        .iter()
        .filter(|c| c.decade.is_none())
        .map(|c| c.code)
        .collect();
    if !no_decade.is_empty() {
        out.push(Diagnostic::MissingDecade(no_decade));
    }

    let unresolved: Vec<ColumnCode> = registry
        .iter()
        .filter(|c| c.palace.is_none())
        .map(|c| c.code)
        .collect();
    if !unresolved.is_empty() {
        out.push(Diagnostic::UnresolvedPalace(unresolved));
    }

    if chart.birth_year.is_none() {
        out.push(Diagnostic::MissingBirthYear);
    }

    match chart.birth_stem {
        None => out.push(Diagnostic::MissingBirthStem),
        Some(stem) => {
            let located = locate(Some(stem), &reorder(registry), registry);
            let unlocated: Vec<String> = located.unlocated().map(|p| p.label()).collect();
            if !unlocated.is_empty() {
                out.push(Diagnostic::UnlocatedTransformations(unlocated));
            }
            for p in located.multiply_located() {
                out.push(Diagnostic::MultiplyLocated {
                    label: p.label(),
                    columns: p.columns.len(),
                });
            }
        }
    }

    out
}

/// Emit each diagnostic as a warning.
pub fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        warn!("{d}");
    }
}
