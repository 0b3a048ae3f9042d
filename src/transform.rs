//! Four-transformation (四化) table and locator.

use serde::Serialize;
use tracing::debug;

use crate::palace::PalaceRegistry;
use crate::types::{ColumnCode, Stem, Transformation};

/// Stars taking 祿, 權, 科, 忌 under `stem`, in that order.
pub fn transformation_stars(stem: Stem) -> [&'static str; 4] {
    match stem {
        Stem::Jia => ["廉貞", "破軍", "武曲", "太陽"],
        Stem::Yi => ["天機", "天梁", "紫微", "太陰"],
        Stem::Bing => ["天同", "天機", "文昌", "廉貞"],
        Stem::Ding => ["太陰", "天同", "天機", "巨門"],
        Stem::Wu => ["貪狼", "太陰", "右弼", "天機"],
        Stem::Ji => ["武曲", "貪狼", "天梁", "文曲"],
        Stem::Geng => ["太陽", "武曲", "太陰", "天同"],
        Stem::Xin => ["巨門", "太陽", "文曲", "文昌"],
        Stem::Ren => ["天梁", "紫微", "左輔", "武曲"],
        Stem::Gui => ["破軍", "巨門", "太陰", "貪狼"],
    }
}

/// (star, transformation) pairs for `stem`.
pub fn transformations(stem: Stem) -> [(&'static str, Transformation); 4] {
    let stars = transformation_stars(stem);
    std::array::from_fn(|i| (stars[i], Transformation::ALL[i]))
}

/// Where one transformed star landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub star: &'static str,
    pub kind: Transformation,
    /// Every column holding the star; empty when not located
    pub columns: Vec<ColumnCode>,
}

impl Placement {
    /// "{star}{type}", e.g. "廉貞祿"
    pub fn label(&self) -> String {
        format!("{}{}", self.star, self.kind)
    }
}

/// Locator output: one label list per ordered column, plus placements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Located {
    pub stem: Option<Stem>,
    pub cells: Vec<Vec<String>>,
    pub placements: Vec<Placement>,
}

impl Located {
    fn empty(width: usize) -> Self {
        Self {
            stem: None,
            cells: vec![Vec::new(); width],
            placements: Vec::new(),
        }
    }

    /// Cell strings joined with "/", aligned to the ordered columns.
    pub fn joined_cells(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.join("/")).collect()
    }

    /// Transformed stars present in no column.
    pub fn unlocated(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|p| p.columns.is_empty())
    }

    /// Transformed stars present in more than one column.
    pub fn multiply_located(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|p| p.columns.len() > 1)
    }

    /// One-line placement summary for logging.
    pub fn summary(&self) -> String {
        self.placements
            .iter()
            .map(|p| {
                let where_ = if p.columns.is_empty() {
                    "未定位".to_string()
                } else {
                    p.columns
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(",")
                };
                format!("{}:{}->{}", p.kind, p.star, where_)
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Find the columns holding each of `stem`'s four transformed stars.
///
/// Every column holding a star gets its label, so a star duplicated by
/// malformed input is recorded in all its columns. `None` yields all-empty
/// cells.
pub fn locate(stem: Option<Stem>, columns: &[ColumnCode], registry: &PalaceRegistry) -> Located {
    let Some(stem) = stem else {
        return Located::empty(columns.len());
    };

    let mut located = Located::empty(columns.len());
    located.stem = Some(stem);

    for (star, kind) in transformations(stem) {
        let mut placement = Placement {
            star,
            kind,
            columns: Vec::new(),
        };
        for (i, code) in columns.iter().enumerate() {
            if registry.get(code).is_some_and(|c| c.holds(star)) {
                located.cells[i].push(placement.label());
                placement.columns.push(*code);
            }
        }
        located.placements.push(placement);
    }
    located
}

/// `locate` with a debug line naming where each star went.
pub fn locate_logged(
    tag: &str,
    stem: Option<Stem>,
    columns: &[ColumnCode],
    registry: &PalaceRegistry,
) -> Located {
    let located = locate(stem, columns, registry);
    match stem {
        Some(s) => debug!(target: "ziwei_chart::hua", "{tag}（{s}）｜{}", located.summary()),
        None => debug!(target: "ziwei_chart::hua", "{tag}：no valid stem"),
    }
    located
}
