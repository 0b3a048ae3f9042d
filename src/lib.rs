//! Zi Wei Dou Shu chart interpretation.
//!
//! Takes the plain text of an already generated chart (twelve palace
//! blocks plus a central information box), and projects the natal,
//! decade, annual and monthly cycles onto it with their four
//! transformations, producing a [`ChartTable`].
//!
//! ```no_run
//! use ziwei_chart::{OutputSwitches, interpret};
//!
//! let text = std::fs::read_to_string("chart.txt").unwrap();
//! let table = interpret(&text, 2026, &OutputSwitches::default());
//! println!("{}", ziwei_chart::render::to_markdown(&table));
//! ```

pub mod calendar;
pub mod config;
pub mod cycle;
pub mod error;
pub mod palace;
pub mod parser;
pub mod render;
pub mod scanner;
pub mod stars;
pub mod table;
pub mod transform;
pub mod types;
pub mod validate;

pub use chart_types::{ChartTable, TableRow};
pub use config::{OutputSwitches, RequestContext};
pub use parser::{Chart, parse_chart};
pub use table::build_table;

/// Parse `text` and build its table for `reference_year`, taking the
/// birth year from the chart's own 陽曆 line.
pub fn interpret(text: &str, reference_year: i32, switches: &OutputSwitches) -> ChartTable {
    let chart = parse_chart(text);
    let ctx = RequestContext::new(reference_year).with_birth_year(chart.birth_year);
    build_table(&chart, &ctx, switches)
}
