use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ziwei_chart::calendar::parse_month_stems;
use ziwei_chart::error::{CliError, Result};
use ziwei_chart::parser::{CenterInfo, Chart};
use ziwei_chart::render::to_markdown;
use ziwei_chart::scanner::scan_charts;
use ziwei_chart::types::Stem;
use ziwei_chart::validate::{Diagnostic, log_diagnostics, validate};
use ziwei_chart::{ChartTable, OutputSwitches, RequestContext, build_table, parse_chart};

const OUTPUT_DIR: &str = "output";

#[derive(Parser)]
#[command(
    name = "ziwei_chart",
    about = "Zi Wei Dou Shu chart interpreter: natal, decade, annual and monthly 四化 tables"
)]
struct Cli {
    /// Verbosity: -v info, -vv debug, -vvv trace (default warn, or RUST_LOG)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interpret one chart text and print its table
    Render {
        /// Chart text file, or "-" for stdin
        input: PathBuf,
        #[command(flatten)]
        opts: RenderOpts,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
    },
    /// Report structural problems in a chart text
    Validate {
        /// Chart text file, or "-" for stdin
        input: PathBuf,
    },
    /// Interpret every .txt chart under a directory → output/<name>.{json,md}
    Batch {
        #[arg(default_value = ".")]
        dir: PathBuf,
        #[command(flatten)]
        opts: RenderOpts,
    },
}

#[derive(clap::Args)]
struct RenderOpts {
    /// Reference year for the annual and monthly cycles (default: current year)
    #[arg(long)]
    year: Option<i32>,
    /// JSON file of output-row switches; omitted switches stay on
    #[arg(long)]
    switches: Option<PathBuf>,
    /// Twelve month stems for the reference year, e.g. "戊己庚辛壬癸甲乙丙丁戊己"
    #[arg(long)]
    month_stems: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Render {
            input,
            opts,
            format,
        } => run_render(&input, &opts, format),
        Command::Validate { input } => run_validate(&input),
        Command::Batch { dir, opts } => run_batch(&dir, &opts),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  INPUT / OPTION HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(CliError::Stdin)?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_switches(path: Option<&Path>) -> Result<OutputSwitches> {
    let Some(path) = path else {
        return Ok(OutputSwitches::default());
    };
    let json = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| CliError::Switches {
        path: path.to_path_buf(),
        source,
    })
}

/// Options shared by `render` and `batch`, resolved once.
struct Resolved {
    reference_year: i32,
    switches: OutputSwitches,
    month_stems: Option<[Stem; 12]>,
}

impl RenderOpts {
    fn resolve(&self) -> Result<Resolved> {
        let reference_year = self.year.unwrap_or_else(|| chrono::Local::now().year());
        let month_stems = match &self.month_stems {
            Some(s) => Some(parse_month_stems(s).ok_or_else(|| CliError::MonthStems(s.clone()))?),
            None => None,
        };
        Ok(Resolved {
            reference_year,
            switches: load_switches(self.switches.as_deref())?,
            month_stems,
        })
    }
}

impl Resolved {
    fn context(&self, chart: &Chart) -> RequestContext {
        RequestContext::new(self.reference_year)
            .with_birth_year(chart.birth_year)
            .with_month_stems(self.month_stems)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  REPORT: what JSON output carries alongside the table
// ═══════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct ChartReport<'a> {
    reference_year: i32,
    birth_year: Option<i32>,
    center: &'a CenterInfo,
    table: &'a ChartTable,
    diagnostics: &'a [Diagnostic],
}

fn interpret(chart: &Chart, opts: &Resolved) -> (ChartTable, Vec<Diagnostic>) {
    let diagnostics = validate(chart);
    log_diagnostics(&diagnostics);
    let table = build_table(chart, &opts.context(chart), &opts.switches);
    debug!(
        columns = table.columns.len(),
        rows = table.rows.len(),
        "table built"
    );
    (table, diagnostics)
}

fn report_json(chart: &Chart, opts: &Resolved, table: &ChartTable, diagnostics: &[Diagnostic]) -> Result<String> {
    let report = ChartReport {
        reference_year: opts.reference_year,
        birth_year: chart.birth_year,
        center: &chart.center,
        table,
        diagnostics,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

// ═══════════════════════════════════════════════════════════════════════
//  RENDER MODE
// ═══════════════════════════════════════════════════════════════════════

fn run_render(input: &Path, opts: &RenderOpts, format: Format) -> Result<()> {
    let opts = opts.resolve()?;
    let chart = parse_chart(&read_input(input)?);
    let (table, diagnostics) = interpret(&chart, &opts);

    match format {
        Format::Markdown => println!("{}", to_markdown(&table)),
        Format::Json => println!("{}", report_json(&chart, &opts, &table, &diagnostics)?),
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  VALIDATE MODE
// ═══════════════════════════════════════════════════════════════════════

fn run_validate(input: &Path) -> Result<()> {
    let chart = parse_chart(&read_input(input)?);
    let diagnostics = validate(&chart);

    eprintln!(
        "{} palace columns, birth year {}, birth stem {}",
        chart.registry.len(),
        chart.birth_year.map_or("?".to_string(), |y| y.to_string()),
        chart.birth_stem.map_or("?".to_string(), |s| s.to_string()),
    );
    if diagnostics.is_empty() {
        println!("ok");
    }
    for d in &diagnostics {
        println!("{d}");
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  BATCH MODE: every chart under a directory → output/
// ═══════════════════════════════════════════════════════════════════════

fn write_output(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    eprintln!("  {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

fn run_batch(dir: &Path, opts: &RenderOpts) -> Result<()> {
    let opts = opts.resolve()?;
    let out_dir = dir.join(OUTPUT_DIR);
    std::fs::create_dir_all(&out_dir).map_err(|source| CliError::Write {
        path: out_dir.clone(),
        source,
    })?;

    let files = scan_charts(dir);
    info!(count = files.len(), dir = %dir.display(), "charts found");

    let mut flagged = 0usize;
    for file in &files {
        let chart = parse_chart(&read_input(&file.path)?);
        let (table, diagnostics) = interpret(&chart, &opts);
        if !diagnostics.is_empty() {
            flagged += 1;
        }

        let json = report_json(&chart, &opts, &table, &diagnostics)?;
        write_output(&out_dir.join(format!("{}.json", file.name)), &json)?;
        write_output(&out_dir.join(format!("{}.md", file.name)), &to_markdown(&table))?;
    }

    eprintln!(
        "\n{} charts interpreted for {}, {} with diagnostics",
        files.len(),
        opts.reference_year,
        flagged
    );
    Ok(())
}
