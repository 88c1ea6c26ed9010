// Entry point and high-level CLI flow.
//
// - Option [1] loads the current-period CSV.
// - Option [2] loads the baseline-month CSV.
// - Option [3] aggregates both, rescales the baseline to a weekly
//   equivalent, prints the comparison and writes CSV/JSON outputs.
// After a comparison the user can go back to the menu or exit.
use anyhow::Result;
use clap::Parser;
use kpi_engine::types::Row;
use kpi_engine::{aggregate_with, compare, loader, output, reports, util, EngineConfig};
use once_cell::sync::Lazy;
use std::io::{self, BufRead, Write};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kpi-report")]
#[command(about = "Compare a period's sales/labor KPIs against a weekly-normalized baseline")]
struct Args {
    /// CSV with the current period's rows
    #[arg(long, default_value = "current_period.csv")]
    current: PathBuf,

    /// CSV with the baseline month's rows
    #[arg(long, default_value = "baseline_month.csv")]
    baseline: PathBuf,

    /// JSON engine config (alias table, baseline weeks)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Weeks the baseline spans; overrides the config file
    #[arg(long)]
    baseline_weeks: Option<NonZeroU32>,

    /// Directory for kpi_comparison.csv and kpi_summary.json
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

// Loaded rows survive across menu choices so files are read once.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        current: None,
        baseline: None,
    })
});

struct AppState {
    current: Option<Vec<Row>>,
    baseline: Option<Vec<Row>>,
}

#[derive(Clone, Copy)]
enum Period {
    Current,
    Baseline,
}

/// Print `prompt` and read one trimmed line. `None` once input is closed
/// or unreadable.
fn read_line<R: BufRead>(input: &mut R, prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_choice<R: BufRead>(input: &mut R) -> Option<String> {
    read_line(input, "Enter choice: ")
}

/// Returns `true` if the user chose `Y`; `false` on `N` or closed input.
fn prompt_back_to_menu<R: BufRead>(input: &mut R) -> bool {
    loop {
        let Some(resp) = read_line(input, "Back to Menu (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load(path: &Path, period: Period, config: &EngineConfig) {
    match loader::load_rows(path, &config.aliases) {
        Ok((rows, report)) => {
            println!(
                "Loaded {} ({} rows read, {} usable)",
                path.display(),
                util::format_int(report.total_rows),
                util::format_int(report.loaded_rows)
            );
            if report.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to parse errors.",
                    util::format_int(report.parse_errors)
                );
            }
            if !report.unmatched_headers.is_empty() {
                println!("Ignored columns: {}", report.unmatched_headers.join(", "));
            }
            println!();
            let mut state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
            match period {
                Period::Current => state.current = Some(rows),
                Period::Baseline => state.baseline = Some(rows),
            }
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "load failed");
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Aggregate, normalize the baseline once, compare and write outputs.
fn handle_compare(config: &EngineConfig, out_dir: &Path) {
    let (current, baseline) = {
        let state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
        (state.current.clone(), state.baseline.clone())
    };
    let (Some(current), Some(baseline)) = (current, baseline) else {
        println!("Error: load both the current period (1) and the baseline (2) first.\n");
        return;
    };

    let current_kpis = aggregate_with(&current, &config.aliases);
    let baseline_month = aggregate_with(&baseline, &config.aliases);
    let baseline_weekly = config.normalizer().normalize(&baseline_month);
    for (name, m) in [("current", &current_kpis), ("baseline", &baseline_weekly)] {
        if m.labor_pct.is_none() {
            warn!(period = name, "no labor data; labor % will be blank");
        }
    }

    let rows = reports::comparison_rows(&compare(&current_kpis, &baseline_weekly));
    println!("KPI Comparison (baseline month / {} weeks)\n", config.baseline_weeks);
    output::preview_table_rows(&rows, rows.len());

    let csv_path = out_dir.join("kpi_comparison.csv");
    if let Err(e) = output::write_csv(&csv_path, &rows) {
        eprintln!("Write error: {}", e);
    } else {
        println!("(Table exported to {})", csv_path.display());
    }

    let summary = reports::generate_summary(
        current_kpis,
        baseline_weekly,
        config.baseline_weeks,
        config.aliases.version,
        current.len(),
        baseline.len(),
    );
    let json_path = out_dir.join("kpi_summary.json");
    if let Err(e) = output::write_json(&json_path, &summary) {
        eprintln!("Write error: {}", e);
    } else {
        println!("(Summary written to {})\n", json_path.display());
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(weeks) = args.baseline_weeks {
        config.baseline_weeks = weeks;
    }
    info!(weeks = config.baseline_weeks.get(), "kpi-report starting");

    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        println!("Select an action:");
        println!("[1] Load current period ({})", args.current.display());
        println!("[2] Load baseline month ({})", args.baseline.display());
        println!("[3] Generate KPI comparison\n");
        let Some(choice) = read_choice(&mut input) else {
            println!("\nInput closed. Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&args.current, Period::Current, &config),
            "2" => handle_load(&args.baseline, Period::Baseline, &config),
            "3" => {
                println!();
                handle_compare(&config, &args.out_dir);
                if !prompt_back_to_menu(&mut input) {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
    Ok(())
}
