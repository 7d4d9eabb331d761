use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use ecom_dashboard::filter::parse_date;
use ecom_dashboard::{config, Dashboard, Dataset, DateBounds};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    /// Every panel
    Standard,
    /// Payments, reviews, top products, top cities
    Classic,
}

#[derive(Parser)]
#[command(name = "ecom-dashboard")]
#[command(about = "KPIs and chart data for an e-commerce transaction file")]
struct Args {
    /// Transaction file (default: $ECOM_DASHBOARD_DATA or ./all_data.csv)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Date bound (YYYY-MM-DD); give twice for an inclusive range, otherwise all rows are shown
    #[arg(long = "date")]
    dates: Vec<String>,

    /// Panel layout
    #[arg(long, value_enum, default_value = "standard")]
    layout: Layout,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Failed to build dashboard: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> ecom_dashboard::Result<()> {
    let path = args.data.unwrap_or_else(config::default_data_path);
    info!(path = %path.display(), "loading dataset");
    let dataset = Dataset::load(&path)?;

    if let Some(span) = dataset.date_span()? {
        info!(min = %span.min, max = %span.max, "available purchase dates");
    }

    let parsed: Option<Vec<_>> = args.dates.iter().map(|d| parse_date(d)).collect();
    let bounds = match parsed {
        Some(dates) => DateBounds::from_selection(&dates),
        None => {
            warn!(dates = ?args.dates, "malformed date; showing all rows");
            None
        }
    };

    let dashboard = match args.layout {
        Layout::Standard => Dashboard::standard(),
        Layout::Classic => Dashboard::classic(),
    };
    let report = dashboard.render(&dataset, bounds)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }
    Ok(())
}
