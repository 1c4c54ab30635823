//! loganalysis - access log traffic report generator
//!
//! Reads a web server access log and writes a static HTML report with:
//! - Daily hits and traffic
//! - Visitor leaderboard and status code distribution
//! - Region attribution with GeoIP

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use loganalysis::analysis::Aggregator;
use loganalysis::config;
use loganalysis::error::{GeoError, ReportError};
use loganalysis::geoip::region::RegionResolver;
use loganalysis::geoip::GeoIp;
use loganalysis::report::Report;

/// Exit status for bad arguments, unreadable input, or an existing output directory
const EXIT_INPUT: i32 = -1;
/// Exit status for GeoIP and report output failures
const EXIT_OUTPUT: i32 = -2;

#[derive(Parser, Debug)]
#[command(name = "loganalysis", version, about = "Generate a traffic report from an access log")]
struct Args {
    /// Access log to analyze
    #[arg(long)]
    path: PathBuf,

    /// Report directory to create (default: <output_root>/report_<unix time>)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Configuration file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,
}

fn main() {
    // Load .env file if present (before any other initialization)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let config = match config::Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    init_logging(&config.logging.level);

    match run(&args, &config) {
        Ok(index) => {
            info!("Report written to {}", index.display());
            println!("Success");
        }
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(exit_code(&e));
        }
    }
}

/// Initialize logging based on LOG_FORMAT env var.
/// Use LOG_FORMAT=gcp for structured GCP Cloud Logging.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "gcp" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn exit_code(e: &anyhow::Error) -> i32 {
    if e.downcast_ref::<GeoError>().is_some() {
        return EXIT_OUTPUT;
    }
    match e.downcast_ref::<ReportError>() {
        Some(ReportError::OutputExists(_)) | None => EXIT_INPUT,
        Some(_) => EXIT_OUTPUT,
    }
}

fn run(args: &Args, config: &config::Config) -> Result<PathBuf> {
    let out_dir = args.dir.clone().unwrap_or_else(|| {
        config
            .report
            .output_root
            .join(format!("report_{}", chrono::Utc::now().timestamp()))
    });
    if out_dir.exists() {
        return Err(ReportError::OutputExists(out_dir).into());
    }

    let analysis = {
        let file = open_log(&args.path)?;
        info!("Scanning {}", args.path.display());
        Aggregator::run(BufReader::new(file))
            .with_context(|| format!("failed to read `{}`", args.path.display()))?
    };

    let geoip = GeoIp::open(&config.geoip.database, &config.geoip.locale)?;
    let regions = RegionResolver::new(&geoip).attribute(analysis.visitor_counter().iter());

    let report = Report::build(&analysis, &regions);
    let index = report.write(&config.report.template_dir, &out_dir)?;
    Ok(index)
}

fn open_log(path: &Path) -> Result<File> {
    if !path.exists() {
        anyhow::bail!("path `{}` does not exist", path.display());
    }
    if path.is_dir() {
        anyhow::bail!("path `{}` cannot be a directory", path.display());
    }
    File::open(path).with_context(|| format!("cannot open `{}`", path.display()))
}
