use anyhow::{Context, Result};
use certificate::{CertificateComposer, StyleConfiguration};
use certmint_cli::{assign_ids, logging, parse_rows, run_batch, BatchOptions, Manifest};
use clap::Parser;
use pdf_core::Typeface;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "certmint")]
#[command(version, about = "Stamp certificate records onto a PDF template", long_about = None)]
struct Args {
    /// Template PDF (first page is stamped)
    #[arg(short, long)]
    template: PathBuf,

    /// JSON array of rows with name, course and issueDate columns
    #[arg(short, long)]
    records: PathBuf,

    /// Percentage style configuration (JSON); legacy layout when omitted
    #[arg(short, long)]
    style: Option<PathBuf>,

    /// TrueType font to draw with instead of Helvetica-Bold
    #[arg(long)]
    font: Option<PathBuf>,

    /// Root of the verification site
    #[arg(long, env = "CERTMINT_BASE_URL")]
    base_url: Option<String>,

    /// Output directory
    #[arg(short, long, default_value = "certificates")]
    out_dir: PathBuf,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init_subscriber(args.log_json) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(manifest) if manifest.failed.is_empty() => ExitCode::SUCCESS,
        Ok(manifest) => {
            error!(failed = manifest.failed.len(), "Some certificates failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<Manifest> {
    let template = read(&args.template)?;
    let rows = parse_rows(read(&args.records)?)
        .with_context(|| format!("Invalid records in {}", args.records.display()))?;

    let style = match &args.style {
        Some(path) => {
            let style = StyleConfiguration::from_slice(&read(path)?)
                .with_context(|| format!("Invalid style configuration in {}", path.display()))?;
            Some(style)
        }
        None => None,
    };

    let composer = match &args.font {
        Some(path) => {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "EmbeddedFont".to_string());
            let typeface = Typeface::from_ttf(&name, &read(path)?)
                .with_context(|| format!("Invalid font {}", path.display()))?;
            info!(font = %name, "Using embedded TrueType font");
            CertificateComposer::new(Arc::new(typeface))
        }
        None => CertificateComposer::default(),
    };

    let records = assign_ids(rows)?;
    let options = BatchOptions {
        out_dir: args.out_dir,
        base_address: args.base_url,
    };

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        pool = pool.num_threads(jobs);
    }
    let pool = pool.build().context("Failed to start worker pool")?;

    pool.install(|| run_batch(&composer, &template, &records, style.as_ref(), &options))
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
