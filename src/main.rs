//! SegmentForge: customer segmentation CLI
//!
//! Loads transactions, segments customers and prints the persona report.

use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use segmentforge::{build_summary, display, load_transactions, segment_customers, Args};

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when segmentation produced no result
fn run(args: &Args) -> Result<bool> {
    let params = args.segmentation_params()?;
    let start_time = Instant::now();

    info!("Loading transactions from {}", args.input);
    let transactions = load_transactions(&args.input)?;

    let Some(segmentation) = segment_customers(&transactions, &params) else {
        println!("Segmentation failed; no report generated.");
        return Ok(false);
    };

    display::print_segment_profiles(&segmentation.profiles);

    let report = build_summary(&segmentation.customers)?;
    display::print_summary_report(&report);

    if let Some(path) = &args.report_json {
        let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .with_context(|| format!("Failed to write report to {path}"))?;
        info!("Report written to {path}");
    }

    info!(
        "Pipeline complete in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(true)
}
