//! Command-line interface definitions and argument parsing

use clap::Parser;

use crate::model::SegmentationParams;

/// Customer segmentation CLI: RFM and diversity features, K-Means, persona labels
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input transactions CSV file
    #[arg(short, long, default_value = "transactions.csv")]
    pub input: String,

    /// Number of customer segments
    #[arg(short = 'k', long, default_value = "5")]
    pub clusters: usize,

    /// Random seed for centroid initialisation
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Maximum iterations for K-Means algorithm
    #[arg(long, default_value = "300")]
    pub max_iters: u64,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Number of independent K-Means initialisations
    #[arg(long, default_value = "10")]
    pub n_runs: usize,

    /// Write the summary report as JSON to this path
    #[arg(long)]
    pub report_json: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Validate the clustering options
    pub fn segmentation_params(&self) -> crate::Result<SegmentationParams> {
        if self.clusters == 0 {
            anyhow::bail!("Number of clusters must be at least 1");
        }
        if self.n_runs == 0 {
            anyhow::bail!("Number of K-Means runs must be at least 1");
        }
        if self.max_iters == 0 {
            anyhow::bail!("Maximum iterations must be at least 1");
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            anyhow::bail!("Tolerance must be a positive number, got {}", self.tolerance);
        }

        Ok(SegmentationParams {
            n_clusters: self.clusters,
            seed: self.seed,
            max_iters: self.max_iters,
            tolerance: self.tolerance,
            n_runs: self.n_runs,
        })
    }

    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
