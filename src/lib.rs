//! SegmentForge: customer segmentation from retail transactions
//!
//! Collapses transactions into per-customer RFM and diversity metrics,
//! standardizes them, clusters customers with K-Means, labels each cluster
//! with a persona and summarises the result as a business report.

pub mod cli;
pub mod data;
pub mod display;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod scaler;
pub mod transaction;

// Re-export public items for easier access
pub use cli::Args;
pub use data::load_transactions;
pub use error::{SegmentationError, SegmentationResult};
pub use metrics::{compute_customer_metrics, CustomerMetrics, Feature};
pub use model::{fit_kmeans, KMeansModel, SegmentationParams};
pub use pipeline::{segment_customers, try_segment_customers, Segmentation};
pub use profile::{SegmentLabel, SegmentProfile};
pub use report::{build_summary, SummaryReport};
pub use transaction::Transaction;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
