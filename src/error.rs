//! Error taxonomy for the segmentation core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentationError {
    #[error("No transactions to aggregate")]
    EmptyInput,

    #[error("Cluster count {clusters} is invalid for {customers} customers")]
    InvalidClusterCount { clusters: usize, customers: usize },

    #[error("Customer '{customer_id}' has no segment assignment")]
    UnassignedCustomer { customer_id: String },

    #[error("Customer '{customer_id}' has no segment label")]
    UnlabeledCustomer { customer_id: String },

    #[error("Customer '{customer_id}' references segment {segment} which has no profile")]
    MissingSegmentProfile { customer_id: String, segment: usize },

    #[error("Clustering failed: {0}")]
    Clustering(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SegmentationResult<T> = std::result::Result<T, SegmentationError>;
