//! End-to-end segmentation: metrics, normalization, clustering, labeling

use log::{error, info, warn};

use crate::error::{SegmentationError, SegmentationResult};
use crate::metrics::{compute_customer_metrics, CustomerMetrics};
use crate::model::{fit_kmeans, KMeansModel, SegmentationParams};
use crate::profile::{apply_labels, profile_segments, SegmentProfile};
use crate::scaler::normalized_features;
use crate::transaction::Transaction;

/// Output of a successful run: labeled customers and labeled segment profiles
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub customers: Vec<CustomerMetrics>,
    pub profiles: Vec<SegmentProfile>,
    pub model: KMeansModel,
}

/// Run the full segmentation, surfacing the first error
pub fn try_segment_customers(
    transactions: &[Transaction],
    params: &SegmentationParams,
) -> SegmentationResult<Segmentation> {
    let customers = compute_customer_metrics(transactions)?;
    info!(
        "Computed metrics for {} customers from {} transactions",
        customers.len(),
        transactions.len()
    );

    let features = normalized_features(&customers);
    let model = fit_kmeans(&features, params)?;
    info!(
        "Clustered customers into {} segments (inertia {:.2})",
        model.n_clusters, model.inertia
    );

    // Row i of the feature matrix is customer i.
    let customers: Vec<CustomerMetrics> = customers
        .into_iter()
        .zip(model.labels.iter())
        .map(|(customer, &segment)| customer.with_segment(segment))
        .collect();

    let profiles = profile_segments(&customers)?;
    let customers = apply_labels(customers, &profiles)?;

    for profile in &profiles {
        info!(
            "Segment {} -> {} ({} customers)",
            profile.segment(),
            profile.label,
            profile.stats.size
        );
    }

    Ok(Segmentation {
        customers,
        profiles,
        model,
    })
}

/// Segmentation boundary: any failure is logged and reported as `None`,
/// never as a partial table.
pub fn segment_customers(
    transactions: &[Transaction],
    params: &SegmentationParams,
) -> Option<Segmentation> {
    match try_segment_customers(transactions, params) {
        Ok(segmentation) => Some(segmentation),
        Err(SegmentationError::EmptyInput) => {
            warn!("No valid transactions to segment");
            None
        }
        Err(err) => {
            error!("Customer segmentation failed: {err}");
            None
        }
    }
}
