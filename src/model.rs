//! K-Means segmentation of normalized customer features

use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use log::debug;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use crate::error::{SegmentationError, SegmentationResult};

/// Tunables for a segmentation run
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationParams {
    /// Target cluster count
    pub n_clusters: usize,
    /// Seed for centroid initialisation
    pub seed: u64,
    pub max_iters: u64,
    pub tolerance: f64,
    /// Independent initialisations; the lowest-inertia run is kept
    pub n_runs: usize,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            seed: 42,
            max_iters: 300,
            tolerance: 1e-4,
            n_runs: 10,
        }
    }
}

impl SegmentationParams {
    pub fn with_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Fitted clustering of the customer table
#[derive(Debug, Clone)]
pub struct KMeansModel {
    pub n_clusters: usize,
    /// Cluster id per input row, in input row order
    pub labels: Array1<usize>,
    /// Cluster centroids in normalized space
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares
    pub inertia: f64,
}

impl KMeansModel {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in self.labels.iter() {
            if label < self.n_clusters {
                sizes[label] += 1;
            }
        }
        sizes
    }
}

/// Partition the rows of `features` into `params.n_clusters` clusters.
///
/// Runs k-means++ initialised Lloyd iterations `params.n_runs` times from a
/// generator seeded with `params.seed` and keeps the run with the lowest
/// inertia, so identical inputs always give identical assignments.
pub fn fit_kmeans(
    features: &Array2<f64>,
    params: &SegmentationParams,
) -> SegmentationResult<KMeansModel> {
    let n_samples = features.nrows();
    if params.n_clusters == 0 || params.n_clusters > n_samples {
        return Err(SegmentationError::InvalidClusterCount {
            clusters: params.n_clusters,
            customers: n_samples,
        });
    }

    let targets: Array1<usize> = Array1::zeros(n_samples);
    let dataset = Dataset::new(features.clone(), targets);

    let rng = Pcg64Mcg::seed_from_u64(params.seed);
    let model = KMeans::params_with(params.n_clusters, rng, L2Dist)
        .max_n_iterations(params.max_iters)
        .tolerance(params.tolerance)
        .n_runs(params.n_runs)
        .fit(&dataset)
        .map_err(|e| SegmentationError::Clustering(e.to_string()))?;

    let labels: Array1<usize> = model.predict(&dataset);
    let centroids = model.centroids().clone();
    let inertia = compute_inertia(features, &labels, &centroids);

    debug!(
        "K-Means fitted: k={}, runs={}, inertia={:.4}",
        params.n_clusters, params.n_runs, inertia
    );

    Ok(KMeansModel {
        n_clusters: params.n_clusters,
        labels,
        centroids,
        inertia,
    })
}

/// Within-cluster sum of squared Euclidean distances
fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    labels
        .iter()
        .enumerate()
        .filter(|(_, cluster)| **cluster < centroids.nrows())
        .map(|(i, &cluster)| {
            features
                .row(i)
                .iter()
                .zip(centroids.row(cluster).iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
        })
        .sum()
}
