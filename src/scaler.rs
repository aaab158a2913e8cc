//! Feature matrix construction and standard scaling

use ndarray::{Array1, Array2, Axis};

use crate::metrics::{CustomerMetrics, Feature};

/// Column-wise standardization to zero mean and unit variance
#[derive(Debug, Clone)]
pub struct StandardScaler {
    pub means: Array1<f64>,
    /// Population standard deviation of each column
    pub stds: Array1<f64>,
}

impl StandardScaler {
    /// Learn per-column mean and standard deviation from `data`
    pub fn fit(data: &Array2<f64>) -> Self {
        let n_features = data.ncols();
        if data.nrows() == 0 {
            return Self {
                means: Array1::zeros(n_features),
                stds: Array1::ones(n_features),
            };
        }

        let means = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(n_features));
        let stds = data.std_axis(Axis(0), 0.0);

        Self { means, stds }
    }

    /// Rescale `data`; zero-variance columns collapse to 0.0
    pub fn transform(&self, mut data: Array2<f64>) -> Array2<f64> {
        for (j, mut column) in data.axis_iter_mut(Axis(1)).enumerate() {
            let mean = self.means[j];
            let std = self.stds[j];
            if std > f64::EPSILON {
                column.mapv_inplace(|x| (x - mean) / std);
            } else {
                column.fill(0.0);
            }
        }
        data
    }

    pub fn fit_transform(data: Array2<f64>) -> (Self, Array2<f64>) {
        let scaler = Self::fit(&data);
        let scaled = scaler.transform(data);
        (scaler, scaled)
    }
}

/// Raw clustering features, one row per customer in input order
pub fn feature_matrix(customers: &[CustomerMetrics]) -> Array2<f64> {
    Array2::from_shape_fn((customers.len(), Feature::COUNT), |(i, j)| {
        Feature::ALL[j].value(&customers[i])
    })
}

/// Normalized clustering features for the customer table
pub fn normalized_features(customers: &[CustomerMetrics]) -> Array2<f64> {
    let (_, scaled) = StandardScaler::fit_transform(feature_matrix(customers));
    scaled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute_customer_metrics;
    use crate::metrics::tests::sample_transactions;
    use ndarray::array;

    #[test]
    fn test_columns_have_zero_mean_unit_variance() {
        let data = array![[1.0, 10.0], [2.0, 20.0], [3.0, 60.0], [6.0, 30.0]];
        let (_, scaled) = StandardScaler::fit_transform(data);

        for column in scaled.axis_iter(Axis(1)) {
            let mean = column.mean().unwrap();
            let std = column.std(0.0);
            assert!(mean.abs() < 1e-9);
            assert!((std - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_variance_column_becomes_zero() {
        let data = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(data);

        assert_eq!(scaler.stds[0], 0.0);
        assert!(scaled.column(0).iter().all(|&x| x == 0.0));
        assert!(scaled.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_row_and_column_order_preserved() {
        let data = array![[1.0, 100.0], [3.0, 50.0], [2.0, 75.0]];
        let (_, scaled) = StandardScaler::fit_transform(data);

        assert!(scaled[[0, 0]] < scaled[[2, 0]] && scaled[[2, 0]] < scaled[[1, 0]]);
        assert!(scaled[[1, 1]] < scaled[[2, 1]] && scaled[[2, 1]] < scaled[[0, 1]]);
    }

    #[test]
    fn test_feature_matrix_shape_and_values() {
        let customers = compute_customer_metrics(&sample_transactions()).unwrap();
        let matrix = feature_matrix(&customers);

        assert_eq!(matrix.shape(), &[3, Feature::COUNT]);
        for (i, customer) in customers.iter().enumerate() {
            assert_eq!(matrix[[i, Feature::TotalSpend.index()]], customer.total_spend);
            assert_eq!(matrix[[i, Feature::Recency.index()]], customer.recency as f64);
        }
    }

    #[test]
    fn test_single_customer_normalizes_to_zeros() {
        let data = array![[4.0, 2.0, 9.0]];
        let (_, scaled) = StandardScaler::fit_transform(data);
        assert!(scaled.iter().all(|&x| x == 0.0));
    }
}
