//! Per-customer RFM and diversity metrics

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use log::debug;
use serde::Serialize;

use crate::error::{SegmentationError, SegmentationResult};
use crate::profile::SegmentLabel;
use crate::transaction::Transaction;

/// One row of the customer table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerMetrics {
    pub customer_id: String,
    /// Whole days between the dataset's latest transaction and this customer's latest
    pub recency: i64,
    /// Distinct baskets
    pub frequency: usize,
    pub total_items: u64,
    pub total_spend: f64,
    pub unique_brands: usize,
    pub unique_categories: usize,
    pub unique_retailers: usize,
    pub unique_stores: usize,
    pub payment_methods: usize,
    pub avg_basket_size: f64,
    pub avg_item_value: f64,
    pub brand_diversity: f64,
    pub category_diversity: f64,
    pub segment: Option<usize>,
    pub segment_label: Option<SegmentLabel>,
}

impl CustomerMetrics {
    pub fn with_segment(mut self, segment: usize) -> Self {
        self.segment = Some(segment);
        self
    }

    pub fn with_label(mut self, label: SegmentLabel) -> Self {
        self.segment_label = Some(label);
        self
    }

    pub fn feature(&self, feature: Feature) -> f64 {
        feature.value(self)
    }
}

/// The nine features used for clustering and profiling, in matrix column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Recency,
    Frequency,
    TotalSpend,
    TotalItems,
    UniqueBrands,
    UniqueCategories,
    AvgBasketSize,
    BrandDiversity,
    CategoryDiversity,
}

impl Feature {
    pub const ALL: [Feature; 9] = [
        Feature::Recency,
        Feature::Frequency,
        Feature::TotalSpend,
        Feature::TotalItems,
        Feature::UniqueBrands,
        Feature::UniqueCategories,
        Feature::AvgBasketSize,
        Feature::BrandDiversity,
        Feature::CategoryDiversity,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn name(&self) -> &'static str {
        match self {
            Feature::Recency => "recency",
            Feature::Frequency => "frequency",
            Feature::TotalSpend => "total_spend",
            Feature::TotalItems => "total_items",
            Feature::UniqueBrands => "unique_brands",
            Feature::UniqueCategories => "unique_categories",
            Feature::AvgBasketSize => "avg_basket_size",
            Feature::BrandDiversity => "brand_diversity",
            Feature::CategoryDiversity => "category_diversity",
        }
    }

    /// Column position in the feature matrix
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn value(&self, customer: &CustomerMetrics) -> f64 {
        match self {
            Feature::Recency => customer.recency as f64,
            Feature::Frequency => customer.frequency as f64,
            Feature::TotalSpend => customer.total_spend,
            Feature::TotalItems => customer.total_items as f64,
            Feature::UniqueBrands => customer.unique_brands as f64,
            Feature::UniqueCategories => customer.unique_categories as f64,
            Feature::AvgBasketSize => customer.avg_basket_size,
            Feature::BrandDiversity => customer.brand_diversity,
            Feature::CategoryDiversity => customer.category_diversity,
        }
    }
}

/// Latest transaction timestamp in the whole dataset, the "today" for recency
pub fn reference_date(transactions: &[Transaction]) -> Option<NaiveDateTime> {
    transactions.iter().map(|t| t.timestamp).max()
}

#[derive(Default)]
struct Accumulator<'a> {
    last_seen: Option<NaiveDateTime>,
    baskets: HashSet<&'a str>,
    total_items: u64,
    total_spend: f64,
    brands: HashSet<&'a str>,
    categories: HashSet<&'a str>,
    retailers: HashSet<&'a str>,
    stores: HashSet<&'a str>,
    payments: HashSet<&'a str>,
}

impl<'a> Accumulator<'a> {
    fn push(&mut self, txn: &'a Transaction) {
        self.last_seen = self.last_seen.max(Some(txn.timestamp));
        self.baskets.insert(txn.basket_id.as_str());
        self.total_items += u64::from(txn.item_quantity);
        self.total_spend += txn.basket_total;

        insert_present(&mut self.brands, &txn.brand_id);
        insert_present(&mut self.categories, &txn.category_id);
        insert_present(&mut self.retailers, &txn.retailer_id);
        insert_present(&mut self.stores, &txn.store_id);
        insert_present(&mut self.payments, &txn.payment_method);
    }

    fn finish(self, customer_id: &str, reference: NaiveDateTime) -> CustomerMetrics {
        // Only reachable for groups holding at least one transaction.
        let last_seen = self.last_seen.unwrap_or(reference);
        let frequency = self.baskets.len();
        let unique_brands = self.brands.len();
        let unique_categories = self.categories.len();

        CustomerMetrics {
            customer_id: customer_id.to_string(),
            recency: (reference - last_seen).num_days(),
            frequency,
            total_items: self.total_items,
            total_spend: self.total_spend,
            unique_brands,
            unique_categories,
            unique_retailers: self.retailers.len(),
            unique_stores: self.stores.len(),
            payment_methods: self.payments.len(),
            avg_basket_size: self.total_spend / frequency as f64,
            avg_item_value: self.total_spend / self.total_items as f64,
            brand_diversity: unique_brands as f64 / frequency as f64,
            category_diversity: unique_categories as f64 / frequency as f64,
            segment: None,
            segment_label: None,
        }
    }
}

fn insert_present<'a>(set: &mut HashSet<&'a str>, value: &'a Option<String>) {
    if let Some(v) = value.as_deref() {
        set.insert(v);
    }
}

/// Collapse transactions into one metrics record per customer.
///
/// `reference` must be the dataset-wide latest timestamp, computed once by the
/// caller. Rows come back ordered by customer id.
pub fn aggregate_customer_metrics(
    transactions: &[Transaction],
    reference: NaiveDateTime,
) -> Vec<CustomerMetrics> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for txn in transactions {
        groups
            .entry(txn.customer_id.as_str())
            .or_default()
            .push(txn);
    }

    groups
        .into_iter()
        .map(|(customer_id, acc)| acc.finish(customer_id, reference))
        .collect()
}

/// Aggregate a cleaned transaction table, rejecting an empty one
pub fn compute_customer_metrics(
    transactions: &[Transaction],
) -> SegmentationResult<Vec<CustomerMetrics>> {
    let reference = reference_date(transactions).ok_or(SegmentationError::EmptyInput)?;
    let customers = aggregate_customer_metrics(transactions, reference);

    debug!(
        "Aggregated {} transactions into {} customers (reference date {})",
        transactions.len(),
        customers.len(),
        reference
    );

    Ok(customers)
}
