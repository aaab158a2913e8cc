//! Business summary of a labeled customer table

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{SegmentationError, SegmentationResult};
use crate::metrics::CustomerMetrics;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub size: usize,
    pub percentage: f64,
    pub revenue: f64,
    pub revenue_percentage: f64,
    pub avg_customer_value: f64,
    pub avg_basket_size: f64,
    pub avg_frequency: f64,
    pub avg_recency: f64,
    pub avg_brand_diversity: f64,
    pub avg_category_diversity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub total_customers: usize,
    pub total_revenue: f64,
    pub avg_customer_value: f64,
    /// Keyed by persona label
    pub segments: BTreeMap<String, SegmentSummary>,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean_of<F>(members: &[&CustomerMetrics], f: F) -> f64
where
    F: Fn(&CustomerMetrics) -> f64,
{
    members.iter().map(|c| f(c)).sum::<f64>() / members.len() as f64
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Build the summary report. Every customer must carry a segment label.
pub fn build_summary(customers: &[CustomerMetrics]) -> SegmentationResult<SummaryReport> {
    if customers.is_empty() {
        return Err(SegmentationError::EmptyInput);
    }

    let mut by_label: BTreeMap<String, Vec<&CustomerMetrics>> = BTreeMap::new();
    for customer in customers {
        let label = customer
            .segment_label
            .ok_or_else(|| SegmentationError::UnlabeledCustomer {
                customer_id: customer.customer_id.clone(),
            })?;
        by_label
            .entry(label.to_string())
            .or_default()
            .push(customer);
    }

    let total_customers = customers.len();
    let total_revenue: f64 = customers.iter().map(|c| c.total_spend).sum();

    let segments = by_label
        .into_iter()
        .map(|(label, members)| {
            let revenue: f64 = members.iter().map(|c| c.total_spend).sum();
            let summary = SegmentSummary {
                size: members.len(),
                percentage: round2(percent(members.len() as f64, total_customers as f64)),
                revenue: round2(revenue),
                revenue_percentage: round2(percent(revenue, total_revenue)),
                avg_customer_value: round2(mean_of(&members, |c| c.total_spend)),
                avg_basket_size: round2(mean_of(&members, |c| c.avg_basket_size)),
                avg_frequency: round2(mean_of(&members, |c| c.frequency as f64)),
                avg_recency: round2(mean_of(&members, |c| c.recency as f64)),
                avg_brand_diversity: round2(mean_of(&members, |c| c.brand_diversity)),
                avg_category_diversity: round2(mean_of(&members, |c| c.category_diversity)),
            };
            (label, summary)
        })
        .collect();

    Ok(SummaryReport {
        total_customers,
        total_revenue: round2(total_revenue),
        avg_customer_value: round2(total_revenue / total_customers as f64),
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SegmentLabel;

    fn labeled(id: &str, label: SegmentLabel, spend: f64, frequency: usize, recency: i64) -> CustomerMetrics {
        CustomerMetrics {
            customer_id: id.to_string(),
            recency,
            frequency,
            total_items: frequency as u64 * 2,
            total_spend: spend,
            unique_brands: 2,
            unique_categories: 1,
            unique_retailers: 1,
            unique_stores: 1,
            payment_methods: 1,
            avg_basket_size: spend / frequency as f64,
            avg_item_value: spend / (frequency as f64 * 2.0),
            brand_diversity: 2.0 / frequency as f64,
            category_diversity: 1.0 / frequency as f64,
            segment: Some(0),
            segment_label: Some(label),
        }
    }

    fn customers() -> Vec<CustomerMetrics> {
        vec![
            labeled("a", SegmentLabel::BrandLoyalVip, 1000.0, 10, 2),
            labeled("b", SegmentLabel::BrandLoyalVip, 800.0, 8, 4),
            labeled("c", SegmentLabel::NewCustomer, 33.33, 1, 3),
            labeled("d", SegmentLabel::OccasionalShopper, 20.0, 2, 90),
            labeled("e", SegmentLabel::OccasionalShopper, 10.0, 1, 120),
            labeled("f", SegmentLabel::OccasionalShopper, 12.5, 1, 60),
        ]
    }

    #[test]
    fn test_totals() {
        let report = build_summary(&customers()).unwrap();
        assert_eq!(report.total_customers, 6);
        assert!((report.total_revenue - 1875.83).abs() < 1e-9);
        assert!((report.avg_customer_value - 312.64).abs() < 1e-9);
        assert_eq!(report.segments.len(), 3);
    }

    #[test]
    fn test_segment_block() {
        let report = build_summary(&customers()).unwrap();
        let vip = &report.segments["Brand Loyal VIP"];

        assert_eq!(vip.size, 2);
        assert_eq!(vip.percentage, 33.33);
        assert_eq!(vip.revenue, 1800.0);
        assert_eq!(vip.revenue_percentage, 95.96);
        assert_eq!(vip.avg_customer_value, 900.0);
        assert_eq!(vip.avg_basket_size, 100.0);
        assert_eq!(vip.avg_frequency, 9.0);
        assert_eq!(vip.avg_recency, 3.0);
        assert_eq!(vip.avg_category_diversity, 0.11);
    }

    #[test]
    fn test_percentages_and_revenue_add_up() {
        let report = build_summary(&customers()).unwrap();
        let pct: f64 = report.segments.values().map(|s| s.percentage).sum();
        let rev_pct: f64 = report.segments.values().map(|s| s.revenue_percentage).sum();
        let revenue: f64 = report.segments.values().map(|s| s.revenue).sum();
        let size: usize = report.segments.values().map(|s| s.size).sum();

        assert!((pct - 100.0).abs() < 0.05);
        assert!((rev_pct - 100.0).abs() < 0.05);
        assert!((revenue - report.total_revenue).abs() < 0.05);
        assert_eq!(size, report.total_customers);
    }

    #[test]
    fn test_unlabeled_customer_is_rejected() {
        let mut rows = customers();
        rows[2].segment_label = None;
        assert!(matches!(
            build_summary(&rows),
            Err(SegmentationError::UnlabeledCustomer { .. })
        ));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        assert!(matches!(build_summary(&[]), Err(SegmentationError::EmptyInput)));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(2.344), 2.34);
        assert_eq!(round2(-3.456), -3.46);
    }

    #[test]
    fn test_serializes_to_json() {
        let report = build_summary(&customers()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_customers"], 6);
        assert_eq!(json["segments"]["New Customer"]["size"], 1);
    }
}
