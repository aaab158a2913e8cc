//! Integration tests for SegmentForge

use std::collections::HashSet;
use std::io::Write;

use segmentforge::{
    build_summary, compute_customer_metrics, load_transactions, segment_customers,
    SegmentationParams,
};
use tempfile::NamedTempFile;

const HEADER: &str = "customer_id,transaction_date,basket_id,item_quantity,basket_total,brand_id,category_id,retailer_id,store_id,payment_method";

/// Create a test CSV file with sample data
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();

    // 501 - frequent, recent, many brands
    writeln!(file, "501,2024-03-01 09:00:00,B01,3,120.00,acme,food,r1,s1,card").unwrap();
    writeln!(file, "501,2024-03-08 09:00:00,B02,2,95.50,zen,drinks,r1,s1,card").unwrap();
    writeln!(file, "501,2024-03-15 09:00:00,B03,5,210.00,nova,home,r2,s4,wallet").unwrap();
    writeln!(file, "501,2024-03-29 09:00:00,B04,1,40.00,acme,food,r1,s1,card").unwrap();

    // 502 - big spender, single brand
    writeln!(file, "502,2024-03-20 12:00:00,B05,10,900.00,luxe,fashion,r3,s9,card").unwrap();
    writeln!(file, "502,2024-03-27 12:00:00,B06,8,750.00,luxe,fashion,r3,s9,card").unwrap();

    // 503, 504 - one small basket long ago
    writeln!(file, "503,2024-01-05,B07,1,12.00,acme,food,r1,s2,cash").unwrap();
    writeln!(file, "504,2024-01-09,B08,2,15.00,zen,drinks,r2,s3,cash").unwrap();

    // 505 - recent newcomer
    writeln!(file, "505,2024-03-30T17:45:00,B09,2,35.00,nova,home,r2,s4,card").unwrap();

    // 506 - moderate regular
    writeln!(file, "506,2024-02-10 08:00:00,B10,2,30.00,acme,food,r1,s1,card").unwrap();
    writeln!(file, "506,2024-03-10 08:00:00,B11,3,45.00,acme,food,r1,s1,card").unwrap();
    writeln!(file, "506,2024-03-25 08:00:00,B12,1,20.00,zen,food,r1,s1,card").unwrap();

    // Rows that must be cleaned away
    writeln!(file, ",2024-03-25 08:00:00,B13,1,20.00,zen,food,r1,s1,card").unwrap();
    writeln!(file, "507,,B14,1,20.00,zen,food,r1,s1,card").unwrap();
    writeln!(file, "508,2024-03-25 08:00:00,B15,1,,zen,food,r1,s1,card").unwrap();

    file
}

fn params(k: usize) -> SegmentationParams {
    SegmentationParams::default().with_clusters(k)
}

#[test]
fn test_end_to_end_pipeline() {
    let test_file = create_test_csv();
    let file_path = test_file.path().to_str().unwrap();

    let transactions = load_transactions(file_path).unwrap();
    assert_eq!(transactions.len(), 12);

    let segmentation = segment_customers(&transactions, &params(3)).unwrap();

    // One labeled record per customer, all in range
    assert_eq!(segmentation.customers.len(), 6);
    for customer in &segmentation.customers {
        assert!(customer.segment.unwrap() < 3);
        assert!(customer.segment_label.is_some());
        assert!(customer.frequency >= 1);
        assert!(customer.total_items >= 1);
        assert!(customer.recency >= 0);
    }

    // Exactly one profile per populated cluster
    let populated: HashSet<usize> = segmentation
        .customers
        .iter()
        .filter_map(|c| c.segment)
        .collect();
    assert_eq!(segmentation.profiles.len(), populated.len());
    let profiled: HashSet<usize> = segmentation.profiles.iter().map(|p| p.segment()).collect();
    assert_eq!(profiled, populated);

    let sizes: usize = segmentation.profiles.iter().map(|p| p.stats.size).sum();
    assert_eq!(sizes, 6);
}

#[test]
fn test_revenue_is_preserved() {
    let test_file = create_test_csv();
    let transactions = load_transactions(test_file.path().to_str().unwrap()).unwrap();

    let customers = compute_customer_metrics(&transactions).unwrap();
    let input: f64 = transactions.iter().map(|t| t.basket_total).sum();
    let aggregated: f64 = customers.iter().map(|c| c.total_spend).sum();
    assert!((input - aggregated).abs() < 1e-6);

    let latest = customers.iter().find(|c| c.customer_id == "505").unwrap();
    assert_eq!(latest.recency, 0);
    let oldest = customers.iter().find(|c| c.customer_id == "503").unwrap();
    assert_eq!(oldest.recency, 85);
}

#[test]
fn test_summary_report() {
    let test_file = create_test_csv();
    let transactions = load_transactions(test_file.path().to_str().unwrap()).unwrap();
    let segmentation = segment_customers(&transactions, &params(3)).unwrap();

    let report = build_summary(&segmentation.customers).unwrap();
    assert_eq!(report.total_customers, 6);
    assert!((report.total_revenue - 2272.5).abs() < 1e-6);

    let pct: f64 = report.segments.values().map(|s| s.percentage).sum();
    let revenue: f64 = report.segments.values().map(|s| s.revenue).sum();
    assert!((pct - 100.0).abs() < 0.05);
    assert!((revenue - report.total_revenue).abs() < 0.05);

    let labels: HashSet<String> = segmentation
        .customers
        .iter()
        .filter_map(|c| c.segment_label.map(|l| l.to_string()))
        .collect();
    let keys: HashSet<String> = report.segments.keys().cloned().collect();
    assert_eq!(labels, keys);
}

#[test]
fn test_segmentation_is_reproducible() {
    let test_file = create_test_csv();
    let transactions = load_transactions(test_file.path().to_str().unwrap()).unwrap();

    let first = segment_customers(&transactions, &params(3)).unwrap();
    let second = segment_customers(&transactions, &params(3)).unwrap();

    assert_eq!(first.customers, second.customers);
    assert_eq!(first.profiles, second.profiles);
}

#[test]
fn test_no_result_on_empty_input() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    writeln!(file, ",2024-03-25,B1,1,20.00,zen,food,r1,s1,card").unwrap();

    let transactions = load_transactions(file.path().to_str().unwrap()).unwrap();
    assert!(transactions.is_empty());
    assert!(segment_customers(&transactions, &params(3)).is_none());
}

#[test]
fn test_no_result_when_clusters_exceed_customers() {
    let test_file = create_test_csv();
    let transactions = load_transactions(test_file.path().to_str().unwrap()).unwrap();

    assert!(segment_customers(&transactions, &params(7)).is_none());
}
