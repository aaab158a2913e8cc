//! Console rendering of segment profiles and the summary report

use crate::metrics::Feature;
use crate::profile::SegmentProfile;
use crate::report::SummaryReport;

/// Format a number with thousands separators and two decimals
pub fn format_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

pub fn format_currency(value: f64) -> String {
    format!("${}", format_thousands(value))
}

/// Print per-segment means of the headline features
pub fn print_segment_profiles(profiles: &[SegmentProfile]) {
    println!("\n=== Segment Profiles ===");
    println!(
        "  {:>7} | {:<20} | {:>6} | {:>8} | {:>9} | {:>12} | {:>9}",
        "Segment", "Label", "Size", "Recency", "Frequency", "Spend", "Brand div"
    );
    println!("  {}", "-".repeat(90));
    for profile in profiles {
        println!(
            "  {:>7} | {:<20} | {:>6} | {:>8.1} | {:>9.2} | {:>12} | {:>9.3}",
            profile.segment(),
            profile.label.as_str(),
            profile.stats.size,
            profile.stats.mean(Feature::Recency),
            profile.stats.mean(Feature::Frequency),
            format_currency(profile.stats.mean(Feature::TotalSpend)),
            profile.stats.mean(Feature::BrandDiversity),
        );
    }
}

/// Print the business summary
pub fn print_summary_report(report: &SummaryReport) {
    println!("\n=== Customer Segmentation Report ===");
    println!("Total customers: {}", report.total_customers);
    println!("Total revenue: {}", format_currency(report.total_revenue));
    println!(
        "Average customer value: {}",
        format_currency(report.avg_customer_value)
    );

    for (label, segment) in &report.segments {
        println!("\n{label}");
        println!(
            "  Customers: {} ({:.2}%)",
            segment.size, segment.percentage
        );
        println!(
            "  Revenue: {} ({:.2}%)",
            format_currency(segment.revenue),
            segment.revenue_percentage
        );
        println!(
            "  Avg customer value: {}",
            format_currency(segment.avg_customer_value)
        );
        println!("  Avg basket size: {}", format_currency(segment.avg_basket_size));
        println!("  Avg frequency: {:.2}", segment.avg_frequency);
        println!("  Avg recency (days): {:.2}", segment.avg_recency);
        println!("  Avg brand diversity: {:.2}", segment.avg_brand_diversity);
        println!("  Avg category diversity: {:.2}", segment.avg_category_diversity);
    }
}
