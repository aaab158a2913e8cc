//! Transaction records as supplied by the loader

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// One purchase event, already cleaned of rows missing required fields
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub customer_id: String,
    pub timestamp: NaiveDateTime,
    pub basket_id: String,
    pub item_quantity: u32,
    pub basket_total: f64,
    pub brand_id: Option<String>,
    pub category_id: Option<String>,
    pub retailer_id: Option<String>,
    pub store_id: Option<String>,
    pub payment_method: Option<String>,
}

impl Transaction {
    /// Minimal constructor; categorical identifiers start out empty
    pub fn new(
        customer_id: impl Into<String>,
        timestamp: NaiveDateTime,
        basket_id: impl Into<String>,
        item_quantity: u32,
        basket_total: f64,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            timestamp,
            basket_id: basket_id.into(),
            item_quantity,
            basket_total,
            brand_id: None,
            category_id: None,
            retailer_id: None,
            store_id: None,
            payment_method: None,
        }
    }

    pub fn with_brand(mut self, brand_id: impl Into<String>) -> Self {
        self.brand_id = Some(brand_id.into());
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_retailer(mut self, retailer_id: impl Into<String>) -> Self {
        self.retailer_id = Some(retailer_id.into());
        self
    }

    pub fn with_store(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = Some(store_id.into());
        self
    }

    pub fn with_payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a transaction timestamp.
///
/// Accepts RFC 3339 (offset is dropped after conversion to UTC), naive
/// date-times with a space or `T` separator, and plain dates (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
