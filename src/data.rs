//! Transaction loading and cleaning using Polars

use anyhow::Context;
use log::{info, warn};
use polars::prelude::*;

use crate::transaction::{parse_timestamp, Transaction};

pub const CUSTOMER_ID: &str = "customer_id";
pub const TRANSACTION_DATE: &str = "transaction_date";
pub const BASKET_ID: &str = "basket_id";
pub const ITEM_QUANTITY: &str = "item_quantity";
pub const BASKET_TOTAL: &str = "basket_total";
pub const BRAND_ID: &str = "brand_id";
pub const CATEGORY_ID: &str = "category_id";
pub const RETAILER_ID: &str = "retailer_id";
pub const STORE_ID: &str = "store_id";
pub const PAYMENT_METHOD: &str = "payment_method";

/// Columns the input file must provide, in the order they are read
pub const REQUIRED_COLUMNS: [&str; 10] = [
    CUSTOMER_ID,
    TRANSACTION_DATE,
    BASKET_ID,
    ITEM_QUANTITY,
    BASKET_TOTAL,
    BRAND_ID,
    CATEGORY_ID,
    RETAILER_ID,
    STORE_ID,
    PAYMENT_METHOD,
];

/// Why a row did not make it into the cleaned table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingRequired,
    BadTimestamp,
    BadQuantity,
    BadTotal,
}

/// One CSV row before validation, all fields as text
#[derive(Debug, Clone, Default)]
pub struct RawRow<'a> {
    pub customer_id: Option<&'a str>,
    pub transaction_date: Option<&'a str>,
    pub basket_id: Option<&'a str>,
    pub item_quantity: Option<&'a str>,
    pub basket_total: Option<&'a str>,
    pub brand_id: Option<&'a str>,
    pub category_id: Option<&'a str>,
    pub retailer_id: Option<&'a str>,
    pub store_id: Option<&'a str>,
    pub payment_method: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningStats {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub missing_required: usize,
    pub bad_timestamp: usize,
    pub bad_quantity: usize,
    pub bad_total: usize,
}

impl CleaningStats {
    fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::MissingRequired => self.missing_required += 1,
            DropReason::BadTimestamp => self.bad_timestamp += 1,
            DropReason::BadQuantity => self.bad_quantity += 1,
            DropReason::BadTotal => self.bad_total += 1,
        }
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_kept
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_quantity(raw: &str) -> Option<u32> {
    let qty: f64 = raw.parse().ok()?;
    if qty.is_finite() && qty >= 1.0 && qty.fract() == 0.0 && qty <= f64::from(u32::MAX) {
        Some(qty as u32)
    } else {
        None
    }
}

fn parse_total(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|total| total.is_finite() && *total >= 0.0)
}

/// Validate one row into a [`Transaction`]
pub fn clean_row(raw: &RawRow) -> Result<Transaction, DropReason> {
    let (Some(customer_id), Some(date), Some(total), Some(basket_id)) = (
        present(raw.customer_id),
        present(raw.transaction_date),
        present(raw.basket_total),
        present(raw.basket_id),
    ) else {
        return Err(DropReason::MissingRequired);
    };

    let timestamp = parse_timestamp(date).ok_or(DropReason::BadTimestamp)?;
    let basket_total = parse_total(total).ok_or(DropReason::BadTotal)?;
    let item_quantity = present(raw.item_quantity)
        .and_then(parse_quantity)
        .ok_or(DropReason::BadQuantity)?;

    let mut txn = Transaction::new(customer_id, timestamp, basket_id, item_quantity, basket_total);
    txn.brand_id = present(raw.brand_id).map(String::from);
    txn.category_id = present(raw.category_id).map(String::from);
    txn.retailer_id = present(raw.retailer_id).map(String::from);
    txn.store_id = present(raw.store_id).map(String::from);
    txn.payment_method = present(raw.payment_method).map(String::from);
    Ok(txn)
}

/// Clean a batch of raw rows, counting what was dropped and why
pub fn clean_rows<'a, I>(rows: I) -> (Vec<Transaction>, CleaningStats)
where
    I: IntoIterator<Item = RawRow<'a>>,
{
    let mut stats = CleaningStats::default();
    let mut transactions = Vec::new();

    for row in rows {
        stats.rows_read += 1;
        match clean_row(&row) {
            Ok(txn) => transactions.push(txn),
            Err(reason) => stats.record(reason),
        }
    }
    stats.rows_kept = transactions.len();

    (transactions, stats)
}

fn string_column<'a>(df: &'a DataFrame, name: &str) -> crate::Result<Vec<Option<&'a str>>> {
    let values = df
        .column(name)
        .with_context(|| format!("Missing column '{name}'"))?
        .str()?
        .into_iter()
        .collect();
    Ok(values)
}

/// Load a transaction CSV and return the cleaned rows.
///
/// Every column is read as text so that validation happens in one place;
/// a file lacking any of [`REQUIRED_COLUMNS`] is rejected outright.
pub fn load_transactions(file_path: &str) -> crate::Result<Vec<Transaction>> {
    let df = LazyCsvReader::new(file_path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .with_context(|| format!("Failed to open transactions file {file_path}"))?
        .collect()
        .with_context(|| format!("Failed to read transactions file {file_path}"))?;

    let header: Vec<&str> = df.get_column_names();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header.contains(c))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("Input is missing required columns: {}", missing.join(", "));
    }

    let columns = REQUIRED_COLUMNS
        .iter()
        .map(|name| string_column(&df, name))
        .collect::<crate::Result<Vec<_>>>()?;

    let rows = (0..df.height()).map(|i| RawRow {
        customer_id: columns[0][i],
        transaction_date: columns[1][i],
        basket_id: columns[2][i],
        item_quantity: columns[3][i],
        basket_total: columns[4][i],
        brand_id: columns[5][i],
        category_id: columns[6][i],
        retailer_id: columns[7][i],
        store_id: columns[8][i],
        payment_method: columns[9][i],
    });

    let (transactions, stats) = clean_rows(rows);

    if stats.rows_dropped() > 0 {
        warn!(
            "Dropped {} of {} rows (missing required: {}, bad timestamp: {}, bad quantity: {}, bad total: {})",
            stats.rows_dropped(),
            stats.rows_read,
            stats.missing_required,
            stats.bad_timestamp,
            stats.bad_quantity,
            stats.bad_total
        );
    }
    info!("Loaded {} transactions from {}", stats.rows_kept, file_path);

    Ok(transactions)
}
