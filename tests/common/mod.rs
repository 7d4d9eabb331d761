//! Shared test fixtures for the dashboard integration tests.
//!
//! Provides `setup_sample_dataset()` which writes a small transaction file
//! to a temporary directory and loads it, plus helpers for ad-hoc files.

#![allow(dead_code)]

use chrono::NaiveDate;
use ecom_dashboard::{Dataset, DateBounds};
use std::fs;
use std::path::PathBuf;

pub const HEADER: &str =
    "order_id,product_id,customer_city,order_item_id,order_purchase_timestamp,payment_value,review_score,is_late";

/// Seven line items over six orders, spread across January to March 2023.
///
/// Totals: all 280.0, January 100.0, February 110.0, March 70.0.
pub fn sample_rows() -> Vec<&'static str> {
    vec![
        "o1,pA,sao paulo,1,2023-01-01 08:00:00,10.0,5,False",
        "o1,pB,sao paulo,2,2023-01-01 08:00:00,20.0,5,False",
        "o2,pA,rio de janeiro,1,2023-01-15 12:30:00,30.0,4,True",
        "o3,pC,sao paulo,1,2023-01-31 23:59:00,40.0,,False",
        "o4,pB,curitiba,1,2023-02-01 00:00:00,50.0,3,True",
        "o5,pD,rio de janeiro,1,2023-02-10 09:15:00,60.0,1,True",
        "o6,pA,sao paulo,1,2023-03-05 18:45:00,70.0,2,False",
    ]
}

/// Write `header` plus `rows` to `all_data.csv` in a fresh temp directory.
///
/// The caller must keep the `TempDir` alive while the path is in use.
pub fn write_csv(header: &str, rows: &[&str]) -> (PathBuf, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("all_data.csv");
    let mut body = String::from(header);
    body.push('\n');
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    fs::write(&path, body).unwrap();
    (path, tmp_dir)
}

/// Load `rows` under the standard header.
pub fn load_rows(rows: &[&str]) -> (Dataset, tempfile::TempDir) {
    let (path, tmp_dir) = write_csv(HEADER, rows);
    let dataset = Dataset::load(&path).unwrap();
    (dataset, tmp_dir)
}

pub fn setup_sample_dataset() -> (Dataset, tempfile::TempDir) {
    load_rows(&sample_rows())
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn bounds(start: &str, end: &str) -> Option<DateBounds> {
    Some(DateBounds::new(date(start), date(end)))
}
