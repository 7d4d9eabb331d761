use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Transaction — one line item of one order
// ---------------------------------------------------------------------------

/// A single row of the transaction dataset.
///
/// An order with several line items appears once per item, so `order_id`
/// is not unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub order_id: String,
    pub product_id: String,
    pub customer_city: String,
    pub order_item_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub order_purchase_timestamp: Option<NaiveDateTime>,
    pub payment_value: Option<f64>,
    pub review_score: Option<i64>,
    pub is_late: Option<bool>,
}

impl Transaction {
    /// Purchase date with the time of day dropped.
    pub fn purchase_date(&self) -> Option<chrono::NaiveDate> {
        self.order_purchase_timestamp.map(|ts| ts.date())
    }
}

/// Parse DuckDB's `TIMESTAMP -> VARCHAR` rendering (`2023-01-31 23:59:00[.ffffff]`).
///
/// The ISO `T` separator is accepted too so serialized rows read back.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
    }
}
