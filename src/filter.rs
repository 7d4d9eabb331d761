//! Date-range filtering of the loaded dataset.
//!
//! A [`FilteredView`] never copies or mutates the dataset: it carries the
//! active [`DateBounds`] and injects them into every query built from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config;
use crate::connection::Connection;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::models::Transaction;
use crate::queries::{DistributionQuery, MetricQuery};
use crate::sql_builder::SqlBuilder;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date, returning `None` for anything else.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

// ---------------------------------------------------------------------------
// DateBounds
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` date range applied to the purchase timestamp.
///
/// `start > end` is representable and simply matches no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateBounds {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Bounds from a date picker selection.
    ///
    /// Only a selection of exactly two dates filters; zero or one selected
    /// dates (a picker mid-selection) means "no filter".
    pub fn from_selection(dates: &[NaiveDate]) -> Option<Self> {
        match dates {
            [start, end] => Some(Self::new(*start, *end)),
            _ => None,
        }
    }

    /// Bounds from two optional date strings.
    ///
    /// A missing or malformed side yields `None` rather than an error.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        let start = parse_date(start?)?;
        let end = parse_date(end?)?;
        Some(Self::new(start, end))
    }

    /// Whether `date` lies within the bounds.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `start` after `end`; such bounds select no rows.
    pub fn is_reversed(&self) -> bool {
        self.start > self.end
    }
}

// ---------------------------------------------------------------------------
// DateSpan
// ---------------------------------------------------------------------------

/// First and last purchase dates present in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateSpan {
    /// The span as bounds, i.e. the default picker selection.
    pub fn as_bounds(&self) -> DateBounds {
        DateBounds::new(self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// Read-only subset of a [`Dataset`] matching optional date bounds.
pub struct FilteredView<'a> {
    conn: &'a Connection,
    bounds: Option<DateBounds>,
}

/// Restrict `dataset` to `bounds`; `None` keeps every row.
pub fn filter(dataset: &Dataset, bounds: Option<DateBounds>) -> FilteredView<'_> {
    match &bounds {
        Some(b) if b.is_reversed() => {
            debug!(start = %b.start, end = %b.end, "reversed date bounds; view is empty")
        }
        Some(b) => debug!(start = %b.start, end = %b.end, "filtering by purchase date"),
        None => debug!("no date bounds; using full dataset"),
    }
    FilteredView {
        conn: dataset.connection(),
        bounds,
    }
}

impl<'a> FilteredView<'a> {
    pub fn bounds(&self) -> Option<DateBounds> {
        self.bounds
    }

    pub(crate) fn connection(&self) -> &'a Connection {
        self.conn
    }

    /// A `SELECT * FROM transactions` builder with the bounds already applied.
    pub fn query(&self) -> SqlBuilder {
        let mut qb = SqlBuilder::new(config::TRANSACTIONS_TABLE);
        if let Some(b) = &self.bounds {
            qb.where_date_between(config::TIMESTAMP_COLUMN, b.start, b.end);
        }
        qb
    }

    /// Number of rows in the view.
    pub fn len(&self) -> Result<usize> {
        let (sql, params) = self.query().select(&["COUNT(*)"]).build();
        let count = self
            .conn
            .execute_scalar(&sql, &params)?
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Materialize the view's rows in source order.
    pub fn rows(&self) -> Result<Vec<Transaction>> {
        let (sql, params) = self
            .query()
            .select(&[
                "order_id",
                "product_id",
                "customer_city",
                "order_item_id",
                "CAST(order_purchase_timestamp AS VARCHAR) AS order_purchase_timestamp",
                "payment_value",
                "review_score",
                "is_late",
            ])
            .order_by(&["rowid"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// KPI and ranking queries over this view.
    pub fn metrics(&self) -> MetricQuery<'_> {
        MetricQuery::new(self)
    }

    /// Raw value sequences and correlation over this view.
    pub fn distributions(&self) -> DistributionQuery<'_> {
        DistributionQuery::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn selection_needs_exactly_two_dates() {
        assert_eq!(DateBounds::from_selection(&[]), None);
        assert_eq!(DateBounds::from_selection(&[d("2023-01-01")]), None);
        assert_eq!(
            DateBounds::from_selection(&[d("2023-01-01"), d("2023-01-31")]),
            Some(DateBounds::new(d("2023-01-01"), d("2023-01-31")))
        );
        assert_eq!(
            DateBounds::from_selection(&[d("2023-01-01"), d("2023-01-02"), d("2023-01-03")]),
            None
        );
    }

    #[test]
    fn malformed_strings_fall_back_to_no_bounds() {
        assert_eq!(DateBounds::parse(Some("2023-01-01"), None), None);
        assert_eq!(DateBounds::parse(Some("2023-13-01"), Some("2023-12-31")), None);
        assert_eq!(DateBounds::parse(Some("yesterday"), Some("2023-12-31")), None);
        assert!(DateBounds::parse(Some("2023-01-01"), Some("2023-12-31")).is_some());
    }

    #[test]
    fn contains_is_inclusive_and_reversed_matches_nothing() {
        let b = DateBounds::new(d("2023-01-01"), d("2023-01-31"));
        assert!(b.contains(d("2023-01-01")));
        assert!(b.contains(d("2023-01-31")));
        assert!(!b.contains(d("2023-02-01")));

        let r = DateBounds::new(d("2023-02-01"), d("2023-01-01"));
        assert!(r.is_reversed());
        assert!(!r.contains(d("2023-01-15")));
    }

    #[test]
    fn query_without_bounds_has_no_where() {
        let conn = Connection::new().unwrap();
        let view = FilteredView { conn: &conn, bounds: None };
        let (sql, params) = view.query().build();
        assert!(!sql.contains("WHERE"));
        assert!(params.is_empty());
    }

    #[test]
    fn query_with_bounds_binds_both_dates() {
        let conn = Connection::new().unwrap();
        let view = FilteredView {
            conn: &conn,
            bounds: Some(DateBounds::new(d("2023-01-01"), d("2023-01-31"))),
        };
        let (sql, params) = view.query().build();
        assert!(sql.contains("CAST(order_purchase_timestamp AS DATE) >= make_date("));
        assert_eq!(params, vec!["2023", "1", "1", "2023", "1", "31"]);
    }
}
