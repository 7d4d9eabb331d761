//! KPI, ranking, and delivery queries over a [`FilteredView`].

use crate::config;
use crate::error::Result;
use crate::filter::FilteredView;
use crate::models::{DeliveryCounts, Kpis, RankedCount, RankedValue, ScoreCount};

// ---------------------------------------------------------------------------
// MetricQuery
// ---------------------------------------------------------------------------

/// Aggregates over the rows of one filtered view.
///
/// Every top-N ranking orders by its value descending and breaks ties by
/// the first appearance of the key in the source file.
pub struct MetricQuery<'a> {
    view: &'a FilteredView<'a>,
}

impl<'a> MetricQuery<'a> {
    /// Create a new `MetricQuery` bound to the given view.
    pub fn new(view: &'a FilteredView<'a>) -> Self {
        Self { view }
    }

    fn scalar_f64(&self, expr: &str) -> Result<Option<f64>> {
        let (sql, params) = self.view.query().select(&[expr]).build();
        Ok(self
            .view
            .connection()
            .execute_scalar(&sql, &params)?
            .and_then(|v| v.as_f64()))
    }

    // -- KPIs ----------------------------------------------------------------

    /// Sum of `payment_value`; `0.0` for an empty view.
    pub fn total_sales(&self) -> Result<f64> {
        Ok(self.scalar_f64("SUM(payment_value)")?.unwrap_or(0.0))
    }

    /// Mean of `payment_value`; `None` for an empty view.
    pub fn avg_order_value(&self) -> Result<Option<f64>> {
        self.scalar_f64("AVG(payment_value)")
    }

    /// Number of distinct `order_id` values.
    pub fn total_orders(&self) -> Result<i64> {
        let (sql, params) = self
            .view
            .query()
            .select(&["COUNT(DISTINCT order_id)"])
            .build();
        Ok(self
            .view
            .connection()
            .execute_scalar(&sql, &params)?
            .and_then(|v| v.as_i64())
            .unwrap_or(0))
    }

    /// The three headline metrics together.
    pub fn kpis(&self) -> Result<Kpis> {
        Ok(Kpis {
            total_sales: self.total_sales()?,
            avg_order_value: self.avg_order_value()?,
            total_orders: self.total_orders()?,
        })
    }

    // -- Rankings --------------------------------------------------------------

    /// Products with the largest summed `payment_value`.
    pub fn top_products_by_sales(&self, limit: usize) -> Result<Vec<RankedValue>> {
        let (sql, params) = self
            .view
            .query()
            .select(&["product_id AS key", "COALESCE(SUM(payment_value), 0.0) AS value"])
            .where_not_null("product_id")
            .group_by(&["product_id"])
            .order_by(&["value DESC", "MIN(rowid) ASC"])
            .limit(limit)
            .build();
        self.view.connection().execute_into(&sql, &params)
    }

    /// Products with the most line items (non-null `order_item_id` entries).
    pub fn top_products_by_volume(&self, limit: usize) -> Result<Vec<RankedCount>> {
        self.ranked_count("product_id", "COUNT(order_item_id)", limit)
    }

    /// Cities with the most rows.
    pub fn top_cities(&self, limit: usize) -> Result<Vec<RankedCount>> {
        self.ranked_count("customer_city", "COUNT(*)", limit)
    }

    fn ranked_count(&self, key: &str, count_expr: &str, limit: usize) -> Result<Vec<RankedCount>> {
        let key_col = format!("{} AS key", key);
        let count_col = format!("{} AS count", count_expr);
        let (sql, params) = self
            .view
            .query()
            .select(&[key_col.as_str(), count_col.as_str()])
            .where_not_null(key)
            .group_by(&[key])
            .order_by(&["count DESC", "MIN(rowid) ASC"])
            .limit(limit)
            .build();
        self.view.connection().execute_into(&sql, &params)
    }

    /// Products ranked by sales using the default size.
    pub fn top_products(&self) -> Result<Vec<RankedValue>> {
        self.top_products_by_sales(config::TOP_PRODUCTS)
    }

    // -- Counts ----------------------------------------------------------------

    /// Late versus on-time rows; rows without a flag count in neither.
    pub fn delivery_counts(&self) -> Result<DeliveryCounts> {
        let (sql, params) = self
            .view
            .query()
            .select(&[
                "COUNT(*) FILTER (WHERE is_late) AS late",
                "COUNT(*) FILTER (WHERE NOT is_late) AS on_time",
            ])
            .build();
        let rows: Vec<DeliveryCounts> = self.view.connection().execute_into(&sql, &params)?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    /// Row count per review score, ascending by score (count plot input).
    pub fn review_score_counts(&self) -> Result<Vec<ScoreCount>> {
        let (sql, params) = self
            .view
            .query()
            .select(&["review_score AS score", "COUNT(*) AS count"])
            .where_not_null("review_score")
            .group_by(&["review_score"])
            .order_by(&["score ASC"])
            .build();
        self.view.connection().execute_into(&sql, &params)
    }
}
