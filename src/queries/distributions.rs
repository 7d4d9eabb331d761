//! Raw value sequences and the correlation matrix of a [`FilteredView`].
//!
//! Values are handed over unbinned; histogram and box plot binning belongs
//! to whoever draws them.

use chrono::NaiveDateTime;

use crate::config;
use crate::error::Result;
use crate::filter::FilteredView;
use crate::models::{parse_timestamp, CorrelationMatrix, PaymentByDelivery};

// ---------------------------------------------------------------------------
// DistributionQuery
// ---------------------------------------------------------------------------

pub struct DistributionQuery<'a> {
    view: &'a FilteredView<'a>,
}

impl<'a> DistributionQuery<'a> {
    /// Create a new `DistributionQuery` bound to the given view.
    pub fn new(view: &'a FilteredView<'a>) -> Self {
        Self { view }
    }

    /// Non-null values of one column, in source order.
    fn column(&self, expr: &str, not_null: &str) -> Result<Vec<serde_json::Value>> {
        let select = format!("{} AS v", expr);
        let (sql, params) = self
            .view
            .query()
            .select(&[select.as_str()])
            .where_not_null(not_null)
            .order_by(&["rowid"])
            .build();
        let rows = self.view.connection().execute(&sql, &params)?;
        Ok(rows.into_iter().filter_map(|mut r| r.remove("v")).collect())
    }

    /// Every `payment_value` in the view.
    pub fn payment_values(&self) -> Result<Vec<f64>> {
        Ok(self
            .column("payment_value", "payment_value")?
            .iter()
            .filter_map(|v| v.as_f64())
            .collect())
    }

    /// Every present `review_score` in the view.
    pub fn review_scores(&self) -> Result<Vec<i64>> {
        Ok(self
            .column("review_score", "review_score")?
            .iter()
            .filter_map(|v| v.as_i64())
            .collect())
    }

    /// Every present purchase timestamp in the view.
    pub fn purchase_timestamps(&self) -> Result<Vec<NaiveDateTime>> {
        let expr = format!("CAST({} AS VARCHAR)", config::TIMESTAMP_COLUMN);
        Ok(self
            .column(&expr, config::TIMESTAMP_COLUMN)?
            .iter()
            .filter_map(|v| v.as_str().and_then(parse_timestamp))
            .collect())
    }

    /// Payment values split by lateness flag; unflagged rows are dropped.
    pub fn payment_by_delivery(&self) -> Result<PaymentByDelivery> {
        let (sql, params) = self
            .view
            .query()
            .select(&["payment_value", "is_late"])
            .where_not_null("payment_value")
            .where_not_null("is_late")
            .order_by(&["rowid"])
            .build();
        let rows = self.view.connection().execute(&sql, &params)?;

        let mut out = PaymentByDelivery::default();
        for row in &rows {
            let value = row.get("payment_value").and_then(|v| v.as_f64());
            let late = row.get("is_late").and_then(|v| v.as_bool());
            match (value, late) {
                (Some(v), Some(true)) => out.late.push(v),
                (Some(v), Some(false)) => out.on_time.push(v),
                _ => {}
            }
        }
        Ok(out)
    }

    /// Pairwise Pearson correlation over every numeric column.
    ///
    /// Boolean columns count as 0/1. Each pair uses only rows where both
    /// values are present; DuckDB's `corr` skips the rest. Cells with fewer
    /// than two pairs or a constant side are `NaN`. A diagonal cell is 1 for
    /// a column that varies.
    pub fn correlation_matrix(&self) -> Result<CorrelationMatrix> {
        let conn = self.view.connection();
        let columns = conn.numeric_columns(config::TRANSACTIONS_TABLE)?;
        if columns.is_empty() {
            return Ok(CorrelationMatrix::default());
        }

        let n = columns.len();
        let as_double: Vec<String> = columns
            .iter()
            .map(|c| format!("CAST(\"{}\" AS DOUBLE)", c.replace('"', "\"\"")))
            .collect();

        let mut cells = Vec::with_capacity(n * (n + 1) / 2);
        for i in 0..n {
            cells.push(format!(
                "CASE WHEN var_pop({x}) > 0 THEN CAST(1 AS DOUBLE) END AS r_{i}_{i}",
                x = as_double[i],
                i = i
            ));
            for j in (i + 1)..n {
                cells.push(format!("corr({}, {}) AS r_{}_{}", as_double[i], as_double[j], i, j));
            }
        }
        let cell_refs: Vec<&str> = cells.iter().map(String::as_str).collect();
        let (sql, params) = self.view.query().select(&cell_refs).build();
        let row = conn.execute(&sql, &params)?.into_iter().next().unwrap_or_default();

        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                // NULL and NaN both come back as JSON null.
                let r = row
                    .get(&format!("r_{}_{}", i, j))
                    .and_then(|v| v.as_f64())
                    .map(|r| r.clamp(-1.0, 1.0))
                    .unwrap_or(f64::NAN);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(CorrelationMatrix { columns, values })
    }
}

