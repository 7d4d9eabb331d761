//! SQL builder with parameterized query construction.
//!
//! Bound values go through DuckDB's parameter binding (`?` placeholders),
//! never through string interpolation. Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use ecom_dashboard::SqlBuilder;
//!
//! let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
//! let (sql, params) = SqlBuilder::new("transactions")
//!     .select(&["product_id", "SUM(payment_value) AS total"])
//!     .where_date_between("order_purchase_timestamp", start, end)
//!     .group_by(&["product_id"])
//!     .order_by(&["total DESC"])
//!     .limit(5)
//!     .build();
//! ```

use chrono::{Datelike, NaiveDate};

/// `DATE` built from three bound integers: year, month, day.
const DATE_PARAM: &str = "make_date(CAST(? AS BIGINT), CAST(? AS BIGINT), CAST(? AS BIGINT))";

/// Builds parameterized SQL queries.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    group_by_cols: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table or view.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by_cols: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a WHERE condition with `?` placeholders for each param.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// Add `{column} IS NOT NULL`.
    pub fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.where_clauses.push(format!("{} IS NOT NULL", column));
        self
    }

    /// Keep rows whose date component lies in `[start, end]`, both inclusive.
    ///
    /// Time-of-day is discarded by casting the column to `DATE` before the
    /// comparison, so `2023-01-31 23:59` falls inside a range ending on
    /// `2023-01-31`. A reversed range matches nothing.
    ///
    /// Dates bind as year, month and day integers, so years outside
    /// `0000..=9999` need no textual date format.
    pub fn where_date_between(&mut self, column: &str, start: NaiveDate, end: NaiveDate) -> &mut Self {
        self.where_clauses.push(format!(
            "CAST({col} AS DATE) >= {date} AND CAST({col} AS DATE) <= {date}",
            col = column,
            date = DATE_PARAM
        ));
        for d in [start, end] {
            self.params.push(d.year().to_string());
            self.params.push(d.month().to_string());
            self.params.push(d.day().to_string());
        }
        self
    }

    /// Add GROUP BY columns.
    pub fn group_by(&mut self, cols: &[&str]) -> &mut Self {
        self.group_by_cols.extend(cols.iter().map(|c| c.to_string()));
        self
    }

    /// Add ORDER BY clauses (e.g. `"total DESC"`, `"rowid ASC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols.extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Set the maximum number of rows to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            let conds: Vec<String> = self
                .where_clauses
                .iter()
                .map(|c| format!("({})", c))
                .collect();
            parts.push(format!("WHERE {}", conds.join(" AND ")));
        }

        if !self.group_by_cols.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by_cols.join(", ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }
}
