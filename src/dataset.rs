//! The loaded transaction dataset.
//!
//! Loading happens once, explicitly, and the result is passed to the filter
//! and aggregation steps. After load the table is never written to again.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::config;
use crate::connection::Connection;
use crate::error::Result;
use crate::filter::{self, DateBounds, DateSpan, FilteredView};

// ---------------------------------------------------------------------------
// DatasetBuilder
// ---------------------------------------------------------------------------

/// Builder for loading a [`Dataset`].
///
/// Use [`Dataset::builder()`] to obtain one.
#[derive(Default)]
pub struct DatasetBuilder {
    path: Option<PathBuf>,
    delimiter: Option<char>,
}

impl DatasetBuilder {
    /// Set the file to load.
    ///
    /// Defaults to [`config::default_data_path`] (`$ECOM_DASHBOARD_DATA`, or
    /// `all_data.csv` in the working directory).
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Force a field delimiter instead of letting DuckDB sniff it.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Read the file and normalize it into the transactions table.
    pub fn build(self) -> Result<Dataset> {
        let source = self.path.unwrap_or_else(config::default_data_path);
        let conn = Connection::new()?;
        conn.load_csv(config::TRANSACTIONS_TABLE, &source, self.delimiter)?;
        let dataset = Dataset { conn, source };
        info!(rows = dataset.len()?, "dataset ready");
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Immutable, in-memory transaction table.
pub struct Dataset {
    conn: Connection,
    source: PathBuf,
}

impl Dataset {
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    /// Load the file at `path` with sniffed delimiter.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().path(path).build()
    }

    /// File the dataset was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// A view restricted to `bounds`, or the whole dataset for `None`.
    pub fn filter(&self, bounds: Option<DateBounds>) -> FilteredView<'_> {
        filter::filter(self, bounds)
    }

    /// Total row count.
    pub fn len(&self) -> Result<usize> {
        self.filter(None).len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Column names of the normalized table, in file order.
    pub fn columns(&self) -> Result<Vec<String>> {
        Ok(self
            .conn
            .describe(config::TRANSACTIONS_TABLE)?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    /// Earliest and latest purchase dates, or `None` if no row is dated.
    pub fn date_span(&self) -> Result<Option<DateSpan>> {
        let sql = format!(
            "SELECT CAST(MIN(CAST({col} AS DATE)) AS VARCHAR) AS min_date, \
                    CAST(MAX(CAST({col} AS DATE)) AS VARCHAR) AS max_date \
             FROM {table}",
            col = config::TIMESTAMP_COLUMN,
            table = config::TRANSACTIONS_TABLE
        );
        let rows = self.conn.execute(&sql, &[])?;
        let parse = |row: &std::collections::HashMap<String, serde_json::Value>, key: &str| {
            row.get(key)
                .and_then(|v| v.as_str())
                .and_then(filter::parse_date)
        };
        Ok(rows.first().and_then(|row| {
            let min: NaiveDate = parse(row, "min_date")?;
            let max: NaiveDate = parse(row, "max_date")?;
            Some(DateSpan { min, max })
        }))
    }
}
