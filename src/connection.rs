//! DuckDB connection wrapper with CSV ingestion and query execution.
//!
//! Uses schema introspection to normalize the loaded table:
//! - the purchase timestamp becomes `TIMESTAMP` whatever its stored encoding
//!   (ISO text, date-only text, native timestamp, or Unix epoch seconds)
//! - payment, review score, and lateness columns get stable numeric/boolean types

use crate::config;
use crate::error::{DashboardError, DataLoadError, Result};
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// DuckDB column types that take part in numeric aggregates.
fn is_numeric_type(column_type: &str) -> bool {
    const NUMERIC: [&str; 14] = [
        "TINYINT", "SMALLINT", "INTEGER", "BIGINT", "HUGEINT", "UTINYINT", "USMALLINT",
        "UINTEGER", "UBIGINT", "UHUGEINT", "FLOAT", "DOUBLE", "REAL", "BOOLEAN",
    ];
    NUMERIC.contains(&column_type) || column_type.starts_with("DECIMAL")
}

fn is_temporal_type(column_type: &str) -> bool {
    column_type.starts_with("TIMESTAMP") || column_type == "DATE"
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Wraps an in-memory DuckDB connection.
pub struct Connection {
    conn: DuckDbConnection,
}

impl Connection {
    /// Open an in-memory DuckDB database.
    pub fn new() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run.
        let column_names: Vec<String> = rows_result
            .as_ref()
            .ok_or_else(|| DashboardError::InvalidArgument("statement has no result set".into()))?
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str, params: &[String]) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(&self, sql: &str, params: &[String]) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Return `(column_name, column_type)` pairs for a table, in table order.
    pub fn describe(&self, table: &str) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT column_name, column_type FROM (DESCRIBE SELECT * FROM {})",
            table
        ))?;
        let mut rows = stmt.query([])?;
        let mut schema = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let column_type: String = row.get(1)?;
            schema.push((name, column_type));
        }
        Ok(schema)
    }

    /// Names of the numeric (and boolean) columns of a table, in table order.
    pub fn numeric_columns(&self, table: &str) -> Result<Vec<String>> {
        Ok(self
            .describe(table)?
            .into_iter()
            .filter(|(_, t)| is_numeric_type(t))
            .map(|(name, _)| name)
            .collect())
    }

    /// Load a delimited file into `table`, normalizing the transaction columns.
    ///
    /// The file is first read into a staging table with DuckDB's type sniffer,
    /// checked for the required columns, then rewritten column-by-column into
    /// its final shape. Row order of the file is kept, so `rowid` reflects
    /// source position.
    pub fn load_csv(&self, table: &str, path: &Path, delimiter: Option<char>) -> Result<()> {
        if !path.exists() {
            return Err(DataLoadError::MissingFile(path.to_path_buf()).into());
        }

        // Forward slashes keep DuckDB happy on Windows paths.
        let path_str = path.to_string_lossy().replace('\\', "/");
        let delim_opt = match delimiter {
            Some(d) => format!(", delim = {}", quote_literal(&d.to_string())),
            None => String::new(),
        };

        self.conn
            .execute_batch(&format!(
                "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_csv({}, header = true{})",
                config::RAW_TABLE,
                quote_literal(&path_str),
                delim_opt
            ))
            .map_err(|e| DataLoadError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let result = self.normalize_raw(table);
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {}", config::RAW_TABLE))?;
        result?;

        info!(table, path = %path_str, "loaded transaction file");
        Ok(())
    }

    fn normalize_raw(&self, table: &str) -> Result<()> {
        let schema: HashMap<String, String> = self.describe(config::RAW_TABLE)?.into_iter().collect();

        let missing: Vec<String> = config::required_columns()
            .iter()
            .filter(|c| !schema.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataLoadError::MissingColumns(missing).into());
        }

        let ts_type = schema
            .get(config::TIMESTAMP_COLUMN)
            .map(String::as_str)
            .unwrap_or("VARCHAR");
        if !is_temporal_type(ts_type) && !is_numeric_type(ts_type) {
            self.check_timestamp_text()?;
        }

        let mut exprs: Vec<String> = Vec::new();
        for name in ["order_id", "product_id", "customer_city"] {
            exprs.push(format!("CAST({0} AS VARCHAR) AS {0}", quote_ident(name)));
        }
        exprs.push(format!(
            "TRY_CAST(TRY_CAST({0} AS DOUBLE) AS BIGINT) AS {0}",
            quote_ident("order_item_id")
        ));
        exprs.push(format!("{} AS {}", timestamp_expr(ts_type), quote_ident(config::TIMESTAMP_COLUMN)));
        exprs.push(format!("TRY_CAST({0} AS DOUBLE) AS {0}", quote_ident("payment_value")));
        exprs.push(format!(
            "TRY_CAST(TRY_CAST({0} AS DOUBLE) AS INTEGER) AS {0}",
            quote_ident("review_score")
        ));
        let late_type = schema.get("is_late").map(String::as_str).unwrap_or("VARCHAR");
        exprs.push(format!("{} AS {}", flag_expr("is_late", late_type), quote_ident("is_late")));

        debug!(timestamp_type = ts_type, is_late_type = late_type, "normalizing columns");

        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * REPLACE ({}) FROM {}",
            table,
            exprs.join(", "),
            config::RAW_TABLE
        ))?;
        Ok(())
    }

    /// Reject text timestamps that are present but unparseable.
    fn check_timestamp_text(&self) -> Result<()> {
        let col = quote_ident(config::TIMESTAMP_COLUMN);
        let sql = format!(
            "SELECT CAST({col} AS VARCHAR) FROM {raw} \
             WHERE NULLIF(TRIM(CAST({col} AS VARCHAR)), '') IS NOT NULL \
               AND TRY_CAST(TRIM(CAST({col} AS VARCHAR)) AS TIMESTAMP) IS NULL \
             LIMIT 1",
            col = col,
            raw = config::RAW_TABLE
        );
        if let Some(bad) = self.execute_scalar(&sql, &[])? {
            let value = bad.as_str().unwrap_or_default().to_string();
            return Err(DataLoadError::InvalidTimestamp { value }.into());
        }
        Ok(())
    }
}

/// SQL converting the sniffed timestamp column into a plain `TIMESTAMP`.
fn timestamp_expr(column_type: &str) -> String {
    let col = quote_ident(config::TIMESTAMP_COLUMN);
    if is_temporal_type(column_type) {
        format!("CAST({} AS TIMESTAMP)", col)
    } else if is_numeric_type(column_type) {
        // Unix epoch seconds.
        format!("epoch_ms(CAST(ROUND(CAST({} AS DOUBLE) * 1000) AS BIGINT))", col)
    } else {
        format!("TRY_CAST(NULLIF(TRIM(CAST({0} AS VARCHAR)), '') AS TIMESTAMP)", col)
    }
}

/// SQL converting a lateness flag stored as bool, number, or text into `BOOLEAN`.
fn flag_expr(name: &str, column_type: &str) -> String {
    let col = quote_ident(name);
    match column_type {
        "BOOLEAN" => col,
        t if is_numeric_type(t) => format!("CAST({} AS DOUBLE) <> 0", col),
        _ => format!("TRY_CAST(LOWER(TRIM(CAST({} AS VARCHAR))) AS BOOLEAN)", col),
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
///
/// Temporal values map to `Null`; queries that need them cast to `VARCHAR`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UTinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::USmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; fall back to a string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).to_string()),
        _ => serde_json::Value::Null,
    }
}
