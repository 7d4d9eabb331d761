use std::path::PathBuf;

/// File read when neither the CLI nor the environment names one.
pub const DEFAULT_DATA_FILE: &str = "all_data.csv";

/// Environment variable overriding [`DEFAULT_DATA_FILE`].
pub const DATA_PATH_ENV: &str = "ECOM_DASHBOARD_DATA";

/// DuckDB table the dataset is materialized into.
pub const TRANSACTIONS_TABLE: &str = "transactions";

/// Staging table holding the file exactly as DuckDB sniffed it.
pub const RAW_TABLE: &str = "transactions_raw";

pub const TIMESTAMP_COLUMN: &str = "order_purchase_timestamp";

pub const TOP_PRODUCTS: usize = 5;
pub const TOP_CITIES: usize = 10;

/// Columns every input file must carry.
pub fn required_columns() -> [&'static str; 8] {
    [
        "order_id",
        "product_id",
        "customer_city",
        "order_item_id",
        TIMESTAMP_COLUMN,
        "payment_value",
        "review_score",
        "is_late",
    ]
}

/// Resolve the data file: environment override first, then the default.
pub fn default_data_path() -> PathBuf {
    match std::env::var(DATA_PATH_ENV) {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => PathBuf::from(DEFAULT_DATA_FILE),
    }
}
