//! E-commerce dashboard engine.
//!
//! Loads a transaction file into an in-process DuckDB table, filters it by
//! an inclusive purchase-date range, and computes the KPIs and chart inputs
//! a dashboard displays: sales totals, distributions, correlations,
//! delivery punctuality, and top products and cities.
//!
//! # Quick start
//!
//! ```no_run
//! use ecom_dashboard::{Dashboard, Dataset, DateBounds};
//!
//! let dataset = Dataset::load("all_data.csv").unwrap();
//!
//! // KPIs for January 2018
//! let bounds = DateBounds::parse(Some("2018-01-01"), Some("2018-01-31"));
//! let view = dataset.filter(bounds);
//! let kpis = view.metrics().kpis().unwrap();
//!
//! // Or the whole layout in one pass
//! let report = Dashboard::standard().render(&dataset, bounds).unwrap();
//! println!("{}", report);
//! ```

pub mod config;
pub mod connection;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod models;
pub mod queries;
pub mod sql_builder;

pub use connection::Connection;
pub use dashboard::{Aggregate, ChartKind, Dashboard, DashboardReport, Panel, PanelData};
pub use dataset::{Dataset, DatasetBuilder};
pub use error::{DashboardError, DataLoadError, Result};
pub use filter::{filter, DateBounds, DateSpan, FilteredView};
pub use sql_builder::SqlBuilder;
