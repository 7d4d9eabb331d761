//! Query modules over a [`FilteredView`](crate::filter::FilteredView).
//!
//! Each module provides a query struct that borrows the view and builds its
//! SQL from [`FilteredView::query`](crate::filter::FilteredView::query), so
//! the active date bounds apply to every aggregate.

pub mod distributions;
pub mod metrics;

pub use distributions::DistributionQuery;
pub use metrics::MetricQuery;
