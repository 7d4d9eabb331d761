pub mod metrics;
pub mod transaction;

pub use metrics::*;
pub use transaction::*;
