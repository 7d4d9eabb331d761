use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Kpis — the three headline metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_sales: f64,
    /// `None` when the view has no payment values.
    pub avg_order_value: Option<f64>,
    pub total_orders: i64,
}

// ---------------------------------------------------------------------------
// Ranked aggregates
// ---------------------------------------------------------------------------

/// A key with its summed value, e.g. a product and its sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedValue {
    pub key: String,
    pub value: f64,
}

/// A key with an occurrence count, e.g. a city and its row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCount {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCount {
    pub score: i64,
    pub count: i64,
}

// ---------------------------------------------------------------------------
// Delivery punctuality
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryCounts {
    pub on_time: i64,
    pub late: i64,
}

/// Payment values split by the lateness flag (box plot input).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentByDelivery {
    pub on_time: Vec<f64>,
    pub late: Vec<f64>,
}

// ---------------------------------------------------------------------------
// CorrelationMatrix
// ---------------------------------------------------------------------------

/// Square Pearson matrix over the numeric columns of a view.
///
/// Undefined cells (zero variance, too few pairs) hold `NaN`, which
/// `serde_json` writes as `null`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Coefficient between two named columns, if both are present.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}
