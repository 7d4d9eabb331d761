//! Declarative dashboard layout and the render pass that fills it.
//!
//! A [`Dashboard`] is a title plus a list of [`Panel`]s, each pairing one
//! aggregate with the chart that should display it. Rendering filters the
//! dataset once and evaluates every panel against that view; nothing is
//! cached between renders.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use crate::config;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::{DateBounds, FilteredView};
use crate::models::{
    CorrelationMatrix, DeliveryCounts, Kpis, PaymentByDelivery, RankedCount, RankedValue,
    ScoreCount,
};

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Chart types the presentation layer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Metric,
    Histogram,
    CountPlot,
    Bar,
    Pie,
    Heatmap,
    BoxPlot,
}

/// Aggregates a panel can request from a filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "name")]
pub enum Aggregate {
    PaymentValues,
    ReviewScores,
    ReviewScoreCounts,
    PurchaseTimestamps,
    TopProductsBySales { limit: usize },
    TopProductsByVolume { limit: usize },
    TopCities { limit: usize },
    CorrelationMatrix,
    DeliveryCounts,
    PaymentByDelivery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Panel {
    pub title: String,
    pub aggregate: Aggregate,
    pub chart: ChartKind,
}

impl Panel {
    pub fn new(title: impl Into<String>, aggregate: Aggregate, chart: ChartKind) -> Self {
        Self {
            title: title.into(),
            aggregate,
            chart,
        }
    }
}

// ---------------------------------------------------------------------------
// Render output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "data")]
pub enum PanelData {
    Values(Vec<f64>),
    Scores(Vec<i64>),
    ScoreCounts(Vec<ScoreCount>),
    Timestamps(Vec<NaiveDateTime>),
    RankedValues(Vec<RankedValue>),
    RankedCounts(Vec<RankedCount>),
    Correlation(CorrelationMatrix),
    Delivery(DeliveryCounts),
    PaymentSplit(PaymentByDelivery),
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelOutput {
    pub title: String,
    pub chart: ChartKind,
    #[serde(flatten)]
    pub data: PanelData,
}

/// Everything one render pass hands to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub title: String,
    pub bounds: Option<DateBounds>,
    pub rows: usize,
    pub kpis: Kpis,
    pub panels: Vec<PanelOutput>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Dashboard {
    title: String,
    panels: Vec<Panel>,
}

impl Dashboard {
    pub fn new(title: impl Into<String>, panels: Vec<Panel>) -> Self {
        Self {
            title: title.into(),
            panels,
        }
    }

    /// The four-chart layout: payments, reviews, top products, top cities.
    pub fn classic() -> Self {
        Self::new(
            "E-Commerce Dashboard",
            vec![
                Panel::new("Distribution of Payment Values", Aggregate::PaymentValues, ChartKind::Histogram),
                Panel::new("Review Score Distribution", Aggregate::ReviewScores, ChartKind::CountPlot),
                Panel::new(
                    "Top 5 Products by Sales",
                    Aggregate::TopProductsBySales { limit: config::TOP_PRODUCTS },
                    ChartKind::Bar,
                ),
                Panel::new(
                    "Top Customer Cities",
                    Aggregate::TopCities { limit: config::TOP_CITIES },
                    ChartKind::Bar,
                ),
            ],
        )
    }

    /// Every aggregate the engine offers, each on its usual chart.
    pub fn standard() -> Self {
        let mut dashboard = Self::classic();
        dashboard.panels.extend([
            Panel::new(
                "Top 5 Products by Volume",
                Aggregate::TopProductsByVolume { limit: config::TOP_PRODUCTS },
                ChartKind::Bar,
            ),
            Panel::new("Purchases over Time", Aggregate::PurchaseTimestamps, ChartKind::Histogram),
            Panel::new("Correlation Matrix", Aggregate::CorrelationMatrix, ChartKind::Heatmap),
            Panel::new("Payment Value by Delivery Status", Aggregate::PaymentByDelivery, ChartKind::BoxPlot),
            Panel::new("Delivery Punctuality", Aggregate::DeliveryCounts, ChartKind::Bar),
            Panel::new("Delivery Punctuality Share", Aggregate::DeliveryCounts, ChartKind::Pie),
        ]);
        dashboard
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Filter `dataset` by `bounds` and evaluate every panel.
    pub fn render(&self, dataset: &Dataset, bounds: Option<DateBounds>) -> Result<DashboardReport> {
        let view = dataset.filter(bounds);
        let rows = view.len()?;
        let kpis = view.metrics().kpis()?;

        let mut panels = Vec::with_capacity(self.panels.len());
        for panel in &self.panels {
            panels.push(PanelOutput {
                title: panel.title.clone(),
                chart: panel.chart,
                data: evaluate(&view, panel.aggregate)?,
            });
        }

        info!(rows, panels = panels.len(), "dashboard rendered");
        Ok(DashboardReport {
            title: self.title.clone(),
            bounds,
            rows,
            kpis,
            panels,
        })
    }
}

fn evaluate(view: &FilteredView<'_>, aggregate: Aggregate) -> Result<PanelData> {
    let metrics = view.metrics();
    let dist = view.distributions();
    Ok(match aggregate {
        Aggregate::PaymentValues => PanelData::Values(dist.payment_values()?),
        Aggregate::ReviewScores => PanelData::Scores(dist.review_scores()?),
        Aggregate::ReviewScoreCounts => PanelData::ScoreCounts(metrics.review_score_counts()?),
        Aggregate::PurchaseTimestamps => PanelData::Timestamps(dist.purchase_timestamps()?),
        Aggregate::TopProductsBySales { limit } => {
            PanelData::RankedValues(metrics.top_products_by_sales(limit)?)
        }
        Aggregate::TopProductsByVolume { limit } => {
            PanelData::RankedCounts(metrics.top_products_by_volume(limit)?)
        }
        Aggregate::TopCities { limit } => PanelData::RankedCounts(metrics.top_cities(limit)?),
        Aggregate::CorrelationMatrix => PanelData::Correlation(dist.correlation_matrix()?),
        Aggregate::DeliveryCounts => PanelData::Delivery(metrics.delivery_counts()?),
        Aggregate::PaymentByDelivery => PanelData::PaymentSplit(dist.payment_by_delivery()?),
    })
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

/// Format an amount as `$1,234.56`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "n/a".to_string();
    }
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        match &self.bounds {
            Some(b) => writeln!(f, "Date range: {} to {} ({} rows)", b.start, b.end, self.rows)?,
            None => writeln!(f, "Date range: all ({} rows)", self.rows)?,
        }

        writeln!(f, "\n### Key Metrics")?;
        writeln!(f, "  Total Sales:         {}", format_currency(self.kpis.total_sales))?;
        let avg = self
            .kpis
            .avg_order_value
            .map(format_currency)
            .unwrap_or_else(|| "n/a".to_string());
        writeln!(f, "  Average Order Value: {}", avg)?;
        writeln!(f, "  Total Orders:        {}", self.kpis.total_orders)?;

        for panel in &self.panels {
            writeln!(f, "\n### {} [{:?}]", panel.title, panel.chart)?;
            write_panel(f, &panel.data)?;
        }
        Ok(())
    }
}

fn write_panel(f: &mut fmt::Formatter<'_>, data: &PanelData) -> fmt::Result {
    match data {
        PanelData::Values(values) => write_summary(f, values),
        PanelData::Scores(scores) => {
            let as_f64: Vec<f64> = scores.iter().map(|s| *s as f64).collect();
            write_summary(f, &as_f64)
        }
        PanelData::ScoreCounts(counts) => {
            for c in counts {
                writeln!(f, "  {}: {}", c.score, c.count)?;
            }
            Ok(())
        }
        PanelData::Timestamps(ts) => match (ts.iter().min(), ts.iter().max()) {
            (Some(lo), Some(hi)) => writeln!(f, "  {} purchases from {} to {}", ts.len(), lo, hi),
            _ => writeln!(f, "  no purchases"),
        },
        PanelData::RankedValues(entries) => {
            for (i, e) in entries.iter().enumerate() {
                writeln!(f, "  {:>2}. {}  {}", i + 1, e.key, format_currency(e.value))?;
            }
            Ok(())
        }
        PanelData::RankedCounts(entries) => {
            for (i, e) in entries.iter().enumerate() {
                writeln!(f, "  {:>2}. {}  {}", i + 1, e.key, e.count)?;
            }
            Ok(())
        }
        PanelData::Correlation(matrix) => {
            for (name, row) in matrix.columns.iter().zip(&matrix.values) {
                let cells: Vec<String> = row
                    .iter()
                    .map(|v| if v.is_nan() { "   nan".to_string() } else { format!("{:>6.2}", v) })
                    .collect();
                writeln!(f, "  {:<28} {}", name, cells.join(" "))?;
            }
            Ok(())
        }
        PanelData::Delivery(counts) => {
            writeln!(f, "  on time: {}", counts.on_time)?;
            writeln!(f, "  late:    {}", counts.late)
        }
        PanelData::PaymentSplit(split) => {
            write!(f, "  on time:")?;
            write_summary(f, &split.on_time)?;
            write!(f, "  late:")?;
            write_summary(f, &split.late)
        }
    }
}

fn write_summary(f: &mut fmt::Formatter<'_>, values: &[f64]) -> fmt::Result {
    if values.is_empty() {
        return writeln!(f, "  no values");
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    writeln!(
        f,
        "  n={} min={:.2} mean={:.2} max={:.2}",
        values.len(),
        min,
        mean,
        max
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(12.5), "$12.50");
        assert_eq!(format_currency(1234.567), "$1,234.57");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-999.999), "-$1,000.00");
        assert_eq!(format_currency(f64::NAN), "n/a");
    }

    #[test]
    fn standard_layout_extends_classic() {
        let classic = Dashboard::classic();
        let standard = Dashboard::standard();
        assert_eq!(classic.panels().len(), 4);
        assert_eq!(&standard.panels()[..4], classic.panels());
        assert!(standard
            .panels()
            .iter()
            .any(|p| p.aggregate == Aggregate::CorrelationMatrix && p.chart == ChartKind::Heatmap));
    }

    #[test]
    fn aggregate_serializes_with_tag() {
        let json = serde_json::to_value(Aggregate::TopCities { limit: 10 }).unwrap();
        assert_eq!(json, serde_json::json!({"name": "top_cities", "limit": 10}));
    }
}
