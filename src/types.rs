// Row model, canonical metrics and the report shapes built from them.
use crate::util::{fmt_money, fmt_money2, fmt_number, fmt_pct};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// A single cell value as handed over by the ingestion side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Number(f64),
    Text(String),
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Number(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Scalar::Null, Into::into)
    }
}

/// An ordered mapping from header to cell value.
///
/// Headers are kept exactly as supplied. Lookups by metric go through
/// [`crate::aliases::RowIndex`], which compares headers after removing all
/// whitespace and lowercasing (`" Net  Sales "` matches `"netsales"`).
/// Inserting an existing header replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Scalar)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<Scalar>) {
        let header = header.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(h, _)| *h == header) {
            Some(slot) => slot.1 = value,
            None => self.cells.push((header, value)),
        }
    }

    pub fn get(&self, header: &str) -> Option<&Scalar> {
        self.cells.iter().find(|(h, _)| h == header).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<Scalar>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// The five normalized business figures for one period.
///
/// `sales` and `transactions` are always numbers (0 when nothing matched).
/// The optional fields are `None` when they cannot be determined; `None`
/// never means zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMetrics {
    pub sales: f64,
    pub transactions: f64,
    pub labor_dollars: Option<f64>,
    pub labor_pct: Option<f64>,
    pub avg_ticket: Option<f64>,
}

/// Whether an increase or a decrease of a metric is good for the business.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavorableDirection {
    #[default]
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaClass {
    Good,
    Bad,
    #[default]
    #[serde(rename = "")]
    Neutral,
}

impl DeltaClass {
    /// CSS-style class name; empty for a neutral change.
    pub fn as_str(self) -> &'static str {
        match self {
            DeltaClass::Good => "good",
            DeltaClass::Bad => "bad",
            DeltaClass::Neutral => "",
        }
    }
}

impl fmt::Display for DeltaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical metrics as they appear on a comparison, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KpiKind {
    Sales,
    Transactions,
    AvgTicket,
    LaborDollars,
    LaborPct,
}

impl KpiKind {
    pub const ALL: [KpiKind; 5] = [
        KpiKind::Sales,
        KpiKind::Transactions,
        KpiKind::AvgTicket,
        KpiKind::LaborDollars,
        KpiKind::LaborPct,
    ];

    pub fn label(self) -> &'static str {
        match self {
            KpiKind::Sales => "Sales",
            KpiKind::Transactions => "Transactions",
            KpiKind::AvgTicket => "Avg Ticket",
            KpiKind::LaborDollars => "Labor $",
            KpiKind::LaborPct => "Labor %",
        }
    }

    pub fn favorable_direction(self) -> FavorableDirection {
        match self {
            KpiKind::LaborDollars | KpiKind::LaborPct => FavorableDirection::Down,
            _ => FavorableDirection::Up,
        }
    }

    /// Finite value of this metric in `m`, if any.
    pub fn value(self, m: &CanonicalMetrics) -> Option<f64> {
        let v = match self {
            KpiKind::Sales => Some(m.sales),
            KpiKind::Transactions => Some(m.transactions),
            KpiKind::AvgTicket => m.avg_ticket,
            KpiKind::LaborDollars => m.labor_dollars,
            KpiKind::LaborPct => m.labor_pct,
        };
        v.filter(|v| v.is_finite())
    }

    pub fn format(self, value: Option<f64>) -> String {
        match self {
            KpiKind::Sales | KpiKind::LaborDollars => fmt_money(value),
            KpiKind::Transactions => fmt_number(value),
            KpiKind::AvgTicket => fmt_money2(value),
            KpiKind::LaborPct => fmt_pct(value),
        }
    }
}

/// One metric of a period-over-period comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiDelta {
    pub kind: KpiKind,
    pub current: Option<f64>,
    pub baseline: Option<f64>,
    pub delta: Option<f64>,
    pub pct_change: Option<f64>,
    pub class: DeltaClass,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiComparisonRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Current")]
    #[tabled(rename = "Current")]
    pub current: String,
    #[serde(rename = "BaselineWeekly")]
    #[tabled(rename = "BaselineWeekly")]
    pub baseline: String,
    #[serde(rename = "Delta")]
    #[tabled(rename = "Delta")]
    pub delta: String,
    #[serde(rename = "ChangePct")]
    #[tabled(rename = "ChangePct")]
    pub change_pct: String,
    #[serde(rename = "Verdict")]
    #[tabled(rename = "Verdict")]
    pub verdict: String,
}

#[derive(Debug, Serialize)]
pub struct KpiSummary {
    pub generated_at: DateTime<Utc>,
    pub baseline_weeks: u32,
    pub alias_table_version: u32,
    pub current_rows: usize,
    pub baseline_rows: usize,
    pub current: CanonicalMetrics,
    pub baseline_weekly: CanonicalMetrics,
    pub deltas: Vec<KpiDelta>,
}
