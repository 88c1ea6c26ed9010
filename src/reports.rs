// Turns engine results into display rows and the JSON summary.
use crate::kpi::compare;
use crate::types::{CanonicalMetrics, KpiComparisonRow, KpiDelta, KpiKind, KpiSummary};
use crate::util::{fmt_pct, NO_VALUE};
use chrono::Utc;
use std::num::NonZeroU32;

/// Signed rendering of a delta in the metric's own unit, e.g. `+$200`.
fn format_delta(kind: KpiKind, delta: Option<f64>) -> String {
    match delta {
        Some(d) if d > 0.0 => format!("+{}", kind.format(Some(d))),
        _ => kind.format(delta),
    }
}

fn format_change(pct: Option<f64>) -> String {
    match pct {
        Some(p) if p > 0.0 => format!("+{}", fmt_pct(p)),
        _ => fmt_pct(pct),
    }
}

pub fn comparison_rows(deltas: &[KpiDelta]) -> Vec<KpiComparisonRow> {
    deltas
        .iter()
        .map(|d| KpiComparisonRow {
            metric: d.kind.label().to_string(),
            current: d.kind.format(d.current),
            baseline: d.kind.format(d.baseline),
            delta: format_delta(d.kind, d.delta),
            change_pct: format_change(d.pct_change),
            verdict: match d.class.as_str() {
                "" => NO_VALUE.to_string(),
                s => s.to_string(),
            },
        })
        .collect()
}

/// Everything a dashboard needs for one current-vs-baseline view.
///
/// `baseline_weekly` must already be normalized.
pub fn generate_summary(
    current: CanonicalMetrics,
    baseline_weekly: CanonicalMetrics,
    baseline_weeks: NonZeroU32,
    alias_table_version: u32,
    current_rows: usize,
    baseline_rows: usize,
) -> KpiSummary {
    KpiSummary {
        generated_at: Utc::now(),
        baseline_weeks: baseline_weeks.get(),
        alias_table_version,
        current_rows,
        baseline_rows,
        deltas: compare(&current, &baseline_weekly),
        current,
        baseline_weekly,
    }
}
