// The KPI engine proper: aggregation, baseline rescaling, delta verdicts.
//
// Every function here is pure. Bad input degrades to `None` (or a neutral
// verdict) and never to an error.
use crate::aliases::{AliasTable, Metric, RowIndex};
use crate::types::{CanonicalMetrics, DeltaClass, FavorableDirection, KpiDelta, KpiKind, Row};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use tracing::debug;

/// Weeks a monthly baseline is taken to span.
pub const DEFAULT_BASELINE_WEEKS: NonZeroU32 = match NonZeroU32::new(4) {
    Some(n) => n,
    None => unreachable!(),
};

/// Aggregate rows using the builtin alias table.
pub fn aggregate(rows: &[Row]) -> CanonicalMetrics {
    aggregate_with(rows, AliasTable::builtin())
}

/// Sum and derive the canonical metrics across `rows`.
///
/// Labor percent is taken from labor dollars when both sales and labor
/// dollars are positive. Otherwise it is the sales-weighted mean of per-row
/// labor percentages, counting only rows with positive sales.
pub fn aggregate_with(rows: &[Row], aliases: &AliasTable) -> CanonicalMetrics {
    let mut sales = 0.0;
    let mut transactions = 0.0;
    let mut labor_dollars = 0.0;
    let mut weighted_pct = 0.0;
    let mut pct_weight = 0.0;

    for (i, row) in rows.iter().enumerate() {
        let idx = RowIndex::new(row);
        let row_sales = idx.resolve(aliases.aliases(Metric::Sales));
        let row_trans = idx.resolve(aliases.aliases(Metric::Transactions));
        let row_labor = idx.resolve(aliases.aliases(Metric::LaborDollars));
        let row_pct = idx.resolve(aliases.aliases(Metric::LaborPct));

        if row_sales.is_none() && row_trans.is_none() && row_labor.is_none() && row_pct.is_none() {
            debug!(row = i, "row contributed no recognised metric");
        }

        sales += row_sales.unwrap_or(0.0);
        transactions += row_trans.unwrap_or(0.0);
        labor_dollars += row_labor.unwrap_or(0.0);

        if let (Some(s), Some(pct)) = (row_sales, row_pct) {
            if s > 0.0 {
                weighted_pct += s * pct;
                pct_weight += s;
            }
        }
    }

    let labor_pct = if sales > 0.0 && labor_dollars > 0.0 {
        Some(labor_dollars / sales * 100.0)
    } else if pct_weight > 0.0 {
        Some(weighted_pct / pct_weight)
    } else {
        None
    };

    CanonicalMetrics {
        sales,
        transactions,
        labor_dollars: (labor_dollars != 0.0).then_some(labor_dollars),
        labor_pct,
        avg_ticket: (transactions > 0.0).then(|| sales / transactions),
    }
}

/// Rescales a monthly baseline to a weekly-equivalent figure.
///
/// Only the additive metrics (sales, transactions, labor dollars) are
/// divided; labor percent and average ticket are ratios and pass through.
/// Applying the normalizer twice divides twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineNormalizer {
    weeks: NonZeroU32,
}

impl Default for BaselineNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE_WEEKS)
    }
}

impl BaselineNormalizer {
    pub fn new(weeks: NonZeroU32) -> Self {
        BaselineNormalizer { weeks }
    }

    pub fn weeks(&self) -> NonZeroU32 {
        self.weeks
    }

    pub fn normalize(&self, period: &CanonicalMetrics) -> CanonicalMetrics {
        let divisor = f64::from(self.weeks.get());
        let scale = |v: f64| if v.is_finite() { v / divisor } else { v };
        CanonicalMetrics {
            sales: scale(period.sales),
            transactions: scale(period.transactions),
            labor_dollars: period.labor_dollars.map(scale),
            ..*period
        }
    }
}

/// Normalize with the default four-week divisor.
pub fn normalize_baseline(period: &CanonicalMetrics) -> CanonicalMetrics {
    BaselineNormalizer::default().normalize(period)
}

/// Verdict for a signed change given which direction is favorable.
pub fn classify_delta(delta: f64, favorable: FavorableDirection) -> DeltaClass {
    if !delta.is_finite() || delta == 0.0 {
        return DeltaClass::Neutral;
    }
    let improved = match favorable {
        FavorableDirection::Down => delta < 0.0,
        FavorableDirection::Up => delta > 0.0,
    };
    if improved {
        DeltaClass::Good
    } else {
        DeltaClass::Bad
    }
}

/// Compare two snapshots metric by metric, in [`KpiKind::ALL`] order.
///
/// `baseline` is used as given; normalize it first if it is a monthly total.
pub fn compare(current: &CanonicalMetrics, baseline: &CanonicalMetrics) -> Vec<KpiDelta> {
    KpiKind::ALL
        .into_iter()
        .map(|kind| {
            let cur = kind.value(current);
            let base = kind.value(baseline);
            let delta = match (cur, base) {
                (Some(c), Some(b)) => Some(c - b).filter(|d| d.is_finite()),
                _ => None,
            };
            let pct_change = match (delta, base) {
                (Some(d), Some(b)) if b != 0.0 => Some(d / b.abs() * 100.0),
                _ => None,
            };
            let class = delta
                .map(|d| classify_delta(d, kind.favorable_direction()))
                .unwrap_or_default();
            KpiDelta {
                kind,
                current: cur,
                baseline: base,
                delta,
                pct_change,
                class,
            }
        })
        .collect()
}
