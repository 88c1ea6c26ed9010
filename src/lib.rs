// Normalizes heterogeneous sales/labor rows into canonical KPIs.
//
// The engine (`aliases`, `kpi`, `util`) is pure and never fails: bad
// cells degrade to `None` and render as `util::NO_VALUE`. The remaining
// modules read CSV input, load configuration and write reports.
pub mod aliases;
pub mod config;
pub mod error;
pub mod kpi;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use aliases::{resolve, AliasTable, Metric, RowIndex};
pub use config::EngineConfig;
pub use error::{KpiError, Result};
pub use kpi::{aggregate, aggregate_with, classify_delta, compare, normalize_baseline, BaselineNormalizer};
pub use types::{CanonicalMetrics, DeltaClass, FavorableDirection, KpiDelta, KpiKind, Row, Scalar};
pub use util::{fmt_money, fmt_money2, fmt_number, fmt_pct, parse_number};
