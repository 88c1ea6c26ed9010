// Header alias tables and per-row field resolution.
//
// Source rows name the same figure in many ways (`Sales`, `Net Sales`,
// `revenue`). An `AliasTable` lists, per `Metric`, the accepted spellings
// in priority order; `RowIndex` finds the first one a row actually carries.
use crate::types::{Row, Scalar};
use crate::util::{normalize_key, parse_number};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// Raw metrics that are read directly from row cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Sales,
    Transactions,
    LaborDollars,
    LaborPct,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Sales,
        Metric::Transactions,
        Metric::LaborDollars,
        Metric::LaborPct,
    ];
}

pub const BUILTIN_VERSION: u32 = 1;

static BUILTIN: Lazy<AliasTable> = Lazy::new(|| {
    let mut aliases = BTreeMap::new();
    aliases.insert(Metric::Sales, strings(&["Sales", "Net Sales", "Revenue"]));
    aliases.insert(Metric::Transactions, strings(&["Transactions", "Trans", "Tickets"]));
    aliases.insert(
        Metric::LaborDollars,
        strings(&["Labor", "Labor$", "Labor $", "Labor Dollars"]),
    );
    aliases.insert(
        Metric::LaborPct,
        strings(&["Labor%", "Labor %", "LaborPct", "Labor Pct"]),
    );
    AliasTable { version: BUILTIN_VERSION, aliases }
});

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// Accepted header spellings per metric; earlier entries win.
///
/// When deserialized, metrics missing from the input keep their builtin
/// spellings, so a config only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PartialAliasTable")]
pub struct AliasTable {
    pub version: u32,
    aliases: BTreeMap<Metric, Vec<String>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PartialAliasTable {
    version: Option<u32>,
    aliases: BTreeMap<Metric, Vec<String>>,
}

impl From<PartialAliasTable> for AliasTable {
    fn from(p: PartialAliasTable) -> Self {
        let mut table = AliasTable::builtin().clone();
        if let Some(v) = p.version {
            table.version = v;
        }
        for (metric, list) in p.aliases {
            table.aliases.insert(metric, list);
        }
        table
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

impl AliasTable {
    pub fn builtin() -> &'static AliasTable {
        &BUILTIN
    }

    pub fn aliases(&self, metric: Metric) -> &[String] {
        self.aliases.get(&metric).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set(&mut self, metric: Metric, list: Vec<String>) {
        self.aliases.insert(metric, list);
    }

    /// First metric (in [`Metric::ALL`] order) that accepts `header`.
    pub fn metric_for_header(&self, header: &str) -> Option<Metric> {
        let key = normalize_key(header);
        Metric::ALL.into_iter().find(|m| {
            self.aliases(*m)
                .iter()
                .any(|a| normalize_key(a) == key)
        })
    }
}

/// Case/whitespace-insensitive view over one row's headers.
///
/// Build it once per row and resolve every metric against it. If two headers
/// normalize to the same key, the later one wins.
pub struct RowIndex<'a> {
    by_key: HashMap<String, &'a Scalar>,
}

impl<'a> RowIndex<'a> {
    pub fn new(row: &'a Row) -> Self {
        let by_key = row.iter().map(|(h, v)| (normalize_key(h), v)).collect();
        RowIndex { by_key }
    }

    /// Value of the first alias present in the row whose cell coerces to a
    /// finite number. Aliases that are present but unparseable are skipped.
    pub fn resolve<S: AsRef<str>>(&self, aliases: &[S]) -> Option<f64> {
        for alias in aliases {
            let alias = alias.as_ref();
            let Some(cell) = self.by_key.get(&normalize_key(alias)) else {
                continue;
            };
            match parse_number(cell) {
                Some(n) if n.is_finite() => return Some(n),
                _ => trace!(alias, ?cell, "alias present but not a finite number"),
            }
        }
        None
    }
}

/// One-shot resolution for a single metric. Prefer [`RowIndex`] when
/// resolving several metrics from the same row.
pub fn resolve<S: AsRef<str>>(row: &Row, aliases: &[S]) -> Option<f64> {
    RowIndex::new(row).resolve(aliases)
}
