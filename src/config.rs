// Engine configuration: the baseline divisor and the alias table.
//
// Both are business policy that has changed over time, so they are loaded
// from JSON rather than baked into the aggregation code. Every field is
// optional; an empty object yields the defaults.
use crate::aliases::{AliasTable, Metric};
use crate::error::{KpiError, Result};
use crate::kpi::BaselineNormalizer;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub baseline_weeks: NonZeroU32,
    pub aliases: AliasTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline_weeks: BaselineNormalizer::default().weeks(),
            aliases: AliasTable::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: EngineConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let cfg = Self::from_json_str(&text)?;
        info!(
            path = %path.display(),
            baseline_weeks = cfg.baseline_weeks.get(),
            alias_version = cfg.aliases.version,
            "loaded engine config"
        );
        Ok(cfg)
    }

    /// Every metric needs at least one non-blank spelling.
    pub fn validate(&self) -> Result<()> {
        for metric in Metric::ALL {
            let list = self.aliases.aliases(metric);
            if list.iter().all(|a| a.trim().is_empty()) {
                return Err(KpiError::Config(format!("no aliases configured for {:?}", metric)));
            }
        }
        debug!(weeks = self.baseline_weeks.get(), "engine config validated");
        Ok(())
    }

    pub fn normalizer(&self) -> BaselineNormalizer {
        BaselineNormalizer::new(self.baseline_weeks)
    }
}
