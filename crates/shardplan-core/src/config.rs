//! Planner configuration that callers can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Partition count for in-memory scans built without an explicit spec.
    pub default_num_partitions: usize,

    /// Prefix applied to right-hand join columns whose names collide with a
    /// left-hand column.
    pub join_rename_prefix: String,

    /// Wrap width for field values in pretty-printed plans.
    pub display_width: usize,

    /// Include node ids in pretty-printed plans.
    pub display_ids: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_num_partitions: 1,
            join_rename_prefix: "right.".to_string(),
            display_width: 80,
            display_ids: false,
        }
    }
}

impl PlannerConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SHARDPLAN_DEFAULT_PARTITIONS`: default partition count
    /// - `SHARDPLAN_JOIN_RENAME_PREFIX`: join collision prefix
    /// - `SHARDPLAN_DISPLAY_WIDTH`: pretty-print wrap width
    /// - `SHARDPLAN_DISPLAY_IDS`: `true`/`1` to print node ids
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("SHARDPLAN_DEFAULT_PARTITIONS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.default_num_partitions = v;
            }
        }

        if let Ok(s) = std::env::var("SHARDPLAN_JOIN_RENAME_PREFIX") {
            cfg.join_rename_prefix = s;
        }

        if let Ok(s) = std::env::var("SHARDPLAN_DISPLAY_WIDTH") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.display_width = v;
            }
        }

        if let Ok(s) = std::env::var("SHARDPLAN_DISPLAY_IDS") {
            cfg.display_ids = matches!(s.trim(), "1" | "true" | "TRUE" | "yes");
        }

        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_num_partitions == 0 {
            return Err(Error::Config(
                "default_num_partitions must be at least 1".into(),
            ));
        }
        if self.join_rename_prefix.is_empty() {
            return Err(Error::Config("join_rename_prefix must not be empty".into()));
        }
        if self.display_width == 0 {
            return Err(Error::Config("display_width must be at least 1".into()));
        }
        Ok(())
    }
}
