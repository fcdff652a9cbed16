use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::coverability::ExplorationMode;

/// 状态空间探索的可调参数.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ExplorationConfig {
    /// 每探索这么多个节点输出一行进度日志, `0` 表示关闭.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    #[serde(default = "default_mode")]
    pub default_mode: ExplorationMode,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            progress_interval: default_progress_interval(),
            default_mode: default_mode(),
        }
    }
}

impl ExplorationConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn default_progress_interval() -> usize {
    10_000
}

fn default_mode() -> ExplorationMode {
    ExplorationMode::Coverability
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = ExplorationConfig::from_toml_str("progress_interval = 5").unwrap();
        assert_eq!(config.progress_interval, 5);
        assert_eq!(config.default_mode, ExplorationMode::Coverability);
    }

    #[test]
    fn mode_is_read_in_lowercase() {
        let config = ExplorationConfig::from_toml_str("default_mode = \"reachability\"").unwrap();
        assert_eq!(config.default_mode, ExplorationMode::Reachability);
        assert_eq!(config.progress_interval, 10_000);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = ExplorationConfig::load_from_file("/nonexistent/petri-cover.toml").unwrap();
        assert_eq!(config, ExplorationConfig::default());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(ExplorationConfig::from_toml_str("progress_interval = \"many\"").is_err());
    }
}
