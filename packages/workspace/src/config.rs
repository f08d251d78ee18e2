use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Workspace configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Directory for the file-backed store's case documents
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Bounded capacity of per-subscriber event channels
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_event_capacity() -> usize {
    100
}

impl WorkspaceConfig {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: WorkspaceConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(WorkspaceConfig::default())
        }
    }

    /// Get absolute path to the data directory
    pub fn data_path(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.data_dir)
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            event_capacity: default_event_capacity(),
        }
    }
}
