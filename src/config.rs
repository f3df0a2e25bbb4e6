//! Configuration for the walkthrough player.
//!
//! Settings layer file → CLI: an optional `drill.toml` next to the
//! working directory provides defaults, and command-line flags override
//! individual values.
//!
//! # Configuration File Format
//!
//! ```toml
//! # Multiplier applied to every stage delay and reveal interval.
//! # 0.1 plays the walkthrough at 10x speed.
//! speed = 1.0
//!
//! # Skip the confirmation gate prompt (same as --yes).
//! auto_confirm = false
//!
//! # Task played when none is given on the command line.
//! default_task = "交换机故障排查"
//!
//! # Optional stage table override (JSON, see `drill export`).
//! stages_file = "stages.json"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "drill.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DrillConfig {
    /// Multiplier applied to stage delays and reveal intervals
    pub speed: f64,
    /// Skip the confirmation gate prompt
    pub auto_confirm: bool,
    /// Task played when none is given on the command line
    pub default_task: String,
    /// Optional stage table override, relative to the config file
    pub stages_file: Option<PathBuf>,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            auto_confirm: false,
            default_task: "交换机故障排查".to_string(),
            stages_file: None,
        }
    }
}

impl DrillConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: DrillConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `drill.toml` from a directory if present, defaults otherwise.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            anyhow::bail!("speed must be a positive number, got {}", self.speed);
        }
        if self.default_task.trim().is_empty() {
            anyhow::bail!("default_task must not be blank");
        }
        Ok(())
    }
}
