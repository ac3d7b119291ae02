//! Scenario files describing which timers to drive
//!
//! The default scenario lives at `~/.config/cadence/scenario.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use cadence_core::{FrameConfig, TimerConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A clock plus the timers it drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub clock: FrameConfig,
    #[serde(default)]
    pub timers: Vec<TimerSpec>,
}

/// One named timer in a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSpec {
    pub name: String,
    #[serde(flatten)]
    pub config: TimerConfig,
    /// Start the timer before the first frame
    #[serde(default = "default_autostart")]
    pub autostart: bool,
}

fn default_autostart() -> bool {
    true
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            clock: FrameConfig::default(),
            timers: vec![
                TimerSpec {
                    name: "cooldown".into(),
                    config: TimerConfig::new(1.5, false),
                    autostart: true,
                },
                TimerSpec {
                    name: "pulse".into(),
                    config: TimerConfig::new(2.0, true),
                    autostart: true,
                },
            ],
        }
    }
}

impl Scenario {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cadence"))
    }

    /// Get the default scenario path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("scenario.toml"))
    }

    /// Load an explicit scenario file. Errors are fatal here since the user asked for it.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        let scenario = Self::parse(&content)
            .with_context(|| format!("Failed to parse scenario {}", path.display()))?;
        info!("Loaded scenario from {:?}", path);
        Ok(scenario)
    }

    /// Parse and validate scenario TOML
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let scenario: Self = toml::from_str(content)?;
        scenario.clock.validate().context("[clock]")?;
        for spec in &scenario.timers {
            spec.config
                .validate()
                .with_context(|| format!("timer '{}'", spec.name))?;
        }
        Ok(scenario)
    }

    /// Load `path` if given, else the default scenario file, else built-in defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let Some(path) = Self::default_path() else {
            warn!("Could not determine config directory");
            return Ok(Self::default());
        };

        if !path.exists() {
            info!("No scenario file found, using defaults");
            return Ok(Self::default());
        }

        match Self::from_file(&path) {
            Ok(scenario) => Ok(scenario),
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Ok(Self::default())
            }
        }
    }
}
