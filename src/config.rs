use crate::rough::RoughOptions;
use crate::stroke::StrokeOptions;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "ROUGHBOARD_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub font_size: f32,
    pub line_height: f32,
    pub font_path: Option<PathBuf>,
    /// Width of the hand-drawn polylines when tessellated.
    pub stroke_width: f32,
    pub rough: RoughOptions,
    pub pen: StrokeOptions,
    pub window: WindowConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            line_height: 24.0,
            font_path: None,
            stroke_width: 2.0,
            rough: RoughOptions::default(),
            pen: StrokeOptions::default(),
            window: WindowConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "roughboard".to_string(),
            width: 1280,
            height: 800,
        }
    }
}

impl BoardConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reads the file named by `ROUGHBOARD_CONFIG`, or the defaults when unset.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}
