//! Configuration de l'application

use crate::diagnostics::{HeavyError, LogLevel};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShaderAppConfig {
    pub render: RenderSettings,
    pub window: WindowSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Plafond de frames par seconde
    pub target_fps: u32,
    pub vsync: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            target_fps: crate::DEFAULT_TARGET_FPS,
            vsync: true,
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Pixel Shader".to_string(),
            width: 800,
            height: 600,
        }
    }
}

impl ShaderAppConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ShaderAppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn load_or_default(path: &str) -> Self {
        Self::load_from_file(path).unwrap_or_else(|err| {
            log::warn!("Configuration '{}' ignorée: {}", path, err);
            Self::default()
        })
    }

    /// Vérifie les valeurs qui rendraient le rendu impossible
    pub fn validate(&self) -> Result<(), HeavyError> {
        if self.render.target_fps == 0 {
            return Err(HeavyError::InvalidConfig(
                "render.target_fps doit être strictement positif".to_string(),
            ));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(HeavyError::InvalidConfig(format!(
                "dimensions de fenêtre invalides: {}x{}",
                self.window.width, self.window.height
            )));
        }
        Ok(())
    }
}
