//! Application configuration
//!
//! Loaded from TOML; every field has a default, so an empty file is valid.
//!
//! ```toml
//! [window]
//! title = "Inspector"
//! width = 1024
//! height = 768
//!
//! [animation]
//! tick_interval_ms = 10
//! increment = 0.05
//!
//! [paint]
//! clear_color = 0xFF202020
//!
//! [logging]
//! filter = "veneer_layout=trace,info"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use veneer_animation::{AnimationManager, DEFAULT_INCREMENT, DEFAULT_TICK_INTERVAL};
use veneer_core::Color;
use veneer_paint::{PaintPipeline, DEFAULT_MAX_SURFACE_DIMENSION};
use veneer_platform::WindowConfig;

use crate::error::{AppError, Result};

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub animation: AnimationConfig,
    pub paint: PaintConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Defaults applied to animation managers and the scheduler
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub tick_interval_ms: u64,
    /// Progress added per tick
    pub increment: f64,
    /// Progress removed per tick on the falling half of in-out ramps
    pub secondary_increment: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            increment: DEFAULT_INCREMENT,
            secondary_increment: DEFAULT_INCREMENT,
        }
    }
}

impl AnimationConfig {
    /// Never zero, so a misconfigured timer cannot spin
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// A manager preloaded with these increments
    pub fn manager(&self) -> AnimationManager {
        AnimationManager::new()
            .increment(self.increment)
            .secondary_increment(self.secondary_increment)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaintConfig {
    /// Surfaces wider or taller than this are not allocated
    pub max_surface_dimension: u32,
    /// Straight `0xAARRGGBB`
    pub clear_color: u32,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            max_surface_dimension: DEFAULT_MAX_SURFACE_DIMENSION,
            clear_color: 0xFFFF_FFFF,
        }
    }
}

impl PaintConfig {
    pub fn clear_color(&self) -> Color {
        Color::from_argb(self.clear_color)
    }

    pub fn pipeline(&self) -> PaintPipeline {
        PaintPipeline::new()
            .with_max_surface_dimension(self.max_surface_dimension)
            .with_clear_color(self.clear_color())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `VENEER_LOG`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
