//! Configuration for the RMDraw editor core
//!
//! Configuration is organized into logical sections:
//! - Editor behavior (click size, handles, paste offsets, nudging)
//! - Snapping (proximity guides and grid)
//! - History (undo depth)
//!
//! Files may be JSON or TOML; the format is chosen by extension.

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Editor behavior settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Size given to a shape created by a click without drag
    pub min_click_size: f64,
    /// Half-extent of a resize handle's hit area
    pub handle_size: f64,
    /// Offset applied to each successive paste
    pub paste_offset: f64,
    /// Arrow key nudge distance
    pub nudge_step: f64,
    /// Arrow key nudge distance with shift held
    pub nudge_step_large: f64,
    /// Font size for new text nodes
    pub default_font_size: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            min_click_size: 20.0,
            handle_size: 6.0,
            paste_offset: 10.0,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            default_font_size: 12.0,
        }
    }
}

/// Snapping settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnappingSettings {
    /// Show and snap to proximity guides while dragging
    pub proximity_guides_enabled: bool,
    /// Maximum distance at which an edge counts as aligned
    pub proximity_threshold: f64,
    /// Snap dragged points to the grid
    pub snap_to_grid: bool,
    /// Grid spacing in document units
    pub grid_spacing: f64,
}

impl Default for SnappingSettings {
    fn default() -> Self {
        Self {
            proximity_guides_enabled: true,
            proximity_threshold: 5.0,
            snap_to_grid: false,
            grid_spacing: 10.0,
        }
    }
}

/// Undo history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of transactions kept on the undo stack
    pub max_undo_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_undo_depth: 100 }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub editor: EditorSettings,
    pub snapping: SnappingSettings,
    pub history: HistorySettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn format_for(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

fn positive(key: &str, value: f64) -> SettingsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, "must be > 0"))
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config file location: `<config_dir>/rmdraw/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("rmdraw").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("platform config directory not found".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_for(path)?;
        let content = std::fs::read_to_string(path)?;
        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load from the default location, falling back to defaults on any
    /// failure
    pub fn load_or_default() -> Self {
        let path = match Self::default_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Using default config: {}", e);
                return Self::default();
            }
        };
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match format_for(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        positive("editor.min_click_size", self.editor.min_click_size)?;
        positive("editor.handle_size", self.editor.handle_size)?;
        positive("editor.nudge_step", self.editor.nudge_step)?;
        positive("editor.nudge_step_large", self.editor.nudge_step_large)?;
        positive("editor.default_font_size", self.editor.default_font_size)?;
        if !self.editor.paste_offset.is_finite() || self.editor.paste_offset < 0.0 {
            return Err(SettingsError::invalid("editor.paste_offset", "must be >= 0"));
        }

        positive("snapping.proximity_threshold", self.snapping.proximity_threshold)?;
        positive("snapping.grid_spacing", self.snapping.grid_spacing)?;

        if self.history.max_undo_depth == 0 {
            return Err(SettingsError::invalid("history.max_undo_depth", "must be >= 1"));
        }
        Ok(())
    }
}
