//! RMDraw Settings Crate
//!
//! Handles editor configuration: defaults, validation and persistence to
//! JSON or TOML files in the platform config directory.

pub mod config;
pub mod error;

pub use config::{Config, EditorSettings, HistorySettings, SnappingSettings};
pub use error::{SettingsError, SettingsResult};
