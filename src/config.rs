//! Configuration module.
//!
//! Handles loading, validating, and merging `markcard.toml`. Stock defaults
//! are overridden by the user's file, and command-line flags override both.
//!
//! ## Config File Location
//!
//! `--config <FILE>` names the file explicitly (it must exist). Without it,
//! `markcard.toml` in the working directory is used when present.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [card]
//! theme = "default"         # One of `markcard themes`
//! background = ""           # Override color; empty = theme default
//! text = ""                 # Override color; empty = theme default
//!
//! [export]
//! format = "png"            # png, jpeg (jpg) or svg
//! quality = 95              # Lossy quality, 50-100
//! scale = 2.0               # Pixel ratio, 1-4 in steps of 0.5
//! include_background = true # false = transparent canvas (not for JPEG)
//! file_name = ""            # Base name; empty = markdown-card-<today>
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [card]
//! theme = "ocean"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::color::{Color, ColorError, parse_override};
use crate::export::{ExportConfig, ExportFormat, Quality, Scale, default_file_name};
use crate::theme::ThemeId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "markcard.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

impl From<ColorError> for ConfigError {
    fn from(e: ColorError) -> Self {
        ConfigError::Validation(e.to_string())
    }
}

/// Configuration loaded from `markcard.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Card appearance.
    pub card: CardConfig,
    /// Export settings.
    pub export: ExportSettings,
}

/// Card appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CardConfig {
    /// Theme id.
    pub theme: String,
    /// Background override; empty means the theme's own.
    pub background: String,
    /// Text color override; empty means the theme's own.
    pub text: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            theme: ThemeId::Default.as_str().to_string(),
            background: String::new(),
            text: String::new(),
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    pub format: ExportFormat,
    /// Lossy encoding quality (50 = smallest, 100 = best).
    pub quality: u32,
    /// Device pixel ratio of the capture.
    pub scale: f32,
    /// Keep the card background; `false` exports on a transparent canvas.
    pub include_background: bool,
    /// Output base name without extension; empty means dated default.
    pub file_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: 95,
            scale: 2.0,
            include_background: true,
            file_name: String::new(),
        }
    }
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if ThemeId::parse(&self.card.theme).is_none() {
            return Err(ConfigError::Validation(format!(
                "card.theme {:?} is not a known theme",
                self.card.theme
            )));
        }
        parse_override(&self.card.background)?;
        parse_override(&self.card.text)?;

        let quality = u32::from(Quality::MIN)..=u32::from(Quality::MAX);
        if !quality.contains(&self.export.quality) {
            return Err(ConfigError::Validation(
                "export.quality must be 50-100".into(),
            ));
        }
        let scale = self.export.scale;
        if !(Scale::MIN..=Scale::MAX).contains(&scale) || (scale * 2.0).fract() != 0.0 {
            return Err(ConfigError::Validation(
                "export.scale must be 1-4 in steps of 0.5".into(),
            ));
        }
        Ok(())
    }

    /// Background and text overrides, `None` where unset.
    pub fn card_colors(&self) -> Result<(Option<Color>, Option<Color>), ConfigError> {
        Ok((
            parse_override(&self.card.background)?,
            parse_override(&self.card.text)?,
        ))
    }

    /// The export dialog settings this config describes.
    pub fn export_config(&self) -> ExportConfig {
        let file_name = match self.export.file_name.trim() {
            "" => default_file_name(),
            name => name.to_string(),
        };
        ExportConfig {
            format: self.export.format,
            quality: Quality::new(self.export.quality),
            scale: Scale::new(self.export.scale),
            include_background: self.export.include_background,
            file_name,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Pick the config file: the explicit path, else `markcard.toml` in `cwd`
/// when it exists.
///
/// Returns `Err(NotFound)` for an explicit path that does not exist.
pub fn find_config(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>, ConfigError> {
    match explicit {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(ConfigError::NotFound(path.to_path_buf())),
        None => {
            let candidate = cwd.join(CONFIG_FILE);
            Ok(candidate.exists().then_some(candidate))
        }
    }
}

/// Load a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match find_config(explicit, cwd)? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            Some(load_raw_config(&path)?)
        }
        None => None,
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `markcard.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# markcard Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# markcard reads ./markcard.toml, or the file given with --config.
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Card appearance
# ---------------------------------------------------------------------------
[card]
# Theme id. Run `markcard themes` for the list.
theme = "default"

# Background and text color overrides: #hex, a CSS color name, or
# rgb()/hsl(). Leave empty to keep the theme's own colors.
# `markcard colors` prints the preset palette.
background = ""
text = ""

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# png  - best for most uses, supports transparency
# jpeg - smaller files, no transparency (always exported on white)
# svg  - vector, scales to any size
format = "png"

# Lossy encoding quality (50 = smallest, 100 = best). Used by JPEG.
quality = 95

# Pixel ratio of raster exports: 1 to 4 in steps of 0.5.
scale = 2.0

# Keep the card background. false = transparent canvas (ignored by JPEG).
include_background = true

# Output file name without extension. Empty = markdown-card-YYYY-MM-DD.
file_name = ""
"##
}
