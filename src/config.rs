//! Tool configuration.
//!
//! Handles loading, validating, and merging `trez.toml`. Stock defaults are
//! the base layer; a config file overrides any subset of keys; command-line
//! flags override both.
//!
//! ## Config File Location
//!
//! `trez.toml` in the working directory is picked up automatically. Pass
//! `--config path/to/file.toml` to use another file instead.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [resize]
//! width = 0                 # 0 = source width
//! height = 0                # 0 = source height
//! max_side = 0              # 0 = unbounded; wins over max_height/max_width
//! max_width = 0
//! max_height = 0            # wins over max_width
//! algo = "fit"              # fit | fill
//! gravity = "center"        # center, north, south, west, east,
//!                           # north_west, north_east, south_west, south_east
//! background = [0, 0, 0]    # R, G, B letterbox colour for fit
//!
//! [output]
//! format = "jpeg"           # jpeg | webp | png
//! quality = 0               # 0-100, 0 = format default
//! progressive = false       # JPEG only
//!
//! [processing]
//! max_processes = 4         # Max parallel workers for batch (omit for auto)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::options::{Algo, Background, Format, Gravity, Options};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in a directory when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "trez.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `trez.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output size and placement.
    pub resize: ResizeConfig,
    /// Codec and quality.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 0-100".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Resize options described by this config.
    pub fn options(&self) -> Options {
        let r = &self.resize;
        let o = &self.output;
        Options {
            width: r.width,
            height: r.height,
            max_side: r.max_side,
            max_width: r.max_width,
            max_height: r.max_height,
            algo: r.algo,
            gravity: r.gravity,
            background: r.background,
            format: o.format,
            quality: o.quality,
            progressive: o.progressive,
        }
    }
}

/// Target size, strategy and letterbox colour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub width: u32,
    pub height: u32,
    pub max_side: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub algo: Algo,
    pub gravity: Gravity,
    pub background: Background,
}

/// Output codec settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: Format,
    /// 0–100; 0 selects the format default.
    pub quality: i32,
    pub progressive: bool,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
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

/// Read a config file as a raw TOML value.
pub fn read_raw_config(file: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(file)?;
    Ok(toml::from_str(&content)?)
}

/// Load [`CONFIG_FILE_NAME`] from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    read_raw_config(&config_path).map(Some)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from [`CONFIG_FILE_NAME`] in `dir`, or stock defaults if absent.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Load config from an explicit file. A missing file is an error.
pub fn load_config_file(file: &Path) -> Result<Config, ConfigError> {
    resolve_config(stock_defaults_value(), Some(read_raw_config(file)?))
}

/// Returns a fully-commented stock `trez.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# trez configuration
# ==================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# trez reads ./trez.toml when present, or the file given with --config.
# Command-line flags override values from this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output size and placement
# ---------------------------------------------------------------------------
[resize]
# Explicit output size in pixels. 0 keeps the source dimension.
width = 0
height = 0

# Bounds applied after width/height are resolved. Only the first non-zero
# one in the order max_side, max_height, max_width takes effect, and only
# when the image exceeds it. Aspect ratio is preserved.
max_side = 0
max_width = 0
max_height = 0

# fit:  whole image visible, padded with `background`
# fill: canvas fully covered, overflow cropped
algo = "fit"

# Anchor for placement (fit) or for the crop window (fill):
# center, north, south, west, east,
# north_west, north_east, south_west, south_east
gravity = "center"

# Letterbox colour for fit, as [R, G, B].
background = [0, 0, 0]

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[output]
# jpeg, webp or png
format = "jpeg"

# 0-100. 0 picks the default (85). For png, higher quality means less
# compression effort.
quality = 0

# Progressive JPEG scans. Ignored for webp and png.
progressive = false

# ---------------------------------------------------------------------------
# Batch processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers. Omit to use all CPU cores.
# Values above the core count are clamped down.
# max_processes = 4
"##
}
