//! Configuration for the sandbox animation.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "input": { "log_path": "runs/sandbox.log" }, "output": { "fps": 10 } }
//! ```

use crate::render::{CellLayout, ColorScale, BACKGROUND};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory by the binary.
pub const DEFAULT_CONFIG_FILE: &str = "sandbox_animation.json";

/// Largest accepted frame side in pixels.
pub const MAX_FRAME_SIZE: u32 = 16_384;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for one animation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub input: InputConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
}

/// Where the log lives and how big its grids are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub log_path: PathBuf,
    /// Grid dimension; also the number of rows per log block.
    pub grid_size: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("../sandbox.log"),
            grid_size: 32,
        }
    }
}

/// How grids are painted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Width and height of each frame in pixels.
    pub frame_size: u32,
    pub color_scale: ColorScale,
    pub background: [u8; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_size: 960,
            color_scale: ColorScale::sandpile(),
            background: BACKGROUND,
        }
    }
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// H.264 MP4 through ffmpeg.
    Mp4,
    /// Animated GIF.
    Gif,
    /// Directory of numbered PNG files.
    PngSequence,
}

impl OutputFormat {
    /// Pick a format from the output path's extension.
    ///
    /// `.mp4` and `.gif` map to their formats; anything else is treated as a
    /// directory for a PNG sequence.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" => Self::Mp4,
            "gif" => Self::Gif,
            _ => Self::PngSequence,
        }
    }
}

/// Where and how frames are encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// Explicit format. `None` means infer from `path`.
    pub format: Option<OutputFormat>,
    /// Playback rate in frames per second.
    pub fps: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sandbox_evolution.mp4"),
            format: None,
            fps: 5,
        }
    }
}

impl OutputConfig {
    pub fn resolved_format(&self) -> OutputFormat {
        self.format
            .unwrap_or_else(|| OutputFormat::from_path(&self.path))
    }
}

impl AnimationConfig {
    /// Load a config from a JSON file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.grid_size == 0 {
            return Err(ConfigError::Invalid("grid_size must be at least 1".into()));
        }
        if self.output.fps == 0 {
            return Err(ConfigError::Invalid("fps must be at least 1".into()));
        }
        if self.render.frame_size > MAX_FRAME_SIZE {
            return Err(ConfigError::Invalid(format!(
                "frame_size {} exceeds the maximum of {}",
                self.render.frame_size, MAX_FRAME_SIZE
            )));
        }
        CellLayout::fit(self.input.grid_size, self.render.frame_size)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        // yuv420p needs even dimensions
        if self.output.resolved_format() == OutputFormat::Mp4 && self.render.frame_size % 2 != 0 {
            return Err(ConfigError::Invalid(format!(
                "frame_size {} must be even for MP4 output",
                self.render.frame_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AnimationConfig::default();
        assert_eq!(config.input.log_path, PathBuf::from("../sandbox.log"));
        assert_eq!(config.input.grid_size, 32);
        assert_eq!(config.output.path, PathBuf::from("sandbox_evolution.mp4"));
        assert_eq!(config.output.fps, 5);
        assert_eq!(config.output.resolved_format(), OutputFormat::Mp4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("a.MP4")), OutputFormat::Mp4);
        assert_eq!(OutputFormat::from_path(Path::new("a.gif")), OutputFormat::Gif);
        assert_eq!(
            OutputFormat::from_path(Path::new("frames")),
            OutputFormat::PngSequence
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "input": { "grid_size": 8 }, "output": { "path": "out.gif" } }"#;
        let config: AnimationConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.input.grid_size, 8);
        assert_eq!(config.input.log_path, PathBuf::from("../sandbox.log"));
        assert_eq!(config.output.resolved_format(), OutputFormat::Gif);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AnimationConfig::default();
        config.input.grid_size = 0;
        assert!(config.validate().is_err());

        let mut config = AnimationConfig::default();
        config.output.fps = 0;
        assert!(config.validate().is_err());

        let mut config = AnimationConfig::default();
        config.render.frame_size = 16;
        assert!(config.validate().is_err());

        let mut config = AnimationConfig::default();
        config.render.frame_size = 961;
        assert!(config.validate().is_err());
        config.output.path = PathBuf::from("out.gif");
        assert!(config.validate().is_ok(), "odd sizes are fine for GIF");

        let mut config = AnimationConfig::default();
        config.render.frame_size = 50_000_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let mut config = AnimationConfig::default();
        config.output.fps = 12;
        config.output.format = Some(OutputFormat::PngSequence);
        config.save(&path).unwrap();

        assert_eq!(AnimationConfig::load(&path).unwrap(), config);
        assert_eq!(
            AnimationConfig::load_or_default(dir.path().join("missing.json")).unwrap(),
            AnimationConfig::default()
        );
    }
}
