//! Core library for the sandbox animation tool.
//!
//! This crate provides:
//! - Square digit grids and the `sandbox.log` text format (read and write)
//! - A four-level color scale and grid-to-image rendering
//! - Frame sinks for MP4 (via ffmpeg), animated GIF and PNG sequences
//! - An animator that streams a log into a sink one frame at a time
//! - JSON configuration with defaults for every field

pub mod animation;
pub mod config;
pub mod grid;
pub mod render;
pub mod sandbox_log;

pub use animation::{
    animate, open_sink, AnimationError, AnimationState, AnimationSummary, Animator, FrameSink,
    FrameSurface, GifSink, Mp4Sink, PngSequenceSink, VideoError,
};
pub use config::{
    AnimationConfig, ConfigError, InputConfig, OutputConfig, OutputFormat, RenderConfig,
    DEFAULT_CONFIG_FILE, MAX_FRAME_SIZE,
};
pub use grid::Grid;
pub use render::{render_grid, save_png, CellLayout, ColorScale, RenderError};
pub use sandbox_log::{GridLogWriter, GridReader, LogError, SandboxLog};
