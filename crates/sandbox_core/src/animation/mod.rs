//! Grid animation: paint each grid and stream it into an encoder.
//!
//! The [`Animator`] pulls grids one at a time. The first grid initializes a
//! [`FrameSurface`]; every later grid repaints it in place, and each painted
//! frame goes to a [`FrameSink`] (MP4, GIF or PNG sequence).
//!
//! # Example
//!
//! ```ignore
//! use sandbox_core::{animate, AnimationConfig};
//!
//! let summary = animate(&AnimationConfig::default())?;
//! println!("{} frames -> {}", summary.frames, summary.output.display());
//! ```

mod gif;
mod sink;
mod surface;
mod video;

pub use self::gif::GifSink;
pub use sink::{open_sink, FrameSink, PngSequenceSink};
pub use surface::FrameSurface;
pub use video::{Mp4Sink, VideoError};

use crate::config::{AnimationConfig, ConfigError, RenderConfig};
use crate::grid::Grid;
use crate::render::RenderError;
use crate::sandbox_log::{LogError, SandboxLog};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum AnimationError {
    #[error(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Video(#[from] VideoError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The log held no grid, so there is nothing to initialize the display with.
    #[error("log contains no grids")]
    EmptyLog,

    #[error("animator has already run")]
    AlreadyRun,
}

/// Lifecycle of an [`Animator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Uninitialized,
    Streaming { frames: usize },
    Finished { frames: usize },
}

/// Result of a completed animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSummary {
    /// Frames encoded, the first one included.
    pub frames: usize,
    pub grid_size: usize,
    pub output: PathBuf,
}

/// Drives one grid sequence into one sink.
pub struct Animator {
    config: RenderConfig,
    state: AnimationState,
}

impl Animator {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            state: AnimationState::Uninitialized,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Paint and encode every grid of `frames`, then finish the sink.
    ///
    /// The first error from the reader, the surface or the sink aborts the
    /// run and is returned as is. An empty sequence is
    /// [`AnimationError::EmptyLog`].
    pub fn run<I>(
        &mut self,
        frames: I,
        sink: &mut dyn FrameSink,
    ) -> Result<AnimationSummary, AnimationError>
    where
        I: IntoIterator<Item = Result<Grid, LogError>>,
    {
        if self.state != AnimationState::Uninitialized {
            return Err(AnimationError::AlreadyRun);
        }
        let mut frames = frames.into_iter();

        let first = frames.next().ok_or(AnimationError::EmptyLog)??;
        let mut surface = FrameSurface::from_first_grid(&first, &self.config)?;
        drop(first);
        sink.push_frame(surface.image())?;

        let mut count = 1;
        self.state = AnimationState::Streaming { frames: count };
        debug!(grid_size = surface.grid_size(), "display initialized");

        for grid in frames {
            let grid = grid?;
            surface.set_grid(&grid)?;
            sink.push_frame(surface.image())?;
            count += 1;
            self.state = AnimationState::Streaming { frames: count };
            debug!(frame = count, "frame encoded");
        }

        sink.finish()?;
        self.state = AnimationState::Finished { frames: count };

        Ok(AnimationSummary {
            frames: count,
            grid_size: surface.grid_size(),
            output: sink.output_path().to_path_buf(),
        })
    }
}

/// Read the configured log and write the configured animation.
pub fn animate(config: &AnimationConfig) -> Result<AnimationSummary, AnimationError> {
    config.validate()?;
    let log = SandboxLog::new(&config.input.log_path, config.input.grid_size);
    info!(
        input = %log.path().display(),
        output = %config.output.path.display(),
        grid_size = log.size(),
        fps = config.output.fps,
        "rendering sandbox animation"
    );

    let frames = log.frames()?;
    let mut sink = open_sink(&config.output);

    let mut animator = Animator::new(config.render.clone());
    let summary = animator.run(frames, sink.as_mut())?;

    info!(
        frames = summary.frames,
        output = %summary.output.display(),
        "animation saved"
    );
    Ok(summary)
}
