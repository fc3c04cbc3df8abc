//! Frame sinks: where painted frames go.

use super::gif::GifSink;
use super::video::{Mp4Sink, VideoError};
use crate::config::{OutputConfig, OutputFormat};
use crate::render::save_png;
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Consumer of painted frames.
///
/// Frames arrive in playback order. `finish` must be called once after the
/// last frame; a sink that never received a frame fails with
/// [`VideoError::NoFrames`].
pub trait FrameSink {
    /// Encode one frame.
    fn push_frame(&mut self, frame: &RgbaImage) -> Result<(), VideoError>;

    /// Flush everything and close the output.
    fn finish(&mut self) -> Result<(), VideoError>;

    /// Frames accepted so far.
    fn frames_written(&self) -> usize;

    /// File or directory this sink writes to.
    fn output_path(&self) -> &Path;
}

/// Create the sink described by `output`.
pub fn open_sink(output: &OutputConfig) -> Box<dyn FrameSink> {
    match output.resolved_format() {
        OutputFormat::Mp4 => Box::new(Mp4Sink::new(&output.path, output.fps)),
        OutputFormat::Gif => Box::new(GifSink::new(&output.path, output.fps)),
        OutputFormat::PngSequence => Box::new(PngSequenceSink::new(&output.path, "frame")),
    }
}

/// Writes each frame as `<prefix>_NNNNN.png` into a directory.
///
/// The directory is created on the first frame.
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    frames: usize,
    finished: bool,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.to_string(),
            frames: 0,
            finished: false,
        }
    }

    /// Path of frame `index`.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_{:05}.png", self.prefix, index))
    }
}

impl FrameSink for PngSequenceSink {
    fn push_frame(&mut self, frame: &RgbaImage) -> Result<(), VideoError> {
        if self.finished {
            return Err(VideoError::AlreadyFinished);
        }
        if self.frames == 0 {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.frame_path(self.frames);
        save_png(frame, &path)?;
        debug!(path = %path.display(), "wrote frame");
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        if self.finished {
            return Err(VideoError::AlreadyFinished);
        }
        self.finished = true;
        if self.frames == 0 {
            return Err(VideoError::NoFrames);
        }
        info!(frames = self.frames, dir = %self.dir.display(), "PNG sequence done");
        Ok(())
    }

    fn frames_written(&self) -> usize {
        self.frames
    }

    fn output_path(&self) -> &Path {
        &self.dir
    }
}
