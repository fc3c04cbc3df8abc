//! Animated GIF export.

use super::sink::FrameSink;
use super::video::VideoError;
use gif::{Encoder, Repeat};
use image::RgbaImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Quantizer speed for the encoder (1 = best quality, 30 = fastest).
const GIF_SPEED: i32 = 10;

/// Looping GIF sink. The file is created on the first frame.
pub struct GifSink {
    path: PathBuf,
    /// Frame delay in hundredths of a second.
    delay: u16,
    encoder: Option<Encoder<BufWriter<File>>>,
    frames: usize,
    finished: bool,
}

impl GifSink {
    pub fn new(path: impl Into<PathBuf>, fps: u32) -> Self {
        let delay = (100 / fps.max(1)).clamp(1, u16::MAX as u32) as u16;
        Self {
            path: path.into(),
            delay,
            encoder: None,
            frames: 0,
            finished: false,
        }
    }

    fn create_encoder(
        &self,
        width: u16,
        height: u16,
    ) -> Result<Encoder<BufWriter<File>>, VideoError> {
        let file = File::create(&self.path)?;
        let mut encoder = Encoder::new(BufWriter::new(file), width, height, &[])?;
        encoder.set_repeat(Repeat::Infinite)?;
        debug!(output = %self.path.display(), width, height, "created GIF encoder");
        Ok(encoder)
    }
}

/// GIF dimensions are 16-bit.
fn gif_dimensions(frame: &RgbaImage) -> Result<(u16, u16), VideoError> {
    let (width, height) = frame.dimensions();
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(VideoError::FrameTooLarge { width, height }),
    }
}

impl FrameSink for GifSink {
    fn push_frame(&mut self, frame: &RgbaImage) -> Result<(), VideoError> {
        if self.finished {
            return Err(VideoError::AlreadyFinished);
        }
        let (width, height) = gif_dimensions(frame)?;
        if self.encoder.is_none() {
            self.encoder = Some(self.create_encoder(width, height)?);
        }

        let mut pixels = frame.as_raw().clone();
        let mut gif_frame = gif::Frame::from_rgba_speed(width, height, &mut pixels, GIF_SPEED);
        gif_frame.delay = self.delay;
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.write_frame(&gif_frame)?;
        }
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        if self.finished {
            return Err(VideoError::AlreadyFinished);
        }
        self.finished = true;

        let encoder = self.encoder.take().ok_or(VideoError::NoFrames)?;
        // Writes the trailer; the flush surfaces any buffered write error.
        let mut writer = encoder.into_inner()?;
        writer.flush()?;
        info!(frames = self.frames, output = %self.path.display(), "GIF encoding done");
        Ok(())
    }

    fn frames_written(&self) -> usize {
        self.frames
    }

    fn output_path(&self) -> &Path {
        &self.path
    }
}
