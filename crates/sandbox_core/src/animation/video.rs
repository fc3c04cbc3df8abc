//! MP4 export through ffmpeg.
//!
//! Frames are encoded to PNG and piped into an `ffmpeg` child process as
//! they arrive, so the whole animation is never held in memory here.

use super::sink::FrameSink;
use image::RgbaImage;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, Stdio};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while encoding frames.
#[derive(Debug, Error)]
pub enum VideoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("GIF encoding error: {0}")]
    Gif(#[from] gif::EncodingError),

    #[error("frame of {width}x{height} is too large for this format")]
    FrameTooLarge { width: u32, height: u32 },

    #[error("ffmpeg not found - please install ffmpeg")]
    FfmpegNotFound,

    #[error("ffmpeg error: {0}")]
    FfmpegError(String),

    #[error("no frames to export")]
    NoFrames,

    #[error("sink already finished")]
    AlreadyFinished,
}

/// Encode one frame as PNG bytes.
pub(crate) fn encode_png(frame: &RgbaImage) -> Result<Vec<u8>, VideoError> {
    let mut png_data = Vec::new();
    frame.write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)?;
    Ok(png_data)
}

/// A running encoder and the thread collecting its stderr.
struct FfmpegProcess {
    child: Child,
    stderr: Option<JoinHandle<io::Result<String>>>,
}

/// Read stderr to the end on its own thread so ffmpeg never blocks on a
/// full pipe while we are blocked writing its stdin.
fn drain_stderr(stderr: Option<ChildStderr>) -> Option<JoinHandle<io::Result<String>>> {
    let mut stderr = stderr?;
    Some(thread::spawn(move || {
        let mut text = String::new();
        stderr.read_to_string(&mut text)?;
        Ok(text)
    }))
}

/// H.264 MP4 sink backed by an `ffmpeg` process.
///
/// ffmpeg is started on the first frame. Dropping the sink without calling
/// [`FrameSink::finish`] kills the process.
pub struct Mp4Sink {
    path: PathBuf,
    fps: u32,
    program: PathBuf,
    ffmpeg: Option<FfmpegProcess>,
    frames: usize,
    finished: bool,
}

impl Mp4Sink {
    pub fn new(path: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            path: path.into(),
            fps,
            program: PathBuf::from("ffmpeg"),
            ffmpeg: None,
            frames: 0,
            finished: false,
        }
    }

    /// Use another ffmpeg executable instead of the one on `PATH`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    fn spawn(&self) -> Result<FfmpegProcess, VideoError> {
        let path_str = self.path.to_string_lossy();
        let fps = self.fps.to_string();
        debug!(
            program = %self.program.display(),
            output = %path_str,
            fps = self.fps,
            "starting ffmpeg"
        );

        let mut child = Command::new(&self.program)
            .args([
                "-y", // Overwrite output
                "-loglevel",
                "error",
                "-nostats",
                "-f",
                "image2pipe", // Input format: pipe of images
                "-vcodec",
                "png",
                "-r",
                &fps, // Input frame rate
                "-i",
                "-", // Input from stdin
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p", // Pixel format for compatibility
                "-preset",
                "medium",
                "-crf",
                "23",
                "-r",
                &fps, // Output frame rate
                &path_str,
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => VideoError::FfmpegNotFound,
                _ => VideoError::Io(e),
            })?;

        let stderr = drain_stderr(child.stderr.take());
        Ok(FfmpegProcess { child, stderr })
    }

    /// Wait for ffmpeg to exit and turn its stderr into an error.
    fn wait(mut process: FfmpegProcess) -> Result<(), VideoError> {
        drop(process.child.stdin.take());
        let status = process.child.wait()?;
        let stderr = match process.stderr.take().map(|handle| handle.join()) {
            Some(Ok(text)) => text?,
            Some(Err(_)) => String::from("stderr reader panicked"),
            None => String::new(),
        };
        if !status.success() {
            return Err(VideoError::FfmpegError(stderr.trim().to_string()));
        }
        Ok(())
    }
}

impl FrameSink for Mp4Sink {
    fn push_frame(&mut self, frame: &RgbaImage) -> Result<(), VideoError> {
        if self.finished {
            return Err(VideoError::AlreadyFinished);
        }
        if self.ffmpeg.is_none() {
            self.ffmpeg = Some(self.spawn()?);
        }

        let png_data = encode_png(frame)?;
        let written = match self.ffmpeg.as_mut().and_then(|p| p.child.stdin.as_mut()) {
            Some(stdin) => stdin.write_all(&png_data),
            None => return Err(VideoError::FfmpegNotFound),
        };

        if let Err(e) = written {
            // A broken pipe means ffmpeg exited; its stderr says why.
            self.finished = true;
            if let Some(process) = self.ffmpeg.take() {
                Self::wait(process)?;
            }
            return Err(e.into());
        }

        self.frames += 1;
        if self.frames % 100 == 0 {
            debug!(frames = self.frames, "encoding");
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        if self.finished {
            return Err(VideoError::AlreadyFinished);
        }
        self.finished = true;

        let process = self.ffmpeg.take().ok_or(VideoError::NoFrames)?;
        Self::wait(process)?;
        info!(frames = self.frames, output = %self.path.display(), "MP4 encoding done");
        Ok(())
    }

    fn frames_written(&self) -> usize {
        self.frames
    }

    fn output_path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Mp4Sink {
    fn drop(&mut self) {
        if let Some(mut process) = self.ffmpeg.take() {
            warn!(output = %self.path.display(), "MP4 sink dropped before finish, stopping ffmpeg");
            let _ = process.child.kill();
            let _ = process.child.wait();
        }
    }
}
