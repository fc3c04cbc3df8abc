//! Writes grids in the sandbox log format.

use super::LogError;
use crate::grid::Grid;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Delimiter line written before every block.
pub const BLOCK_HEADER: &str = "---- SAND BOX STATE ----";

/// Write one grid as a block: the header line, then one digit row per line.
///
/// The whole grid is checked before anything is written, so a grid with a
/// value above 9 leaves the writer untouched.
pub fn write_grid<W: Write>(writer: &mut W, grid: &Grid) -> Result<(), LogError> {
    if let Some(value) = grid.max_value().filter(|&v| v > 9) {
        return Err(LogError::ValueOutOfRange { value });
    }

    writeln!(writer, "{}", BLOCK_HEADER)?;
    let mut line = String::with_capacity(grid.size());
    for row in grid.rows() {
        line.clear();
        line.extend(row.iter().map(|&v| char::from(b'0' + v)));
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

/// File-backed log writer.
pub struct GridLogWriter {
    writer: BufWriter<File>,
    frames: usize,
}

impl GridLogWriter {
    /// Create (or truncate) a log file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, LogError> {
        let file = File::create(path)?;
        Ok(Self::from_file(file))
    }

    /// Open a log file for appending, creating it if needed.
    pub fn append<P: AsRef<Path>>(path: P) -> Result<Self, LogError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: File) -> Self {
        Self {
            writer: BufWriter::new(file),
            frames: 0,
        }
    }

    /// Append one grid.
    pub fn write_grid(&mut self, grid: &Grid) -> Result<(), LogError> {
        write_grid(&mut self.writer, grid)?;
        self.frames += 1;
        Ok(())
    }

    /// Number of grids written through this writer.
    pub fn frames_written(&self) -> usize {
        self.frames
    }

    pub fn flush(&mut self) -> Result<(), LogError> {
        self.writer.flush()?;
        Ok(())
    }
}
