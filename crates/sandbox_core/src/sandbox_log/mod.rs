//! Reading and writing sandbox simulation logs.
//!
//! A sandbox log is plain text. Each recorded state is one block of
//! `size` digit rows, and blocks are separated by delimiter lines:
//!
//! ```text
//! ---- SAND BOX STATE ----
//! 0000
//! 0120
//! 0310
//! 0000
//! ---- SAND BOX STATE ----
//! ...
//! ```
//!
//! Delimiter lines are empty lines or lines starting with `-` or `_`.
//! The first non-delimiter line after a delimiter is the first row of
//! the next block.
//!
//! # Example
//!
//! ```ignore
//! use sandbox_core::sandbox_log::SandboxLog;
//!
//! let log = SandboxLog::new("../sandbox.log", 32);
//! for grid in log.frames()? {
//!     let grid = grid?;
//!     println!("{:?}", grid.histogram());
//! }
//! ```

mod reader;
mod writer;

pub use reader::{is_delimiter, parse_row, GridReader, SandboxLog};
pub use writer::{write_grid, GridLogWriter, BLOCK_HEADER};

use std::io;
use thiserror::Error;

/// Errors produced while reading or writing a sandbox log.
#[derive(Debug, Error)]
pub enum LogError {
    /// The underlying file could not be opened, read or written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Grid dimension of zero.
    #[error("grid size must be at least 1")]
    InvalidSize,

    /// A data row contained something other than a decimal digit.
    #[error("line {line}, column {column}: expected a digit, found {found:?}")]
    InvalidDigit {
        line: usize,
        column: usize,
        found: char,
    },

    /// A data row had the wrong number of cells.
    #[error("line {line}: expected {expected} cells, found {found}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A block ended (delimiter or end of file) before all rows were read.
    #[error("block starting at line {line} has {found} of {expected} rows")]
    TruncatedBlock {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A cell value does not fit the single-digit log format.
    #[error("cell value {value} cannot be written as a single digit")]
    ValueOutOfRange { value: u8 },
}

impl LogError {
    /// True for errors caused by malformed log content rather than I/O.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDigit { .. } | Self::RowLength { .. } | Self::TruncatedBlock { .. }
        )
    }
}
