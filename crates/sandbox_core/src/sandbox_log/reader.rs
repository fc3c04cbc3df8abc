//! Lazy block reader for sandbox logs.

use super::LogError;
use crate::grid::Grid;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::debug;

/// True if `line` separates blocks instead of carrying data.
pub fn is_delimiter(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with('-') || line.starts_with('_')
}

/// Convert one data row into cell values.
///
/// Surrounding whitespace is ignored. Every remaining character must be a
/// decimal digit and there must be exactly `size` of them. `line_no` is
/// only used for error reporting.
pub fn parse_row(text: &str, size: usize, line_no: usize) -> Result<Vec<u8>, LogError> {
    let text = text.trim();
    let mut row = Vec::with_capacity(size);
    for (i, ch) in text.chars().enumerate() {
        let digit = ch.to_digit(10).ok_or(LogError::InvalidDigit {
            line: line_no,
            column: i + 1,
            found: ch,
        })?;
        row.push(digit as u8);
    }
    if row.len() != size {
        return Err(LogError::RowLength {
            line: line_no,
            expected: size,
            found: row.len(),
        });
    }
    Ok(row)
}

/// Iterator over the grids of a sandbox log.
///
/// Pulls lines from the underlying reader only as far as needed for the
/// next grid. After the first error, or at end of input, it yields `None`
/// forever.
pub struct GridReader<R> {
    lines: Lines<R>,
    size: usize,
    /// 1-based number of the last line pulled from `lines`.
    line_no: usize,
    blocks: usize,
    done: bool,
}

impl GridReader<BufReader<File>> {
    /// Open a log file for reading.
    pub fn open<P: AsRef<Path>>(path: P, size: usize) -> Result<Self, LogError> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), size)
    }
}

impl<R: BufRead> GridReader<R> {
    /// Wrap a buffered reader. `size` is the grid dimension and the number of
    /// rows in every block.
    pub fn new(reader: R, size: usize) -> Result<Self, LogError> {
        if size == 0 {
            return Err(LogError::InvalidSize);
        }
        Ok(Self {
            lines: reader.lines(),
            size,
            line_no: 0,
            blocks: 0,
            done: false,
        })
    }

    /// Grid dimension this reader produces.
    pub fn size(&self) -> usize {
        self.size
    }

    fn next_line(&mut self) -> Option<Result<String, LogError>> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line.map_err(LogError::from))
    }

    /// Read the block whose first row is `first`.
    fn read_block(&mut self, first: &str) -> Result<Grid, LogError> {
        let start = self.line_no;
        let mut cells = Vec::with_capacity(self.size * self.size);
        cells.extend(parse_row(first, self.size, start)?);

        let mut rows = 1;
        while rows < self.size {
            let truncated = LogError::TruncatedBlock {
                line: start,
                expected: self.size,
                found: rows,
            };
            let line = match self.next_line() {
                Some(line) => line?,
                None => return Err(truncated),
            };
            if is_delimiter(&line) {
                return Err(truncated);
            }
            cells.extend(parse_row(&line, self.size, self.line_no)?);
            rows += 1;
        }

        debug!(block = self.blocks, line = start, "parsed grid block");
        Grid::from_cells(self.size, cells).ok_or(LogError::TruncatedBlock {
            line: start,
            expected: self.size,
            found: rows,
        })
    }

    fn advance(&mut self) -> Option<Result<Grid, LogError>> {
        loop {
            let line = match self.next_line()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            if is_delimiter(&line) {
                continue;
            }
            return Some(self.read_block(&line));
        }
    }
}

impl<R: BufRead> Iterator for GridReader<R> {
    type Item = Result<Grid, LogError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.advance();
        match &item {
            Some(Ok(_)) => self.blocks += 1,
            Some(Err(_)) | None => self.done = true,
        }
        item
    }
}

impl<R: BufRead> std::iter::FusedIterator for GridReader<R> {}

/// A sandbox log on disk.
///
/// Every call to [`SandboxLog::frames`] reopens the file and starts from the
/// first line, so the same file always yields the same grids.
#[derive(Debug, Clone)]
pub struct SandboxLog {
    path: PathBuf,
    size: usize,
}

impl SandboxLog {
    pub fn new(path: impl Into<PathBuf>, size: usize) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Open the log from the start.
    pub fn frames(&self) -> Result<GridReader<BufReader<File>>, LogError> {
        GridReader::open(&self.path, self.size)
    }

    /// Read the whole log and count its grids.
    pub fn count_frames(&self) -> Result<usize, LogError> {
        let mut count = 0;
        for grid in self.frames()? {
            grid?;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(text: &str, size: usize) -> Vec<Result<Grid, LogError>> {
        GridReader::new(Cursor::new(text.to_string()), size)
            .unwrap()
            .collect()
    }

    #[test]
    fn test_delimiters() {
        assert!(is_delimiter(""));
        assert!(is_delimiter("   "));
        assert!(is_delimiter("---- SAND BOX STATE ----"));
        assert!(is_delimiter("________"));
        assert!(!is_delimiter("0123"));
    }

    #[test]
    fn test_parse_row() {
        assert_eq!(parse_row("0123\r", 4, 1).unwrap(), vec![0, 1, 2, 3]);
        assert!(matches!(
            parse_row("012", 4, 7),
            Err(LogError::RowLength {
                line: 7,
                expected: 4,
                found: 3
            })
        ));
        assert!(matches!(
            parse_row("01x3", 4, 2),
            Err(LogError::InvalidDigit {
                line: 2,
                column: 3,
                found: 'x'
            })
        ));
    }

    #[test]
    fn test_reads_every_block() {
        let text = "---- SAND BOX STATE ----\n012\n120\n201\n---- SAND BOX STATE ----\n333\n333\n333\n";
        let grids: Vec<Grid> = read_all(text, 3).into_iter().map(|g| g.unwrap()).collect();

        assert_eq!(grids.len(), 2);
        assert_eq!(grids[0].row(0), Some(&[0, 1, 2][..]));
        assert_eq!(grids[0].row(2), Some(&[2, 0, 1][..]));
        assert!(grids[1].cells().iter().all(|&c| c == 3));
    }

    #[test]
    fn test_blank_and_underscore_lines_are_skipped() {
        let text = "\n\n__\n10\n01\n\n----\n\n11\n11\n\n";
        let grids: Vec<Grid> = read_all(text, 2).into_iter().map(|g| g.unwrap()).collect();

        assert_eq!(grids.len(), 2);
        assert_eq!(grids[0], Grid::from_rows(&[[1u8, 0], [0, 1]]).unwrap());
        assert_eq!(grids[1], Grid::filled(2, 1));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(read_all("", 32).is_empty());
        assert!(read_all("----\n\n----\n", 32).is_empty());
    }

    #[test]
    fn test_truncated_block_at_eof() {
        let results = read_all("----\n000\n000\n", 3);
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(LogError::TruncatedBlock {
                line: 2,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_delimiter_inside_block_is_an_error() {
        let results = read_all("00\n----\n00\n00\n", 2);
        assert_eq!(results.len(), 1, "reader must stop after the first error");
        assert!(results[0].as_ref().unwrap_err().is_data_error());
    }

    #[test]
    fn test_short_line_fails() {
        let results = read_all("----\n000\n00\n000\n", 3);
        assert!(matches!(
            results[0],
            Err(LogError::RowLength { line: 3, .. })
        ));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            GridReader::new(Cursor::new(String::new()), 0),
            Err(LogError::InvalidSize)
        ));
        let reader = GridReader::new(Cursor::new(String::new()), 4).unwrap();
        assert_eq!(reader.size(), 4);
    }

    #[test]
    fn test_reopening_yields_same_grids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sandbox.log");
        std::fs::write(&path, "----\n01\n23\n----\n33\n00\n\n----\n12\n21\n").unwrap();

        let log = SandboxLog::new(&path, 2);
        assert_eq!(log.path(), path.as_path());
        assert_eq!(log.size(), 2);

        let first: Vec<Grid> = log.frames().unwrap().map(|g| g.unwrap()).collect();
        let second: Vec<Grid> = log.frames().unwrap().map(|g| g.unwrap()).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(log.count_frames().unwrap(), 3);
    }

    #[test]
    fn test_missing_file() {
        let log = SandboxLog::new("definitely/not/here/sandbox.log", 32);
        assert!(matches!(log.frames(), Err(LogError::Io(_))));
    }
}
