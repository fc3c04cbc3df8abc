//! Square grid of categorical cell values.
//!
//! One `Grid` holds one frame of the sandbox: `size × size` cells stored
//! row-major, each cell a small category index (0..=3 for a stable sandpile).

/// One frame of the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Width and height in cells.
    size: usize,
    /// Flat row-major cell storage, `size * size` entries.
    cells: Vec<u8>,
}

impl Grid {
    /// Create a grid with every cell set to 0.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Create a grid with every cell set to `value`.
    pub fn filled(size: usize, value: u8) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    /// Build a grid from row-major cells.
    ///
    /// Returns `None` when `cells.len() != size * size`.
    pub fn from_cells(size: usize, cells: Vec<u8>) -> Option<Self> {
        if cells.len() != size * size {
            return None;
        }
        Some(Self { size, cells })
    }

    /// Build a grid from rows. Returns `None` unless the rows form a square.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Option<Self> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for row in rows {
            let row = row.as_ref();
            if row.len() != size {
                return None;
            }
            cells.extend_from_slice(row);
        }
        Some(Self { size, cells })
    }

    /// Width and height in cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.size && y < self.size {
            Some(y * self.size + x)
        } else {
            None
        }
    }

    /// Value at column `x`, row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Set the value at (x, y). Returns false if out of bounds.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) -> bool {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = value;
            true
        } else {
            false
        }
    }

    /// Row `y` as a slice.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.size {
            return None;
        }
        let start = y * self.size;
        Some(&self.cells[start..start + self.size])
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact panics on 0, and an empty grid has no rows anyway
        self.cells.chunks_exact(self.size.max(1))
    }

    /// Flat row-major cells.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Largest cell value, or `None` for an empty grid.
    pub fn max_value(&self) -> Option<u8> {
        self.cells.iter().copied().max()
    }

    /// Number of cells holding each value, indexed by value.
    pub fn histogram(&self) -> Vec<usize> {
        let len = self.max_value().map_or(0, |m| m as usize + 1);
        let mut counts = vec![0; len];
        for &v in &self.cells {
            counts[v as usize] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_zeroed() {
        let grid = Grid::new(4);
        assert_eq!(grid.size(), 4);
        assert_eq!(grid.cells().len(), 16);
        assert!(grid.cells().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new(3);
        assert!(grid.set(2, 1, 3));
        assert_eq!(grid.get(2, 1), Some(3));
        assert_eq!(grid.row(1), Some(&[0, 0, 3][..]));

        assert!(!grid.set(3, 0, 1), "out of bounds write must be refused");
        assert_eq!(grid.get(0, 3), None);
    }

    #[test]
    fn test_from_rows_requires_square() {
        let grid = Grid::from_rows(&[[1u8, 2], [3, 0]]).unwrap();
        assert_eq!(grid.get(1, 0), Some(2));
        assert_eq!(grid.get(0, 1), Some(3));

        let ragged: Vec<Vec<u8>> = vec![vec![1, 2], vec![3]];
        assert!(Grid::from_rows(&ragged).is_none());
        assert!(Grid::from_cells(2, vec![0; 3]).is_none());
    }

    #[test]
    fn test_histogram() {
        let grid = Grid::from_rows(&[[0u8, 1, 1], [3, 3, 3], [0, 0, 1]]).unwrap();
        assert_eq!(grid.histogram(), vec![3, 3, 0, 3]);
        assert_eq!(grid.max_value(), Some(3));
        assert_eq!(grid.rows().count(), 3);
    }
}
