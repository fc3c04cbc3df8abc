//! Image rendering for sandbox grids.
//!
//! Paints a [`Grid`] into an RGBA image through a discrete [`ColorScale`].
//! Cells are drawn as equal squares centered in a square frame.

use crate::grid::Grid;
use image::{ImageBuffer, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default frame background (white, like an empty figure).
pub const BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// Fraction of the frame the grid may cover, in percent.
const FILL_PERCENT: u32 = 95;

/// Errors produced while setting up or painting frames.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid color scale: {0}")]
    InvalidColorScale(String),

    #[error("frame of {frame_size}px cannot hold a {grid_size}x{grid_size} grid")]
    FrameTooSmall { frame_size: u32, grid_size: usize },

    #[error("grid is {found}x{found} but the surface was initialized for {expected}x{expected}")]
    GridSizeMismatch { expected: usize, found: usize },
}

/// Discrete color scale: a list of colors and the value bounds between them.
///
/// A value `v` with `bounds[i] <= v < bounds[i + 1]` gets `colors[i]`.
/// Values below the first bound get the first color; values at or above
/// the last bound get the last color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawColorScale")]
pub struct ColorScale {
    colors: Vec<[u8; 4]>,
    bounds: Vec<u32>,
}

#[derive(Deserialize)]
struct RawColorScale {
    colors: Vec<[u8; 4]>,
    bounds: Vec<u32>,
}

impl TryFrom<RawColorScale> for ColorScale {
    type Error = RenderError;

    fn try_from(raw: RawColorScale) -> Result<Self, Self::Error> {
        Self::new(raw.colors, raw.bounds)
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::sandpile()
    }
}

impl ColorScale {
    /// Build a scale. Needs at least one color, exactly one more bound than
    /// colors, and strictly increasing bounds.
    pub fn new(colors: Vec<[u8; 4]>, bounds: Vec<u32>) -> Result<Self, RenderError> {
        if colors.is_empty() {
            return Err(RenderError::InvalidColorScale("no colors".into()));
        }
        if bounds.len() != colors.len() + 1 {
            return Err(RenderError::InvalidColorScale(format!(
                "{} colors need {} bounds, got {}",
                colors.len(),
                colors.len() + 1,
                bounds.len()
            )));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(RenderError::InvalidColorScale(
                "bounds must be strictly increasing".into(),
            ));
        }
        Ok(Self { colors, bounds })
    }

    /// Four-level sandpile scale: yellow, orange, red, purple for 0..=3.
    pub fn sandpile() -> Self {
        Self {
            colors: vec![
                [0xFF, 0xFF, 0x00, 0xFF], // 0: yellow
                [0xFF, 0xA5, 0x00, 0xFF], // 1: orange
                [0xFF, 0x00, 0x00, 0xFF], // 2: red
                [0x80, 0x00, 0x80, 0xFF], // 3: purple
            ],
            bounds: vec![0, 1, 2, 3, 4],
        }
    }

    /// Color for a cell value.
    pub fn color_for(&self, value: u8) -> [u8; 4] {
        let v = value as u32;
        let last = self.colors.len() - 1;
        match self.bounds.iter().rposition(|&b| b <= v) {
            Some(i) => self.colors[i.min(last)],
            None => self.colors[0],
        }
    }

    /// Number of distinct colors.
    pub fn levels(&self) -> usize {
        self.colors.len()
    }
}

/// Placement of grid cells inside a square frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLayout {
    pub grid_size: usize,
    pub frame_size: u32,
    /// Side of one cell in pixels.
    pub cell_px: u32,
    /// Left/top margin in pixels.
    pub offset: u32,
}

impl CellLayout {
    /// Fit a `grid_size` grid into a `frame_size` square, centered, leaving a
    /// small margin when there is room for it.
    pub fn fit(grid_size: usize, frame_size: u32) -> Result<Self, RenderError> {
        if grid_size == 0 || (frame_size as usize) < grid_size {
            return Err(RenderError::FrameTooSmall {
                frame_size,
                grid_size,
            });
        }
        let cells = grid_size as u32;
        // frame_size * 95 can overflow u32
        let usable = (u64::from(frame_size) * u64::from(FILL_PERCENT) / 100) as u32;
        let cell_px = (usable / cells).max(1);
        let offset = (frame_size - cell_px * cells) / 2;

        Ok(Self {
            grid_size,
            frame_size,
            cell_px,
            offset,
        })
    }

    /// Top-left pixel of cell (x, y).
    #[inline]
    pub fn cell_origin(&self, x: usize, y: usize) -> (u32, u32) {
        (
            self.offset + x as u32 * self.cell_px,
            self.offset + y as u32 * self.cell_px,
        )
    }
}

/// Paint every cell of `grid` into `img` in place. Pixels outside the grid
/// area are left alone.
pub fn paint_grid(img: &mut RgbaImage, grid: &Grid, scale: &ColorScale, layout: &CellLayout) {
    for (y, row) in grid.rows().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            let color = Rgba(scale.color_for(value));
            let (px_start, py_start) = layout.cell_origin(x, y);

            // Fill the cell_px x cell_px block
            for py in py_start..py_start + layout.cell_px {
                for px in px_start..px_start + layout.cell_px {
                    img.put_pixel(px, py, color);
                }
            }
        }
    }
}

/// Render a grid into a new `frame_size × frame_size` image.
pub fn render_grid(
    grid: &Grid,
    scale: &ColorScale,
    frame_size: u32,
    background: [u8; 4],
) -> Result<RgbaImage, RenderError> {
    let layout = CellLayout::fit(grid.size(), frame_size)?;
    let mut img: RgbaImage = ImageBuffer::from_pixel(frame_size, frame_size, Rgba(background));
    paint_grid(&mut img, grid, scale, &layout);
    Ok(img)
}

/// Save an RGBA image to a PNG file.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<(), image::ImageError> {
    img.save_with_format(path, image::ImageFormat::Png)
}
