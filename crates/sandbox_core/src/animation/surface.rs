//! Display surface updated in place, one grid at a time.

use crate::config::RenderConfig;
use crate::grid::Grid;
use crate::render::{paint_grid, CellLayout, ColorScale, RenderError};
use image::{ImageBuffer, Rgba, RgbaImage};

/// A frame image bound to one grid dimension.
///
/// The first grid fixes the layout; every later grid must have the same
/// size and only repaints the cells.
#[derive(Debug, Clone)]
pub struct FrameSurface {
    layout: CellLayout,
    scale: ColorScale,
    image: RgbaImage,
}

impl FrameSurface {
    /// Initialize the surface from the first grid and paint it.
    pub fn from_first_grid(grid: &Grid, config: &RenderConfig) -> Result<Self, RenderError> {
        let layout = CellLayout::fit(grid.size(), config.frame_size)?;
        let image = ImageBuffer::from_pixel(
            config.frame_size,
            config.frame_size,
            Rgba(config.background),
        );
        let mut surface = Self {
            layout,
            scale: config.color_scale.clone(),
            image,
        };
        paint_grid(&mut surface.image, grid, &surface.scale, &surface.layout);
        Ok(surface)
    }

    /// Repaint with a new grid of the same size.
    pub fn set_grid(&mut self, grid: &Grid) -> Result<(), RenderError> {
        if grid.size() != self.layout.grid_size {
            return Err(RenderError::GridSizeMismatch {
                expected: self.layout.grid_size,
                found: grid.size(),
            });
        }
        paint_grid(&mut self.image, grid, &self.scale, &self.layout);
        Ok(())
    }

    /// Current frame.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn layout(&self) -> &CellLayout {
        &self.layout
    }

    pub fn grid_size(&self) -> usize {
        self.layout.grid_size
    }
}
