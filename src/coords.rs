//! Coordinate spaces: grid cells, screen pixels and minimap viewports.
//!
//! Grid coordinates put (0, 0) at the bottom-left cell with y growing
//! northward. Pixel coordinates put (0, 0) at the top-left of the screen.

use serde::{Deserialize, Serialize};

/// Cell position in a grid. Signed so that off-map neighbours and viewport
/// offsets can be expressed before bounds checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Manhattan distance between two positions
    pub fn distance(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Extent of a grid's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub width: u32,
    pub height: u32,
}

impl GridBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major index of an in-bounds coordinate.
    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if self.contains(x, y) {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    pub fn coord_of(&self, index: usize) -> Option<Coord> {
        if index < self.cell_count() {
            let width = self.width as usize;
            Some(Coord::new((index % width) as i32, (index / width) as i32))
        } else {
            None
        }
    }
}

/// Screen area a grid is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelFrame {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelFrame {
    pub fn new(origin_x: i32, origin_y: i32, width: i32, height: i32) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    fn cell_size(&self, bounds: GridBounds) -> (i32, i32) {
        let cell_w = (self.width / bounds.width.max(1) as i32).max(1);
        let cell_h = (self.height / bounds.height.max(1) as i32).max(1);
        (cell_w, cell_h)
    }

    /// Top-left pixel of the cell at (x, y). Row 0 sits at the bottom of the frame.
    pub fn grid_to_pixel(&self, bounds: GridBounds, x: i32, y: i32) -> (i32, i32) {
        let (cell_w, cell_h) = self.cell_size(bounds);
        let row_from_top = bounds.height as i32 - 1 - y;
        (
            self.origin_x + x * cell_w,
            self.origin_y + row_from_top * cell_h,
        )
    }

    /// Cell under a pixel, or `None` when the pixel misses the grid.
    pub fn pixel_to_grid(&self, bounds: GridBounds, px: i32, py: i32) -> Option<Coord> {
        let (cell_w, cell_h) = self.cell_size(bounds);
        let rel_x = px - self.origin_x;
        let rel_y = py - self.origin_y;
        if rel_x < 0 || rel_y < 0 {
            return None;
        }
        let x = rel_x / cell_w;
        let row_from_top = rel_y / cell_h;
        let y = bounds.height as i32 - 1 - row_from_top;
        bounds.contains(x, y).then_some(Coord::new(x, y))
    }
}

/// Offset from a viewport's first local cell to its center cell:
/// `(extent - 1) / 2`, rounded half to even.
pub fn half_extent(extent: u32) -> i32 {
    let span = extent.saturating_sub(1);
    let whole = span / 2;
    if span % 2 == 0 || whole % 2 == 0 {
        whole as i32
    } else {
        whole as i32 + 1
    }
}

/// A rectangular window of a parent grid centered on one parent cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub extent: GridBounds,
    pub center: Coord,
}

impl Viewport {
    pub fn new(extent: GridBounds, center: Coord) -> Self {
        Self { extent, center }
    }

    fn half(&self) -> (i32, i32) {
        (half_extent(self.extent.width), half_extent(self.extent.height))
    }

    /// Parent coordinate shown by local cell (lx, ly).
    pub fn to_parent(&self, lx: i32, ly: i32) -> Coord {
        let (half_w, half_h) = self.half();
        Coord::new(self.center.x + lx - half_w, self.center.y + ly - half_h)
    }

    /// Local coordinate of a parent cell; may lie outside the viewport.
    pub fn to_local_unchecked(&self, px: i32, py: i32) -> Coord {
        let (half_w, half_h) = self.half();
        Coord::new(px - self.center.x + half_w, py - self.center.y + half_h)
    }

    pub fn to_local(&self, px: i32, py: i32) -> Option<Coord> {
        let local = self.to_local_unchecked(px, py);
        self.extent.contains(local.x, local.y).then_some(local)
    }

    pub fn contains_parent(&self, px: i32, py: i32) -> bool {
        self.to_local(px, py).is_some()
    }
}
