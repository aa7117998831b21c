//! Mapping viewport pixels onto terminal cells
//!
//! The terminal positions images by cell, with a pixel offset inside the
//! anchor cell and a source rectangle for cropping. Everything here is pure
//! so the clipping math can be tested without a terminal.

use crossterm::terminal::WindowSize;
use ratatui::layout::Rect;

use crate::viewer::{PixelPoint, PixelRect, Viewport};

use super::protocol::SourceRect;

/// Size of one terminal cell in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSize {
    pub width: u16,
    pub height: u16,
}

impl CellSize {
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Terminal size in cells together with the pixel size of a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub columns: u16,
    pub rows: u16,
    pub cell: CellSize,
}

impl ScreenGeometry {
    /// Geometry from a terminal window size query.
    ///
    /// Terminals that do not support the pixel query report zero pixel
    /// dimensions; the cell size then falls back to one that maps the
    /// default viewport onto the grid.
    #[must_use]
    pub fn from_window_size(size: WindowSize) -> Self {
        let columns = size.columns.max(1);
        let rows = size.rows.max(1);
        let cell = if size.width > 0 && size.height > 0 {
            CellSize::new(
                (size.width / columns).max(1),
                (size.height / rows).max(1),
            )
        } else {
            Self::fallback_cell(columns, rows)
        };
        Self {
            columns,
            rows,
            cell,
        }
    }

    /// Geometry for a grid of known size with an unknown pixel size
    #[must_use]
    pub fn from_cells(columns: u16, rows: u16) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            columns,
            rows,
            cell: Self::fallback_cell(columns, rows),
        }
    }

    fn fallback_cell(columns: u16, rows: u16) -> CellSize {
        let viewport = Viewport::DEFAULT;
        CellSize::new(
            (viewport.width / u32::from(columns)).clamp(1, u32::from(u16::MAX)) as u16,
            (viewport.height / u32::from(rows)).clamp(1, u32::from(u16::MAX)) as u16,
        )
    }

    /// Drawable area in pixels, a whole number of cells
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            u32::from(self.columns) * u32::from(self.cell.width),
            u32::from(self.rows) * u32::from(self.cell.height),
        )
    }

    /// Cell containing a pixel position, clamped to the grid
    #[must_use]
    pub fn cell_at(&self, at: PixelPoint) -> (u16, u16) {
        let column = (at.x.max(0.0) / f32::from(self.cell.width)).floor() as u32;
        let row = (at.y.max(0.0) / f32::from(self.cell.height)).floor() as u32;
        (
            column.min(u32::from(self.columns) - 1) as u16,
            row.min(u32::from(self.rows) - 1) as u16,
        )
    }
}

/// Where and how much of an image to show
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Anchor cell column
    pub column: u16,
    /// Anchor cell row
    pub row: u16,
    /// Pixel offset inside the anchor cell
    pub offset_x: u32,
    pub offset_y: u32,
    /// Visible part of the image
    pub source: SourceRect,
}

/// Clip an image of `width` x `height` pixels drawn with its top-left
/// corner at `at` to the screen. Returns `None` when nothing is visible.
#[must_use]
pub fn place(
    width: u32,
    height: u32,
    at: PixelPoint,
    screen: &ScreenGeometry,
) -> Option<Placement> {
    if !at.x.is_finite() || !at.y.is_finite() {
        return None;
    }
    let viewport = screen.viewport();
    let x = at.x.round() as i64;
    let y = at.y.round() as i64;

    let left = x.max(0);
    let top = y.max(0);
    let right = (x + i64::from(width)).min(i64::from(viewport.width));
    let bottom = (y + i64::from(height)).min(i64::from(viewport.height));
    if right <= left || bottom <= top {
        return None;
    }

    let cell_w = i64::from(screen.cell.width);
    let cell_h = i64::from(screen.cell.height);
    Some(Placement {
        column: (left / cell_w) as u16,
        row: (top / cell_h) as u16,
        offset_x: (left % cell_w) as u32,
        offset_y: (top % cell_h) as u32,
        source: SourceRect {
            x: (left - x) as u32,
            y: (top - y) as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        },
    })
}

/// Cells an outline around `rect` occupies, plus which of its edges are on
/// screen as (top, bottom). Returns `None` when the rectangle is off screen.
#[must_use]
pub fn outline_cells(rect: PixelRect, screen: &ScreenGeometry) -> Option<(Rect, bool, bool)> {
    let viewport = screen.viewport();
    let (vw, vh) = (viewport.width as f32, viewport.height as f32);
    let right = rect.x + rect.width;
    let bottom = rect.y + rect.height;
    if !(rect.x.is_finite() && rect.y.is_finite() && right.is_finite() && bottom.is_finite()) {
        return None;
    }
    if right <= 0.0 || bottom <= 0.0 || rect.x >= vw || rect.y >= vh {
        return None;
    }

    let cell_w = f32::from(screen.cell.width);
    let cell_h = f32::from(screen.cell.height);
    let max_col = f32::from(screen.columns);
    let max_row = f32::from(screen.rows);

    // The border sits in the cell just outside each edge, when there is one
    let col0 = ((rect.x / cell_w).floor() - 1.0).clamp(0.0, max_col - 1.0);
    let col1 = ((right / cell_w).ceil() + 1.0).clamp(col0 + 1.0, max_col);
    let row0 = ((rect.y / cell_h).floor() - 1.0).clamp(0.0, max_row - 1.0);
    let row1 = ((bottom / cell_h).ceil() + 1.0).clamp(row0 + 1.0, max_row);

    let top_visible = rect.y >= 0.0;
    let bottom_visible = bottom <= vh;
    Some((
        Rect::new(
            col0 as u16,
            row0 as u16,
            (col1 - col0) as u16,
            (row1 - row0) as u16,
        ),
        top_visible,
        bottom_visible,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> ScreenGeometry {
        // 100x75 cells of 8x16 -> 800x1200 pixels
        ScreenGeometry {
            columns: 100,
            rows: 75,
            cell: CellSize::new(8, 16),
        }
    }

    #[test]
    fn viewport_is_whole_cells() {
        let geometry = ScreenGeometry::from_window_size(WindowSize {
            rows: 50,
            columns: 120,
            width: 1205,
            height: 1010,
        });
        assert_eq!(geometry.cell, CellSize::new(10, 20));
        assert_eq!(geometry.viewport(), Viewport::new(1200, 1000));
    }

    #[test]
    fn missing_pixel_size_maps_default_viewport() {
        let geometry = ScreenGeometry::from_window_size(WindowSize {
            rows: 75,
            columns: 100,
            width: 0,
            height: 0,
        });
        assert_eq!(geometry.viewport(), Viewport::DEFAULT);
    }

    #[test]
    fn fully_visible_image_keeps_whole_source() {
        let placement = place(780, 600, PixelPoint::new(10.0, 10.0), &screen()).unwrap();
        assert_eq!((placement.column, placement.row), (1, 0));
        assert_eq!((placement.offset_x, placement.offset_y), (2, 10));
        assert_eq!(
            placement.source,
            SourceRect {
                x: 0,
                y: 0,
                width: 780,
                height: 600
            }
        );
    }

    #[test]
    fn scrolled_image_is_cropped_at_the_top() {
        // margin 10, scrolled by 50
        let placement = place(780, 1010, PixelPoint::new(10.0, -40.0), &screen()).unwrap();
        assert_eq!((placement.row, placement.offset_y), (0, 0));
        assert_eq!(placement.source.y, 40);
        assert_eq!(placement.source.height, 970);
    }

    #[test]
    fn tall_image_is_cropped_at_the_bottom() {
        let placement = place(780, 5000, PixelPoint::new(10.0, 10.0), &screen()).unwrap();
        assert_eq!(placement.source.height, 1190);
    }

    #[test]
    fn off_screen_image_has_no_placement() {
        assert_eq!(place(780, 100, PixelPoint::new(10.0, -200.0), &screen()), None);
        assert_eq!(place(780, 100, PixelPoint::new(10.0, 1300.0), &screen()), None);
        assert_eq!(place(0, 100, PixelPoint::new(10.0, 10.0), &screen()), None);
        assert_eq!(place(10, 10, PixelPoint::new(f32::NAN, 0.0), &screen()), None);
    }

    #[test]
    fn outline_hides_edges_scrolled_off_screen() {
        let rect = PixelRect {
            x: 10.0,
            y: -40.0,
            width: 780.0,
            height: 2000.0,
        };
        let (area, top, bottom) = outline_cells(rect, &screen()).unwrap();
        assert!(!top);
        assert!(!bottom);
        assert_eq!(area.y, 0);
        assert_eq!(area.bottom(), 75);
        assert_eq!(area.x, 0);
    }

    #[test]
    fn outline_surrounds_visible_page() {
        let rect = PixelRect {
            x: 16.0,
            y: 32.0,
            width: 80.0,
            height: 160.0,
        };
        let (area, top, bottom) = outline_cells(rect, &screen()).unwrap();
        assert!(top && bottom);
        assert_eq!(area, Rect::new(1, 1, 12, 12));
    }

    #[test]
    fn cell_at_clamps_to_grid() {
        assert_eq!(screen().cell_at(PixelPoint::new(10.0, 50.0)), (1, 3));
        assert_eq!(screen().cell_at(PixelPoint::new(-5.0, 1e6)), (0, 74));
    }
}
