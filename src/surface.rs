use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

use crate::placement::Position;

/// Measured size of the play area in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub width: f64,
    pub height: f64,
}

impl PlayArea {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Pixel size of one terminal cell. Terminal cells are roughly twice as
/// tall as they are wide, so the defaults keep boxes looking square.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CellGrid {
    pub cell_width_px: f64,
    pub cell_height_px: f64,
}

impl Default for CellGrid {
    fn default() -> Self {
        Self {
            cell_width_px: 10.0,
            cell_height_px: 20.0,
        }
    }
}

impl CellGrid {
    /// Pixel dimensions of a region of cells
    pub fn play_area(&self, rect: Rect) -> PlayArea {
        PlayArea::new(
            rect.width as f64 * self.cell_width_px,
            rect.height as f64 * self.cell_height_px,
        )
    }

    /// Cells covered by a box whose top-left corner sits at `position`,
    /// clipped to `origin`. A cell is covered when its centre lies inside the
    /// box, the same rule `hit_test` applies.
    pub fn box_rect(&self, origin: Rect, position: Position, box_size: f64) -> Rect {
        let first = |px: f64, cell: f64| (px / cell - 0.5).ceil().max(0.0) as u16;

        let col = first(position.left, self.cell_width_px);
        let row = first(position.top, self.cell_height_px);
        let width = first(position.left + box_size, self.cell_width_px).saturating_sub(col);
        let height = first(position.top + box_size, self.cell_height_px).saturating_sub(row);

        Rect::new(
            origin.x.saturating_add(col),
            origin.y.saturating_add(row),
            width,
            height,
        )
        .intersection(origin)
    }

    /// Index of the topmost box whose pixel footprint contains the centre of
    /// the clicked cell. Boxes are painted in order, so the last match wins.
    pub fn hit_test(
        &self,
        origin: Rect,
        column: u16,
        row: u16,
        positions: &[Position],
        box_size: f64,
    ) -> Option<usize> {
        if !origin.contains((column, row).into()) {
            return None;
        }

        let x = ((column - origin.x) as f64 + 0.5) * self.cell_width_px;
        let y = ((row - origin.y) as f64 + 0.5) * self.cell_height_px;

        positions.iter().rposition(|p| {
            x >= p.left && x < p.left + box_size && y >= p.top && y < p.top + box_size
        })
    }
}
