use crate::config::BoardConfig;
use crate::geometry::Vec3;

/// Splits a board rectangle into `rows x cols` equal cells separated by a gutter.
/// Local space is centered on the board; rows grow downward (-y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub rows: i32,
    pub cols: i32,
    pub gutter: f32,
    pub width: f32,
    pub height: f32,
}

impl GridLayout {
    pub fn from_config(cfg: &BoardConfig) -> Self {
        let (width, height) = cfg.local_size();
        Self {
            rows: cfg.rows,
            cols: cfg.cols,
            gutter: cfg.gutter,
            width,
            height,
        }
    }

    pub fn cell_size(&self) -> (f32, f32) {
        let gutters_w = (self.cols - 1).max(0) as f32 * self.gutter;
        let gutters_h = (self.rows - 1).max(0) as f32 * self.gutter;
        let cw = (self.width - gutters_w) / self.cols.max(1) as f32;
        let ch = (self.height - gutters_h) / self.rows.max(1) as f32;
        (cw, ch)
    }

    /// Center of cell (0,0), the top-left one.
    pub fn start(&self) -> (f32, f32) {
        let (cw, ch) = self.cell_size();
        (-self.width * 0.5 + cw * 0.5, self.height * 0.5 - ch * 0.5)
    }

    pub fn local_center(&self, row: i32, col: i32) -> Vec3 {
        let (cw, ch) = self.cell_size();
        let (sx, sy) = self.start();
        Vec3::xy(
            sx + col as f32 * (cw + self.gutter),
            sy - row as f32 * (ch + self.gutter),
        )
    }

    /// Every `(row, col, local center)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, Vec3)> + '_ {
        (0..self.rows)
            .flat_map(move |r| (0..self.cols).map(move |c| (r, c, self.local_center(r, c))))
    }
}
