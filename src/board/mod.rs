pub mod cell;
pub mod maker;

pub use cell::Cell;
pub use maker::GridLayout;

use crate::config::BoardConfig;
use crate::error::{GbResult, GridboardError};
use crate::footprint::Rect;
use crate::geometry::{Aabb, BoardTransform, Vec3};
use crate::scene::PieceKey;
use tracing::{debug, warn};

const MIN_BASIS_SQ: f32 = 1e-8;

/// Mapping between grid indices and world space: `world = origin + ex*col + er*row`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub origin: Vec3,
    /// One column step.
    pub ex: Vec3,
    /// One row step (downward on screen).
    pub er: Vec3,
    /// True when the basis was synthesized instead of sampled from cells.
    pub fallback: bool,
}

impl Calibration {
    fn sampled(c00: Vec3, c01: Vec3, c10: Vec3) -> Option<Self> {
        let ex = c01 - c00;
        let er = c10 - c00;
        if ex.length_squared() < MIN_BASIS_SQ || er.length_squared() < MIN_BASIS_SQ {
            return None;
        }
        Some(Self {
            origin: c00,
            ex,
            er,
            fallback: false,
        })
    }

    /// Unit cells with `gutter` spacing, centered on the board transform, no rotation.
    fn synthetic(rows: i32, cols: i32, gutter: f32, transform: &BoardTransform) -> Self {
        let total_w = cols as f32 + (cols - 1) as f32 * gutter;
        let total_h = rows as f32 + (rows - 1) as f32 * gutter;
        let start_x = -total_w / 2.0 + 0.5;
        let start_y = total_h / 2.0 - 0.5;
        let step = 1.0 + gutter;

        Self {
            origin: transform.transform_point(Vec3::xy(start_x, start_y)),
            ex: transform.transform_vector(Vec3::xy(step, 0.0)),
            er: transform.transform_vector(Vec3::xy(0.0, -step)),
            fallback: true,
        }
    }
}

/// The calibrated board: dimensions, per-cell occupancy and world mapping.
#[derive(Debug, Clone)]
pub struct BoardGrid {
    rows: i32,
    cols: i32,
    gutter: f32,
    transform: BoardTransform,
    // Row-major; `None` where no cell was instantiated.
    cells: Vec<Option<Cell>>,
    calibration: Calibration,
    area: Option<Aabb>,
}

impl BoardGrid {
    /// Builds a full board with one cell per position, laid out by [`GridLayout`].
    pub fn generate(cfg: &BoardConfig) -> GbResult<Self> {
        cfg.validate()?;
        let layout = GridLayout::from_config(cfg);
        let transform = cfg.transform();
        let cells = layout
            .cells()
            .map(|(r, c, local)| Cell::new(r, c, transform.transform_point(local), cfg.cell_capacity))
            .collect();
        Self::from_cells(cfg, cells)
    }

    /// Builds a board from arbitrary sampled cells. Positions may be missing;
    /// calibration falls back to a synthetic basis when the anchor cells are absent.
    pub fn from_cells(cfg: &BoardConfig, cells: Vec<Cell>) -> GbResult<Self> {
        cfg.validate()?;
        let transform = cfg.transform();
        let mut slots: Vec<Option<Cell>> = vec![None; (cfg.rows * cfg.cols) as usize];

        for cell in cells {
            if cell.row < 0 || cell.row >= cfg.rows || cell.col < 0 || cell.col >= cfg.cols {
                return Err(GridboardError::Validation(format!(
                    "Cell ({},{}) lies outside a {}x{} board",
                    cell.row, cell.col, cfg.rows, cfg.cols
                )));
            }
            let idx = (cell.row * cfg.cols + cell.col) as usize;
            slots[idx] = Some(cell);
        }

        let area = cfg.use_board_area.then(|| {
            let (w, h) = cfg.local_size();
            Aabb::from_center(
                transform.origin,
                w * 0.5 * transform.scale,
                h * 0.5 * transform.scale,
            )
        });

        let mut board = Self {
            rows: cfg.rows,
            cols: cfg.cols,
            gutter: cfg.gutter,
            transform,
            cells: slots,
            calibration: Calibration::synthetic(cfg.rows, cfg.cols, cfg.gutter, &transform),
            area,
        };
        board.calibrate();
        Ok(board)
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn gutter(&self) -> f32 {
        self.gutter
    }

    pub fn transform(&self) -> &BoardTransform {
        &self.transform
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Re-derives origin and basis from cells (0,0), (0,1), (1,0).
    /// Never fails; degrades to the synthetic basis with a warning.
    pub fn calibrate(&mut self) -> &Calibration {
        let sampled = match (
            self.try_get_cell(0, 0),
            self.try_get_cell(0, 1),
            self.try_get_cell(1, 0),
        ) {
            (None, _, _) => {
                warn!("Cell (0,0) missing, using fallback calibration");
                None
            }
            (Some(_), None, _) | (Some(_), _, None) => {
                warn!("Cell (0,1) or (1,0) missing, using fallback calibration");
                None
            }
            (Some(c00), Some(c01), Some(c10)) => {
                let cal = Calibration::sampled(c00.position, c01.position, c10.position);
                if cal.is_none() {
                    warn!("Degenerate basis vectors, using fallback calibration");
                }
                cal
            }
        };

        self.calibration = sampled.unwrap_or_else(|| {
            Calibration::synthetic(self.rows, self.cols, self.gutter, &self.transform)
        });
        debug!(
            origin = ?self.calibration.origin,
            fallback = self.calibration.fallback,
            "Board calibrated"
        );
        &self.calibration
    }

    /// Authoritative board rectangle used for the "dropped off the board" test.
    pub fn board_area(&self) -> Option<Aabb> {
        self.area
    }

    pub fn set_board_area(&mut self, area: Option<Aabb>) {
        self.area = area;
    }

    // ----- coordinate mapping -----

    pub fn world_pos_of(&self, row: i32, col: i32) -> Vec3 {
        let cal = &self.calibration;
        cal.origin + cal.ex * col as f32 + cal.er * row as f32
    }

    /// Projects onto the basis vectors: returns `(fractional_row, fractional_col)`.
    /// Exact for orthogonal bases, approximate under shear.
    pub fn fractional_index(&self, world: Vec3) -> (f32, f32) {
        let cal = &self.calibration;
        let d = world - cal.origin;
        let fc = d.dot(cal.ex) / cal.ex.length_squared();
        let fr = d.dot(cal.er) / cal.er.length_squared();
        (fr, fc)
    }

    /// Nearest in-bounds index (may name a position without a cell).
    pub fn nearest_index(&self, world: Vec3) -> (i32, i32) {
        let (fr, fc) = self.fractional_index(world);
        let r = (fr.round_ties_even() as i32).clamp(0, self.rows - 1);
        let c = (fc.round_ties_even() as i32).clamp(0, self.cols - 1);
        (r, c)
    }

    pub fn nearest_cell(&self, world: Vec3) -> Option<&Cell> {
        let (r, c) = self.nearest_index(world);
        self.try_get_cell(r, c)
    }

    /// World center of a rect: midpoint of its two corner cells.
    pub fn world_pos_for_rect(&self, rect: &Rect) -> Vec3 {
        let p00 = self.world_pos_of(rect.r0, rect.c0);
        let p11 = self.world_pos_of(rect.r1, rect.c1);
        (p00 + p11) * 0.5
    }

    /// World length of one column step and one row step.
    pub fn cell_pitch(&self) -> (f32, f32) {
        (self.calibration.ex.length(), self.calibration.er.length())
    }

    // ----- cell lookup -----

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || row >= self.rows || col < 0 || col >= self.cols {
            return None;
        }
        Some((row * self.cols + col) as usize)
    }

    pub fn try_get_cell(&self, row: i32, col: i32) -> Option<&Cell> {
        self.index(row, col).and_then(|i| self.cells[i].as_ref())
    }

    fn cell_mut(&mut self, row: i32, col: i32) -> Option<&mut Cell> {
        let i = self.index(row, col)?;
        self.cells[i].as_mut()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    pub fn occupied_cells(&self) -> Vec<&Cell> {
        self.cells().filter(|c| !c.is_empty()).collect()
    }

    // ----- rect helpers -----

    pub fn is_rect_inside(&self, r: &Rect) -> bool {
        r.r0 >= 0 && r.c0 >= 0 && r.r1 < self.rows && r.c1 < self.cols
    }

    /// Any overlap at all between the rect and the board's index range.
    pub fn rect_overlaps_board(&self, r: &Rect) -> bool {
        !(r.c1 < 0 || r.c0 > self.cols - 1 || r.r1 < 0 || r.r0 > self.rows - 1)
    }

    /// Existing cells inside `rect ∩ board`, row-major.
    pub fn collect_cells_clamped(&self, r: &Rect) -> Vec<&Cell> {
        let rr0 = r.r0.max(0);
        let cc0 = r.c0.max(0);
        let rr1 = r.r1.min(self.rows - 1);
        let cc1 = r.c1.min(self.cols - 1);

        let mut out = Vec::new();
        for row in rr0..=rr1 {
            for col in cc0..=cc1 {
                if let Some(cell) = self.try_get_cell(row, col) {
                    out.push(cell);
                }
            }
        }
        out
    }

    pub(crate) fn clamped_positions(&self, r: &Rect) -> Vec<(i32, i32)> {
        self.collect_cells_clamped(r).iter().map(|c| c.pos()).collect()
    }

    /// False for an empty list or if any cell is full.
    pub fn are_all_available(&self, cells: &[&Cell]) -> bool {
        !cells.is_empty() && cells.iter().all(|c| !c.is_full())
    }

    /// True when none of the cells has an occupant.
    pub fn are_all_free(&self, cells: &[&Cell]) -> bool {
        cells.iter().all(|c| c.is_empty())
    }

    /// Inside the board, every covered position has a cell, and every cell has room.
    pub fn can_place(&self, r: &Rect) -> bool {
        if !self.is_rect_inside(r) {
            return false;
        }
        let cells = self.collect_cells_clamped(r);
        cells.len() as i32 == r.area() && self.are_all_available(&cells)
    }

    // ----- occupancy mutation (pieces only) -----

    pub(crate) fn claim(&mut self, positions: &[(i32, i32)], key: PieceKey) {
        for &(r, c) in positions {
            if let Some(cell) = self.cell_mut(r, c) {
                if !cell.add_occupant(key) {
                    debug!(row = r, col = c, %key, "Claim skipped, cell full or already held");
                }
            }
        }
    }

    pub(crate) fn release(&mut self, positions: &[(i32, i32)], key: PieceKey) {
        for &(r, c) in positions {
            if let Some(cell) = self.cell_mut(r, c) {
                cell.remove_occupant(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(rows: i32, cols: i32) -> BoardConfig {
        BoardConfig {
            rows,
            cols,
            ..Default::default()
        }
    }

    #[test]
    fn generated_board_matches_fallback_basis() {
        // Fit-to-unit-cells boards put the sampled basis exactly where the fallback would.
        let board = BoardGrid::generate(&cfg(3, 5)).unwrap();
        assert!(!board.calibration().fallback);
        let synthetic = Calibration::synthetic(3, 5, 0.1, board.transform());
        let cal = board.calibration();
        assert!(cal.origin.distance(synthetic.origin) < 1e-4);
        assert!(cal.ex.distance(synthetic.ex) < 1e-4);
        assert!(cal.er.distance(synthetic.er) < 1e-4);
    }

    #[test]
    fn missing_anchor_cell_falls_back() {
        let c = cfg(2, 2);
        let cells = vec![
            Cell::new(0, 0, Vec3::xy(0.0, 0.0), 1),
            Cell::new(1, 1, Vec3::xy(1.0, -1.0), 1),
        ];
        let board = BoardGrid::from_cells(&c, cells).unwrap();
        assert!(board.calibration().fallback);
    }

    #[test]
    fn rect_over_a_hole_cannot_be_placed() {
        let c = cfg(2, 2);
        let cells = vec![
            Cell::new(0, 0, Vec3::xy(0.0, 0.0), 1),
            Cell::new(0, 1, Vec3::xy(1.0, 0.0), 1),
            Cell::new(1, 0, Vec3::xy(0.0, -1.0), 1),
        ];
        let board = BoardGrid::from_cells(&c, cells).unwrap();
        assert!(board.can_place(&Rect::new(0, 0, 0, 1)));
        assert!(!board.can_place(&Rect::new(0, 0, 1, 1)));
        assert!(!board.can_place(&Rect::cell(1, 1)));
    }

    #[test]
    fn out_of_range_cell_is_rejected() {
        let cells = vec![Cell::new(5, 0, Vec3::ZERO, 1)];
        assert!(BoardGrid::from_cells(&cfg(2, 2), cells).is_err());
    }

    #[test]
    fn nearest_rounds_half_to_even() {
        let board = BoardGrid::generate(&BoardConfig {
            gutter: 0.0,
            ..cfg(4, 4)
        })
        .unwrap();
        let mid = (board.world_pos_of(0, 0) + board.world_pos_of(0, 1)) * 0.5;
        assert_eq!(board.nearest_index(mid), (0, 0));
        let mid = (board.world_pos_of(0, 1) + board.world_pos_of(0, 2)) * 0.5;
        assert_eq!(board.nearest_index(mid), (0, 2));
    }
}
