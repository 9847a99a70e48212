use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive integer rectangle in grid space (`r0 <= r1`, `c0 <= c1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub r0: i32,
    pub c0: i32,
    pub r1: i32,
    pub c1: i32,
}

impl Rect {
    pub const fn new(r0: i32, c0: i32, r1: i32, c1: i32) -> Self {
        Self { r0, c0, r1, c1 }
    }

    pub const fn cell(row: i32, col: i32) -> Self {
        Self::new(row, col, row, col)
    }

    #[inline(always)]
    pub fn width(&self) -> i32 {
        self.c1 - self.c0 + 1
    }

    #[inline(always)]
    pub fn height(&self) -> i32 {
        self.r1 - self.r0 + 1
    }

    pub fn center_row(&self) -> i32 {
        (self.r0 + self.r1) >> 1
    }

    pub fn center_col(&self) -> i32 {
        (self.c0 + self.c1) >> 1
    }

    pub fn area(&self) -> i32 {
        self.width().max(0) * self.height().max(0)
    }

    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= self.r0 && row <= self.r1 && col >= self.c0 && col <= self.c1
    }

    pub fn translated(&self, dr: i32, dc: i32) -> Self {
        Self::new(self.r0 + dr, self.c0 + dc, self.r1 + dr, self.c1 + dc)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})..({},{})", self.r0, self.c0, self.r1, self.c1)
    }
}

/// Distances from a rect to the four board edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMargins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl EdgeMargins {
    pub fn min(&self) -> i32 {
        self.top.min(self.right).min(self.bottom).min(self.left)
    }

    pub fn all_at_least(&self, min: i32) -> bool {
        self.min() >= min
    }

    pub fn as_array(&self) -> [i32; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}

pub fn intersects(a: &Rect, b: &Rect) -> bool {
    let separated = a.r1 < b.r0 || b.r1 < a.r0 || a.c1 < b.c0 || b.c1 < a.c0;
    !separated
}

/// Cells strictly between two rects. Only axes that are actually separated contribute;
/// when both are, the smaller gap wins. Touching or overlapping rects report 0.
pub fn min_gap_cells(a: &Rect, b: &Rect) -> i32 {
    let row_gap = if a.r1 < b.r0 {
        b.r0 - a.r1 - 1
    } else if b.r1 < a.r0 {
        a.r0 - b.r1 - 1
    } else {
        0
    };

    let col_gap = if a.c1 < b.c0 {
        b.c0 - a.c1 - 1
    } else if b.c1 < a.c0 {
        a.c0 - b.c1 - 1
    } else {
        0
    };

    match (row_gap, col_gap) {
        (0, 0) => 0,
        (0, c) => c,
        (r, 0) => r,
        (r, c) => r.min(c),
    }
}

pub fn edge_margins(r: &Rect, rows: i32, cols: i32) -> EdgeMargins {
    EdgeMargins {
        top: r.r0,
        right: (cols - 1) - r.c1,
        bottom: (rows - 1) - r.r1,
        left: r.c0,
    }
}

#[inline(always)]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Hermite smooth-step between 0 and 1.
#[inline(always)]
pub fn smooth_step01(t: f32) -> f32 {
    let t = clamp01(t);
    t * t * (3.0 - 2.0 * t)
}

/// How close the rect center sits to the board center, 0..1 (1 = centered).
/// Each axis falls off from 1 at distance 0 to 0 at `tolerance + 1` cells.
pub fn center_score(r: &Rect, rows: i32, cols: i32, tolerance: i32) -> f32 {
    let board_row = (rows - 1) >> 1;
    let board_col = (cols - 1) >> 1;
    let dr = (r.center_row() - board_row).abs() as f32;
    let dc = (r.center_col() - board_col).abs() as f32;
    let span = (tolerance + 1) as f32;

    let nr = smooth_step01(1.0 - dr / span);
    let nc = smooth_step01(1.0 - dc / span);
    0.5 * (nr + nc)
}

/// Symmetry of left/right and top/bottom whitespace, 0..1.
pub fn balance_score(r: &Rect, rows: i32, cols: i32) -> f32 {
    let m = edge_margins(r, rows, cols);
    let lr = 1.0 - clamp01((m.left - m.right).abs() as f32 / (cols as f32 * 0.5 + 1e-5));
    let tb = 1.0 - clamp01((m.top - m.bottom).abs() as f32 / (rows as f32 * 0.5 + 1e-5));
    0.5 * (lr + tb)
}
