use crate::footprint::Rect;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlignOp {
    Left,
    Right,
    Top,
    Bottom,
    HorizontalCenter,
    VerticalCenter,
}

#[inline(always)]
fn round_cell(v: f32) -> i32 {
    v.round_ties_even() as i32
}

/// Shifts a rect back inside `[0, rows-1] x [0, cols-1]` without changing its size
/// (as far as the board allows).
pub fn clamp_into_board(r: Rect, rows: i32, cols: i32) -> Rect {
    clamp_rows(clamp_cols(r, cols), rows)
}

/// Target rect when aligning a single piece against the board.
///
/// Edge ops keep the current size. Centering uses the declared footprint size on the
/// centered axis and the current size on the other, then clamps by shifting.
pub fn board_target(
    op: AlignOp,
    current: &Rect,
    declared_rows: i32,
    declared_cols: i32,
    rows: i32,
    cols: i32,
) -> Rect {
    let Rect { r0, c0, r1, c1 } = *current;
    let width = current.width();
    let height = current.height();

    match op {
        AlignOp::Left => Rect::new(r0, 0, r1, width - 1),
        AlignOp::Right => Rect::new(r0, cols - width, r1, cols - 1),
        AlignOp::Top => Rect::new(0, c0, height - 1, c1),
        AlignOp::Bottom => Rect::new(rows - height, c0, rows - 1, c1),
        AlignOp::HorizontalCenter => {
            let w = declared_cols;
            let mid = (cols - 1) as f32 * 0.5;
            let nc0 = round_cell(mid - (w - 1) as f32 * 0.5);
            let shifted = Rect::new(r0, nc0, r0 + height - 1, nc0 + w - 1);
            clamp_cols(shifted, cols)
        }
        AlignOp::VerticalCenter => {
            let h = declared_rows;
            let mid = (rows - 1) as f32 * 0.5;
            let nr0 = round_cell(mid - (h - 1) as f32 * 0.5);
            let shifted = Rect::new(nr0, c0, nr0 + h - 1, c0 + width - 1);
            clamp_rows(shifted, rows)
        }
    }
}

fn clamp_cols(r: Rect, cols: i32) -> Rect {
    let (mut c0, mut c1) = (r.c0, r.c1);
    if c0 < 0 {
        c1 -= c0;
        c0 = 0;
    }
    if c1 > cols - 1 {
        let diff = c1 - (cols - 1);
        c1 -= diff;
        c0 -= diff;
    }
    Rect::new(r.r0, c0, r.r1, c1)
}

fn clamp_rows(r: Rect, rows: i32) -> Rect {
    let (mut r0, mut r1) = (r.r0, r.r1);
    if r0 < 0 {
        r1 -= r0;
        r0 = 0;
    }
    if r1 > rows - 1 {
        let diff = r1 - (rows - 1);
        r1 -= diff;
        r0 -= diff;
    }
    Rect::new(r0, r.c0, r1, r.c1)
}

/// Target rect when aligning `current` to another selected piece's rect.
/// The reference center is `r0 + (r1 - r0) / 2` (integer division).
pub fn reference_target(op: AlignOp, current: &Rect, reference: &Rect, rows: i32, cols: i32) -> Rect {
    let Rect { r0, c0, r1, c1 } = *current;
    let (mut nr0, mut nc0, mut nr1, mut nc1) = (r0, c0, r1, c1);

    match op {
        AlignOp::Left => {
            nc0 = reference.c0;
            nc1 = nc0 + (c1 - c0);
        }
        AlignOp::Right => {
            nc1 = reference.c1;
            nc0 = nc1 - (c1 - c0);
        }
        AlignOp::Top => {
            nr0 = reference.r0;
            nr1 = nr0 + (r1 - r0);
        }
        AlignOp::Bottom => {
            nr1 = reference.r1;
            nr0 = nr1 - (r1 - r0);
        }
        AlignOp::HorizontalCenter => {
            let w = current.width();
            let target = reference.c0 + (reference.c1 - reference.c0) / 2;
            nc0 = round_cell(target as f32 - (w - 1) as f32 * 0.5);
            nc1 = nc0 + w - 1;
        }
        AlignOp::VerticalCenter => {
            let h = current.height();
            let target = reference.r0 + (reference.r1 - reference.r0) / 2;
            nr0 = round_cell(target as f32 - (h - 1) as f32 * 0.5);
            nr1 = nr0 + h - 1;
        }
    }

    clamp_into_board(Rect::new(nr0, nc0, nr1, nc1), rows, cols)
}
