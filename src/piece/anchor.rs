use crate::footprint::Rect;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Which point of the footprint the piece's anchor sits on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PivotAnchor {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Shift applied to the anchor before rounding, in cells. `x` = columns (+right), `y` = rows (+down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FootprintOffset {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl FootprintOffset {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// Far enough off any board, and the derived corner cannot overflow.
const FAR_CELL: f32 = (i32::MAX / 4) as f32;

#[inline(always)]
fn round_cell(v: f32) -> i32 {
    v.clamp(-FAR_CELL, FAR_CELL).round_ties_even() as i32
}

/// Footprint rectangle for an anchor at fractional grid position `(fr, fc)`.
///
/// `Center` rounds the two half-extents independently, so an even-sized footprint
/// whose anchor lands on a half cell can come out one cell larger or shifted.
/// Corner anchors round one corner and derive the other from the size.
/// Anchors far off the grid are pulled in to `±i32::MAX / 4` first.
pub fn footprint_from_fractional(
    fr: f32,
    fc: f32,
    size_rows: i32,
    size_cols: i32,
    pivot: PivotAnchor,
    offset: FootprintOffset,
) -> Rect {
    let fr = fr + offset.y;
    let fc = fc + offset.x;

    match pivot {
        PivotAnchor::Center => {
            let half_h = (size_rows - 1) as f32 * 0.5;
            let half_w = (size_cols - 1) as f32 * 0.5;
            Rect::new(
                round_cell(fr - half_h),
                round_cell(fc - half_w),
                round_cell(fr + half_h),
                round_cell(fc + half_w),
            )
        }
        PivotAnchor::TopLeft => {
            let r0 = round_cell(fr);
            let c0 = round_cell(fc);
            Rect::new(r0, c0, r0 + size_rows - 1, c0 + size_cols - 1)
        }
        PivotAnchor::TopRight => {
            let r0 = round_cell(fr);
            let c1 = round_cell(fc);
            Rect::new(r0, c1 - size_cols + 1, r0 + size_rows - 1, c1)
        }
        PivotAnchor::BottomLeft => {
            let r1 = round_cell(fr);
            let c0 = round_cell(fc);
            Rect::new(r1 - size_rows + 1, c0, r1, c0 + size_cols - 1)
        }
        PivotAnchor::BottomRight => {
            let r1 = round_cell(fr);
            let c1 = round_cell(fc);
            Rect::new(r1 - size_rows + 1, c1 - size_cols + 1, r1, c1)
        }
    }
}
