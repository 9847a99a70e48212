use gridboard::footprint::{self, EdgeMargins, Rect};
use gridboard::piece::align::{board_target, reference_target};
use gridboard::piece::{footprint_from_fractional, AlignOp, FootprintOffset, PivotAnchor};
use rstest::rstest;

const NO_OFFSET: FootprintOffset = FootprintOffset::new(0.0, 0.0);

// --- FOOTPRINT FROM ANCHOR ---

#[rstest]
#[case(1.4, 2.6, 1, 1, PivotAnchor::Center, Rect::new(1, 3, 1, 3))]
#[case(1.5, 1.5, 2, 2, PivotAnchor::Center, Rect::new(1, 1, 2, 2))]
// Even footprints on a whole-cell anchor: half-extents round away from each other...
#[case(1.0, 1.0, 2, 2, PivotAnchor::Center, Rect::new(0, 0, 2, 2))]
// ...or onto the same cell, both to even.
#[case(2.0, 2.0, 2, 2, PivotAnchor::Center, Rect::new(2, 2, 2, 2))]
#[case(1.0, 1.0, 3, 3, PivotAnchor::Center, Rect::new(0, 0, 2, 2))]
#[case(0.6, 1.2, 2, 3, PivotAnchor::TopLeft, Rect::new(1, 1, 2, 3))]
#[case(0.0, 3.0, 1, 2, PivotAnchor::TopRight, Rect::new(0, 2, 0, 3))]
#[case(3.0, 0.0, 2, 1, PivotAnchor::BottomLeft, Rect::new(2, 0, 3, 0))]
#[case(3.2, 2.8, 2, 2, PivotAnchor::BottomRight, Rect::new(2, 2, 3, 3))]
fn test_footprint_from_anchor(
    #[case] fr: f32,
    #[case] fc: f32,
    #[case] rows: i32,
    #[case] cols: i32,
    #[case] pivot: PivotAnchor,
    #[case] expected: Rect,
) {
    assert_eq!(
        footprint_from_fractional(fr, fc, rows, cols, pivot, NO_OFFSET),
        expected
    );
}

#[rstest]
#[case(FootprintOffset::new(1.0, 0.0), Rect::new(1, 2, 1, 2))]
#[case(FootprintOffset::new(0.0, -1.0), Rect::new(0, 1, 0, 1))]
#[case(FootprintOffset::new(0.4, 0.4), Rect::new(1, 1, 1, 1))]
fn test_offset_shifts_before_rounding(#[case] offset: FootprintOffset, #[case] expected: Rect) {
    let r = footprint_from_fractional(1.0, 1.0, 1, 1, PivotAnchor::Center, offset);
    assert_eq!(r, expected);
}

#[rstest]
#[case(PivotAnchor::TopLeft, 3.0e9, 3.0e9)]
#[case(PivotAnchor::TopRight, -3.0e9, 3.0e9)]
#[case(PivotAnchor::BottomLeft, 3.0e9, -3.0e9)]
#[case(PivotAnchor::BottomRight, -3.0e9, -3.0e9)]
#[case(PivotAnchor::BottomRight, 3.0e9, 3.0e9)]
#[case(PivotAnchor::TopLeft, -3.0e9, -3.0e9)]
fn test_far_off_anchor_stays_off_board(
    #[case] pivot: PivotAnchor,
    #[case] fr: f32,
    #[case] fc: f32,
) {
    let board = Rect::new(0, 0, 8, 8);
    let r = footprint_from_fractional(fr, fc, 2, 3, pivot, NO_OFFSET);
    assert!(!footprint::intersects(&r, &board), "{:?}", r);
    assert_eq!(r.height(), 2, "{:?}", r);
    assert_eq!(r.width(), 3, "{:?}", r);
    assert!(r.r0 <= r.r1 && r.c0 <= r.c1, "{:?}", r);
}

#[test]
fn test_far_off_center_anchor_stays_off_board() {
    let board = Rect::new(0, 0, 8, 8);
    let r = footprint_from_fractional(-3.0e9, 3.0e9, 3, 3, PivotAnchor::Center, NO_OFFSET);
    assert!(!footprint::intersects(&r, &board), "{:?}", r);
    assert!(r.r1 < 0 && r.c0 > 8, "{:?}", r);
}

#[test]
fn test_pivot_parses_from_text() {
    assert_eq!("top_left".parse::<PivotAnchor>().unwrap(), PivotAnchor::TopLeft);
    assert_eq!(PivotAnchor::default(), PivotAnchor::Center);
    assert!("middle".parse::<PivotAnchor>().is_err());
}

// --- GAP / MARGIN METRICS ---

#[rstest]
#[case(Rect::cell(0, 0), Rect::cell(0, 2), 1)]
#[case(Rect::cell(0, 0), Rect::cell(0, 1), 0)]
#[case(Rect::new(0, 0, 1, 1), Rect::new(1, 1, 2, 2), 0)]
#[case(Rect::cell(0, 0), Rect::cell(3, 0), 2)]
// Diagonal: only separated axes count, the smaller wins.
#[case(Rect::cell(0, 0), Rect::cell(2, 3), 1)]
#[case(Rect::cell(0, 0), Rect::cell(1, 1), 0)]
#[case(Rect::cell(0, 0), Rect::cell(5, 1), 4)]
fn test_min_gap_cells(#[case] a: Rect, #[case] b: Rect, #[case] expected: i32) {
    assert_eq!(footprint::min_gap_cells(&a, &b), expected);
    assert_eq!(footprint::min_gap_cells(&b, &a), expected);
}

#[rstest]
#[case(Rect::new(1, 2, 2, 3), 4, 6, [1, 2, 1, 2])]
#[case(Rect::cell(0, 0), 4, 4, [0, 3, 3, 0])]
#[case(Rect::new(0, 0, 3, 3), 4, 4, [0, 0, 0, 0])]
fn test_edge_margins(
    #[case] r: Rect,
    #[case] rows: i32,
    #[case] cols: i32,
    #[case] expected: [i32; 4],
) {
    let m: EdgeMargins = footprint::edge_margins(&r, rows, cols);
    assert_eq!(m.as_array(), expected);
    assert_eq!(m.min(), *expected.iter().min().unwrap());
}

#[rstest]
#[case(Rect::new(0, 0, 0, 0), Rect::new(0, 0, 0, 0), true)]
#[case(Rect::new(0, 0, 1, 1), Rect::new(1, 1, 2, 2), true)]
#[case(Rect::new(0, 0, 1, 1), Rect::new(2, 0, 3, 1), false)]
#[case(Rect::new(0, 0, 1, 1), Rect::new(0, 2, 1, 3), false)]
fn test_intersects(#[case] a: Rect, #[case] b: Rect, #[case] expected: bool) {
    assert_eq!(footprint::intersects(&a, &b), expected);
    assert_eq!(footprint::intersects(&b, &a), expected);
}

#[rstest]
#[case(Rect::cell(1, 2), 4, 6, 1, 1.0)]
#[case(Rect::cell(0, 0), 4, 4, 1, 0.5)]
#[case(Rect::cell(3, 3), 4, 4, 1, 0.0)]
#[case(Rect::new(1, 1, 2, 2), 4, 4, 0, 1.0)]
fn test_center_score(
    #[case] r: Rect,
    #[case] rows: i32,
    #[case] cols: i32,
    #[case] tolerance: i32,
    #[case] expected: f32,
) {
    let s = footprint::center_score(&r, rows, cols, tolerance);
    assert!((s - expected).abs() < 1e-5, "got {}", s);
}

#[rstest]
#[case(Rect::cell(1, 1), 3, 3, 1.0)]
#[case(Rect::cell(0, 0), 3, 3, 0.0)]
#[case(Rect::new(0, 1, 0, 1), 3, 3, 0.5)]
fn test_balance_score(#[case] r: Rect, #[case] rows: i32, #[case] cols: i32, #[case] expected: f32) {
    let s = footprint::balance_score(&r, rows, cols);
    assert!((s - expected).abs() < 1e-4, "got {}", s);
}

#[test]
fn test_smooth_step_bounds() {
    assert_eq!(footprint::smooth_step01(-1.0), 0.0);
    assert_eq!(footprint::smooth_step01(0.5), 0.5);
    assert_eq!(footprint::smooth_step01(2.0), 1.0);
}

// --- ALIGNMENT TARGETS ---

#[rstest]
#[case(AlignOp::Left, Rect::new(2, 0, 2, 2))]
#[case(AlignOp::Right, Rect::new(2, 3, 2, 5))]
#[case(AlignOp::Top, Rect::new(0, 2, 0, 4))]
#[case(AlignOp::Bottom, Rect::new(5, 2, 5, 4))]
#[case(AlignOp::HorizontalCenter, Rect::new(2, 2, 2, 4))]
#[case(AlignOp::VerticalCenter, Rect::new(2, 2, 2, 4))]
fn test_board_alignment(#[case] op: AlignOp, #[case] expected: Rect) {
    let current = Rect::new(2, 2, 2, 4);
    assert_eq!(board_target(op, &current, 1, 3, 6, 6), expected);
}

#[rstest]
#[case(AlignOp::Left, Rect::cell(0, 1))]
#[case(AlignOp::Right, Rect::cell(0, 3))]
#[case(AlignOp::Top, Rect::cell(2, 0))]
#[case(AlignOp::Bottom, Rect::cell(4, 0))]
#[case(AlignOp::HorizontalCenter, Rect::cell(0, 2))]
#[case(AlignOp::VerticalCenter, Rect::cell(3, 0))]
fn test_reference_alignment(#[case] op: AlignOp, #[case] expected: Rect) {
    let reference = Rect::new(2, 1, 4, 3);
    assert_eq!(
        reference_target(op, &Rect::cell(0, 0), &reference, 6, 6),
        expected
    );
}

#[test]
fn test_reference_alignment_clamps_by_shifting() {
    let r = reference_target(
        AlignOp::Left,
        &Rect::new(0, 0, 0, 2),
        &Rect::cell(0, 5),
        6,
        6,
    );
    assert_eq!(r, Rect::new(0, 3, 0, 5));
    assert_eq!(r.width(), 3);
}

#[test]
fn test_align_op_names() {
    assert_eq!(AlignOp::HorizontalCenter.to_string(), "horizontal_center");
    assert_eq!("right".parse::<AlignOp>().unwrap(), AlignOp::Right);
}
