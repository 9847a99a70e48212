use gridboard::board::BoardGrid;
use gridboard::config::{BoardConfig, Config};
use gridboard::footprint::{self, Rect};
use gridboard::geometry::Vec3;
use gridboard::piece::{
    AlignOp, DropOutcome, PieceId, PieceParams, PieceVariantDef, PieceVariantSet, PivotAnchor,
};
use gridboard::rubric::Rubric;
use gridboard::scene::{PieceKey, Scene};

const TRAY: Vec3 = Vec3::new(-10.0, 0.0, 0.0);

fn scene(rows: i32, cols: i32) -> Scene {
    let config = Config {
        board: BoardConfig {
            rows,
            cols,
            ..Default::default()
        },
        ..Default::default()
    };
    let board = BoardGrid::generate(&config.board).unwrap();
    Scene::new(board, Rubric::default(), &config)
}

fn piece(rows: i32, cols: i32) -> PieceParams {
    PieceParams::builder()
        .size_rows(rows)
        .size_cols(cols)
        .position(TRAY)
        .build()
}

/// World point at a fractional grid index.
fn world_at(board: &BoardGrid, fr: f32, fc: f32) -> Vec3 {
    let cal = board.calibration();
    cal.origin + cal.ex * fc + cal.er * fr
}

fn drag(scene: &mut Scene, key: PieceKey, to: Vec3) -> DropOutcome {
    let from = scene.piece(key).unwrap().position();
    assert!(scene.begin_drag(key, from).unwrap());
    scene.drag_to(key, to).unwrap();
    scene.end_drag(key).unwrap()
}

fn occupants(scene: &Scene, row: i32, col: i32) -> Vec<PieceKey> {
    scene
        .board()
        .try_get_cell(row, col)
        .unwrap()
        .occupants()
        .to_vec()
}

#[test]
fn test_drop_rounds_anchor_to_nearest_cell() {
    let mut s = scene(4, 4);
    let key = s.spawn(piece(1, 1));
    let target = world_at(s.board(), 1.4, 2.6);

    assert!(s.begin_drag(key, TRAY).unwrap());
    assert_eq!(s.drag_to(key, target).unwrap(), Some(Rect::new(1, 3, 1, 3)));
    assert_eq!(s.end_drag(key).unwrap(), DropOutcome::Snapped(Rect::new(1, 3, 1, 3)));

    assert_eq!(occupants(&s, 1, 3), vec![key]);
    assert_eq!(s.board().occupied_cells().len(), 1);

    s.settle();
    let p = s.piece(key).unwrap().position();
    let expected = s.board().world_pos_of(1, 3);
    assert!(p.distance(expected) < 1e-5);
}

#[test]
fn test_drop_on_occupied_cell_returns_to_start() {
    let mut s = scene(4, 4);
    let first = s.spawn(piece(1, 1));
    let target = world_at(s.board(), 1.4, 2.6);
    assert!(drag(&mut s, first, target).is_committed());

    let second = s.spawn(piece(1, 1));
    let outcome = drag(&mut s, second, target);
    assert_eq!(outcome, DropOutcome::Reverted);
    assert!(!outcome.is_committed());

    s.settle();
    assert_eq!(s.piece(second).unwrap().position(), TRAY);
    assert!(!s.piece(second).unwrap().is_snapped());
    assert_eq!(occupants(&s, 1, 3), vec![first]);
}

#[test]
fn test_snapped_piece_dropped_off_board_is_discarded() {
    let mut s = scene(4, 4);
    let key = s.spawn(piece(2, 2));
    assert!(s.try_snap_to_rect(key, Rect::new(0, 0, 1, 1), false).unwrap());
    assert_eq!(s.ruler().len(), 4);

    let outcome = drag(&mut s, key, Vec3::xy(100.0, 0.0));
    assert_eq!(outcome, DropOutcome::Discarded);
    assert!(s.piece(key).is_none());
    for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        assert!(s.board().try_get_cell(r, c).unwrap().is_empty());
    }
}

#[test]
fn test_unplaced_piece_dropped_off_board_reverts() {
    let mut s = scene(4, 4);
    let key = s.spawn(piece(1, 1));
    let outcome = drag(&mut s, key, Vec3::xy(0.0, 50.0));
    assert_eq!(outcome, DropOutcome::Reverted);
    s.settle();
    assert_eq!(s.piece(key).unwrap().position(), TRAY);
    assert_eq!(s.piece_count(), 1);
}

#[test]
fn test_corner_pivot_dropped_far_away_reverts() {
    for (pivot, fr, fc) in [
        (PivotAnchor::TopLeft, 3.0e9, 3.0e9),
        (PivotAnchor::BottomRight, -3.0e9, -3.0e9),
    ] {
        let mut s = scene(4, 4);
        let key = s.spawn(
            PieceParams::builder()
                .size_rows(2)
                .size_cols(2)
                .pivot(pivot)
                .position(TRAY)
                .build(),
        );
        let far = world_at(s.board(), fr, fc);
        assert_eq!(drag(&mut s, key, far), DropOutcome::Reverted, "{:?}", pivot);
        assert!(s.board().occupied_cells().is_empty());
    }
}

#[test]
fn test_snapped_piece_reverted_reclaims_its_cells() {
    let mut s = scene(4, 4);
    let a = s.spawn(piece(1, 1));
    let b = s.spawn(piece(1, 1));
    assert!(s.try_snap_to_rect(a, Rect::cell(0, 0), false).unwrap());
    assert!(s.try_snap_to_rect(b, Rect::cell(2, 2), false).unwrap());

    // a onto b's cell: invalid, so a goes home and takes (0,0) back.
    let onto_b = s.board().world_pos_of(2, 2);
    assert_eq!(drag(&mut s, a, onto_b), DropOutcome::Reverted);
    assert_eq!(occupants(&s, 0, 0), vec![a]);
    assert_eq!(occupants(&s, 2, 2), vec![b]);
    assert_eq!(s.piece(a).unwrap().current_rect(), Some(Rect::cell(0, 0)));
}

#[test]
fn test_partially_outside_drop_is_rejected() {
    let mut s = scene(4, 4);
    let key = s.spawn(piece(2, 2));
    // Anchor near the right edge: the 2x2 footprint would spill past column 3.
    let edge = world_at(s.board(), 1.5, 3.5);
    let outcome = drag(&mut s, key, edge);
    assert_eq!(outcome, DropOutcome::Reverted);
    assert!(s.board().occupied_cells().is_empty());
}

#[test]
fn test_end_drag_without_begin() {
    let mut s = scene(4, 4);
    let key = s.spawn(piece(1, 1));
    assert_eq!(s.end_drag(key).unwrap(), DropOutcome::NotDragging);
}

#[test]
fn test_second_concurrent_drag_is_refused() {
    let mut s = scene(4, 4);
    let a = s.spawn(piece(1, 1));
    let b = s.spawn(piece(1, 1));
    assert!(s.begin_drag(a, TRAY).unwrap());
    assert!(!s.begin_drag(b, TRAY).unwrap());
    assert_eq!(s.dragging(), Some(a));
    s.end_drag(a).unwrap();
    assert!(s.dragging().is_none());
    assert!(s.begin_drag(b, TRAY).unwrap());
}

#[test]
fn test_try_snap_refused_while_dragging() {
    let mut s = scene(4, 4);
    let key = s.spawn(piece(1, 1));
    assert!(s.begin_drag(key, TRAY).unwrap());
    assert!(!s.try_snap_to_rect(key, Rect::cell(0, 0), false).unwrap());
}

#[test]
fn test_begin_drag_frees_cells_for_the_duration() {
    let mut s = scene(4, 4);
    let key = s.spawn(piece(1, 2));
    assert!(s.try_snap_to_rect(key, Rect::new(3, 0, 3, 1), false).unwrap());
    let from = s.piece(key).unwrap().position();
    assert!(s.begin_drag(key, from).unwrap());
    assert!(s.board().occupied_cells().is_empty());
    assert!(!s.piece(key).unwrap().is_snapped());
}

#[test]
fn test_unknown_piece_is_an_error() {
    let mut s = scene(4, 4);
    let key = s.spawn(piece(1, 1));
    s.remove(key).unwrap();
    assert!(s.begin_drag(key, TRAY).is_err());
    assert!(s.remove(key).is_err());
}

#[test]
fn test_align_right_moves_into_free_columns() {
    let mut s = scene(6, 6);
    let key = s.spawn(piece(1, 3));
    assert!(s.try_snap_to_rect(key, Rect::new(0, 2, 0, 4), false).unwrap());

    assert!(s.align(key, AlignOp::Right, true).unwrap());
    let p = s.piece(key).unwrap();
    assert_eq!(p.current_rect(), Some(Rect::new(0, 3, 0, 5)));
    assert!(p.is_moving());

    s.settle();
    let expected = s.board().world_pos_for_rect(&Rect::new(0, 3, 0, 5));
    assert!(s.piece(key).unwrap().position().distance(expected) < 1e-5);
    assert!(s.board().try_get_cell(0, 2).unwrap().is_empty());
}

#[test]
fn test_align_right_blocked_keeps_position() {
    let mut s = scene(6, 6);
    let key = s.spawn(piece(1, 3));
    let blocker = s.spawn(piece(1, 1));
    assert!(s.try_snap_to_rect(key, Rect::new(0, 2, 0, 4), false).unwrap());
    assert!(s.try_snap_to_rect(blocker, Rect::cell(0, 5), false).unwrap());
    let before = s.piece(key).unwrap().position();

    assert!(!s.align(key, AlignOp::Right, true).unwrap());
    let p = s.piece(key).unwrap();
    assert_eq!(p.current_rect(), Some(Rect::new(0, 2, 0, 4)));
    assert_eq!(p.position(), before);
    assert!(!p.is_moving());
    assert_eq!(occupants(&s, 0, 5), vec![blocker]);
}

#[test]
fn test_align_unplaced_piece_fails() {
    let mut s = scene(6, 6);
    let key = s.spawn(piece(1, 3));
    assert!(!s.align(key, AlignOp::Left, false).unwrap());
}

#[test]
fn test_align_selection_to_reference() {
    let mut s = scene(6, 6);
    let reference = s.spawn(piece(1, 2));
    let other = s.spawn(piece(1, 1));
    assert!(s.try_snap_to_rect(reference, Rect::new(4, 3, 4, 4), false).unwrap());
    assert!(s.try_snap_to_rect(other, Rect::cell(1, 0), false).unwrap());

    s.select(other, false).unwrap();
    s.select(reference, true).unwrap();
    assert_eq!(s.selection().active(), Some(reference));

    let report = s.align_selection(AlignOp::Right, false);
    assert_eq!(report.moved, vec![other]);
    assert_eq!(report.skipped, vec![reference]);
    assert!(report.failed.is_empty());
    assert_eq!(s.piece(other).unwrap().current_rect(), Some(Rect::cell(1, 4)));
}

#[test]
fn test_align_selection_single_uses_board() {
    let mut s = scene(6, 6);
    let key = s.spawn(piece(2, 2));
    assert!(s.try_snap_to_rect(key, Rect::new(2, 2, 3, 3), false).unwrap());
    s.select(key, false).unwrap();

    let report = s.align_selection(AlignOp::Bottom, false);
    assert_eq!(report.moved, vec![key]);
    assert_eq!(s.piece(key).unwrap().current_rect(), Some(Rect::new(4, 2, 5, 3)));
}

#[test]
fn test_variant_switch_resnaps_around_center() {
    let mut s = scene(6, 6);
    let variants = PieceVariantSet::new(vec![
        PieceVariantDef {
            id: "wide".into(),
            size_rows: 1,
            size_cols: 3,
            pivot: PivotAnchor::Center,
            offset: Default::default(),
        },
        PieceVariantDef {
            id: "tall".into(),
            size_rows: 3,
            size_cols: 1,
            pivot: PivotAnchor::Center,
            offset: Default::default(),
        },
    ]);
    let key = s.spawn(
        PieceParams::builder()
            .id(PieceId::Title)
            .position(TRAY)
            .variants(variants)
            .build(),
    );
    assert_eq!(s.piece(key).unwrap().size_cols, 3);
    assert!(s.try_snap_to_rect(key, Rect::new(2, 1, 2, 3), false).unwrap());

    assert!(s.set_piece_variant(key, 1).unwrap());
    s.settle();
    let p = s.piece(key).unwrap();
    assert_eq!((p.size_rows, p.size_cols), (3, 1));
    assert_eq!(p.current_rect(), Some(Rect::new(1, 2, 3, 2)));
    assert_eq!(s.board().occupied_cells().len(), 3);
}

#[test]
fn test_highlight_reports_blocked_cells() {
    let mut s = scene(4, 4);
    let placed = s.spawn(piece(1, 1));
    assert!(s.try_snap_to_rect(placed, Rect::cell(1, 1), false).unwrap());

    let mover = s.spawn(piece(2, 2));
    let over = world_at(s.board(), 1.5, 1.5);
    assert!(s.begin_drag(mover, TRAY).unwrap());
    s.drag_to(mover, over).unwrap();

    let h = s.highlight(mover).unwrap();
    assert_eq!(h.rect, Rect::new(1, 1, 2, 2));
    assert_eq!(h.cells.len(), 4);
    assert_eq!(h.occupied, vec![(1, 1)]);
    assert!(!h.placeable);
}

#[test]
fn test_min_gap_same_row() {
    let a = Rect::cell(0, 0);
    let b = Rect::cell(0, 2);
    assert_eq!(footprint::min_gap_cells(&a, &b), 1);
}
