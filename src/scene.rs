use crate::board::BoardGrid;
use crate::color::Rgb;
use crate::config::{Config, MotionConfig};
use crate::error::{GbResult, GridboardError};
use crate::footprint::Rect;
use crate::geometry::Vec3;
use crate::piece::{align, AlignOp, DropOutcome, PieceController, PieceParams, PieceStyle};
use crate::rubric::{Evaluation, EvaluationSnapshot, Rubric, ScoreController};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Stable handle to a piece owned by a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PieceKey(pub(crate) u32);

impl fmt::Display for PieceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Currently selected pieces plus the "active" one used as the alignment reference.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    current: Vec<PieceKey>,
    active: Option<PieceKey>,
}

impl Selection {
    pub fn select(&mut self, key: PieceKey, additive: bool) {
        if !additive {
            self.current.clear();
        }
        if !self.current.contains(&key) {
            self.current.push(key);
        }
        self.active = Some(key);
    }

    pub fn deselect(&mut self, key: PieceKey) {
        self.current.retain(|&k| k != key);
        if self.active == Some(key) {
            self.active = self.current.last().copied();
        }
    }

    pub fn clear(&mut self) {
        self.current.clear();
        self.active = None;
    }

    pub fn current(&self) -> &[PieceKey] {
        &self.current
    }

    pub fn active(&self) -> Option<PieceKey> {
        self.active
    }

    pub fn contains(&self, key: PieceKey) -> bool {
        self.current.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

/// Cells under a piece's candidate footprint, for drawing the drop preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub rect: Rect,
    pub cells: Vec<(i32, i32)>,
    pub occupied: Vec<(i32, i32)>,
    pub placeable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignReport {
    pub moved: Vec<PieceKey>,
    pub failed: Vec<PieceKey>,
    /// Selected but unplaced (or the reference itself).
    pub skipped: Vec<PieceKey>,
}

/// Owns the board, the pieces and the scoring services for one level.
#[derive(Debug)]
pub struct Scene {
    board: BoardGrid,
    pieces: BTreeMap<PieceKey, PieceController>,
    next_key: u32,
    selection: Selection,
    score: ScoreController,
    background: Option<Rgb>,
    motion: MotionConfig,
    // Last snapped flag seen per piece.
    snap_states: BTreeMap<PieceKey, bool>,
    deferred_eval: bool,
    dragging: Option<PieceKey>,
}

impl Scene {
    pub fn new(board: BoardGrid, rubric: Rubric, config: &Config) -> Self {
        Self {
            board,
            pieces: BTreeMap::new(),
            next_key: 1,
            selection: Selection::default(),
            score: ScoreController::new(rubric, config.score.clone()),
            background: None,
            motion: config.motion.clone(),
            snap_states: BTreeMap::new(),
            deferred_eval: false,
            dragging: None,
        }
    }

    pub fn board(&self) -> &BoardGrid {
        &self.board
    }

    pub fn score_controller(&self) -> &ScoreController {
        &self.score
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn background(&self) -> Option<Rgb> {
        self.background
    }

    pub fn set_background(&mut self, color: Option<Rgb>) {
        self.background = color;
        self.deferred_eval = true;
    }

    pub fn piece(&self, key: PieceKey) -> Option<&PieceController> {
        self.pieces.get(&key)
    }

    pub fn pieces(&self) -> impl Iterator<Item = &PieceController> {
        self.pieces.values()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn dragging(&self) -> Option<PieceKey> {
        self.dragging
    }

    /// True once no piece is animating.
    pub fn is_settled(&self) -> bool {
        self.pieces.values().all(|p| !p.is_moving())
    }

    fn piece_mut(&mut self, key: PieceKey) -> GbResult<&mut PieceController> {
        self.pieces
            .get_mut(&key)
            .ok_or(GridboardError::UnknownPiece(key))
    }

    fn ensure_known(&self, key: PieceKey) -> GbResult<()> {
        if self.pieces.contains_key(&key) {
            Ok(())
        } else {
            Err(GridboardError::UnknownPiece(key))
        }
    }

    // ----- lifecycle -----

    pub fn spawn(&mut self, params: PieceParams) -> PieceKey {
        let key = PieceKey(self.next_key);
        self.next_key += 1;
        let piece = PieceController::new(key, params, &self.motion);
        self.snap_states.insert(key, piece.is_snapped());
        self.pieces.insert(key, piece);
        debug!(%key, "Piece spawned");
        key
    }

    /// Takes a piece out of the scene, freeing its cells.
    pub fn remove(&mut self, key: PieceKey) -> GbResult<()> {
        let mut piece = self
            .pieces
            .remove(&key)
            .ok_or(GridboardError::UnknownPiece(key))?;
        piece.release_all(&mut self.board);
        self.selection.deselect(key);
        self.snap_states.remove(&key);
        if self.dragging == Some(key) {
            self.dragging = None;
        }
        debug!(%key, "Piece removed");
        self.state_changed();
        Ok(())
    }

    // ----- drag -----

    /// Returns `Ok(false)` when another piece is already being dragged.
    pub fn begin_drag(&mut self, key: PieceKey, pointer: Vec3) -> GbResult<bool> {
        self.ensure_known(key)?;
        if self.dragging.is_some_and(|k| k != key) {
            debug!(%key, "Drag refused, another piece is being dragged");
            return Ok(false);
        }
        let Some(piece) = self.pieces.get_mut(&key) else {
            return Err(GridboardError::UnknownPiece(key));
        };
        let started = piece.begin_drag(&mut self.board, pointer);
        if started {
            self.dragging = Some(key);
        }
        self.sync_snap_states();
        Ok(started)
    }

    pub fn drag_to(&mut self, key: PieceKey, pointer: Vec3) -> GbResult<Option<Rect>> {
        let Some(piece) = self.pieces.get_mut(&key) else {
            return Err(GridboardError::UnknownPiece(key));
        };
        Ok(piece.drag_to(&self.board, pointer))
    }

    /// Releases the drag. A discarded piece is removed from the scene.
    pub fn end_drag(&mut self, key: PieceKey) -> GbResult<DropOutcome> {
        let Some(piece) = self.pieces.get_mut(&key) else {
            return Err(GridboardError::UnknownPiece(key));
        };
        let outcome = piece.end_drag(&mut self.board);
        if self.dragging == Some(key) {
            self.dragging = None;
        }

        if outcome == DropOutcome::Discarded {
            self.remove(key)?;
        } else {
            self.sync_snap_states();
        }
        Ok(outcome)
    }

    /// Drop-preview data for a piece at its current position.
    pub fn highlight(&self, key: PieceKey) -> GbResult<Highlight> {
        let piece = self
            .pieces
            .get(&key)
            .ok_or(GridboardError::UnknownPiece(key))?;
        let rect = piece.candidate_rect(&self.board);
        let covered = self.board.collect_cells_clamped(&rect);
        Ok(Highlight {
            rect,
            cells: covered.iter().map(|c| c.pos()).collect(),
            occupied: covered
                .iter()
                .filter(|c| !c.is_empty())
                .map(|c| c.pos())
                .collect(),
            placeable: self.board.can_place(&rect),
        })
    }

    /// Every occupied cell, for the ruler overlay.
    pub fn ruler(&self) -> Vec<(i32, i32)> {
        self.board.occupied_cells().iter().map(|c| c.pos()).collect()
    }

    // ----- direct placement -----

    pub fn try_snap_to_rect(&mut self, key: PieceKey, rect: Rect, animate: bool) -> GbResult<bool> {
        let Some(piece) = self.pieces.get_mut(&key) else {
            return Err(GridboardError::UnknownPiece(key));
        };
        let ok = piece.try_snap_to_rect(&mut self.board, rect, animate);
        self.sync_snap_states();
        Ok(ok)
    }

    pub fn align(&mut self, key: PieceKey, op: AlignOp, animate: bool) -> GbResult<bool> {
        let Some(piece) = self.pieces.get_mut(&key) else {
            return Err(GridboardError::UnknownPiece(key));
        };
        let ok = piece.align(&mut self.board, op, animate);
        self.sync_snap_states();
        Ok(ok)
    }

    // ----- selection -----

    pub fn select(&mut self, key: PieceKey, additive: bool) -> GbResult<()> {
        self.ensure_known(key)?;
        self.selection.select(key, additive);
        Ok(())
    }

    pub fn deselect(&mut self, key: PieceKey) {
        self.selection.deselect(key);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// One selected piece aligns against the board; several align against the active one.
    pub fn align_selection(&mut self, op: AlignOp, animate: bool) -> AlignReport {
        let mut report = AlignReport::default();
        let selected: Vec<PieceKey> = self.selection.current().to_vec();

        if selected.len() <= 1 {
            for key in selected {
                let Some(piece) = self.pieces.get_mut(&key) else {
                    continue;
                };
                if !piece.is_snapped() {
                    debug!(%key, %op, "Align skipped, piece is not placed");
                    report.skipped.push(key);
                } else if piece.align(&mut self.board, op, animate) {
                    report.moved.push(key);
                } else {
                    debug!(%key, %op, "Align failed, target blocked or off the board");
                    report.failed.push(key);
                }
            }
            self.sync_snap_states();
            return report;
        }

        let Some(reference_key) = self.selection.active().or_else(|| selected.first().copied())
        else {
            return report;
        };
        let Some(reference) = self
            .pieces
            .get(&reference_key)
            .and_then(|p| p.current_rect())
        else {
            debug!(key = %reference_key, %op, "Align skipped, reference is not placed");
            report.skipped = selected;
            return report;
        };

        let (rows, cols) = (self.board.rows(), self.board.cols());
        for key in selected {
            if key == reference_key {
                report.skipped.push(key);
                continue;
            }
            let Some(piece) = self.pieces.get_mut(&key) else {
                continue;
            };
            let Some(current) = piece.current_rect() else {
                report.skipped.push(key);
                continue;
            };
            let target = align::reference_target(op, &current, &reference, rows, cols);
            if piece.try_snap_to_rect(&mut self.board, target, animate) {
                report.moved.push(key);
            } else {
                debug!(%key, %op, %target, "Align failed for one piece");
                report.failed.push(key);
            }
        }
        self.sync_snap_states();
        report
    }

    // ----- style and variants -----

    pub fn set_piece_style(&mut self, key: PieceKey, style: PieceStyle) -> GbResult<()> {
        self.piece_mut(key)?.style = style;
        self.deferred_eval = true;
        Ok(())
    }

    /// Switches a piece's footprint variant, re-snapping around the same center when placed.
    pub fn set_piece_variant(&mut self, key: PieceKey, index: usize) -> GbResult<bool> {
        let Some(piece) = self.pieces.get_mut(&key) else {
            return Err(GridboardError::UnknownPiece(key));
        };
        let ok = piece.set_variant(&mut self.board, index, true);
        self.deferred_eval = true;
        self.sync_snap_states();
        Ok(ok)
    }

    pub fn set_type_variant(&mut self, key: PieceKey, index: usize) -> GbResult<bool> {
        let piece = self.piece_mut(key)?;
        let Some(types) = piece.type_variants.as_mut() else {
            return Ok(false);
        };
        types.set_index(index);
        self.deferred_eval = true;
        Ok(true)
    }

    // ----- evaluation -----

    pub fn snapshot(&self) -> EvaluationSnapshot {
        EvaluationSnapshot::capture(&self.board, self.pieces.values(), self.background)
    }

    pub fn evaluate_now(&mut self) -> Evaluation {
        let snapshot = self.snapshot();
        let eval = self.score.evaluate(&snapshot);
        info!(
            score = eval.score,
            gates = eval.gates_passed,
            publish = %eval.publish,
            "Evaluated layout"
        );
        eval
    }

    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        self.score.last()
    }

    pub fn has_pending_evaluation(&self) -> bool {
        self.deferred_eval
    }

    /// Advances snap motion, then runs the end-of-tick evaluation if one is pending.
    pub fn tick(&mut self, dt: f32) -> Option<Evaluation> {
        for piece in self.pieces.values_mut() {
            piece.tick(dt);
        }
        if std::mem::take(&mut self.deferred_eval) {
            return Some(self.evaluate_now());
        }
        None
    }

    /// Jumps every running motion to its end.
    pub fn settle(&mut self) {
        for piece in self.pieces.values_mut() {
            piece.finish_motion();
        }
    }

    fn sync_snap_states(&mut self) {
        let mut changed = false;
        for (key, piece) in &self.pieces {
            let now = piece.is_snapped();
            let prev = self.snap_states.insert(*key, now);
            if prev != Some(now) {
                changed = true;
            }
        }
        if changed {
            self.state_changed();
        }
    }

    // Immediate pass for responsiveness, another at the end of the tick once removals settle.
    fn state_changed(&mut self) {
        self.evaluate_now();
        self.deferred_eval = true;
    }
}
