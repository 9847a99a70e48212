pub mod align;
pub mod anchor;
pub mod style;
pub mod tween;
pub mod variant;

pub use align::AlignOp;
pub use anchor::{footprint_from_fractional, FootprintOffset, PivotAnchor};
pub use style::{PieceStyle, TextStyle};
pub use tween::SnapTween;
pub use variant::{PieceVariantDef, PieceVariantSet, TypeVariantSet, VariantIdentity};

use crate::board::BoardGrid;
use crate::config::MotionConfig;
use crate::footprint::Rect;
use crate::geometry::{Aabb, Vec3};
use crate::scene::PieceKey;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

/// Tag the rubric uses to find a piece.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PieceId {
    Title,
    Tagline,
    Date,
    Asset1,
    Asset2,
    Asset3,
    Asset4,
}

/// Result of releasing a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Committed to `rect`; the piece now occupies its cells.
    Snapped(Rect),
    /// Returned to where the drag started (re-occupying its old cells if it had any).
    Reverted,
    /// Dropped off the board after having been placed: the owner should remove it.
    Discarded,
    /// `end_drag` without a matching `begin_drag`.
    NotDragging,
}

impl DropOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, DropOutcome::Snapped(_))
    }
}

fn one() -> i32 {
    1
}

fn yes() -> bool {
    true
}

/// Everything needed to spawn a piece. Built in code or read from a level file.
#[derive(Debug, Clone, TypedBuilder, Serialize, Deserialize)]
pub struct PieceParams {
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub id: Option<PieceId>,
    #[builder(default = 1)]
    #[serde(default = "one")]
    pub size_rows: i32,
    #[builder(default = 1)]
    #[serde(default = "one")]
    pub size_cols: i32,
    #[builder(default)]
    #[serde(default)]
    pub pivot: PivotAnchor,
    #[builder(default)]
    #[serde(default)]
    pub offset: FootprintOffset,
    #[builder(default)]
    #[serde(default)]
    pub position: Vec3,
    #[builder(default)]
    #[serde(default)]
    pub style: PieceStyle,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub variants: Option<PieceVariantSet>,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub type_variants: Option<TypeVariantSet>,
    #[builder(default = true)]
    #[serde(default = "yes")]
    pub active: bool,
}

#[derive(Debug, Clone)]
struct DragState {
    start_pos: Vec3,
    grab_offset: Vec3,
    prev_occupied: Vec<(i32, i32)>,
    was_snapped: bool,
}

/// One piece's placement state: footprint, occupied cells, drag and snap motion.
///
/// The board is passed in explicitly; a piece only ever adds or removes itself.
#[derive(Debug, Clone)]
pub struct PieceController {
    key: PieceKey,
    pub id: Option<PieceId>,
    pub size_rows: i32,
    pub size_cols: i32,
    pub pivot: PivotAnchor,
    pub offset: FootprintOffset,
    pub style: PieceStyle,
    pub variants: Option<PieceVariantSet>,
    pub type_variants: Option<TypeVariantSet>,
    pub active: bool,
    position: Vec3,
    occupied: Vec<(i32, i32)>,
    drag: Option<DragState>,
    tween: Option<SnapTween>,
    motion: MotionConfig,
}

impl PieceController {
    pub fn new(key: PieceKey, params: PieceParams, motion: &MotionConfig) -> Self {
        let mut piece = Self {
            key,
            id: params.id,
            size_rows: params.size_rows.max(1),
            size_cols: params.size_cols.max(1),
            pivot: params.pivot,
            offset: params.offset,
            style: params.style,
            variants: params.variants,
            type_variants: params.type_variants,
            active: params.active,
            position: params.position,
            occupied: Vec::new(),
            drag: None,
            tween: None,
            motion: motion.clone(),
        };
        // The selected variant owns the footprint from the start.
        if let Some(def) = piece.variants.as_ref().and_then(|v| v.current()).cloned() {
            piece.adopt_footprint(def.size_rows, def.size_cols, def.pivot, def.offset);
        }
        piece
    }

    pub fn key(&self) -> PieceKey {
        self.key
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Teleports the anchor and cancels any motion. Occupancy is untouched.
    pub fn set_position(&mut self, p: Vec3) {
        self.tween = None;
        self.position = p;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_moving(&self) -> bool {
        self.tween.is_some()
    }

    pub fn tween(&self) -> Option<&SnapTween> {
        self.tween.as_ref()
    }

    pub fn is_snapped(&self) -> bool {
        !self.occupied.is_empty()
    }

    pub fn occupied_cells(&self) -> &[(i32, i32)] {
        &self.occupied
    }

    /// Bounding rect of the claimed cells; `None` while unplaced.
    pub fn current_rect(&self) -> Option<Rect> {
        let (&(r, c), rest) = self.occupied.split_first()?;
        let mut rect = Rect::cell(r, c);
        for &(r, c) in rest {
            rect.r0 = rect.r0.min(r);
            rect.r1 = rect.r1.max(r);
            rect.c0 = rect.c0.min(c);
            rect.c1 = rect.c1.max(c);
        }
        Some(rect)
    }

    /// Footprint the piece would take if dropped where it is now.
    pub fn candidate_rect(&self, board: &BoardGrid) -> Rect {
        let (fr, fc) = board.fractional_index(self.position);
        footprint_from_fractional(fr, fc, self.size_rows, self.size_cols, self.pivot, self.offset)
    }

    /// World box spanned by the declared footprint around the anchor.
    pub fn world_aabb(&self, board: &BoardGrid) -> Aabb {
        let (px, py) = board.cell_pitch();
        Aabb::from_center(
            self.position,
            self.size_cols as f32 * px * 0.5,
            self.size_rows as f32 * py * 0.5,
        )
    }

    // ----- drag lifecycle -----

    /// Grabs the piece at `pointer`. Claimed cells are released for the duration of the drag.
    pub fn begin_drag(&mut self, board: &mut BoardGrid, pointer: Vec3) -> bool {
        if self.drag.is_some() {
            return false;
        }
        self.tween = None;

        let prev = std::mem::take(&mut self.occupied);
        board.release(&prev, self.key);

        self.drag = Some(DragState {
            start_pos: self.position,
            grab_offset: self.position - pointer,
            was_snapped: !prev.is_empty(),
            prev_occupied: prev,
        });
        true
    }

    /// Follows the pointer and returns the candidate rect for highlighting.
    pub fn drag_to(&mut self, board: &BoardGrid, pointer: Vec3) -> Option<Rect> {
        let drag = self.drag.as_ref()?;
        self.position = pointer + drag.grab_offset;
        Some(self.candidate_rect(board))
    }

    /// Decides between commit, revert and discard.
    pub fn end_drag(&mut self, board: &mut BoardGrid) -> DropOutcome {
        let Some(drag) = self.drag.take() else {
            return DropOutcome::NotDragging;
        };

        let rect = self.candidate_rect(board);

        if self.is_totally_outside(board, &rect) {
            if drag.was_snapped {
                debug!(key = %self.key, %rect, "Dropped off the board, discarding");
                return DropOutcome::Discarded;
            }
            debug!(key = %self.key, %rect, "Dropped off the board, returning");
            self.start_tween(drag.start_pos);
            return DropOutcome::Reverted;
        }

        if !board.can_place(&rect) {
            debug!(key = %self.key, %rect, "Invalid placement, returning");
            self.start_tween(drag.start_pos);
            if drag.was_snapped {
                self.reoccupy(board, drag.prev_occupied);
            }
            return DropOutcome::Reverted;
        }

        let target = self.snap_target(board, &rect);
        self.start_tween(target);
        self.occupy(board, &rect);
        debug!(key = %self.key, %rect, "Snapped");
        DropOutcome::Snapped(rect)
    }

    fn is_totally_outside(&self, board: &BoardGrid, rect: &Rect) -> bool {
        match board.board_area() {
            Some(area) => {
                let shrunk = area.shrink(self.motion.outside_shrink);
                !self.world_aabb(board).overlaps(&shrunk)
            }
            None => !board.rect_overlaps_board(rect),
        }
    }

    fn reoccupy(&mut self, board: &mut BoardGrid, prev: Vec<(i32, i32)>) {
        let cells: Vec<_> = prev
            .iter()
            .filter_map(|&(r, c)| board.try_get_cell(r, c))
            .collect();
        if cells.len() != prev.len() || !board.are_all_available(&cells) {
            warn!(key = %self.key, "Original cells were taken during the drag, staying unplaced");
            return;
        }
        board.claim(&prev, self.key);
        self.occupied = prev;
    }

    // ----- direct placement -----

    /// Places the piece on `rect` if it is inside the board and every cell has room
    /// (cells this piece already holds count as room). Otherwise nothing changes.
    pub fn try_snap_to_rect(&mut self, board: &mut BoardGrid, rect: Rect, animate: bool) -> bool {
        if self.drag.is_some() || !board.is_rect_inside(&rect) {
            return false;
        }
        let cells = board.collect_cells_clamped(&rect);
        let room = !cells.is_empty()
            && cells.len() as i32 == rect.area()
            && cells.iter().all(|c| !c.is_full() || c.holds(self.key));
        if !room {
            return false;
        }

        let old = std::mem::take(&mut self.occupied);
        board.release(&old, self.key);

        let target = self.snap_target(board, &rect);
        if animate {
            self.start_tween(target);
        } else {
            self.set_position(target);
        }
        self.occupy(board, &rect);
        true
    }

    pub fn align(&mut self, board: &mut BoardGrid, op: AlignOp, animate: bool) -> bool {
        let Some(current) = self.current_rect() else {
            return false;
        };
        let target = align::board_target(
            op,
            &current,
            self.size_rows,
            self.size_cols,
            board.rows(),
            board.cols(),
        );
        self.try_snap_to_rect(board, target, animate)
    }

    pub fn align_left(&mut self, board: &mut BoardGrid, animate: bool) -> bool {
        self.align(board, AlignOp::Left, animate)
    }

    pub fn align_right(&mut self, board: &mut BoardGrid, animate: bool) -> bool {
        self.align(board, AlignOp::Right, animate)
    }

    pub fn align_top(&mut self, board: &mut BoardGrid, animate: bool) -> bool {
        self.align(board, AlignOp::Top, animate)
    }

    pub fn align_bottom(&mut self, board: &mut BoardGrid, animate: bool) -> bool {
        self.align(board, AlignOp::Bottom, animate)
    }

    pub fn align_horizontal_center(&mut self, board: &mut BoardGrid, animate: bool) -> bool {
        self.align(board, AlignOp::HorizontalCenter, animate)
    }

    pub fn align_vertical_center(&mut self, board: &mut BoardGrid, animate: bool) -> bool {
        self.align(board, AlignOp::VerticalCenter, animate)
    }

    // ----- variants -----

    /// Switches footprint variant. When `keep_snap` is set and the piece is placed,
    /// it tries to re-snap around the same center; a failed re-snap leaves it where it was.
    pub fn set_variant(&mut self, board: &mut BoardGrid, index: usize, keep_snap: bool) -> bool {
        let Some(def) = self.variants.as_mut().and_then(|v| v.select(index)).cloned() else {
            return false;
        };
        self.adopt_footprint(def.size_rows, def.size_cols, def.pivot, def.offset);

        if keep_snap {
            if let Some(current) = self.current_rect() {
                let rect = variant::recentered_rect(&current, self.size_rows, self.size_cols);
                if !self.try_snap_to_rect(board, rect, true) {
                    debug!(key = %self.key, variant = %def.id, "Re-snap after variant change failed");
                }
            }
        }
        true
    }

    pub fn set_variant_by_id(&mut self, board: &mut BoardGrid, id: &str, keep_snap: bool) -> bool {
        match self.variants.as_ref().and_then(|v| v.index_of(id)) {
            Some(idx) => self.set_variant(board, idx, keep_snap),
            None => false,
        }
    }

    fn adopt_footprint(&mut self, rows: i32, cols: i32, pivot: PivotAnchor, offset: FootprintOffset) {
        self.size_rows = rows.max(1);
        self.size_cols = cols.max(1);
        self.pivot = pivot;
        self.offset = offset;
    }

    // ----- motion -----

    /// Advances the snap motion by `dt` seconds. Returns true while still moving.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(tween) = self.tween.as_mut() else {
            return false;
        };
        self.position = tween.advance(dt);
        if tween.is_finished() {
            self.tween = None;
            return false;
        }
        true
    }

    /// Jumps to the end of any running motion.
    pub fn finish_motion(&mut self) {
        if let Some(mut tween) = self.tween.take() {
            self.position = tween.finish();
        }
    }

    /// Drops every claim and any in-flight drag or motion. Used when the piece leaves the scene.
    pub fn release_all(&mut self, board: &mut BoardGrid) {
        let old = std::mem::take(&mut self.occupied);
        board.release(&old, self.key);
        self.drag = None;
        self.tween = None;
    }

    fn start_tween(&mut self, target: Vec3) {
        self.tween = Some(SnapTween::new(
            self.position,
            target,
            self.motion.snap_duration,
        ));
    }

    fn snap_target(&self, board: &BoardGrid, rect: &Rect) -> Vec3 {
        let p = board.world_pos_for_rect(rect);
        Vec3::new(p.x, p.y, self.position.z)
    }

    fn occupy(&mut self, board: &mut BoardGrid, rect: &Rect) {
        let positions = board.clamped_positions(rect);
        board.claim(&positions, self.key);
        self.occupied = positions;
    }
}
