use crate::board::BoardGrid;
use crate::color::Rgb;
use crate::footprint::Rect;
use crate::piece::{PieceController, PieceId, TextStyle, VariantIdentity};
use crate::scene::PieceKey;
use std::collections::BTreeMap;

/// Style data read off a piece at snapshot time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyle {
    pub color: Option<Rgb>,
    pub text: Option<TextStyle>,
    pub piece_variant: Option<i32>,
    pub type_variant: Option<i32>,
}

impl ResolvedStyle {
    pub fn of(piece: &PieceController) -> Self {
        Self {
            color: piece.style.color,
            text: piece.style.text,
            piece_variant: piece.variants.as_ref().and_then(|v| v.variant_index()),
            type_variant: piece.type_variants.as_ref().and_then(|v| v.variant_index()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieceInfo {
    pub id: PieceId,
    pub key: Option<PieceKey>,
    pub snapped: bool,
    pub rect: Option<Rect>,
    pub style: ResolvedStyle,
}

impl PieceInfo {
    /// Rect of a placed piece, `None` otherwise.
    pub fn placed_rect(&self) -> Option<Rect> {
        if self.snapped {
            self.rect
        } else {
            None
        }
    }
}

/// Read-only view of the board handed to the rules. Owns all of its data.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSnapshot {
    rows: i32,
    cols: i32,
    pieces: BTreeMap<PieceId, PieceInfo>,
    background: Option<Rgb>,
}

impl EvaluationSnapshot {
    pub fn new(rows: i32, cols: i32, background: Option<Rgb>) -> Self {
        Self {
            rows,
            cols,
            pieces: BTreeMap::new(),
            background,
        }
    }

    /// Collects active, tagged pieces. A later piece with the same id replaces an earlier one.
    pub fn capture<'a, I>(board: &BoardGrid, pieces: I, background: Option<Rgb>) -> Self
    where
        I: IntoIterator<Item = &'a PieceController>,
    {
        let mut snap = Self::new(board.rows(), board.cols(), background);
        for piece in pieces {
            if !piece.active {
                continue;
            }
            let Some(id) = piece.id else {
                continue;
            };
            let rect = piece.current_rect();
            snap.insert(PieceInfo {
                id,
                key: Some(piece.key()),
                snapped: piece.is_snapped(),
                rect,
                style: ResolvedStyle::of(piece),
            });
        }
        snap
    }

    pub fn insert(&mut self, info: PieceInfo) {
        self.pieces.insert(info.id, info);
    }

    /// Convenience for building snapshots by hand: `Some(rect)` = placed.
    pub fn with_piece(mut self, id: PieceId, rect: Option<Rect>) -> Self {
        self.insert(PieceInfo {
            id,
            key: None,
            snapped: rect.is_some(),
            rect,
            style: ResolvedStyle::default(),
        });
        self
    }

    pub fn with_style(mut self, id: PieceId, style: ResolvedStyle) -> Self {
        if let Some(info) = self.pieces.get_mut(&id) {
            info.style = style;
        }
        self
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn background(&self) -> Option<Rgb> {
        self.background
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn get(&self, id: PieceId) -> Option<&PieceInfo> {
        self.pieces.get(&id)
    }

    pub fn placed_rect(&self, id: PieceId) -> Option<Rect> {
        self.get(id).and_then(PieceInfo::placed_rect)
    }

    pub fn pieces(&self) -> impl Iterator<Item = &PieceInfo> {
        self.pieces.values()
    }
}
