use super::anchor::{FootprintOffset, PivotAnchor};
use crate::error::{GbResult, GridboardError};
use crate::footprint::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// Anything that can report which variant is currently selected.
pub trait VariantIdentity {
    /// Position of the current variant in its list.
    fn variant_index(&self) -> Option<i32>;
    fn variant_name(&self) -> Option<&str>;
}

fn one() -> i32 {
    1
}

/// Footprint alternative for a piece (a different sprite in the game).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceVariantDef {
    pub id: String,
    #[serde(default = "one")]
    pub size_rows: i32,
    #[serde(default = "one")]
    pub size_cols: i32,
    #[serde(default)]
    pub pivot: PivotAnchor,
    #[serde(default)]
    pub offset: FootprintOffset,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieceVariantSet {
    pub variants: Vec<PieceVariantDef>,
    #[serde(default)]
    current: usize,
}

impl PieceVariantSet {
    pub fn new(variants: Vec<PieceVariantDef>) -> Self {
        Self {
            variants,
            current: 0,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&PieceVariantDef> {
        self.variants.get(self.current)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        if id.is_empty() {
            return None;
        }
        self.variants.iter().position(|v| v.id == id)
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    /// Selects by index (clamped into range). `None` when there are no variants.
    pub(crate) fn select(&mut self, index: usize) -> Option<&PieceVariantDef> {
        if self.variants.is_empty() {
            return None;
        }
        self.current = index.min(self.variants.len() - 1);
        self.variants.get(self.current)
    }

    /// Ids must be unique. Blank ids are tolerated with a warning.
    pub fn validate(&self) -> GbResult<()> {
        let mut seen = HashSet::new();
        for (i, v) in self.variants.iter().enumerate() {
            if v.id.trim().is_empty() {
                warn!(index = i, "Piece variant has no id");
            } else if !seen.insert(v.id.as_str()) {
                return Err(GridboardError::Validation(format!(
                    "Duplicate piece variant id '{}' at #{}",
                    v.id, i
                )));
            }
            if v.size_rows < 1 || v.size_cols < 1 {
                return Err(GridboardError::Validation(format!(
                    "Piece variant '{}' has an empty footprint ({}x{})",
                    v.id, v.size_rows, v.size_cols
                )));
            }
        }
        Ok(())
    }
}

impl VariantIdentity for PieceVariantSet {
    fn variant_index(&self) -> Option<i32> {
        self.current().map(|_| self.current as i32)
    }

    fn variant_name(&self) -> Option<&str> {
        self.current().map(|v| v.id.as_str())
    }
}

/// Font alternatives for a text piece. Only the identity matters to scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeVariantSet {
    pub ids: Vec<String>,
    #[serde(default)]
    current: usize,
}

impl TypeVariantSet {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids, current: 0 }
    }

    pub fn has_id(&self, id: &str) -> bool {
        !id.is_empty() && self.ids.iter().any(|i| i == id)
    }

    pub fn set_index(&mut self, index: usize) {
        if self.ids.is_empty() {
            return;
        }
        self.current = index.min(self.ids.len() - 1);
    }

    pub fn try_set_by_id(&mut self, id: &str) -> bool {
        match self.ids.iter().position(|i| !id.is_empty() && i == id) {
            Some(idx) => {
                self.current = idx;
                true
            }
            None => false,
        }
    }
}

impl VariantIdentity for TypeVariantSet {
    fn variant_index(&self) -> Option<i32> {
        self.ids.get(self.current).map(|_| self.current as i32)
    }

    fn variant_name(&self) -> Option<&str> {
        self.ids.get(self.current).map(String::as_str)
    }
}

/// Rect of a new footprint size that keeps the center of `current`.
pub fn recentered_rect(current: &Rect, size_rows: i32, size_cols: i32) -> Rect {
    let center_r = (current.r0 + current.r1) as f32 * 0.5;
    let center_c = (current.c0 + current.c1) as f32 * 0.5;
    let r0 = (center_r - (size_rows - 1) as f32 * 0.5).round_ties_even() as i32;
    let c0 = (center_c - (size_cols - 1) as f32 * 0.5).round_ties_even() as i32;
    Rect::new(r0, c0, r0 + size_rows - 1, c0 + size_cols - 1)
}
