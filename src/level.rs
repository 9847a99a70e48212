use crate::board::BoardGrid;
use crate::color::Rgb;
use crate::config::Config;
use crate::error::{GbResult, GridboardError};
use crate::footprint::Rect;
use crate::piece::PieceParams;
use crate::rubric::Rubric;
use crate::scene::{PieceKey, Scene};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// A piece as listed in a level file, optionally pre-placed on a rect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelPiece {
    #[serde(flatten)]
    pub params: PieceParams,
    #[serde(default)]
    pub place: Option<Rect>,
}

/// Level definition: board settings, starting pieces, rubric and background.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub name: String,
    pub config: Config,
    pub pieces: Vec<LevelPiece>,
    pub rubric: Rubric,
    pub background: Option<Rgb>,
}

impl LevelConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> GbResult<Self> {
        let content = fs::read_to_string(path)?;
        let level: LevelConfig = serde_json::from_str(&content)?;
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> GbResult<()> {
        self.config.board.validate()?;
        self.rubric.validate()?;
        for (i, p) in self.pieces.iter().enumerate() {
            if p.params.size_rows < 1 || p.params.size_cols < 1 {
                return Err(GridboardError::Validation(format!(
                    "Piece #{} has an empty footprint ({}x{})",
                    i, p.params.size_rows, p.params.size_cols
                )));
            }
            if let Some(v) = &p.params.variants {
                v.validate()?;
            }
        }
        Ok(())
    }

    /// Generates the board, spawns every piece and applies the starting placements.
    pub fn build_scene(&self) -> GbResult<(Scene, Vec<PieceKey>)> {
        let board = BoardGrid::generate(&self.config.board)?;
        let mut scene = Scene::new(board, self.rubric.clone(), &self.config);
        scene.set_background(self.background);

        let mut keys = Vec::with_capacity(self.pieces.len());
        for (i, p) in self.pieces.iter().enumerate() {
            let key = scene.spawn(p.params.clone());
            if let Some(rect) = p.place {
                if !scene.try_snap_to_rect(key, rect, false)? {
                    return Err(GridboardError::Validation(format!(
                        "Piece #{} cannot start on {}: out of bounds or occupied",
                        i, rect
                    )));
                }
            }
            keys.push(key);
        }

        info!(
            level = %self.name,
            rows = scene.board().rows(),
            cols = scene.board().cols(),
            pieces = keys.len(),
            "Level loaded"
        );
        Ok((scene, keys))
    }
}
