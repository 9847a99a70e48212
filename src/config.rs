use crate::error::{GbResult, GridboardError};
use crate::geometry::{BoardTransform, Vec3};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Upper bound on `rows * cols` for a single board.
pub const MAX_BOARD_CELLS: i32 = 1 << 20;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub board: BoardConfig,
    #[command(flatten)]
    pub motion: MotionConfig,
    #[command(flatten)]
    pub score: ScoreConfig,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    #[arg(long, default_value_t = 4)]
    pub rows: i32,
    #[arg(long, default_value_t = 4)]
    pub cols: i32,

    // Space between cells, in board-local units. Also drives the fallback calibration.
    #[arg(long, default_value_t = 0.1)]
    pub gutter: f32,

    // 0.0 = size the board so every cell is exactly one unit wide/high
    #[arg(long, default_value_t = 0.0)]
    pub board_width: f32,
    #[arg(long, default_value_t = 0.0)]
    pub board_height: f32,

    #[arg(long, default_value_t = 1)]
    pub cell_capacity: usize,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub origin_x: f32,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub origin_y: f32,
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    // Use the board rectangle as the authoritative "is the piece off the board" area
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub use_board_area: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            gutter: 0.1,
            board_width: 0.0,
            board_height: 0.0,
            cell_capacity: 1,
            origin_x: 0.0,
            origin_y: 0.0,
            scale: 1.0,
            use_board_area: true,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    // Seconds a snap/return tween takes
    #[arg(long, default_value_t = 0.08)]
    pub snap_duration: f32,

    // Board area is shrunk by this much (world units) before the "totally outside" test
    #[arg(long, default_value_t = 0.02)]
    pub outside_shrink: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            snap_duration: 0.08,
            outside_shrink: 0.02,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    #[arg(long, default_value_t = 0.33)]
    pub one_star_min: f32,
    #[arg(long, default_value_t = 0.66)]
    pub two_star_min: f32,
    #[arg(long, default_value_t = 0.90)]
    pub three_star_min: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            one_star_min: 0.33,
            two_star_min: 0.66,
            three_star_min: 0.90,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> GbResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.board.validate()?;
        Ok(config)
    }

    /// Applies only the values the user typed on the command line, leaving file values alone.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        self.board.merge_from_cli(&cli.board, matches);
        self.motion.merge_from_cli(&cli.motion, matches);
        self.score.merge_from_cli(&cli.score, matches);
    }
}

macro_rules! update_if_present {
    ($self:ident, $cli:ident, $matches:ident, $field:ident) => {
        if $matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
            $self.$field = $cli.$field.clone();
        }
    };
}

impl BoardConfig {
    pub fn validate(&self) -> GbResult<()> {
        if self.rows < 1 || self.cols < 1 {
            return Err(GridboardError::Config(format!(
                "Board must have at least one row and column (got {}x{})",
                self.rows, self.cols
            )));
        }
        match self.rows.checked_mul(self.cols) {
            Some(n) if n <= MAX_BOARD_CELLS => {}
            _ => {
                return Err(GridboardError::Config(format!(
                    "Board is too large: {}x{} exceeds {} cells",
                    self.rows, self.cols, MAX_BOARD_CELLS
                )))
            }
        }
        if !(self.scale > 0.0) {
            return Err(GridboardError::Config(format!(
                "Board scale must be positive (got {})",
                self.scale
            )));
        }
        if self.gutter < 0.0 {
            return Err(GridboardError::Config(format!(
                "Gutter cannot be negative (got {})",
                self.gutter
            )));
        }
        Ok(())
    }

    pub fn transform(&self) -> BoardTransform {
        BoardTransform {
            origin: Vec3::xy(self.origin_x, self.origin_y),
            scale: self.scale,
        }
    }

    /// Local board size, honoring the "fit unit cells" default.
    pub fn local_size(&self) -> (f32, f32) {
        let fit_w = self.cols as f32 + (self.cols - 1).max(0) as f32 * self.gutter;
        let fit_h = self.rows as f32 + (self.rows - 1).max(0) as f32 * self.gutter;
        let w = if self.board_width > 0.0 {
            self.board_width
        } else {
            fit_w
        };
        let h = if self.board_height > 0.0 {
            self.board_height
        } else {
            fit_h
        };
        (w, h)
    }

    pub fn merge_from_cli(&mut self, cli: &BoardConfig, matches: &ArgMatches) {
        update_if_present!(self, cli, matches, rows);
        update_if_present!(self, cli, matches, cols);
        update_if_present!(self, cli, matches, gutter);
        update_if_present!(self, cli, matches, board_width);
        update_if_present!(self, cli, matches, board_height);
        update_if_present!(self, cli, matches, cell_capacity);
        update_if_present!(self, cli, matches, origin_x);
        update_if_present!(self, cli, matches, origin_y);
        update_if_present!(self, cli, matches, scale);
        update_if_present!(self, cli, matches, use_board_area);
    }
}

impl MotionConfig {
    pub fn merge_from_cli(&mut self, cli: &MotionConfig, matches: &ArgMatches) {
        update_if_present!(self, cli, matches, snap_duration);
        update_if_present!(self, cli, matches, outside_shrink);
    }
}

impl ScoreConfig {
    pub fn merge_from_cli(&mut self, cli: &ScoreConfig, matches: &ArgMatches) {
        update_if_present!(self, cli, matches, one_star_min);
        update_if_present!(self, cli, matches, two_star_min);
        update_if_present!(self, cli, matches, three_star_min);
    }
}
