pub mod rules;
pub mod score;
pub mod snapshot;

pub use rules::{Rule, RuleKind, RuleResult};
pub use score::{Evaluation, RuleReport, ScoreController, StarRating};
pub use snapshot::{EvaluationSnapshot, PieceInfo, ResolvedStyle};

use crate::error::{GbResult, GridboardError};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PublishMode {
    CompletionOnly,
    QualityThreshold,
    #[default]
    Hybrid,
}

/// What the share/publish affordance should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PublishState {
    /// Not publishable.
    Locked,
    /// Publishable, but below the quality threshold.
    Warning,
    /// Publishable.
    Ready,
}

impl PublishState {
    pub fn is_publishable(&self) -> bool {
        !matches!(self, PublishState::Locked)
    }
}

impl PublishMode {
    pub fn decide(&self, gates_passed: bool, score: f32, threshold: f32) -> PublishState {
        match self {
            PublishMode::CompletionOnly => {
                if gates_passed {
                    PublishState::Ready
                } else {
                    PublishState::Locked
                }
            }
            PublishMode::QualityThreshold => {
                if gates_passed && score >= threshold {
                    PublishState::Ready
                } else {
                    PublishState::Locked
                }
            }
            PublishMode::Hybrid => {
                if !gates_passed {
                    PublishState::Locked
                } else if score >= threshold {
                    PublishState::Ready
                } else {
                    PublishState::Warning
                }
            }
        }
    }
}

fn default_threshold() -> f32 {
    0.75
}

/// Ordered rules plus the publish policy for a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    #[serde(default)]
    pub mode: PublishMode,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Default for Rubric {
    fn default() -> Self {
        Self {
            mode: PublishMode::Hybrid,
            threshold: default_threshold(),
            rules: Vec::new(),
        }
    }
}

impl Rubric {
    pub fn new(mode: PublishMode, threshold: f32, rules: Vec<Rule>) -> Self {
        Self {
            mode,
            threshold,
            rules,
        }
    }

    pub fn validate(&self) -> GbResult<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(GridboardError::Config(format!(
                "Publish threshold must be within [0, 1] (got {})",
                self.threshold
            )));
        }
        Ok(())
    }

    /// `Σ clamp01(score)·w / Σ w`, 0 when the total weight is 0.
    pub fn aggregate<I>(weighted: I) -> f32
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let (sum, wsum) = weighted
            .into_iter()
            .fold((0.0f32, 0.0f32), |(sum, wsum), (score, weight)| {
                let w = weight.max(0.0);
                (sum + score.clamp(0.0, 1.0) * w, wsum + w)
            });
        if wsum > 0.0 {
            sum / wsum
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hybrid_has_three_states() {
        let m = PublishMode::Hybrid;
        assert_eq!(m.decide(false, 1.0, 0.75), PublishState::Locked);
        assert_eq!(m.decide(true, 0.5, 0.75), PublishState::Warning);
        assert_eq!(m.decide(true, 0.75, 0.75), PublishState::Ready);
    }

    #[test]
    fn zero_weight_aggregate_is_zero() {
        assert_eq!(Rubric::aggregate([(1.0, 0.0), (0.5, -3.0)]), 0.0);
        assert_eq!(Rubric::aggregate([(2.0, 1.0), (0.0, 1.0)]), 0.5);
    }
}
