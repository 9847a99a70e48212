use super::snapshot::EvaluationSnapshot;
use super::{PublishState, Rubric, RuleResult};
use crate::config::ScoreConfig;
use serde::Serialize;
use strum_macros::Display;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StarRating {
    Zero,
    One,
    Two,
    Three,
}

impl StarRating {
    pub fn count(&self) -> u8 {
        match self {
            StarRating::Zero => 0,
            StarRating::One => 1,
            StarRating::Two => 2,
            StarRating::Three => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleReport {
    pub index: usize,
    pub kind: &'static str,
    pub hard_gate: bool,
    pub weight: f32,
    pub result: RuleResult,
}

/// Outcome of one rubric pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub piece_count: usize,
    pub gates_passed: bool,
    pub score: f32,
    pub publish: PublishState,
    pub stars: StarRating,
    pub rules: Vec<RuleReport>,
}

impl Evaluation {
    /// Forced failure used when nothing is on the board.
    fn empty_board() -> Self {
        Self {
            piece_count: 0,
            gates_passed: false,
            score: 0.0,
            publish: PublishState::Locked,
            stars: StarRating::Zero,
            rules: Vec::new(),
        }
    }

    pub fn is_publishable(&self) -> bool {
        self.publish.is_publishable()
    }
}

/// Runs the rubric over snapshots and remembers the latest result.
#[derive(Debug, Clone)]
pub struct ScoreController {
    rubric: Rubric,
    stars: ScoreConfig,
    last: Option<Evaluation>,
    runs: u64,
}

impl ScoreController {
    pub fn new(rubric: Rubric, stars: ScoreConfig) -> Self {
        Self {
            rubric,
            stars,
            last: None,
            runs: 0,
        }
    }

    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    pub fn last(&self) -> Option<&Evaluation> {
        self.last.as_ref()
    }

    /// Number of evaluations performed so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn star_rating(&self, gates_passed: bool, score: f32) -> StarRating {
        if !gates_passed {
            return StarRating::Zero;
        }
        if score >= self.stars.three_star_min {
            StarRating::Three
        } else if score >= self.stars.two_star_min {
            StarRating::Two
        } else if score >= self.stars.one_star_min {
            StarRating::One
        } else {
            StarRating::Zero
        }
    }

    /// Every rule runs, even after a gate has failed, so feedback stays complete.
    pub fn evaluate(&mut self, snapshot: &EvaluationSnapshot) -> Evaluation {
        self.runs += 1;

        if snapshot.is_empty() {
            debug!("Empty board, publishing locked");
            let eval = Evaluation::empty_board();
            self.last = Some(eval.clone());
            return eval;
        }

        let mut gates_passed = true;
        let mut reports = Vec::with_capacity(self.rubric.rules.len());

        for (index, rule) in self.rubric.rules.iter().enumerate() {
            let result = rule.evaluate(snapshot);
            let hard_gate = rule.is_hard_gate();
            if hard_gate && !result.pass {
                gates_passed = false;
            }
            debug!(
                index,
                kind = rule.kind.name(),
                pass = result.pass,
                score = result.score,
                reason = %result.reason,
                "Rule evaluated"
            );
            reports.push(RuleReport {
                index,
                kind: rule.kind.name(),
                hard_gate,
                weight: rule.effective_weight(),
                result,
            });
        }

        let score = Rubric::aggregate(reports.iter().map(|r| (r.result.score, r.weight)));
        let publish = self
            .rubric
            .mode
            .decide(gates_passed, score, self.rubric.threshold);

        let eval = Evaluation {
            piece_count: snapshot.len(),
            gates_passed,
            score,
            publish,
            stars: self.star_rating(gates_passed, score),
            rules: reports,
        };
        self.last = Some(eval.clone());
        eval
    }
}
