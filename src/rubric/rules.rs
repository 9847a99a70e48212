use super::snapshot::{EvaluationSnapshot, PieceInfo};
use crate::color::Rgb;
use crate::footprint::{self, clamp01, Rect};
use crate::piece::PieceId;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleResult {
    pub pass: bool,
    pub score: f32,
    pub reason: String,
}

impl RuleResult {
    pub fn pass(score: f32, reason: impl Into<String>) -> Self {
        Self {
            pass: true,
            score,
            reason: reason.into(),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self::scored_fail(0.0, reason)
    }

    pub fn scored_fail(score: f32, reason: impl Into<String>) -> Self {
        Self {
            pass: false,
            score,
            reason: reason.into(),
        }
    }

    fn check(ok: bool, pass_score: f32, fail_score: f32, reason: impl Into<String>) -> Self {
        Self {
            pass: ok,
            score: if ok { pass_score } else { fail_score },
            reason: reason.into(),
        }
    }
}

fn one() -> f32 {
    1.0
}

/// A weighted, optionally gating check over a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unset means "use the kind's default" (only the layout gate gates by default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_gate: Option<bool>,
    #[serde(default = "one")]
    pub weight: f32,
    #[serde(flatten)]
    pub kind: RuleKind,
}

impl Rule {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            hard_gate: None,
            weight: 1.0,
            kind,
        }
    }

    pub fn gate(mut self, hard: bool) -> Self {
        self.hard_gate = Some(hard);
        self
    }

    pub fn weighted(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn is_hard_gate(&self) -> bool {
        self.hard_gate
            .unwrap_or(matches!(self.kind, RuleKind::LayoutGate(_)))
    }

    /// Negative weights count as zero.
    pub fn effective_weight(&self) -> f32 {
        self.weight.max(0.0)
    }

    pub fn evaluate(&self, s: &EvaluationSnapshot) -> RuleResult {
        self.kind.evaluate(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    Completion(Completion),
    LayoutGate(LayoutGate),
    PlacementCenter(PlacementCenter),
    PlacementRelation(PlacementRelation),
    PlacementSpacing(PlacementSpacing),
    ObjectColor(ObjectColor),
    BackgroundColor(BackgroundColor),
    TextStyle(TextStyleCheck),
    Variant(VariantChoice),
}

impl RuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Completion(_) => "completion",
            RuleKind::LayoutGate(_) => "layout_gate",
            RuleKind::PlacementCenter(_) => "placement_center",
            RuleKind::PlacementRelation(_) => "placement_relation",
            RuleKind::PlacementSpacing(_) => "placement_spacing",
            RuleKind::ObjectColor(_) => "object_color",
            RuleKind::BackgroundColor(_) => "background_color",
            RuleKind::TextStyle(_) => "text_style",
            RuleKind::Variant(_) => "variant",
        }
    }

    pub fn evaluate(&self, s: &EvaluationSnapshot) -> RuleResult {
        match self {
            RuleKind::Completion(r) => r.evaluate(s),
            RuleKind::LayoutGate(r) => r.evaluate(s),
            RuleKind::PlacementCenter(r) => r.evaluate(s),
            RuleKind::PlacementRelation(r) => r.evaluate(s),
            RuleKind::PlacementSpacing(r) => r.evaluate(s),
            RuleKind::ObjectColor(r) => r.evaluate(s),
            RuleKind::BackgroundColor(r) => r.evaluate(s),
            RuleKind::TextStyle(r) => r.evaluate(s),
            RuleKind::Variant(r) => r.evaluate(s),
        }
    }
}

fn placed<'a>(s: &'a EvaluationSnapshot, id: PieceId) -> Result<(&'a PieceInfo, Rect), RuleResult> {
    match s.get(id) {
        Some(info) => match info.placed_rect() {
            Some(rect) => Ok((info, rect)),
            None => Err(RuleResult::fail(format!("{} is not placed", id))),
        },
        None => Err(RuleResult::fail(format!("{} is not placed", id))),
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Every required piece (or, if none listed, every piece present) must be placed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Completion {
    pub required: Vec<PieceId>,
}

impl Completion {
    pub fn evaluate(&self, s: &EvaluationSnapshot) -> RuleResult {
        if s.is_empty() {
            return RuleResult::fail("No pieces on the board");
        }

        if !self.required.is_empty() {
            for &id in &self.required {
                if s.placed_rect(id).is_none() {
                    return RuleResult::fail(format!("{} is not placed", id));
                }
            }
            return RuleResult::pass(1.0, "All required pieces are placed");
        }

        if let Some(missing) = s.pieces().find(|p| !p.snapped) {
            return RuleResult::fail(format!("{} is not placed", missing.id));
        }
        RuleResult::pass(1.0, "All pieces are placed")
    }
}

// ---------------------------------------------------------------------------
// Layout gate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutGate {
    pub illustration: PieceId,
    pub title: PieceId,
    pub info: PieceId,
    pub date: PieceId,
    pub min_edge_margin: i32,
    pub min_inter_piece_gap: i32,
}

impl Default for LayoutGate {
    fn default() -> Self {
        Self {
            illustration: PieceId::Asset1,
            title: PieceId::Title,
            info: PieceId::Tagline,
            date: PieceId::Date,
            min_edge_margin: 1,
            min_inter_piece_gap: 1,
        }
    }
}

impl LayoutGate {
    pub fn evaluate(&self, s: &EvaluationSnapshot) -> RuleResult {
        let (rows, cols) = (s.rows(), s.cols());

        let mut rects = [Rect::cell(0, 0); 4];
        let ids = [self.illustration, self.title, self.info, self.date];
        for (slot, &id) in rects.iter_mut().zip(ids.iter()) {
            match s.placed_rect(id) {
                Some(r) => *slot = r,
                None => return RuleResult::fail(format!("{} is not placed", id)),
            }
        }
        let [ill, title, info, date] = rects;

        // 1) breathing room to the board edges
        for (&id, r) in ids.iter().zip(rects.iter()) {
            if !footprint::edge_margins(r, rows, cols).all_at_least(self.min_edge_margin) {
                return RuleResult::fail(format!("{} is too close to the board edge", id));
            }
        }

        // 2) info and date overlap nothing
        for other in s.pieces() {
            let Some(r) = other.placed_rect() else {
                continue;
            };
            if other.id != self.info && footprint::intersects(&info, &r) {
                return RuleResult::fail(format!("{} overlaps {}", self.info, other.id));
            }
            if other.id != self.date && footprint::intersects(&date, &r) {
                return RuleResult::fail(format!("{} overlaps {}", self.date, other.id));
            }
        }

        // 3) pairwise spacing
        let pairs = [
            (self.illustration, ill, self.title, title),
            (self.illustration, ill, self.info, info),
            (self.illustration, ill, self.date, date),
            (self.title, title, self.info, info),
            (self.title, title, self.date, date),
            (self.info, info, self.date, date),
        ];
        for (ia, ra, ib, rb) in pairs {
            let crowded = footprint::intersects(&ra, &rb)
                || footprint::min_gap_cells(&ra, &rb) < self.min_inter_piece_gap;
            if crowded {
                return RuleResult::fail(format!("{} and {} are too close", ia, ib));
            }
        }

        // 4) title sits above the illustration
        if title.r1 >= ill.r0 {
            return RuleResult::fail(format!(
                "{} must be placed above {}",
                self.title, self.illustration
            ));
        }

        RuleResult::pass(1.0, "Layout is clean: margins, no overlaps, title above illustration")
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementCenter {
    pub piece: PieceId,
    pub center_tolerance: i32,
    pub desired_edge_margin: i32,
}

impl Default for PlacementCenter {
    fn default() -> Self {
        Self {
            piece: PieceId::Asset1,
            center_tolerance: 1,
            desired_edge_margin: 2,
        }
    }
}

impl PlacementCenter {
    pub fn evaluate(&self, s: &EvaluationSnapshot) -> RuleResult {
        let (_, r) = match placed(s, self.piece) {
            Ok(p) => p,
            Err(fail) => return fail,
        };
        let (rows, cols) = (s.rows(), s.cols());

        let center = footprint::center_score(&r, rows, cols, self.center_tolerance);
        let balance = footprint::balance_score(&r, rows, cols);

        let edge = if self.desired_edge_margin > 0 {
            let desired = self.desired_edge_margin as f32;
            let m = footprint::edge_margins(&r, rows, cols);
            m.as_array()
                .iter()
                .map(|&v| clamp01(v as f32 / desired))
                .sum::<f32>()
                * 0.25
        } else {
            1.0
        };

        let score = clamp01(0.5 * center + 0.3 * balance + 0.2 * edge);
        RuleResult::pass(
            score,
            format!("Center:{:.2} Balance:{:.2} Edge:{:.2}", center, balance, edge),
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RelationMode {
    Above,
    Below,
    LeftOf,
    RightOf,
    #[default]
    Centered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementRelation {
    pub mode: RelationMode,
    pub a: PieceId,
    pub b: PieceId,
    pub tolerance_cells: i32,
}

impl Default for PlacementRelation {
    fn default() -> Self {
        Self {
            mode: RelationMode::Centered,
            a: PieceId::Asset1,
            b: PieceId::Title,
            tolerance_cells: 1,
        }
    }
}

impl PlacementRelation {
    pub fn evaluate(&self, s: &EvaluationSnapshot) -> RuleResult {
        let ra = match placed(s, self.a) {
            Ok((_, r)) => r,
            Err(fail) => return fail,
        };

        if self.mode == RelationMode::Centered {
            let center = footprint::center_score(&ra, s.rows(), s.cols(), self.tolerance_cells);
            return RuleResult::pass(center, format!("Centered score={:.2}", center));
        }

        let rb = match placed(s, self.b) {
            Ok((_, r)) => r,
            Err(fail) => return fail,
        };

        let ok = match self.mode {
            RelationMode::Above => ra.r1 < rb.r0,
            RelationMode::Below => ra.r0 > rb.r1,
            RelationMode::LeftOf => ra.c1 < rb.c0,
            RelationMode::RightOf => ra.c0 > rb.c1,
            RelationMode::Centered => true,
        };
        RuleResult::check(
            ok,
            1.0,
            0.0,
            format!("{} {} {} = {}", self.a, self.mode, self.b, ok),
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpacingMode {
    #[default]
    EdgeMargin,
    InterPieceGap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSpacing {
    pub mode: SpacingMode,
    pub a: PieceId,
    pub b: PieceId,
    pub min_cells: i32,
    pub full_at_cells: i32,
}

impl Default for PlacementSpacing {
    fn default() -> Self {
        Self {
            mode: SpacingMode::EdgeMargin,
            a: PieceId::Asset1,
            b: PieceId::Title,
            min_cells: 1,
            full_at_cells: 2,
        }
    }
}

/// Linear 0..1 between `lo` and `hi`; a step at `lo` when `hi <= lo`.
pub fn remap_clamped(v: i32, lo: i32, hi: i32) -> f32 {
    if hi <= lo {
        return if v >= lo { 1.0 } else { 0.0 };
    }
    clamp01((v - lo) as f32 / (hi - lo) as f32)
}

impl PlacementSpacing {
    pub fn evaluate(&self, s: &EvaluationSnapshot) -> RuleResult {
        let ra = match placed(s, self.a) {
            Ok((_, r)) => r,
            Err(fail) => return fail,
        };

        match self.mode {
            SpacingMode::EdgeMargin => {
                let min_edge = footprint::edge_margins(&ra, s.rows(), s.cols()).min();
                let score = remap_clamped(min_edge, self.min_cells, self.full_at_cells);
                RuleResult::pass(
                    score,
                    format!(
                        "Edge min={} (min {}, full {})",
                        min_edge, self.min_cells, self.full_at_cells
                    ),
                )
            }
            SpacingMode::InterPieceGap => {
                let rb = match placed(s, self.b) {
                    Ok((_, r)) => r,
                    Err(fail) => return fail,
                };
                if footprint::intersects(&ra, &rb) {
                    return RuleResult::fail(format!("{} overlaps {}", self.a, self.b));
                }
                let gap = footprint::min_gap_cells(&ra, &rb);
                let score = remap_clamped(gap, self.min_cells, self.full_at_cells);
                RuleResult::pass(
                    score,
                    format!(
                        "Gap {}-{}={} (min {}, full {})",
                        self.a, self.b, gap, self.min_cells, self.full_at_cells
                    ),
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectColor {
    pub target: PieceId,
    pub required: Rgb,
    /// `false` switches to a loose "different enough" comparison.
    pub exact: bool,
}

impl Default for ObjectColor {
    fn default() -> Self {
        Self {
            target: PieceId::Tagline,
            required: Rgb::RED,
            exact: true,
        }
    }
}

const CONTRAST_CHANNEL_SUM: f32 = 0.5;

impl ObjectColor {
    pub fn evaluate(&self, s: &EvaluationSnapshot) -> RuleResult {
        let info = match placed(s, self.target) {
            Ok((info, _)) => info,
            Err(fail) => return fail,
        };
        let Some(color) = info.style.color else {
            return RuleResult::fail(format!("{} has no color", self.target));
        };

        if self.exact {
            let (have, want) = (color.to_hex(), self.required.to_hex());
            let ok = have.eq_ignore_ascii_case(&want);
            let reason = if ok {
                format!("{} color matches {}", self.target, want)
            } else {
                format!("{} color is {}, expected {}", self.target, have, want)
            };
            return RuleResult::check(ok, 1.0, 0.0, reason);
        }

        let ok = color.channel_distance(&self.required) > CONTRAST_CHANNEL_SUM;
        let reason = if ok {
            format!("{} stands out from {}", self.target, self.required)
        } else {
            format!("{} lacks contrast against {}", self.target, self.required)
        };
        RuleResult::check(ok, 1.0, 0.5, reason)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundColor {
    pub black: Rgb,
    pub white: Rgb,
    pub red: Rgb,
    pub black_score: f32,
    pub white_score: f32,
    pub red_score: f32,
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self {
            black: Rgb::BLACK,
            white: Rgb::WHITE,
            red: Rgb::RED,
            black_score: 1.0,
            white_score: 0.7,
            red_score: 0.1,
        }
    }
}

impl BackgroundColor {
    pub fn evaluate(&self, s: &EvaluationSnapshot) -> RuleResult {
        let bg = s.background().unwrap_or(Rgb::BLACK);
        let score = if bg.same_color(&self.black) {
            self.black_score
        } else if bg.same_color(&self.white) {
            self.white_score
        } else if bg.same_color(&self.red) {
            self.red_score
        } else {
            // anything else is treated like the safe choice
            self.white_score
        };
        RuleResult::pass(score, format!("Background {} score={:.2}", bg, score))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StyleCheck {
    #[default]
    RequireBold,
    PreferBold,
    PreferItalic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyleCheck {
    pub target: PieceId,
    pub check: StyleCheck,
    pub pass_score: f32,
    pub fail_score: f32,
}

impl Default for TextStyleCheck {
    fn default() -> Self {
        Self {
            target: PieceId::Tagline,
            check: StyleCheck::RequireBold,
            pass_score: 1.0,
            fail_score: 0.3,
        }
    }
}

impl TextStyleCheck {
    pub fn evaluate(&self, s: &EvaluationSnapshot) -> RuleResult {
        let info = match placed(s, self.target) {
            Ok((info, _)) => info,
            Err(fail) => return fail,
        };
        let Some(text) = info.style.text else {
            return RuleResult::pass(self.fail_score, format!("{} has no text", self.target));
        };

        let (bold, italic) = (text.bold, text.italic);
        let ok = match self.check {
            StyleCheck::RequireBold => bold,
            StyleCheck::PreferBold => bold || !italic,
            StyleCheck::PreferItalic => italic || !bold,
        };
        RuleResult::check(
            ok,
            self.pass_score,
            self.fail_score,
            format!("bold={} italic={}", bold, italic),
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VariantSource {
    #[default]
    PieceVariant,
    TypeVariant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantChoice {
    pub target: PieceId,
    pub source: VariantSource,
    pub best_ids: Vec<i32>,
    pub best_score: f32,
    pub good_ids: Vec<i32>,
    pub good_score: f32,
    pub bad_ids: Vec<i32>,
    pub bad_score: f32,
    pub unknown_score: f32,
}

impl Default for VariantChoice {
    fn default() -> Self {
        Self {
            target: PieceId::Title,
            source: VariantSource::PieceVariant,
            best_ids: Vec::new(),
            best_score: 1.0,
            good_ids: Vec::new(),
            good_score: 0.8,
            bad_ids: Vec::new(),
            bad_score: 0.3,
            unknown_score: 0.5,
        }
    }
}

impl VariantChoice {
    pub fn evaluate(&self, s: &EvaluationSnapshot) -> RuleResult {
        let info = match placed(s, self.target) {
            Ok((info, _)) => info,
            Err(fail) => return fail,
        };
        let id = match self.source {
            VariantSource::PieceVariant => info.style.piece_variant,
            VariantSource::TypeVariant => info.style.type_variant,
        };
        let Some(id) = id else {
            return RuleResult::pass(self.unknown_score, "Variant id unavailable");
        };

        let score = if self.best_ids.contains(&id) {
            self.best_score
        } else if self.good_ids.contains(&id) {
            self.good_score
        } else if self.bad_ids.contains(&id) {
            self.bad_score
        } else {
            self.unknown_score
        };
        RuleResult::pass(
            score,
            format!("{} variant={} score={:.2}", self.target, id, score),
        )
    }
}
