use crate::reports::{self, StepLog};
use clap::Args;
use csv::{ReaderBuilder, Trim};
use gridboard::color::Rgb;
use gridboard::config::Config;
use gridboard::error::{GbResult, GridboardError};
use gridboard::footprint::Rect;
use gridboard::geometry::Vec3;
use gridboard::level::LevelConfig;
use gridboard::piece::{AlignOp, PieceId, PieceStyle};
use gridboard::scene::{PieceKey, Scene};
use serde::Deserialize;
use std::fmt::Display;
use std::fs::File;
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::debug;

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub config: Config,

    /// CSV script with columns `piece,action,x,y,arg`.
    #[arg(short, long)]
    pub script: String,

    /// Seconds advanced by every `tick` row that leaves `x` empty.
    #[arg(long, default_value_t = 0.1)]
    pub tick: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    Begin,
    Drag,
    End,
    Snap,
    Align,
    Select,
    Deselect,
    AlignSelection,
    Variant,
    TypeVariant,
    Color,
    Background,
    Remove,
    Tick,
    Settle,
    Evaluate,
}

/// One scripted input.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    #[serde(default)]
    pub piece: String,
    pub action: ScriptAction,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub arg: String,
}

pub fn load_script(path: &str) -> GbResult<Vec<ScriptStep>> {
    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(file);
    let mut steps = Vec::new();
    for row in rdr.deserialize() {
        steps.push(row?);
    }
    Ok(steps)
}

pub fn run(args: ReplayArgs, level: &LevelConfig) -> GbResult<()> {
    let steps = load_script(&args.script)?;
    let (mut scene, keys) = level.build_scene()?;
    println!("▶️  Replaying {} steps on '{}'", steps.len(), level.name);

    let mut log = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        let outcome = apply(&mut scene, &keys, step, args.tick).map_err(|e| {
            GridboardError::Validation(format!("Script step {}: {}", i + 1, e))
        })?;
        debug!(step = i + 1, action = ?step.action, %outcome, "Step applied");
        log.push(StepLog {
            step: i + 1,
            piece: step.piece.clone(),
            action: format!("{:?}", step.action),
            outcome,
        });
    }

    scene.settle();
    scene.tick(0.0);
    let eval = scene.evaluate_now();

    reports::print_step_log(&log);
    reports::print_board_grid(&scene);
    reports::print_rule_report(&eval);
    reports::print_summary(&eval, scene.score_controller().rubric());
    Ok(())
}

/// A piece is named either by its position in the level file or by its rubric tag.
fn resolve(scene: &Scene, keys: &[PieceKey], name: &str) -> GbResult<PieceKey> {
    if let Ok(index) = name.parse::<usize>() {
        return keys.get(index).copied().ok_or_else(|| {
            GridboardError::Validation(format!("No piece at index {}", index))
        });
    }
    let id = PieceId::from_str(name).map_err(|_| {
        GridboardError::Validation(format!(
            "Unknown piece '{}' (expected an index or one of: {})",
            name,
            names_of::<PieceId>()
        ))
    })?;
    scene
        .pieces()
        .find(|p| p.id == Some(id))
        .map(|p| p.key())
        .ok_or_else(|| GridboardError::Validation(format!("No piece tagged '{}'", id)))
}

fn pointer(step: &ScriptStep) -> GbResult<Vec3> {
    match (step.x, step.y) {
        (Some(x), Some(y)) => Ok(Vec3::xy(x, y)),
        _ => Err(GridboardError::Validation(format!(
            "{:?} needs both x and y",
            step.action
        ))),
    }
}

fn parse_rect(arg: &str) -> GbResult<Rect> {
    let parts: Vec<i32> = arg
        .split_whitespace()
        .map(|s| s.parse::<i32>())
        .collect::<Result<_, _>>()
        .map_err(|_| GridboardError::Validation(format!("Bad rect '{}'", arg)))?;
    match parts.as_slice() {
        &[r0, c0, r1, c1] => Ok(Rect::new(r0, c0, r1, c1)),
        _ => Err(GridboardError::Validation(format!(
            "Rect needs 'r0 c0 r1 c1' (got '{}')",
            arg
        ))),
    }
}

/// Comma-separated textual names of every variant, in declaration order.
fn names_of<E: IntoEnumIterator + Display>() -> String {
    E::iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

fn parse_align(arg: &str) -> GbResult<AlignOp> {
    AlignOp::from_str(arg).map_err(|_| {
        GridboardError::Validation(format!(
            "Unknown align op '{}' (expected one of: {})",
            arg,
            names_of::<AlignOp>()
        ))
    })
}

fn parse_index(arg: &str) -> GbResult<usize> {
    arg.parse::<usize>()
        .map_err(|_| GridboardError::Validation(format!("Bad index '{}'", arg)))
}

fn ok_or_refused(ok: bool) -> String {
    if ok { "ok" } else { "refused" }.to_string()
}

fn apply(scene: &mut Scene, keys: &[PieceKey], step: &ScriptStep, tick: f32) -> GbResult<String> {
    let outcome = match step.action {
        ScriptAction::Begin => {
            let k = resolve(scene, keys, &step.piece)?;
            ok_or_refused(scene.begin_drag(k, pointer(step)?)?)
        }
        ScriptAction::Drag => {
            let k = resolve(scene, keys, &step.piece)?;
            match scene.drag_to(k, pointer(step)?)? {
                Some(rect) => format!("over {}", rect),
                None => "not dragging".to_string(),
            }
        }
        ScriptAction::End => {
            let k = resolve(scene, keys, &step.piece)?;
            format!("{:?}", scene.end_drag(k)?)
        }
        ScriptAction::Snap => {
            let k = resolve(scene, keys, &step.piece)?;
            ok_or_refused(scene.try_snap_to_rect(k, parse_rect(&step.arg)?, false)?)
        }
        ScriptAction::Align => {
            let k = resolve(scene, keys, &step.piece)?;
            ok_or_refused(scene.align(k, parse_align(&step.arg)?, false)?)
        }
        ScriptAction::Select => {
            let k = resolve(scene, keys, &step.piece)?;
            scene.select(k, step.arg == "add")?;
            format!("{} selected", scene.selection().len())
        }
        ScriptAction::Deselect => {
            let k = resolve(scene, keys, &step.piece)?;
            scene.deselect(k);
            format!("{} selected", scene.selection().len())
        }
        ScriptAction::AlignSelection => {
            let report = scene.align_selection(parse_align(&step.arg)?, false);
            format!(
                "moved {} failed {} skipped {}",
                report.moved.len(),
                report.failed.len(),
                report.skipped.len()
            )
        }
        ScriptAction::Variant => {
            let k = resolve(scene, keys, &step.piece)?;
            ok_or_refused(scene.set_piece_variant(k, parse_index(&step.arg)?)?)
        }
        ScriptAction::TypeVariant => {
            let k = resolve(scene, keys, &step.piece)?;
            ok_or_refused(scene.set_type_variant(k, parse_index(&step.arg)?)?)
        }
        ScriptAction::Color => {
            let k = resolve(scene, keys, &step.piece)?;
            let color = Rgb::from_str(&step.arg)?;
            let text = scene.piece(k).and_then(|p| p.style.text);
            scene.set_piece_style(
                k,
                PieceStyle {
                    color: Some(color),
                    text,
                },
            )?;
            color.to_hex()
        }
        ScriptAction::Background => {
            let color = Rgb::from_str(&step.arg)?;
            scene.set_background(Some(color));
            color.to_hex()
        }
        ScriptAction::Remove => {
            let k = resolve(scene, keys, &step.piece)?;
            scene.remove(k)?;
            "removed".to_string()
        }
        ScriptAction::Tick => match scene.tick(step.x.unwrap_or(tick)) {
            Some(eval) => format!("evaluated {:.3}", eval.score),
            None => "idle".to_string(),
        },
        ScriptAction::Settle => {
            scene.settle();
            "settled".to_string()
        }
        ScriptAction::Evaluate => {
            let eval = scene.evaluate_now();
            format!("{:.3} {}", eval.score, eval.publish)
        }
    };
    Ok(outcome)
}
