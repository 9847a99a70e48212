use crate::reports;
use clap::Args;
use gridboard::config::Config;
use gridboard::error::GbResult;
use gridboard::level::LevelConfig;

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub config: Config,

    /// Print the evaluation as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: EvaluateArgs, level: &LevelConfig) -> GbResult<()> {
    let (mut scene, _keys) = level.build_scene()?;
    let eval = scene.evaluate_now();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&eval)?);
        return Ok(());
    }

    println!("\n🧩 === LAYOUT AUDIT: {} === 🧩", level.name);
    reports::print_board_grid(&scene);
    reports::print_rule_report(&eval);
    reports::print_summary(&eval, scene.score_controller().rubric());
    Ok(())
}
