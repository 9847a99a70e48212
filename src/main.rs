use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use gridboard::level::LevelConfig;
use std::process;
use tracing::Level;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Level file (JSON): board, pieces, rubric and background.
    #[arg(global = true, short, long, default_value = "data/levels/poster.json")]
    level: String,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Evaluate(cmd::evaluate::EvaluateArgs),
    Replay(cmd::replay::ReplayArgs),
}

fn sub_matches<'a>(matches: &'a ArgMatches, name: &str) -> &'a ArgMatches {
    matches.subcommand_matches(name).unwrap_or(matches)
}

fn main() {
    // Raw matches tell typed values apart from clap defaults.
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    eprintln!("📂 Loading level: {}", cli.level);
    let mut level = LevelConfig::load_from_file(&cli.level).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });

    // Values typed on the command line win over the level file.
    let (cli_config, sub) = match &cli.command {
        Commands::Evaluate(args) => (&args.config, sub_matches(&matches, "evaluate")),
        Commands::Replay(args) => (&args.config, sub_matches(&matches, "replay")),
    };
    level.config.merge_from_cli(cli_config, sub);

    if let Err(e) = level.validate() {
        eprintln!("\n❌ INVALID LEVEL CONFIGURATION:");
        eprintln!("   {}", e);
        process::exit(1);
    }

    let result = match cli.command {
        Commands::Evaluate(args) => cmd::evaluate::run(args, &level),
        Commands::Replay(args) => cmd::replay::run(args, &level),
    };

    if let Err(e) = result {
        eprintln!("\n❌ FATAL ERROR:");
        eprintln!("   {}", e);
        process::exit(1);
    }
}
