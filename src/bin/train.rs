use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ml_connect_n::ai::{Agent, MinimaxAgent, QLearningAgent, RandomAgent};
use ml_connect_n::checkpoint::load_value_table;
use ml_connect_n::config::AppConfig;
use ml_connect_n::game::Side;
use ml_connect_n::training::trainer::Trainer;

/// Train an N-in-a-row Q-learning agent against a scripted opponent.
#[derive(Parser)]
#[command(name = "train", about = "Train an N-in-a-row Q-learning agent")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Opponent to train against: random or minimax
    #[arg(long, default_value = "minimax")]
    opponent: String,

    /// Side the learner plays: x (moves first) or o
    #[arg(long, default_value = "o")]
    side: String,

    /// Resume from the configured checkpoint file if it exists
    #[arg(long)]
    resume: bool,

    /// Override number of training games
    #[arg(long)]
    games: Option<usize>,

    /// Override minimax lookahead depth
    #[arg(long)]
    depth: Option<usize>,

    /// Seed for deterministic training runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Some(games) = cli.games {
        config.training.num_games = games;
    }
    if let Some(depth) = cli.depth {
        config.search.depth = depth;
    }
    config.validate().context("validating config overrides")?;

    let side = match cli.side.as_str() {
        "x" => Side::X,
        "o" => Side::O,
        other => bail!("unknown side '{}' (expected 'x' or 'o')", other),
    };

    let rules = config.game;
    let mut agent = match cli.seed {
        Some(seed) => QLearningAgent::with_seed(side, rules, config.q.clone(), seed),
        None => QLearningAgent::new(side, rules, config.q.clone()),
    };

    if cli.resume {
        let path = &config.training.checkpoint_path;
        if path.exists() {
            load_value_table(&mut agent, rules, path)
                .with_context(|| format!("loading checkpoint from {}", path.display()))?;
            println!(
                "Resumed from {} ({} states, eps {:.3})",
                path.display(),
                agent.states_seen(),
                agent.epsilon()
            );
        } else {
            println!("No checkpoint at {}, starting fresh", path.display());
        }
    }

    let mut opponent: Box<dyn Agent> = match cli.opponent.as_str() {
        "random" => match cli.seed {
            Some(seed) => Box::new(RandomAgent::with_seed(seed.wrapping_add(1))),
            None => Box::new(RandomAgent::new()),
        },
        "minimax" => {
            let opp_side = side.other();
            match cli.seed {
                Some(seed) => Box::new(MinimaxAgent::with_seed(
                    opp_side,
                    config.search.depth,
                    seed.wrapping_add(2),
                )),
                None => Box::new(MinimaxAgent::new(opp_side, config.search.depth)),
            }
        }
        other => bail!("unknown opponent '{}' (expected 'random' or 'minimax')", other),
    };

    let trainer = Trainer::new(config.training.clone(), rules);
    trainer
        .train(&mut agent, opponent.as_mut())
        .context("training run failed")?;

    Ok(())
}
