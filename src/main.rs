use std::env;

use dotenv::dotenv;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cavebot::agent::Agent;
use cavebot::config::GameConfig;
use cavebot::engine::LocalEngine;
use cavebot::observer::DefaultObserver;
use cavebot::policy::PathfindingPolicy;

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cavebot=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let config = GameConfig::from_env()?;
    let max_ticks = env::var("CAVEBOT_MAX_TICKS")
        .ok()
        .and_then(|val| val.parse::<u32>().ok())
        .unwrap_or(10_000);

    let mut engine = LocalEngine::new(config)?;
    let mut agent = Agent::new(PathfindingPolicy::new(), DefaultObserver);
    let phase = agent.run(&mut engine, max_ticks);

    let state = engine.agent_state();
    tracing::info!(?phase, moves = state.moves, sticks = state.sticks, "Done");
    Ok(())
}
