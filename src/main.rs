//! Headless hunt simulation
//!
//! Usage: `gridhunt [config.ron|config.json]`. Without an argument the
//! default configuration is used. Set `RUST_LOG=debug` to follow state
//! changes and shots.

use std::process::ExitCode;

use gridhunt::prelude::*;

fn run() -> Result<(), EngineError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {path}");
            GameConfig::load(&path)?
        }
        None => GameConfig::default(),
    };

    let game = HuntGame::new(config)?;
    let mut engine = Engine::new(game.engine_config(), game);
    engine.run()?;

    let stats = engine.game().stats();
    log::info!(
        "Player was hit {} times by {} shots",
        stats.player_hits,
        stats.shots_fired
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
