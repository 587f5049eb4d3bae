//! Headless game shell: configuration, logging, and a fixed-interval
//! simulation loop.

mod config;
mod game;
mod input;
mod recipes;
mod render;
mod worldgen;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct CliOptions {
    config_path: Option<std::path::PathBuf>,
    ticks: Option<u64>,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut options = CliOptions {
            config_path: None,
            ticks: None,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let Some(path) = args.next() else {
                        anyhow::bail!("--config requires a path");
                    };
                    options.config_path = Some(path.into());
                }
                "--ticks" => {
                    let Some(ticks) = args.next() else {
                        anyhow::bail!("--ticks requires a number");
                    };
                    options.ticks = Some(ticks.parse()?);
                }
                "--help" | "-h" => {
                    println!("usage: flatcraft [--config <path>] [--ticks <n>]");
                    std::process::exit(0);
                }
                other => anyhow::bail!("unknown argument: {other}"),
            }
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting flatcraft v{}", env!("CARGO_PKG_VERSION"));

    let options = CliOptions::parse()?;
    let config = match &options.config_path {
        Some(path) => config::GameConfig::load_from_path(path),
        None => config::GameConfig::load(),
    };
    let ticks = options.ticks.unwrap_or(config.sim_ticks);
    let dt = config.tick_interval_ms.max(1) as f32 / 1000.0;

    let mut game = game::Game::new(&config)?;
    let mut sink = render::NullSink::default();

    for tick in 0..ticks {
        game.tick(dt, &mut sink);
        if game.is_over() {
            info!(tick, "player died, ending run");
            break;
        }
    }

    if let Some(player) = game.player() {
        info!(
            food = player.food(),
            health = player.health(),
            "simulation finished"
        );
    }
    info!("flatcraft shutting down");
    Ok(())
}
