//! Railyard Shooter headless entry point
//!
//! Runs the simulation without a renderer: the autopilot plays, effect
//! requests are filtered through the settings and logged, and a JSON summary
//! of the run is printed at the end. Set `RUST_LOG=debug` to see effects.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use railyard_shooter::consts::*;
use railyard_shooter::sim::{Effect, GameState, TickInput, TileMap, tick};
use railyard_shooter::{Error, GameConfig, QualityPreset, Settings};

/// Host frame time (60 fps)
const FRAME_MS: f32 = 1000.0 / 60.0;

#[derive(Parser, Debug)]
#[command(name = "railyard-shooter", about = "Run a headless autopilot session")]
struct Opt {
    /// RNG seed for the first session
    #[clap(long, default_value_t = 1)]
    seed: u64,

    /// Frames to simulate at 60 fps
    #[clap(long, default_value_t = 60 * 120)]
    frames: u32,

    /// JSON tuning file (missing fields keep their defaults)
    #[clap(long)]
    config: Option<String>,

    /// Tiled JSON map; an open arena is used when omitted
    #[clap(long)]
    map: Option<String>,

    /// Effect quality preset
    #[clap(long, value_enum, default_value_t = QualityPreset::Medium)]
    quality: QualityPreset,

    /// How many times to press restart after a game over
    #[clap(long, default_value_t = 0)]
    restarts: u32,
}

/// Summary of one session
#[derive(Debug, Serialize)]
struct SessionSummary {
    seed: u64,
    wave_reached: u32,
    shots_fired: u32,
    enemies_killed: u32,
    contact_hits: u32,
    game_over: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    frames: u32,
    quality: &'static str,
    sessions: Vec<SessionSummary>,
}

/// Game instance holding the session and host-side timing
struct Game {
    state: GameState,
    settings: Settings,
    accumulator: f32,
    input: TickInput,
}

impl Game {
    fn new(state: GameState, settings: Settings) -> Self {
        Self {
            state,
            settings,
            accumulator: 0.0,
            input: TickInput {
                idle_mode: true,
                ..Default::default()
            },
        }
    }

    /// Run simulation ticks for one host frame
    fn update(&mut self, dt_ms: f32) {
        let dt_ms = dt_ms.min(100.0);
        self.accumulator += dt_ms;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT_MS);
            self.accumulator -= SIM_DT_MS;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.restart = false;
        }

        self.play_effects();
    }

    /// Stand-in for the engine: filter and log every requested effect
    fn play_effects(&mut self) {
        for effect in self.state.drain_effects() {
            let Some(effect) = self.settings.filter(effect) else {
                continue;
            };
            match effect {
                Effect::WaveBanner { wave } => log::info!("-- Wave {wave} --"),
                Effect::GameOverScreen { wave } => log::info!("GAME OVER at wave {wave}"),
                Effect::HealthChanged { health, max } => log::info!("Health {health}/{max}"),
                other => log::debug!("effect: {other:?}"),
            }
        }
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            seed: self.state.seed,
            wave_reached: self.state.wave,
            shots_fired: self.state.stats.shots_fired,
            enemies_killed: self.state.stats.enemies_killed,
            contact_hits: self.state.stats.contact_hits,
            game_over: self.state.is_game_over(),
        }
    }
}

fn run(opt: &Opt) -> Result<RunSummary, Error> {
    let config = match &opt.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };
    let map = match &opt.map {
        Some(path) => TileMap::from_tiled_file(path, config.map_scale)?,
        None => TileMap::open(config.map_cols, config.map_rows, config.world_tile_size()),
    };
    let state = GameState::new(Arc::new(config), Arc::new(map), opt.seed);
    let mut game = Game::new(state, Settings::from_preset(opt.quality));
    let mut sessions = Vec::new();
    let mut restarts_left = opt.restarts;

    for _ in 0..opt.frames {
        game.update(FRAME_MS);

        if game.state.is_game_over() {
            sessions.push(game.summary());
            if restarts_left == 0 {
                break;
            }
            restarts_left -= 1;
            game.input.restart = true;
            game.update(FRAME_MS);
        }
    }
    if !game.state.is_game_over() {
        sessions.push(game.summary());
    }

    Ok(RunSummary {
        frames: opt.frames,
        quality: opt.quality.as_str(),
        sessions,
    })
}

fn main() -> ExitCode {
    env_logger::init();
    let opt = Opt::parse();
    log::info!("Railyard Shooter (headless) starting with seed {}", opt.seed);

    match run(&opt) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to encode summary: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
