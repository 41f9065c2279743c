/// Entry point: wires config, logging, terminal and input devices to the loop driver.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;

use crossterm::tty::IsTty;
use log::{error, info, warn};

use config::GameConfig;
use domain::grid::Grid;
use domain::tile::TileState;
use sim::driver::{self, FramePacer};
use sim::event::GameEvent;
use sim::world::GameState;
use ui::input::Devices;
use ui::renderer::TerminalSurface;
use ui::sound::SoundEngine;
use ui::view::View;

fn main() {
    let config = GameConfig::load();
    let log_problem = init_logging(&config);
    for w in log_problem.iter().chain(&config.warnings) {
        warn!("config: {w}");
    }

    let display = &config.display;
    let mut state = GameState::new(Grid::for_screen(
        display.screen_width,
        display.screen_height,
        display.tile_size,
    ));

    let mut surface = match TerminalSurface::open(display) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let mut devices = Devices::new(&config);
    if devices.gamepad_connected() {
        info!("gamepad detected");
    }
    let sound = SoundEngine::new();
    let view = View::new(display.tile_size);
    let mut pacer = FramePacer::from_fps(display.fps);
    info!(
        "starting: {}x{} grid, {}px tiles, {} fps ({:?} per tick)",
        state.grid.width(), state.grid.height(), display.tile_size, display.fps, pacer.interval(),
    );

    let result = driver::run(
        &mut state,
        &mut devices,
        &mut surface,
        &view,
        &mut pacer,
        |events, surface| {
            report_events(events, surface);
            process_sound_events(sound.as_ref(), events);
        },
    );

    if let Err(e) = surface.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(ticks) => {
            let tilled = state.grid.count(TileState::TilledSoil);
            info!("stopped after {ticks} ticks");
            println!("Thanks for playing Farm Grid! You tilled {tilled} tiles.");
        }
        Err(e) => {
            error!("{e}");
            eprintln!("Game error: {e}");
            std::process::exit(1);
        }
    }
}

/// Logger on stderr, or on `general.log_file` when set. `RUST_LOG` wins over
/// the configured level. Returns a problem to report once logging is up.
fn init_logging(config: &GameConfig) -> Option<String> {
    let mut problem = None;
    let file = config.log_file.as_ref().and_then(|path| match File::create(path) {
        Ok(f) => Some(f),
        Err(e) => {
            problem = Some(format!("cannot open log file {}: {e}", path.display()));
            None
        }
    });

    let on_screen = file.is_none() && std::io::stderr().is_tty();
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter(on_screen)),
    );
    builder.format_timestamp_millis();
    if let Some(f) = file {
        builder.target(env_logger::Target::Pipe(Box::new(f)));
    }
    builder.init();
    problem
}

/// Diagnostics: one log line per movement or successful till, mirrored on the status row.
fn report_events(events: &[GameEvent], surface: &mut TerminalSurface) {
    for event in events {
        match event {
            GameEvent::PlayerMoved { .. } | GameEvent::SoilTilled { .. } => {
                info!("{event}");
                surface.set_status(event.to_string());
            }
            GameEvent::MoveBlocked { direction, .. } => {
                info!("{event}");
                log::debug!("{direction:?} move clamped at the grid edge");
                surface.set_status(event.to_string());
            }
            GameEvent::AlreadyTilled { .. } => log::debug!("{event}"),
            GameEvent::QuitRequested => info!("{event}"),
        }
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::PlayerMoved { .. } => sfx.play_step(),
            GameEvent::MoveBlocked { .. } => sfx.play_bump(),
            GameEvent::SoilTilled { .. } => sfx.play_till(),
            _ => {}
        }
    }
}
