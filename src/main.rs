//! Vector Rocks headless harness
//!
//! Runs the engine against an in-memory display with an autopilot on the
//! buttons, then prints a JSON summary of the run. Takes an optional path to
//! a JSON settings file as its only argument.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use vector_rocks::sim::{PoolReport, RunStats};
use vector_rocks::{Button, ButtonState, HarnessSettings, RecordingDisplay, TickDriver};

/// Printed when the run ends
#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    score: u32,
    stats: RunStats,
    pools: PoolReport,
    deferred_fires: u32,
    draw_commands: u64,
}

/// Presses buttons at random with the configured probabilities
struct Autopilot {
    rng: Pcg32,
    fire: f64,
    turn: f64,
    thrust: f64,
}

impl Autopilot {
    fn new(settings: &HarnessSettings) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(settings.seed.rotate_left(17)),
            fire: settings.fire_chance,
            turn: settings.turn_chance,
            thrust: settings.thrust_chance,
        }
    }

    fn press(&mut self, levels: &mut ButtonState) {
        for button in Button::ALL {
            let chance = match button {
                Button::Fire => self.fire,
                Button::Left | Button::Right => self.turn,
                Button::Thrust => self.thrust,
            };
            levels.set(button, self.rng.random_bool(chance));
        }
    }
}

type HarnessDriver = TickDriver<RecordingDisplay, ButtonState>;

fn main() {
    env_logger::init();
    log::info!("Vector Rocks harness starting...");

    let path = std::env::args().nth(1).map(PathBuf::from);
    let settings = HarnessSettings::load(path.as_deref());

    let mut driver =
        TickDriver::new(settings.seed, RecordingDisplay::new(), ButtonState::default());
    let mut autopilot = Autopilot::new(&settings);

    let draw_commands = if settings.realtime {
        run_realtime(&mut driver, &mut autopilot, &settings)
    } else {
        run_back_to_back(&mut driver, &mut autopilot, &settings)
    };

    let world = driver.world();
    let summary = RunSummary {
        seed: world.seed,
        ticks: world.tick,
        score: world.score.value(),
        stats: world.stats,
        pools: world.pool_report(),
        deferred_fires: driver.line().deferred_count(),
        draw_commands,
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize run summary: {e}"),
    }
}

/// Fire the timer and service it immediately, as fast as possible
fn run_back_to_back(
    driver: &mut HarnessDriver,
    autopilot: &mut Autopilot,
    settings: &HarnessSettings,
) -> u64 {
    let line = driver.line();
    let mut draw_commands = 0;
    while driver.world().tick < settings.ticks {
        autopilot.press(driver.levels_mut());
        line.fire();
        if driver.service() {
            draw_commands += driver.display_mut().take().len() as u64;
        }
    }
    draw_commands
}

/// Fire the timer from a separate thread every `tick_ms`
fn run_realtime(
    driver: &mut HarnessDriver,
    autopilot: &mut Autopilot,
    settings: &HarnessSettings,
) -> u64 {
    let line = driver.line();
    let stop = Arc::new(AtomicBool::new(false));
    let period = Duration::from_millis(settings.tick_ms);

    let timer = {
        let line = Arc::clone(&line);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                thread::sleep(period);
                line.fire();
            }
        })
    };

    let mut draw_commands = 0;
    autopilot.press(driver.levels_mut());
    while driver.world().tick < settings.ticks {
        if driver.service() {
            draw_commands += driver.display_mut().take().len() as u64;
            autopilot.press(driver.levels_mut());
        } else {
            thread::sleep(Duration::from_millis(1));
        }
    }

    stop.store(true, Ordering::Relaxed);
    if timer.join().is_err() {
        log::warn!("Timer thread panicked");
    }
    draw_commands
}
