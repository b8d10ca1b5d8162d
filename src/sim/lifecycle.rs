//! Ship life cycle, score and asteroid generation
//!
//! The ship cycles Dead -> Invincible -> Vincible forever; there is no
//! game-over. Only the collision pass can kill a Vincible ship.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Asteroid, AsteroidSize, RunStats, Ship, World};
use crate::consts::*;

/// Ship life state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    /// Destroyed, waiting to respawn
    Dead,
    /// Freshly placed; asteroids pass through it
    #[default]
    Invincible,
    /// Can be destroyed
    Vincible,
}

/// Tick counters driving the life-state transitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeTimers {
    pub invincible: u16,
    pub respawn: u16,
}

/// Player score, never negative
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score(u32);

impl Score {
    pub fn value(self) -> u32 {
        self.0
    }

    pub fn award_kill(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn apply_death_penalty(&mut self) {
        self.0 = self.0.saturating_sub(DEATH_PENALTY);
    }
}

/// Worst-case asteroid budget plus the generation countdown
///
/// Each Big reserves room for the four Smalls it can eventually split into;
/// destroying a Small gives one unit back. Keeping `reserved` within the table
/// capacity means the free-slot scan cannot fail for generated rocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsteroidBudget {
    pub reserved: u16,
    /// Ticks until the next generation attempt
    pub countdown: u16,
}

impl Default for AsteroidBudget {
    fn default() -> Self {
        Self {
            reserved: 0,
            countdown: ASTEROID_PERIOD,
        }
    }
}

impl AsteroidBudget {
    /// Whether one more Big and all its descendants still fit
    pub fn can_spawn_big(&self) -> bool {
        (self.reserved + BIG_BUDGET) as usize <= MAX_ASTEROIDS
    }

    pub fn reserve_big(&mut self) {
        self.reserved += BIG_BUDGET;
    }

    pub fn release_small(&mut self) {
        self.reserved = self.reserved.saturating_sub(1);
    }

    /// Advance the countdown; true when a generation attempt is due this tick
    fn due(&mut self) -> bool {
        let due = self.countdown == 0;
        if due {
            self.countdown = ASTEROID_PERIOD;
        }
        self.countdown -= 1;
        due
    }
}

/// Start-of-tick bookkeeping: generation attempt, then life-state timers
pub fn update(world: &mut World) {
    if world.budget.due() {
        generate_asteroid(world);
    }
    advance_life_state(world);
}

/// Run the Invincible and Dead timers
pub fn advance_life_state(world: &mut World) {
    match world.ship.life {
        LifeState::Invincible => {
            world.timers.invincible += 1;
            if world.timers.invincible >= INVINCIBILITY_TICKS {
                world.ship.life = LifeState::Vincible;
                world.timers.invincible = 0;
                log::debug!("tick {}: ship vulnerable", world.tick);
            }
        }
        LifeState::Dead => {
            world.timers.respawn += 1;
            if world.timers.respawn >= RESPAWN_TICKS {
                respawn(world);
            }
        }
        LifeState::Vincible => {}
    }
}

fn respawn(world: &mut World) {
    world.ship = Ship::placed();
    world.timers = LifeTimers::default();
    world.stats.respawns += 1;
    log::info!("tick {}: ship respawned", world.tick);
}

/// Spawn a Big at the generation point if the budget allows it
pub fn generate_asteroid(world: &mut World) -> bool {
    if !world.budget.can_spawn_big() {
        log::debug!(
            "tick {}: generation skipped, {} budget units reserved",
            world.tick,
            world.budget.reserved
        );
        return false;
    }
    let direction = world.rng.random_range(0.0..std::f32::consts::TAU);
    let rock = Asteroid::new(
        Vec2::new(ASTEROID_SPAWN_X, ASTEROID_SPAWN_Y),
        BIG_SPEED,
        direction,
        AsteroidSize::Big,
    );
    if world.asteroids.insert(rock).is_none() {
        return false;
    }
    world.budget.reserve_big();
    world.stats.asteroids_generated += 1;
    log::info!(
        "tick {}: big asteroid generated heading {:.2}, budget {}/{}",
        world.tick,
        direction,
        world.budget.reserved,
        MAX_ASTEROIDS
    );
    true
}

/// Ship hit an asteroid: mark it dead, charge the penalty, restart the respawn timer
pub fn kill_ship(world: &mut World) {
    world.ship.life = LifeState::Dead;
    world.ship.thrusting = false;
    world.score.apply_death_penalty();
    world.timers.respawn = 0;
    world.stats.deaths += 1;
    log::info!(
        "tick {}: ship destroyed, score now {}",
        world.tick,
        world.score.value()
    );
}

/// An asteroid was destroyed by a bullet
pub fn record_kill(score: &mut Score, stats: &mut RunStats) {
    score.award_kill();
    stats.kills += 1;
}
