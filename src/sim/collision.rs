//! Collision detection and response
//!
//! Everything collides as points against axis-aligned squares. This pass is
//! the only place asteroids are destroyed and the only place debris and
//! wreckage are created.

use glam::{IVec2, Vec2};
use rand::Rng;

use super::lifecycle::{self, AsteroidBudget, LifeState};
use super::state::{
    Asteroid, AsteroidSize, AsteroidTable, Bullet, Debris, DebrisQueue, Fragment, Wreckage, World,
};
use crate::consts::*;
use crate::polar_to_cartesian;

/// What the bullet pass did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Asteroids destroyed by bullets
    pub kills: u32,
    /// The ship was destroyed
    pub ship_destroyed: bool,
}

/// Run both collision passes: bullets against asteroids, then ship against asteroids
pub fn detect(world: &mut World) -> CollisionReport {
    let kills = resolve_bullets(world);
    let ship_destroyed = resolve_ship(world);
    CollisionReport {
        kills,
        ship_destroyed,
    }
}

/// Check a bullet against a rock at its current position and half a step back
///
/// The half step catches bullets that would otherwise jump over thin edges.
pub fn bullet_hits(bullet: &Bullet, rock: &Asteroid) -> bool {
    let half_back = bullet.pos - bullet.vel / 2;
    rock.contains(bullet.pos.as_vec2()) || rock.contains(half_back.as_vec2())
}

/// Test every live bullet against every asteroid, splitting whatever is hit
///
/// The bullet that hits is marked spent and tests nothing else this tick.
pub fn resolve_bullets(world: &mut World) -> u32 {
    let World {
        bullets,
        asteroids,
        debris,
        budget,
        rng,
        score,
        stats,
        tick,
        ..
    } = world;

    let mut kills = 0;
    for bullet in bullets.iter_mut().filter(|b| !b.spent) {
        for index in 0..asteroids.capacity() {
            let Some(rock) = asteroids.get(index).copied() else {
                continue;
            };
            if rock.size == AsteroidSize::Empty || !bullet_hits(bullet, &rock) {
                continue;
            }

            log::debug!("tick {tick}: bullet hit {:?} asteroid in slot {index}", rock.size);
            destroy_asteroid(asteroids, budget, rng, index);
            let impact = rock.origin.as_ivec2();
            for _ in 0..DEBRIS_PER_KILL {
                spawn_debris(debris, rng, impact);
            }
            lifecycle::record_kill(score, stats);
            bullet.spent = true;
            kills += 1;
            break;
        }
    }
    kills
}

/// Free a slot and put the two smaller pieces in its place
///
/// Destroying a Small spawns nothing and gives one budget unit back.
pub fn destroy_asteroid(
    asteroids: &mut AsteroidTable,
    budget: &mut AsteroidBudget,
    rng: &mut impl Rng,
    index: usize,
) {
    let Some(slot) = asteroids.get_mut(index) else {
        return;
    };
    let rock = *slot;
    slot.size = AsteroidSize::Empty;

    match rock.size.fragment() {
        Some(piece) => {
            for _ in 0..2 {
                let direction = rng.random_range(0.0..std::f32::consts::TAU);
                asteroids.insert(Asteroid::new(rock.origin, SPLIT_SPEED, direction, piece));
            }
        }
        None => budget.release_small(),
    }
}

/// Add one debris dot scattering from `origin`
pub fn spawn_debris(debris: &mut DebrisQueue, rng: &mut impl Rng, origin: IVec2) {
    let angle: f32 = rng.random_range(0.0..std::f32::consts::TAU);
    let vel = IVec2::new(
        (angle.cos() * DEBRIS_SPEED_X) as i32,
        (angle.sin() * DEBRIS_SPEED_Y) as i32,
    );
    debris.push(Debris {
        pos: origin,
        vel,
        spent: false,
    });
}

/// Kill a Vincible ship touching any asteroid
///
/// Every hull vertex is tested against every rock; the first contact ends the search.
pub fn resolve_ship(world: &mut World) -> bool {
    if world.ship.life != LifeState::Vincible {
        return false;
    }

    let ship = &world.ship;
    let hit = world
        .asteroids
        .iter_occupied()
        .find(|(_, rock)| ship.points.iter().any(|p| rock.contains(*p)));

    let Some((index, rock)) = hit else {
        return false;
    };
    log::debug!(
        "tick {}: ship hit {:?} asteroid in slot {index}",
        world.tick,
        rock.size
    );

    let origin = world.ship.origin;
    world.wreckage = scatter_wreckage(&mut world.rng, origin);
    lifecycle::kill_ship(world);
    true
}

/// Break the ship into short segments drifting in random directions
pub fn scatter_wreckage(rng: &mut impl Rng, origin: Vec2) -> Wreckage {
    let fragments = std::array::from_fn(|_| {
        let tilt = rng.random_range(0.0..std::f32::consts::TAU);
        let drift = rng.random_range(0.0..std::f32::consts::TAU);
        Fragment {
            ends: [origin, origin + polar_to_cartesian(WRECKAGE_LENGTH, tilt)],
            velocity: polar_to_cartesian(WRECKAGE_SPEED, drift),
        }
    });
    Wreckage {
        fragments,
        life: WRECKAGE_LIFE,
    }
}
