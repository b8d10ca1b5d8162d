//! Fixed-period simulation tick
//!
//! Order within a tick: life cycle and generation, then the movement step,
//! then collisions, then retirement of spent queue entries.

use glam::{IVec2, Vec2};

use super::collision::{self, CollisionReport};
use super::lifecycle;
use super::state::{Asteroid, Bullet, Ship, World};
use crate::consts::*;
use crate::input::InputSource;
use crate::on_canvas;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Fire button went down this tick
    pub fire: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust: bool,
}

impl TickInput {
    /// Poll an input source once, in the order the buttons are acted on
    pub fn sample(source: &mut impl InputSource) -> Self {
        let fire = source.fire_pressed();
        let turn_right = source.turn_right_held();
        let turn_left = source.turn_left_held();
        let thrust = source.thrust_held();
        Self {
            fire,
            turn_left,
            turn_right,
            thrust,
        }
    }
}

/// Advance the world by one tick (everything except rendering)
pub fn tick(world: &mut World, input: &TickInput) -> CollisionReport {
    world.tick += 1;

    lifecycle::update(world);
    step(world, input);
    let report = collision::detect(world);

    world.bullets.retain(|b| !b.spent);
    world.debris.retain(|d| !d.spent);

    report
}

/// Movement step: controls, drag, motion and wraparound for every entity
pub fn step(world: &mut World, input: &TickInput) {
    if world.ship.is_alive() {
        if input.fire {
            fire(world);
        }
        if input.turn_right {
            world.ship.rotate(TURN_ANGLE);
        }
        if input.turn_left {
            world.ship.rotate(-TURN_ANGLE);
        }
        world.ship.thrusting = input.thrust;
        if input.thrust {
            let impulse = world.ship.forward * SHIP_ACCELERATION;
            world.ship.velocity += impulse;
        }
    } else {
        world.ship.thrusting = false;
    }

    apply_drag(&mut world.ship);
    let velocity = world.ship.velocity;
    world.ship.translate(velocity);
    wrap_ship(&mut world.ship);

    move_projectiles(world);
    move_wreckage(world);

    for rock in world.asteroids.iter_occupied_mut() {
        rock.origin += rock.velocity;
        wrap_asteroid(rock);
    }
}

/// Launch a bullet along the ship's heading
fn fire(world: &mut World) {
    let ship = &world.ship;
    let vel = IVec2::new(
        (ship.angle.cos() * BULLET_SPEED) as i32,
        (ship.angle.sin() * BULLET_SPEED) as i32,
    );
    let pos = (ship.origin + vel.as_vec2()).as_ivec2();
    if !world.bullets.push(Bullet {
        pos,
        vel,
        spent: false,
    }) {
        log::debug!("tick {}: bullet queue full, shot dropped", world.tick);
    }
}

/// Slow the ship against its direction of travel
///
/// Each axis snaps to zero once the drag would overshoot it, so the ship
/// settles instead of jittering around rest.
pub fn apply_drag(ship: &mut Ship) {
    let v = ship.velocity;
    let travel = if v.x == 0.0 {
        if v.y > 0.0 {
            std::f32::consts::FRAC_PI_2
        } else {
            -std::f32::consts::FRAC_PI_2
        }
    } else {
        let angle = (v.y / v.x).atan();
        if v.x < 0.0 {
            angle - std::f32::consts::PI
        } else {
            angle
        }
    };
    let drag = -crate::heading(travel) * SHIP_DECELERATION;

    ship.velocity.x = if v.x.abs() > drag.x.abs() {
        v.x + drag.x
    } else {
        0.0
    };
    ship.velocity.y = if v.y.abs() > drag.y.abs() {
        v.y + drag.y
    } else {
        0.0
    };
}

/// Ship wraparound keeps sub-pixel overshoot by shifting a whole canvas span
pub fn wrap_ship(ship: &mut Ship) {
    let mut shift = Vec2::ZERO;
    if ship.origin.x > SHIP_WRAP_MAX_X {
        shift.x -= SHIP_WRAP_SPAN_X;
    }
    if ship.origin.x < SHIP_WRAP_MIN_X {
        shift.x += SHIP_WRAP_SPAN_X;
    }
    if ship.origin.y > SHIP_WRAP_MAX_Y {
        shift.y -= SHIP_WRAP_SPAN_Y;
    }
    if ship.origin.y < SHIP_WRAP_MIN_Y {
        shift.y += SHIP_WRAP_SPAN_Y;
    }
    if shift != Vec2::ZERO {
        ship.translate(shift);
    }
}

/// Asteroid wraparound resets to a fixed point past the opposite edge
pub fn wrap_asteroid(rock: &mut Asteroid) {
    if rock.origin.x > ASTEROID_WRAP_MAX_X {
        rock.origin.x = ASTEROID_WRAP_MIN;
    }
    if rock.origin.x < ASTEROID_WRAP_MIN {
        rock.origin.x = ASTEROID_WRAP_MAX_X;
    }
    if rock.origin.y > ASTEROID_WRAP_MAX_Y {
        rock.origin.y = ASTEROID_WRAP_MIN;
    }
    if rock.origin.y < ASTEROID_WRAP_MIN {
        rock.origin.y = ASTEROID_WRAP_MAX_Y;
    }
}

/// Bullets and debris fly straight and are spent once off screen
fn move_projectiles(world: &mut World) {
    for bullet in world.bullets.iter_mut().filter(|b| !b.spent) {
        bullet.pos += bullet.vel;
        bullet.spent = !on_canvas(bullet.pos.x, bullet.pos.y);
    }
    for dot in world.debris.iter_mut().filter(|d| !d.spent) {
        dot.pos += dot.vel;
        dot.spent = !on_canvas(dot.pos.x, dot.pos.y);
    }
}

fn move_wreckage(world: &mut World) {
    let wreckage = &mut world.wreckage;
    if !wreckage.is_active() {
        return;
    }
    for fragment in &mut wreckage.fragments {
        let drift = fragment.velocity;
        for end in &mut fragment.ends {
            *end += drift;
        }
    }
    wreckage.life -= 1;
}
