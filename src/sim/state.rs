//! World state and entity types
//!
//! Everything a tick reads or writes lives in one [`World`] record owned by
//! the tick driver.

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::lifecycle::{AsteroidBudget, LifeState, LifeTimers, Score};
use super::pool::{OverflowPolicy, PoolStats, RingQueue, Slot, SlotTable};
use crate::consts::*;
use crate::heading;

/// Ship outline relative to its origin, facing up
const SHIP_OUTLINE: [Vec2; SHIP_POINTS] = [
    Vec2::new(-6.0, 8.0),
    Vec2::new(6.0, 8.0),
    Vec2::new(0.0, -10.0),
    Vec2::new(-5.0, 5.0),
    Vec2::new(5.0, 5.0),
    // Thruster flame
    Vec2::new(-3.0, 5.0),
    Vec2::new(0.0, 11.0),
    Vec2::new(3.0, 5.0),
];

/// Vertex pairs forming the hull
pub const HULL_LINES: [(usize, usize); 3] = [(0, 2), (2, 1), (3, 4)];
/// Vertex pairs forming the thruster flame
pub const FLAME_LINES: [(usize, usize); 2] = [(5, 6), (6, 7)];

/// The player's ship
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub origin: Vec2,
    /// Absolute vertex positions, rotated rigidly around `origin`
    pub points: [Vec2; SHIP_POINTS],
    pub angle: f32,
    pub velocity: Vec2,
    /// Cached (cos angle, sin angle)
    pub forward: Vec2,
    /// Cached unit vector opposite `forward`
    pub backward: Vec2,
    pub life: LifeState,
    pub thrusting: bool,
}

impl Default for Ship {
    fn default() -> Self {
        Self::placed()
    }
}

impl Ship {
    /// A fresh ship at the canvas centre, facing up, invincible and at rest
    pub fn placed() -> Self {
        let origin = Vec2::new(SHIP_START_X, SHIP_START_Y);
        let mut ship = Self {
            origin,
            points: SHIP_OUTLINE.map(|offset| origin + offset),
            angle: SHIP_START_ANGLE,
            velocity: Vec2::ZERO,
            forward: Vec2::ZERO,
            backward: Vec2::ZERO,
            life: LifeState::Invincible,
            thrusting: false,
        };
        ship.refresh_directions();
        ship
    }

    /// Rotate the hull around the origin by `delta` radians
    pub fn rotate(&mut self, delta: f32) {
        let rotation = Vec2::from_angle(delta);
        let origin = self.origin;
        for point in &mut self.points {
            *point = origin + rotation.rotate(*point - origin);
        }
        self.angle += delta;
        self.refresh_directions();
    }

    fn refresh_directions(&mut self) {
        self.forward = heading(self.angle);
        self.backward = heading(self.angle - std::f32::consts::PI);
    }

    /// Move the origin and every vertex by `offset`
    pub fn translate(&mut self, offset: Vec2) {
        self.origin += offset;
        for point in &mut self.points {
            *point += offset;
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life != LifeState::Dead
    }
}

/// A player bullet. Integer-precision like the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: IVec2,
    pub vel: IVec2,
    /// Left play (hit something or flew off screen); waiting to be retired from the queue head
    pub spent: bool,
}

/// A debris dot scattered by a destroyed asteroid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debris {
    pub pos: IVec2,
    pub vel: IVec2,
    pub spent: bool,
}

/// Asteroid size class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsteroidSize {
    /// Destroyed, the slot is free
    #[default]
    Empty,
    Small,
    Mid,
    Big,
}

impl AsteroidSize {
    /// Side length of the bounding square
    pub fn side(self) -> u8 {
        match self {
            AsteroidSize::Empty => 0,
            AsteroidSize::Small => SMALL_SIZE,
            AsteroidSize::Mid => MID_SIZE,
            AsteroidSize::Big => BIG_SIZE,
        }
    }

    /// The size two fragments take when this one is destroyed
    pub fn fragment(self) -> Option<AsteroidSize> {
        match self {
            AsteroidSize::Big => Some(AsteroidSize::Mid),
            AsteroidSize::Mid => Some(AsteroidSize::Small),
            AsteroidSize::Small | AsteroidSize::Empty => None,
        }
    }
}

/// A square rock
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    /// Top-left corner of the bounding square
    pub origin: Vec2,
    pub velocity: Vec2,
    pub size: AsteroidSize,
}

impl Slot for Asteroid {
    fn is_free(&self) -> bool {
        self.size == AsteroidSize::Empty
    }
}

impl Asteroid {
    pub fn new(origin: Vec2, speed: f32, direction: f32, size: AsteroidSize) -> Self {
        Self {
            origin,
            velocity: heading(direction) * speed,
            size,
        }
    }

    /// Strict containment in the bounding square
    pub fn contains(&self, point: Vec2) -> bool {
        let side = self.size.side() as f32;
        point.x > self.origin.x
            && point.x < self.origin.x + side
            && point.y > self.origin.y
            && point.y < self.origin.y + side
    }
}

/// One line segment of a destroyed ship
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub ends: [Vec2; 2],
    pub velocity: Vec2,
}

/// The four pieces left by a destroyed ship, expiring together
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wreckage {
    pub fragments: [Fragment; WRECKAGE_FRAGMENTS],
    /// Ticks left; zero means no wreckage on screen
    pub life: u8,
}

impl Wreckage {
    pub fn is_active(&self) -> bool {
        self.life > 0
    }
}

/// Counters for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub kills: u32,
    pub deaths: u32,
    pub respawns: u32,
    pub asteroids_generated: u32,
}

/// Pool overflow counters, one per pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReport {
    pub bullets: PoolStats,
    pub debris: PoolStats,
    pub asteroids: PoolStats,
}

pub type BulletQueue = RingQueue<Bullet, BULLET_SLOTS>;
pub type DebrisQueue = RingQueue<Debris, DEBRIS_SLOTS>;
pub type AsteroidTable = SlotTable<Asteroid, MAX_ASTEROIDS>;

/// Complete game state
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Ticks advanced so far
    pub tick: u64,
    pub score: Score,
    pub ship: Ship,
    pub timers: LifeTimers,
    pub bullets: BulletQueue,
    pub debris: DebrisQueue,
    pub asteroids: AsteroidTable,
    pub wreckage: Wreckage,
    pub budget: AsteroidBudget,
    pub stats: RunStats,
}

impl World {
    /// Create a new world with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tick: 0,
            score: Score::default(),
            ship: Ship::placed(),
            timers: LifeTimers::default(),
            bullets: RingQueue::new(OverflowPolicy::DropNewest),
            debris: RingQueue::new(OverflowPolicy::OverwriteOldest),
            asteroids: SlotTable::new(),
            wreckage: Wreckage::default(),
            budget: AsteroidBudget::default(),
            stats: RunStats::default(),
        }
    }

    pub fn live_asteroids(&self) -> usize {
        self.asteroids.occupied()
    }

    pub fn pool_report(&self) -> PoolReport {
        PoolReport {
            bullets: self.bullets.stats(),
            debris: self.debris.stats(),
            asteroids: self.asteroids.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placed_ship_faces_up() {
        let ship = Ship::placed();
        assert_eq!(ship.origin, Vec2::new(160.0, 120.0));
        assert_eq!(ship.life, LifeState::Invincible);
        assert!(ship.forward.x.abs() < 1e-6);
        assert!((ship.forward.y + 1.0).abs() < 1e-6);
        assert!((ship.backward.y - 1.0).abs() < 1e-6);
        // Nose above the origin
        assert_eq!(ship.points[2], Vec2::new(160.0, 110.0));
    }

    #[test]
    fn test_rotation_is_rigid() {
        let mut ship = Ship::placed();
        let before: Vec<f32> = ship.points.iter().map(|p| p.distance(ship.origin)).collect();
        for _ in 0..7 {
            ship.rotate(TURN_ANGLE);
        }
        assert_eq!(ship.origin, Vec2::new(160.0, 120.0));
        for (point, dist) in ship.points.iter().zip(before) {
            assert!((point.distance(ship.origin) - dist).abs() < 1e-3);
        }
        assert!((ship.angle - (SHIP_START_ANGLE + 7.0 * TURN_ANGLE)).abs() < 1e-5);
        assert!((ship.forward - heading(ship.angle)).length() < 1e-6);
    }

    #[test]
    fn test_quarter_turn_moves_nose_right() {
        let mut ship = Ship::placed();
        ship.rotate(std::f32::consts::FRAC_PI_2);
        let nose = ship.points[2];
        assert!((nose.x - 170.0).abs() < 1e-3);
        assert!((nose.y - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_asteroid_containment_is_strict() {
        let rock = Asteroid::new(Vec2::new(10.0, 10.0), 0.0, 0.0, AsteroidSize::Small);
        assert!(rock.contains(Vec2::new(11.0, 11.0)));
        assert!(rock.contains(Vec2::new(24.9, 24.9)));
        assert!(!rock.contains(Vec2::new(10.0, 12.0)));
        assert!(!rock.contains(Vec2::new(25.0, 12.0)));
        assert!(!rock.contains(Vec2::new(12.0, 25.0)));

        let empty = Asteroid::default();
        assert!(!empty.contains(Vec2::ZERO));
    }

    #[test]
    fn test_fragment_chain() {
        assert_eq!(AsteroidSize::Big.fragment(), Some(AsteroidSize::Mid));
        assert_eq!(AsteroidSize::Mid.fragment(), Some(AsteroidSize::Small));
        assert_eq!(AsteroidSize::Small.fragment(), None);
    }
}
