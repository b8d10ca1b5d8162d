//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed period only
//! - Seeded RNG only
//! - Stable iteration order (queue order, slot index order)
//! - No allocation, no rendering or platform dependencies

pub mod collision;
pub mod lifecycle;
pub mod pool;
pub mod state;
pub mod tick;

pub use collision::{CollisionReport, detect};
pub use lifecycle::{AsteroidBudget, LifeState, LifeTimers, Score};
pub use pool::{OverflowPolicy, PoolStats, RingQueue, Slot, SlotTable};
pub use state::{
    Asteroid, AsteroidSize, Bullet, Debris, Fragment, PoolReport, RunStats, Ship, World, Wreckage,
    FLAME_LINES, HULL_LINES,
};
pub use tick::{TickInput, step, tick};
