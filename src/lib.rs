//! Vector Rocks - a vector Asteroids engine for displays without a frame buffer
//!
//! Core modules:
//! - `sim`: Fixed-period simulation (entity pools, physics, collisions, life cycle)
//! - `renderer`: Diff renderer that erases the previous frame before drawing the next
//! - `display`: Display primitive capability plus host-side mock displays
//! - `input`: Button capability and debounced switch reader
//! - `driver`: Tick driver and the timer line that schedules it
//! - `settings`: Options for the headless host harness

pub mod display;
pub mod driver;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use display::{Color, Display, DrawCommand, PixelCanvas, RecordingDisplay};
pub use driver::{TickDriver, TimerFire, TimerLine};
pub use input::{Button, ButtonLevels, ButtonState, InputSource, Switches};
pub use renderer::DiffRenderer;
pub use settings::HarnessSettings;

use glam::Vec2;

/// Game configuration constants
///
/// Everything here is fixed at compile time; the engine reads no runtime
/// configuration.
pub mod consts {
    /// Timer period of one tick in milliseconds (20 Hz)
    pub const TICK_MS: u64 = 50;

    /// Visible canvas
    pub const CANVAS_WIDTH: i32 = 320;
    pub const CANVAS_HEIGHT: i32 = 240;

    /// Pool sizes. Ring queues keep one slot free, so usable capacity is one less.
    pub const BULLET_SLOTS: usize = 10;
    pub const DEBRIS_SLOTS: usize = 10;
    pub const MAX_ASTEROIDS: usize = 12;

    /// Ship handling
    pub const SHIP_POINTS: usize = 8;
    pub const TURN_ANGLE: f32 = 0.23;
    pub const SHIP_ACCELERATION: f32 = 0.9;
    pub const SHIP_DECELERATION: f32 = 0.2;
    pub const SHIP_START_X: f32 = 160.0;
    pub const SHIP_START_Y: f32 = 120.0;
    pub const SHIP_START_ANGLE: f32 = -std::f32::consts::FRAC_PI_2;

    /// Ship wraparound: crossing a bound shifts by a canvas-sized offset
    pub const SHIP_WRAP_MIN_X: f32 = -30.0;
    pub const SHIP_WRAP_MAX_X: f32 = 350.0;
    pub const SHIP_WRAP_MIN_Y: f32 = -30.0;
    pub const SHIP_WRAP_MAX_Y: f32 = 270.0;
    pub const SHIP_WRAP_SPAN_X: f32 = 400.0;
    pub const SHIP_WRAP_SPAN_Y: f32 = 320.0;

    /// Asteroid wraparound: crossing a bound resets to the opposite edge
    pub const ASTEROID_WRAP_MIN: f32 = -50.0;
    pub const ASTEROID_WRAP_MAX_X: f32 = 320.0;
    pub const ASTEROID_WRAP_MAX_Y: f32 = 240.0;

    /// Asteroid sizes (side of the bounding square)
    pub const BIG_SIZE: u8 = 40;
    pub const MID_SIZE: u8 = 30;
    pub const SMALL_SIZE: u8 = 15;

    /// Asteroid generation
    pub const ASTEROID_PERIOD: u16 = 64;
    pub const ASTEROID_SPAWN_X: f32 = -30.0;
    pub const ASTEROID_SPAWN_Y: f32 = -30.0;
    pub const BIG_SPEED: f32 = 3.0;
    pub const SPLIT_SPEED: f32 = 5.0;
    /// Budget units one Big reserves: its four Small descendants
    pub const BIG_BUDGET: u16 = 4;

    /// Projectiles
    pub const BULLET_SPEED: f32 = 10.0;
    pub const DEBRIS_PER_KILL: usize = 5;
    pub const DEBRIS_SPEED_X: f32 = 5.0;
    pub const DEBRIS_SPEED_Y: f32 = 10.0;

    /// Ship wreckage
    pub const WRECKAGE_FRAGMENTS: usize = 4;
    pub const WRECKAGE_LENGTH: f32 = 10.0;
    pub const WRECKAGE_SPEED: f32 = 2.0;
    pub const WRECKAGE_LIFE: u8 = 16;

    /// Life cycle
    pub const INVINCIBILITY_TICKS: u16 = 32;
    pub const RESPAWN_TICKS: u16 = 32;
    pub const DEATH_PENALTY: u32 = 5;

    /// Score readout
    pub const SCORE_X: i32 = 10;
    pub const SCORE_Y: i32 = 10;
    pub const SCORE_FORMAT: &str = "Score: {}";
}

/// Unit vector for a heading angle
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    heading(theta) * r
}

/// Whether an integer point lies on the visible canvas (inclusive bounds)
#[inline]
pub fn on_canvas(x: i32, y: i32) -> bool {
    (0..=consts::CANVAS_WIDTH).contains(&x) && (0..=consts::CANVAS_HEIGHT).contains(&y)
}
