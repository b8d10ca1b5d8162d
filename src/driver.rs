//! Tick driver
//!
//! A periodic timer raises the [`TimerLine`]; the driver services it by
//! running one complete tick: sample input, simulate, resolve collisions,
//! render. The line holds a single pending flag like an interrupt flag. If
//! the timer fires while a tick is still running, the request is deferred
//! and serviced as soon as that tick finishes. Further fires during the same
//! tick are absorbed into that one pending request, so an overrun shows up
//! as drift rather than a burst of catch-up ticks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::display::Display;
use crate::input::{ButtonLevels, Switches};
use crate::renderer::DiffRenderer;
use crate::sim::{CollisionReport, TickInput, World, tick};

/// What happened to a timer fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerFire {
    /// No tick running; the request will be serviced on the next poll
    Scheduled,
    /// A tick is running; the request waits until it finishes
    Deferred,
}

/// Pending-tick flag shared between the timer and the driver
#[derive(Debug, Default)]
pub struct TimerLine {
    pending: AtomicBool,
    in_tick: AtomicBool,
    deferred: AtomicU32,
}

impl TimerLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the periodic timer
    pub fn fire(&self) -> TimerFire {
        self.pending.store(true, Ordering::Release);
        if self.in_tick.load(Ordering::Acquire) {
            let count = self.deferred.fetch_add(1, Ordering::Relaxed) + 1;
            log::warn!("timer fired during a running tick, deferred ({count} so far)");
            TimerFire::Deferred
        } else {
            TimerFire::Scheduled
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub fn in_tick(&self) -> bool {
        self.in_tick.load(Ordering::Acquire)
    }

    /// Fires that arrived while a tick was running
    pub fn deferred_count(&self) -> u32 {
        self.deferred.load(Ordering::Relaxed)
    }

    fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Mark a tick as running until the guard drops; `None` if one already is
    fn enter(&self) -> Option<TickGuard<'_>> {
        self.in_tick
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TickGuard { line: self })
    }
}

struct TickGuard<'a> {
    line: &'a TimerLine,
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.line.in_tick.store(false, Ordering::Release);
    }
}

/// Owns the world, the renderer and the collaborators, and runs ticks
pub struct TickDriver<D, L> {
    world: World,
    renderer: DiffRenderer,
    display: D,
    input: Switches<L>,
    line: Arc<TimerLine>,
}

impl<D: Display, L: ButtonLevels> TickDriver<D, L> {
    /// Power-on: fresh world, blank screen
    pub fn new(seed: u64, mut display: D, levels: L) -> Self {
        let mut renderer = DiffRenderer::new();
        renderer.reset(&mut display);
        log::info!("tick driver started with seed {seed}");
        Self {
            world: World::new(seed),
            renderer,
            display,
            input: Switches::new(levels),
            line: Arc::new(TimerLine::new()),
        }
    }

    /// Handle for the timer side
    pub fn line(&self) -> Arc<TimerLine> {
        Arc::clone(&self.line)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn levels_mut(&mut self) -> &mut L {
        self.input.levels_mut()
    }

    /// Run one tick if the timer has asked for one. Returns whether a tick ran.
    ///
    /// The request is consumed before the tick is marked as running, so a
    /// fire landing in between is scheduled for the next poll, not deferred.
    pub fn service(&mut self) -> bool {
        let line = Arc::clone(&self.line);
        if !line.take_pending() {
            return false;
        }
        let Some(_guard) = line.enter() else {
            line.raise();
            log::warn!("service called while a tick is running");
            return false;
        };
        self.advance_one_tick();
        true
    }

    /// Input, simulation, collisions, rendering, in that order
    pub fn advance_one_tick(&mut self) -> CollisionReport {
        let input = TickInput::sample(&mut self.input);
        let report = tick(&mut self.world, &input);
        self.renderer.render(&self.world, &mut self.display);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Color, RecordingDisplay};
    use crate::input::ButtonState;

    /// Display that fires the timer from inside a tick, as if rendering overran
    struct SlowDisplay {
        line: Option<Arc<TimerLine>>,
        fires_per_tick: u32,
        outcomes: Vec<TimerFire>,
    }

    impl Display for SlowDisplay {
        fn draw_pixel(&mut self, _x: i32, _y: i32, _color: Color) {}
        fn draw_line(&mut self, _x0: i32, _y0: i32, _x1: i32, _y1: i32, _color: Color) {}
        fn draw_outline_rectangle(&mut self, _x: i32, _y: i32, _w: i32, _h: i32, _color: Color) {}
        fn clear_screen(&mut self) {}
        fn display_text(&mut self, _x: i32, _y: i32, _format: &str, _value: u32) {
            if let Some(line) = &self.line {
                for _ in 0..self.fires_per_tick {
                    self.outcomes.push(line.fire());
                }
            }
        }
    }

    #[test]
    fn test_service_runs_only_when_pending() {
        let mut driver = TickDriver::new(1, RecordingDisplay::new(), ButtonState::default());
        assert_eq!(driver.display().commands, vec![crate::display::DrawCommand::Clear]);
        assert!(!driver.service());
        assert_eq!(driver.world().tick, 0);

        assert_eq!(driver.line().fire(), TimerFire::Scheduled);
        assert!(driver.service());
        assert_eq!(driver.world().tick, 1);
        assert!(!driver.service());
    }

    #[test]
    fn test_fires_between_ticks_are_never_counted_as_deferred() {
        let mut driver = TickDriver::new(1, RecordingDisplay::new(), ButtonState::default());
        let line = driver.line();
        for _ in 0..5 {
            assert_eq!(line.fire(), TimerFire::Scheduled);
            assert!(driver.service());
            assert!(!line.in_tick());
            assert!(!line.is_pending());
        }
        assert_eq!(line.deferred_count(), 0);
        assert_eq!(driver.world().tick, 5);
    }

    #[test]
    fn test_fire_during_tick_is_deferred_once() {
        let display = SlowDisplay {
            line: None,
            fires_per_tick: 3,
            outcomes: Vec::new(),
        };
        let mut driver = TickDriver::new(1, display, ButtonState::default());
        let line = driver.line();
        driver.display_mut().line = Some(Arc::clone(&line));

        line.fire();
        assert!(driver.service());
        assert_eq!(driver.display().outcomes, vec![TimerFire::Deferred; 3]);
        assert_eq!(line.deferred_count(), 3);
        assert!(!line.in_tick());

        // Three overrun fires leave exactly one tick pending
        assert!(line.is_pending());
        driver.display_mut().line = None;
        assert!(driver.service());
        assert!(!driver.service());
        assert_eq!(driver.world().tick, 2);
    }

    #[test]
    fn test_input_reaches_the_world() {
        let mut driver = TickDriver::new(1, RecordingDisplay::new(), ButtonState::default());
        driver.levels_mut().fire = true;
        let report = driver.advance_one_tick();
        assert_eq!(report, CollisionReport::default());
        assert_eq!(driver.world().bullets.len(), 1);

        // Still held: no second shot
        driver.advance_one_tick();
        assert_eq!(driver.world().bullets.len(), 1);

        driver.levels_mut().fire = false;
        driver.advance_one_tick();
        driver.levels_mut().fire = true;
        driver.advance_one_tick();
        assert_eq!(driver.world().bullets.len(), 2);
    }
}
