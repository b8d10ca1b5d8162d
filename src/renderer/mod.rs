//! Diff renderer
//!
//! There is no frame buffer to redraw from, so every pass erases what the
//! previous tick drew (by drawing it again in the background colour) and then
//! draws the current state. One snapshot per entity class remembers what was
//! drawn.
//!
//! Passes run wreckage, debris, ship, bullets, asteroids. A class drawn later
//! may overdraw an earlier one; erasing never has to look at another class.

pub mod shapes;

use crate::consts::*;
use crate::display::{Color, Display};
use crate::sim::{Asteroid, Bullet, Debris, LifeState, OverflowPolicy, RingQueue, World};
use shapes::{Line, asteroid_square, flame_lines, fragment_line, hull_lines};

/// What the ship pass drew last
#[derive(Debug, Clone, Copy, PartialEq)]
struct ShipFrame {
    hull: [Line; 3],
    flame: Option<[Line; 2]>,
}

/// Renderer holding the previous frame of every entity class
#[derive(Debug, Clone)]
pub struct DiffRenderer {
    ship: Option<ShipFrame>,
    /// Flame is drawn on alternate ticks while thrusting
    flame_on: bool,
    bullets: RingQueue<Bullet, BULLET_SLOTS>,
    debris: RingQueue<Debris, DEBRIS_SLOTS>,
    asteroids: [Asteroid; MAX_ASTEROIDS],
    wreckage: Option<[Line; WRECKAGE_FRAGMENTS]>,
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffRenderer {
    pub fn new() -> Self {
        Self {
            ship: None,
            flame_on: false,
            bullets: RingQueue::new(OverflowPolicy::DropNewest),
            debris: RingQueue::new(OverflowPolicy::DropNewest),
            asteroids: [Asteroid::default(); MAX_ASTEROIDS],
            wreckage: None,
        }
    }

    /// Blank the screen and forget every snapshot
    pub fn reset(&mut self, display: &mut impl Display) {
        display.clear_screen();
        *self = Self::new();
    }

    /// Bring the screen from the previous frame to `world`
    pub fn render(&mut self, world: &World, display: &mut impl Display) {
        display.display_text(SCORE_X, SCORE_Y, SCORE_FORMAT, world.score.value());
        self.render_wreckage(world, display);
        self.render_debris(world, display);
        self.render_ship(world, display);
        self.render_bullets(world, display);
        self.render_asteroids(world, display);
    }

    fn render_wreckage(&mut self, world: &World, display: &mut impl Display) {
        if let Some(lines) = self.wreckage.take() {
            for line in &lines {
                line.draw(display, Color::Background);
            }
        }
        if !world.wreckage.is_active() {
            return;
        }
        let lines = world.wreckage.fragments.map(|f| fragment_line(&f));
        for line in &lines {
            line.draw(display, Color::Foreground);
        }
        self.wreckage = Some(lines);
    }

    fn render_debris(&mut self, world: &World, display: &mut impl Display) {
        for dot in self.debris.iter().filter(|d| !d.spent) {
            display.draw_pixel(dot.pos.x, dot.pos.y, Color::Background);
        }
        for dot in world.debris.iter().filter(|d| !d.spent) {
            display.draw_pixel(dot.pos.x, dot.pos.y, Color::Foreground);
        }
        self.debris = world.debris;
    }

    fn render_ship(&mut self, world: &World, display: &mut impl Display) {
        if let Some(last) = self.ship.take() {
            for line in last.hull.iter().chain(last.flame.iter().flatten()) {
                line.draw(display, Color::Background);
            }
        }

        let ship = &world.ship;
        if ship.life == LifeState::Dead {
            return;
        }

        let color = if ship.life == LifeState::Invincible {
            Color::Dimmed
        } else {
            Color::Foreground
        };
        let hull = hull_lines(ship);
        for line in &hull {
            line.draw(display, color);
        }

        let flame = if ship.thrusting && self.flame_on {
            self.flame_on = false;
            let flame = flame_lines(ship);
            for line in &flame {
                line.draw(display, color);
            }
            Some(flame)
        } else {
            self.flame_on = true;
            None
        };

        self.ship = Some(ShipFrame { hull, flame });
    }

    fn render_bullets(&mut self, world: &World, display: &mut impl Display) {
        for shot in self.bullets.iter().filter(|b| !b.spent) {
            display.draw_pixel(shot.pos.x, shot.pos.y, Color::Background);
        }
        for shot in world.bullets.iter().filter(|b| !b.spent) {
            display.draw_pixel(shot.pos.x, shot.pos.y, Color::Foreground);
        }
        self.bullets = world.bullets;
    }

    fn render_asteroids(&mut self, world: &World, display: &mut impl Display) {
        for square in self.asteroids.iter().filter_map(asteroid_square) {
            square.draw(display, Color::Background);
        }
        for square in world.asteroids.slots().iter().filter_map(asteroid_square) {
            square.draw(display, Color::Foreground);
        }
        self.asteroids = *world.asteroids.slots();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DrawCommand, PixelCanvas, RecordingDisplay};
    use crate::sim::{AsteroidSize, TickInput, tick};
    use glam::{IVec2, Vec2};
    use std::collections::HashSet;

    fn lines_of(commands: &[DrawCommand], color: Color) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { color: col, .. } if *col == color))
            .count()
    }

    #[test]
    fn test_score_is_drawn_first() {
        let world = World::new(1);
        let mut renderer = DiffRenderer::new();
        let mut display = RecordingDisplay::new();
        renderer.render(&world, &mut display);
        assert_eq!(
            display.commands[0],
            DrawCommand::Text {
                x: SCORE_X,
                y: SCORE_Y,
                text: "Score: 0".to_string()
            }
        );
    }

    #[test]
    fn test_erase_precedes_draw_with_previous_geometry() {
        let mut world = World::new(1);
        let mut renderer = DiffRenderer::new();
        let mut display = RecordingDisplay::new();
        renderer.render(&world, &mut display);
        let first = display.take();
        // Nothing to erase on the first frame; hull in the invincible tint
        assert!(first.iter().all(|c| !c.is_erase()));
        assert_eq!(lines_of(&first, Color::Dimmed), 3);

        let old_hull = hull_lines(&world.ship);
        world.ship.translate(Vec2::new(4.0, 0.0));
        renderer.render(&world, &mut display);
        let second = display.take();

        let erased: Vec<Line> = second
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line {
                    x0,
                    y0,
                    x1,
                    y1,
                    color: Color::Background,
                } => Some(Line {
                    x0: *x0,
                    y0: *y0,
                    x1: *x1,
                    y1: *y1,
                }),
                _ => None,
            })
            .collect();
        assert_eq!(erased, old_hull.to_vec());

        let first_draw = second
            .iter()
            .position(|c| c.color() == Some(Color::Dimmed))
            .unwrap();
        let last_erase = second.iter().rposition(|c| c.is_erase()).unwrap();
        assert!(last_erase < first_draw);
    }

    #[test]
    fn test_pass_order() {
        let mut world = World::new(1);
        world.ship.life = LifeState::Vincible;
        world.debris.push(Debris {
            pos: IVec2::new(5, 5),
            vel: IVec2::ZERO,
            spent: false,
        });
        world.bullets.push(Bullet {
            pos: IVec2::new(7, 7),
            vel: IVec2::ZERO,
            spent: false,
        });
        world.asteroids.insert(Asteroid::new(
            Vec2::new(50.0, 50.0),
            0.0,
            0.0,
            AsteroidSize::Big,
        ));
        world.wreckage =
            crate::sim::collision::scatter_wreckage(&mut world.rng, Vec2::new(90.0, 90.0));

        let mut renderer = DiffRenderer::new();
        let mut display = RecordingDisplay::new();
        renderer.render(&world, &mut display);

        let kinds: Vec<&str> = display
            .commands
            .iter()
            .map(|c| match c {
                DrawCommand::Text { .. } => "score",
                DrawCommand::Line { .. } if matches!(c, DrawCommand::Line { x0: 90, .. }) => {
                    "wreckage"
                }
                DrawCommand::Pixel { x: 5, .. } => "debris",
                DrawCommand::Line { .. } => "ship",
                DrawCommand::Pixel { .. } => "bullet",
                DrawCommand::Rect { .. } => "asteroid",
                DrawCommand::Clear => "clear",
            })
            .collect();
        let mut order = kinds.clone();
        order.dedup();
        assert_eq!(
            order,
            vec!["score", "wreckage", "debris", "ship", "bullet", "asteroid"]
        );
    }

    #[test]
    fn test_flame_blinks_while_thrusting() {
        let mut world = World::new(1);
        world.ship.thrusting = true;
        let mut renderer = DiffRenderer::new();
        let mut display = RecordingDisplay::new();

        let mut drawn = Vec::new();
        for _ in 0..4 {
            renderer.render(&world, &mut display);
            drawn.push(lines_of(&display.take(), Color::Dimmed));
        }
        // Hull only, hull plus flame, alternating
        assert_eq!(drawn, vec![3, 5, 3, 5]);
    }

    #[test]
    fn test_dead_ship_erased_once() {
        let mut world = World::new(1);
        let mut renderer = DiffRenderer::new();
        let mut display = RecordingDisplay::new();
        renderer.render(&world, &mut display);
        display.take();

        world.ship.life = LifeState::Dead;
        renderer.render(&world, &mut display);
        let frame = display.take();
        assert_eq!(lines_of(&frame, Color::Background), 3);
        assert_eq!(lines_of(&frame, Color::Dimmed), 0);

        renderer.render(&world, &mut display);
        assert_eq!(lines_of(&display.take(), Color::Background), 0);
    }

    #[test]
    fn test_vincible_ship_uses_foreground() {
        let mut world = World::new(1);
        world.ship.life = LifeState::Vincible;
        let mut renderer = DiffRenderer::new();
        let mut display = RecordingDisplay::new();
        renderer.render(&world, &mut display);
        assert_eq!(lines_of(&display.commands, Color::Foreground), 3);
    }

    #[test]
    fn test_reset_clears_screen_and_snapshots() {
        let world = World::new(1);
        let mut renderer = DiffRenderer::new();
        let mut display = RecordingDisplay::new();
        renderer.render(&world, &mut display);
        renderer.reset(&mut display);
        display.take();
        renderer.render(&world, &mut display);
        assert!(display.commands.iter().all(|c| !c.is_erase()));
    }

    /// Draw every primitive of the current state onto a blank canvas,
    /// flame included whenever the ship is thrusting
    fn expected_canvas(world: &World) -> PixelCanvas {
        let mut canvas = PixelCanvas::new();
        if world.wreckage.is_active() {
            for f in &world.wreckage.fragments {
                fragment_line(f).draw(&mut canvas, Color::Foreground);
            }
        }
        for d in world.debris.iter().filter(|d| !d.spent) {
            canvas.draw_pixel(d.pos.x, d.pos.y, Color::Foreground);
        }
        if world.ship.is_alive() {
            for line in hull_lines(&world.ship) {
                line.draw(&mut canvas, Color::Foreground);
            }
            if world.ship.thrusting {
                for line in flame_lines(&world.ship) {
                    line.draw(&mut canvas, Color::Foreground);
                }
            }
        }
        for b in world.bullets.iter().filter(|b| !b.spent) {
            canvas.draw_pixel(b.pos.x, b.pos.y, Color::Foreground);
        }
        for square in world.asteroids.slots().iter().filter_map(asteroid_square) {
            square.draw(&mut canvas, Color::Foreground);
        }
        canvas
    }

    #[test]
    fn test_no_stale_pixels_over_a_long_run() {
        let mut world = World::new(2024);
        let mut renderer = DiffRenderer::new();
        let mut screen = PixelCanvas::new();
        renderer.reset(&mut screen);

        for t in 0..900u32 {
            let input = TickInput {
                fire: t % 4 == 0,
                turn_left: t % 50 < 10,
                turn_right: (25..32).contains(&(t % 50)),
                thrust: t % 30 < 12,
            };
            tick(&mut world, &input);
            renderer.render(&world, &mut screen);

            let expected: HashSet<(i32, i32)> = expected_canvas(&world).lit().collect();
            for pixel in screen.lit() {
                assert!(expected.contains(&pixel), "tick {t}: stale pixel at {pixel:?}");
            }
        }
        assert_eq!(
            screen.text_at(SCORE_X, SCORE_Y),
            Some(format!("Score: {}", world.score.value()).as_str())
        );
        assert!(world.stats.asteroids_generated > 0);
    }
}
