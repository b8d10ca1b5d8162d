//! Primitive generation for entities
//!
//! Float geometry is truncated to whole pixels here, once, so that the erase
//! pass of the next tick hits exactly the pixels the draw pass lit.

use glam::Vec2;

use crate::display::{Color, Display};
use crate::sim::{Asteroid, FLAME_LINES, Fragment, HULL_LINES, Ship};

/// A line in pixel coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Line {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Line {
    pub fn between(a: Vec2, b: Vec2) -> Self {
        Self {
            x0: a.x as i32,
            y0: a.y as i32,
            x1: b.x as i32,
            y1: b.y as i32,
        }
    }

    pub fn draw(&self, display: &mut impl Display, color: Color) {
        display.draw_line(self.x0, self.y0, self.x1, self.y1, color);
    }
}

/// An outline square in pixel coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Square {
    pub x: i32,
    pub y: i32,
    pub side: i32,
}

impl Square {
    pub fn draw(&self, display: &mut impl Display, color: Color) {
        display.draw_outline_rectangle(self.x, self.y, self.side, self.side, color);
    }
}

pub fn hull_lines(ship: &Ship) -> [Line; 3] {
    HULL_LINES.map(|(a, b)| Line::between(ship.points[a], ship.points[b]))
}

pub fn flame_lines(ship: &Ship) -> [Line; 2] {
    FLAME_LINES.map(|(a, b)| Line::between(ship.points[a], ship.points[b]))
}

pub fn fragment_line(fragment: &Fragment) -> Line {
    Line::between(fragment.ends[0], fragment.ends[1])
}

/// `None` for an empty slot
pub fn asteroid_square(rock: &Asteroid) -> Option<Square> {
    let side = rock.size.side() as i32;
    (side > 0).then(|| Square {
        x: rock.origin.x as i32,
        y: rock.origin.y as i32,
        side,
    })
}
