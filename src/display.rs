//! Display primitive capability
//!
//! The engine draws through a handful of primitives and never reads pixels
//! back. Clipping is the display's job. Two host implementations are
//! provided: a command recorder for sequencing checks and a rasterising
//! canvas for checking what is actually left on screen.

use serde::{Deserialize, Serialize};

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// The fixed palette; discriminants are the RGB565 values sent to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum Color {
    /// Erase colour
    Background = 0x0000,
    Foreground = 0xFFFF,
    /// Tint for the invincible ship
    Dimmed = 0x8410,
}

/// Drawing primitives the engine needs from a display
pub trait Display {
    fn draw_pixel(&mut self, x: i32, y: i32, color: Color);
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color);
    fn draw_outline_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color);
    fn clear_screen(&mut self);
    /// Print `format` at (x, y) with its `{}` placeholder replaced by `value`,
    /// overwriting whatever text was there
    fn display_text(&mut self, x: i32, y: i32, format: &str, value: u32);
}

/// One recorded display call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawCommand {
    Pixel {
        x: i32,
        y: i32,
        color: Color,
    },
    Line {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Color,
    },
    Rect {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Color,
    },
    Clear,
    Text {
        x: i32,
        y: i32,
        text: String,
    },
}

impl DrawCommand {
    pub fn color(&self) -> Option<Color> {
        match self {
            DrawCommand::Pixel { color, .. }
            | DrawCommand::Line { color, .. }
            | DrawCommand::Rect { color, .. } => Some(*color),
            DrawCommand::Clear | DrawCommand::Text { .. } => None,
        }
    }

    pub fn is_erase(&self) -> bool {
        self.color() == Some(Color::Background)
    }
}

/// Display that records every call in order
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    pub commands: Vec<DrawCommand>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand over everything recorded so far
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Display for RecordingDisplay {
    fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.commands.push(DrawCommand::Pixel { x, y, color });
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        self.commands.push(DrawCommand::Line {
            x0,
            y0,
            x1,
            y1,
            color,
        });
    }

    fn draw_outline_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn clear_screen(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn display_text(&mut self, x: i32, y: i32, format: &str, value: u32) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: format.replacen("{}", &value.to_string(), 1),
        });
    }
}

/// Software canvas that rasterises primitives the way the panel does
///
/// Lines step along the major axis; pixels off the canvas are clipped.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: i32,
    height: i32,
    pixels: Vec<Color>,
    /// Last text printed, keyed by position
    pub texts: Vec<((i32, i32), String)>,
}

impl Default for PixelCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelCanvas {
    pub fn new() -> Self {
        let (width, height) = (CANVAS_WIDTH, CANVAS_HEIGHT);
        Self {
            width,
            height,
            pixels: vec![Color::Background; (width * height) as usize],
            texts: Vec::new(),
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Coordinates of every non-background pixel
    pub fn lit(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != Color::Background)
            .map(|(i, _)| (i as i32 % self.width, i as i32 / self.width))
    }

    pub fn lit_count(&self) -> usize {
        self.lit().count()
    }

    pub fn text_at(&self, x: i32, y: i32) -> Option<&str> {
        self.texts
            .iter()
            .find(|(pos, _)| *pos == (x, y))
            .map(|(_, t)| t.as_str())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        ((0..self.width).contains(&x) && (0..self.height).contains(&y))
            .then(|| (y * self.width + x) as usize)
    }

    fn plot(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }
}

impl Display for PixelCanvas {
    fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.plot(x, y, color);
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let (dx, dy) = (x1 - x0, y1 - y0);
        let steps = dx.abs().max(dy.abs());
        if steps == 0 {
            self.plot(x0, y0, color);
            return;
        }
        let (step_x, step_y) = (dx as f32 / steps as f32, dy as f32 / steps as f32);
        for i in 0..=steps {
            let x = x0 as f32 + step_x * i as f32;
            let y = y0 as f32 + step_y * i as f32;
            self.plot(x.round() as i32, y.round() as i32, color);
        }
    }

    fn draw_outline_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        for i in 0..=width {
            self.plot(x + i, y, color);
            self.plot(x + i, y + height, color);
        }
        for j in 0..=height {
            self.plot(x, y + j, color);
            self.plot(x + width, y + j, color);
        }
    }

    fn clear_screen(&mut self) {
        self.pixels.fill(Color::Background);
        self.texts.clear();
    }

    fn display_text(&mut self, x: i32, y: i32, format: &str, value: u32) {
        let text = format.replacen("{}", &value.to_string(), 1);
        match self.texts.iter_mut().find(|(pos, _)| *pos == (x, y)) {
            Some((_, existing)) => *existing = text,
            None => self.texts.push(((x, y), text)),
        }
    }
}
