//! Button input
//!
//! Raw button levels come from the board through [`ButtonLevels`]. The
//! [`Switches`] reader turns them into the queries the game asks each tick:
//! an edge-triggered fire press and level-triggered turn and thrust.
//!
//! Each button keeps its own press latch, so pressing fire while another
//! button is already down is still detected.

use serde::{Deserialize, Serialize};

/// Buttons on the five-way pad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    /// Centre
    Fire,
    /// West
    Left,
    /// East
    Right,
    /// North
    Thrust,
}

impl Button {
    pub const ALL: [Button; 4] = [Button::Fire, Button::Left, Button::Right, Button::Thrust];

    fn index(self) -> usize {
        match self {
            Button::Fire => 0,
            Button::Left => 1,
            Button::Right => 2,
            Button::Thrust => 3,
        }
    }
}

/// Raw, undebounced button levels
pub trait ButtonLevels {
    fn is_down(&self, button: Button) -> bool;
}

/// The queries a tick makes of the player's controls
pub trait InputSource {
    /// True once per press
    fn fire_pressed(&mut self) -> bool;
    fn turn_left_held(&mut self) -> bool;
    fn turn_right_held(&mut self) -> bool;
    fn thrust_held(&mut self) -> bool;
}

/// Plain button levels, set by whatever is pretending to be the pad
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState {
    pub fire: bool,
    pub left: bool,
    pub right: bool,
    pub thrust: bool,
}

impl ButtonState {
    pub fn set(&mut self, button: Button, down: bool) {
        match button {
            Button::Fire => self.fire = down,
            Button::Left => self.left = down,
            Button::Right => self.right = down,
            Button::Thrust => self.thrust = down,
        }
    }
}

impl ButtonLevels for ButtonState {
    fn is_down(&self, button: Button) -> bool {
        match button {
            Button::Fire => self.fire,
            Button::Left => self.left,
            Button::Right => self.right,
            Button::Thrust => self.thrust,
        }
    }
}

/// Debounced reader over raw levels
#[derive(Debug, Clone, Default)]
pub struct Switches<L> {
    levels: L,
    latched: [bool; 4],
}

impl<L: ButtonLevels> Switches<L> {
    pub fn new(levels: L) -> Self {
        Self {
            levels,
            latched: [false; 4],
        }
    }

    pub fn levels_mut(&mut self) -> &mut L {
        &mut self.levels
    }

    /// Edge query: true on the first poll that sees `button` down, then
    /// false until it has been seen released
    pub fn pressed(&mut self, button: Button) -> bool {
        let down = self.levels.is_down(button);
        let latch = &mut self.latched[button.index()];
        if down && !*latch {
            *latch = true;
            true
        } else {
            if !down {
                *latch = false;
            }
            false
        }
    }

    /// Level query
    pub fn held(&self, button: Button) -> bool {
        self.levels.is_down(button)
    }
}

impl<L: ButtonLevels> InputSource for Switches<L> {
    fn fire_pressed(&mut self) -> bool {
        self.pressed(Button::Fire)
    }

    fn turn_left_held(&mut self) -> bool {
        self.held(Button::Left)
    }

    fn turn_right_held(&mut self) -> bool {
        self.held(Button::Right)
    }

    fn thrust_held(&mut self) -> bool {
        self.held(Button::Thrust)
    }
}
