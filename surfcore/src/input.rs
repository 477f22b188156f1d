//! Input snapshot for the visualization.
//!
//! Key and pointer events are recorded here through setters and read once
//! per tick, so a simulation step always observes a consistent snapshot
//! even if event delivery ever moves off the render thread.

use egui::Pos2;

/// Semantic movement key. Only these four are recognized; everything else
/// is dropped at the mapping layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Map a textual key identifier (W/A/S/D or the arrow key names, in
    /// either the DOM or the short spelling) to a direction. Unknown keys
    /// map to `None`.
    pub fn from_key_name(name: &str) -> Option<Direction> {
        match name {
            "w" | "W" | "ArrowUp" | "Up" => Some(Direction::Up),
            "s" | "S" | "ArrowDown" | "Down" => Some(Direction::Down),
            "a" | "A" | "ArrowLeft" | "Left" => Some(Direction::Left),
            "d" | "D" | "ArrowRight" | "Right" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Which movement keys are currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub fn is_empty(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }

    fn set(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }
}

/// Mutable input state owned by the visualization. Event handlers write
/// through the setters; the tick reads [`held`](Self::held) and
/// [`active_pointer`](Self::active_pointer) once per step.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HeldKeys,
    pointer: Option<Pos2>,
    pointer_pressed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, dir: Direction) {
        self.held.set(dir, true);
    }

    pub fn release(&mut self, dir: Direction) {
        self.held.set(dir, false);
    }

    /// Pointer position in viewport coordinates, `None` when the pointer
    /// is outside the viewport.
    pub fn set_pointer(&mut self, pos: Option<Pos2>) {
        self.pointer = pos;
    }

    pub fn set_pointer_pressed(&mut self, pressed: bool) {
        self.pointer_pressed = pressed;
    }

    /// Drop all held keys (e.g. when the view loses focus) so nothing
    /// sticks across a focus change.
    pub fn release_all(&mut self) {
        self.held = HeldKeys::default();
    }

    pub fn held(&self) -> HeldKeys {
        self.held
    }

    /// Pointer position while the primary button is down, else `None`.
    /// The pointer only exerts force on the field while held.
    pub fn active_pointer(&self) -> Option<Pos2> {
        if self.pointer_pressed {
            self.pointer
        } else {
            None
        }
    }
}
