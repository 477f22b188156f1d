//! The player-controlled surfer.
//!
//! Same integration law as the particles, but the surfer is clamped at
//! the viewport edges instead of bounced, and keeps a short trail of
//! recent positions for rendering.

use crate::input::HeldKeys;
use egui::{Pos2, Vec2};
use std::collections::VecDeque;

/// Thrust per tick while a direction key is held.
const THRUST: f32 = 0.2;
/// Fraction of velocity retained per tick.
const DAMPING: f32 = 0.95;
/// Lean angle while steering left or right, in degrees.
const LEAN_DEGREES: f32 = 30.0;
/// Maximum number of trail positions kept for rendering.
pub const TRAIL_LEN: usize = 10;
/// Body radius; also the margin kept from the viewport edges.
pub const RADIUS: f32 = 12.0;

pub struct Surfer {
    pub pos: Pos2,
    pub vel: Vec2,
    acc: Vec2,
    /// Display lean in degrees: -30, 0, or +30. Derived from the held
    /// keys each tick — not a mode.
    pub heading: f32,
    trail: VecDeque<Pos2>,
}

impl Surfer {
    /// Create a surfer centered in the viewport.
    pub fn new(viewport: Vec2) -> Self {
        Self {
            pos: (viewport * 0.5).to_pos2(),
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            heading: 0.0,
            trail: VecDeque::with_capacity(TRAIL_LEN + 1),
        }
    }

    /// Re-center after a viewport resize, dropping motion and trail.
    pub fn reset(&mut self, viewport: Vec2) {
        *self = Self::new(viewport);
    }

    pub fn radius(&self) -> f32 {
        RADIUS
    }

    /// Recent positions, oldest first. Render oldest most transparent.
    pub fn trail(&self) -> impl Iterator<Item = Pos2> + '_ {
        self.trail.iter().copied()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Integrate one fixed step from the currently held keys.
    pub fn tick(&mut self, viewport: Vec2, held: HeldKeys) {
        self.acc = Vec2::ZERO;
        if held.up {
            self.acc.y -= THRUST;
        }
        if held.down {
            self.acc.y += THRUST;
        }
        self.heading = 0.0;
        if held.left {
            self.acc.x -= THRUST;
            self.heading = -LEAN_DEGREES;
        }
        if held.right {
            self.acc.x += THRUST;
            self.heading = LEAN_DEGREES;
        }

        self.vel = (self.vel + self.acc) * DAMPING;
        self.pos += self.vel;

        // Clamped, not bounced: the surfer stops at the edge. A viewport
        // smaller than the body pins it at the margin.
        self.pos.x = self.pos.x.clamp(RADIUS, (viewport.x - RADIUS).max(RADIUS));
        self.pos.y = self.pos.y.clamp(RADIUS, (viewport.y - RADIUS).max(RADIUS));

        self.trail.push_back(self.pos);
        if self.trail.len() > TRAIL_LEN {
            self.trail.pop_front();
        }
    }
}
