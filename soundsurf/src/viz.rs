//! The visualization view.
//!
//! Owns the particle field, the surfer, the input snapshot, and the tick
//! clock; per frame it maps egui events into the snapshot, runs the due
//! fixed steps, and paints the result with the egui painter.

use egui::{Color32, Event, Rect, Response, Sense, Stroke, Ui, Vec2};
use std::time::Instant;
use surfcore::clock::TICK_INTERVAL;
use surfcore::input::{Direction, InputState};
use surfcore::spectrum::Spectrum;
use surfcore::{ParticleField, Surfer, TickClock};

const BACKGROUND: Color32 = Color32::from_rgb(8, 10, 24);
const PARTICLE_COLOR: Color32 = Color32::from_rgb(120, 200, 255);
const SURFER_COLOR: Color32 = Color32::from_rgb(255, 210, 90);

pub struct VizView {
    field: ParticleField,
    surfer: Surfer,
    input: InputState,
    clock: TickClock,
    size: Vec2,
    particle_count: usize,
}

impl VizView {
    pub fn new(particle_count: usize) -> Self {
        Self {
            field: ParticleField::new(),
            surfer: Surfer::new(Vec2::ZERO),
            input: InputState::new(),
            clock: TickClock::new(),
            size: Vec2::ZERO,
            particle_count,
        }
    }

    pub fn set_particle_count(&mut self, count: usize) {
        if count != self.particle_count {
            self.particle_count = count;
            self.field.reset(count, self.size);
        }
    }

    /// Lay out, tick, and paint the visualization into the available
    /// space. `spectrum` is `None` while nothing is playing.
    pub fn show(&mut self, ui: &mut Ui, spectrum: Option<&Spectrum>) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        // A resize re-seeds the world synchronously.
        if rect.size() != self.size {
            self.size = rect.size();
            self.field.reset(self.particle_count, self.size);
            self.surfer.reset(self.size);
        }

        self.gather_input(ui, rect, &response);

        let steps = self.clock.steps(Instant::now());
        for _ in 0..steps {
            self.surfer.tick(self.size, self.input.held());
            self.field
                .tick(self.size, &self.input, self.surfer.pos, spectrum);
        }

        self.paint(ui, rect);

        // Keep the animation running at the simulation rate.
        ui.ctx().request_repaint_after(TICK_INTERVAL);
    }

    /// Record this frame's events into the snapshot. The tick reads the
    /// snapshot; it never touches egui input directly.
    fn gather_input(&mut self, ui: &Ui, rect: Rect, _response: &Response) {
        let focused = ui.input(|i| {
            for event in &i.events {
                if let Event::Key { key, pressed, .. } = event {
                    if let Some(dir) = Direction::from_key_name(key.name()) {
                        if *pressed {
                            self.input.press(dir);
                        } else {
                            self.input.release(dir);
                        }
                    }
                }
            }
            let pointer = i
                .pointer
                .latest_pos()
                .filter(|p| rect.contains(*p))
                .map(|p| (p - rect.min).to_pos2());
            self.input.set_pointer(pointer);
            self.input.set_pointer_pressed(i.pointer.primary_down());
            i.raw.focused
        });
        if !focused {
            // Don't let keys stick when the window loses focus
            self.input.release_all();
        }
    }

    fn paint(&self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKGROUND);
        let origin = rect.min.to_vec2();

        for p in self.field.particles() {
            let center = p.pos + origin;
            // Glow halo scales with the audio-reactivity scalar
            if p.energy > 0.01 {
                let alpha = (p.energy * 400.0).min(90.0) as u8;
                painter.circle_filled(
                    center,
                    p.radius * 2.5,
                    Color32::from_rgba_unmultiplied(
                        PARTICLE_COLOR.r(),
                        PARTICLE_COLOR.g(),
                        PARTICLE_COLOR.b(),
                        alpha,
                    ),
                );
            }
            painter.circle_filled(center, p.radius, PARTICLE_COLOR);
        }

        // Trail first so the body draws on top; oldest = most transparent
        let len = self.surfer.trail_len().max(1);
        for (i, pos) in self.surfer.trail().enumerate() {
            let alpha = ((i + 1) as f32 / len as f32 * 140.0) as u8;
            painter.circle_filled(
                pos + origin,
                4.0,
                Color32::from_rgba_unmultiplied(
                    SURFER_COLOR.r(),
                    SURFER_COLOR.g(),
                    SURFER_COLOR.b(),
                    alpha,
                ),
            );
        }

        self.paint_surfer(&painter, origin);
    }

    /// Board and body, rotated by the current lean.
    fn paint_surfer(&self, painter: &egui::Painter, origin: Vec2) {
        let center = self.surfer.pos + origin;
        let r = self.surfer.radius();
        let (sin, cos) = self.surfer.heading.to_radians().sin_cos();

        let along = Vec2::new(cos, sin) * (r * 1.4);
        painter.line_segment([center - along, center + along], Stroke::new(4.0, SURFER_COLOR));

        let up = Vec2::new(sin, -cos) * (r * 0.6);
        let body = center + up;
        painter.circle_filled(body, r * 0.45, SURFER_COLOR);

        // Face
        let eye = Vec2::new(cos, sin) * (r * 0.18);
        painter.circle_filled(body + eye, 1.5, BACKGROUND);
        painter.circle_filled(body - eye, 1.5, BACKGROUND);
    }
}
