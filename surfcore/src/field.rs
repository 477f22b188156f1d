//! Audio-reactive particle field.
//!
//! Each tick applies four additive forces to every particle — spectrum
//! push, held-pointer attraction, ambient wave drift, surfer proximity —
//! then integrates with drag and reflects off the viewport edges.

use crate::input::InputState;
use crate::spectrum::Spectrum;
use egui::{Pos2, Vec2};
use rand::Rng;

/// Fraction of velocity retained per tick (drag).
const DAMPING: f32 = 0.95;
/// Velocity kept, and inverted, when a particle crosses an edge.
const BOUNCE_DAMPING: f32 = -0.8;
/// Upward push per unit of spectrum magnitude.
const AUDIO_STRENGTH: f32 = 0.5;
/// Pointer attraction radius (exclusive) and strength.
const POINTER_RADIUS: f32 = 100.0;
const POINTER_STRENGTH: f32 = 0.5;
/// Surfer interaction radius (exclusive) and strength.
const SURFER_RADIUS: f32 = 50.0;
const SURFER_STRENGTH: f32 = 0.3;
/// Ambient wave field: spatial frequency, amplitude, per-tick phase step.
const WAVE_SCALE: f32 = 0.02;
const WAVE_AMPLITUDE: f32 = 0.1;
const WAVE_PHASE_STEP: f32 = 0.05;
/// Particle radius range, drawn once at creation.
const RADIUS_MIN: f32 = 2.0;
const RADIUS_MAX: f32 = 5.0;
/// Per-tick geometric decay of the audio-reactivity scalar.
const ENERGY_DECAY: f32 = 0.95;

/// One ambient particle.
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Pos2,
    pub vel: Vec2,
    acc: Vec2,
    pub radius: f32,
    /// Audio-reactivity scalar; drives glow intensity when rendering.
    /// Raised to the audio force magnitude while a feed is active, decays
    /// geometrically otherwise.
    pub energy: f32,
}

impl Particle {
    fn new(pos: Pos2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            radius,
            energy: 0.0,
        }
    }
}

/// The full particle set plus the ambient wave phase. Particles are
/// created in a batch at reset time and never destroyed individually.
pub struct ParticleField {
    particles: Vec<Particle>,
    phase: f32,
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleField {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            phase: 0.0,
        }
    }

    /// Discard all particles and scatter `count` new ones uniformly over
    /// the viewport.
    pub fn reset(&mut self, count: usize, viewport: Vec2) {
        self.reset_with(&mut rand::thread_rng(), count, viewport);
    }

    /// Seeded variant of [`reset`](Self::reset), used by tests.
    pub fn reset_with(&mut self, rng: &mut impl Rng, count: usize, viewport: Vec2) {
        let w = viewport.x.max(0.0);
        let h = viewport.y.max(0.0);
        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let pos = Pos2::new(
                if w > 0.0 { rng.gen_range(0.0..w) } else { 0.0 },
                if h > 0.0 { rng.gen_range(0.0..h) } else { 0.0 },
            );
            let radius = rng.gen_range(RADIUS_MIN..RADIUS_MAX);
            self.particles.push(Particle::new(pos, radius));
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Advance every particle one fixed step.
    ///
    /// `spectrum` is `None` when no audio feed is active; that source then
    /// simply contributes no force. A zero viewport degrades to trivial
    /// motion rather than erroring.
    pub fn tick(
        &mut self,
        viewport: Vec2,
        input: &InputState,
        surfer_pos: Pos2,
        spectrum: Option<&Spectrum>,
    ) {
        let pointer = input.active_pointer();
        for p in &mut self.particles {
            if let Some(spectrum) = spectrum {
                let (force, magnitude) = audio_force(p.pos, viewport.x, spectrum);
                p.acc += force;
                p.energy = magnitude;
            }
            if let Some(pointer) = pointer {
                p.acc += proximity_force(p.pos, pointer, POINTER_RADIUS, POINTER_STRENGTH);
            }
            p.acc += wave_force(p.pos, self.phase);
            p.acc += proximity_force(p.pos, surfer_pos, SURFER_RADIUS, SURFER_STRENGTH);

            p.vel = (p.vel + p.acc) * DAMPING;
            p.pos += p.vel;
            p.acc = Vec2::ZERO;
            p.energy *= ENERGY_DECAY;

            reflect(p, viewport);
        }
        self.phase += WAVE_PHASE_STEP;
    }
}

/// Straight-up push from the spectrum band under the particle. Returns
/// the force and the band magnitude (which becomes the particle energy).
fn audio_force(pos: Pos2, width: f32, spectrum: &Spectrum) -> (Vec2, f32) {
    if width <= 0.0 {
        return (Vec2::ZERO, 0.0);
    }
    let magnitude = spectrum.band_for_x(pos.x, width) * AUDIO_STRENGTH;
    (Vec2::new(0.0, -magnitude), magnitude)
}

/// Pull toward `target`, fading linearly to zero at `radius`. The radius
/// is exclusive: at exactly `radius` the force is zero. Shared by the
/// pointer and the surfer fields.
fn proximity_force(pos: Pos2, target: Pos2, radius: f32, strength: f32) -> Vec2 {
    let to_target = target - pos;
    let dist = to_target.length();
    if dist < radius {
        to_target * ((1.0 - dist / radius) * strength)
    } else {
        Vec2::ZERO
    }
}

/// Low-amplitude sinusoidal drift, independent of audio and input.
fn wave_force(pos: Pos2, phase: f32) -> Vec2 {
    Vec2::new(
        (pos.y * WAVE_SCALE + phase).sin() * WAVE_AMPLITUDE,
        (pos.x * WAVE_SCALE + phase).cos() * WAVE_AMPLITUDE,
    )
}

/// Inelastic bounce: clamp to the edge and invert+damp the velocity
/// component that crossed it.
fn reflect(p: &mut Particle, viewport: Vec2) {
    let w = viewport.x.max(0.0);
    let h = viewport.y.max(0.0);
    if p.pos.x < 0.0 {
        p.pos.x = 0.0;
        p.vel.x *= BOUNCE_DAMPING;
    } else if p.pos.x > w {
        p.pos.x = w;
        p.vel.x *= BOUNCE_DAMPING;
    }
    if p.pos.y < 0.0 {
        p.pos.y = 0.0;
        p.vel.y *= BOUNCE_DAMPING;
    } else if p.pos.y > h {
        p.pos.y = h;
        p.vel.y *= BOUNCE_DAMPING;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::BAND_COUNT;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spectrum_with_first_band() -> Spectrum {
        let mut raw = [0.0; BAND_COUNT];
        raw[0] = 1.0;
        Spectrum::from_bands(raw)
    }

    #[test]
    fn test_audio_force_first_band_full_push() {
        // Particle at x=0 of a width-100 viewport with [1.0, 0, 0, ...]
        // receives the full upward push before damping.
        let spectrum = spectrum_with_first_band();
        let (force, magnitude) = audio_force(Pos2::new(0.0, 50.0), 100.0, &spectrum);
        assert_eq!(force, Vec2::new(0.0, -0.5));
        assert_eq!(magnitude, 0.5);
    }

    #[test]
    fn test_audio_force_far_band_is_zero() {
        let spectrum = spectrum_with_first_band();
        let (force, magnitude) = audio_force(Pos2::new(100.0, 50.0), 100.0, &spectrum);
        assert_eq!(force, Vec2::ZERO);
        assert_eq!(magnitude, 0.0);
    }

    #[test]
    fn test_audio_force_zero_width_degrades() {
        let spectrum = spectrum_with_first_band();
        let (force, _) = audio_force(Pos2::new(10.0, 10.0), 0.0, &spectrum);
        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn test_pointer_force_boundary_exclusive() {
        let pos = Pos2::new(0.0, 0.0);
        // At exactly the interaction radius the force is zero
        let at_radius = proximity_force(pos, Pos2::new(100.0, 0.0), 100.0, 0.5);
        assert_eq!(at_radius, Vec2::ZERO);
        // At half the radius the raw vector is scaled by (1-0.5)*0.5
        let at_half = proximity_force(pos, Pos2::new(50.0, 0.0), 100.0, 0.5);
        assert_eq!(at_half, Vec2::new(12.5, 0.0));
    }

    #[test]
    fn test_proximity_force_at_target_is_finite() {
        // Coincident positions must not divide by zero
        let force = proximity_force(Pos2::new(5.0, 5.0), Pos2::new(5.0, 5.0), 50.0, 0.3);
        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn test_wave_force_at_origin() {
        let force = wave_force(Pos2::new(0.0, 0.0), 0.0);
        assert_eq!(force, Vec2::new(0.0, 0.1));
    }

    #[test]
    fn test_reflect_clamps_and_inverts() {
        let mut p = Particle::new(Pos2::new(-5.0, 10.0), 3.0);
        p.vel = Vec2::new(-2.0, 1.0);
        reflect(&mut p, Vec2::new(100.0, 100.0));
        assert_eq!(p.pos, Pos2::new(0.0, 10.0));
        assert!((p.vel.x - 1.6).abs() < 1e-6);
        assert_eq!(p.vel.y, 1.0);

        let mut p = Particle::new(Pos2::new(50.0, 120.0), 3.0);
        p.vel = Vec2::new(0.0, 3.0);
        reflect(&mut p, Vec2::new(100.0, 100.0));
        assert_eq!(p.pos, Pos2::new(50.0, 100.0));
        assert!((p.vel.y + 2.4).abs() < 1e-6);
    }

    #[test]
    fn test_reset_scatters_inside_viewport() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut field = ParticleField::new();
        let viewport = Vec2::new(320.0, 240.0);
        field.reset_with(&mut rng, 100, viewport);
        assert_eq!(field.len(), 100);
        for p in field.particles() {
            assert!(p.pos.x >= 0.0 && p.pos.x <= viewport.x);
            assert!(p.pos.y >= 0.0 && p.pos.y <= viewport.y);
            assert!(p.radius >= 2.0 && p.radius < 5.0);
        }
    }

    #[test]
    fn test_reset_discards_previous_batch() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut field = ParticleField::new();
        field.reset_with(&mut rng, 50, Vec2::new(100.0, 100.0));
        field.reset_with(&mut rng, 20, Vec2::new(100.0, 100.0));
        assert_eq!(field.len(), 20);
    }

    #[test]
    fn test_empty_field_tick_is_a_no_op() {
        let mut field = ParticleField::new();
        field.reset(0, Vec2::new(100.0, 100.0));
        assert!(field.is_empty());
        let input = InputState::new();
        field.tick(Vec2::new(100.0, 100.0), &input, Pos2::new(50.0, 50.0), None);
        assert!(field.is_empty());
    }

    #[test]
    fn test_positions_stay_in_bounds_under_all_forces() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut field = ParticleField::new();
        let viewport = Vec2::new(200.0, 150.0);
        field.reset_with(&mut rng, 40, viewport);

        let mut input = InputState::new();
        input.set_pointer(Some(Pos2::new(100.0, 75.0)));
        input.set_pointer_pressed(true);
        let spectrum = Spectrum::from_bands([1.0; BAND_COUNT]);

        for _ in 0..300 {
            field.tick(viewport, &input, Pos2::new(100.0, 75.0), Some(&spectrum));
            for p in field.particles() {
                assert!(p.pos.x >= 0.0 && p.pos.x <= viewport.x, "x out of bounds: {}", p.pos.x);
                assert!(p.pos.y >= 0.0 && p.pos.y <= viewport.y, "y out of bounds: {}", p.pos.y);
                assert!(p.vel.x.is_finite() && p.vel.y.is_finite());
            }
        }
    }

    #[test]
    fn test_energy_rises_with_audio_and_decays_in_silence() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = ParticleField::new();
        let viewport = Vec2::new(100.0, 100.0);
        field.reset_with(&mut rng, 5, viewport);
        let input = InputState::new();
        let spectrum = Spectrum::from_bands([1.0; BAND_COUNT]);

        field.tick(viewport, &input, Pos2::new(50.0, 50.0), Some(&spectrum));
        // Set to 0.5 by the audio force, then one decay step
        for p in field.particles() {
            assert!((p.energy - 0.5 * 0.95).abs() < 1e-6);
        }

        let energy_before: Vec<f32> = field.particles().iter().map(|p| p.energy).collect();
        field.tick(viewport, &input, Pos2::new(50.0, 50.0), None);
        for (p, before) in field.particles().iter().zip(energy_before) {
            assert!((p.energy - before * 0.95).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_viewport_never_panics() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ParticleField::new();
        field.reset_with(&mut rng, 10, Vec2::ZERO);
        let input = InputState::new();
        for _ in 0..10 {
            field.tick(Vec2::ZERO, &input, Pos2::ZERO, None);
        }
        for p in field.particles() {
            assert_eq!(p.pos, Pos2::ZERO);
        }
    }
}
