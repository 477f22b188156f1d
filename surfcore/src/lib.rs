//! surfcore — headless visualization core for soundsurf
//!
//! The particle field, the surfer, the input snapshot, and the spectrum
//! feed are plain state advanced by a fixed-step clock. Nothing here
//! touches a display, a timer, or an audio device, so the whole
//! simulation can be driven and asserted from tests.

pub mod clock;
pub mod field;
pub mod input;
pub mod spectrum;
pub mod storage;
pub mod surfer;

pub use clock::TickClock;
pub use field::ParticleField;
pub use input::{Direction, HeldKeys, InputState};
pub use spectrum::{Silence, Spectrum, SpectrumAnalyzer, SpectrumSource};
pub use surfer::Surfer;
