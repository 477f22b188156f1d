//! Spectrum feed for the visualization.
//!
//! A [`Spectrum`] is one fixed-length frame of normalized frequency
//! magnitudes. Acquisition is pluggable: anything implementing
//! [`SpectrumSource`] can feed the field, and [`Silence`] is the honest
//! fallback when nothing is playing — an absent feed is silence, never
//! an error.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Number of frequency bands in a spectrum frame.
pub const BAND_COUNT: usize = 50;

/// One frame of non-negative magnitudes, max-scaled so the loudest band
/// is 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    bands: [f32; BAND_COUNT],
}

impl Spectrum {
    /// Normalize raw band magnitudes into a frame. An all-zero input stays
    /// all-zero — dividing by the zero maximum would produce NaN.
    pub fn from_bands(mut bands: [f32; BAND_COUNT]) -> Self {
        let max = bands.iter().fold(0.0f32, |m, &v| m.max(v));
        if max > 0.0 {
            for band in &mut bands {
                *band /= max;
            }
        }
        Self { bands }
    }

    /// A frame with every band at zero.
    pub fn silent() -> Self {
        Self {
            bands: [0.0; BAND_COUNT],
        }
    }

    pub fn bands(&self) -> &[f32; BAND_COUNT] {
        &self.bands
    }

    /// Magnitude of the band a particle at `x` maps to.
    pub fn band_for_x(&self, x: f32, width: f32) -> f32 {
        self.bands[band_index(x, width)]
    }
}

/// Linear x → band mapping: `clamp(round(x/width · 50), 0, 49)`.
/// A degenerate width maps everything to band 0.
pub fn band_index(x: f32, width: f32) -> usize {
    if width <= 0.0 {
        return 0;
    }
    let idx = (x / width * BAND_COUNT as f32).round();
    idx.clamp(0.0, (BAND_COUNT - 1) as f32) as usize
}

/// A live spectrum feed. `None` means silence.
pub trait SpectrumSource {
    fn sample(&mut self) -> Option<Spectrum>;
}

/// The fallback source when no audio is playing.
pub struct Silence;

impl SpectrumSource for Silence {
    fn sample(&mut self) -> Option<Spectrum> {
        None
    }
}

/// Window length the analyzer runs its FFT over.
pub const FFT_SIZE: usize = 1024;

/// Hann-windowed forward FFT over the most recent mono samples, folded
/// into [`BAND_COUNT`] linear bands.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        let window = (0..FFT_SIZE)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / FFT_SIZE as f32).cos()))
            .collect();
        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); FFT_SIZE],
        }
    }

    /// Analyze the most recent [`FFT_SIZE`] samples of `samples`. Returns
    /// `None` while there aren't enough samples yet (treated as silence
    /// upstream).
    pub fn analyze(&mut self, samples: &[f32]) -> Option<Spectrum> {
        if samples.len() < FFT_SIZE {
            return None;
        }
        let tail = &samples[samples.len() - FFT_SIZE..];
        for (i, (&s, &w)) in tail.iter().zip(&self.window).enumerate() {
            self.scratch[i] = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Only the lower half of the bins carries unique information.
        let usable = FFT_SIZE / 2;
        let per_band = usable / BAND_COUNT;
        let mut bands = [0.0f32; BAND_COUNT];
        for (b, band) in bands.iter_mut().enumerate() {
            let start = b * per_band;
            let end = (start + per_band).max(start + 1).min(usable);
            let sum: f32 = self.scratch[start..end].iter().map(|c| c.norm()).sum();
            *band = sum / (end - start) as f32;
        }
        Some(Spectrum::from_bands(bands))
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_index_edges() {
        // x=0 maps to the first band, x=width rounds to 50 and clamps to 49
        assert_eq!(band_index(0.0, 100.0), 0);
        assert_eq!(band_index(100.0, 100.0), 49);
        assert_eq!(band_index(50.0, 100.0), 25);
        // Out-of-range positions clamp instead of panicking
        assert_eq!(band_index(-20.0, 100.0), 0);
        assert_eq!(band_index(500.0, 100.0), 49);
    }

    #[test]
    fn test_band_index_zero_width() {
        assert_eq!(band_index(10.0, 0.0), 0);
        assert_eq!(band_index(10.0, -5.0), 0);
    }

    #[test]
    fn test_normalization_scales_to_one() {
        let mut raw = [0.0; BAND_COUNT];
        raw[3] = 2.0;
        raw[7] = 4.0;
        let spectrum = Spectrum::from_bands(raw);
        assert_eq!(spectrum.bands()[7], 1.0);
        assert_eq!(spectrum.bands()[3], 0.5);
        assert_eq!(spectrum.bands()[0], 0.0);
    }

    #[test]
    fn test_all_zero_normalization_has_no_nan() {
        let spectrum = Spectrum::from_bands([0.0; BAND_COUNT]);
        assert!(spectrum.bands().iter().all(|b| *b == 0.0));
        assert_eq!(spectrum, Spectrum::silent());
    }

    #[test]
    fn test_band_for_x() {
        let mut raw = [0.0; BAND_COUNT];
        raw[0] = 1.0;
        let spectrum = Spectrum::from_bands(raw);
        assert_eq!(spectrum.band_for_x(0.0, 100.0), 1.0);
        assert_eq!(spectrum.band_for_x(100.0, 100.0), 0.0);
    }

    #[test]
    fn test_silence_source() {
        assert!(Silence.sample().is_none());
    }

    #[test]
    fn test_analyzer_needs_a_full_window() {
        let mut analyzer = SpectrumAnalyzer::new();
        assert!(analyzer.analyze(&[]).is_none());
        assert!(analyzer.analyze(&vec![0.5; FFT_SIZE - 1]).is_none());
        assert!(analyzer.analyze(&vec![0.5; FFT_SIZE]).is_some());
    }

    #[test]
    fn test_analyzer_output_is_normalized_and_finite() {
        let mut analyzer = SpectrumAnalyzer::new();
        // A 440 Hz-ish sine at 44.1 kHz
        let samples: Vec<f32> = (0..FFT_SIZE * 2)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / 44_100.0).sin())
            .collect();
        let spectrum = analyzer.analyze(&samples).unwrap();
        let bands = spectrum.bands();
        assert!(bands.iter().all(|b| b.is_finite()));
        assert!(bands.iter().all(|b| (0.0..=1.0).contains(b)));
        let max = bands.iter().fold(0.0f32, |m, &v| m.max(v));
        assert_eq!(max, 1.0);
    }

    #[test]
    fn test_analyzer_silence_in_silence_out() {
        let mut analyzer = SpectrumAnalyzer::new();
        let spectrum = analyzer.analyze(&vec![0.0; FFT_SIZE]).unwrap();
        assert!(spectrum.bands().iter().all(|b| *b == 0.0));
    }
}
