//! Audio playback with an inline sample tap.
//!
//! Decoded samples pass through [`TapSource`] on their way to the output
//! device; each mono-mixed sample is also pushed into a bounded ring
//! buffer that the UI thread drains for spectrum analysis. rodio owns
//! the playback thread, so the buffer sits behind a mutex.

use rodio::source::{SeekError, Source};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use surfcore::spectrum::{Spectrum, SpectrumAnalyzer, SpectrumSource, FFT_SIZE};

/// Samples kept for analysis — a few FFT windows worth.
const TAP_CAPACITY: usize = FFT_SIZE * 4;

/// Shared mono sample buffer between the playback thread and the UI.
#[derive(Clone, Default)]
pub struct SampleTap {
    samples: Arc<Mutex<VecDeque<f32>>>,
}

impl SampleTap {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, sample: f32) {
        if let Ok(mut buf) = self.samples.lock() {
            if buf.len() == TAP_CAPACITY {
                buf.pop_front();
            }
            buf.push_back(sample);
        }
    }

    /// Copy out the buffered samples, oldest first.
    fn snapshot(&self) -> Vec<f32> {
        self.samples
            .lock()
            .map(|buf| buf.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut buf) = self.samples.lock() {
            buf.clear();
        }
    }
}

/// Pass-through source that mirrors its samples into a [`SampleTap`],
/// mixing interleaved channels down to mono as they go by.
struct TapSource<S> {
    inner: S,
    tap: SampleTap,
    channels: u16,
    pending: f32,
    pending_count: u16,
}

impl<S> TapSource<S>
where
    S: Source<Item = f32>,
{
    fn new(inner: S, tap: SampleTap) -> Self {
        let channels = inner.channels().max(1);
        Self {
            inner,
            tap,
            channels,
            pending: 0.0,
            pending_count: 0,
        }
    }
}

impl<S> Iterator for TapSource<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.inner.next()?;
        self.pending += sample;
        self.pending_count += 1;
        if self.pending_count == self.channels {
            self.tap.push(self.pending / self.channels as f32);
            self.pending = 0.0;
            self.pending_count = 0;
        }
        Some(sample)
    }
}

impl<S> Source for TapSource<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        // Buffered samples are stale after a jump
        self.pending = 0.0;
        self.pending_count = 0;
        self.tap.clear();
        self.inner.try_seek(pos)
    }
}

/// Wall-clock bookkeeping for the playback position. rodio does not
/// report how far a sink has played, so the position is tracked here:
/// the accumulated time before the last pause plus, while playing, the
/// time since playback (re)started.
#[derive(Debug, Default)]
struct Progress {
    play_start: Option<Instant>,
    before_pause: Duration,
}

impl Progress {
    fn restart(&mut self) {
        self.before_pause = Duration::ZERO;
        self.play_start = Some(Instant::now());
    }

    fn pause(&mut self) {
        if let Some(start) = self.play_start.take() {
            self.before_pause += start.elapsed();
        }
    }

    fn resume(&mut self) {
        if self.play_start.is_none() {
            self.play_start = Some(Instant::now());
        }
    }

    fn seek(&mut self, pos: Duration) {
        self.before_pause = pos;
        if self.play_start.is_some() {
            self.play_start = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        *self = Self::default();
    }

    fn elapsed(&self) -> Duration {
        self.before_pause
            + self
                .play_start
                .map(|start| start.elapsed())
                .unwrap_or_default()
    }
}

/// Playback wrapper: one output stream, one sink, one tap.
///
/// Every failure surfaces as a status message string; a machine without
/// an audio device still runs the visualization in silence.
pub struct Player {
    _stream: Option<OutputStream>,
    handle: Option<OutputStreamHandle>,
    sink: Option<Sink>,
    tap: SampleTap,
    progress: Progress,
    track_duration: Option<Duration>,
}

impl Player {
    pub fn new() -> Self {
        let (stream, handle) = OutputStream::try_default().ok().unzip();
        Self {
            _stream: stream,
            handle,
            sink: None,
            tap: SampleTap::new(),
            progress: Progress::default(),
            track_duration: None,
        }
    }

    pub fn tap(&self) -> SampleTap {
        self.tap.clone()
    }

    /// Start playing a file from the beginning. Current playback stops.
    pub fn play_file(&mut self, path: &Path, volume: f32) -> Result<(), String> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| "no audio output device".to_string())?;
        let file = File::open(path).map_err(|e| format!("file error: {}", e))?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|e| format!("decode error: {}", e))?;
        let duration = source.total_duration();
        let sink = Sink::try_new(handle).map_err(|e| format!("audio error: {}", e))?;

        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.tap.clear();
        sink.set_volume(volume);
        sink.append(TapSource::new(
            source.convert_samples::<f32>(),
            self.tap.clone(),
        ));
        self.sink = Some(sink);
        self.track_duration = duration;
        self.progress.restart();
        Ok(())
    }

    pub fn toggle(&mut self) {
        if let Some(ref sink) = self.sink {
            if sink.is_paused() {
                sink.play();
                self.progress.resume();
            } else {
                sink.pause();
                self.progress.pause();
            }
        }
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.tap.clear();
        self.progress.stop();
        self.track_duration = None;
    }

    /// Jump to an absolute position in the current track. A no-op with
    /// nothing loaded.
    pub fn seek_to(&mut self, pos: Duration) -> Result<(), String> {
        let Some(ref sink) = self.sink else {
            return Ok(());
        };
        sink.try_seek(pos).map_err(|e| format!("seek error: {}", e))?;
        self.progress.seek(pos);
        Ok(())
    }

    /// Playback position of the current track.
    pub fn elapsed(&self) -> Duration {
        self.progress.elapsed()
    }

    /// Length of the current track, when the decoder knows it.
    pub fn duration(&self) -> Option<Duration> {
        self.track_duration
    }

    pub fn set_volume(&mut self, volume: f32) {
        if let Some(ref sink) = self.sink {
            sink.set_volume(volume);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .map(|s| !s.is_paused() && !s.empty())
            .unwrap_or(false)
    }
}

/// Live spectrum feed over the tap. Silent while the buffer is still
/// filling or nothing is playing.
pub struct TapFeed {
    tap: SampleTap,
    analyzer: SpectrumAnalyzer,
}

impl TapFeed {
    pub fn new(tap: SampleTap) -> Self {
        Self {
            tap,
            analyzer: SpectrumAnalyzer::new(),
        }
    }
}

impl SpectrumSource for TapFeed {
    fn sample(&mut self) -> Option<Spectrum> {
        let samples = self.tap.snapshot();
        self.analyzer.analyze(&samples)
    }
}
