//! Seams for the platform audio devices.
//!
//! The core never talks to capture or playback hardware directly; it renders
//! and consumes sample buffers through these traits. Device handles are
//! explicitly owned by their callers, there is no global audio context.

use crate::encoder::ModemConfig;
use crate::error::Result;

/// Playback seam: accepts a fully scheduled sample buffer for rendering.
/// Failures (permission, hardware) surface as device errors and propagate
/// uncaught to the caller.
pub trait AudioSink {
    fn play(&mut self, samples: &[f32]) -> Result<()>;
}

/// Capture seam: yields one analysis window of live samples per cadence
/// tick, `None` once the stream ends or the device is closed.
pub trait CaptureSource {
    fn next_window(&mut self) -> Result<Option<Vec<f32>>>;
}

/// In-memory sink that records whatever is scheduled onto it.
#[derive(Default)]
pub struct BufferedSink {
    pub samples: Vec<f32>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for BufferedSink {
    fn play(&mut self, samples: &[f32]) -> Result<()> {
        self.samples.extend_from_slice(samples);
        Ok(())
    }
}

/// Simulated channel: replays a rendered sample buffer one symbol period at
/// a time. Windows are aligned to the first burst by skipping leading
/// silence below a squelch threshold, which mirrors how a live capture path
/// opens on the first audible tone.
pub struct BufferedCapture {
    samples: Vec<f32>,
    pos: usize,
    window: usize,
    stride: usize,
}

impl BufferedCapture {
    const SQUELCH: f32 = 0.1;

    pub fn new(samples: Vec<f32>, config: &ModemConfig) -> Self {
        let pos = samples
            .iter()
            .position(|s| s.abs() >= Self::SQUELCH)
            .unwrap_or(samples.len());
        Self {
            samples,
            pos,
            window: config.bit_samples(),
            stride: config.symbol_samples(),
        }
    }
}

impl CaptureSource for BufferedCapture {
    fn next_window(&mut self) -> Result<Option<Vec<f32>>> {
        if self.pos + self.window > self.samples.len() {
            return Ok(None);
        }
        let window = self.samples[self.pos..self.pos + self.window].to_vec();
        self.pos += self.stride;
        Ok(Some(window))
    }
}
