use std::f32::consts::PI;

use log::debug;

use crate::device::CaptureSource;
use crate::error::Result;
use crate::sync::FrameSync;
use crate::{FREQ_BIT_ONE, FREQ_BIT_ZERO, PACKET_SIZE, SAMPLE_RATE};

/// Goertzel filter power at a single carrier frequency.
pub fn carrier_energy(samples: &[f32], freq: f32) -> f32 {
    let n = samples.len();
    if n == 0 {
        return 0.0;
    }

    let k = (0.5 + n as f32 * freq / SAMPLE_RATE as f32) as usize;
    let omega = 2.0 * PI * k as f32 / n as f32;
    let coeff = 2.0 * omega.cos();

    let mut q1 = 0.0f32;
    let mut q2 = 0.0f32;
    for &sample in samples {
        let q0 = coeff * q1 - q2 + sample;
        q2 = q1;
        q1 = q0;
    }

    let real = q1 - q2 * omega.cos();
    let imag = q2 * omega.sin();
    real * real + imag * imag
}

/// Classify one symbol window by correlating against both carriers and
/// taking the stronger. Silence and ties fall to bit 0.
pub fn classify_window(samples: &[f32]) -> u8 {
    let zero_energy = carrier_energy(samples, FREQ_BIT_ZERO);
    let one_energy = carrier_energy(samples, FREQ_BIT_ONE);
    u8::from(one_energy > zero_energy)
}

/// Listener lifecycle. `Scanning` is the transient state while a freshly
/// appended bit is being searched for a preamble match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    Idle,
    Listening,
    Scanning,
    MatchFound,
    Stopped,
}

/// FSK modem decoder: drives a capture source at symbol cadence, classifies
/// each window into a bit, and searches the rolling bit buffer for a
/// preamble-aligned packet.
///
/// A single logical task owns the listener; the bit buffer has no concurrent
/// writer. On a candidate match the listener clears its buffer and releases
/// the capture source before the caller validates the candidate, so a
/// candidate is never double-processed — and listening does not resume
/// automatically on validation failure.
pub struct Listener<S: CaptureSource> {
    source: Option<S>,
    sync: FrameSync,
    state: ListenState,
}

impl<S: CaptureSource> Listener<S> {
    pub fn new() -> Self {
        Self {
            source: None,
            sync: FrameSync::new(),
            state: ListenState::Idle,
        }
    }

    pub fn state(&self) -> ListenState {
        self.state
    }

    /// Take ownership of a capture source and begin listening.
    pub fn start(&mut self, source: S) {
        self.release();
        self.source = Some(source);
        self.state = ListenState::Listening;
    }

    /// One cadence tick: capture a window, classify the bit, scan for a
    /// frame. Returns the candidate packet bytes at most once per start;
    /// emitting a candidate stops the listener.
    pub fn poll(&mut self) -> Result<Option<[u8; PACKET_SIZE]>> {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };

        let window = match source.next_window() {
            Ok(window) => window,
            Err(err) => {
                // Device failure still releases the capture resource.
                self.stop();
                return Err(err);
            }
        };
        let Some(window) = window else {
            self.stop();
            return Ok(None);
        };

        self.state = ListenState::Scanning;
        let bit = classify_window(&window);
        if let Some(packet) = self.sync.push_bit(bit) {
            debug!("candidate packet found, releasing capture");
            self.release();
            self.state = ListenState::MatchFound;
            return Ok(Some(packet));
        }

        self.state = ListenState::Listening;
        Ok(None)
    }

    /// Listen until a candidate is found or the capture stream ends.
    pub fn run(&mut self, source: S) -> Result<Option<[u8; PACKET_SIZE]>> {
        self.start(source);
        while matches!(self.state, ListenState::Listening | ListenState::Scanning) {
            if let Some(packet) = self.poll()? {
                return Ok(Some(packet));
            }
        }
        Ok(None)
    }

    /// Stop listening. Idempotent, callable at any time, always releases
    /// the capture source.
    pub fn stop(&mut self) {
        self.release();
        self.state = ListenState::Stopped;
    }

    fn release(&mut self) {
        self.source = None;
        self.sync.clear();
    }
}

impl<S: CaptureSource> Default for Listener<S> {
    fn default() -> Self {
        Self::new()
    }
}
