use std::f32::consts::PI;
use std::time::Duration;

use log::debug;

use crate::device::AudioSink;
use crate::error::{EchoPayError, Result};
use crate::packet::Packet;
use crate::sync::frame_bits;
use crate::{
    BIT_DURATION_MS, FREQ_BIT_ONE, FREQ_BIT_ZERO, GAP_DURATION_MS, LEAD_IN_MS, SAMPLE_RATE,
    TAIL_MARGIN_MS,
};

/// Peak tone amplitude.
const TONE_AMPLITUDE: f32 = 0.6;

/// Edge ramps are capped at 4 ms regardless of bit duration.
const MAX_RAMP_MS: f32 = 4.0;

/// Symbol timing for both ends of the link. The defaults (30 ms tone, 4 ms
/// gap) must match between sender and receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemConfig {
    pub bit_duration_ms: usize,
    pub gap_duration_ms: usize,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            bit_duration_ms: BIT_DURATION_MS,
            gap_duration_ms: GAP_DURATION_MS,
        }
    }
}

impl ModemConfig {
    pub fn bit_samples(&self) -> usize {
        SAMPLE_RATE * self.bit_duration_ms / 1000
    }

    pub fn gap_samples(&self) -> usize {
        SAMPLE_RATE * self.gap_duration_ms / 1000
    }

    /// One symbol period: tone burst plus trailing gap.
    pub fn symbol_samples(&self) -> usize {
        self.bit_samples() + self.gap_samples()
    }

    /// Linear amplitude ramp length: min(4 ms, bit_duration / 4).
    pub fn ramp_samples(&self) -> usize {
        let ramp_ms = MAX_RAMP_MS.min(self.bit_duration_ms as f32 / 4.0);
        (SAMPLE_RATE as f32 * ramp_ms / 1000.0) as usize
    }
}

/// FSK modem encoder: renders a bit sequence as scheduled sine tone bursts.
///
/// Bit 0 maps to 18.5 kHz, bit 1 to 19.5 kHz. Each burst carries linear
/// amplitude ramps at both edges to suppress audible clicks, bursts are
/// separated by gap silence, and the rendered buffer starts with a lead-in
/// and ends with a safety margin of silence so the audio pipeline can
/// stabilize around the tones.
pub struct Encoder {
    config: ModemConfig,
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            config: ModemConfig::default(),
        }
    }

    pub fn with_config(config: ModemConfig) -> Result<Self> {
        if config.bit_duration_ms == 0 {
            return Err(EchoPayError::InvalidConfig(
                "bit duration must be nonzero".into(),
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> ModemConfig {
        self.config
    }

    /// Render a bit sequence to audio samples.
    pub fn encode_bits(&self, bits: &[u8]) -> Vec<f32> {
        let bit_samples = self.config.bit_samples();
        let gap_samples = self.config.gap_samples();
        let ramp_samples = self.config.ramp_samples();
        let lead_in = SAMPLE_RATE * LEAD_IN_MS / 1000;
        let tail = SAMPLE_RATE * TAIL_MARGIN_MS / 1000;

        let mut samples =
            Vec::with_capacity(lead_in + bits.len() * (bit_samples + gap_samples) + tail);
        samples.resize(lead_in, 0.0);

        for &bit in bits {
            let frequency = if bit == 1 { FREQ_BIT_ONE } else { FREQ_BIT_ZERO };
            let angular_freq = 2.0 * PI * frequency / SAMPLE_RATE as f32;

            for n in 0..bit_samples {
                let envelope = edge_envelope(n, bit_samples, ramp_samples);
                samples.push(TONE_AMPLITUDE * envelope * (angular_freq * n as f32).sin());
            }
            samples.resize(samples.len() + gap_samples, 0.0);
        }

        samples.resize(samples.len() + tail, 0.0);
        debug!(
            "rendered {} bits to {} samples ({} ms)",
            bits.len(),
            samples.len(),
            samples.len() * 1000 / SAMPLE_RATE
        );
        samples
    }

    /// Render the full on-air frame for a packet: preamble plus packet bits.
    pub fn encode_packet(&self, packet: &Packet) -> Vec<f32> {
        self.encode_bits(&frame_bits(&packet.encode()))
    }

    /// Blocking send: schedules the rendered frame onto the sink, then waits
    /// out the full scheduled duration including the safety margin.
    ///
    /// Completion is time-based, not acknowledgment-based. There is no
    /// mid-flight cancellation; concurrent sends must be externally
    /// serialized, and a caller abandoning a send simply ignores the return.
    pub fn send(&self, packet: &Packet, sink: &mut dyn AudioSink) -> Result<()> {
        let samples = self.encode_packet(packet);
        let total = Duration::from_secs_f64(samples.len() as f64 / SAMPLE_RATE as f64);
        sink.play(&samples)?;
        std::thread::sleep(total);
        Ok(())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Linear attack/decay envelope for one tone burst.
fn edge_envelope(n: usize, bit_samples: usize, ramp_samples: usize) -> f32 {
    if ramp_samples == 0 {
        return 1.0;
    }
    if n < ramp_samples {
        n as f32 / ramp_samples as f32
    } else if n >= bit_samples - ramp_samples {
        (bit_samples - n) as f32 / ramp_samples as f32
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::carrier_energy;
    use crate::device::AudioSink;

    #[test]
    fn test_rendered_length() {
        let encoder = Encoder::new();
        let config = encoder.config();
        let bits = vec![1, 0, 1, 1];
        let samples = encoder.encode_bits(&bits);

        let lead_in = SAMPLE_RATE * LEAD_IN_MS / 1000;
        let tail = SAMPLE_RATE * TAIL_MARGIN_MS / 1000;
        let expected = lead_in + bits.len() * config.symbol_samples() + tail;
        assert_eq!(samples.len(), expected);
    }

    #[test]
    fn test_lead_in_and_tail_are_silent() {
        let encoder = Encoder::new();
        let samples = encoder.encode_bits(&[1, 0]);
        let lead_in = SAMPLE_RATE * LEAD_IN_MS / 1000;
        let tail = SAMPLE_RATE * TAIL_MARGIN_MS / 1000;

        assert!(samples[..lead_in].iter().all(|&s| s == 0.0));
        assert!(samples[samples.len() - tail..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_burst_edges_are_ramped() {
        let encoder = Encoder::new();
        let config = encoder.config();
        let samples = encoder.encode_bits(&[1]);
        let lead_in = SAMPLE_RATE * LEAD_IN_MS / 1000;
        let burst = &samples[lead_in..lead_in + config.bit_samples()];

        // Burst starts at zero amplitude and ends near zero
        assert_eq!(burst[0], 0.0);
        assert!(burst[burst.len() - 1].abs() < 0.05);

        // Mid-burst peaks approach the full tone amplitude
        let mid = &burst[config.ramp_samples()..burst.len() - config.ramp_samples()];
        let peak = mid.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        assert!(peak > 0.5, "mid-burst peak {} too low", peak);
    }

    #[test]
    fn test_gap_between_bursts_is_silent() {
        let encoder = Encoder::new();
        let config = encoder.config();
        let samples = encoder.encode_bits(&[0, 1]);
        let lead_in = SAMPLE_RATE * LEAD_IN_MS / 1000;
        let gap_start = lead_in + config.bit_samples();
        let gap = &samples[gap_start..gap_start + config.gap_samples()];
        assert!(gap.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_bursts_carry_the_selected_carrier() {
        let encoder = Encoder::new();
        let config = encoder.config();
        let lead_in = SAMPLE_RATE * LEAD_IN_MS / 1000;

        for (bit, strong, weak) in [
            (0u8, FREQ_BIT_ZERO, FREQ_BIT_ONE),
            (1u8, FREQ_BIT_ONE, FREQ_BIT_ZERO),
        ] {
            let samples = encoder.encode_bits(&[bit]);
            let burst = &samples[lead_in..lead_in + config.bit_samples()];
            let strong_energy = carrier_energy(burst, strong);
            let weak_energy = carrier_energy(burst, weak);
            assert!(
                strong_energy > weak_energy * 10.0,
                "bit {}: {} vs {}",
                bit,
                strong_energy,
                weak_energy
            );
        }
    }

    #[test]
    fn test_short_bits_cap_ramp_at_quarter_duration() {
        let config = ModemConfig {
            bit_duration_ms: 8,
            gap_duration_ms: 1,
        };
        // min(4 ms, 8/4 = 2 ms) = 2 ms
        assert_eq!(config.ramp_samples(), SAMPLE_RATE * 2 / 1000);

        let default_config = ModemConfig::default();
        // min(4 ms, 30/4 = 7.5 ms) = 4 ms
        assert_eq!(default_config.ramp_samples(), SAMPLE_RATE * 4 / 1000);
    }

    #[test]
    fn test_zero_bit_duration_rejected() {
        let config = ModemConfig {
            bit_duration_ms: 0,
            gap_duration_ms: 4,
        };
        assert!(matches!(
            Encoder::with_config(config),
            Err(EchoPayError::InvalidConfig(_))
        ));
    }

    struct FailingSink;

    impl AudioSink for FailingSink {
        fn play(&mut self, _samples: &[f32]) -> crate::Result<()> {
            Err(EchoPayError::Device("playback unavailable".into()))
        }
    }

    #[test]
    fn test_send_propagates_device_failure() {
        let auth = crate::Authenticator::default();
        let packet = auth.sign_packet(1, 100, 1_700_000_000, 9);
        let encoder = Encoder::new();
        assert!(matches!(
            encoder.send(&packet, &mut FailingSink),
            Err(EchoPayError::Device(_))
        ));
    }
}
