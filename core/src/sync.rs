use log::debug;

use crate::packet::{bits_from_bytes, bytes_from_bits};
use crate::{FRAME_BITS, PACKET_BITS, PACKET_SIZE, PREAMBLE_BITS};

/// Upper bound on the rolling bit buffer. Once exceeded, the oldest bits are
/// discarded so a frame can still be matched within any rolling window.
const MAX_BUFFER_BITS: usize = 2 * FRAME_BITS;

/// Build the on-air bit frame for a serialized packet: preamble followed by
/// the packet bits, MSB first.
pub fn frame_bits(packet_bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(PREAMBLE_BITS.len() + packet_bytes.len() * 8);
    bits.extend_from_slice(&PREAMBLE_BITS);
    bits.extend(bits_from_bytes(packet_bytes));
    bits
}

/// Rolling bit buffer that searches for the frame preamble and extracts the
/// packet bits that follow it.
pub struct FrameSync {
    bits: Vec<u8>,
}

impl FrameSync {
    pub fn new() -> Self {
        Self {
            bits: Vec::with_capacity(MAX_BUFFER_BITS),
        }
    }

    /// Append one demodulated bit and scan every valid start offset for an
    /// exact preamble match. A match only yields a candidate once the full
    /// packet window after it is populated; shorter matches defer to the
    /// next bit.
    pub fn push_bit(&mut self, bit: u8) -> Option<[u8; PACKET_SIZE]> {
        self.bits.push(bit & 1);

        if self.bits.len() >= FRAME_BITS {
            for start in 0..=self.bits.len() - FRAME_BITS {
                if self.bits[start..start + PREAMBLE_BITS.len()] != PREAMBLE_BITS {
                    continue;
                }
                let packet_start = start + PREAMBLE_BITS.len();
                let packet_bits = &self.bits[packet_start..packet_start + PACKET_BITS];
                let bytes = bytes_from_bits(packet_bits);
                let mut packet = [0u8; PACKET_SIZE];
                packet.copy_from_slice(&bytes);
                debug!(
                    "preamble matched at bit offset {} (buffer {} bits)",
                    start,
                    self.bits.len()
                );
                return Some(packet);
            }
        }

        if self.bits.len() > MAX_BUFFER_BITS {
            let excess = self.bits.len() - MAX_BUFFER_BITS;
            self.bits.drain(..excess);
        }

        None
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

impl Default for FrameSync {
    fn default() -> Self {
        Self::new()
    }
}
