//! Acoustic data link for short authenticated payment packets
//!
//! Modulates packet bits onto near-ultrasonic FSK tone bursts (18.5/19.5 kHz)
//! played through a speaker and recovered from a microphone, with keyed-digest
//! signing and timestamp freshness checking.

pub mod auth;
pub mod decoder;
pub mod device;
pub mod encoder;
pub mod error;
pub mod packet;
pub mod sync;

pub use auth::Authenticator;
pub use decoder::{ListenState, Listener};
pub use encoder::{Encoder, ModemConfig};
pub use error::{EchoPayError, Result};
pub use packet::Packet;

// Configuration constants
pub const SAMPLE_RATE: usize = 48_000;

// FSK carriers sit near the top of the consumer speaker/microphone range to
// stay barely audible while remaining within hardware bandwidth.
pub const FREQ_BIT_ZERO: f32 = 18_500.0;
pub const FREQ_BIT_ONE: f32 = 19_500.0;

// Symbol timing
pub const BIT_DURATION_MS: usize = 30;
pub const GAP_DURATION_MS: usize = 4;
pub const LEAD_IN_MS: usize = 50;
pub const TAIL_MARGIN_MS: usize = 120;

// Wire packet layout: 14 payload bytes, 8 signature bytes, 4 reserved
// trailing bytes kept zero on the wire.
pub const PACKET_SIZE: usize = 26;
pub const SIGNATURE_SIZE: usize = 8;
pub const PAYLOAD_SIZE: usize = 14;
pub const PACKET_BITS: usize = PACKET_SIZE * 8; // 208

/// Frame synchronization pattern sent before the packet bits.
pub const PREAMBLE_BITS: [u8; 8] = [1, 0, 1, 0, 1, 0, 1, 0];
pub const FRAME_BITS: usize = PREAMBLE_BITS.len() + PACKET_BITS; // 216
