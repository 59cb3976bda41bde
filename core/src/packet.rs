use crate::error::{EchoPayError, Result};
use crate::{PACKET_SIZE, PAYLOAD_SIZE, SIGNATURE_SIZE};

/// Fixed-layout 26-byte wire record, immutable once built.
///
/// Fields are stored big-endian at fixed offsets (0, 4, 8, 12), followed by
/// the 8-byte signature at offset 14. The last four wire bytes are reserved
/// and transmitted as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    pub sender_id: u32,
    pub amount_paise: u32,
    pub timestamp_sec: u32,
    pub nonce: u16,
    pub signature: [u8; SIGNATURE_SIZE],
}

impl Packet {
    /// Serialize to the 26-byte wire layout.
    pub fn encode(&self) -> [u8; PACKET_SIZE] {
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[0..4].copy_from_slice(&self.sender_id.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.amount_paise.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.timestamp_sec.to_be_bytes());
        bytes[12..14].copy_from_slice(&self.nonce.to_be_bytes());
        bytes[14..14 + SIGNATURE_SIZE].copy_from_slice(&self.signature);
        bytes
    }

    /// Parse a 26-byte wire record. Any other input length is a format error.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PACKET_SIZE {
            return Err(EchoPayError::InvalidPacketLength(bytes.len()));
        }

        let mut signature = [0u8; SIGNATURE_SIZE];
        signature.copy_from_slice(&bytes[14..14 + SIGNATURE_SIZE]);

        Ok(Self {
            sender_id: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            amount_paise: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            timestamp_sec: u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            nonce: u16::from_be_bytes([bytes[12], bytes[13]]),
            signature,
        })
    }

    /// The signed byte range: everything before the signature field.
    pub fn payload(&self) -> [u8; PAYLOAD_SIZE] {
        let mut payload = [0u8; PAYLOAD_SIZE];
        payload.copy_from_slice(&self.encode()[..PAYLOAD_SIZE]);
        payload
    }
}

/// Unpack bytes into bits, most-significant bit first.
pub fn bits_from_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Pack bits into bytes, MSB first. Trailing bits beyond the last full byte
/// are silently dropped.
pub fn bytes_from_bits(bits: &[u8]) -> Vec<u8> {
    let byte_count = bits.len() / 8;
    let mut bytes = Vec::with_capacity(byte_count);
    for chunk in bits.chunks_exact(8) {
        let mut value = 0u8;
        for &bit in chunk {
            value = (value << 1) | (bit & 1);
        }
        bytes.push(value);
    }
    bytes
}
