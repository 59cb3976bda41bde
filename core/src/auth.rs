use sha2::{Digest, Sha256};

use crate::error::{EchoPayError, Result};
use crate::packet::Packet;
use crate::SIGNATURE_SIZE;

/// Shared secret used by the demo deployment.
pub const DEFAULT_SECRET: &[u8] = b"ECHOPAY_DEMO_SECRET";

/// Maximum tolerated packet age in either direction, boundary inclusive.
pub const FRESHNESS_WINDOW_SECS: u32 = 10;

/// Keyed-digest signer/verifier with timestamp freshness checking.
///
/// Signatures are `SHA-256(payload || secret)` truncated to 8 bytes. This is
/// not a standard MAC construction (no length prefixing, no key derivation);
/// it is kept as-is for wire compatibility with existing senders, and
/// switching to HMAC would be a breaking wire-format change.
pub struct Authenticator {
    secret: Vec<u8>,
    window_sec: u32,
}

impl Authenticator {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            window_sec: FRESHNESS_WINDOW_SECS,
        }
    }

    pub fn with_window(mut self, window_sec: u32) -> Self {
        self.window_sec = window_sec;
        self
    }

    /// Compute the 8-byte truncated keyed digest over a payload.
    /// Deterministic: the same payload and secret always produce the same
    /// signature.
    pub fn sign(&self, payload: &[u8]) -> [u8; SIGNATURE_SIZE] {
        let mut hasher = Sha256::new();
        hasher.update(payload);
        hasher.update(&self.secret);
        let digest = hasher.finalize();

        let mut signature = [0u8; SIGNATURE_SIZE];
        signature.copy_from_slice(&digest[..SIGNATURE_SIZE]);
        signature
    }

    /// Recompute the expected signature and byte-compare. Returns false on
    /// any length or byte mismatch; never panics.
    pub fn verify(&self, payload: &[u8], signature: &[u8]) -> bool {
        if signature.len() != SIGNATURE_SIZE {
            return false;
        }
        let expected = self.sign(payload);
        expected.iter().zip(signature).all(|(a, b)| a == b)
    }

    /// Freshness check: the timestamp must lie within the window of `now`
    /// in either direction, boundary inclusive.
    pub fn is_fresh(&self, timestamp_sec: u32, now_sec: u32) -> bool {
        now_sec.abs_diff(timestamp_sec) <= self.window_sec
    }

    /// Sign the fields and assemble the finished packet.
    pub fn sign_packet(
        &self,
        sender_id: u32,
        amount_paise: u32,
        timestamp_sec: u32,
        nonce: u16,
    ) -> Packet {
        let unsigned = Packet {
            sender_id,
            amount_paise,
            timestamp_sec,
            nonce,
            signature: [0u8; SIGNATURE_SIZE],
        };
        let signature = self.sign(&unsigned.payload());
        Packet {
            signature,
            ..unsigned
        }
    }

    /// Validate a decoded candidate packet: signature over its own payload,
    /// then timestamp freshness. Both failures are terminal for the
    /// candidate; the caller decides whether to re-initiate listening.
    pub fn validate(&self, packet: &Packet, now_sec: u32) -> Result<()> {
        if !self.verify(&packet.payload(), &packet.signature) {
            return Err(EchoPayError::SignatureMismatch);
        }
        let age_sec = now_sec.abs_diff(packet.timestamp_sec);
        if age_sec > self.window_sec {
            return Err(EchoPayError::StaleTimestamp {
                age_sec,
                window_sec: self.window_sec,
            });
        }
        Ok(())
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET)
    }
}
