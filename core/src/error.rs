use thiserror::Error;

#[derive(Debug, Error)]
pub enum EchoPayError {
    #[error("invalid packet length: expected 26 bytes, got {0}")]
    InvalidPacketLength(usize),

    #[error("invalid signature length: expected 8 bytes, got {0}")]
    InvalidSignatureLength(usize),

    #[error("signature verification failed")]
    SignatureMismatch,

    #[error("stale timestamp: {age_sec}s old, freshness window is {window_sec}s")]
    StaleTimestamp { age_sec: u32, window_sec: u32 },

    #[error("audio device failure: {0}")]
    Device(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EchoPayError>;
