//! # entrada-crypto
//!
//! Cryptographic primitives for the Entrada ledger. The suite is fixed —
//! Ed25519 for signatures, BLAKE3 for hashing and address derivation — and
//! no algorithm negotiation is permitted.
//!
//! ## Modules
//!
//! - [`blake3`] — Domain-separated BLAKE3 hashing
//! - [`ed25519`] — Ed25519 signing, verification and address derivation
//! - [`recover`] — Recoverable signature envelopes for relayed transactions

pub mod blake3;
pub mod ed25519;
pub mod recover;

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("signature verification failed")]
    SignatureVerification,

    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
