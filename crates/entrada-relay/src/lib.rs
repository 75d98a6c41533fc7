//! # entrada-relay
//!
//! The feeless meta-transaction relay of Entrada.
//!
//! A user without tokens for relay costs signs a [`RelayCall`] offline;
//! anyone may submit the signed envelope. The relay recovers the signer
//! from the signature, enforces expiry and a strictly sequential
//! per-signer nonce, and dispatches the call against the event ledger
//! with the signer as the effective caller.
//!
//! ## Modules
//!
//! - [`call`] — the enumerated call set and its wire codec
//! - [`relay`] — signing digest, nonce registry and dispatch

pub mod call;
pub mod relay;

pub use call::RelayCall;
pub use relay::{signing_digest, FeelessInput, FeelessRelay, RelayOutcome};

use entrada_events::EventError;

/// Error types for the feeless relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Signature does not verify, or verifies for a different account
    /// than the claimed signer.
    #[error("signature does not match the claimed signer")]
    BadSignature,

    /// The envelope's expiry date has passed.
    #[error("feeless transaction has expired")]
    Expired,

    /// The envelope's nonce is not the signer's next nonce.
    #[error("bad nonce: expected {expected}, got {got}")]
    BadNonce { expected: u64, got: u64 },

    /// The envelope targets a ledger this relay does not serve.
    #[error("feeless transaction targets a different ledger")]
    UnknownTarget,

    /// The call payload does not decode to a known call.
    #[error("malformed call payload")]
    MalformedCall,

    /// The dispatched ledger operation failed.
    #[error(transparent)]
    Event(#[from] EventError),
}

pub type Result<T> = std::result::Result<T, RelayError>;
