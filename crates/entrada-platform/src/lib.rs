//! # entrada-platform
//!
//! The platform registry of the Entrada ledger.
//!
//! The registry owns every identity resolver instance and binds each
//! ticketing platform to one resolver, a payment currency and a per-event
//! seat capacity. It also offers delegation queries that route identity
//! lookups through a platform's resolver, failing fast when the platform
//! is unknown and otherwise propagating resolver errors unchanged.
//!
//! ## Modules
//!
//! - [`registry`] — the platform registry state machine

pub mod registry;

pub use registry::{Platform, PlatformRegistry};

use entrada_identity::IdentityError;
use entrada_types::{PlatformId, ResolverId};

/// Error types for the platform registry.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// Caller is not the registry administrator.
    #[error("only the registry administrator can do this operation")]
    Forbidden,

    /// The zero address was supplied where a real currency is required.
    #[error("the zero address cannot be used as a currency")]
    ZeroAddress,

    /// Platform id was never assigned or has been deregistered.
    #[error("platform {0} has not been registered before")]
    PlatformNotFound(PlatformId),

    /// Resolver id was never assigned by this registry.
    #[error("resolver {0} does not exist")]
    ResolverNotFound(ResolverId),

    /// A delegated resolver call failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

pub type Result<T> = std::result::Result<T, PlatformError>;
