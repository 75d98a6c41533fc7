//! # entrada-identity
//!
//! Identity resolution for the Entrada ledger.
//!
//! An [`IdentityResolver`] maps account addresses to identities, each
//! carrying a capability set, and manages groups of identities. Every
//! ticketing platform is bound to one resolver instance; the event engine
//! consults it on each permissioned operation.
//!
//! ## Modules
//!
//! - [`resolver`] — the identity resolver state machine

pub mod resolver;

pub use resolver::{Identity, IdentityResolver};

use entrada_types::{Address, GroupId, IdentityId};

/// Error types for identity resolution.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The zero address was supplied where a real account is required.
    #[error("the zero address cannot be used as an account")]
    ZeroAddress,

    /// Caller is not the resolver administrator.
    #[error("only the resolver administrator can do this operation")]
    Forbidden,

    /// Account has never been registered with this resolver.
    #[error("account {0} has not been registered before")]
    AccountNotFound(Address),

    /// Identity id was never assigned by this resolver.
    #[error("identity {0} has not been registered before")]
    IdentityNotFound(IdentityId),

    /// Group id was never assigned by this resolver.
    #[error("group {0} has not been registered before")]
    GroupNotFound(GroupId),
}

pub type Result<T> = std::result::Result<T, IdentityError>;
