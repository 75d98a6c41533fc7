//! # entrada-types
//!
//! Shared domain types used across the Entrada workspace.
//!
//! ## Modules
//!
//! - [`address`] — 32-byte account addresses
//! - [`ids`] — sequential identifiers for identities, groups, platforms and events
//! - [`ticket`] — the packed ticket identifier
//! - [`permissions`] — the per-identity capability set

pub mod address;
pub mod ids;
pub mod permissions;
pub mod ticket;

pub use address::Address;
pub use ids::{EventId, GroupId, IdentityId, PlatformId, ResolverId, SeatId, SectionId};
pub use permissions::Permissions;
pub use ticket::TicketId;

/// Basis points per whole unit (100% = 10,000 bps).
pub const BPS_DENOMINATOR: u64 = 10_000;
