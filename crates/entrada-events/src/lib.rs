//! # entrada-events
//!
//! The event engine and ownership ledger of Entrada.
//!
//! An [`EventLedger`] carries the event table, the per-ticket ownership
//! balances, operator approvals, per-event proceeds and per-platform fee
//! pools. Every permissioned operation consults the identity resolver the
//! event was created under; payment flows through an external
//! [`PaymentToken`] collaborator supplied by the host.
//!
//! ## Modules
//!
//! - [`ledger`] — ledger state and shared validation
//! - [`event`] — event creation and section layout
//! - [`purchase`] — token-settled purchases, withdrawals and fee sweeps
//! - [`transfer`] — ownership queries, approvals and transfers
//! - [`token`] — the payment-token collaborator trait and a simple
//!   in-memory implementation

pub mod event;
pub mod ledger;
pub mod purchase;
pub mod token;
pub mod transfer;

pub use event::{Event, Section};
pub use ledger::EventLedger;
pub use token::{PaymentToken, SimpleToken};

use entrada_identity::IdentityError;
use entrada_platform::PlatformError;
use entrada_types::{EventId, SeatId, SectionId, TicketId};

/// Error types for the event engine.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Event id was never assigned.
    #[error("event {0} has not been created before")]
    EventNotFound(EventId),

    /// Section id does not exist on this event.
    #[error("section {0} does not exist for this event")]
    SectionNotFound(SectionId),

    /// Seat id does not exist in this section.
    #[error("seat {0} does not exist for this event and section")]
    SeatNotFound(SeatId),

    /// The seat has already been sold.
    #[error("ticket {0} is no longer available")]
    SeatNotAvailable(TicketId),

    /// Caller lacks the capability or role the operation requires.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// Third-party transfers need operator approval from the owner.
    #[error("operator approval is required for third-party transfers")]
    NeedsApproval,

    /// The zero address was supplied where a real account is required.
    #[error("the zero address cannot {0}")]
    ZeroAddress(&'static str),

    /// Adding the section would exceed the platform's per-event seat cap.
    #[error("too many seats for this platform on this event")]
    CapacityExceeded,

    /// The event's selling date has not been reached.
    #[error("ticket selling has not started for this event")]
    NotYetOnSale,

    /// The payment token refused the transfer.
    #[error("not enough tokens: {0}")]
    InsufficientFunds(&'static str),

    /// Parallel arrays of a batch operation differ in length.
    #[error("batch array lengths must match")]
    LengthMismatch,

    /// Transfer amount exceeds the sender's ticket balance.
    #[error("transfer amount exceeds ticket balance")]
    BalanceUnderflow,

    /// Price arithmetic overflowed.
    #[error("arithmetic overflow in price computation")]
    Overflow,

    /// A platform registry lookup failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// An identity resolver lookup failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

pub type Result<T> = std::result::Result<T, EventError>;
