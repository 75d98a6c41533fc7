//! The packed ticket identifier.
//!
//! A ticket is addressed by the triple (event, section, seat). The three
//! components pack bijectively into a single `u64`:
//!
//! ```text
//! ticket = event * 2^32 + section * 2^16 + seat
//! ```
//!
//! i.e. the event id occupies the high 32 bits, the section id the next
//! 16, and the seat id the low 16. The component widths are exactly the
//! widths of [`EventId`], [`SectionId`] and [`SeatId`], so packing can
//! never overflow and unpacking always recovers the original triple.

use serde::{Deserialize, Serialize};

use crate::ids::{EventId, SeatId, SectionId};

/// A packed (event, section, seat) ticket identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TicketId(pub u64);

impl TicketId {
    /// Pack an (event, section, seat) triple into a ticket identifier.
    pub fn pack(event: EventId, section: SectionId, seat: SeatId) -> TicketId {
        TicketId(((event.0 as u64) << 32) | ((section.0 as u64) << 16) | seat.0 as u64)
    }

    /// Unpack into the original (event, section, seat) triple.
    pub fn unpack(self) -> (EventId, SectionId, SeatId) {
        (self.event(), self.section(), self.seat())
    }

    /// The event component (high 32 bits).
    pub fn event(self) -> EventId {
        EventId((self.0 >> 32) as u32)
    }

    /// The section component (middle 16 bits).
    pub fn section(self) -> SectionId {
        SectionId((self.0 >> 16) as u16)
    }

    /// The seat component (low 16 bits).
    pub fn seat(self) -> SeatId {
        SeatId(self.0 as u16)
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
