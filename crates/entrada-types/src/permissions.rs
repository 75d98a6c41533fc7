//! Per-identity capability set.
//!
//! Each identity carries three independent capabilities. On the wire and
//! in fixtures they are encoded as a bitmask: bit 0 buy, bit 1 resell,
//! bit 2 create-event (so `0x7` grants everything and `0x0` nothing).

use serde::{Deserialize, Serialize};

/// Bitmask position for the buy-ticket capability.
const BUY_TICKET: u8 = 1 << 0;
/// Bitmask position for the resell-ticket capability.
const RESELL_TICKET: u8 = 1 << 1;
/// Bitmask position for the create-event capability.
const CREATE_EVENT: u8 = 1 << 2;

/// What an identity is allowed to do on a platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    /// May purchase tickets.
    pub can_buy_ticket: bool,
    /// May transfer tickets to other accounts.
    pub can_resell_ticket: bool,
    /// May create events.
    pub can_create_event: bool,
}

impl Permissions {
    /// No capabilities.
    pub const NONE: Permissions = Permissions {
        can_buy_ticket: false,
        can_resell_ticket: false,
        can_create_event: false,
    };

    /// All capabilities.
    pub const ALL: Permissions = Permissions {
        can_buy_ticket: true,
        can_resell_ticket: true,
        can_create_event: true,
    };

    /// Decode from the wire bitmask. Bits above bit 2 are ignored.
    pub fn from_bits(bits: u8) -> Permissions {
        Permissions {
            can_buy_ticket: bits & BUY_TICKET != 0,
            can_resell_ticket: bits & RESELL_TICKET != 0,
            can_create_event: bits & CREATE_EVENT != 0,
        }
    }

    /// Encode to the wire bitmask.
    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.can_buy_ticket {
            bits |= BUY_TICKET;
        }
        if self.can_resell_ticket {
            bits |= RESELL_TICKET;
        }
        if self.can_create_event {
            bits |= CREATE_EVENT;
        }
        bits
    }
}
