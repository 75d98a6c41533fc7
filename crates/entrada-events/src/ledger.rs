//! Ledger state and shared validation.
//!
//! The [`EventLedger`] is the single owner of all event, ownership and fee
//! state. It is constructed with the address it is known by (so token
//! approvals can name it), the administrator who collects platform fees,
//! and the global fee parameters in basis points.

use std::collections::{BTreeMap, HashMap, HashSet};

use entrada_types::{Address, EventId, PlatformId, TicketId, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::{EventError, Result};

/// The event engine and ownership ledger.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventLedger {
    address: Address,
    admin: Address,
    percentual_fee_bps: u64,
    feeless_premium_bps: u64,
    pub(crate) events: BTreeMap<EventId, Event>,
    pub(crate) next_event_id: u32,
    pub(crate) balances: HashMap<TicketId, HashMap<Address, u64>>,
    pub(crate) approvals: HashMap<Address, HashSet<Address>>,
    pub(crate) fee_pools: BTreeMap<PlatformId, u64>,
}

impl EventLedger {
    /// Create an empty ledger.
    ///
    /// `percentual_fee_bps` is charged on every purchase and accrues to
    /// the platform fee pool; `feeless_premium_bps` is the configured
    /// relay premium (stored, currently consumed by no fee formula).
    pub fn new(
        address: Address,
        admin: Address,
        percentual_fee_bps: u64,
        feeless_premium_bps: u64,
    ) -> EventLedger {
        EventLedger {
            address,
            admin,
            percentual_fee_bps,
            feeless_premium_bps,
            events: BTreeMap::new(),
            next_event_id: 1,
            balances: HashMap::new(),
            approvals: HashMap::new(),
            fee_pools: BTreeMap::new(),
        }
    }

    /// The address this ledger is known by.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The administrator who collects platform fees.
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Purchase fee in basis points.
    pub fn percentual_fee_bps(&self) -> u64 {
        self.percentual_fee_bps
    }

    /// Configured relay premium in basis points.
    pub fn feeless_premium_bps(&self) -> u64 {
        self.feeless_premium_bps
    }

    /// Accumulated, unswept fees of a platform. Total.
    pub fn fee_pool(&self, platform: PlatformId) -> u64 {
        self.fee_pools.get(&platform).copied().unwrap_or(0)
    }

    /// How many units of a ticket an account holds. Total.
    pub fn balance_of(&self, ticket: TicketId, account: Address) -> u64 {
        self.balances
            .get(&ticket)
            .and_then(|owners| owners.get(&account))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn event(&self, id: EventId) -> Result<&Event> {
        self.events.get(&id).ok_or(EventError::EventNotFound(id))
    }

    pub(crate) fn event_mut(&mut self, id: EventId) -> Result<&mut Event> {
        self.events
            .get_mut(&id)
            .ok_or(EventError::EventNotFound(id))
    }

    /// Whether any account holds a positive balance for this ticket.
    pub(crate) fn is_owned(&self, ticket: TicketId) -> bool {
        self.balances
            .get(&ticket)
            .is_some_and(|owners| owners.values().any(|&units| units > 0))
    }

    /// Purchase fee on a single ticket price, floored.
    pub(crate) fn fee_for(&self, price: u64) -> Result<u64> {
        Ok(price
            .checked_mul(self.percentual_fee_bps)
            .ok_or(EventError::Overflow)?
            / BPS_DENOMINATOR)
    }
}
