//! Event creation and section layout.
//!
//! An event snapshots its platform binding (resolver handle, currency,
//! seat cap) at creation time, so deregistering the platform later leaves
//! the event fully operational. Sections are numbered from 1 in creation
//! order; seats within a section are numbered `1..=quantity`.

use entrada_platform::PlatformRegistry;
use entrada_types::{Address, EventId, PlatformId, ResolverId, SeatId, SectionId, TicketId};
use serde::{Deserialize, Serialize};

use crate::ledger::EventLedger;
use crate::{EventError, Result};

/// One block of identically priced seats.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Section {
    /// Number of seats, numbered `1..=quantity`.
    pub quantity: u16,
    /// Price per seat in the event's currency.
    pub price: u64,
}

/// A ticketed event and its snapshotted platform binding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    /// Account that created the event.
    pub owner: Address,
    /// Platform the event was created under.
    pub platform: PlatformId,
    /// Resolver handle snapshotted at creation.
    pub resolver: ResolverId,
    /// Currency address snapshotted at creation.
    pub currency: Address,
    /// Seat cap snapshotted at creation.
    pub max_seats: u32,
    /// Earliest time tickets may be sold.
    pub start_sell_date: u64,
    /// Earliest time proceeds are meant to be withdrawn.
    pub start_withdrawal_date: u64,
    /// Sections in creation order; section id = index + 1.
    pub sections: Vec<Section>,
    /// Accumulated ticket revenue, not yet withdrawn.
    pub proceeds: u64,
}

impl Event {
    /// Borrow a section by id.
    ///
    /// # Errors
    ///
    /// [`EventError::SectionNotFound`] for id 0 or past the last section.
    pub fn section(&self, id: SectionId) -> Result<&Section> {
        if id.0 == 0 {
            return Err(EventError::SectionNotFound(id));
        }
        self.sections
            .get(id.0 as usize - 1)
            .ok_or(EventError::SectionNotFound(id))
    }

    /// Validate a (section, seat) pair and return the seat price.
    ///
    /// # Errors
    ///
    /// - [`EventError::SectionNotFound`] for an unknown section
    /// - [`EventError::SeatNotFound`] for a seat outside `1..=quantity`
    pub(crate) fn seat_price(&self, section: SectionId, seat: SeatId) -> Result<u64> {
        let section = self.section(section)?;
        if seat.0 == 0 || seat.0 > section.quantity {
            return Err(EventError::SeatNotFound(seat));
        }
        Ok(section.price)
    }

    /// Total number of seats across all sections.
    pub fn total_seats(&self) -> u32 {
        self.sections.iter().map(|s| s.quantity as u32).sum()
    }
}

impl EventLedger {
    /// Create an event under a registered platform.
    ///
    /// The platform's resolver handle, currency and seat cap are
    /// snapshotted onto the event; this is the only operation that
    /// requires the platform itself to still be registered.
    ///
    /// # Errors
    ///
    /// - [`EventError::Platform`] if the platform is not registered
    /// - [`EventError::Identity`] if the caller resolves to no identity
    /// - [`EventError::Forbidden`] if the identity may not create events
    pub fn create_event(
        &mut self,
        registry: &PlatformRegistry,
        caller: Address,
        platform: PlatformId,
        start_sell_date: u64,
        start_withdrawal_date: u64,
    ) -> Result<EventId> {
        let binding = registry.platform(platform)?;
        let resolver = registry.resolver(binding.resolver)?;
        let identity = resolver.resolve_identity(caller)?;
        if !resolver.can_create_event(identity)? {
            return Err(EventError::Forbidden(
                "identity has no permission to create events on this platform",
            ));
        }

        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        self.events.insert(
            id,
            Event {
                owner: caller,
                platform,
                resolver: binding.resolver,
                currency: binding.currency,
                max_seats: binding.max_seats,
                start_sell_date,
                start_withdrawal_date,
                sections: Vec::new(),
                proceeds: 0,
            },
        );

        tracing::info!(event = %id, %platform, owner = %caller, "event created");
        Ok(id)
    }

    /// Add a section of `quantity` seats at `price` each.
    ///
    /// # Errors
    ///
    /// - [`EventError::EventNotFound`] for an unknown event
    /// - [`EventError::Forbidden`] unless the caller owns the event
    /// - [`EventError::CapacityExceeded`] if the seat cap would be passed
    pub fn add_section(
        &mut self,
        caller: Address,
        event: EventId,
        quantity: u16,
        price: u64,
    ) -> Result<SectionId> {
        let ev = self.event_mut(event)?;
        if caller != ev.owner {
            return Err(EventError::Forbidden("only the event owner can add sections"));
        }
        if ev.total_seats() + quantity as u32 > ev.max_seats {
            return Err(EventError::CapacityExceeded);
        }
        if ev.sections.len() >= u16::MAX as usize {
            return Err(EventError::CapacityExceeded);
        }

        ev.sections.push(Section { quantity, price });
        let id = SectionId(ev.sections.len() as u16);

        tracing::info!(%event, section = %id, quantity, price, "section added");
        Ok(id)
    }

    /// Whether an event id has been assigned. Total.
    pub fn exists_event(&self, event: EventId) -> bool {
        self.events.contains_key(&event)
    }

    /// Number of sections on an event.
    ///
    /// # Errors
    ///
    /// [`EventError::EventNotFound`] for an unknown event.
    pub fn number_of_sections(&self, event: EventId) -> Result<u16> {
        Ok(self.event(event)?.sections.len() as u16)
    }

    /// Whether a seat has not been sold yet.
    ///
    /// # Errors
    ///
    /// - [`EventError::EventNotFound`] for an unknown event
    /// - [`EventError::SectionNotFound`] / [`EventError::SeatNotFound`]
    ///   for a seat outside the event's layout
    pub fn ticket_is_available(
        &self,
        event: EventId,
        section: SectionId,
        seat: SeatId,
    ) -> Result<bool> {
        self.event(event)?.seat_price(section, seat)?;
        Ok(!self.is_owned(TicketId::pack(event, section, seat)))
    }
}
