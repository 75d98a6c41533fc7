//! Token-settled purchases, withdrawals and fee sweeps.
//!
//! Every purchase pulls `price + fee` from the buyer in a single
//! `transfer_from` into the ledger's own token balance. The price accrues
//! to the event's proceeds, the fee to the platform's pool. Batch
//! purchases validate every seat and compute the full amount before
//! touching the token, so a failing element leaves no state behind.

use entrada_platform::PlatformRegistry;
use entrada_types::{Address, EventId, PlatformId, SeatId, SectionId, TicketId};

use crate::ledger::EventLedger;
use crate::token::PaymentToken;
use crate::{EventError, Result};

impl EventLedger {
    /// Buy one seat, settling in the event's currency.
    ///
    /// The buyer must have approved this ledger's address for at least
    /// `price + fee` on the payment token.
    ///
    /// # Errors
    ///
    /// - [`EventError::EventNotFound`] / [`EventError::SectionNotFound`] /
    ///   [`EventError::SeatNotFound`] for a seat outside the layout
    /// - [`EventError::Forbidden`] if the buyer's identity may not buy
    /// - [`EventError::NotYetOnSale`] before the event's selling date
    /// - [`EventError::SeatNotAvailable`] if the seat is already sold
    /// - [`EventError::InsufficientFunds`] if the token pull fails
    pub fn buy_ticket_with_tokens(
        &mut self,
        registry: &PlatformRegistry,
        token: &mut dyn PaymentToken,
        now: u64,
        caller: Address,
        event: EventId,
        section: SectionId,
        seat: SeatId,
    ) -> Result<TicketId> {
        let ev = self.event(event)?;
        let price = ev.seat_price(section, seat)?;
        let platform = ev.platform;

        let resolver = registry.resolver(ev.resolver)?;
        let identity = resolver.resolve_identity(caller)?;
        if !resolver.can_buy_ticket(identity)? {
            return Err(EventError::Forbidden(
                "identity has no permission to buy tickets on this platform",
            ));
        }
        if now < ev.start_sell_date {
            return Err(EventError::NotYetOnSale);
        }

        let ticket = TicketId::pack(event, section, seat);
        if self.is_owned(ticket) {
            return Err(EventError::SeatNotAvailable(ticket));
        }

        let fee = self.fee_for(price)?;
        let total = price.checked_add(fee).ok_or(EventError::Overflow)?;
        let new_proceeds = ev.proceeds.checked_add(price).ok_or(EventError::Overflow)?;
        let new_pool = self
            .fee_pool(platform)
            .checked_add(fee)
            .ok_or(EventError::Overflow)?;

        token.transfer_from(self.address(), caller, self.address(), total)?;

        self.balances.entry(ticket).or_default().insert(caller, 1);
        self.event_mut(event)?.proceeds = new_proceeds;
        self.fee_pools.insert(platform, new_pool);

        tracing::info!(%event, %ticket, buyer = %caller, price, fee, "ticket sold");
        Ok(ticket)
    }

    /// Buy several seats of one event atomically.
    ///
    /// `sections` and `seats` are parallel arrays. Every pair is validated
    /// (including duplicates within the batch) and the full amount is
    /// pulled in one token transfer before any seat changes hands.
    ///
    /// # Errors
    ///
    /// [`EventError::LengthMismatch`] for unequal arrays, plus everything
    /// [`buy_ticket_with_tokens`](Self::buy_ticket_with_tokens) can fail
    /// with. On any failure no seat is sold and no tokens move.
    pub fn buy_tickets_batch_with_tokens(
        &mut self,
        registry: &PlatformRegistry,
        token: &mut dyn PaymentToken,
        now: u64,
        caller: Address,
        event: EventId,
        sections: &[SectionId],
        seats: &[SeatId],
    ) -> Result<Vec<TicketId>> {
        if sections.len() != seats.len() {
            return Err(EventError::LengthMismatch);
        }

        let ev = self.event(event)?;
        let platform = ev.platform;
        let resolver = registry.resolver(ev.resolver)?;
        let identity = resolver.resolve_identity(caller)?;
        if !resolver.can_buy_ticket(identity)? {
            return Err(EventError::Forbidden(
                "identity has no permission to buy tickets on this platform",
            ));
        }
        if now < ev.start_sell_date {
            return Err(EventError::NotYetOnSale);
        }

        let mut tickets = Vec::with_capacity(seats.len());
        let mut total_price: u64 = 0;
        let mut total_fee: u64 = 0;
        for (&section, &seat) in sections.iter().zip(seats.iter()) {
            let price = ev.seat_price(section, seat)?;
            let ticket = TicketId::pack(event, section, seat);
            if self.is_owned(ticket) || tickets.contains(&ticket) {
                return Err(EventError::SeatNotAvailable(ticket));
            }
            tickets.push(ticket);

            let fee = self.fee_for(price)?;
            total_price = total_price.checked_add(price).ok_or(EventError::Overflow)?;
            total_fee = total_fee.checked_add(fee).ok_or(EventError::Overflow)?;
        }

        let total = total_price
            .checked_add(total_fee)
            .ok_or(EventError::Overflow)?;
        let new_proceeds = ev
            .proceeds
            .checked_add(total_price)
            .ok_or(EventError::Overflow)?;
        let new_pool = self
            .fee_pool(platform)
            .checked_add(total_fee)
            .ok_or(EventError::Overflow)?;

        token.transfer_from(self.address(), caller, self.address(), total)?;

        for &ticket in &tickets {
            self.balances.entry(ticket).or_default().insert(caller, 1);
        }
        self.event_mut(event)?.proceeds = new_proceeds;
        self.fee_pools.insert(platform, new_pool);

        tracing::info!(
            %event,
            buyer = %caller,
            count = tickets.len(),
            total_price,
            total_fee,
            "ticket batch sold"
        );
        Ok(tickets)
    }

    /// Pay out an event's accumulated proceeds to its owner.
    ///
    /// Returns the amount transferred; the proceeds are zeroed.
    ///
    /// # Errors
    ///
    /// - [`EventError::EventNotFound`] for an unknown event
    /// - [`EventError::Forbidden`] unless the caller owns the event
    pub fn withdraw_funds(
        &mut self,
        token: &mut dyn PaymentToken,
        caller: Address,
        event: EventId,
    ) -> Result<u64> {
        let ev = self.event(event)?;
        if caller != ev.owner {
            return Err(EventError::Forbidden(
                "only the event owner can withdraw funds",
            ));
        }

        let amount = ev.proceeds;
        token.transfer(self.address(), caller, amount)?;
        self.event_mut(event)?.proceeds = 0;

        tracing::info!(%event, owner = %caller, amount, "funds withdrawn");
        Ok(amount)
    }

    /// Sweep a platform's accumulated fees to the ledger administrator.
    ///
    /// Returns the amount transferred; the pool is zeroed.
    ///
    /// # Errors
    ///
    /// [`EventError::Forbidden`] unless the caller is the administrator.
    pub fn withdraw_fees(
        &mut self,
        token: &mut dyn PaymentToken,
        caller: Address,
        platform: PlatformId,
    ) -> Result<u64> {
        if caller != self.admin() {
            return Err(EventError::Forbidden(
                "only the ledger administrator can withdraw fees",
            ));
        }

        let amount = self.fee_pool(platform);
        token.transfer(self.address(), caller, amount)?;
        self.fee_pools.insert(platform, 0);

        tracing::info!(%platform, amount, "fees withdrawn");
        Ok(amount)
    }
}
