//! Ownership queries, operator approvals and transfers.
//!
//! Transfers are permissioned twice: the caller's identity must carry the
//! resell capability on the ticket's event platform, and a third-party
//! caller additionally needs operator approval from the current owner.
//! Batch transfers validate every element before any balance moves.

use std::collections::HashMap;

use entrada_platform::PlatformRegistry;
use entrada_types::{Address, EventId, SeatId, SectionId, TicketId};

use crate::ledger::EventLedger;
use crate::{EventError, Result};

impl EventLedger {
    /// Grant or revoke `operator`'s right to move all of `caller`'s tickets.
    pub fn set_approval_for_all(&mut self, caller: Address, operator: Address, approved: bool) {
        let operators = self.approvals.entry(caller).or_default();
        if approved {
            operators.insert(operator);
        } else {
            operators.remove(&operator);
        }
        tracing::info!(owner = %caller, %operator, approved, "operator approval set");
    }

    /// Whether `operator` may move all of `owner`'s tickets. Total.
    pub fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.approvals
            .get(&owner)
            .is_some_and(|operators| operators.contains(&operator))
    }

    /// Move `amount` units of a ticket from `from` to `to`.
    ///
    /// `data` is carried opaquely for the caller's benefit and has no
    /// effect on the ledger.
    ///
    /// # Errors
    ///
    /// - [`EventError::EventNotFound`] if the ticket's event is unknown
    /// - [`EventError::Forbidden`] if the caller's identity may not resell
    /// - [`EventError::NeedsApproval`] for unapproved third-party callers
    /// - [`EventError::ZeroAddress`] for a zero `to`
    /// - [`EventError::BalanceUnderflow`] if `from` holds fewer units
    pub fn safe_transfer_from(
        &mut self,
        registry: &PlatformRegistry,
        caller: Address,
        from: Address,
        to: Address,
        ticket: TicketId,
        amount: u64,
        data: &[u8],
    ) -> Result<()> {
        self.check_transfer(registry, caller, from, to, ticket, amount)?;
        self.move_units(from, to, ticket, amount);
        tracing::info!(
            %ticket,
            %from,
            %to,
            amount,
            data_len = data.len(),
            "ticket transferred"
        );
        Ok(())
    }

    /// Move several tickets from `from` to `to` atomically.
    ///
    /// `tickets` and `amounts` are parallel arrays; every element is
    /// validated before any balance moves.
    ///
    /// # Errors
    ///
    /// [`EventError::LengthMismatch`] for unequal arrays, plus everything
    /// [`safe_transfer_from`](Self::safe_transfer_from) can fail with.
    pub fn safe_batch_transfer_from(
        &mut self,
        registry: &PlatformRegistry,
        caller: Address,
        from: Address,
        to: Address,
        tickets: &[TicketId],
        amounts: &[u64],
        data: &[u8],
    ) -> Result<()> {
        if tickets.len() != amounts.len() {
            return Err(EventError::LengthMismatch);
        }
        // Amounts are summed per ticket so a repeated ticket cannot pass
        // element-wise checks while exceeding the balance overall.
        let mut required: HashMap<TicketId, u64> = HashMap::new();
        for (&ticket, &amount) in tickets.iter().zip(amounts.iter()) {
            self.check_transfer_auth(registry, caller, from, to, ticket)?;
            let entry = required.entry(ticket).or_insert(0);
            *entry = entry.checked_add(amount).ok_or(EventError::Overflow)?;
        }
        for (&ticket, &total) in &required {
            if self.balance_of(ticket, from) < total {
                return Err(EventError::BalanceUnderflow);
            }
        }
        for (&ticket, &amount) in tickets.iter().zip(amounts.iter()) {
            self.move_units(from, to, ticket, amount);
        }
        tracing::info!(
            %from,
            %to,
            count = tickets.len(),
            data_len = data.len(),
            "ticket batch transferred"
        );
        Ok(())
    }

    /// Whether `account` holds at least one unit of the (event, section,
    /// seat) ticket.
    ///
    /// # Errors
    ///
    /// [`EventError::ZeroAddress`] for the zero account.
    pub fn does_ticket_belong_to(
        &self,
        event: EventId,
        section: SectionId,
        seat: SeatId,
        account: Address,
    ) -> Result<bool> {
        self.does_ticket_id_belong_to(TicketId::pack(event, section, seat), account)
    }

    /// Whether `account` holds at least one unit of a ticket.
    ///
    /// # Errors
    ///
    /// [`EventError::ZeroAddress`] for the zero account.
    pub fn does_ticket_id_belong_to(&self, ticket: TicketId, account: Address) -> Result<bool> {
        if account.is_zero() {
            return Err(EventError::ZeroAddress("own tickets"));
        }
        Ok(self.balance_of(ticket, account) > 0)
    }

    fn check_transfer(
        &self,
        registry: &PlatformRegistry,
        caller: Address,
        from: Address,
        to: Address,
        ticket: TicketId,
        amount: u64,
    ) -> Result<()> {
        self.check_transfer_auth(registry, caller, from, to, ticket)?;
        if self.balance_of(ticket, from) < amount {
            return Err(EventError::BalanceUnderflow);
        }
        Ok(())
    }

    /// Everything [`check_transfer`](Self::check_transfer) checks except
    /// the balance.
    fn check_transfer_auth(
        &self,
        registry: &PlatformRegistry,
        caller: Address,
        from: Address,
        to: Address,
        ticket: TicketId,
    ) -> Result<()> {
        let ev = self.event(ticket.event())?;
        let resolver = registry.resolver(ev.resolver)?;
        let identity = resolver.resolve_identity(caller)?;
        if !resolver.can_resell_ticket(identity)? {
            return Err(EventError::Forbidden(
                "identity has no permission to transfer tickets on this platform",
            ));
        }
        if caller != from && !self.is_approved_for_all(from, caller) {
            return Err(EventError::NeedsApproval);
        }
        if to.is_zero() {
            return Err(EventError::ZeroAddress("receive tickets"));
        }
        Ok(())
    }

    fn move_units(&mut self, from: Address, to: Address, ticket: TicketId, amount: u64) {
        let owners = self.balances.entry(ticket).or_default();
        // check_transfer guarantees the balance covers the amount.
        if let Some(balance) = owners.get_mut(&from) {
            *balance -= amount;
        }
        *owners.entry(to).or_insert(0) += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{PaymentToken, SimpleToken};
    use entrada_identity::IdentityResolver;
    use entrada_types::Permissions;

    const LEDGER: Address = Address([0x10; 32]);
    const ADMIN: Address = Address([0xaa; 32]);
    const CURRENCY: Address = Address([0xcc; 32]);
    const ORGANIZER: Address = Address([0x01; 32]);
    const HOLDER: Address = Address([0x02; 32]);
    const RECIPIENT: Address = Address([0x03; 32]);
    const OPERATOR: Address = Address([0x04; 32]);

    struct Fixture {
        registry: PlatformRegistry,
        ledger: EventLedger,
        ticket: TicketId,
    }

    /// One event with a sold seat held by HOLDER. HOLDER and OPERATOR can
    /// buy and resell; RECIPIENT can only buy.
    fn fixture() -> Fixture {
        let mut resolver = IdentityResolver::new(ADMIN);
        resolver
            .new_identity(ADMIN, ORGANIZER, Permissions::ALL)
            .expect("organizer");
        resolver
            .new_identity(ADMIN, HOLDER, Permissions::from_bits(0x3))
            .expect("holder");
        resolver
            .new_identity(ADMIN, OPERATOR, Permissions::from_bits(0x3))
            .expect("operator");
        resolver
            .new_identity(ADMIN, RECIPIENT, Permissions::from_bits(0x1))
            .expect("recipient");

        let mut registry = PlatformRegistry::new(ADMIN);
        let resolver = registry.add_resolver(resolver);
        let platform = registry
            .register_platform(ADMIN, resolver, CURRENCY, 100)
            .expect("platform");

        let mut ledger = EventLedger::new(LEDGER, ADMIN, 500, 0);
        let event = ledger
            .create_event(&registry, ORGANIZER, platform, 0, 0)
            .expect("event");
        ledger.add_section(ORGANIZER, event, 10, 100).expect("section");

        let mut token = SimpleToken::new(CURRENCY, HOLDER, 1_000);
        token.approve(HOLDER, LEDGER, 1_000);
        let ticket = ledger
            .buy_ticket_with_tokens(
                &registry,
                &mut token,
                0,
                HOLDER,
                event,
                SectionId(1),
                SeatId(1),
            )
            .expect("buy");

        Fixture {
            registry,
            ledger,
            ticket,
        }
    }

    #[test]
    fn test_owner_transfers_own_ticket() {
        let mut fx = fixture();
        fx.ledger
            .safe_transfer_from(
                &fx.registry,
                HOLDER,
                HOLDER,
                RECIPIENT,
                fx.ticket,
                1,
                &[],
            )
            .expect("transfer");
        assert_eq!(fx.ledger.balance_of(fx.ticket, HOLDER), 0);
        assert_eq!(fx.ledger.balance_of(fx.ticket, RECIPIENT), 1);
        assert!(fx
            .ledger
            .does_ticket_id_belong_to(fx.ticket, RECIPIENT)
            .expect("belongs"));
        assert!(!fx
            .ledger
            .does_ticket_id_belong_to(fx.ticket, HOLDER)
            .expect("no longer"));
    }

    #[test]
    fn test_transfer_requires_resell_capability() {
        let mut fx = fixture();
        // RECIPIENT only has the buy bit.
        assert!(matches!(
            fx.ledger.safe_transfer_from(
                &fx.registry,
                RECIPIENT,
                RECIPIENT,
                HOLDER,
                fx.ticket,
                0,
                &[],
            ),
            Err(EventError::Forbidden(_))
        ));
    }

    #[test]
    fn test_third_party_transfer_needs_approval() {
        let mut fx = fixture();
        assert!(matches!(
            fx.ledger.safe_transfer_from(
                &fx.registry,
                OPERATOR,
                HOLDER,
                RECIPIENT,
                fx.ticket,
                1,
                &[],
            ),
            Err(EventError::NeedsApproval)
        ));

        fx.ledger.set_approval_for_all(HOLDER, OPERATOR, true);
        assert!(fx.ledger.is_approved_for_all(HOLDER, OPERATOR));
        fx.ledger
            .safe_transfer_from(
                &fx.registry,
                OPERATOR,
                HOLDER,
                RECIPIENT,
                fx.ticket,
                1,
                &[],
            )
            .expect("approved transfer");

        // Revocation takes effect immediately.
        fx.ledger.set_approval_for_all(HOLDER, OPERATOR, false);
        assert!(!fx.ledger.is_approved_for_all(HOLDER, OPERATOR));
    }

    #[test]
    fn test_transfer_to_zero_address() {
        let mut fx = fixture();
        assert!(matches!(
            fx.ledger.safe_transfer_from(
                &fx.registry,
                HOLDER,
                HOLDER,
                Address::ZERO,
                fx.ticket,
                1,
                &[],
            ),
            Err(EventError::ZeroAddress(_))
        ));
    }

    #[test]
    fn test_transfer_exceeding_balance() {
        let mut fx = fixture();
        assert!(matches!(
            fx.ledger.safe_transfer_from(
                &fx.registry,
                HOLDER,
                HOLDER,
                RECIPIENT,
                fx.ticket,
                2,
                &[],
            ),
            Err(EventError::BalanceUnderflow)
        ));
        assert_eq!(fx.ledger.balance_of(fx.ticket, HOLDER), 1);
    }

    #[test]
    fn test_transfer_unknown_event() {
        let mut fx = fixture();
        let bogus = TicketId::pack(EventId(99), SectionId(1), SeatId(1));
        assert!(matches!(
            fx.ledger
                .safe_transfer_from(&fx.registry, HOLDER, HOLDER, RECIPIENT, bogus, 1, &[]),
            Err(EventError::EventNotFound(_))
        ));
    }

    #[test]
    fn test_batch_transfer_length_mismatch() {
        let mut fx = fixture();
        assert!(matches!(
            fx.ledger.safe_batch_transfer_from(
                &fx.registry,
                HOLDER,
                HOLDER,
                RECIPIENT,
                &[fx.ticket],
                &[1, 1],
                &[],
            ),
            Err(EventError::LengthMismatch)
        ));
    }

    #[test]
    fn test_batch_transfer_is_atomic() {
        let mut fx = fixture();
        let bogus = TicketId::pack(EventId(99), SectionId(1), SeatId(1));
        assert!(matches!(
            fx.ledger.safe_batch_transfer_from(
                &fx.registry,
                HOLDER,
                HOLDER,
                RECIPIENT,
                &[fx.ticket, bogus],
                &[1, 1],
                &[],
            ),
            Err(EventError::EventNotFound(_))
        ));
        // The valid leading element did not move.
        assert_eq!(fx.ledger.balance_of(fx.ticket, HOLDER), 1);

        fx.ledger
            .safe_batch_transfer_from(
                &fx.registry,
                HOLDER,
                HOLDER,
                RECIPIENT,
                &[fx.ticket],
                &[1],
                &[],
            )
            .expect("valid batch");
        assert_eq!(fx.ledger.balance_of(fx.ticket, RECIPIENT), 1);
    }

    #[test]
    fn test_batch_transfer_repeated_ticket_checks_aggregate() {
        let mut fx = fixture();
        // HOLDER has one unit; two one-unit elements of the same ticket
        // must fail up front, not midway through.
        assert!(matches!(
            fx.ledger.safe_batch_transfer_from(
                &fx.registry,
                HOLDER,
                HOLDER,
                RECIPIENT,
                &[fx.ticket, fx.ticket],
                &[1, 1],
                &[],
            ),
            Err(EventError::BalanceUnderflow)
        ));
        assert_eq!(fx.ledger.balance_of(fx.ticket, HOLDER), 1);
        assert_eq!(fx.ledger.balance_of(fx.ticket, RECIPIENT), 0);
    }

    #[test]
    fn test_ownership_queries_agree() {
        let fx = fixture();
        let (event, section, seat) = fx.ticket.unpack();
        assert_eq!(
            fx.ledger
                .does_ticket_belong_to(event, section, seat, HOLDER)
                .expect("triple form"),
            fx.ledger
                .does_ticket_id_belong_to(fx.ticket, HOLDER)
                .expect("packed form"),
        );
        assert!(matches!(
            fx.ledger.does_ticket_id_belong_to(fx.ticket, Address::ZERO),
            Err(EventError::ZeroAddress(_))
        ));
        // Unknown tickets are simply not owned.
        let elsewhere = TicketId::pack(EventId(7), SectionId(1), SeatId(1));
        assert!(!fx
            .ledger
            .does_ticket_id_belong_to(elsewhere, HOLDER)
            .expect("total"));
    }
}
