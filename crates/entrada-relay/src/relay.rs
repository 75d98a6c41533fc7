//! Signing digest, nonce registry and dispatch.
//!
//! The signed digest covers the target ledger address, the encoded call,
//! the nonce and the expiry, so none of them can be substituted by the
//! relayer. Checks run in a fixed order: signature, expiry, nonce,
//! target. The signer's nonce is consumed before dispatch and is never
//! rolled back, so a replayed envelope fails on its nonce even when the
//! original inner call failed.

use std::collections::HashMap;

use entrada_crypto::blake3;
use entrada_crypto::ed25519::SigningKey;
use entrada_crypto::recover::RecoverableSignature;
use entrada_events::{EventLedger, PaymentToken};
use entrada_platform::PlatformRegistry;
use entrada_types::{Address, EventId, SectionId, TicketId};
use serde::{Deserialize, Serialize};

use crate::call::RelayCall;
use crate::{RelayError, Result};

/// Compute the signing digest of a feeless transaction.
///
/// `BLAKE3::derive_key("Entrada v1 feeless-digest", target ‖ call ‖ nonce ‖ expiry)`
/// with length-prefixed fields.
pub fn signing_digest(target: Address, call: &[u8], nonce: u64, expiry: u64) -> [u8; 32] {
    let message = blake3::encode_multi_field(&[
        target.as_bytes(),
        call,
        &nonce.to_be_bytes(),
        &expiry.to_be_bytes(),
    ]);
    blake3::derive_key(blake3::contexts::FEELESS_DIGEST, &message)
}

/// A signed feeless transaction as submitted by a relayer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeelessInput {
    /// The account claiming to have signed the envelope.
    pub signer: Address,
    /// The ledger address the call is meant for.
    pub target: Address,
    /// The encoded [`RelayCall`].
    pub call: Vec<u8>,
    /// The signer's next sequential nonce at signing time.
    pub nonce: u64,
    /// Unix timestamp after which the envelope is invalid.
    pub expiry: u64,
    /// Recoverable signature over [`signing_digest`].
    pub signature: RecoverableSignature,
}

impl FeelessInput {
    /// Encode and sign a call, producing a submittable envelope.
    pub fn sign(
        signing_key: &SigningKey,
        target: Address,
        call: &RelayCall,
        nonce: u64,
        expiry: u64,
    ) -> FeelessInput {
        let call = call.encode();
        let digest = signing_digest(target, &call, nonce, expiry);
        FeelessInput {
            signer: signing_key.address(),
            target,
            call,
            nonce,
            expiry,
            signature: RecoverableSignature::sign(signing_key, &digest),
        }
    }
}

/// What a successfully relayed call produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    EventCreated(EventId),
    SectionAdded(SectionId),
    TicketBought(TicketId),
    TicketsBought(Vec<TicketId>),
    FundsWithdrawn(u64),
    ApprovalSet,
    Transferred,
}

/// Relays signed calls to one event ledger, tracking per-signer nonces.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeelessRelay {
    ledger_address: Address,
    nonces: HashMap<Address, u64>,
}

impl FeelessRelay {
    /// Create a relay serving the ledger at `ledger_address`.
    pub fn new(ledger_address: Address) -> FeelessRelay {
        FeelessRelay {
            ledger_address,
            nonces: HashMap::new(),
        }
    }

    /// The next nonce expected from an account. Total; starts at 0.
    pub fn nonce(&self, account: Address) -> u64 {
        self.nonces.get(&account).copied().unwrap_or(0)
    }

    /// Verify and dispatch a signed feeless transaction.
    ///
    /// On success the inner call runs with `input.signer` as the
    /// effective caller. The signer's nonce is consumed as soon as the
    /// envelope passes its checks, including when the inner call fails.
    ///
    /// # Errors
    ///
    /// - [`RelayError::BadSignature`] if the signature does not recover
    ///   the claimed signer over the reconstructed digest
    /// - [`RelayError::Expired`] if `now` is past the expiry
    /// - [`RelayError::BadNonce`] if the nonce is not the signer's next
    /// - [`RelayError::UnknownTarget`] if the envelope names another ledger
    /// - [`RelayError::MalformedCall`] if the payload does not decode
    /// - [`RelayError::Event`] when the dispatched operation fails
    pub fn perform_feeless_transaction(
        &mut self,
        ledger: &mut EventLedger,
        registry: &PlatformRegistry,
        token: &mut dyn PaymentToken,
        now: u64,
        input: &FeelessInput,
    ) -> Result<RelayOutcome> {
        let digest = signing_digest(input.target, &input.call, input.nonce, input.expiry);
        let recovered = input
            .signature
            .recover_address(&digest)
            .map_err(|_| RelayError::BadSignature)?;
        if recovered != input.signer {
            return Err(RelayError::BadSignature);
        }
        if now > input.expiry {
            return Err(RelayError::Expired);
        }
        let expected = self.nonce(input.signer);
        if input.nonce != expected {
            return Err(RelayError::BadNonce {
                expected,
                got: input.nonce,
            });
        }
        if input.target != self.ledger_address {
            return Err(RelayError::UnknownTarget);
        }

        // The nonce is spent from here on, whatever the call does.
        self.nonces.insert(input.signer, expected + 1);

        let call = RelayCall::decode(&input.call)?;
        let caller = input.signer;
        tracing::info!(signer = %caller, nonce = input.nonce, ?call, "relaying feeless transaction");

        match call {
            RelayCall::CreateEvent {
                platform,
                start_sell_date,
                start_withdrawal_date,
            } => Ok(RelayOutcome::EventCreated(ledger.create_event(
                registry,
                caller,
                platform,
                start_sell_date,
                start_withdrawal_date,
            )?)),
            RelayCall::AddSection {
                event,
                quantity,
                price,
            } => Ok(RelayOutcome::SectionAdded(
                ledger.add_section(caller, event, quantity, price)?,
            )),
            RelayCall::BuyTicket {
                event,
                section,
                seat,
            } => Ok(RelayOutcome::TicketBought(ledger.buy_ticket_with_tokens(
                registry, token, now, caller, event, section, seat,
            )?)),
            RelayCall::BuyTicketsBatch {
                event,
                sections,
                seats,
            } => Ok(RelayOutcome::TicketsBought(
                ledger.buy_tickets_batch_with_tokens(
                    registry, token, now, caller, event, &sections, &seats,
                )?,
            )),
            RelayCall::WithdrawFunds { event } => Ok(RelayOutcome::FundsWithdrawn(
                ledger.withdraw_funds(token, caller, event)?,
            )),
            RelayCall::SetApprovalForAll { operator, approved } => {
                ledger.set_approval_for_all(caller, operator, approved);
                Ok(RelayOutcome::ApprovalSet)
            }
            RelayCall::SafeTransferFrom {
                from,
                to,
                ticket,
                amount,
                data,
            } => {
                ledger.safe_transfer_from(registry, caller, from, to, ticket, amount, &data)?;
                Ok(RelayOutcome::Transferred)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entrada_crypto::ed25519::KeyPair;
    use entrada_events::SimpleToken;
    use entrada_identity::IdentityResolver;
    use entrada_types::{Permissions, SeatId};

    const LEDGER: Address = Address([0x10; 32]);
    const ADMIN: Address = Address([0xaa; 32]);
    const CURRENCY: Address = Address([0xcc; 32]);

    const NOW: u64 = 1_000;
    const EXPIRY: u64 = 2_000;

    struct Fixture {
        registry: PlatformRegistry,
        ledger: EventLedger,
        token: SimpleToken,
        relay: FeelessRelay,
        signer: KeyPair,
        event: EventId,
    }

    /// A funded signer with full capabilities, one event with a 10-seat
    /// section at 100, and a relay serving the ledger.
    fn fixture() -> Fixture {
        let signer = KeyPair::generate();
        let organizer = Address([0x01; 32]);

        let mut resolver = IdentityResolver::new(ADMIN);
        resolver
            .new_identity(ADMIN, organizer, Permissions::ALL)
            .expect("organizer");
        resolver
            .new_identity(ADMIN, signer.address(), Permissions::ALL)
            .expect("signer identity");

        let mut registry = PlatformRegistry::new(ADMIN);
        let resolver = registry.add_resolver(resolver);
        let platform = registry
            .register_platform(ADMIN, resolver, CURRENCY, 100)
            .expect("platform");

        let mut ledger = EventLedger::new(LEDGER, ADMIN, 500, 0);
        let event = ledger
            .create_event(&registry, organizer, platform, 0, 0)
            .expect("event");
        ledger.add_section(organizer, event, 10, 100).expect("section");

        let mut token = SimpleToken::new(CURRENCY, signer.address(), 10_000);
        token.approve(signer.address(), LEDGER, 10_000);

        Fixture {
            registry,
            ledger,
            token,
            relay: FeelessRelay::new(LEDGER),
            signer,
            event,
        }
    }

    fn buy_call(fx: &Fixture, seat: u16) -> RelayCall {
        RelayCall::BuyTicket {
            event: fx.event,
            section: SectionId(1),
            seat: SeatId(seat),
        }
    }

    fn relay(fx: &mut Fixture, input: &FeelessInput) -> Result<RelayOutcome> {
        fx.relay.perform_feeless_transaction(
            &mut fx.ledger,
            &fx.registry,
            &mut fx.token,
            NOW,
            input,
        )
    }

    #[test]
    fn test_relayed_purchase() {
        let mut fx = fixture();
        let call = buy_call(&fx, 1);
        let input = FeelessInput::sign(&fx.signer.signing_key, LEDGER, &call, 0, EXPIRY);

        let outcome = relay(&mut fx, &input).expect("relay");
        let ticket = TicketId::pack(fx.event, SectionId(1), SeatId(1));
        assert_eq!(outcome, RelayOutcome::TicketBought(ticket));
        assert_eq!(fx.ledger.balance_of(ticket, fx.signer.address()), 1);
        assert_eq!(fx.relay.nonce(fx.signer.address()), 1);
    }

    #[test]
    fn test_replay_is_rejected() {
        let mut fx = fixture();
        let input =
            FeelessInput::sign(&fx.signer.signing_key, LEDGER, &buy_call(&fx, 1), 0, EXPIRY);

        relay(&mut fx, &input).expect("first submission");
        assert!(matches!(
            relay(&mut fx, &input),
            Err(RelayError::BadNonce {
                expected: 1,
                got: 0
            })
        ));
    }

    #[test]
    fn test_expired_envelope() {
        let mut fx = fixture();
        let input = FeelessInput::sign(
            &fx.signer.signing_key,
            LEDGER,
            &buy_call(&fx, 1),
            0,
            NOW - 1,
        );
        assert!(matches!(relay(&mut fx, &input), Err(RelayError::Expired)));
        // Expiry is checked before the nonce; the nonce is untouched.
        assert_eq!(fx.relay.nonce(fx.signer.address()), 0);
    }

    #[test]
    fn test_tampered_call_bytes() {
        let mut fx = fixture();
        let mut input =
            FeelessInput::sign(&fx.signer.signing_key, LEDGER, &buy_call(&fx, 1), 0, EXPIRY);
        // Relayer tries to redirect the purchase to seat 2.
        *input.call.last_mut().expect("seat byte") = 2;
        assert!(matches!(
            relay(&mut fx, &input),
            Err(RelayError::BadSignature)
        ));
    }

    #[test]
    fn test_claimed_signer_must_match() {
        let mut fx = fixture();
        let mut input =
            FeelessInput::sign(&fx.signer.signing_key, LEDGER, &buy_call(&fx, 1), 0, EXPIRY);
        input.signer = Address([0x09; 32]);
        assert!(matches!(
            relay(&mut fx, &input),
            Err(RelayError::BadSignature)
        ));
    }

    #[test]
    fn test_wrong_target_ledger() {
        let mut fx = fixture();
        let other = Address([0x77; 32]);
        let input =
            FeelessInput::sign(&fx.signer.signing_key, other, &buy_call(&fx, 1), 0, EXPIRY);
        assert!(matches!(
            relay(&mut fx, &input),
            Err(RelayError::UnknownTarget)
        ));
    }

    #[test]
    fn test_failed_inner_call_still_consumes_nonce() {
        let mut fx = fixture();
        // Seat 99 does not exist, so the dispatch fails.
        let input =
            FeelessInput::sign(&fx.signer.signing_key, LEDGER, &buy_call(&fx, 99), 0, EXPIRY);
        assert!(matches!(relay(&mut fx, &input), Err(RelayError::Event(_))));
        assert_eq!(fx.relay.nonce(fx.signer.address()), 1);

        // Replaying the failed envelope hits the nonce, not the seat check.
        assert!(matches!(
            relay(&mut fx, &input),
            Err(RelayError::BadNonce { .. })
        ));

        // The next nonce works normally.
        let input =
            FeelessInput::sign(&fx.signer.signing_key, LEDGER, &buy_call(&fx, 1), 1, EXPIRY);
        relay(&mut fx, &input).expect("next nonce");
    }

    #[test]
    fn test_malformed_payload_after_valid_signature() {
        let mut fx = fixture();
        let garbage = vec![0xff, 0xee];
        let digest = signing_digest(LEDGER, &garbage, 0, EXPIRY);
        let input = FeelessInput {
            signer: fx.signer.address(),
            target: LEDGER,
            call: garbage,
            nonce: 0,
            expiry: EXPIRY,
            signature: RecoverableSignature::sign(&fx.signer.signing_key, &digest),
        };
        assert!(matches!(
            relay(&mut fx, &input),
            Err(RelayError::MalformedCall)
        ));
        // The envelope itself was valid, so its nonce is spent.
        assert_eq!(fx.relay.nonce(fx.signer.address()), 1);
    }

    #[test]
    fn test_relayed_approval_and_transfer() {
        let mut fx = fixture();
        let holder = fx.signer.address();
        let recipient = Address([0x05; 32]);

        let input =
            FeelessInput::sign(&fx.signer.signing_key, LEDGER, &buy_call(&fx, 1), 0, EXPIRY);
        relay(&mut fx, &input).expect("buy");

        let ticket = TicketId::pack(fx.event, SectionId(1), SeatId(1));
        let transfer = RelayCall::SafeTransferFrom {
            from: holder,
            to: recipient,
            ticket,
            amount: 1,
            data: vec![],
        };
        let input = FeelessInput::sign(&fx.signer.signing_key, LEDGER, &transfer, 1, EXPIRY);
        assert_eq!(
            relay(&mut fx, &input).expect("transfer"),
            RelayOutcome::Transferred
        );
        assert_eq!(fx.ledger.balance_of(ticket, recipient), 1);
    }
}
