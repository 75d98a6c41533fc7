//! Integration test: Feeless transactions end to end.
//!
//! Exercises the relay against a live ledger:
//! 1. An organizer sets up an event and sections entirely through
//!    relayed, signed calls
//! 2. A buyer purchases a batch of seats through the relay
//! 3. Replay, expiry and cross-signer nonce isolation
//! 4. A relayer cannot redirect a signed call to another ledger

use entrada_crypto::ed25519::KeyPair;
use entrada_events::{EventLedger, PaymentToken, SimpleToken};
use entrada_identity::IdentityResolver;
use entrada_platform::PlatformRegistry;
use entrada_relay::{FeelessInput, FeelessRelay, RelayCall, RelayError, RelayOutcome};
use entrada_types::{Address, EventId, Permissions, PlatformId, SeatId, SectionId, TicketId};

/// Base timestamp for test scenarios.
const BASE_TIME: u64 = 1_700_000_000;
const EXPIRY: u64 = BASE_TIME + 600;

const ADMIN: Address = Address([0xaa; 32]);
const LEDGER: Address = Address([0x10; 32]);
const CURRENCY: Address = Address([0xcc; 32]);

struct Harness {
    registry: PlatformRegistry,
    ledger: EventLedger,
    token: SimpleToken,
    relay: FeelessRelay,
    platform: PlatformId,
}

/// Two keypair-backed accounts registered with the resolver: an
/// organizer with all capabilities and a buyer who may only buy.
fn harness(organizer: &KeyPair, buyer: &KeyPair) -> Harness {
    let mut resolver = IdentityResolver::new(ADMIN);
    resolver
        .new_identity(ADMIN, organizer.address(), Permissions::ALL)
        .expect("organizer identity");
    resolver
        .new_identity(ADMIN, buyer.address(), Permissions::from_bits(0x1))
        .expect("buyer identity");

    let mut registry = PlatformRegistry::new(ADMIN);
    let resolver_id = registry.add_resolver(resolver);
    let platform = registry
        .register_platform(ADMIN, resolver_id, CURRENCY, 200)
        .expect("platform registration");

    let ledger = EventLedger::new(LEDGER, ADMIN, 500, 0);

    let mut token = SimpleToken::new(CURRENCY, buyer.address(), 100_000);
    token.approve(buyer.address(), LEDGER, 100_000);

    Harness {
        registry,
        ledger,
        token,
        relay: FeelessRelay::new(LEDGER),
        platform,
    }
}

impl Harness {
    fn relay_at(
        &mut self,
        now: u64,
        input: &FeelessInput,
    ) -> Result<RelayOutcome, RelayError> {
        self.relay.perform_feeless_transaction(
            &mut self.ledger,
            &self.registry,
            &mut self.token,
            now,
            input,
        )
    }

    fn relay_signed(
        &mut self,
        signer: &KeyPair,
        call: &RelayCall,
    ) -> Result<RelayOutcome, RelayError> {
        let nonce = self.relay.nonce(signer.address());
        let input = FeelessInput::sign(&signer.signing_key, LEDGER, call, nonce, EXPIRY);
        self.relay_at(BASE_TIME, &input)
    }
}

#[test]
fn relayed_event_setup_and_batch_purchase() {
    // Deterministic organizer, random buyer.
    let organizer = KeyPair::from_bytes(&[0x42; 32]);
    let buyer_seed: [u8; 32] = rand::random();
    let buyer = KeyPair::from_bytes(&buyer_seed);
    let mut h = harness(&organizer, &buyer);

    // =========================================================
    // The organizer never submits a transaction of their own
    // =========================================================
    let outcome = h
        .relay_signed(
            &organizer,
            &RelayCall::CreateEvent {
                platform: h.platform,
                start_sell_date: BASE_TIME,
                start_withdrawal_date: BASE_TIME,
            },
        )
        .expect("relayed event creation");
    let RelayOutcome::EventCreated(event) = outcome else {
        unreachable!("event creation must yield EventCreated")
    };
    assert_eq!(event, EventId(1));

    let outcome = h
        .relay_signed(
            &organizer,
            &RelayCall::AddSection {
                event,
                quantity: 40,
                price: 150,
            },
        )
        .expect("relayed section");
    assert_eq!(outcome, RelayOutcome::SectionAdded(SectionId(1)));

    // =========================================================
    // The buyer purchases a batch through the relay
    // =========================================================
    let outcome = h
        .relay_signed(
            &buyer,
            &RelayCall::BuyTicketsBatch {
                event,
                sections: vec![SectionId(1), SectionId(1)],
                seats: vec![SeatId(7), SeatId(8)],
            },
        )
        .expect("relayed batch purchase");
    let RelayOutcome::TicketsBought(tickets) = outcome else {
        unreachable!("batch purchase must yield TicketsBought")
    };
    assert_eq!(
        tickets,
        vec![
            TicketId::pack(event, SectionId(1), SeatId(7)),
            TicketId::pack(event, SectionId(1), SeatId(8)),
        ]
    );
    // 2 * (150 + 7 fee).
    assert_eq!(h.token.balance_of(buyer.address()), 100_000 - 314);

    // Nonces advanced independently per signer.
    assert_eq!(h.relay.nonce(organizer.address()), 2);
    assert_eq!(h.relay.nonce(buyer.address()), 1);

    // =========================================================
    // The organizer withdraws, still feeless
    // =========================================================
    let outcome = h
        .relay_signed(&organizer, &RelayCall::WithdrawFunds { event })
        .expect("relayed withdrawal");
    assert_eq!(outcome, RelayOutcome::FundsWithdrawn(300));
    assert_eq!(h.token.balance_of(organizer.address()), 300);
}

#[test]
fn replayed_and_expired_envelopes_are_rejected() {
    let organizer = KeyPair::from_bytes(&[0x42; 32]);
    let buyer = KeyPair::from_bytes(&[0x43; 32]);
    let mut h = harness(&organizer, &buyer);

    h.relay_signed(
        &organizer,
        &RelayCall::CreateEvent {
            platform: h.platform,
            start_sell_date: BASE_TIME,
            start_withdrawal_date: BASE_TIME,
        },
    )
    .expect("event");
    h.relay_signed(
        &organizer,
        &RelayCall::AddSection {
            event: EventId(1),
            quantity: 10,
            price: 100,
        },
    )
    .expect("section");

    let call = RelayCall::BuyTicket {
        event: EventId(1),
        section: SectionId(1),
        seat: SeatId(1),
    };
    let input = FeelessInput::sign(&buyer.signing_key, LEDGER, &call, 0, EXPIRY);

    // The envelope survives the JSON transport a relayer would use.
    let wire = serde_json::to_string(&input).expect("serialize envelope");
    let input: FeelessInput = serde_json::from_str(&wire).expect("deserialize envelope");

    // First submission buys the seat; the identical envelope replays.
    h.relay_at(BASE_TIME, &input).expect("first submission");
    assert!(matches!(
        h.relay_at(BASE_TIME, &input),
        Err(RelayError::BadNonce {
            expected: 1,
            got: 0
        })
    ));

    // An envelope submitted after its expiry is dead even with a fresh
    // nonce, and does not consume it.
    let call = RelayCall::BuyTicket {
        event: EventId(1),
        section: SectionId(1),
        seat: SeatId(2),
    };
    let input = FeelessInput::sign(&buyer.signing_key, LEDGER, &call, 1, EXPIRY);
    assert!(matches!(
        h.relay_at(EXPIRY + 1, &input),
        Err(RelayError::Expired)
    ));
    assert_eq!(h.relay.nonce(buyer.address()), 1);

    // Resubmitted in time, the same envelope is valid.
    h.relay_at(BASE_TIME, &input).expect("in time");
}

#[test]
fn relayer_cannot_redirect_or_tamper() {
    let organizer = KeyPair::from_bytes(&[0x42; 32]);
    let buyer = KeyPair::from_bytes(&[0x43; 32]);
    let mut h = harness(&organizer, &buyer);

    let call = RelayCall::CreateEvent {
        platform: h.platform,
        start_sell_date: BASE_TIME,
        start_withdrawal_date: BASE_TIME,
    };

    // Signed for a different ledger: the relay refuses it.
    let foreign = Address([0x77; 32]);
    let input = FeelessInput::sign(&organizer.signing_key, foreign, &call, 0, EXPIRY);
    assert!(matches!(
        h.relay_at(BASE_TIME, &input),
        Err(RelayError::UnknownTarget)
    ));

    // Re-targeting the same envelope at our ledger breaks the signature.
    let mut input = input;
    input.target = LEDGER;
    assert!(matches!(
        h.relay_at(BASE_TIME, &input),
        Err(RelayError::BadSignature)
    ));

    // So does editing any field covered by the digest.
    let mut input = FeelessInput::sign(&organizer.signing_key, LEDGER, &call, 0, EXPIRY);
    input.expiry += 1;
    assert!(matches!(
        h.relay_at(BASE_TIME, &input),
        Err(RelayError::BadSignature)
    ));

    // Nothing was relayed; the nonce never moved.
    assert_eq!(h.relay.nonce(organizer.address()), 0);
}
