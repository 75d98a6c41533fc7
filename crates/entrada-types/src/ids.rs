//! Sequential identifiers.
//!
//! Every registry in the ledger hands out dense sequential ids starting at 1;
//! id 0 is never assigned, so a zero value always means "unset". Records are
//! never reclaimed, so an id stays valid for the lifetime of its registry.

use serde::{Deserialize, Serialize};

macro_rules! sequential_id {
    ($(#[$doc:meta])* $name:ident, $repr:ty) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub $repr);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

sequential_id!(
    /// An identity registered with an identity resolver.
    IdentityId,
    u64
);
sequential_id!(
    /// A group of identities within an identity resolver.
    GroupId,
    u64
);
sequential_id!(
    /// A ticketing platform registered with the platform registry.
    PlatformId,
    u64
);
sequential_id!(
    /// An identity resolver instance owned by the platform registry.
    ResolverId,
    u64
);
sequential_id!(
    /// An event. Event ids are global across all platforms.
    EventId,
    u32
);
sequential_id!(
    /// A section within an event. Sections are numbered per event.
    SectionId,
    u16
);
sequential_id!(
    /// A seat within a section. Seats are numbered per section.
    SeatId,
    u16
);
