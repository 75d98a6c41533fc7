//! Account addresses.
//!
//! An [`Address`] is the 32-byte handle an account is known by everywhere
//! in the ledger: identity registration, token balances, event ownership.
//! Addresses are derived from Ed25519 verifying keys (see `entrada-crypto`);
//! this crate only carries the value type.

use serde::{Deserialize, Serialize};

/// A 32-byte account address.
///
/// The all-zero address is a reserved sentinel: it can never be registered,
/// own tickets, or receive transfers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The reserved null address.
    pub const ZERO: Address = Address([0u8; 32]);

    /// Whether this is the reserved null address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short hex prefix keeps log lines readable.
        write!(f, "Address({}…)", hex::encode(&self.0[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address_sentinel() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address([1u8; 32]).is_zero());
    }

    #[test]
    fn test_display_is_hex() {
        let addr = Address([0xab; 32]);
        assert_eq!(addr.to_string(), "ab".repeat(32));
    }

    #[test]
    fn test_ordering_is_bytewise() {
        let a = Address([1u8; 32]);
        let b = Address([2u8; 32]);
        assert!(a < b);
    }
}
