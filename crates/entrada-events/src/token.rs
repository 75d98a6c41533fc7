//! The payment-token collaborator.
//!
//! Purchases and withdrawals settle in an external fungible token. The
//! ledger never holds token state itself; the host passes the token
//! matching an event's snapshotted currency address into each settling
//! call. [`SimpleToken`] is a minimal allowance-enforcing implementation
//! for tests and hosts without a real token backend.

use std::collections::HashMap;

use entrada_types::Address;
use serde::{Deserialize, Serialize};

use crate::{EventError, Result};

/// An externally-owned fungible token the ledger settles in.
pub trait PaymentToken {
    /// The address this token is known by (an event's currency).
    fn address(&self) -> Address;

    /// Balance of an account. Total.
    fn balance_of(&self, account: Address) -> u64;

    /// Remaining amount `spender` may move out of `owner`'s balance.
    fn allowance(&self, owner: Address, spender: Address) -> u64;

    /// Set the amount `spender` may move out of `caller`'s balance.
    fn approve(&mut self, caller: Address, spender: Address, amount: u64);

    /// Move tokens from `caller` to `to`.
    ///
    /// # Errors
    ///
    /// [`EventError::InsufficientFunds`] if `caller`'s balance is too small.
    fn transfer(&mut self, caller: Address, to: Address, amount: u64) -> Result<()>;

    /// Move tokens from `from` to `to` on behalf of `caller`, consuming
    /// `caller`'s allowance.
    ///
    /// # Errors
    ///
    /// [`EventError::InsufficientFunds`] if the allowance or `from`'s
    /// balance is too small.
    fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: u64,
    ) -> Result<()>;
}

/// An in-memory fungible token with balances and allowances.
///
/// The full initial supply is minted to the deployer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimpleToken {
    address: Address,
    balances: HashMap<Address, u64>,
    allowances: HashMap<(Address, Address), u64>,
}

impl SimpleToken {
    /// Create a token at `address` with `initial_supply` minted to `deployer`.
    pub fn new(address: Address, deployer: Address, initial_supply: u64) -> SimpleToken {
        SimpleToken {
            address,
            balances: HashMap::from([(deployer, initial_supply)]),
            allowances: HashMap::new(),
        }
    }
}

impl PaymentToken for SimpleToken {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: Address) -> u64 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: Address, spender: Address) -> u64 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    fn approve(&mut self, caller: Address, spender: Address, amount: u64) {
        self.allowances.insert((caller, spender), amount);
        tracing::debug!(owner = %caller, %spender, amount, "token approval");
    }

    fn transfer(&mut self, caller: Address, to: Address, amount: u64) -> Result<()> {
        let from_balance = self.balance_of(caller);
        if from_balance < amount {
            return Err(EventError::InsufficientFunds(
                "balance too small for transfer",
            ));
        }
        self.balances.insert(caller, from_balance - amount);
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }

    fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: u64,
    ) -> Result<()> {
        let allowed = self.allowance(from, caller);
        if allowed < amount {
            return Err(EventError::InsufficientFunds(
                "allowance too small for transfer",
            ));
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(EventError::InsufficientFunds(
                "balance too small for transfer",
            ));
        }
        self.allowances.insert((from, caller), allowed - amount);
        self.balances.insert(from, from_balance - amount);
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }
}
