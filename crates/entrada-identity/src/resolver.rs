//! The identity resolver state machine.
//!
//! Identities and groups are arena records with dense sequential ids
//! starting at 1; neither is ever deleted. Accounts map to identities
//! last-write-wins: re-registering an already-mapped address simply
//! re-points it. All mutators are gated on the resolver administrator;
//! reads are open.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use entrada_types::{Address, GroupId, IdentityId, Permissions};
use serde::{Deserialize, Serialize};

use crate::{IdentityError, Result};

/// One registered identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Identity {
    /// Capabilities granted to this identity.
    pub permissions: Permissions,
}

/// Maps accounts to identities and identities to capabilities and groups.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentityResolver {
    admin: Address,
    identities: BTreeMap<IdentityId, Identity>,
    accounts: HashMap<Address, IdentityId>,
    groups: BTreeMap<GroupId, BTreeSet<IdentityId>>,
    next_identity_id: u64,
    next_group_id: u64,
}

impl IdentityResolver {
    /// Create an empty resolver administered by `admin`.
    pub fn new(admin: Address) -> IdentityResolver {
        IdentityResolver {
            admin,
            identities: BTreeMap::new(),
            accounts: HashMap::new(),
            groups: BTreeMap::new(),
            next_identity_id: 1,
            next_group_id: 1,
        }
    }

    /// The administrator of this resolver.
    pub fn admin(&self) -> Address {
        self.admin
    }

    fn require_admin(&self, caller: Address) -> Result<()> {
        if caller != self.admin {
            return Err(IdentityError::Forbidden);
        }
        Ok(())
    }

    /// Register a new identity for `account` with the given capabilities.
    ///
    /// The account is mapped to the new identity, replacing any previous
    /// mapping it had.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::Forbidden`] if `caller` is not the administrator
    /// - [`IdentityError::ZeroAddress`] if `account` is the zero address
    pub fn new_identity(
        &mut self,
        caller: Address,
        account: Address,
        permissions: Permissions,
    ) -> Result<IdentityId> {
        self.require_admin(caller)?;
        if account.is_zero() {
            return Err(IdentityError::ZeroAddress);
        }

        let id = IdentityId(self.next_identity_id);
        self.next_identity_id += 1;
        self.identities.insert(id, Identity { permissions });
        self.accounts.insert(account, id);

        tracing::info!(identity = %id, %account, bits = permissions.bits(), "new identity");
        Ok(id)
    }

    /// Map an additional account to an existing identity.
    ///
    /// Re-registering an already-mapped account re-points it to `identity`.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::Forbidden`] if `caller` is not the administrator
    /// - [`IdentityError::IdentityNotFound`] if `identity` was never assigned
    /// - [`IdentityError::ZeroAddress`] if `account` is the zero address
    pub fn register_address(
        &mut self,
        caller: Address,
        identity: IdentityId,
        account: Address,
    ) -> Result<()> {
        self.require_admin(caller)?;
        if !self.identities.contains_key(&identity) {
            return Err(IdentityError::IdentityNotFound(identity));
        }
        if account.is_zero() {
            return Err(IdentityError::ZeroAddress);
        }

        self.accounts.insert(account, identity);
        tracing::info!(%identity, %account, "address registered");
        Ok(())
    }

    /// Create a new group with `identity` as its first member.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::Forbidden`] if `caller` is not the administrator
    /// - [`IdentityError::IdentityNotFound`] if `identity` was never assigned
    pub fn new_group(&mut self, caller: Address, identity: IdentityId) -> Result<GroupId> {
        self.require_admin(caller)?;
        if !self.identities.contains_key(&identity) {
            return Err(IdentityError::IdentityNotFound(identity));
        }

        let id = GroupId(self.next_group_id);
        self.next_group_id += 1;
        self.groups.insert(id, BTreeSet::from([identity]));

        tracing::info!(group = %id, %identity, "new group");
        Ok(id)
    }

    /// Add an identity to a group. Idempotent for existing members.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::Forbidden`] if `caller` is not the administrator
    /// - [`IdentityError::GroupNotFound`] if `group` was never assigned
    /// - [`IdentityError::IdentityNotFound`] if `identity` was never assigned
    pub fn add_to_group(
        &mut self,
        caller: Address,
        group: GroupId,
        identity: IdentityId,
    ) -> Result<()> {
        self.require_admin(caller)?;
        if !self.identities.contains_key(&identity) {
            return Err(IdentityError::IdentityNotFound(identity));
        }
        let members = self
            .groups
            .get_mut(&group)
            .ok_or(IdentityError::GroupNotFound(group))?;

        members.insert(identity);
        tracing::info!(%group, %identity, "added to group");
        Ok(())
    }

    /// Resolve the identity an account is mapped to.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::ZeroAddress`] for the zero address
    /// - [`IdentityError::AccountNotFound`] if the account was never registered
    pub fn resolve_identity(&self, account: Address) -> Result<IdentityId> {
        if account.is_zero() {
            return Err(IdentityError::ZeroAddress);
        }
        self.accounts
            .get(&account)
            .copied()
            .ok_or(IdentityError::AccountNotFound(account))
    }

    /// The capability set of an identity.
    ///
    /// # Errors
    ///
    /// [`IdentityError::IdentityNotFound`] if `identity` was never assigned.
    pub fn resolve_permissions(&self, identity: IdentityId) -> Result<Permissions> {
        self.identities
            .get(&identity)
            .map(|i| i.permissions)
            .ok_or(IdentityError::IdentityNotFound(identity))
    }

    /// Whether an identity id has been assigned. Total.
    pub fn exists_identity(&self, identity: IdentityId) -> bool {
        self.identities.contains_key(&identity)
    }

    /// Whether a group id has been assigned. Total.
    pub fn resolve_group_exists(&self, group: GroupId) -> bool {
        self.groups.contains_key(&group)
    }

    /// Whether `identity` is a member of `group`.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::GroupNotFound`] if `group` was never assigned
    /// - [`IdentityError::IdentityNotFound`] if `identity` was never assigned
    pub fn resolve_is_in_group(&self, group: GroupId, identity: IdentityId) -> Result<bool> {
        let members = self
            .groups
            .get(&group)
            .ok_or(IdentityError::GroupNotFound(group))?;
        if !self.identities.contains_key(&identity) {
            return Err(IdentityError::IdentityNotFound(identity));
        }
        Ok(members.contains(&identity))
    }

    /// Whether an identity may purchase tickets.
    pub fn can_buy_ticket(&self, identity: IdentityId) -> Result<bool> {
        Ok(self.resolve_permissions(identity)?.can_buy_ticket)
    }

    /// Whether an identity may transfer tickets to other accounts.
    pub fn can_resell_ticket(&self, identity: IdentityId) -> Result<bool> {
        Ok(self.resolve_permissions(identity)?.can_resell_ticket)
    }

    /// Whether an identity may create events.
    pub fn can_create_event(&self, identity: IdentityId) -> Result<bool> {
        Ok(self.resolve_permissions(identity)?.can_create_event)
    }
}
