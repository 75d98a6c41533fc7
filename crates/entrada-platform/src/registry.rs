//! The platform registry state machine.
//!
//! Resolvers live in an arena keyed by [`ResolverId`] and are never
//! reclaimed, so a resolver handle held by an event stays valid even after
//! the platform it was registered under is gone. Platforms themselves are
//! removable: deregistration deletes the binding but touches neither the
//! resolver nor any event created under it.

use std::collections::BTreeMap;

use entrada_identity::IdentityResolver;
use entrada_types::{Address, GroupId, IdentityId, Permissions, PlatformId, ResolverId};
use serde::{Deserialize, Serialize};

use crate::{PlatformError, Result};

/// The binding a ticketing platform is registered under.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Platform {
    /// The resolver answering identity queries for this platform.
    pub resolver: ResolverId,
    /// Address of the payment token events on this platform settle in.
    pub currency: Address,
    /// Maximum number of seats a single event may carry.
    pub max_seats: u32,
}

/// Owns all resolver instances and the platform bindings over them.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlatformRegistry {
    admin: Address,
    resolvers: BTreeMap<ResolverId, IdentityResolver>,
    platforms: BTreeMap<PlatformId, Platform>,
    next_resolver_id: u64,
    next_platform_id: u64,
}

impl PlatformRegistry {
    /// Create an empty registry administered by `admin`.
    pub fn new(admin: Address) -> PlatformRegistry {
        PlatformRegistry {
            admin,
            resolvers: BTreeMap::new(),
            platforms: BTreeMap::new(),
            next_resolver_id: 1,
            next_platform_id: 1,
        }
    }

    /// The administrator of this registry.
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Take ownership of a resolver instance, returning its handle.
    pub fn add_resolver(&mut self, resolver: IdentityResolver) -> ResolverId {
        let id = ResolverId(self.next_resolver_id);
        self.next_resolver_id += 1;
        self.resolvers.insert(id, resolver);
        tracing::info!(resolver = %id, "resolver added");
        id
    }

    /// Borrow a resolver by handle.
    ///
    /// # Errors
    ///
    /// [`PlatformError::ResolverNotFound`] if the handle was never assigned.
    pub fn resolver(&self, id: ResolverId) -> Result<&IdentityResolver> {
        self.resolvers
            .get(&id)
            .ok_or(PlatformError::ResolverNotFound(id))
    }

    /// Mutably borrow a resolver by handle.
    ///
    /// # Errors
    ///
    /// [`PlatformError::ResolverNotFound`] if the handle was never assigned.
    pub fn resolver_mut(&mut self, id: ResolverId) -> Result<&mut IdentityResolver> {
        self.resolvers
            .get_mut(&id)
            .ok_or(PlatformError::ResolverNotFound(id))
    }

    /// Register a platform bound to a resolver, currency and seat cap.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::Forbidden`] if `caller` is not the administrator
    /// - [`PlatformError::ResolverNotFound`] for an unknown resolver handle
    /// - [`PlatformError::ZeroAddress`] for a zero currency address
    pub fn register_platform(
        &mut self,
        caller: Address,
        resolver: ResolverId,
        currency: Address,
        max_seats: u32,
    ) -> Result<PlatformId> {
        if caller != self.admin {
            return Err(PlatformError::Forbidden);
        }
        if !self.resolvers.contains_key(&resolver) {
            return Err(PlatformError::ResolverNotFound(resolver));
        }
        if currency.is_zero() {
            return Err(PlatformError::ZeroAddress);
        }

        let id = PlatformId(self.next_platform_id);
        self.next_platform_id += 1;
        self.platforms.insert(
            id,
            Platform {
                resolver,
                currency,
                max_seats,
            },
        );

        tracing::info!(platform = %id, %resolver, %currency, max_seats, "platform registered");
        Ok(id)
    }

    /// Remove a platform binding. The resolver and any events created
    /// under the platform are unaffected.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::Forbidden`] if `caller` is not the administrator
    /// - [`PlatformError::PlatformNotFound`] if the platform is not registered
    pub fn deregister_platform(&mut self, caller: Address, platform: PlatformId) -> Result<()> {
        if caller != self.admin {
            return Err(PlatformError::Forbidden);
        }
        if self.platforms.remove(&platform).is_none() {
            return Err(PlatformError::PlatformNotFound(platform));
        }
        tracing::info!(%platform, "platform deregistered");
        Ok(())
    }

    /// Whether a platform is currently registered. Total.
    pub fn exists_platform(&self, platform: PlatformId) -> bool {
        self.platforms.contains_key(&platform)
    }

    /// The binding of a registered platform.
    ///
    /// # Errors
    ///
    /// [`PlatformError::PlatformNotFound`] if the platform is not registered.
    pub fn platform(&self, platform: PlatformId) -> Result<Platform> {
        self.platforms
            .get(&platform)
            .copied()
            .ok_or(PlatformError::PlatformNotFound(platform))
    }

    /// Resolve an account to an identity through a platform's resolver.
    pub fn resolve_identity_on_platform(
        &self,
        platform: PlatformId,
        account: Address,
    ) -> Result<IdentityId> {
        let binding = self.platform(platform)?;
        Ok(self.resolver(binding.resolver)?.resolve_identity(account)?)
    }

    /// Resolve an identity's capabilities through a platform's resolver.
    pub fn resolve_permissions_on_platform(
        &self,
        platform: PlatformId,
        identity: IdentityId,
    ) -> Result<Permissions> {
        let binding = self.platform(platform)?;
        Ok(self
            .resolver(binding.resolver)?
            .resolve_permissions(identity)?)
    }

    /// The seat cap of a registered platform.
    pub fn resolve_max_seats_for_platform(&self, platform: PlatformId) -> Result<u32> {
        Ok(self.platform(platform)?.max_seats)
    }

    /// The currency address of a registered platform.
    pub fn resolve_currency_for_platform(&self, platform: PlatformId) -> Result<Address> {
        Ok(self.platform(platform)?.currency)
    }

    /// Whether a group exists on a platform's resolver.
    pub fn resolve_group_exists_on_platform(
        &self,
        platform: PlatformId,
        group: GroupId,
    ) -> Result<bool> {
        let binding = self.platform(platform)?;
        Ok(self.resolver(binding.resolver)?.resolve_group_exists(group))
    }

    /// Whether an identity is in a group on a platform's resolver.
    pub fn resolve_is_in_group_on_platform(
        &self,
        platform: PlatformId,
        group: GroupId,
        identity: IdentityId,
    ) -> Result<bool> {
        let binding = self.platform(platform)?;
        Ok(self
            .resolver(binding.resolver)?
            .resolve_is_in_group(group, identity)?)
    }
}
