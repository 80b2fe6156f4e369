//! Concurrency-safe name → address registry
//!
//! The registry is the single source of truth the DNS handler reads on
//! every query. It is written by two independent producers, the survey
//! and the updater, and guarded by one mutex covering each individual
//! call. The alias provider is consulted inside `lookup_ip`, under the
//! same lock; alias providers are therefore required to be non-blocking
//! (see [`crate::traits::AliasProvider`]).
//!
//! The registry applies no name normalization. Keys are whatever the
//! caller registers; the naming policy that turns orchestrator names
//! into DNS keys lives in [`WorkloadRegistrar`], keeping the registry a
//! pure key-value store and the policy swappable.

mod naming;

pub use naming::{ComposeNaming, NamingPolicy};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::traits::AliasProvider;

/// Shared name → IP table consulted through alias resolution
///
/// Cheaply cloneable handle; all clones share the same table.
#[derive(Clone)]
pub struct DnsRegistry {
    ip_by_name: Arc<Mutex<HashMap<String, String>>>,
    aliases: Arc<dyn AliasProvider>,
}

impl DnsRegistry {
    /// Create an empty registry backed by the given alias provider
    pub fn new(aliases: Arc<dyn AliasProvider>) -> Self {
        Self {
            ip_by_name: Arc::new(Mutex::new(HashMap::new())),
            aliases,
        }
    }

    /// Insert or overwrite the mapping for `name`
    ///
    /// Inputs are not validated here; callers normalize and validate.
    pub fn register(&self, name: impl Into<String>, ip: impl Into<String>) {
        let mut ip_by_name = self.ip_by_name.lock().unwrap();
        ip_by_name.insert(name.into(), ip.into());
    }

    /// Remove the mapping for `name`; absent keys are a no-op
    pub fn unregister(&self, name: &str) {
        let mut ip_by_name = self.ip_by_name.lock().unwrap();
        ip_by_name.remove(name);
    }

    /// Resolve `domain` to an address, consulting the alias table first
    ///
    /// If an alias exists for the queried domain, the lookup is retried
    /// with the alias target instead of the original name. Returns
    /// `None` when no entry exists at either stage.
    pub fn lookup_ip(&self, domain: &str) -> Option<String> {
        let ip_by_name = self.ip_by_name.lock().unwrap();

        let domain = match self.aliases.alias_for_domain(domain) {
            Some(target) => target,
            None => domain.to_string(),
        };

        ip_by_name.get(&domain).cloned()
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.ip_by_name.lock().unwrap().len()
    }

    /// Whether the registry holds no entries
    pub fn is_empty(&self) -> bool {
        self.ip_by_name.lock().unwrap().is_empty()
    }
}

/// Registrar that applies a naming policy before touching the registry
///
/// The survey and the updater go through this wrapper so the registry
/// only ever sees normalized DNS keys.
#[derive(Clone)]
pub struct WorkloadRegistrar {
    registry: DnsRegistry,
    policy: Arc<dyn NamingPolicy>,
}

impl WorkloadRegistrar {
    /// Create a registrar over `registry` using the given naming policy
    pub fn new(registry: DnsRegistry, policy: Arc<dyn NamingPolicy>) -> Self {
        Self { registry, policy }
    }

    /// Normalize `raw_name` and register it under `ip`
    pub fn register(&self, raw_name: &str, ip: &str) {
        let name = self.policy.dns_name(raw_name);
        debug!(name = %name, ip = %ip, "registering name");
        self.registry.register(name, ip);
    }

    /// Normalize `raw_name` and remove its registration
    pub fn unregister(&self, raw_name: &str) {
        let name = self.policy.dns_name(raw_name);
        debug!(name = %name, "unregistering name");
        self.registry.unregister(&name);
    }
}
