//! Network membership resolution
//!
//! The server does not know a priori which orchestrator networks it is
//! deployed on. It infers membership by recognizing its own interface
//! addresses among the attachments the inventory reports, because the
//! orchestrator is the only ground truth for network topology: the
//! server process appears as a workload among all listed workloads.
//!
//! Membership is assumed stable for the server's lifetime, but it is
//! cheap relative to the inventory call, so callers recompute it per
//! survey/update operation rather than caching it.

use std::net::IpAddr;
use std::sync::Arc;

use crate::error::Result;
use crate::traits::{Workload, WorkloadInventory};

/// Trait for enumerating the local host's interface addresses
pub trait LocalAddrs: Send + Sync {
    /// All addresses assigned to local interfaces
    fn local_addrs(&self) -> Result<Vec<IpAddr>>;
}

/// System implementation over the OS interface table
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAddrs;

impl LocalAddrs for SystemAddrs {
    fn local_addrs(&self) -> Result<Vec<IpAddr>> {
        let interfaces = if_addrs::get_if_addrs()?;
        Ok(interfaces.into_iter().map(|iface| iface.ip()).collect())
    }
}

/// Resolver for the set of networks the local host belongs to
#[derive(Clone)]
pub struct NetworkMembership {
    inventory: Arc<dyn WorkloadInventory>,
    local_addrs: Arc<dyn LocalAddrs>,
}

impl NetworkMembership {
    /// Create a resolver using the OS interface table
    pub fn new(inventory: Arc<dyn WorkloadInventory>) -> Self {
        Self::with_local_addrs(inventory, Arc::new(SystemAddrs))
    }

    /// Create a resolver with an explicit local address source
    pub fn with_local_addrs(
        inventory: Arc<dyn WorkloadInventory>,
        local_addrs: Arc<dyn LocalAddrs>,
    ) -> Self {
        Self {
            inventory,
            local_addrs,
        }
    }

    /// Compute the identifiers of all networks the local host is on
    ///
    /// The returned list may contain duplicates; callers only test
    /// membership. Failure to list workloads propagates: the survey
    /// treats it as fatal, the updater drops the current event.
    pub async fn local_network_ids(&self) -> Result<Vec<String>> {
        let addrs = self.local_addrs.local_addrs()?;
        let workloads = self.inventory.list_running().await?;

        Ok(matching_network_ids(&addrs, &workloads))
    }
}

/// Network IDs of every attachment whose address is one of `local_addrs`
pub fn matching_network_ids(local_addrs: &[IpAddr], workloads: &[Workload]) -> Vec<String> {
    let mut network_ids = Vec::new();

    for workload in workloads {
        for attachment in &workload.networks {
            let Ok(ip) = attachment.ip_address.parse::<IpAddr>() else {
                continue;
            };
            if local_addrs.contains(&ip) {
                network_ids.push(attachment.network_id.clone());
            }
        }
    }

    network_ids
}

/// Addresses of `workload` on any of the given networks, in attachment order
///
/// Callers take the last element when several qualify. That tie-break is
/// arbitrary but long-standing; it is documented as a known limitation,
/// not a multi-homing policy.
pub fn qualifying_ips(workload: &Workload, network_ids: &[String]) -> Vec<String> {
    workload
        .networks
        .iter()
        .filter(|attachment| network_ids.contains(&attachment.network_id))
        .map(|attachment| attachment.ip_address.clone())
        .collect()
}
