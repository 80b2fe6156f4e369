//! One-shot workload survey
//!
//! The survey bootstraps the registry: it lists every running workload,
//! works out which of its addresses lie on a network shared with the
//! server, and registers each of its names. It runs to completion on
//! the startup path before the DNS socket is bound, so the registry is
//! never queried while empty merely because startup raced it.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::network::{NetworkMembership, qualifying_ips};
use crate::registry::WorkloadRegistrar;
use crate::traits::WorkloadInventory;

/// One-shot bulk populator for the registry
pub struct Survey {
    inventory: Arc<dyn WorkloadInventory>,
    membership: NetworkMembership,
    registrar: WorkloadRegistrar,
}

impl Survey {
    /// Create a survey over the given inventory and registrar
    pub fn new(
        inventory: Arc<dyn WorkloadInventory>,
        membership: NetworkMembership,
        registrar: WorkloadRegistrar,
    ) -> Self {
        Self {
            inventory,
            membership,
            registrar,
        }
    }

    /// Run the full inventory pass once
    ///
    /// Errors are fatal: a failed listing or membership computation
    /// propagates, and the caller must not start serving queries against
    /// the partially populated registry.
    pub async fn run_once(&self) -> Result<()> {
        let workloads = self.inventory.list_running().await?;
        let network_ids = self.membership.local_network_ids().await?;

        let mut registered = 0usize;
        for workload in &workloads {
            let ips = qualifying_ips(workload, &network_ids);
            let Some(ip) = ips.last() else {
                debug!(
                    id = %workload.id,
                    "workload has no address on a shared network, skipping"
                );
                continue;
            };

            for name in &workload.names {
                self.registrar.register(name, ip);
                registered += 1;
            }
        }

        info!(
            workloads = workloads.len(),
            names = registered,
            "workload survey complete"
        );

        Ok(())
    }
}
