//! Event-driven registry updater
//!
//! The updater keeps the registry correct incrementally: it holds one
//! long-lived subscription to workload lifecycle events and registers or
//! unregisters single names as workloads start and terminate.
//!
//! Per-event failures (ID lookup, address selection, name derivation)
//! are logged and the event is dropped; a missed registration heals on
//! the next event for the same workload. There is no reconciliation loop
//! behind this best-effort policy, and no resubscription after a stream
//! error: once the error stream yields, the event stream is considered
//! unreliable and the updater stops, leaving the registry static.

use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::network::{NetworkMembership, qualifying_ips};
use crate::registry::WorkloadRegistrar;
use crate::traits::{EventAction, LifecycleEvent, WorkloadInventory};

/// Long-running incremental populator for the registry
pub struct Updater {
    inventory: Arc<dyn WorkloadInventory>,
    membership: NetworkMembership,
    registrar: WorkloadRegistrar,
}

impl Updater {
    /// Create an updater over the given inventory and registrar
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

    /// Subscribe and process lifecycle events until cancelled
    ///
    /// Stops on the first error-stream item or when either stream ends;
    /// both are logged as stopping conditions, never retried.
    pub async fn run(&self, cancel: CancellationToken) {
        let (mut events, mut errors) = self.inventory.subscribe();
        info!("workload event listener started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("stopping workload event listener");
                    return;
                }
                err = errors.next() => {
                    match err {
                        Some(e) => error!(
                            error = %e,
                            "error in workload event stream, stopping event listener"
                        ),
                        None => error!("workload error stream closed, stopping event listener"),
                    }
                    return;
                }
                event = events.next() => {
                    let Some(event) = event else {
                        error!("workload event stream closed, stopping event listener");
                        return;
                    };
                    self.handle_event(event).await;
                }
            }
        }
    }

    async fn handle_event(&self, event: LifecycleEvent) {
        if event.action == EventAction::Start {
            self.add_workload(&event).await;
        } else if event.action.is_termination() {
            self.remove_workload(&event).await;
        }
    }

    async fn add_workload(&self, event: &LifecycleEvent) {
        let ip = match self.workload_ip(&event.workload_id).await {
            Ok(ip) => ip,
            Err(e) => {
                error!(error = %e, "could not determine workload ip");
                return;
            }
        };

        let name = match self.workload_name(&event.workload_id).await {
            Ok(name) => name,
            Err(e) => {
                error!(error = %e, "could not determine workload name");
                return;
            }
        };

        info!(name = %name, action = ?event.action, "adding workload");
        self.registrar.register(&name, &ip);
    }

    async fn remove_workload(&self, event: &LifecycleEvent) {
        let name = match self.workload_name(&event.workload_id).await {
            Ok(name) => name,
            Err(e) => {
                error!(error = %e, "could not determine workload name");
                return;
            }
        };

        info!(name = %name, action = ?event.action, "removing workload");
        self.registrar.unregister(&name);
    }

    /// First reported name of the workload
    ///
    /// Queried with `include_stopped` so the name is still resolvable
    /// right after a termination event.
    async fn workload_name(&self, id: &str) -> Result<String> {
        let workload = self.inventory.workload_by_id(id, true).await?;

        workload
            .names
            .first()
            .cloned()
            .ok_or_else(|| Error::workload_unnamed(id))
    }

    async fn workload_ip(&self, id: &str) -> Result<String> {
        let workload = self.inventory.workload_by_id(id, true).await?;
        let network_ids = self.membership.local_network_ids().await?;

        qualifying_ips(&workload, &network_ids)
            .last()
            .cloned()
            .ok_or_else(|| Error::no_shared_network(id))
    }
}
