// # Workload Inventory Trait
//
// Defines the interface to the workload orchestrator: a bulk listing of
// running workloads, a point lookup by identifier, and a subscription to
// lifecycle events.
//
// ## Implementations
//
// - Docker Engine API: `dockdns-docker` crate
// - Test doubles: `tests/common/mod.rs`
//
// ## Usage
//
// ```rust,ignore
// use dockdns_core::traits::WorkloadInventory;
// use tokio_stream::StreamExt;
//
// async fn dump(inventory: &dyn WorkloadInventory) -> dockdns_core::Result<()> {
//     for workload in inventory.list_running().await? {
//         println!("{}: {:?}", workload.id, workload.names);
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

use crate::error::{Error, Result};

/// A workload's membership in one named network, with its address there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAttachment {
    /// Identifier of the network
    pub network_id: String,
    /// Address of the workload on that network, in textual form
    pub ip_address: String,
}

/// A running unit known to the orchestrator
///
/// Read-only to the core: the inventory backend owns construction.
/// A workload may be attached to zero, one, or multiple networks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    /// Opaque orchestrator identifier
    pub id: String,
    /// Raw names as reported by the orchestrator (e.g. `/proj_web_1`)
    pub names: Vec<String>,
    /// Network attachments, in the order the orchestrator reports them
    pub networks: Vec<NetworkAttachment>,
}

/// Lifecycle action carried by an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
    /// Workload started running
    Start,
    /// Workload was stopped
    Stop,
    /// Workload's process exited
    Die,
    /// Workload was killed
    Kill,
    /// Any other action; ignored by the updater
    Other(String),
}

impl EventAction {
    /// Whether this action means the workload is no longer running
    pub fn is_termination(&self) -> bool {
        matches!(self, Self::Stop | Self::Die | Self::Kill)
    }
}

impl From<&str> for EventAction {
    fn from(action: &str) -> Self {
        match action {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "die" => Self::Die,
            "kill" => Self::Kill,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A single workload lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// What happened
    pub action: EventAction,
    /// Identifier of the workload it happened to
    pub workload_id: String,
}

/// Stream of lifecycle events produced by a subscription
pub type EventStream = Pin<Box<dyn Stream<Item = LifecycleEvent> + Send + 'static>>;

/// Stream of subscription errors
///
/// The updater treats the first item as fatal for the subscription.
pub type ErrorStream = Pin<Box<dyn Stream<Item = Error> + Send + 'static>>;

/// Trait for workload inventory backends
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait WorkloadInventory: Send + Sync {
    /// List all currently running workloads
    async fn list_running(&self) -> Result<Vec<Workload>>;

    /// Look up one workload by identifier
    ///
    /// With `include_stopped` the lookup also covers workloads that are
    /// no longer running, which is what makes name resolution possible
    /// immediately after a termination event.
    async fn workload_by_id(&self, id: &str, include_stopped: bool) -> Result<Workload>;

    /// Subscribe to lifecycle events
    ///
    /// Returns the event stream and the error stream of one long-lived
    /// subscription. The streams should run until the backend connection
    /// is lost; they end (or the error stream yields) when it is.
    fn subscribe(&self) -> (EventStream, ErrorStream);
}
