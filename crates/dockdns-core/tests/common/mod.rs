#![allow(dead_code)]

//! Test doubles and common utilities for contract tests
//!
//! These doubles implement the core's capability traits without a real
//! orchestrator behind them, so the tests can drive lifecycle events and
//! workload listings deterministically.

use dockdns_core::error::{Error, Result};
use dockdns_core::network::LocalAddrs;
use dockdns_core::traits::{
    ErrorStream, EventAction, EventStream, LifecycleEvent, NetworkAttachment, Workload,
    WorkloadInventory,
};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Build a workload from `(network_id, ip)` pairs
pub fn workload(id: &str, names: &[&str], networks: &[(&str, &str)]) -> Workload {
    Workload {
        id: id.to_string(),
        names: names.iter().map(|n| n.to_string()).collect(),
        networks: networks
            .iter()
            .map(|(network_id, ip)| NetworkAttachment {
                network_id: network_id.to_string(),
                ip_address: ip.to_string(),
            })
            .collect(),
    }
}

/// The workload standing in for the DNS server process itself
///
/// Network membership is inferred from its attachment address matching
/// the local address list.
pub fn self_workload(network_id: &str, ip: &str) -> Workload {
    workload("self", &["/dockdns"], &[(network_id, ip)])
}

/// Fixed local interface addresses
pub struct FixedAddrs(pub Vec<IpAddr>);

impl FixedAddrs {
    pub fn of(addrs: &[&str]) -> Arc<Self> {
        Arc::new(Self(
            addrs.iter().map(|a| a.parse().expect("test addr")).collect(),
        ))
    }
}

impl LocalAddrs for FixedAddrs {
    fn local_addrs(&self) -> Result<Vec<IpAddr>> {
        Ok(self.0.clone())
    }
}

/// Handle for the test to feed events and errors into the subscription
pub struct InventoryHandle {
    pub event_tx: mpsc::UnboundedSender<LifecycleEvent>,
    pub error_tx: mpsc::UnboundedSender<Error>,
}

impl InventoryHandle {
    pub fn start(&self, workload_id: &str) {
        self.send(EventAction::Start, workload_id);
    }

    pub fn stop(&self, workload_id: &str) {
        self.send(EventAction::Stop, workload_id);
    }

    pub fn send(&self, action: EventAction, workload_id: &str) {
        self.event_tx
            .send(LifecycleEvent {
                action,
                workload_id: workload_id.to_string(),
            })
            .expect("event send succeeds");
    }

    pub fn fail_stream(&self, message: &str) {
        self.error_tx
            .send(Error::inventory(message))
            .expect("error send succeeds");
    }
}

/// A controlled inventory the test populates and drives directly
pub struct ControlledInventory {
    running: Mutex<Vec<Workload>>,
    by_id: Mutex<HashMap<String, Workload>>,
    list_delay: Option<Duration>,
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<LifecycleEvent>>>,
    error_rx: Mutex<Option<mpsc::UnboundedReceiver<Error>>>,
    list_call_count: AtomicUsize,
}

impl ControlledInventory {
    pub fn new(running: Vec<Workload>) -> (Arc<Self>, InventoryHandle) {
        Self::with_list_delay(running, None)
    }

    /// Like [`new`](Self::new), but every listing waits `delay` first
    pub fn with_list_delay(
        running: Vec<Workload>,
        delay: Option<Duration>,
    ) -> (Arc<Self>, InventoryHandle) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        let by_id = running
            .iter()
            .map(|w| (w.id.clone(), w.clone()))
            .collect::<HashMap<_, _>>();

        let inventory = Arc::new(Self {
            running: Mutex::new(running),
            by_id: Mutex::new(by_id),
            list_delay: delay,
            event_rx: Mutex::new(Some(event_rx)),
            error_rx: Mutex::new(Some(error_rx)),
            list_call_count: AtomicUsize::new(0),
        });

        (inventory, InventoryHandle { event_tx, error_tx })
    }

    /// Make a workload resolvable by ID without listing it as running
    pub fn insert_workload(&self, workload: Workload) {
        self.by_id
            .lock()
            .unwrap()
            .insert(workload.id.clone(), workload);
    }

    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WorkloadInventory for ControlledInventory {
    async fn list_running(&self) -> Result<Vec<Workload>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.running.lock().unwrap().clone())
    }

    async fn workload_by_id(&self, id: &str, _include_stopped: bool) -> Result<Workload> {
        self.by_id
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::workload_not_found(id))
    }

    fn subscribe(&self) -> (EventStream, ErrorStream) {
        let events = self
            .event_rx
            .lock()
            .unwrap()
            .take()
            .expect("subscribe() can only be called once");
        let errors = self
            .error_rx
            .lock()
            .unwrap()
            .take()
            .expect("subscribe() can only be called once");

        (
            Box::pin(UnboundedReceiverStream::new(events)),
            Box::pin(UnboundedReceiverStream::new(errors)),
        )
    }
}

/// An inventory whose listing always fails
pub struct FailingInventory;

#[async_trait::async_trait]
impl WorkloadInventory for FailingInventory {
    async fn list_running(&self) -> Result<Vec<Workload>> {
        Err(Error::inventory("listing unavailable"))
    }

    async fn workload_by_id(&self, id: &str, _include_stopped: bool) -> Result<Workload> {
        Err(Error::workload_not_found(id))
    }

    fn subscribe(&self) -> (EventStream, ErrorStream) {
        let (_event_tx, event_rx) = mpsc::unbounded_channel();
        let (_error_tx, error_rx) = mpsc::unbounded_channel();
        (
            Box::pin(UnboundedReceiverStream::new(event_rx)),
            Box::pin(UnboundedReceiverStream::new(error_rx)),
        )
    }
}
