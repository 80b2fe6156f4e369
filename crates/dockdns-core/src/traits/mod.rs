//! Capability traits consumed by the dockdns core
//!
//! The core never talks to an orchestrator or an alias backend directly;
//! it only consumes these traits, which keeps both swappable for test
//! doubles.

pub mod alias;
pub mod inventory;

pub use alias::AliasProvider;
pub use inventory::{
    ErrorStream, EventAction, EventStream, LifecycleEvent, NetworkAttachment, Workload,
    WorkloadInventory,
};
