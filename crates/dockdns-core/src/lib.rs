// # dockdns-core
//
// Core library for the dockdns container-name DNS server.
//
// dockdns answers A-record queries for short container names with the
// current IP address of the matching workload on the network the server
// itself is attached to. The name table is rebuilt from scratch on every
// start and kept in sync with workload lifecycle events.
//
// ## Architecture Overview
//
// ```text
// ┌──────────────────┐  list_running   ┌──────────┐
// │ WorkloadInventory│────────────────▶│  Survey  │──┐
// │ (trait, e.g.     │                 └──────────┘  │ register
// │  dockdns-docker) │  subscribe      ┌──────────┐  ▼
// │                  │────────────────▶│ Updater  │─────▶ ┌─────────────┐
// └──────────────────┘                 └──────────┘       │ DnsRegistry │
//                                                         │ name → ip   │
// ┌──────────────────┐  alias_for_domain                  └──────┬──────┘
// │  AliasProvider   │◀──────────────────────────────────────────┤ lookup_ip
// │ (alias file)     │                 ┌──────────────┐          │
// └──────────────────┘                 │  DnsServer   │◀─────────┘
//                                      │  (UDP :53)   │
//                                      └──────────────┘
// ```
//
// ## Design Principles
//
// 1. **Separation of Concerns**: orchestration and alias backends live
//    behind small capability traits and are swappable for test doubles
// 2. **Event-Driven**: the updater waits on lifecycle event streams,
//    never polls the orchestrator
// 3. **Survey Before Serve**: the one-shot survey completes before the
//    DNS socket is bound, so queries never race an unpopulated registry
// 4. **Best-Effort Updates**: a failed per-event update is logged and
//    dropped; there is no reconciliation loop (see DESIGN.md)

pub mod alias;
pub mod config;
pub mod error;
pub mod network;
pub mod registry;
pub mod server;
pub mod survey;
pub mod traits;
pub mod updater;

// Re-export core types for convenience
pub use alias::{AliasFileLoader, NoAliases, StaticAliases};
pub use config::{AliasConfig, Config, DnsConfig};
pub use error::{Error, Result};
pub use network::{LocalAddrs, NetworkMembership, SystemAddrs};
pub use registry::{ComposeNaming, DnsRegistry, NamingPolicy, WorkloadRegistrar};
pub use server::DnsServer;
pub use survey::Survey;
pub use traits::{
    AliasProvider, EventAction, LifecycleEvent, NetworkAttachment, Workload, WorkloadInventory,
};
pub use updater::Updater;
