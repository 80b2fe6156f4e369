// # dockdns-docker
//
// Docker Engine implementation of the dockdns workload inventory.
//
// Containers are the workloads: listings come from the container list
// endpoint, point lookups use an id filter, and the subscription is fed
// by the engine's event stream filtered to container events.
//
// The Docker dependency is confined to this crate; the core only sees
// the `WorkloadInventory` trait.

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::ListContainersOptions;
use bollard::models::{ContainerSummary, EventMessage, EventMessageTypeEnum};
use bollard::system::EventsOptions;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};

use dockdns_core::error::{Error, Result};
use dockdns_core::traits::{
    ErrorStream, EventStream, LifecycleEvent, NetworkAttachment, Workload, WorkloadInventory,
};

/// Workload inventory backed by a Docker Engine
///
/// Cheaply cloneable; all clones share the underlying connection.
#[derive(Clone)]
pub struct DockerInventory {
    docker: Docker,
}

impl DockerInventory {
    /// Connect using the local daemon defaults
    ///
    /// Honors `DOCKER_HOST` and falls back to the Unix socket.
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| Error::inventory(format!("docker connection failed: {e}")))?;
        Ok(Self { docker })
    }

    /// Wrap an existing client
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    async fn list(&self, all: bool, filters: HashMap<String, Vec<String>>) -> Result<Vec<ContainerSummary>> {
        self.docker
            .list_containers(Some(ListContainersOptions {
                all,
                filters,
                ..Default::default()
            }))
            .await
            .map_err(|e| Error::inventory(format!("container listing failed: {e}")))
    }
}

#[async_trait]
impl WorkloadInventory for DockerInventory {
    async fn list_running(&self) -> Result<Vec<Workload>> {
        let containers = self.list(false, HashMap::new()).await?;
        Ok(containers.into_iter().map(to_workload).collect())
    }

    async fn workload_by_id(&self, id: &str, include_stopped: bool) -> Result<Workload> {
        let filters = HashMap::from([("id".to_string(), vec![id.to_string()])]);
        let containers = self.list(include_stopped, filters).await?;

        containers
            .into_iter()
            .next()
            .map(to_workload)
            .ok_or_else(|| Error::workload_not_found(id))
    }

    fn subscribe(&self) -> (EventStream, ErrorStream) {
        let filters = HashMap::from([("type".to_string(), vec!["container".to_string()])]);
        let mut events = self.docker.events(Some(EventsOptions::<String> {
            filters,
            ..Default::default()
        }));

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(item) = events.next().await {
                match item {
                    Ok(message) => {
                        let Some(event) = to_event(message) else {
                            continue;
                        };
                        debug!(
                            action = ?event.action,
                            workload_id = %event.workload_id,
                            "docker container event"
                        );
                        if event_tx.send(event).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        let _ = error_tx
                            .send(Error::inventory(format!("docker event stream failed: {e}")));
                        return;
                    }
                }
            }
            warn!("docker event stream ended");
        });

        (
            Box::pin(UnboundedReceiverStream::new(event_rx)),
            Box::pin(UnboundedReceiverStream::new(error_rx)),
        )
    }
}

/// Map a container summary onto the orchestrator-neutral workload shape
///
/// Attachments without a network id or an address are dropped here, so
/// the core never sees partial attachments.
fn to_workload(container: ContainerSummary) -> Workload {
    let networks = container
        .network_settings
        .and_then(|settings| settings.networks)
        .map(|networks| {
            networks
                .into_values()
                .filter_map(|endpoint| {
                    Some(NetworkAttachment {
                        network_id: endpoint.network_id?,
                        ip_address: endpoint.ip_address?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Workload {
        id: container.id.unwrap_or_default(),
        names: container.names.unwrap_or_default(),
        networks,
    }
}

/// Map an engine event onto a lifecycle event
///
/// Events without an actor id or an action carry nothing the updater
/// could act on and map to `None`.
fn to_event(message: EventMessage) -> Option<LifecycleEvent> {
    if message.typ != Some(EventMessageTypeEnum::CONTAINER) {
        return None;
    }

    let workload_id = message.actor?.id?;
    let action = message.action?;

    Some(LifecycleEvent {
        action: action.as_str().into(),
        workload_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{ContainerSummaryNetworkSettings, EndpointSettings, EventActor};
    use dockdns_core::traits::EventAction;

    fn endpoint(network_id: &str, ip: &str) -> EndpointSettings {
        EndpointSettings {
            network_id: Some(network_id.to_string()),
            ip_address: Some(ip.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn summary_maps_to_workload() {
        let summary = ContainerSummary {
            id: Some("c1".to_string()),
            names: Some(vec!["/proj_web_1".to_string()]),
            network_settings: Some(ContainerSummaryNetworkSettings {
                networks: Some(HashMap::from([(
                    "netA".to_string(),
                    endpoint("abc123", "10.0.0.2"),
                )])),
            }),
            ..Default::default()
        };

        let workload = to_workload(summary);
        assert_eq!(workload.id, "c1");
        assert_eq!(workload.names, vec!["/proj_web_1".to_string()]);
        assert_eq!(
            workload.networks,
            vec![NetworkAttachment {
                network_id: "abc123".to_string(),
                ip_address: "10.0.0.2".to_string(),
            }]
        );
    }

    #[test]
    fn partial_attachments_are_dropped() {
        let summary = ContainerSummary {
            id: Some("c1".to_string()),
            network_settings: Some(ContainerSummaryNetworkSettings {
                networks: Some(HashMap::from([
                    (
                        "netA".to_string(),
                        EndpointSettings {
                            network_id: Some("abc123".to_string()),
                            ip_address: None,
                            ..Default::default()
                        },
                    ),
                    ("netB".to_string(), endpoint("def456", "172.18.0.2")),
                ])),
            }),
            ..Default::default()
        };

        let workload = to_workload(summary);
        assert_eq!(workload.networks.len(), 1);
        assert_eq!(workload.networks[0].network_id, "def456");
    }

    #[test]
    fn container_event_maps_to_lifecycle_event() {
        let message = EventMessage {
            typ: Some(EventMessageTypeEnum::CONTAINER),
            action: Some("start".to_string()),
            actor: Some(EventActor {
                id: Some("c1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let event = to_event(message).unwrap();
        assert_eq!(event.action, EventAction::Start);
        assert_eq!(event.workload_id, "c1");
    }

    #[test]
    fn unknown_action_maps_to_other() {
        let message = EventMessage {
            typ: Some(EventMessageTypeEnum::CONTAINER),
            action: Some("health_status".to_string()),
            actor: Some(EventActor {
                id: Some("c1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(
            to_event(message).unwrap().action,
            EventAction::Other("health_status".to_string())
        );
    }

    #[test]
    fn incomplete_events_are_ignored() {
        let missing_actor = EventMessage {
            typ: Some(EventMessageTypeEnum::CONTAINER),
            action: Some("start".to_string()),
            ..Default::default()
        };
        assert!(to_event(missing_actor).is_none());

        let wrong_type = EventMessage {
            typ: Some(EventMessageTypeEnum::NETWORK),
            action: Some("create".to_string()),
            actor: Some(EventActor {
                id: Some("netA".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(to_event(wrong_type).is_none());
    }
}