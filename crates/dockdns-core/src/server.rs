//! DNS protocol handler and UDP server
//!
//! Serves A-record queries from the registry over UDP using
//! [hickory-server]. The handler performs exactly one registry lookup
//! per query and never calls out to the orchestrator; keeping the write
//! path (survey/updater) separate is what keeps this path non-blocking.
//!
//! [hickory-server]: https://crates.io/crates/hickory-server

use async_trait::async_trait;
use hickory_server::ServerFuture;
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::proto::op::{Header, ResponseCode};
use hickory_server::proto::rr::rdata::A;
use hickory_server::proto::rr::{RData, Record, RecordType};
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::DnsConfig;
use crate::error::{Error, Result};
use crate::registry::DnsRegistry;

/// UDP DNS server answering from a [`DnsRegistry`]
pub struct DnsServer {
    registry: DnsRegistry,
    ttl: u32,
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl DnsServer {
    /// Bind the UDP socket
    ///
    /// Binding is separate from serving so callers can guarantee the
    /// survey has completed before the socket exists at all.
    pub async fn bind(config: &DnsConfig, registry: DnsRegistry) -> Result<Self> {
        let socket = UdpSocket::bind(config.listen_addr).await?;
        let local_addr = socket.local_addr()?;
        info!(addr = %local_addr, "dns server listening (udp)");

        Ok(Self {
            registry,
            ttl: config.ttl,
            socket,
            local_addr,
        })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve queries until the token fires, then shut the socket down
    ///
    /// A failed graceful shutdown is returned as an error: the process
    /// cannot otherwise guarantee the port is released, so callers treat
    /// it as fatal.
    pub async fn serve(self, cancel: CancellationToken) -> Result<()> {
        let handler = RegistryHandler::new(self.registry, self.ttl);

        let mut server = ServerFuture::new(handler);
        server.register_socket(self.socket);

        tokio::select! {
            _ = cancel.cancelled() => {
                info!("dns server shutdown requested");
            }
            result = server.block_until_done() => {
                result.map_err(|e| Error::server(e.to_string()))?;
            }
        }

        server
            .shutdown_gracefully()
            .await
            .map_err(|e| Error::server(format!("failed to gracefully shutdown udp listener: {e}")))
    }
}

/// hickory request handler backed by the registry
#[derive(Clone)]
pub struct RegistryHandler {
    registry: DnsRegistry,
    ttl: u32,
}

impl RegistryHandler {
    /// Create a handler over `registry` with a fixed answer TTL
    pub fn new(registry: DnsRegistry, ttl: u32) -> Self {
        Self { registry, ttl }
    }
}

#[async_trait]
impl RequestHandler for RegistryHandler {
    async fn handle_request<R>(&self, request: &Request, mut response_handle: R) -> ResponseInfo
    where
        R: ResponseHandler,
    {
        let query = request.query();
        let mut header = Header::response_from_request(request.header());
        let builder = MessageResponseBuilder::from_message_request(request);

        // Only address-record queries are answered; the reply to
        // anything else carries no answer records.
        let result = if query.query_type() == RecordType::A {
            header.set_authoritative(true);
            let domain = query.name().to_string();

            match self.registry.lookup_ip(&domain) {
                Some(ip) => match ip.parse::<Ipv4Addr>() {
                    Ok(addr) => {
                        debug!(domain = %domain, ip = %ip, "answering query");
                        let records = [Record::from_rdata(
                            query.name().clone().into(),
                            self.ttl,
                            RData::A(A(addr)),
                        )];
                        let response = builder.build(
                            header,
                            records.iter(),
                            std::iter::empty(),
                            std::iter::empty(),
                            std::iter::empty(),
                        );
                        response_handle.send_response(response).await
                    }
                    Err(_) => {
                        error!(
                            domain = %domain,
                            address = %ip,
                            "registered address is not a valid ipv4 address"
                        );
                        response_handle.send_response(builder.build_no_records(header)).await
                    }
                },
                // Not found: an empty but authoritative answer section,
                // never a wire-level error.
                None => {
                    debug!(domain = %domain, "no registry entry");
                    response_handle.send_response(builder.build_no_records(header)).await
                }
            }
        } else {
            response_handle.send_response(builder.build_no_records(header)).await
        };

        match result {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, "error writing dns response");
                let mut header = Header::new();
                header.set_response_code(ResponseCode::ServFail);
                header.into()
            }
        }
    }
}
