//! Naming policy: orchestrator name → DNS registry key
//!
//! Turning a raw orchestrator name into a DNS key is deployment
//! convention, not registry logic, so it sits behind a trait.

/// Trait for name normalization policies
pub trait NamingPolicy: Send + Sync {
    /// Derive the DNS registry key for a raw orchestrator name
    ///
    /// The returned key is FQDN-shaped (trailing dot) so it matches
    /// query names as they arrive on the wire.
    fn dns_name(&self, raw_name: &str) -> String;
}

/// Compose-style naming convention
///
/// Container names of the form `/<project>_<service>_<index>` resolve to
/// the service segment; names without underscores resolve to themselves
/// with any leading slash stripped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeNaming;

impl NamingPolicy for ComposeNaming {
    fn dns_name(&self, raw_name: &str) -> String {
        let parts: Vec<&str> = raw_name.split('_').collect();
        let name = if parts.len() < 2 {
            raw_name.strip_prefix('/').unwrap_or(raw_name)
        } else {
            parts[1]
        };

        format!("{name}.")
    }
}
