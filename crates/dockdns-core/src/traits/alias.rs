// # Alias Provider Trait
//
// Defines the read interface to the operator-supplied alias table, which
// redirects a requested domain to a canonical workload name before every
// registry lookup.
//
// ## Implementations
//
// - `alias::AliasFileLoader`: periodically reloaded alias file
// - `alias::StaticAliases`, `alias::NoAliases`: fixed tables for tests
//   and embedders

/// Trait for alias table implementations
///
/// `alias_for_domain` is called while the registry's lock is held, so
/// implementations must be deterministic and non-blocking: an in-memory
/// table read, never I/O.
pub trait AliasProvider: Send + Sync {
    /// Return the canonical name the given domain is an alias for, if any
    fn alias_for_domain(&self, domain: &str) -> Option<String>;
}
