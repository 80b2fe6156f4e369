//! Alias table implementations
//!
//! Aliases redirect a requested domain to a canonical workload name and
//! are consulted before every registry lookup. The file-backed loader
//! reloads its table periodically from a whitespace-separated two-column
//! file:
//!
//! ```text
//! # requested-domain    target
//! mydomain.com          web.
//! legacy.internal       api.
//! ```
//!
//! The first column gets the trailing dot appended so it matches query
//! names on the wire; the target column is taken verbatim and is
//! expected in normalized (trailing-dot) form.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::traits::AliasProvider;

/// Alias provider with no entries
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAliases;

impl AliasProvider for NoAliases {
    fn alias_for_domain(&self, _domain: &str) -> Option<String> {
        None
    }
}

/// Fixed alias table, for tests and embedders
#[derive(Debug, Clone, Default)]
pub struct StaticAliases {
    aliases: HashMap<String, String>,
}

impl StaticAliases {
    /// Build a table from `(domain, target)` pairs
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            aliases: entries
                .into_iter()
                .map(|(domain, target)| (domain.into(), target.into()))
                .collect(),
        }
    }
}

impl AliasProvider for StaticAliases {
    fn alias_for_domain(&self, domain: &str) -> Option<String> {
        self.aliases.get(domain).cloned()
    }
}

/// File-backed alias table with periodic reload
pub struct AliasFileLoader {
    path: PathBuf,
    reload_interval: Duration,
    aliases: Mutex<HashMap<String, String>>,
}

impl AliasFileLoader {
    /// Create a loader for the given file
    ///
    /// The table starts empty; call [`run`](Self::run) to load it and
    /// keep it fresh.
    pub fn new(path: impl Into<PathBuf>, reload_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            path: path.into(),
            reload_interval,
            aliases: Mutex::new(HashMap::new()),
        })
    }

    /// Load immediately, then reload on a timer until cancelled
    pub async fn run(&self, cancel: CancellationToken) {
        info!(path = %self.path.display(), "starting alias loader");
        self.reload().await;

        let mut ticker = tokio::time::interval(self.reload_interval);
        ticker.tick().await; // first tick completes immediately

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("stopping alias loader");
                    return;
                }
                _ = ticker.tick() => {
                    self.reload().await;
                }
            }
        }
    }

    async fn reload(&self) {
        debug!(path = %self.path.display(), "loading alias file");

        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "could not load aliases");
                return;
            }
        };

        let parsed = parse_aliases(&content);
        if parsed.is_empty() {
            // An empty or unparsable file keeps the previous table.
            return;
        }

        debug!(aliases = parsed.len(), "alias table replaced");
        let mut aliases = self.aliases.lock().unwrap();
        *aliases = parsed;
    }
}

impl AliasProvider for AliasFileLoader {
    fn alias_for_domain(&self, domain: &str) -> Option<String> {
        self.aliases.lock().unwrap().get(domain).cloned()
    }
}

/// Parse alias file content into a domain → target table
///
/// Lines must have exactly two whitespace-separated fields; lines whose
/// first field contains `#` are comments. The domain column gets the
/// trailing dot appended.
pub fn parse_aliases(content: &str) -> HashMap<String, String> {
    let mut aliases = HashMap::new();

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 || fields[0].contains('#') {
            continue;
        }
        aliases.insert(format!("{}.", fields[0]), fields[1].to_string());
    }

    aliases
}
