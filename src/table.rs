//! Declarative route tables
//!
//! A route table lists registrations in the same textual form accepted by
//! [`Router::process_route`]:
//!
//! ```yaml
//! routes:
//!   - route: "before '/admin/*'"
//!     handler: admin_guard
//!   - route: "get '/users/:id'"
//!     accept: application/json
//!     handler: show_user
//! ```
//!
//! The loaded router's targets are the handler names; binding names to
//! callables is left to the embedding framework. Entries that fail to
//! register are logged and skipped, exactly like code registrations made
//! through `process_route`.

use crate::router::Router;
use crate::runtime_config::RuntimeConfig;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// A single row of a route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// Route text, e.g. `get '/hello/:name'`
    pub route: String,
    /// Accept type served by the handler; the router default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    /// Handler name stored as the route target
    pub handler: String,
}

/// A parsed route table document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

/// Serialization format of a route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Yaml,
    Json,
    Toml,
}

impl TableFormat {
    /// Pick the format from a file extension (`yaml`, `yml`, `json`, `toml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(TableFormat::Yaml),
            "json" => Some(TableFormat::Json),
            "toml" => Some(TableFormat::Toml),
            _ => None,
        }
    }
}

impl RouteTable {
    /// Parse a route table from a string in the given format.
    pub fn parse(content: &str, format: TableFormat) -> anyhow::Result<Self> {
        let table = match format {
            TableFormat::Yaml => {
                serde_yaml::from_str(content).context("Failed to parse YAML route table")?
            }
            TableFormat::Json => {
                serde_json::from_str(content).context("Failed to parse JSON route table")?
            }
            TableFormat::Toml => {
                toml::from_str(content).context("Failed to parse TOML route table")?
            }
        };
        Ok(table)
    }

    /// Register every row on `router`, returning how many were accepted.
    pub fn register_into(&self, router: &mut Router<String>) -> usize {
        self.routes
            .iter()
            .filter(|spec| {
                router.process_route(&spec.route, spec.accept.as_deref(), spec.handler.clone())
            })
            .count()
    }

    /// Build a fresh router holding this table's routes.
    pub fn into_router(self, config: RuntimeConfig) -> Router<String> {
        let mut router = Router::with_config(config);
        let registered = self.register_into(&mut router);
        let skipped = self.routes.len() - registered;
        if skipped > 0 {
            warn!(registered, skipped, "Route table contained invalid entries");
        }
        router
    }
}

/// Load a route table file into a router configured from the environment.
///
/// # Errors
///
/// Fails when the file cannot be read, its extension is not a known table
/// format, or the document does not parse.
pub fn load_route_table(path: impl AsRef<Path>) -> anyhow::Result<Router<String>> {
    load_route_table_with_config(path, RuntimeConfig::from_env())
}

/// Load a route table file into a router using an explicit configuration.
pub fn load_route_table_with_config(
    path: impl AsRef<Path>,
    config: RuntimeConfig,
) -> anyhow::Result<Router<String>> {
    let path = path.as_ref();
    let Some(format) = TableFormat::from_path(path) else {
        bail!(
            "Unsupported route table extension for {} (expected .yaml, .yml, .json or .toml)",
            path.display()
        );
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read route table {}", path.display()))?;
    let table = RouteTable::parse(&content, format)
        .with_context(|| format!("Invalid route table {}", path.display()))?;

    let router = table.into_router(config);
    info!(
        path = %path.display(),
        routes = router.registry().len(),
        "Route table loaded"
    );
    Ok(router)
}
