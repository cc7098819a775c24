//! Live route table and refresh.
//!
//! # Responsibilities
//! - Hold the active [`RouteTable`] for concurrent readers
//! - Rebuild from the routes file and publish the result atomically
//! - Keep serving the previous table when a rebuild fails
//!
//! # Design Decisions
//! - Readers load an `Arc<RouteTable>` snapshot; no locks on the match path
//! - A rebuild builds a complete new table before the single `ArcSwap` store

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::observability::metrics;
use crate::registry::{HandlerRegistry, ModuleResolver, NoModules, RouteSource};
use crate::routing::error::{ReverseError, RouteError};
use crate::routing::grammar::read_routes_file;
use crate::routing::matcher::MatchOutcome;
use crate::routing::reverse::ReverseTarget;
use crate::routing::table::RouteTable;

/// Shared router whose table is swapped on refresh.
pub struct Router {
    routes_path: PathBuf,
    modules: Arc<dyn ModuleResolver>,
    registry: Option<Arc<dyn HandlerRegistry>>,
    table: ArcSwap<RouteTable>,
}

impl Router {
    /// A router for `routes_path`, starting with an empty table.
    pub fn new(routes_path: impl Into<PathBuf>) -> Self {
        Self {
            routes_path: routes_path.into(),
            modules: Arc::new(NoModules),
            registry: None,
            table: ArcSwap::from_pointee(RouteTable::empty()),
        }
    }

    pub fn with_modules(mut self, modules: Arc<dyn ModuleResolver>) -> Self {
        self.modules = modules;
        self
    }

    /// Validate targets against `registry` on every [`Router::refresh`].
    pub fn with_registry(mut self, registry: Arc<dyn HandlerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn routes_path(&self) -> &Path {
        &self.routes_path
    }

    /// Files whose changes should trigger a refresh.
    pub fn watch_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.routes_path.clone()];
        paths.extend(self.modules.watch_paths());
        paths
    }

    /// Re-read the routes file and swap in the new table.
    pub fn refresh(&self) -> Result<Arc<RouteTable>, RouteError> {
        let source = read_routes_file(&self.routes_path).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to load routes file");
            metrics::record_rebuild("error", self.table.load().len());
        })?;
        self.rebuild(&source, true)
    }

    /// Compile `source` and swap it in. On error the current table stays.
    pub fn rebuild(&self, source: &RouteSource, validate: bool) -> Result<Arc<RouteTable>, RouteError> {
        let registry = if validate { self.registry.as_deref() } else { None };

        match RouteTable::from_source(source, self.modules.as_ref(), registry) {
            Ok(table) => {
                let table = Arc::new(table);
                self.table.store(table.clone());
                tracing::info!(origin = %source.origin, routes = table.len(), "Route table rebuilt");
                metrics::record_rebuild("ok", table.len());
                Ok(table)
            }
            Err(e) => {
                tracing::error!(
                    origin = %source.origin,
                    error = %e,
                    "Route table rebuild failed, keeping current routes"
                );
                metrics::record_rebuild("error", self.table.load().len());
                Err(e)
            }
        }
    }

    /// Snapshot of the active table.
    pub fn table(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    pub fn route(&self, method: &str, path: &str) -> MatchOutcome {
        self.table.load().route(method, path)
    }

    pub fn reverse(
        &self,
        action: &str,
        args: BTreeMap<String, String>,
    ) -> Result<ReverseTarget, ReverseError> {
        self.table.load().reverse(action, args)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_path", &self.routes_path)
            .field("routes", &self.table.load().len())
            .field("validating", &self.registry.is_some())
            .finish()
    }
}
