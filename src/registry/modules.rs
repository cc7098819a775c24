//! Module route sources.
//!
//! A `module:<name>` line in a route file pulls in the routes of another
//! unit. Modules may legitimately be absent (e.g. a test runner that is only
//! active in development), so "not found" is a normal answer.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::routing::error::RouteError;
use crate::routing::grammar::read_routes_file;

/// Route text and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSource {
    /// File path or label used in error locations.
    pub origin: String,
    pub text: String,
}

impl RouteSource {
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }
}

/// Resolves module names to their route text.
pub trait ModuleResolver: Send + Sync {
    /// `Ok(None)` when the module is not active.
    fn find_module(&self, name: &str) -> Result<Option<RouteSource>, RouteError>;

    /// Files whose changes should trigger a refresh.
    fn watch_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// No modules are active.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModules;

impl ModuleResolver for NoModules {
    fn find_module(&self, _name: &str) -> Result<Option<RouteSource>, RouteError> {
        Ok(None)
    }
}

/// Modules on disk; each module's routes live at `<root>/conf/routes`.
#[derive(Debug, Clone, Default)]
pub struct ModuleDirectory {
    roots: BTreeMap<String, PathBuf>,
}

impl ModuleDirectory {
    pub fn new(roots: BTreeMap<String, PathBuf>) -> Self {
        Self { roots }
    }

    pub fn routes_path(root: &Path) -> PathBuf {
        root.join("conf").join("routes")
    }
}

impl ModuleResolver for ModuleDirectory {
    fn find_module(&self, name: &str) -> Result<Option<RouteSource>, RouteError> {
        match self.roots.get(name) {
            Some(root) => read_routes_file(&Self::routes_path(root)).map(Some),
            None => Ok(None),
        }
    }

    fn watch_paths(&self) -> Vec<PathBuf> {
        self.roots.values().map(|root| Self::routes_path(root)).collect()
    }
}

/// In-memory modules, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticModules {
    modules: HashMap<String, String>,
}

impl StaticModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, routes: &str) -> Self {
        self.modules.insert(name.to_string(), routes.to_string());
        self
    }
}

impl ModuleResolver for StaticModules {
    fn find_module(&self, name: &str) -> Result<Option<RouteSource>, RouteError> {
        Ok(self
            .modules
            .get(name)
            .map(|text| RouteSource::new(format!("module:{}", name), text.clone())))
    }
}
