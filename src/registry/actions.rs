//! Handler registry.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Response;
use thiserror::Error;

use crate::dispatch::Invocation;

/// Callable bound to a `Namespace.Member` identifier.
pub type Handler = Arc<dyn Fn(&Invocation) -> Response<Body> + Send + Sync>;

/// Lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no such handler: {namespace}.{member}")]
    UnknownAction { namespace: String, member: String },
}

/// Answers whether an identifier names a real handler.
pub trait HandlerRegistry: Send + Sync {
    fn action_exists(&self, namespace: &str, member: &str) -> Result<(), RegistryError>;
}

/// A registered action.
#[derive(Clone)]
pub struct Action {
    pub namespace: String,
    pub member: String,
    /// Declared argument names; fixed route arguments bind to these by position.
    pub args: Vec<String>,
    handler: Option<Handler>,
}

impl Action {
    /// The callable, if one was registered (declarations have none).
    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// `Namespace.Member`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.namespace, self.member)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("namespace", &self.namespace)
            .field("member", &self.member)
            .field("args", &self.args)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Explicit registration table of actions.
#[derive(Debug, Clone, Default)]
pub struct ActionTable {
    actions: HashMap<(String, String), Action>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table of declared (handler-less) actions, namespace → member names.
    pub fn from_declarations(declared: &BTreeMap<String, Vec<String>>) -> Self {
        let mut table = Self::new();
        for (namespace, members) in declared {
            for member in members {
                table.declare(namespace, member, &[]);
            }
        }
        table
    }

    /// Make an identifier known without binding a callable.
    pub fn declare(&mut self, namespace: &str, member: &str, args: &[&str]) -> &mut Self {
        self.insert(namespace, member, args, None)
    }

    /// Bind a callable to `namespace.member`. Replaces an earlier entry.
    pub fn register<F>(&mut self, namespace: &str, member: &str, args: &[&str], handler: F) -> &mut Self
    where
        F: Fn(&Invocation) -> Response<Body> + Send + Sync + 'static,
    {
        self.insert(namespace, member, args, Some(Arc::new(handler)))
    }

    fn insert(
        &mut self,
        namespace: &str,
        member: &str,
        args: &[&str],
        handler: Option<Handler>,
    ) -> &mut Self {
        let action = Action {
            namespace: namespace.to_string(),
            member: member.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            handler,
        };
        self.actions
            .insert((namespace.to_string(), member.to_string()), action);
        self
    }

    pub fn get(&self, namespace: &str, member: &str) -> Option<&Action> {
        self.actions
            .get(&(namespace.to_string(), member.to_string()))
    }

    /// Like [`ActionTable::get`], with the registry error on a miss.
    pub fn find(&self, namespace: &str, member: &str) -> Result<&Action, RegistryError> {
        self.get(namespace, member)
            .ok_or_else(|| RegistryError::UnknownAction {
                namespace: namespace.to_string(),
                member: member.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl HandlerRegistry for ActionTable {
    fn action_exists(&self, namespace: &str, member: &str) -> Result<(), RegistryError> {
        self.find(namespace, member).map(|_| ())
    }
}
