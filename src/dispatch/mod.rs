//! Request dispatch onto registered actions.
//!
//! # Data Flow
//! ```text
//! Request (method, raw path)
//!     → decode path
//!     → Router::route → MatchOutcome
//!     → ActionTable lookup (resolved Namespace.Member)
//!     → bind fixed params to declared argument names
//!     → Handler(&Invocation) → Response
//! ```
//!
//! # Design Decisions
//! - Every routing failure becomes a 404; the body says which kind
//! - An action declared without a callable answers 501
//! - Extra fixed params beyond the declared arguments are dropped with a warning

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use thiserror::Error;

use crate::registry::{ActionTable, Handler, RegistryError};
use crate::routing::encoding::decode_path;
use crate::routing::matcher::{MatchOutcome, Params};
use crate::routing::Router;

/// Everything a handler receives about the request it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub action: String,
    pub namespace: String,
    pub member: String,
    /// Values captured from the path.
    pub route_params: Params,
    /// Fixed route arguments keyed by the action's declared argument names.
    pub fixed_params: BTreeMap<String, String>,
}

/// Why a request could not be handed to a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("No matching route found")]
    NoRoute,

    #[error("(intentionally)")]
    IntentionalNotFound,

    #[error(transparent)]
    UnknownAction(#[from] RegistryError),

    #[error("action {0} has no handler")]
    NoHandler(String),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NoHandler(_) => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::NOT_FOUND,
        }
    }
}

/// Routes requests and invokes the matching handler.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
    actions: Arc<ActionTable>,
}

impl Dispatcher {
    pub fn new(router: Arc<Router>, actions: Arc<ActionTable>) -> Self {
        Self { router, actions }
    }

    /// Resolve a decoded path to an invocation and its handler.
    pub fn resolve(&self, method: &str, path: &str) -> Result<(Invocation, Handler), DispatchError> {
        let matched = match self.router.route(method, path) {
            MatchOutcome::Matched(m) => m,
            MatchOutcome::IntentionalNotFound => return Err(DispatchError::IntentionalNotFound),
            MatchOutcome::NoMatch => return Err(DispatchError::NoRoute),
        };

        let action = self.actions.find(&matched.namespace, &matched.member)?;
        let handler = action
            .handler()
            .cloned()
            .ok_or_else(|| DispatchError::NoHandler(action.name()))?;

        let mut fixed_params = BTreeMap::new();
        for (i, value) in matched.fixed_params.iter().enumerate() {
            let Some(arg) = action.args.get(i) else {
                tracing::warn!(
                    action = %matched.action,
                    value = %value,
                    "Too many parameters to action"
                );
                break;
            };
            fixed_params.insert(arg.clone(), value.clone());
        }

        let invocation = Invocation {
            action: matched.action,
            namespace: matched.namespace,
            member: matched.member,
            route_params: matched.params,
            fixed_params,
        };
        Ok((invocation, handler))
    }

    /// Route `request` and run its handler.
    pub fn dispatch<B>(&self, request: &Request<B>) -> Response<Body> {
        let method = request.method().as_str();
        let path = decode_path(request.uri().path());

        match self.resolve(method, &path) {
            Ok((invocation, handler)) => {
                tracing::debug!(method, path = %path, action = %invocation.action, "Dispatching request");
                handler(&invocation)
            }
            Err(e) => {
                tracing::debug!(method, path = %path, reason = %e, "Request not dispatched");
                (e.status(), e.to_string()).into_response()
            }
        }
    }
}
