//! Forward route matching.
//!
//! # Responsibilities
//! - Encode (method, path) into the tree key space and find the winning leaf
//! - Collect captured wildcard values as path parameters
//! - Substitute captured values into placeholder target identifiers
//!
//! # Design Decisions
//! - No match and an intentional `404` route are distinct outcomes
//! - Matching never fails with an error; every outcome is a value
//! - The method of a `*` route is captured by the tree but not reported

use std::collections::BTreeMap;

use serde::Serialize;

use crate::observability::metrics;
use crate::routing::route::{tree_key, Target};
use crate::routing::table::RouteTable;

/// Path parameters: placeholder name → captured values.
pub type Params = BTreeMap<String, Vec<String>>;

/// A request resolved to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    /// `Namespace.Member` after placeholder substitution.
    pub action: String,
    pub namespace: String,
    pub member: String,
    pub fixed_params: Vec<String>,
    pub params: Params,
    /// Index of the matched route in declaration order.
    pub route: usize,
}

/// Result of matching one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched(RouteMatch),
    /// A `404` route matched.
    IntentionalNotFound,
    /// No route matched.
    NoMatch,
}

impl MatchOutcome {
    pub fn into_match(self) -> Option<RouteMatch> {
        match self {
            MatchOutcome::Matched(m) => Some(m),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MatchOutcome::Matched(_) => "matched",
            MatchOutcome::IntentionalNotFound => "intentional_404",
            MatchOutcome::NoMatch => "no_match",
        }
    }
}

impl RouteTable {
    /// Resolve `method` and an already-decoded `path`.
    pub fn route(&self, method: &str, path: &str) -> MatchOutcome {
        let outcome = self.find(method, path);
        metrics::record_match(outcome.label());
        outcome
    }

    fn find(&self, method: &str, path: &str) -> MatchOutcome {
        let Some((leaf, expansions)) = self.tree.find(&tree_key(method, path)) else {
            return MatchOutcome::NoMatch;
        };
        let index = *leaf.value();
        let Some(route) = self.routes.get(index) else {
            return MatchOutcome::NoMatch;
        };

        if route.target == Target::NotFound {
            return MatchOutcome::IntentionalNotFound;
        }

        // The first capture of a `*` route is the request method.
        let skip = usize::from(route.method.is_any());
        let mut params = Params::new();
        for (name, value) in leaf.wildcards().iter().zip(expansions).skip(skip) {
            params.entry(name.clone()).or_default().push(value);
        }

        let (namespace, member) = match route.parts() {
            Some((namespace, member)) => (namespace.resolve(&params), member.resolve(&params)),
            None => (String::new(), String::new()),
        };
        let action = if namespace.is_empty() && member.is_empty() {
            route.action.clone()
        } else {
            format!("{}.{}", namespace, member)
        };

        tracing::trace!(method, path, action = %action, route = index, "Route matched");
        MatchOutcome::Matched(RouteMatch {
            action,
            namespace,
            member,
            fixed_params: route.fixed_params.clone(),
            params,
            route: index,
        })
    }
}
