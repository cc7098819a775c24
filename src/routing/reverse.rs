//! Reverse routing: action identifier + arguments → URL.
//!
//! # Responsibilities
//! - Find the first route whose target can produce the requested identifier
//! - Bind identifier placeholders back into the argument map
//! - Substitute arguments into the path; leftovers become the query string
//!
//! # Design Decisions
//! - Declaration order decides between candidates, mirroring forward matching
//! - A placeholder half only matches when the identifier carries the literal
//!   prefix followed by `:`; a bare byte-prefix is not enough
//! - Missing path arguments are logged and left as `:name` in the URL

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::observability::metrics;
use crate::routing::encoding::encode_query;
use crate::routing::error::ReverseError;
use crate::routing::method::Method;
use crate::routing::route::PartMatch;
use crate::routing::table::RouteTable;

/// A generated URL and how to request it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReverseTarget {
    pub method: Method,
    /// Path plus query string.
    pub url: String,
    /// The route accepted any method; `method` is the GET default.
    pub star: bool,
    pub action: String,
    /// Arguments after identifier placeholders were bound.
    pub args: BTreeMap<String, String>,
}

impl fmt::Display for ReverseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl RouteTable {
    /// Generate the URL for `action` (`Namespace.Member`).
    pub fn reverse(
        &self,
        action: &str,
        mut args: BTreeMap<String, String>,
    ) -> Result<ReverseTarget, ReverseError> {
        let parts: Vec<&str> = action.split('.').collect();
        let [namespace, member] = parts.as_slice() else {
            tracing::error!(action, "Reverse router got invalid action");
            return Err(ReverseError::InvalidAction(action.to_string()));
        };

        for (index, route) in self.routes.iter().enumerate() {
            let Some((route_namespace, route_member)) = route.parts() else {
                continue;
            };
            if route_namespace.is_empty() || route_member.is_empty() {
                continue;
            }
            let (Some(namespace_match), Some(member_match)) =
                (route_namespace.unfill(namespace), route_member.unfill(member))
            else {
                continue;
            };

            for bound in [namespace_match, member_match] {
                if let PartMatch::Bound { name, value } = bound {
                    args.insert(name, value);
                }
            }

            let Some(reversed) = self
                .leaves
                .get(index)
                .and_then(|&leaf| self.tree.reverse(leaf, 1, &args))
            else {
                continue;
            };
            if !reversed.missing.is_empty() {
                tracing::error!(action, missing = ?reversed.missing, "Reverse route missing route args");
            }

            let mut url = reversed.path;
            if !reversed.unused.is_empty() {
                url.push('?');
                url.push_str(&encode_query(&reversed.unused));
            }

            let (method, star) = match route.method {
                Method::Any => (Method::Get, true),
                method => (method, false),
            };

            metrics::record_reverse("found");
            return Ok(ReverseTarget {
                method,
                url,
                star,
                action: action.to_string(),
                args,
            });
        }

        tracing::error!(action, args = ?args, "Failed to find reverse route");
        metrics::record_reverse("not_found");
        Err(ReverseError::NotFound {
            action: action.to_string(),
            args,
        })
    }
}
