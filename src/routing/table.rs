//! Route table compilation.
//!
//! # Responsibilities
//! - Register every route's tree key in declaration order
//! - Register an implicit HEAD alias for every GET route
//! - Fail the whole build on the first structural conflict
//!
//! # Design Decisions
//! - A table is immutable once built; a refresh builds a new one
//! - The tree stores route indexes, so the route list and tree cannot drift

use crate::registry::{HandlerRegistry, ModuleResolver, RouteSource};
use crate::routing::error::RouteError;
use crate::routing::grammar::RouteParser;
use crate::routing::method::Method;
use crate::routing::route::{tree_key, Route};
use crate::routing::tree::{LeafId, PathTree};

/// Compiled routes and their prefix tree.
#[derive(Debug, Default)]
pub struct RouteTable {
    pub(crate) routes: Vec<Route>,
    pub(crate) tree: PathTree<usize>,
    /// Primary leaf of each route, by route index.
    pub(crate) leaves: Vec<LeafId>,
}

impl RouteTable {
    /// A table that matches nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile `routes`, keeping their order as match priority.
    pub fn build(routes: Vec<Route>) -> Result<Self, RouteError> {
        let mut tree = PathTree::new();
        let mut leaves = Vec::with_capacity(routes.len());

        for (index, route) in routes.iter().enumerate() {
            let conflict = |source| RouteError::TreeConflict {
                location: route.location.clone(),
                source,
            };

            let leaf = tree.add(&route.tree_key, index).map_err(conflict)?;

            // GET routes also answer HEAD.
            if route.method == Method::Get {
                tree.add(&tree_key(Method::Head.as_str(), &route.path), index)
                    .map_err(conflict)?;
            }
            leaves.push(leaf);
        }

        Ok(Self {
            routes,
            tree,
            leaves,
        })
    }

    /// Parse `source` (expanding modules) and compile it. Targets are
    /// validated when a registry is given.
    pub fn from_source(
        source: &RouteSource,
        modules: &dyn ModuleResolver,
        registry: Option<&dyn HandlerRegistry>,
    ) -> Result<Self, RouteError> {
        let mut parser = RouteParser::new(modules);
        if let Some(registry) = registry {
            parser = parser.validating(registry);
        }
        Self::build(parser.parse(source)?)
    }

    /// Routes in declaration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NoModules;
    use crate::routing::error::TreeError;

    fn table(text: &str) -> Result<RouteTable, RouteError> {
        RouteTable::from_source(&RouteSource::new("routes", text), &NoModules, None)
    }

    #[test]
    fn test_build_registers_head_alias() {
        let t = table("GET /a A.A\nPOST /b B.B\n").unwrap();
        assert_eq!(t.len(), 2);
        // GET + HEAD + POST
        assert_eq!(t.tree.len(), 3);
        assert_eq!(t.leaves, vec![0, 2]);
    }

    #[test]
    fn test_duplicate_path_aborts_build() {
        let err = table("GET /a A.A\nGET /b B.B\nGET /a/ A.Again\n").unwrap_err();
        match err {
            RouteError::TreeConflict { location, source } => {
                assert_eq!(location.line, 3);
                assert!(matches!(source, TreeError::DuplicatePath(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_explicit_head_after_get_conflicts() {
        assert!(matches!(
            table("GET /a A.A\nHEAD /a A.Head\n"),
            Err(RouteError::TreeConflict { .. })
        ));
    }

    #[test]
    fn test_empty_segment_conflict() {
        assert!(matches!(
            table("GET /a//b A.A\n"),
            Err(RouteError::TreeConflict {
                source: TreeError::EmptySegment(_),
                ..
            })
        ));
    }

    #[test]
    fn test_empty_table() {
        let t = RouteTable::empty();
        assert!(t.is_empty());
        assert!(t.routes().is_empty());
    }
}
