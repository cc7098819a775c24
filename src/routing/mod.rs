//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (startup and refresh):
//!     conf/routes text
//!     → grammar.rs (line grammar, module includes, comments)
//!     → route.rs (Route descriptors, target parsing, fixed args)
//!     → table.rs (tree keys + implicit HEAD → RouteTable)
//!     → router.rs (atomic swap of the active table)
//!
//! Incoming Request (method, decoded path)
//!     → matcher.rs (tree lookup, params, placeholder identifiers)
//!     → Return: RouteMatch, IntentionalNotFound or NoMatch
//!
//! Reverse Routing:
//!     Namespace.Member + args
//!     → reverse.rs (first compatible route, path fill, query string)
//!     → Return: ReverseTarget
//! ```
//!
//! # Design Decisions
//! - Tables are compiled up front and immutable once published
//! - Declaration order is the only precedence rule
//! - The method is the first path segment of the tree key, so one tree
//!   serves every method

pub mod encoding;
pub mod error;
pub mod grammar;
pub mod matcher;
pub mod method;
pub mod reverse;
pub mod route;
pub mod router;
pub mod table;
pub mod tree;

pub use error::{ReverseError, RouteError, SourceLocation, TreeError};
pub use grammar::{parse_route_line, read_routes_file, RouteLine, RouteParser};
pub use matcher::{MatchOutcome, Params, RouteMatch};
pub use method::Method;
pub use reverse::ReverseTarget;
pub use route::{IdentPart, Route, Target, NOT_FOUND_ACTION};
pub use router::Router;
pub use table::RouteTable;
