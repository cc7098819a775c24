//! Route table compiler, matcher and reverse router for an MVC-style
//! request dispatcher.

pub mod config;
pub mod dispatch;
pub mod observability;
pub mod registry;
pub mod routing;

pub use config::schema::DispatchConfig;
pub use dispatch::{Dispatcher, Invocation};
pub use registry::{ActionTable, ModuleDirectory};
pub use routing::{MatchOutcome, ReverseTarget, RouteTable, Router};
