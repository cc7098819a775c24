//! Collaborators of the route compiler.
//!
//! # Data Flow
//! ```text
//! Route text
//!     → grammar (module:<name> line)
//!     → modules.rs ModuleResolver::find_module → route text or inactive
//!
//! Route validation / dispatch
//!     → actions.rs HandlerRegistry::action_exists
//!     → ActionTable (explicit name → handler table)
//! ```
//!
//! # Design Decisions
//! - Handlers are registered by name up front; nothing is discovered at runtime
//! - An inactive module is not an error, it contributes no routes

pub mod actions;
pub mod modules;

pub use actions::{Action, ActionTable, Handler, HandlerRegistry, RegistryError};
pub use modules::{ModuleDirectory, ModuleResolver, NoModules, RouteSource, StaticModules};
