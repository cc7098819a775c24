//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! route-dispatch.toml
//!     → loader.rs (parse & deserialize, resolve relative paths)
//!     → validation.rs (semantic checks)
//!     → DispatchConfig (validated, immutable)
//!
//! On routes file change:
//!     watcher.rs detects change
//!     → Router::refresh rebuilds the table
//!     → atomic swap of Arc<RouteTable>
//!     → new table sent to subscribers
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only the routes files are watched; a config change needs a restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{DispatchConfig, ObservabilityConfig, RoutesConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::{watch_routes, RoutesWatcher, WatchHandle};
