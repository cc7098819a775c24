//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, matcher, reverse router, watcher produce:
//!     → logging.rs (structured `tracing` events)
//!     → metrics.rs (counters and gauges via the `metrics` facade)
//!
//! Consumers:
//!     → stdout subscriber installed by the binary
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Without an installed recorder every metric call is a no-op
//! - Log level comes from config, `RUST_LOG` overrides it

pub mod logging;
pub mod metrics;
