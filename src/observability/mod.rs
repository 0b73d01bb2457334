//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! loader / validation / watcher produce:
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → stderr (pretty for humans, JSON for log aggregation)
//! ```

pub mod logging;
