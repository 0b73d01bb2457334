//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! descriptor file (JSON/TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → policy::PolicyIndex (compiled lookup)
//!     → CachePolicyDescriptor (validated, immutable)
//!     → shared via Arc with readers
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new descriptor
//!     → validation.rs validates
//!     → new descriptor sent to the owner
//!     → atomic swap of Arc<CachePolicyDescriptor>
//! ```
//!
//! # Design Decisions
//! - A descriptor is immutable once loaded; changes require full reload
//! - Optional keys default, unknown keys are rejected
//! - Validation separates syntactic (serde) from semantic checks

pub mod bundled;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{ConfigError, ConfigFormat};
pub use schema::{CacheRule, ConfigDocument, PartialQueryCaching, Seconds, ServiceConfig};
pub use validation::{validate_config, ValidationError};
