//! Policy lookup subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceConfig (parsed)
//!     → validation.rs (semantic checks)
//!     → index.rs (invert rules into type → rule, collect nonCacheable)
//!     → CachePolicyDescriptor (validated, immutable)
//!
//! Lookup:
//!     "Type" or "Type.field"
//!     → nonCacheable set (checked first)
//!     → type → rule map
//!     → Cached(policy) | NonCacheable | Unmatched
//! ```

pub mod descriptor;
pub mod index;

pub use descriptor::CachePolicyDescriptor;
pub use index::{CachePolicy, PolicyIndex, PolicyResolution, RulePolicy};
