//! Cache policy descriptor for a GraphQL API behind an edge cache.

pub mod config;
pub mod observability;
pub mod policy;

pub use config::schema::{ConfigDocument, ServiceConfig};
pub use config::{ConfigError, ConfigFormat};
pub use policy::{CachePolicy, CachePolicyDescriptor, PolicyResolution};
