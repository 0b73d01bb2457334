//! Descriptors shipped with the crate.

use crate::config::loader::{ConfigError, ConfigFormat};
use crate::policy::CachePolicyDescriptor;

/// Source of the descriptor deployed for the `cosmofy` service.
pub const COSMOFY_JSON: &str = include_str!("../../config/cosmofy.json");

/// The `cosmofy` descriptor, validated and indexed.
pub fn cosmofy() -> Result<CachePolicyDescriptor, ConfigError> {
    CachePolicyDescriptor::from_str(COSMOFY_JSON, ConfigFormat::Json)
}
