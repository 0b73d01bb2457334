//! The validated cache policy descriptor.

use std::path::Path;

use crate::config::loader::{self, ConfigError, ConfigFormat};
use crate::config::schema::{ConfigDocument, ServiceConfig};
use crate::policy::index::{PolicyIndex, PolicyResolution, RulePolicy};

/// A descriptor that passed validation, together with its lookup table.
///
/// The only constructors parse, validate and compile in one step, so holding a
/// `CachePolicyDescriptor` means holding a descriptor the platform will accept.
#[derive(Debug, Clone)]
pub struct CachePolicyDescriptor {
    document: ConfigDocument,
    index: PolicyIndex,
}

impl CachePolicyDescriptor {
    /// Load a descriptor file (`.toml` or JSON).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let document = loader::read_document(path)?;
        let descriptor = Self::from_document(document)?;

        tracing::info!(
            path = %path.display(),
            service = %descriptor.name(),
            rules = descriptor.index.rules().len(),
            "Cache policy descriptor loaded"
        );

        Ok(descriptor)
    }

    pub fn from_str(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        Self::from_document(loader::parse_document(content, format)?)
    }

    pub fn from_document(document: ConfigDocument) -> Result<Self, ConfigError> {
        let index = PolicyIndex::compile(&document.config).map_err(ConfigError::Invalid)?;
        Ok(Self { document, index })
    }

    /// Policy for a type name or `Type.field` path.
    pub fn resolve(&self, path: &str) -> PolicyResolution<'_> {
        self.index.resolve(path)
    }

    pub fn rule_for(&self, type_name: &str) -> Option<&RulePolicy> {
        self.index.rule_for(type_name)
    }

    pub fn is_non_cacheable(&self, path: &str) -> bool {
        self.index.is_non_cacheable(path)
    }

    pub fn partial_query_caching(&self) -> bool {
        self.document.config.partial_query_caching.enabled
    }

    pub fn name(&self) -> &str {
        &self.document.config.name
    }

    pub fn origin_url(&self) -> &str {
        &self.document.config.origin_url
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.document.config
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn index(&self) -> &PolicyIndex {
        &self.index
    }

    /// The descriptor in the platform's wire shape.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        loader::render_document(&self.document, ConfigFormat::Json)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        loader::render_document(&self.document, ConfigFormat::Toml)
    }
}
