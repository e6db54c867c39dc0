//! Backend Registry
//!
//! Resolves backend kinds to live [`AgentBackend`] instances once, when the
//! orchestrator is built. Nothing is looked up lazily per call.

use crate::backends::client::{AgentBackend, BackendKind};
use crate::types::{AppError, Result};
use crate::utils::toml_config::PlinyConfig;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of constructed backends keyed by kind
#[derive(Default, Clone)]
pub struct BackendRegistry {
    backends: HashMap<BackendKind, Arc<dyn AgentBackend>>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every backend kind, applying `[backends.<kind>]` overrides from configuration
    pub fn from_config(config: &PlinyConfig) -> Self {
        let mut registry = Self::new();
        for kind in [BackendKind::ClaudeCode, BackendKind::Codex, BackendKind::OpenCode] {
            let backend_config = config.backend(kind).cloned().unwrap_or_default();
            registry.register_as(kind, kind.create_backend(&backend_config));
        }
        registry
    }

    /// Register a backend under its own kind, replacing any previous one
    pub fn register(&mut self, backend: Arc<dyn AgentBackend>) {
        let kind = backend.kind();
        self.register_as(kind, backend);
    }

    /// Register a backend under an explicit kind
    pub fn register_as(&mut self, kind: BackendKind, backend: Arc<dyn AgentBackend>) {
        self.backends.insert(kind, backend);
    }

    /// Look up a backend by kind
    pub fn get(&self, kind: BackendKind) -> Result<Arc<dyn AgentBackend>> {
        self.backends.get(&kind).cloned().ok_or_else(|| {
            AppError::Configuration(format!("Backend '{}' is not registered", kind))
        })
    }

    /// Registered kinds
    pub fn kinds(&self) -> Vec<BackendKind> {
        self.backends.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::opencode::OpenCodeBackend;

    #[test]
    fn test_from_config_registers_all_kinds() {
        let registry = BackendRegistry::from_config(&PlinyConfig::default());
        let mut kinds = registry.kinds();
        kinds.sort_by_key(|k| k.id());

        assert_eq!(
            kinds,
            vec![BackendKind::ClaudeCode, BackendKind::Codex, BackendKind::OpenCode]
        );
        assert_eq!(registry.get(BackendKind::Codex).unwrap().name(), "Codex");
    }

    #[test]
    fn test_missing_backend_is_configuration_error() {
        let registry = BackendRegistry::new();
        let err = match registry.get(BackendKind::ClaudeCode) {
            Ok(_) => panic!("Expected error"),
            Err(e) => e,
        };
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("claude-code"));
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(OpenCodeBackend));
        registry.register(Arc::new(OpenCodeBackend));
        assert_eq!(registry.kinds(), vec![BackendKind::OpenCode]);
    }
}
