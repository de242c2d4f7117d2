//! Plugin registry: maps plugin type identifiers to factories

use crate::error::{PluginError, RegistryError};
use crate::plugin::{PluginConfig, TauBuilder, TauModifier};
use crate::{builders, modifiers};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub type BuilderFactory =
    Arc<dyn Fn(&PluginConfig) -> Result<Box<dyn TauBuilder>, PluginError> + Send + Sync>;

pub type ModifierFactory =
    Arc<dyn Fn(&PluginConfig) -> Result<Box<dyn TauModifier>, PluginError> + Send + Sync>;

/// Process-local registry of builder and modifier factories.
///
/// Constructed once at startup and passed to each pipeline. Lookup is by
/// identifier only; duplicate registration is rejected, so the set of
/// registrations fully determines resolution.
#[derive(Clone, Default)]
pub struct Registry {
    builders: BTreeMap<String, BuilderFactory>,
    modifiers: BTreeMap<String, ModifierFactory>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every plugin shipped with this crate
    pub fn with_builtin_plugins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        builders::register(&mut registry)?;
        modifiers::register(&mut registry)?;
        Ok(registry)
    }

    pub fn register_builder<F>(&mut self, id: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(&PluginConfig) -> Result<Box<dyn TauBuilder>, PluginError> + Send + Sync + 'static,
    {
        if self.builders.contains_key(id) {
            return Err(RegistryError::DuplicatePlugin(id.to_string()));
        }
        debug!("Registering builder plugin: {}", id);
        self.builders.insert(id.to_string(), Arc::new(factory));
        Ok(())
    }

    pub fn register_modifier<F>(&mut self, id: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(&PluginConfig) -> Result<Box<dyn TauModifier>, PluginError> + Send + Sync + 'static,
    {
        if self.modifiers.contains_key(id) {
            return Err(RegistryError::DuplicatePlugin(id.to_string()));
        }
        debug!("Registering modifier plugin: {}", id);
        self.modifiers.insert(id.to_string(), Arc::new(factory));
        Ok(())
    }

    /// Instantiate the builder named by `config.plugin`
    pub fn create_builder(&self, config: &PluginConfig) -> Result<Box<dyn TauBuilder>, RegistryError> {
        let factory = self
            .builders
            .get(&config.plugin)
            .ok_or_else(|| RegistryError::UnknownBuilder(config.plugin.clone()))?;
        factory(config).map_err(|source| RegistryError::PluginConstruction {
            name: config.name.clone(),
            source,
        })
    }

    /// Instantiate the modifier named by `config.plugin`
    pub fn create_modifier(
        &self,
        config: &PluginConfig,
    ) -> Result<Box<dyn TauModifier>, RegistryError> {
        let factory = self
            .modifiers
            .get(&config.plugin)
            .ok_or_else(|| RegistryError::UnknownModifier(config.plugin.clone()))?;
        factory(config).map_err(|source| RegistryError::PluginConstruction {
            name: config.name.clone(),
            source,
        })
    }

    /// Registered builder identifiers, sorted
    pub fn builder_names(&self) -> Vec<String> {
        self.builders.keys().cloned().collect()
    }

    /// Registered modifier identifiers, sorted
    pub fn modifier_names(&self) -> Vec<String> {
        self.modifiers.keys().cloned().collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("builders", &self.builder_names())
            .field("modifiers", &self.modifier_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChargedHadron, ConstituentRef, PiZero, Seed};
    use crate::tau::Tau;

    struct EmptyBuilder {
        name: String,
    }

    impl TauBuilder for EmptyBuilder {
        fn name(&self) -> &str {
            &self.name
        }

        fn build(
            &self,
            _seed: &Seed,
            _charged: &[ChargedHadron],
            _pi_zeros: &[PiZero],
            _regional_extras: &[ConstituentRef],
        ) -> Result<Vec<Tau>, PluginError> {
            Ok(Vec::new())
        }
    }

    fn empty_factory(config: &PluginConfig) -> Result<Box<dyn TauBuilder>, PluginError> {
        Ok(Box::new(EmptyBuilder {
            name: config.name.clone(),
        }))
    }

    #[test]
    fn test_registry_register_and_create() {
        let mut registry = Registry::new();
        registry.register_builder("empty", empty_factory).unwrap();

        let builder = registry
            .create_builder(&PluginConfig::new("first", "empty"))
            .unwrap();
        assert_eq!(builder.name(), "first");
    }

    #[test]
    fn test_unknown_plugin_is_config_error() {
        let registry = Registry::new();
        let err = registry
            .create_builder(&PluginConfig::new("x", "missing"))
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::UnknownBuilder(id) if id == "missing"));

        let err = registry
            .create_modifier(&PluginConfig::new("y", "missing"))
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::UnknownModifier(_)));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = Registry::new();
        registry.register_builder("empty", empty_factory).unwrap();
        let err = registry.register_builder("empty", empty_factory).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicatePlugin(_)));
    }

    #[test]
    fn test_names_independent_of_registration_order() {
        let mut a = Registry::new();
        a.register_builder("zeta", empty_factory).unwrap();
        a.register_builder("alpha", empty_factory).unwrap();

        let mut b = Registry::new();
        b.register_builder("alpha", empty_factory).unwrap();
        b.register_builder("zeta", empty_factory).unwrap();

        assert_eq!(a.builder_names(), b.builder_names());
        assert_eq!(a.builder_names(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_builtin_plugins() {
        let registry = Registry::with_builtin_plugins().unwrap();
        assert_eq!(
            registry.builder_names(),
            vec!["combinatoric", "leading_charged"]
        );
        assert_eq!(
            registry.modifier_names(),
            vec!["isolation_sum", "pileup_correction"]
        );
    }
}
