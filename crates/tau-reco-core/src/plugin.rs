//! Builder and modifier plugin traits and their configuration

use crate::context::EventContext;
use crate::error::PluginError;
use crate::event::{ChargedHadron, ConstituentRef, PiZero, Seed};
use crate::tau::Tau;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Builds zero or more tau candidates from one seed and its associated data.
///
/// `setup` runs once per event before any `build`. Implementations hold only
/// read-only configuration plus state that `setup` re-initialises.
pub trait TauBuilder: Send {
    /// Unique plugin identifier
    fn name(&self) -> &str;

    /// Per-event preparation
    fn setup(&mut self, _ctx: &EventContext) -> Result<(), PluginError> {
        Ok(())
    }

    /// Build candidates for `seed`. An empty result is not an error.
    fn build(
        &self,
        seed: &Seed,
        charged: &[ChargedHadron],
        pi_zeros: &[PiZero],
        regional_extras: &[ConstituentRef],
    ) -> Result<Vec<Tau>, PluginError>;
}

/// Refines already-built candidates in place
pub trait TauModifier: Send {
    /// Unique plugin identifier
    fn name(&self) -> &str;

    /// Per-event preparation, before any `apply`
    fn setup(&mut self, _ctx: &EventContext) -> Result<(), PluginError> {
        Ok(())
    }

    /// Modify one output candidate
    fn apply(&mut self, tau: &mut Tau) -> Result<(), PluginError>;

    /// Called once after every candidate of the event has been modified
    fn end_event(&mut self) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Configuration of one builder or modifier instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Instance name, used in logs and errors
    pub name: String,

    /// Registered plugin type identifier
    pub plugin: String,

    /// Plugin debug output is emitted when this is above zero
    #[serde(default)]
    pub verbosity: i32,

    /// Plugin-specific parameters, written next to `plugin`
    #[serde(flatten)]
    pub params: serde_yaml::Mapping,
}

impl PluginConfig {
    pub fn new(name: impl Into<String>, plugin: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plugin: plugin.into(),
            verbosity: 0,
            params: serde_yaml::Mapping::new(),
        }
    }

    /// Add a plugin-specific parameter
    pub fn with_param(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.params
            .insert(serde_yaml::Value::from(key), value.into());
        self
    }

    /// Deserialize the plugin-specific parameters into `T`
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, PluginError> {
        let value = serde_yaml::Value::Mapping(self.params.clone());
        Ok(serde_yaml::from_value(value)?)
    }
}
