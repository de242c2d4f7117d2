//! Error types for the tau construction pipeline

use crate::event::SeedKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Invalid plugin parameter: {0}")]
    InvalidParameter(String),

    #[error("Plugin execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Plugin used before setup: {0}")]
    NotSetUp(String),

    #[error("Parameter parsing error: {0}")]
    Params(#[from] serde_yaml::Error),
}

/// Configuration-time failures. Raised before any event is processed.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("No builder plugin registered as: {0}")]
    UnknownBuilder(String),

    #[error("No modifier plugin registered as: {0}")]
    UnknownModifier(String),

    #[error("Plugin identifier registered twice: {0}")]
    DuplicatePlugin(String),

    #[error("Invalid output selection '{selection}': {reason}")]
    InvalidSelection { selection: String, reason: String },

    #[error("Failed to construct plugin '{name}': {source}")]
    PluginConstruction {
        name: String,
        #[source]
        source: PluginError,
    },

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Event-time failures. Any of these aborts the current event.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No jet region can be found for the current jet: {seed}")]
    MissingRegion { seed: SeedKey },

    #[error("Input product not found in event: {tag}")]
    MissingProduct { tag: String },

    #[error("Builder '{plugin}' failed: {source}")]
    Builder {
        plugin: String,
        #[source]
        source: PluginError,
    },

    #[error("Modifier '{plugin}' failed: {source}")]
    Modifier {
        plugin: String,
        #[source]
        source: PluginError,
    },

    #[error("Event decoding error: {0}")]
    Decode(#[from] serde_json::Error),
}
