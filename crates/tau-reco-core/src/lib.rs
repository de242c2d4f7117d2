//! Tau Reco Core - Plugin-based tau candidate construction
//!
//! This crate provides the per-event construction pipeline that turns jet-like
//! seeds into tau candidates: region differencing, the builder/modifier plugin
//! contract, per-seed assembly with selection and null-tau fallback, and the
//! event-level orchestration that runs the modifier chain over the output.

pub mod assembler;
pub mod builders;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod kinematics;
pub mod modifiers;
pub mod pipeline;
pub mod plugin;
pub mod region;
pub mod registry;
pub mod selection;
pub mod tau;

#[cfg(test)]
mod testing;

pub use assembler::{JetPreselection, SeedAssembler, SeedOutcome};
pub use config::{InputTags, ProducerConfig};
pub use context::{EventContext, EventId};
pub use error::{PipelineError, PluginError, RegistryError};
pub use event::{
    Association, ChargedHadron, ChargedHadronAlgo, ConstituentRef, EventInputs, EventRecord,
    PiZero, PiZeroAlgo, RefKey, Seed, SeedKey,
};
pub use kinematics::P4;
pub use pipeline::{EventSummary, TauPipeline};
pub use plugin::{PluginConfig, TauBuilder, TauModifier};
pub use region::unique_regional_extras;
pub use registry::Registry;
pub use selection::Selection;
pub use tau::{DecayMode, Tau};
