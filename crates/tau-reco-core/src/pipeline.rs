//! Event-level orchestration of builders and modifiers

use crate::assembler::{JetPreselection, SeedAssembler, SeedOutcome};
use crate::config::{InputTags, ProducerConfig};
use crate::context::EventContext;
use crate::error::{PipelineError, RegistryError};
use crate::event::{EventInputs, EventRecord};
use crate::plugin::{TauBuilder, TauModifier};
use crate::registry::Registry;
use crate::selection::Selection;
use crate::tau::Tau;
use tracing::debug;

/// Per-event bookkeeping, returned alongside the output collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventSummary {
    pub seeds: usize,
    pub skipped: usize,
    pub empty: usize,
    pub null_taus: usize,
    pub taus: usize,
}

impl EventSummary {
    fn record(&mut self, outcome: SeedOutcome) {
        self.seeds += 1;
        match outcome {
            SeedOutcome::Skipped => self.skipped += 1,
            SeedOutcome::Empty => self.empty += 1,
            SeedOutcome::Null => self.null_taus += 1,
            SeedOutcome::Built(_) => {}
        }
        self.taus += outcome.emitted();
    }
}

/// One tau producer instance.
///
/// Owns its plugin instances; events are processed one at a time through
/// `&mut self`. Run independent instances to process events concurrently.
pub struct TauPipeline {
    inputs: InputTags,
    assembler: SeedAssembler,
    builders: Vec<Box<dyn TauBuilder>>,
    modifiers: Vec<Box<dyn TauModifier>>,
}

impl TauPipeline {
    /// Resolve every configured plugin and the output selection.
    ///
    /// Any failure here is a configuration error; no partial pipeline is returned.
    pub fn from_config(config: &ProducerConfig, registry: &Registry) -> Result<Self, RegistryError> {
        let mut builders = Vec::with_capacity(config.builders.len());
        for builder_config in &config.builders {
            let builder = registry.create_builder(builder_config)?;
            debug!(
                "Builder '{}' ({})",
                builder_config.name, builder_config.plugin
            );
            builders.push(builder);
        }

        let mut modifiers = Vec::with_capacity(config.modifiers.len());
        for modifier_config in &config.modifiers {
            let modifier = registry.create_modifier(modifier_config)?;
            debug!(
                "Modifier '{}' ({})",
                modifier_config.name, modifier_config.plugin
            );
            modifiers.push(modifier);
        }

        let selection = Selection::from_config(config.output_selection.as_deref())?;
        if let Some(selection) = &selection {
            debug!("Output selection: {}", selection.as_str());
        }

        let assembler = SeedAssembler::new(
            JetPreselection::new(config.min_jet_pt, config.max_jet_abs_eta),
            selection,
            config.build_null_taus,
        )
        .with_verbosity(config.verbosity);

        Ok(Self {
            inputs: config.inputs.clone(),
            assembler,
            builders,
            modifiers,
        })
    }

    /// Assemble a pipeline from already-constructed plugins
    pub fn new(
        assembler: SeedAssembler,
        builders: Vec<Box<dyn TauBuilder>>,
        modifiers: Vec<Box<dyn TauModifier>>,
    ) -> Self {
        Self {
            inputs: InputTags::default(),
            assembler,
            builders,
            modifiers,
        }
    }

    pub fn input_tags(&self) -> &InputTags {
        &self.inputs
    }

    /// Build, select, and modify taus for one event
    pub fn run(
        &mut self,
        inputs: &EventInputs<'_>,
        ctx: &EventContext,
    ) -> Result<Vec<Tau>, PipelineError> {
        self.run_with_summary(inputs, ctx).map(|(taus, _)| taus)
    }

    /// Resolve the configured input tags in `record`, then run
    pub fn run_record(&mut self, record: &EventRecord) -> Result<Vec<Tau>, PipelineError> {
        let inputs = record.inputs(&self.inputs)?;
        self.run(&inputs, &record.context())
    }

    pub fn run_with_summary(
        &mut self,
        inputs: &EventInputs<'_>,
        ctx: &EventContext,
    ) -> Result<(Vec<Tau>, EventSummary), PipelineError> {
        for builder in &mut self.builders {
            builder
                .setup(ctx)
                .map_err(|source| PipelineError::Builder {
                    plugin: builder.name().to_string(),
                    source,
                })?;
        }
        for modifier in &mut self.modifiers {
            modifier
                .setup(ctx)
                .map_err(|source| PipelineError::Modifier {
                    plugin: modifier.name().to_string(),
                    source,
                })?;
        }

        let mut output = Vec::with_capacity(inputs.seeds.len());
        let mut summary = EventSummary::default();

        for seed in inputs.seeds {
            let outcome = self
                .assembler
                .assemble(&self.builders, seed, inputs, &mut output)?;
            summary.record(outcome);
        }

        for tau in &mut output {
            for modifier in &mut self.modifiers {
                modifier
                    .apply(tau)
                    .map_err(|source| PipelineError::Modifier {
                        plugin: modifier.name().to_string(),
                        source,
                    })?;
            }
        }

        for modifier in &mut self.modifiers {
            modifier
                .end_event()
                .map_err(|source| PipelineError::Modifier {
                    plugin: modifier.name().to_string(),
                    source,
                })?;
        }

        debug!(
            "Event {}: {} seeds, {} skipped, {} empty, {} null, {} taus",
            ctx.id, summary.seeds, summary.skipped, summary.empty, summary.null_taus, summary.taus
        );

        Ok((output, summary))
    }
}

impl std::fmt::Debug for TauPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let builders: Vec<&str> = self.builders.iter().map(|b| b.name()).collect();
        let modifiers: Vec<&str> = self.modifiers.iter().map(|m| m.name()).collect();
        f.debug_struct("TauPipeline")
            .field("inputs", &self.inputs)
            .field("assembler", &self.assembler)
            .field("builders", &builders)
            .field("modifiers", &modifiers)
            .finish()
    }
}
