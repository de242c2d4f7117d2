//! Per-seed candidate assembly
//!
//! For one seed: pre-filter, region lookup and differencing, every builder in
//! configured order, optional output selection, and the null-tau fallback.

use crate::error::PipelineError;
use crate::event::{EventInputs, Seed};
use crate::plugin::TauBuilder;
use crate::region::unique_regional_extras;
use crate::selection::Selection;
use crate::tau::Tau;
use tracing::debug;

/// Tolerance applied to both kinematic pre-filter thresholds
pub const PRESELECTION_EPSILON: f64 = 1e-5;

/// Kinematic pre-filter on seeds.
///
/// A seed passes when `pt - min_pt >= 1e-5` and `|eta| - max_abs_eta <= -1e-5`.
/// Seeds sitting on either threshold are therefore rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JetPreselection {
    pub min_pt: f64,
    pub max_abs_eta: f64,
}

impl JetPreselection {
    pub fn new(min_pt: f64, max_abs_eta: f64) -> Self {
        Self {
            min_pt,
            max_abs_eta,
        }
    }

    pub fn accepts(&self, seed: &Seed) -> bool {
        if seed.pt() - self.min_pt < PRESELECTION_EPSILON {
            return false;
        }
        if seed.eta().abs() - self.max_abs_eta > -PRESELECTION_EPSILON {
            return false;
        }
        true
    }
}

/// What one seed contributed to the event output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Failed the kinematic pre-filter
    Skipped,

    /// Builders produced this many surviving taus (at least one)
    Built(usize),

    /// Nothing survived; a null tau was emitted
    Null,

    /// Nothing survived and null taus are disabled
    Empty,
}

impl SeedOutcome {
    /// Number of taus appended to the output
    pub fn emitted(&self) -> usize {
        match self {
            SeedOutcome::Built(n) => *n,
            SeedOutcome::Null => 1,
            SeedOutcome::Skipped | SeedOutcome::Empty => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedAssembler {
    preselection: JetPreselection,
    selection: Option<Selection>,
    build_null_taus: bool,
    verbosity: i32,
}

impl SeedAssembler {
    pub fn new(
        preselection: JetPreselection,
        selection: Option<Selection>,
        build_null_taus: bool,
    ) -> Self {
        Self {
            preselection,
            selection,
            build_null_taus,
            verbosity: 0,
        }
    }

    pub fn with_verbosity(mut self, verbosity: i32) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Build every tau for `seed` and append them to `output`.
    ///
    /// Nothing is appended unless the whole seed succeeds.
    pub fn assemble(
        &self,
        builders: &[Box<dyn TauBuilder>],
        seed: &Seed,
        inputs: &EventInputs<'_>,
        output: &mut Vec<Tau>,
    ) -> Result<SeedOutcome, PipelineError> {
        if !self.preselection.accepts(seed) {
            if self.verbosity > 0 {
                debug!(
                    "Seed {} skipped: pt={:.3} eta={:.3}",
                    seed.key,
                    seed.pt(),
                    seed.eta()
                );
            }
            return Ok(SeedOutcome::Skipped);
        }

        let region = inputs
            .region(&seed.key)
            .ok_or(PipelineError::MissingRegion { seed: seed.key })?;

        let extras = unique_regional_extras(&seed.daughters, &region.daughters);
        let charged = inputs.charged_group(&seed.key);
        let pi_zeros = inputs.pi_zero_group(&seed.key);

        let mut taus = Vec::new();
        for builder in builders {
            let built = builder
                .build(seed, charged, pi_zeros, &extras)
                .map_err(|source| PipelineError::Builder {
                    plugin: builder.name().to_string(),
                    source,
                })?;

            for mut tau in built {
                tau.set_seed(seed.key);
                match &self.selection {
                    Some(selection) if !selection.passes(&tau) => {}
                    _ => taus.push(tau),
                }
            }
        }

        let outcome = if !taus.is_empty() {
            SeedOutcome::Built(taus.len())
        } else if self.build_null_taus {
            taus.push(Tau::null(seed));
            SeedOutcome::Null
        } else {
            SeedOutcome::Empty
        };

        if self.verbosity > 0 {
            debug!(
                "Seed {}: {:?} ({} regional extras, {} charged, {} pi-zeros)",
                seed.key,
                outcome,
                extras.len(),
                charged.len(),
                pi_zeros.len()
            );
        }

        output.append(&mut taus);
        Ok(outcome)
    }
}
