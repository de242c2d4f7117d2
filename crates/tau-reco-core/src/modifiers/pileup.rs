//! Pileup correction of the isolation sum using the event energy density

use super::isolation::ISO_SUM_PT;
use crate::context::EventContext;
use crate::error::PluginError;
use crate::plugin::{PluginConfig, TauModifier};
use crate::tau::Tau;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ISO_SUM_PT_CORRECTED: &str = "iso_sum_pt_corrected";

fn default_rho_name() -> String {
    "rho".to_string()
}

fn default_effective_area() -> f64 {
    // pi * 0.5^2
    0.785398
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileupParams {
    /// Event context value holding the energy density
    #[serde(default = "default_rho_name")]
    pub rho: String,

    #[serde(default = "default_effective_area")]
    pub effective_area: f64,
}

impl Default for PileupParams {
    fn default() -> Self {
        Self {
            rho: default_rho_name(),
            effective_area: default_effective_area(),
        }
    }
}

/// Writes `iso_sum_pt_corrected = max(0, iso_sum_pt - rho * area)`.
///
/// Needs `iso_sum_pt`, so it must follow the isolation modifier. Taus without
/// that annotation are left untouched.
pub struct PileupCorrectionModifier {
    name: String,
    params: PileupParams,
    rho: Option<f64>,
    events_seen: u64,
    verbosity: i32,
}

impl PileupCorrectionModifier {
    pub fn new(name: impl Into<String>, params: PileupParams) -> Self {
        Self {
            name: name.into(),
            params,
            rho: None,
            events_seen: 0,
            verbosity: 0,
        }
    }

    pub fn with_verbosity(mut self, verbosity: i32) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn from_config(config: &PluginConfig) -> Result<Self, PluginError> {
        Ok(Self::new(config.name.clone(), config.params()?).with_verbosity(config.verbosity))
    }

    /// Events completed by this instance
    pub fn events_seen(&self) -> u64 {
        self.events_seen
    }
}

impl TauModifier for PileupCorrectionModifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, ctx: &EventContext) -> Result<(), PluginError> {
        let rho = ctx.value(&self.params.rho).unwrap_or(0.0);
        if self.verbosity > 0 {
            debug!("{}: event {} {}={:.3}", self.name, ctx.id, self.params.rho, rho);
        }
        self.rho = Some(rho);
        Ok(())
    }

    fn apply(&mut self, tau: &mut Tau) -> Result<(), PluginError> {
        let rho = self
            .rho
            .ok_or_else(|| PluginError::NotSetUp(self.name.clone()))?;
        if let Some(iso) = tau.aux(ISO_SUM_PT) {
            let corrected = (iso - rho * self.params.effective_area).max(0.0);
            tau.set_aux(ISO_SUM_PT_CORRECTED, corrected);
        }
        Ok(())
    }

    fn end_event(&mut self) -> Result<(), PluginError> {
        self.rho = None;
        self.events_seen += 1;
        Ok(())
    }
}
