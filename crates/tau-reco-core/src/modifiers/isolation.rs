//! Isolation sums over the isolation-cone content of each tau

use crate::error::PluginError;
use crate::plugin::{PluginConfig, TauModifier};
use crate::tau::Tau;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ISO_CHARGED_SUM_PT: &str = "iso_charged_sum_pt";
pub const ISO_NEUTRAL_SUM_PT: &str = "iso_neutral_sum_pt";
pub const ISO_SUM_PT: &str = "iso_sum_pt";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsolationParams {
    /// Charged hadrons below this pt are not counted
    #[serde(default)]
    pub min_charged_pt: f64,

    /// Pi-zeros below this pt are not counted
    #[serde(default, alias = "minGammaEt")]
    pub min_neutral_pt: f64,
}

pub struct IsolationSumModifier {
    name: String,
    params: IsolationParams,
    verbosity: i32,
}

impl IsolationSumModifier {
    pub fn new(name: impl Into<String>, params: IsolationParams) -> Self {
        Self {
            name: name.into(),
            params,
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
}

impl TauModifier for IsolationSumModifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, tau: &mut Tau) -> Result<(), PluginError> {
        let charged: f64 = tau
            .isolation_charged
            .iter()
            .map(|h| h.p4.pt())
            .filter(|&pt| pt >= self.params.min_charged_pt)
            .sum();
        let neutral: f64 = tau
            .isolation_pi_zeros
            .iter()
            .map(|p| p.p4.pt())
            .filter(|&pt| pt >= self.params.min_neutral_pt)
            .sum();

        tau.set_aux(ISO_CHARGED_SUM_PT, charged);
        tau.set_aux(ISO_NEUTRAL_SUM_PT, neutral);
        tau.set_aux(ISO_SUM_PT, charged + neutral);
        if self.verbosity > 0 {
            debug!(
                "{}: charged={:.3} neutral={:.3} for tau pt={:.3}",
                self.name,
                charged,
                neutral,
                tau.p4.pt()
            );
        }
        Ok(())
    }
}
