//! Cone builder seeded by the leading charged hadron

use super::pt_ordered;
use crate::error::PluginError;
use crate::event::{ChargedHadron, ConstituentRef, PiZero, Seed};
use crate::plugin::{PluginConfig, TauBuilder};
use crate::tau::{DecayMode, Tau};
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_signal_cone() -> f64 {
    0.1
}

fn default_isolation_cone() -> f64 {
    0.5
}

fn default_min_lead_pt() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadingChargedParams {
    /// Pi-zeros within this delta-R of the lead hadron join the signal
    #[serde(default = "default_signal_cone")]
    pub signal_cone: f64,

    #[serde(default = "default_isolation_cone")]
    pub isolation_cone: f64,

    #[serde(default = "default_min_lead_pt", alias = "leadObjectPt")]
    pub min_lead_pt: f64,
}

impl Default for LeadingChargedParams {
    fn default() -> Self {
        Self {
            signal_cone: default_signal_cone(),
            isolation_cone: default_isolation_cone(),
            min_lead_pt: default_min_lead_pt(),
        }
    }
}

pub struct LeadingChargedBuilder {
    name: String,
    params: LeadingChargedParams,
    verbosity: i32,
}

impl LeadingChargedBuilder {
    pub fn new(name: impl Into<String>, params: LeadingChargedParams) -> Result<Self, PluginError> {
        if !(params.signal_cone >= 0.0 && params.isolation_cone >= params.signal_cone) {
            return Err(PluginError::InvalidParameter(format!(
                "cones must satisfy 0 <= signal_cone <= isolation_cone, got {} / {}",
                params.signal_cone, params.isolation_cone
            )));
        }
        Ok(Self {
            name: name.into(),
            params,
            verbosity: 0,
        })
    }

    pub fn with_verbosity(mut self, verbosity: i32) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn from_config(config: &PluginConfig) -> Result<Self, PluginError> {
        Ok(Self::new(config.name.clone(), config.params()?)?.with_verbosity(config.verbosity))
    }
}

impl TauBuilder for LeadingChargedBuilder {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(
        &self,
        seed: &Seed,
        charged: &[ChargedHadron],
        pi_zeros: &[PiZero],
        regional_extras: &[ConstituentRef],
    ) -> Result<Vec<Tau>, PluginError> {
        let Some(&lead_index) = pt_ordered(charged, |h| h.p4.pt()).first() else {
            return Ok(Vec::new());
        };
        let lead = &charged[lead_index];
        if lead.p4.pt() < self.params.min_lead_pt {
            if self.verbosity > 0 {
                debug!(
                    "{}: seed {} lead pt {:.3} below {:.3}",
                    self.name,
                    seed.key,
                    lead.p4.pt(),
                    self.params.min_lead_pt
                );
            }
            return Ok(Vec::new());
        }

        let mut tau = Tau::new(lead.p4, lead.charge);
        tau.signal_charged.push(lead.clone());

        for (i, hadron) in charged.iter().enumerate() {
            if i != lead_index && hadron.p4.delta_r(&lead.p4) < self.params.isolation_cone {
                tau.isolation_charged.push(hadron.clone());
            }
        }

        for pi_zero in pi_zeros {
            let dr = pi_zero.p4.delta_r(&lead.p4);
            if dr < self.params.signal_cone {
                tau.p4 += pi_zero.p4;
                tau.signal_pi_zeros.push(pi_zero.clone());
            } else if dr < self.params.isolation_cone {
                tau.isolation_pi_zeros.push(pi_zero.clone());
            }
        }

        tau.decay_mode = DecayMode::from_counts(1, tau.signal_pi_zeros.len());
        tau.isolation_extras = regional_extras.to_vec();

        let seed_pt = seed.pt();
        if seed_pt > 0.0 {
            tau.discriminant = lead.p4.pt() / seed_pt;
        }

        Ok(vec![tau])
    }
}
