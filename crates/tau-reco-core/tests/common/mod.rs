//! Shared fixtures for pipeline integration tests
//!
//! Recording plugins append to a shared log so tests can assert on the exact
//! order of setup, build, apply, and end-of-event calls.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tau_reco_core::{
    Association, ChargedHadron, ChargedHadronAlgo, ConstituentRef, EventContext, P4, PiZero,
    PluginError, RefKey, Seed, Tau, TauBuilder, TauModifier,
};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Builder returning one tau per configured pt, tagged with its position
pub struct FixedBuilder {
    pub name: String,
    pub pts: Vec<f64>,
    pub log: CallLog,
    pub fail: bool,
}

impl FixedBuilder {
    pub fn boxed(name: &str, pts: &[f64], log: &CallLog) -> Box<dyn TauBuilder> {
        Box::new(Self {
            name: name.to_string(),
            pts: pts.to_vec(),
            log: Arc::clone(log),
            fail: false,
        })
    }
}

impl TauBuilder for FixedBuilder {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, _ctx: &EventContext) -> Result<(), PluginError> {
        self.log.lock().unwrap().push(format!("setup:{}", self.name));
        Ok(())
    }

    fn build(
        &self,
        seed: &Seed,
        charged: &[ChargedHadron],
        pi_zeros: &[PiZero],
        regional_extras: &[ConstituentRef],
    ) -> Result<Vec<Tau>, PluginError> {
        self.log.lock().unwrap().push(format!(
            "build:{}:{}:c{}:p{}:x{}",
            self.name,
            seed.key,
            charged.len(),
            pi_zeros.len(),
            regional_extras.len()
        ));
        if self.fail {
            return Err(PluginError::ExecutionFailed("boom".to_string()));
        }
        Ok(self
            .pts
            .iter()
            .enumerate()
            .map(|(i, &pt)| {
                let mut tau = Tau::new(P4::from_pt_eta_phi_m(pt, seed.eta(), 0.0, 1.0), 1);
                tau.signal_charged.push(hadron(pt));
                tau.set_aux("position", i as f64);
                tau
            })
            .collect())
    }
}

/// Modifier that logs each call and stamps its name into the tau
pub struct RecordingModifier {
    pub name: String,
    pub log: CallLog,
}

impl RecordingModifier {
    pub fn boxed(name: &str, log: &CallLog) -> Box<dyn TauModifier> {
        Box::new(Self {
            name: name.to_string(),
            log: Arc::clone(log),
        })
    }
}

impl TauModifier for RecordingModifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, _ctx: &EventContext) -> Result<(), PluginError> {
        self.log.lock().unwrap().push(format!("setup:{}", self.name));
        Ok(())
    }

    fn apply(&mut self, tau: &mut Tau) -> Result<(), PluginError> {
        let seen = tau.aux.len();
        self.log.lock().unwrap().push(format!(
            "apply:{}:{}:{:.1}",
            self.name,
            tau.seed.map(|k| k.to_string()).unwrap_or_default(),
            tau.p4.pt()
        ));
        tau.set_aux(format!("visited_by_{}", self.name), seen as f64);
        Ok(())
    }

    fn end_event(&mut self) -> Result<(), PluginError> {
        self.log.lock().unwrap().push(format!("end:{}", self.name));
        Ok(())
    }
}

pub fn hadron(pt: f64) -> ChargedHadron {
    ChargedHadron {
        p4: P4::from_pt_eta_phi_m(pt, 0.0, 0.0, 0.13957),
        charge: 1,
        algo: ChargedHadronAlgo::ChargedPfCandidate,
        lead: None,
    }
}

pub fn seed(index: u32, pt: f64, eta: f64, daughters: &[u32]) -> Seed {
    Seed::new(
        RefKey::new(1, index),
        P4::from_pt_eta_phi_m(pt, eta, 0.0, 2.0),
        daughters.iter().map(|&d| RefKey::new(10, d)).collect(),
    )
}

/// Regions that copy each seed's own daughters, plus `extra` more
pub fn regions_for(seeds: &[Seed], extra: &[u32]) -> Association<Seed> {
    seeds
        .iter()
        .map(|s| {
            let mut region = s.clone();
            region.key = RefKey::new(2, s.key.index);
            region
                .daughters
                .extend(extra.iter().map(|&d| RefKey::new(10, d)));
            (s.key, region)
        })
        .collect()
}
