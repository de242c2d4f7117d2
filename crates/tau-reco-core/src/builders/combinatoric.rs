//! Combinatoric builder: one tau per combination of leading charged hadrons
//! and pi-zeros, for each configured decay mode

use super::pt_ordered;
use crate::error::PluginError;
use crate::event::{ChargedHadron, ConstituentRef, PiZero, Seed};
use crate::kinematics::P4;
use crate::plugin::{PluginConfig, TauBuilder};
use crate::tau::{DecayMode, Tau};
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_n_charged() -> usize {
    1
}

fn default_max_tracks() -> usize {
    6
}

/// One decay-mode hypothesis to enumerate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayModeConfig {
    #[serde(default = "default_n_charged", alias = "nCharged")]
    pub n_charged: usize,

    #[serde(default, alias = "nPiZeros")]
    pub n_pi_zeros: usize,

    /// Only the `max_tracks` highest-pt charged hadrons are combined
    #[serde(default = "default_max_tracks", alias = "maxTracks")]
    pub max_tracks: usize,

    /// Only the `max_pi_zeros` highest-pt pi-zeros are combined
    #[serde(default, alias = "maxPiZeros")]
    pub max_pi_zeros: usize,
}

impl Default for DecayModeConfig {
    fn default() -> Self {
        Self {
            n_charged: default_n_charged(),
            n_pi_zeros: 0,
            max_tracks: default_max_tracks(),
            max_pi_zeros: 0,
        }
    }
}

fn default_decay_modes() -> Vec<DecayModeConfig> {
    vec![DecayModeConfig::default()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinatoricParams {
    #[serde(default = "default_decay_modes", alias = "decayModes")]
    pub decay_modes: Vec<DecayModeConfig>,

    /// Drop combinations whose |charge| exceeds this
    #[serde(default)]
    pub max_abs_charge: Option<i32>,
}

impl Default for CombinatoricParams {
    fn default() -> Self {
        Self {
            decay_modes: default_decay_modes(),
            max_abs_charge: None,
        }
    }
}

pub struct CombinatoricBuilder {
    name: String,
    params: CombinatoricParams,
    verbosity: i32,
}

impl CombinatoricBuilder {
    pub fn new(name: impl Into<String>, params: CombinatoricParams) -> Result<Self, PluginError> {
        if let Some(mode) = params.decay_modes.iter().find(|m| m.n_charged == 0) {
            return Err(PluginError::InvalidParameter(format!(
                "decay mode needs at least one charged hadron: {:?}",
                mode
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

/// All k-subsets of `0..n` in lexicographic order
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k > n {
        return Vec::new();
    }
    let mut result = Vec::new();
    let mut current: Vec<usize> = (0..k).collect();
    loop {
        result.push(current.clone());

        // rightmost position that can still advance
        let Some(i) = (0..k).rev().find(|&i| current[i] != i + n - k) else {
            return result;
        };
        current[i] += 1;
        for j in i + 1..k {
            current[j] = current[j - 1] + 1;
        }
    }
}

impl TauBuilder for CombinatoricBuilder {
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
        let charged_order = pt_ordered(charged, |h| h.p4.pt());
        let pi_zero_order = pt_ordered(pi_zeros, |p| p.p4.pt());
        let mut taus = Vec::new();

        for mode in &self.params.decay_modes {
            let tracks = &charged_order[..charged_order.len().min(mode.max_tracks)];
            let strips = &pi_zero_order[..pi_zero_order.len().min(mode.max_pi_zeros)];
            let pi_zero_combos = combinations(strips.len(), mode.n_pi_zeros);

            for track_combo in combinations(tracks.len(), mode.n_charged) {
                let chosen_charged: Vec<usize> = track_combo.iter().map(|&i| tracks[i]).collect();
                let charge: i32 = chosen_charged.iter().map(|&i| charged[i].charge).sum();
                if self
                    .params
                    .max_abs_charge
                    .is_some_and(|max| charge.abs() > max)
                {
                    continue;
                }

                for strip_combo in &pi_zero_combos {
                    let chosen_pi_zeros: Vec<usize> =
                        strip_combo.iter().map(|&i| strips[i]).collect();

                    let p4: P4 = chosen_charged
                        .iter()
                        .map(|&i| charged[i].p4)
                        .chain(chosen_pi_zeros.iter().map(|&i| pi_zeros[i].p4))
                        .sum();

                    let mut tau = Tau::new(p4, charge);
                    tau.decay_mode =
                        DecayMode::from_counts(chosen_charged.len(), chosen_pi_zeros.len());
                    tau.signal_charged = chosen_charged.iter().map(|&i| charged[i].clone()).collect();
                    tau.signal_pi_zeros =
                        chosen_pi_zeros.iter().map(|&i| pi_zeros[i].clone()).collect();
                    tau.isolation_charged = charged
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| !chosen_charged.contains(i))
                        .map(|(_, h)| h.clone())
                        .collect();
                    tau.isolation_pi_zeros = pi_zeros
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| !chosen_pi_zeros.contains(i))
                        .map(|(_, p)| p.clone())
                        .collect();
                    tau.isolation_extras = regional_extras.to_vec();

                    let seed_pt = seed.pt();
                    if seed_pt > 0.0 {
                        tau.set_aux("seed_pt_fraction", p4.pt() / seed_pt);
                    }
                    taus.push(tau);
                }
            }
        }

        if self.verbosity > 0 {
            debug!(
                "{}: seed {} gave {} combinations from {} charged, {} pi-zeros",
                self.name,
                seed.key,
                taus.len(),
                charged.len(),
                pi_zeros.len()
            );
        }
        Ok(taus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChargedHadronAlgo, PiZeroAlgo, RefKey};
    use crate::testing::capture_logs;
    use tracing::Level;

    fn hadron(pt: f64, phi: f64, charge: i32) -> ChargedHadron {
        ChargedHadron {
            p4: P4::from_pt_eta_phi_m(pt, 0.0, phi, 0.13957),
            charge,
            algo: ChargedHadronAlgo::ChargedPfCandidate,
            lead: None,
        }
    }

    fn pi_zero(pt: f64, phi: f64) -> PiZero {
        PiZero {
            p4: P4::from_pt_eta_phi_m(pt, 0.0, phi, 0.135),
            algo: PiZeroAlgo::Strips,
            constituents: Vec::new(),
        }
    }

    fn seed() -> Seed {
        Seed::new(
            RefKey::new(1, 0),
            P4::from_pt_eta_phi_m(30.0, 0.0, 0.0, 5.0),
            Vec::new(),
        )
    }

    #[test]
    fn test_combinations_lexicographic() {
        assert_eq!(
            combinations(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(combinations(3, 0), vec![Vec::<usize>::new()]);
        assert!(combinations(1, 2).is_empty());
    }

    #[test]
    fn test_default_one_prong_per_track() {
        let builder = CombinatoricBuilder::new("c", CombinatoricParams::default()).unwrap();
        let charged = vec![hadron(3.0, 0.1, 1), hadron(8.0, 0.0, -1)];
        let taus = builder.build(&seed(), &charged, &[], &[]).unwrap();

        assert_eq!(taus.len(), 2);
        // highest pt track first
        assert_eq!(taus[0].charge, -1);
        assert_eq!(taus[0].isolation_charged.len(), 1);
        assert_eq!(taus[0].decay_mode.code(), 0);
        assert_eq!(taus[1].charge, 1);
    }

    #[test]
    fn test_three_prong_with_charge_veto() {
        let params = CombinatoricParams {
            decay_modes: vec![DecayModeConfig {
                n_charged: 3,
                ..DecayModeConfig::default()
            }],
            max_abs_charge: Some(1),
        };
        let builder = CombinatoricBuilder::new("c", params).unwrap();
        let charged = vec![
            hadron(5.0, 0.0, 1),
            hadron(4.0, 0.05, 1),
            hadron(3.0, -0.05, -1),
            hadron(2.0, 0.02, 1),
        ];
        let taus = builder.build(&seed(), &charged, &[], &[]).unwrap();

        // 4 choose 3 = 4 combinations; only (+,+,+) is vetoed
        assert_eq!(taus.len(), 3);
        assert!(taus.iter().all(|t| t.charge.abs() == 1));
        assert!(taus.iter().all(|t| t.decay_mode.code() == 10));
    }

    #[test]
    fn test_pi_zero_combinations_respect_max() {
        let params = CombinatoricParams {
            decay_modes: vec![DecayModeConfig {
                n_charged: 1,
                n_pi_zeros: 1,
                max_tracks: 1,
                max_pi_zeros: 2,
            }],
            max_abs_charge: None,
        };
        let builder = CombinatoricBuilder::new("c", params).unwrap();
        let charged = vec![hadron(10.0, 0.0, 1)];
        let strips = vec![pi_zero(1.0, 0.1), pi_zero(6.0, 0.0), pi_zero(3.0, -0.1)];
        let extras = vec![RefKey::new(9, 2)];
        let taus = builder.build(&seed(), &charged, &strips, &extras).unwrap();

        assert_eq!(taus.len(), 2);
        assert_eq!(taus[0].signal_pi_zeros[0].p4.pt().round(), 6.0);
        assert_eq!(taus[1].signal_pi_zeros[0].p4.pt().round(), 3.0);
        assert_eq!(taus[0].isolation_pi_zeros.len(), 2);
        assert_eq!(taus[0].isolation_extras, extras);
        assert_eq!(taus[0].decay_mode.code(), 1);
    }

    #[test]
    fn test_no_charged_hadrons_builds_nothing() {
        let builder = CombinatoricBuilder::new("c", CombinatoricParams::default()).unwrap();
        assert!(builder.build(&seed(), &[], &[pi_zero(5.0, 0.0)], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_zero_prong_mode_rejected() {
        let params = CombinatoricParams {
            decay_modes: vec![DecayModeConfig {
                n_charged: 0,
                ..DecayModeConfig::default()
            }],
            max_abs_charge: None,
        };
        assert!(matches!(
            CombinatoricBuilder::new("c", params),
            Err(PluginError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_params_from_yaml_with_camel_case_keys() {
        let yaml = "name: c\nplugin: combinatoric\ndecayModes:\n  - nCharged: 3\n    maxTracks: 6\n  - nCharged: 1\n    nPiZeros: 1\n    maxPiZeros: 2\n";
        let config: PluginConfig = serde_yaml::from_str(yaml).unwrap();
        let params: CombinatoricParams = config.params().unwrap();
        assert_eq!(params.decay_modes.len(), 2);
        assert_eq!(params.decay_modes[0].n_charged, 3);
        assert_eq!(params.decay_modes[1].max_pi_zeros, 2);
    }

    #[test]
    fn test_verbosity_read_from_plugin_config() {
        let charged = vec![hadron(6.0, 0.0, 1)];
        let run = |verbosity: i32| {
            let mut config = PluginConfig::new("combo", "combinatoric");
            config.verbosity = verbosity;
            let builder = CombinatoricBuilder::from_config(&config).unwrap();
            capture_logs(Level::DEBUG, || {
                assert_eq!(builder.build(&seed(), &charged, &[], &[]).unwrap().len(), 1);
            })
        };

        assert!(!run(0).contains("combo: seed 1:0"));
        assert!(run(2).contains("combo: seed 1:0 gave 1 combinations"));
    }
}
