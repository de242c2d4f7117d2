//! Producer configuration loaded from YAML

use crate::error::RegistryError;
use crate::plugin::PluginConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names of the four per-event input products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputTags {
    #[serde(default = "default_jet_src")]
    pub jet_src: String,

    #[serde(default = "default_jet_region_src")]
    pub jet_region_src: String,

    #[serde(default = "default_charged_hadron_src")]
    pub charged_hadron_src: String,

    #[serde(default = "default_pi_zero_src")]
    pub pi_zero_src: String,
}

impl Default for InputTags {
    fn default() -> Self {
        Self {
            jet_src: default_jet_src(),
            jet_region_src: default_jet_region_src(),
            charged_hadron_src: default_charged_hadron_src(),
            pi_zero_src: default_pi_zero_src(),
        }
    }
}

fn default_jet_src() -> String {
    "ak4PFJets".to_string()
}

fn default_jet_region_src() -> String {
    "recoTauAK4PFJets08Region".to_string()
}

fn default_charged_hadron_src() -> String {
    "ak4PFJetsRecoTauChargedHadrons".to_string()
}

fn default_pi_zero_src() -> String {
    "ak4PFJetsRecoTauPiZeros".to_string()
}

fn default_min_jet_pt() -> f64 {
    14.0
}

fn default_max_jet_abs_eta() -> f64 {
    2.5
}

/// Full configuration of one tau producer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerConfig {
    #[serde(flatten)]
    pub inputs: InputTags,

    /// Seeds at or below this pt (within tolerance) are skipped
    #[serde(default = "default_min_jet_pt")]
    pub min_jet_pt: f64,

    /// Seeds at or above this |eta| (within tolerance) are skipped
    #[serde(default = "default_max_jet_abs_eta")]
    pub max_jet_abs_eta: f64,

    /// Builders, run in this order for every seed
    #[serde(default)]
    pub builders: Vec<PluginConfig>,

    /// Modifiers, applied in this order to every output tau
    #[serde(default)]
    pub modifiers: Vec<PluginConfig>,

    /// Optional cut on built taus; absent or empty keeps everything
    #[serde(default)]
    pub output_selection: Option<String>,

    /// Emit a content-free tau for seeds that yield nothing
    #[serde(default)]
    pub build_null_taus: bool,

    #[serde(default)]
    pub verbosity: i32,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            inputs: InputTags::default(),
            min_jet_pt: default_min_jet_pt(),
            max_jet_abs_eta: default_max_jet_abs_eta(),
            builders: Vec::new(),
            modifiers: Vec::new(),
            output_selection: None,
            build_null_taus: false,
            verbosity: 0,
        }
    }
}

impl ProducerConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, RegistryError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Standard combinatoric producer: one-prong builder, isolation and
    /// pileup modifiers, and a leading-charged-hadron output selection
    pub fn combinatoric_reco_taus() -> Self {
        let builder = PluginConfig::new("combinatoric", "combinatoric");
        let isolation = PluginConfig::new("isolation", "isolation_sum");
        let pileup = PluginConfig::new("pileup", "pileup_correction");

        Self {
            builders: vec![builder],
            modifiers: vec![isolation, pileup],
            output_selection: Some("leadPFChargedHadrCand().isNonnull()".to_string()),
            ..Self::default()
        }
    }
}
