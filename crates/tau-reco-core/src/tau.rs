//! Tau candidate produced by builders and refined by modifiers

use crate::event::{ChargedHadron, ConstituentRef, PiZero, Seed, SeedKey};
use crate::kinematics::P4;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hadronic decay mode hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayMode {
    /// No charged hadron (null taus, unbuildable combinations)
    Null,

    /// One to three prongs with up to four counted pi-zeros
    Prongs { charged: u8, pi_zeros: u8 },

    /// More than three prongs
    Rare,
}

impl DecayMode {
    pub fn from_counts(n_charged: usize, n_pi_zeros: usize) -> Self {
        match n_charged {
            0 => DecayMode::Null,
            1..=3 => DecayMode::Prongs {
                charged: n_charged as u8,
                pi_zeros: n_pi_zeros.min(4) as u8,
            },
            _ => DecayMode::Rare,
        }
    }

    /// Numeric code: `5 * (charged - 1) + pi_zeros`, -1 for null, 15 for rare
    pub fn code(&self) -> i32 {
        match self {
            DecayMode::Null => -1,
            DecayMode::Prongs { charged, pi_zeros } => {
                5 * (i32::from(*charged) - 1) + i32::from(*pi_zeros)
            }
            DecayMode::Rare => 15,
        }
    }
}

/// Reconstructed tau candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tau {
    pub p4: P4,
    pub charge: i32,
    pub decay_mode: DecayMode,

    /// Builder-assigned discriminant. NaN marks a null tau and is
    /// serialized as `null`.
    #[serde(with = "nan_as_null")]
    pub discriminant: f64,

    pub signal_charged: Vec<ChargedHadron>,
    pub signal_pi_zeros: Vec<PiZero>,
    pub isolation_charged: Vec<ChargedHadron>,
    pub isolation_pi_zeros: Vec<PiZero>,

    /// Regional sub-constituents outside the seed jet
    pub isolation_extras: Vec<ConstituentRef>,

    /// Originating seed. Set by the pipeline for every emitted tau.
    pub seed: Option<SeedKey>,

    /// Auxiliary annotations written by builders and modifiers
    pub aux: BTreeMap<String, f64>,
}

mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

impl Tau {
    pub fn new(p4: P4, charge: i32) -> Self {
        Self {
            p4,
            charge,
            decay_mode: DecayMode::Null,
            discriminant: 0.0,
            signal_charged: Vec::new(),
            signal_pi_zeros: Vec::new(),
            isolation_charged: Vec::new(),
            isolation_pi_zeros: Vec::new(),
            isolation_extras: Vec::new(),
            seed: None,
            aux: BTreeMap::new(),
        }
    }

    /// Empty placeholder carrying only the seed four-momentum
    pub fn null(seed: &Seed) -> Self {
        let mut tau = Self::new(seed.p4, 0);
        tau.discriminant = f64::NAN;
        tau.seed = Some(seed.key);
        tau
    }

    pub fn is_null(&self) -> bool {
        self.discriminant.is_nan()
    }

    pub fn set_seed(&mut self, seed: SeedKey) {
        self.seed = Some(seed);
    }

    /// Highest-pt signal charged hadron; the first one wins ties
    pub fn lead_charged(&self) -> Option<&ChargedHadron> {
        self.signal_charged.iter().fold(None, |best, ch| match best {
            Some(b) if b.p4.pt() >= ch.p4.pt() => Some(b),
            _ => Some(ch),
        })
    }

    /// Particle-flow candidate of the leading charged hadron, if it has one
    pub fn lead_pf_candidate(&self) -> Option<ConstituentRef> {
        self.lead_charged().and_then(|h| h.lead)
    }

    pub fn has_substructure(&self) -> bool {
        !(self.signal_charged.is_empty()
            && self.signal_pi_zeros.is_empty()
            && self.isolation_charged.is_empty()
            && self.isolation_pi_zeros.is_empty()
            && self.isolation_extras.is_empty())
    }

    pub fn aux(&self, name: &str) -> Option<f64> {
        self.aux.get(name).copied()
    }

    pub fn set_aux(&mut self, name: impl Into<String>, value: f64) {
        self.aux.insert(name.into(), value);
    }
}
