//! Per-event input data model: seeds, sub-constituent references, and
//! seed-keyed associations

use crate::config::InputTags;
use crate::context::{EventContext, EventId};
use crate::error::PipelineError;
use crate::kinematics::P4;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable reference key: product (collection) id plus index within it.
///
/// Ordering is `(product, index)`. Two references are equal only when they
/// point at the same object, regardless of what that object contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RefKey {
    pub product: u32,
    pub index: u32,
}

impl RefKey {
    pub fn new(product: u32, index: u32) -> Self {
        Self { product, index }
    }
}

impl fmt::Display for RefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.product, self.index)
    }
}

/// Identity of a seed jet
pub type SeedKey = RefKey;

/// Handle to a single particle-level object
pub type ConstituentRef = RefKey;

/// Jet-like object. Seeds and their regions share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    /// Reference key of this jet
    pub key: SeedKey,

    /// Four-momentum
    pub p4: P4,

    /// Owned sub-constituents, in whatever order the producer stored them
    #[serde(default)]
    pub daughters: Vec<ConstituentRef>,
}

impl Seed {
    pub fn new(key: SeedKey, p4: P4, daughters: Vec<ConstituentRef>) -> Self {
        Self { key, p4, daughters }
    }

    pub fn pt(&self) -> f64 {
        self.p4.pt()
    }

    pub fn eta(&self) -> f64 {
        self.p4.eta()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargedHadronAlgo {
    ChargedPfCandidate,
    Track,
    PfNeutralHadron,
}

/// Charged hadron candidate associated to a seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargedHadron {
    pub p4: P4,
    pub charge: i32,
    pub algo: ChargedHadronAlgo,

    /// Leading particle-flow candidate, if any
    #[serde(default)]
    pub lead: Option<ConstituentRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiZeroAlgo {
    Strips,
    StripsWithPhotons,
    Combinatoric,
}

/// Neutral pion (photon cluster) candidate associated to a seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiZero {
    pub p4: P4,
    pub algo: PiZeroAlgo,

    #[serde(default)]
    pub constituents: Vec<ConstituentRef>,
}

/// Seed-keyed association. Iteration is in key order.
///
/// Serialized as a list of `{seed, value}` entries. A later duplicate entry
/// replaces an earlier one.
#[derive(Debug, Clone, PartialEq)]
pub struct Association<V> {
    entries: BTreeMap<SeedKey, V>,
}

impl<V> Association<V> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, seed: SeedKey, value: V) -> Option<V> {
        self.entries.insert(seed, value)
    }

    pub fn get(&self, seed: &SeedKey) -> Option<&V> {
        self.entries.get(seed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeedKey, &V)> {
        self.entries.iter()
    }
}

impl<T> Association<Vec<T>> {
    /// Group for `seed`; empty when the association has no entry
    pub fn group(&self, seed: &SeedKey) -> &[T] {
        self.entries.get(seed).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl<V> Default for Association<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(SeedKey, V)> for Association<V> {
    fn from_iter<I: IntoIterator<Item = (SeedKey, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Serialize)]
struct EntryRef<'a, V> {
    seed: &'a SeedKey,
    value: &'a V,
}

#[derive(Deserialize)]
struct Entry<V> {
    seed: SeedKey,
    value: V,
}

impl<V: Serialize> Serialize for Association<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.entries
                .iter()
                .map(|(seed, value)| EntryRef { seed, value }),
        )
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Association<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<Entry<V>>::deserialize(deserializer)?;
        Ok(entries.into_iter().map(|e| (e.seed, e.value)).collect())
    }
}

/// Borrowed, read-only snapshot of everything the pipeline needs for one event
#[derive(Debug, Clone, Copy)]
pub struct EventInputs<'a> {
    /// Seed collection in input order
    pub seeds: &'a [Seed],

    /// One-to-one seed to region association
    pub regions: &'a Association<Seed>,

    /// Charged hadrons per seed
    pub charged_hadrons: &'a Association<Vec<ChargedHadron>>,

    /// Pi-zeros per seed
    pub pi_zeros: &'a Association<Vec<PiZero>>,
}

impl<'a> EventInputs<'a> {
    pub fn region(&self, seed: &SeedKey) -> Option<&'a Seed> {
        self.regions.get(seed)
    }

    pub fn charged_group(&self, seed: &SeedKey) -> &'a [ChargedHadron] {
        self.charged_hadrons.group(seed)
    }

    pub fn pi_zero_group(&self, seed: &SeedKey) -> &'a [PiZero] {
        self.pi_zeros.group(seed)
    }
}

/// Serialized event: named products, resolved against the configured input tags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub id: EventId,

    /// Auxiliary per-event scalars exposed through the event context
    #[serde(default)]
    pub values: BTreeMap<String, f64>,

    #[serde(default)]
    pub seeds: BTreeMap<String, Vec<Seed>>,

    #[serde(default)]
    pub regions: BTreeMap<String, Association<Seed>>,

    #[serde(default)]
    pub charged_hadrons: BTreeMap<String, Association<Vec<ChargedHadron>>>,

    #[serde(default)]
    pub pi_zeros: BTreeMap<String, Association<Vec<PiZero>>>,
}

impl EventRecord {
    /// Resolve the four input products named by `tags`
    pub fn inputs(&self, tags: &InputTags) -> Result<EventInputs<'_>, PipelineError> {
        Ok(EventInputs {
            seeds: lookup(&self.seeds, &tags.jet_src)?,
            regions: lookup(&self.regions, &tags.jet_region_src)?,
            charged_hadrons: lookup(&self.charged_hadrons, &tags.charged_hadron_src)?,
            pi_zeros: lookup(&self.pi_zeros, &tags.pi_zero_src)?,
        })
    }

    pub fn context(&self) -> EventContext {
        EventContext {
            id: self.id,
            values: self.values.clone(),
        }
    }
}

fn lookup<'a, T>(products: &'a BTreeMap<String, T>, tag: &str) -> Result<&'a T, PipelineError> {
    products
        .get(tag)
        .ok_or_else(|| PipelineError::MissingProduct {
            tag: tag.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_key_order_is_product_then_index() {
        let mut keys = vec![RefKey::new(2, 0), RefKey::new(1, 5), RefKey::new(1, 2)];
        keys.sort();
        assert_eq!(
            keys,
            vec![RefKey::new(1, 2), RefKey::new(1, 5), RefKey::new(2, 0)]
        );
    }

    #[test]
    fn test_missing_group_is_empty() {
        let assoc: Association<Vec<PiZero>> = Association::new();
        assert!(assoc.group(&RefKey::new(0, 0)).is_empty());
    }

    #[test]
    fn test_association_json_entries() {
        let json = r#"[
            {"seed": {"product": 1, "index": 0}, "value": [1, 2]},
            {"seed": {"product": 1, "index": 1}, "value": [3]}
        ]"#;
        let assoc: Association<Vec<u32>> = serde_json::from_str(json).unwrap();
        assert_eq!(assoc.len(), 2);
        assert_eq!(assoc.group(&RefKey::new(1, 1)), &[3]);

        let back = serde_json::to_value(&assoc).unwrap();
        assert_eq!(back[0]["value"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_record_missing_product() {
        let record = EventRecord::default();
        let err = record.inputs(&InputTags::default()).unwrap_err();
        match err {
            PipelineError::MissingProduct { tag } => assert_eq!(tag, "ak4PFJets"),
            other => panic!("Expected MissingProduct, got {:?}", other),
        }
    }
}
