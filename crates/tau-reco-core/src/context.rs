//! Event-scoped context passed to every plugin `setup` call

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Run / luminosity-block / event triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct EventId {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,
}

impl EventId {
    pub fn new(run: u32, lumi: u32, event: u64) -> Self {
        Self { run, lumi, event }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.run, self.lumi, self.event)
    }
}

/// Context handed unchanged to every builder and modifier at the start of an event.
///
/// The pipeline never inspects it. Plugins read whatever auxiliary per-event
/// quantities they need (pileup density, vertex counts) from `values`.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    /// Event identifier
    pub id: EventId,

    /// Named per-event scalars
    pub values: BTreeMap<String, f64>,
}

impl EventContext {
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            values: BTreeMap::new(),
        }
    }

    /// Attach a named scalar
    pub fn with_value(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}
