//! Built-in tau modifier plugins

pub mod isolation;
pub mod pileup;

use crate::error::RegistryError;
use crate::plugin::TauModifier;
use crate::registry::Registry;

pub use isolation::IsolationSumModifier;
pub use pileup::PileupCorrectionModifier;

/// Register every built-in modifier
pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_modifier("isolation_sum", |config| {
        let modifier: Box<dyn TauModifier> = Box::new(IsolationSumModifier::from_config(config)?);
        Ok(modifier)
    })?;
    registry.register_modifier("pileup_correction", |config| {
        let modifier: Box<dyn TauModifier> =
            Box::new(PileupCorrectionModifier::from_config(config)?);
        Ok(modifier)
    })?;
    Ok(())
}
