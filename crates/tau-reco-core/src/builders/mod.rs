//! Built-in tau builder plugins

pub mod combinatoric;
pub mod leading_charged;

use crate::error::RegistryError;
use crate::plugin::TauBuilder;
use crate::registry::Registry;

pub use combinatoric::CombinatoricBuilder;
pub use leading_charged::LeadingChargedBuilder;

/// Register every built-in builder
pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_builder("combinatoric", |config| {
        let builder: Box<dyn TauBuilder> = Box::new(CombinatoricBuilder::from_config(config)?);
        Ok(builder)
    })?;
    registry.register_builder("leading_charged", |config| {
        let builder: Box<dyn TauBuilder> = Box::new(LeadingChargedBuilder::from_config(config)?);
        Ok(builder)
    })?;
    Ok(())
}

/// Indices of `items` ordered by descending pt; equal pt keeps input order
pub(crate) fn pt_ordered<T>(items: &[T], pt: impl Fn(&T) -> f64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| pt(&items[b]).total_cmp(&pt(&items[a])));
    order
}
