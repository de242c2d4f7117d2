//! Plugins listing command

use anyhow::Result;
use tau_reco_core::Registry;

pub fn list_plugins() -> Result<()> {
    let registry = Registry::with_builtin_plugins()?;

    println!("Builders:");
    for name in registry.builder_names() {
        println!("  {}", name);
    }

    println!("\nModifiers:");
    for name in registry.modifier_names() {
        println!("  {}", name);
    }

    Ok(())
}
