pub mod runner;
pub mod variants;

use user_behavior::{DefinitionError, Registry};

/// Every definition this script offers, listed explicitly.
pub fn registry() -> Result<Registry, DefinitionError> {
    Ok(Registry::new()
        .register(variants::variant_a()?)
        .register(variants::variant_b()?))
}
