//! Card content.
//!
//! Each submodule builds one [`Package`](crate::cards::Package). The engine
//! core knows nothing about any of these cards; they plug in through
//! [`CardBehavior`](crate::cards::CardBehavior) and
//! [`Skill`](crate::triggers::Skill) like third-party content would.
//!
//! - `standard`: basic cards, nullification, the two AOE tricks, the
//!   Qinggang sword and two horses
//! - `maneuvering`: nature slashes, analeptic, fire attack, iron chain,
//!   supply shortage, and the Fan, Guding blade, Vine, Silver lion and
//!   Hualiu equipment
//!
//! `maneuvering` reuses standard definitions (jink, peach, nullification),
//! so the packages are installed in that order.

pub mod maneuvering;
pub mod standard;

use crate::cards::{CardRegistry, RegistryError};

/// Build a registry with every bundled package installed.
pub fn bootstrap() -> Result<CardRegistry, RegistryError> {
    let mut registry = CardRegistry::new();
    registry.install(standard::package())?;
    registry.install(maneuvering::package())?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_installs_both_packages() {
        let registry = bootstrap().unwrap();
        assert_eq!(registry.packages(), &["standard".to_string(), "maneuvering".to_string()]);
        assert!(registry.definition("fire_slash").is_some());
        assert!(registry.skill("vine").is_some());
        assert!(registry.view_as_skill("fan").is_some());
    }

    #[test]
    fn test_bootstrap_twice_is_rejected() {
        let mut registry = bootstrap().unwrap();
        assert_eq!(
            registry.install(standard::package()),
            Err(RegistryError::DuplicatePackage("standard".to_string()))
        );
    }
}
