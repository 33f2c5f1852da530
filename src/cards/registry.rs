//! Card and skill registry.
//!
//! Content is registered in named [`Package`]s. Installing a package checks
//! that none of its card or skill names collide with anything already
//! installed, then assigns sequential [`CardId`]s to its physical cards.
//! Installation is all-or-nothing: a rejected package leaves the registry
//! unchanged.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use super::definition::{CardDefinition, CardId, Suit};
use super::instance::Card;
use crate::triggers::{Skill, SkillKind, ViewAsSkill};

/// Registration failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("package '{0}' is already installed")]
    DuplicatePackage(String),

    #[error("{namespace} name '{name}' is already registered")]
    DuplicateName { namespace: &'static str, name: String },

    #[error("package '{package}' lists a card of unknown definition '{name}'")]
    UnknownDefinition { package: String, name: String },
}

/// A named bundle of card definitions, physical cards, and skills.
///
/// ```
/// use std::sync::Arc;
/// use rust_sgs::cards::{CardDefinition, CardRegistry, CardType, Package, PlainBehavior, Suit};
///
/// let package = Package::new("horses")
///     .with_definition(CardDefinition::new("dilu", "DefensiveHorse", CardType::DefensiveHorse, Arc::new(PlainBehavior)))
///     .with_card("dilu", Suit::Club, 5);
///
/// let mut registry = CardRegistry::new();
/// registry.install(package).unwrap();
/// assert_eq!(registry.cards().len(), 1);
/// ```
#[derive(Default)]
pub struct Package {
    pub name: String,
    definitions: Vec<CardDefinition>,
    cards: Vec<(String, Suit, u8)>,
    skills: Vec<Arc<dyn Skill>>,
    view_as: Vec<Arc<dyn ViewAsSkill>>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_definition(mut self, definition: CardDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Add a physical card of a definition from this or an earlier package.
    #[must_use]
    pub fn with_card(mut self, definition: impl Into<String>, suit: Suit, rank: u8) -> Self {
        self.cards.push((definition.into(), suit, rank));
        self
    }

    /// Add a standalone trigger skill. Rule skills are attached globally by
    /// every room; other kinds are acquired by players by name.
    #[must_use]
    pub fn with_skill(mut self, skill: Arc<dyn Skill>) -> Self {
        self.skills.push(skill);
        self
    }

    #[must_use]
    pub fn with_view_as(mut self, skill: Arc<dyn ViewAsSkill>) -> Self {
        self.view_as.push(skill);
        self
    }
}

/// Registry of everything installed packages declare.
#[derive(Default)]
pub struct CardRegistry {
    packages: Vec<String>,
    definitions: FxHashMap<String, Arc<CardDefinition>>,
    skills: FxHashMap<String, Arc<dyn Skill>>,
    skill_order: Vec<Arc<dyn Skill>>,
    view_as: FxHashMap<String, Arc<dyn ViewAsSkill>>,
    cards: Vec<Card>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a package.
    pub fn install(&mut self, package: Package) -> Result<(), RegistryError> {
        if self.packages.contains(&package.name) {
            return Err(RegistryError::DuplicatePackage(package.name));
        }

        let mut def_names = FxHashSet::default();
        let mut skill_names: FxHashMap<String, Arc<dyn Skill>> = FxHashMap::default();
        let mut view_names: FxHashMap<String, Arc<dyn ViewAsSkill>> = FxHashMap::default();

        for def in &package.definitions {
            if self.definitions.contains_key(&def.name) || !def_names.insert(def.name.clone()) {
                return Err(duplicate("card", &def.name));
            }
        }

        // One skill instance may back several definitions (two copies of a
        // weapon); only distinct instances under one name collide.
        let embedded_skills = package.definitions.iter().filter_map(|d| d.skill.as_ref());
        for skill in package.skills.iter().chain(embedded_skills) {
            let fresh = match skill_names.get(skill.name()) {
                Some(seen) => Arc::ptr_eq(seen, skill),
                None => !self.skills.contains_key(skill.name()),
            };
            if !fresh {
                return Err(duplicate("skill", skill.name()));
            }
            skill_names.insert(skill.name().to_string(), skill.clone());
        }

        let embedded_views = package.definitions.iter().filter_map(|d| d.view_as.as_ref());
        for view in package.view_as.iter().chain(embedded_views) {
            let fresh = match view_names.get(view.name()) {
                Some(seen) => Arc::ptr_eq(seen, view),
                None => !self.view_as.contains_key(view.name()),
            };
            if !fresh {
                return Err(duplicate("view-as skill", view.name()));
            }
            view_names.insert(view.name().to_string(), view.clone());
        }

        for (name, _, _) in &package.cards {
            if !def_names.contains(name.as_str()) && !self.definitions.contains_key(name) {
                return Err(RegistryError::UnknownDefinition {
                    package: package.name.clone(),
                    name: name.clone(),
                });
            }
        }

        let Package {
            name,
            definitions,
            cards,
            skills,
            view_as,
        } = package;

        for def in definitions {
            if let Some(skill) = &def.skill {
                self.insert_skill(skill.clone());
            }
            if let Some(view) = &def.view_as {
                self.view_as.entry(view.name().to_string()).or_insert_with(|| view.clone());
            }
            self.definitions.insert(def.name.clone(), Arc::new(def));
        }
        for skill in skills {
            self.insert_skill(skill);
        }
        for view in view_as {
            self.view_as.insert(view.name().to_string(), view);
        }
        for (def_name, suit, rank) in cards {
            if let Some(def) = self.definitions.get(&def_name) {
                let id = CardId::new(self.cards.len() as u32);
                self.cards.push(Card::physical(id, def.clone(), suit, rank));
            }
        }

        tracing::debug!(package = %name, cards = self.cards.len(), "installed package");
        self.packages.push(name);
        Ok(())
    }

    fn insert_skill(&mut self, skill: Arc<dyn Skill>) {
        if self.skills.contains_key(skill.name()) {
            return;
        }
        self.skills.insert(skill.name().to_string(), skill.clone());
        self.skill_order.push(skill);
    }

    /// Look up a definition by name.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&Arc<CardDefinition>> {
        self.definitions.get(name)
    }

    /// Look up a trigger skill by name.
    #[must_use]
    pub fn skill(&self, name: &str) -> Option<&Arc<dyn Skill>> {
        self.skills.get(name)
    }

    /// Look up a view-as skill by name.
    #[must_use]
    pub fn view_as_skill(&self, name: &str) -> Option<&Arc<dyn ViewAsSkill>> {
        self.view_as.get(name)
    }

    /// Rule skills in installation order.
    pub fn rule_skills(&self) -> impl Iterator<Item = &Arc<dyn Skill>> {
        self.skill_order.iter().filter(|s| s.kind() == SkillKind::Rule)
    }

    /// Physical cards, indexed by their id.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Installed package names in order.
    #[must_use]
    pub fn packages(&self) -> &[String] {
        &self.packages
    }
}

fn duplicate(namespace: &'static str, name: &str) -> RegistryError {
    RegistryError::DuplicateName {
        namespace,
        name: name.to_string(),
    }
}
