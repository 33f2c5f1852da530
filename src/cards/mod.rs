//! Card system: definitions, runtime cards, patterns, behavior, registry.
//!
//! ## Key Types
//!
//! - `CardDefinition`: static data for one kind of card, plus its behavior
//! - `Card`: a physical card (definition + suit + rank + id) or a virtual
//!   card wrapping the physical cards it was built from
//! - `Capabilities`: tags rules check instead of card names
//! - `CardPattern`: response legality ("slash", "peach+analeptic", ".H")
//! - `CardBehavior`: the per-kind use/effect contract
//! - `CardRegistry`: packages of definitions, cards, and skills

pub mod behavior;
pub mod definition;
pub mod instance;
pub mod pattern;
pub mod registry;

pub use behavior::{CardBehavior, PlainBehavior};
pub use definition::{Capabilities, CardDefinition, CardId, CardType, Color, JudgeSpec, Nature, Suit};
pub use instance::Card;
pub use pattern::{CardPattern, JudgePattern, PatternError};
pub use registry::{CardRegistry, Package, RegistryError};
