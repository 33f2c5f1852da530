//! Zone system: where every card is.
//!
//! Zones are the draw pile, discard pile, table, and the per-player hand,
//! equipment area, and judging area. The [`ZoneManager`] guarantees each
//! card id is in exactly one place.

mod manager;

pub use manager::{Place, Zone, ZoneManager, ZonePosition};
