//! Trigger registry.
//!
//! Maps each [`TriggerEvent`] to the skills currently attached for it. The
//! room attaches skills when equipment is installed, when a player acquires
//! a skill, and for every rule skill at construction, and detaches them when
//! the equipment leaves or the player dies.
//!
//! ## Ordering
//!
//! Listeners for one event are kept sorted by priority (higher first), then
//! by attachment order. The order is fixed at attachment time, so a dispatch
//! always visits skills in the same sequence for the same attachments.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::cards::CardId;
use crate::core::PlayerId;

use super::event::TriggerEvent;
use super::skill::{Skill, ViewAsSkill};

/// Unique identifier of one attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u32);

impl ListenerId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

/// What keeps an attachment alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkillSource {
    /// Room rule; never detached.
    Global,
    /// Equipped card; detached when it leaves the equipment area.
    Equipment(CardId),
    /// Acquired by the player; detached on death.
    Player,
}

/// One attached trigger skill.
#[derive(Clone)]
pub struct Listener {
    pub id: ListenerId,
    pub skill: Arc<dyn Skill>,
    /// `None` for global skills, which run for whichever player the event
    /// is dispatched on.
    pub owner: Option<PlayerId>,
    pub source: SkillSource,
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("skill", &self.skill.name())
            .field("owner", &self.owner)
            .field("source", &self.source)
            .finish()
    }
}

/// One attached view-as skill.
#[derive(Clone)]
pub struct ViewAsEntry {
    pub skill: Arc<dyn ViewAsSkill>,
    pub owner: PlayerId,
    pub source: SkillSource,
}

/// Attachment table for trigger and view-as skills.
#[derive(Clone, Default)]
pub struct TriggerRegistry {
    listeners: FxHashMap<ListenerId, Listener>,
    by_event: FxHashMap<TriggerEvent, Vec<ListenerId>>,
    view_as: Vec<ViewAsEntry>,
    next_id: u32,
}

impl TriggerRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a skill for all of its events.
    pub fn attach(
        &mut self,
        skill: Arc<dyn Skill>,
        owner: Option<PlayerId>,
        source: SkillSource,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        for &event in skill.events() {
            let list = self.by_event.entry(event).or_default();
            list.push(id);
            // Stable: equal priorities keep attachment order.
            let listeners = &self.listeners;
            let priority_of = |lid: &ListenerId| {
                listeners.get(lid).map_or(skill.priority(), |l| l.skill.priority())
            };
            list.sort_by_key(|lid| std::cmp::Reverse(priority_of(lid)));
        }

        tracing::debug!(skill = skill.name(), ?owner, ?source, %id, "attached skill");
        self.listeners.insert(
            id,
            Listener {
                id,
                skill,
                owner,
                source,
            },
        );
        id
    }

    /// Detach one attachment.
    pub fn detach(&mut self, id: ListenerId) -> Option<Listener> {
        let listener = self.listeners.remove(&id)?;
        for event in listener.skill.events() {
            if let Some(list) = self.by_event.get_mut(event) {
                list.retain(|&lid| lid != id);
                if list.is_empty() {
                    self.by_event.remove(event);
                }
            }
        }
        tracing::debug!(skill = listener.skill.name(), %id, "detached skill");
        Some(listener)
    }

    /// Detach every trigger and view-as skill kept alive by `source` for
    /// `owner`. Returns the number of trigger skills removed.
    pub fn detach_source(&mut self, owner: PlayerId, source: SkillSource) -> usize {
        let ids: Vec<_> = self
            .listeners
            .values()
            .filter(|l| l.owner == Some(owner) && l.source == source)
            .map(|l| l.id)
            .collect();
        for &id in &ids {
            self.detach(id);
        }
        self.view_as.retain(|v| !(v.owner == owner && v.source == source));
        ids.len()
    }

    /// Detach everything a player owns.
    pub fn detach_player(&mut self, owner: PlayerId) {
        let ids: Vec<_> = self
            .listeners
            .values()
            .filter(|l| l.owner == Some(owner))
            .map(|l| l.id)
            .collect();
        for id in ids {
            self.detach(id);
        }
        self.view_as.retain(|v| v.owner != owner);
    }

    #[must_use]
    pub fn is_attached(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    /// Snapshot of the listeners that run when `event` is dispatched on
    /// `player`: that player's skills and global skills, in dispatch order.
    #[must_use]
    pub fn listeners(&self, event: TriggerEvent, player: PlayerId) -> Vec<Listener> {
        self.by_event
            .get(&event)
            .into_iter()
            .flatten()
            .filter_map(|id| self.listeners.get(id))
            .filter(|l| l.owner.is_none_or(|owner| owner == player))
            .cloned()
            .collect()
    }

    /// Trigger skills owned by a player, in attachment order.
    #[must_use]
    pub fn skills_of(&self, owner: PlayerId) -> Vec<Arc<dyn Skill>> {
        let mut owned: Vec<_> = self
            .listeners
            .values()
            .filter(|l| l.owner == Some(owner))
            .collect();
        owned.sort_by_key(|l| l.id);
        owned.into_iter().map(|l| l.skill.clone()).collect()
    }

    /// Whether a player owns a trigger skill of this name.
    #[must_use]
    pub fn has_skill(&self, owner: PlayerId, name: &str) -> bool {
        self.listeners
            .values()
            .any(|l| l.owner == Some(owner) && l.skill.name() == name)
    }

    pub fn attach_view_as(&mut self, skill: Arc<dyn ViewAsSkill>, owner: PlayerId, source: SkillSource) {
        tracing::debug!(skill = skill.name(), %owner, ?source, "attached view-as skill");
        self.view_as.push(ViewAsEntry { skill, owner, source });
    }

    /// A player's view-as skill by name.
    #[must_use]
    pub fn view_as_skill(&self, owner: PlayerId, name: &str) -> Option<Arc<dyn ViewAsSkill>> {
        self.view_as
            .iter()
            .find(|v| v.owner == owner && v.skill.name() == name)
            .map(|v| v.skill.clone())
    }

    /// Every view-as skill a player has, in attachment order.
    #[must_use]
    pub fn view_as_skills_of(&self, owner: PlayerId) -> Vec<Arc<dyn ViewAsSkill>> {
        self.view_as
            .iter()
            .filter(|v| v.owner == owner)
            .map(|v| v.skill.clone())
            .collect()
    }

    /// Number of trigger attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
