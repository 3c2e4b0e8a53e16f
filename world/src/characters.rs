//! Character registry and selection bookkeeping.

use std::collections::BTreeMap;

use trio_tiles_core::{
    CellCoord, CharacterId, CharacterSnapshot, Color, MovementState, SlotId, WorldPoint,
};

/// Authoritative state of a single character.
#[derive(Clone, Debug)]
pub(crate) struct Character {
    pub(crate) id: CharacterId,
    pub(crate) color: Color,
    /// Last stable board cell; `None` while the character is off-grid.
    pub(crate) cell: Option<CellCoord>,
    pub(crate) position: WorldPoint,
    pub(crate) state: MovementState,
    pub(crate) slot: Option<SlotId>,
}

impl Character {
    pub(crate) fn snapshot(&self, selected: bool) -> CharacterSnapshot {
        CharacterSnapshot {
            id: self.id,
            color: self.color,
            cell: self.cell,
            position: self.position,
            state: self.state,
            slot: self.slot,
            selected,
        }
    }
}

/// Registry that stores characters, allocates identifiers and tracks the selection.
#[derive(Debug)]
pub(crate) struct CharacterRegistry {
    entries: BTreeMap<CharacterId, Character>,
    next_id: CharacterId,
    selected: Option<CharacterId>,
}

impl CharacterRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: CharacterId::new(0),
            selected: None,
        }
    }

    pub(crate) fn register(
        &mut self,
        color: Color,
        cell: CellCoord,
        position: WorldPoint,
    ) -> CharacterId {
        let id = self.next_id;
        self.next_id = CharacterId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            Character {
                id,
                color,
                cell: Some(cell),
                position,
                state: MovementState::Idle,
                slot: None,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: CharacterId) -> Option<&Character> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: CharacterId) -> Option<Character> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Character> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.entries.values_mut()
    }

    pub(crate) fn selected(&self) -> Option<CharacterId> {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: Option<CharacterId>) {
        self.selected = selected;
    }

    /// Drops every character and restarts identifier allocation.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_id = CharacterId::new(0);
        self.selected = None;
    }
}
