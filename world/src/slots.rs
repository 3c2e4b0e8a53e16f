//! Holding-slot allocation utilities.

use trio_tiles_core::{CharacterId, SlotId, WorldPoint};

/// Fixed off-grid position a selected character travels to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoldingSlot {
    position: WorldPoint,
    occupant: Option<CharacterId>,
}

impl HoldingSlot {
    /// World position of the slot.
    #[must_use]
    pub const fn position(&self) -> WorldPoint {
        self.position
    }

    /// Character currently holding the slot, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<CharacterId> {
        self.occupant
    }

    /// Reports whether a character holds the slot.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Ordered sequence of holding slots with first-fit allocation.
#[derive(Clone, Debug, Default)]
pub struct HoldingSlots {
    slots: Vec<HoldingSlot>,
}

impl HoldingSlots {
    /// Creates free slots at the provided positions, in allocation order.
    #[must_use]
    pub fn new(positions: &[WorldPoint]) -> Self {
        Self {
            slots: positions
                .iter()
                .map(|position| HoldingSlot {
                    position: *position,
                    occupant: None,
                })
                .collect(),
        }
    }

    /// Claims the first free slot for the character.
    ///
    /// Returns `None` without side effects when every slot is taken.
    pub fn assign(&mut self, character: CharacterId) -> Option<(SlotId, WorldPoint)> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| !slot.is_occupied())?;
        slot.occupant = Some(character);
        let id = SlotId::new(u32::try_from(index).ok()?);
        Some((id, slot.position))
    }

    /// Frees the slot and returns the character that held it.
    pub fn release(&mut self, slot: SlotId) -> Option<CharacterId> {
        self.slots
            .get_mut(usize::try_from(slot.get()).ok()?)
            .and_then(|slot| slot.occupant.take())
    }

    /// Frees every slot while keeping the configured positions.
    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            slot.occupant = None;
        }
    }

    /// Looks up a single slot.
    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&HoldingSlot> {
        self.slots.get(usize::try_from(slot.get()).ok()?)
    }

    /// Reports whether at least one slot is free.
    #[must_use]
    pub fn has_free_slot(&self) -> bool {
        self.slots.iter().any(|slot| !slot.is_occupied())
    }

    /// Iterates over the slots in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &HoldingSlot)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (SlotId::new(index as u32), slot))
    }

    /// Number of configured slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Reports whether no slots are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
