use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hourly consultation slots offered every day, in calendar order.
pub const DAY_SLOTS: [&str; 10] = [
    "08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotSelectionError {
    #[error("unknown time slot: {0}")]
    UnknownSlot(String),
    #[error("time slot {0} is already booked")]
    AlreadyBooked(String),
    #[error("time slot {0} is not adjacent to the current selection")]
    NotAdjacent(String),
    #[error("time slot {0} is inside the selection; deselect from either end")]
    WouldSplit(String),
    #[error("time slot {0} is selected more than once")]
    Duplicate(String),
    #[error("at least one time slot is required")]
    Empty,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Available,
    Booked,
    Selected,
    /// Free, but not adjacent to the current selection.
    Blocked,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotView {
    pub slot: String,
    pub state: SlotState,
}

pub fn day_slots() -> Vec<String> {
    DAY_SLOTS.iter().map(|slot| slot.to_string()).collect()
}

pub fn slot_index(slot: &str) -> Option<usize> {
    DAY_SLOTS.iter().position(|candidate| *candidate == slot)
}

/// A free slot can be picked when nothing is selected yet or when it touches the selection.
pub fn is_selectable(slot: &str, selected: &[String], booked: &HashSet<String>) -> bool {
    let Some(index) = slot_index(slot) else {
        return false;
    };
    if booked.contains(slot) {
        return false;
    }
    if selected.is_empty() {
        return true;
    }

    selected
        .iter()
        .filter_map(|picked| slot_index(picked))
        .any(|picked| picked.abs_diff(index) == 1)
}

/// Client-side style selection state: a single contiguous block of slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotSelection {
    selected: Vec<String>,
}

impl SlotSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selects `slot` if allowed, or deselects it when it sits at either end of the block.
    pub fn toggle(&mut self, slot: &str, booked: &HashSet<String>) -> Result<(), SlotSelectionError> {
        let index = slot_index(slot).ok_or_else(|| SlotSelectionError::UnknownSlot(slot.into()))?;

        if let Some(position) = self.selected.iter().position(|picked| picked == slot) {
            let first = self.selected.first().and_then(|s| slot_index(s));
            let last = self.selected.last().and_then(|s| slot_index(s));
            if Some(index) != first && Some(index) != last {
                return Err(SlotSelectionError::WouldSplit(slot.into()));
            }
            self.selected.remove(position);
            return Ok(());
        }

        if booked.contains(slot) {
            return Err(SlotSelectionError::AlreadyBooked(slot.into()));
        }
        if !is_selectable(slot, &self.selected, booked) {
            return Err(SlotSelectionError::NotAdjacent(slot.into()));
        }

        self.selected.push(slot.to_string());
        self.selected.sort_by_key(|picked| slot_index(picked));
        Ok(())
    }
}

/// Re-validates a requested block before it is stored and returns it in calendar order.
pub fn validate_block(
    slots: &[String],
    booked: &HashSet<String>,
) -> Result<Vec<String>, SlotSelectionError> {
    if slots.is_empty() {
        return Err(SlotSelectionError::Empty);
    }

    let mut indexed = Vec::with_capacity(slots.len());
    let mut seen = HashSet::new();
    for slot in slots {
        let index =
            slot_index(slot).ok_or_else(|| SlotSelectionError::UnknownSlot(slot.clone()))?;
        if !seen.insert(index) {
            return Err(SlotSelectionError::Duplicate(slot.clone()));
        }
        if booked.contains(slot) {
            return Err(SlotSelectionError::AlreadyBooked(slot.clone()));
        }
        indexed.push(index);
    }
    indexed.sort_unstable();

    for pair in indexed.windows(2) {
        if pair[1] - pair[0] != 1 {
            return Err(SlotSelectionError::NotAdjacent(DAY_SLOTS[pair[1]].to_string()));
        }
    }

    Ok(indexed
        .into_iter()
        .map(|index| DAY_SLOTS[index].to_string())
        .collect())
}

pub fn slot_states(booked: &HashSet<String>, selected: &[String]) -> Vec<SlotView> {
    DAY_SLOTS
        .iter()
        .map(|slot| {
            let state = if booked.contains(*slot) {
                SlotState::Booked
            } else if selected.iter().any(|picked| picked == slot) {
                SlotState::Selected
            } else if is_selectable(slot, selected, booked) {
                SlotState::Available
            } else {
                SlotState::Blocked
            };
            SlotView {
                slot: slot.to_string(),
                state,
            }
        })
        .collect()
}

/// Human-readable range for a contiguous block, e.g. `09:00 - 11:00` for `["09:00", "10:00"]`.
pub fn block_label(slots: &[String]) -> Option<String> {
    let first = slots.first()?;
    let last = slots.last()?;
    let end_hour: u32 = last.get(0..2)?.parse().ok()?;
    Some(format!("{} - {:02}:00", first, end_hour + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(slots: &[&str]) -> Vec<String> {
        slots.iter().map(|s| s.to_string()).collect()
    }

    fn booked(slots: &[&str]) -> HashSet<String> {
        slots.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn neighbours_of_a_selected_slot_stay_selectable() {
        let none = HashSet::new();
        let selected = owned(&["09:00"]);

        assert!(is_selectable("08:00", &selected, &none));
        assert!(is_selectable("10:00", &selected, &none));
        assert!(!is_selectable("11:00", &selected, &none));
    }

    #[test]
    fn removing_the_only_neighbour_rejects_the_far_slot() {
        let none = HashSet::new();
        let mut selection = SlotSelection::new();

        selection.toggle("09:00", &none).unwrap();
        selection.toggle("10:00", &none).unwrap();
        selection.toggle("09:00", &none).unwrap();

        assert_eq!(selection.selected(), owned(&["10:00"]).as_slice());
        assert_eq!(
            selection.toggle("08:00", &none),
            Err(SlotSelectionError::NotAdjacent("08:00".into()))
        );
    }

    #[test]
    fn anything_free_is_selectable_when_nothing_is_selected() {
        let taken = booked(&["12:00"]);
        assert!(is_selectable("15:00", &[], &taken));
        assert!(!is_selectable("12:00", &[], &taken));
        assert!(!is_selectable("07:00", &[], &taken));
    }

    #[test]
    fn booked_slots_are_never_selectable() {
        let taken = booked(&["10:00"]);
        let mut selection = SlotSelection::new();
        selection.toggle("09:00", &taken).unwrap();

        assert_eq!(
            selection.toggle("10:00", &taken),
            Err(SlotSelectionError::AlreadyBooked("10:00".into()))
        );
    }

    #[test]
    fn interior_slot_cannot_be_deselected() {
        let none = HashSet::new();
        let mut selection = SlotSelection::new();
        for slot in ["09:00", "10:00", "11:00"] {
            selection.toggle(slot, &none).unwrap();
        }

        assert_eq!(
            selection.toggle("10:00", &none),
            Err(SlotSelectionError::WouldSplit("10:00".into()))
        );
        selection.toggle("11:00", &none).unwrap();
        assert_eq!(selection.selected(), owned(&["09:00", "10:00"]).as_slice());
    }

    #[test]
    fn block_validation_sorts_and_rejects_gaps() {
        let none = HashSet::new();
        assert_eq!(
            validate_block(&owned(&["10:00", "09:00"]), &none).unwrap(),
            owned(&["09:00", "10:00"])
        );
        assert_eq!(
            validate_block(&owned(&["09:00", "11:00"]), &none),
            Err(SlotSelectionError::NotAdjacent("11:00".into()))
        );
        assert_eq!(validate_block(&[], &none), Err(SlotSelectionError::Empty));
        assert_eq!(
            validate_block(&owned(&["09:00", "09:00"]), &none),
            Err(SlotSelectionError::Duplicate("09:00".into()))
        );
        assert_eq!(
            validate_block(&owned(&["09:30"]), &none),
            Err(SlotSelectionError::UnknownSlot("09:30".into()))
        );
    }

    #[test]
    fn block_validation_rejects_booked_slots() {
        let taken = booked(&["14:00"]);
        assert_eq!(
            validate_block(&owned(&["13:00", "14:00"]), &taken),
            Err(SlotSelectionError::AlreadyBooked("14:00".into()))
        );
    }

    #[test]
    fn slot_states_mark_every_slot() {
        let taken = booked(&["08:00"]);
        let states = slot_states(&taken, &owned(&["10:00"]));

        assert_eq!(states.len(), DAY_SLOTS.len());
        assert_eq!(states[0].state, SlotState::Booked);
        assert_eq!(states[1].state, SlotState::Available);
        assert_eq!(states[2].state, SlotState::Selected);
        assert_eq!(states[3].state, SlotState::Available);
        assert_eq!(states[4].state, SlotState::Blocked);
    }

    #[test]
    fn block_label_spans_to_the_end_of_the_last_hour() {
        assert_eq!(
            block_label(&owned(&["09:00", "10:00"])).as_deref(),
            Some("09:00 - 11:00")
        );
        assert_eq!(block_label(&[]), None);
    }
}
