//! Ordered tag-row editing shared by the create and edit forms.
//!
//! Rows keep display order through every operation. Out-of-range indices are
//! ignored rather than reported.

/// Inserts an empty row directly after `index`. An index past the end
/// appends, so an empty list can gain its first row with index 0.
pub fn insert_after<T: Default>(slots: &mut Vec<T>, index: usize) {
    let at = index.saturating_add(1).min(slots.len());
    slots.insert(at, T::default());
}

/// Removes the row at `index`. Returns whether a row was removed.
pub fn remove_at<T>(slots: &mut Vec<T>, index: usize) -> bool {
    if index < slots.len() {
        slots.remove(index);
        true
    } else {
        false
    }
}

/// Like [`remove_at`], but never drops the last remaining row.
pub fn remove_keeping_one<T>(slots: &mut Vec<T>, index: usize) -> bool {
    slots.len() > 1 && remove_at(slots, index)
}

pub fn set_name(slots: &mut [String], index: usize, value: &str) {
    if let Some(slot) = slots.get_mut(index) {
        *slot = value.to_string();
    }
}

/// Names that are sent to the backend: empty ones dropped, order kept.
pub fn non_empty(names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|name| !name.is_empty())
        .cloned()
        .collect()
}
