//! Position translation between visible positions and the row store.
//!
//! Three coordinate spaces are involved:
//!
//! - **visible position**: index in the list the user sees, counting headers
//!   and shown children only
//! - **entry index**: index into the [`GroupEntry`] slice
//! - **flat position**: index into the row store
//!
//! Header entries always count as visible. Two sentinel positions exist on the
//! visible side and pass through unchanged or clamp instead of failing:
//!
//! - any negative visible position maps to itself ("before first")
//! - a visible position past the last visible entry maps to one past the last
//!   entry's flat position ("append")
//!
//! The reverse direction is only defined for visible entries; hidden
//! children have no visible position. Navigation therefore tracks the current
//! visible position itself instead of recomputing it.

use super::group_table::GroupEntry;

/// Number of entries that are headers or shown children.
pub fn visible_count(entries: &[GroupEntry]) -> usize {
    entries.iter().filter(|e| e.is_visible()).count()
}

/// Entry index of the `visible`-th visible entry.
///
/// Negative input is returned unchanged. Input past the last visible entry
/// returns `entries.len()`.
pub fn entry_index_for_visible(entries: &[GroupEntry], visible: isize) -> isize {
    let Ok(target) = usize::try_from(visible) else {
        return visible;
    };
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_visible())
        .nth(target)
        .map_or(entries.len(), |(index, _)| index) as isize
}

/// Flat row store position for a visible position.
///
/// Negative input is returned unchanged. On an empty table the input is
/// returned unchanged as well, so `0` maps onto the after-last sentinel of an
/// empty store. Input past the last visible entry returns one past the last
/// entry's flat position.
pub fn flat_position_for_visible(entries: &[GroupEntry], visible: isize) -> isize {
    if visible < 0 {
        return visible;
    }
    let Some(last) = entries.last() else {
        return visible;
    };
    let index = entry_index_for_visible(entries, visible) as usize;
    match entries.get(index) {
        Some(entry) => entry.flat_position() as isize,
        None => last.flat_position() as isize + 1,
    }
}

/// Visible position of the entry at `index`.
///
/// Returns `None` for hidden children and indices past the end.
pub fn visible_position_for_entry(entries: &[GroupEntry], index: usize) -> Option<usize> {
    let entry = entries.get(index)?;
    if !entry.is_visible() {
        return None;
    }
    Some(visible_count(&entries[..index]))
}
