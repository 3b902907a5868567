//! Bounded indicator selection
//!
//! A selection holds at most [`MAX_SELECTED`] unique indicators of one
//! catalog. It only changes through [`IndicatorSelection::toggle`]: a toggle
//! removes a selected item (always allowed) or adds an unselected one while
//! there is room. Adding beyond the limit is silently rejected; the caller
//! is expected to render that item's control as disabled.

use crate::catalog::Indicator;
use serde::{Deserialize, Serialize};

/// Maximum number of indicators per catalog
pub const MAX_SELECTED: usize = 5;

/// Result of a single toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The selection was full; nothing changed
    Rejected,
}

/// Serialized as the plain list of selected ids; deserializing goes through
/// [`FromIterator`], so duplicates collapse and the limit still applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "Vec<I>",
    into = "Vec<I>",
    bound(serialize = "I: Serialize", deserialize = "I: Deserialize<'de>")
)]
pub struct IndicatorSelection<I: Indicator> {
    items: Vec<I>,
    limit: usize,
}

impl<I: Indicator> Default for IndicatorSelection<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Indicator> IndicatorSelection<I> {
    /// Empty selection with the standard limit
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(MAX_SELECTED),
            limit: MAX_SELECTED,
        }
    }

    /// Flip the membership of `item`, honouring the limit
    pub fn toggle(&mut self, item: I) -> ToggleOutcome {
        if let Some(pos) = self.items.iter().position(|&i| i == item) {
            self.items.remove(pos);
            return ToggleOutcome::Removed;
        }

        if self.items.len() >= self.limit {
            tracing::debug!(
                kind = I::KIND,
                indicator = item.id(),
                limit = self.limit,
                "selection full, ignoring add"
            );
            return ToggleOutcome::Rejected;
        }

        self.items.push(item);
        ToggleOutcome::Added
    }

    /// Add-only variant of [`toggle`](Self::toggle); an already selected item stays selected
    pub fn select(&mut self, item: I) -> ToggleOutcome {
        if self.contains(item) {
            return ToggleOutcome::Added;
        }
        self.toggle(item)
    }

    pub fn contains(&self, item: I) -> bool {
        self.items.contains(&item)
    }

    /// Whether the control for `item` should be usable
    pub fn is_enabled(&self, item: I) -> bool {
        self.contains(item) || self.items.len() < self.limit
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.items.len())
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Selected items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = I> + '_ {
        self.items.iter().copied()
    }

    pub fn as_slice(&self) -> &[I] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// "Selected n / k" hint shown under a catalog
    pub fn hint(&self) -> String {
        format!("Selected {} / {}", self.items.len(), self.limit)
    }
}

impl<I: Indicator> FromIterator<I> for IndicatorSelection<I> {
    /// Collect with [`select`](IndicatorSelection::select) semantics: duplicates
    /// collapse and anything past the limit is dropped.
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        let mut selection = Self::new();
        for item in iter {
            selection.select(item);
        }
        selection
    }
}

impl<I: Indicator> From<Vec<I>> for IndicatorSelection<I> {
    fn from(items: Vec<I>) -> Self {
        items.into_iter().collect()
    }
}

impl<I: Indicator> From<IndicatorSelection<I>> for Vec<I> {
    fn from(selection: IndicatorSelection<I>) -> Self {
        selection.items
    }
}
