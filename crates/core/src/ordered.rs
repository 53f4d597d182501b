//! De-duplicating, double-ended ordered list shared by every registry.
//!
//! Re-adding an identity that is already present moves it to the requested
//! end instead of duplicating it:
//!
//! ```text
//! append(A) append(B) push(C)   ->  [C, A, B]
//! append(A) append(B) append(A) ->  [B, A]
//! ```

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// An element with a de-duplication identity.
pub trait Identified {
    type Key: Eq + Hash + Clone;

    fn identity(&self) -> Self::Key;
}

impl Identified for String {
    type Key = String;

    fn identity(&self) -> String {
        self.clone()
    }
}

/// Which end of the list an insertion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Front,
    Back,
}

/// Ordered list holding each identity at most once.
#[derive(Debug, Clone)]
pub struct OrderedAssetList<T: Identified> {
    items: VecDeque<T>,
}

impl<T: Identified> Default for OrderedAssetList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identified> OrderedAssetList<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Insert at position 0, removing any earlier occurrence first.
    pub fn push_front(&mut self, item: T) {
        self.remove(&item.identity());
        self.items.push_front(item);
    }

    /// Insert at the end, removing any earlier occurrence first.
    pub fn append_back(&mut self, item: T) {
        self.remove(&item.identity());
        self.items.push_back(item);
    }

    pub fn insert(&mut self, item: T, end: End) {
        match end {
            End::Front => self.push_front(item),
            End::Back => self.append_back(item),
        }
    }

    /// Insert a whole batch at one end, keeping the batch's own order.
    ///
    /// Importing `[a, b, c]` at the front yields `[a, b, c, ..existing]`.
    /// A duplicate inside the batch keeps its last position, matching what
    /// the equivalent sequence of `append_back` calls would produce.
    pub fn import_list(&mut self, items: impl IntoIterator<Item = T>, end: End) {
        let mut batch: Vec<T> = items.into_iter().collect();
        let mut seen = HashSet::new();
        batch.reverse();
        batch.retain(|item| seen.insert(item.identity()));
        batch.reverse();

        self.items.retain(|item| !seen.contains(&item.identity()));
        match end {
            End::Front => {
                for item in batch.into_iter().rev() {
                    self.items.push_front(item);
                }
            }
            End::Back => self.items.extend(batch),
        }
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.items.iter().any(|item| &item.identity() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn remove(&mut self, key: &T::Key) {
        if let Some(pos) = self.items.iter().position(|item| &item.identity() == key) {
            self.items.remove(pos);
            tracing::trace!(position = pos, "Moved existing asset entry");
        }
    }
}

impl<T: Identified + Clone> OrderedAssetList<T> {
    /// Snapshot of the current order.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
