//! Pure reconciliation of a book's genre link set.
//!
//! # Responsibility
//! - Compute the exact add/remove operations turning a stored link set into
//!   a desired one, with no redundant writes.
//!
//! # Invariants
//! - Membership uses entity identity (id + name), never object identity.
//! - Performs no I/O; the book repository applies the returned operations.

use crate::model::genre::Genre;
use std::collections::BTreeSet;

/// Operations required to make a stored genre link set match a desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDelta {
    /// Genres to link: in the desired set but not currently stored.
    pub add: Vec<Genre>,
    /// Genres to unlink: currently stored but absent from the desired set.
    pub remove: Vec<Genre>,
}

impl LinkDelta {
    /// Diffs `current` against `desired`.
    ///
    /// Genres present in both sets produce no operation, so applying the
    /// delta twice in a row is a no-op the second time.
    pub fn between(current: &BTreeSet<Genre>, desired: &BTreeSet<Genre>) -> Self {
        Self {
            add: desired.difference(current).cloned().collect(),
            remove: current.difference(desired).cloned().collect(),
        }
    }

    /// True when the stored state already matches the desired state.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}
