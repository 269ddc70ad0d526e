//! 2-Watched Literal index

use crate::literal::Literal;

/// Index of a clause in the clause database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClauseRef(pub u32);

/// Watcher lists: for each literal, the clauses currently watching it
///
/// A clause of size >= 2 appears in exactly the two lists keyed by its
/// watched literals; a unit clause appears in exactly one. Within a list,
/// insertion order is preserved except at swap-remove points in the
/// propagator.
#[derive(Debug, Default)]
pub struct WatchedLists {
    watches: Vec<Vec<ClauseRef>>,
}

impl WatchedLists {
    /// Create new watcher lists for n variables
    pub fn new(num_vars: usize) -> Self {
        WatchedLists {
            watches: vec![Vec::new(); num_vars * 2],
        }
    }

    /// Add a watcher for a literal
    #[inline]
    pub fn add_watch(&mut self, lit: Literal, clause: ClauseRef) {
        self.watches[lit.index()].push(clause);
    }

    /// Get the watchers for a literal
    #[inline]
    pub fn watches(&self, lit: Literal) -> &[ClauseRef] {
        &self.watches[lit.index()]
    }

    /// Get the number of watchers for a literal
    #[inline]
    pub fn watch_count(&self, lit: Literal) -> usize {
        self.watches[lit.index()].len()
    }

    /// Get the watcher at a position in a literal's list
    #[inline]
    pub fn watch_at(&self, lit: Literal, idx: usize) -> ClauseRef {
        self.watches[lit.index()][idx]
    }

    /// Remove the watcher at a position by swapping in the last entry.
    ///
    /// The caller must not advance its list cursor afterwards: the slot now
    /// holds a clause that has not been visited yet.
    #[inline]
    pub fn swap_remove(&mut self, lit: Literal, idx: usize) -> ClauseRef {
        self.watches[lit.index()].swap_remove(idx)
    }

    /// Remove a specific clause from a literal's list, preserving the order
    /// of the remaining entries. Used when reduction purges a clause.
    pub fn remove_clause(&mut self, lit: Literal, clause: ClauseRef) {
        self.watches[lit.index()].retain(|&c| c != clause);
    }

    /// Count how many lists reference a clause (for invariant checks)
    #[cfg(test)]
    pub fn count_watches_for_clause(&self, clause: ClauseRef) -> usize {
        self.watches
            .iter()
            .map(|list| list.iter().filter(|&&c| c == clause).count())
            .sum()
    }
}
