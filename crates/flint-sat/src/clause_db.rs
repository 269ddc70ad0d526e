//! Clause storage
//!
//! The database is an arena: clauses are addressed by `ClauseRef` and slots
//! are never reused, so a reference stays valid for the lifetime of the
//! solver. Reduction tombstones a clause (and frees its literal storage)
//! instead of removing the slot; watcher lists and reason slots must be
//! purged before a clause is tombstoned.

use crate::clause::Clause;
use crate::watched::ClauseRef;

/// Arena of all clauses (original and learned) plus the learned registry
#[derive(Debug, Default)]
pub struct ClauseDb {
    clauses: Vec<Clause>,
    /// Learned clauses, in learning order; only these are eligible for
    /// removal during reduction.
    learned: Vec<ClauseRef>,
}

impl ClauseDb {
    /// Create an empty database
    pub fn new() -> Self {
        ClauseDb::default()
    }

    /// Create an empty database with room for `n` clauses
    pub fn with_capacity(n: usize) -> Self {
        ClauseDb {
            clauses: Vec::with_capacity(n),
            learned: Vec::new(),
        }
    }

    /// Store a clause and return its stable reference. Learned clauses are
    /// also recorded in the learned registry.
    pub fn add(&mut self, clause: Clause) -> ClauseRef {
        let cref = ClauseRef(self.clauses.len() as u32);
        let learned = clause.learned;
        self.clauses.push(clause);
        if learned {
            self.learned.push(cref);
        }
        cref
    }

    /// Get a clause
    #[inline]
    pub fn get(&self, cref: ClauseRef) -> &Clause {
        &self.clauses[cref.0 as usize]
    }

    /// Get a clause mutably
    #[inline]
    pub fn get_mut(&mut self, cref: ClauseRef) -> &mut Clause {
        &mut self.clauses[cref.0 as usize]
    }

    /// Total number of slots (including tombstones)
    #[inline]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Check if no clauses have been added
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// References of all learned clauses still in the registry
    #[inline]
    pub fn learned_refs(&self) -> &[ClauseRef] {
        &self.learned
    }

    /// Iterate over all clause references (including tombstones)
    pub fn refs(&self) -> impl Iterator<Item = ClauseRef> {
        (0..self.clauses.len() as u32).map(ClauseRef)
    }

    /// Tombstone a clause and free its literal storage. The clause must
    /// already be absent from every watcher list and reason slot.
    pub fn delete(&mut self, cref: ClauseRef) {
        let clause = &mut self.clauses[cref.0 as usize];
        debug_assert!(!clause.deleted);
        clause.deleted = true;
        clause.clear_literals();
    }

    /// Drop tombstoned entries from the learned registry
    pub fn compact_learned(&mut self) {
        let clauses = &self.clauses;
        self.learned.retain(|&r| !clauses[r.0 as usize].deleted);
    }

    /// Multiply every live learned clause's activity by `factor`
    pub fn decay_learned_activities(&mut self, factor: f64) {
        for i in 0..self.learned.len() {
            let clause = &mut self.clauses[self.learned[i].0 as usize];
            if !clause.deleted {
                clause.activity *= factor;
            }
        }
    }
}
