//! Conflict analysis support (1UIP learning)
//!
//! The analyzer owns the reusable workspace for first-UIP resolution: a
//! `seen` bitset over literal indices that deduplicates the working clause
//! while the solver walks the trail backwards. The resolution loop itself
//! lives in the solver, which has the trail, reasons and levels at hand.

use crate::literal::Literal;

/// Result of conflict analysis
#[derive(Debug, Clone)]
pub struct ConflictResult {
    /// The learned clause; the asserting literal (UIP) is first
    pub literals: Vec<Literal>,
    /// The level to backjump to (highest level in the clause besides the
    /// UIP's, or 0 for a unit clause)
    pub backjump_level: usize,
}

/// Reusable workspace for conflict analysis
#[derive(Debug, Default)]
pub struct ConflictAnalyzer {
    /// Seen marks, indexed by literal index (positive and negative
    /// occurrences are tracked separately)
    seen: Vec<bool>,
}

impl ConflictAnalyzer {
    /// Create an analyzer for n variables
    pub fn new(num_vars: usize) -> Self {
        ConflictAnalyzer {
            seen: vec![false; num_vars * 2],
        }
    }

    /// Reset the workspace for a new conflict
    pub fn clear(&mut self) {
        for s in &mut self.seen {
            *s = false;
        }
    }

    /// Check if a literal has entered the working clause
    #[inline]
    pub fn is_seen(&self, lit: Literal) -> bool {
        self.seen[lit.index()]
    }

    /// Mark a literal as part of the working clause
    #[inline]
    pub fn mark_seen(&mut self, lit: Literal) {
        self.seen[lit.index()] = true;
    }

    /// Reorder a learned clause so the second literal sits at the backjump
    /// level.
    ///
    /// The first literal is the UIP. Watching a backjump-level literal next
    /// to it keeps the watches synchronized: whenever the UIP is unassigned
    /// by a later backjump, the second watch is unassigned with it, so the
    /// clause can never silently become unit behind the propagator's back.
    pub fn reorder_for_watches(literals: &mut [Literal], var_level: &[i32], backjump_level: i32) {
        if literals.len() < 2 {
            return;
        }
        if var_level[literals[1].variable().index()] == backjump_level {
            return;
        }
        for i in 2..literals.len() {
            if var_level[literals[i].variable().index()] == backjump_level {
                literals.swap(1, i);
                return;
            }
        }
    }
}
