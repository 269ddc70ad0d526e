//! The CDCL search engine
//!
//! One `Solver` aggregate owns every piece of search state: the clause
//! arena, the watcher index, the assignment/level/reason arrays, the trail
//! with its propagation head, and the decision stack. The search loop is
//! the classic CDCL cycle: propagate to fixpoint, decide when stable,
//! analyze and backjump on conflict, with learned-clause reduction and
//! geometric restarts scheduled on conflict counts.

use crate::activity::VarActivities;
use crate::clause::Clause;
use crate::clause_db::ClauseDb;
use crate::conflict::{ConflictAnalyzer, ConflictResult};
use crate::literal::{Literal, Variable};
use crate::watched::{ClauseRef, WatchedLists};
use tracing::debug;

/// Amount added to a variable's activity when it enters a learned clause
const VAR_ACTIVITY_INC: f64 = 1.0;

/// Factor applied to every variable activity after each conflict
const VAR_ACTIVITY_DECAY: f64 = 0.95;

/// Amount added to a clause's activity when it takes part in a conflict
const CLAUSE_ACTIVITY_INC: f64 = 1.0;

/// Factor applied to every learned clause's activity after each conflict
const CLAUSE_ACTIVITY_DECAY: f64 = 0.95;

/// Conflicts allowed before the first restart
const INITIAL_MAX_CONFLICTS: f64 = 100.0;

/// Growth factor for the restart schedule
const RESTART_GROWTH: f64 = 1.5;

/// Learned-clause database reduction runs every this many conflicts
const REDUCE_INTERVAL: u64 = 3000;

/// Result of solving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    /// Satisfiable, with a model indexed by variable
    Sat(Vec<bool>),
    /// Unsatisfiable
    Unsat,
}

/// Search statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// Number of decisions made
    pub decisions: u64,
    /// Number of trail literals propagated
    pub propagations: u64,
    /// Number of conflicts analyzed
    pub conflicts: u64,
    /// Number of clauses learned
    pub learned_clauses: u64,
    /// Number of learned clauses deleted by reduction
    pub deleted_clauses: u64,
    /// Number of restarts performed
    pub restarts: u64,
}

/// The CDCL SAT solver
pub struct Solver {
    /// Number of variables
    num_vars: usize,
    /// Clause arena plus the learned-clause registry
    clause_db: ClauseDb,
    /// Watcher lists indexed by literal
    watches: WatchedLists,
    /// Variable activity scores
    activities: VarActivities,
    /// Conflict analysis workspace
    analyzer: ConflictAnalyzer,
    /// Current assignment (None = unassigned)
    assignment: Vec<Option<bool>>,
    /// Last value assigned to each variable; survives unassignment and
    /// steers decision polarity (phase saving). Starts all-false.
    saved_phase: Vec<bool>,
    /// Decision level each variable was assigned at (-1 = unassigned)
    var_level: Vec<i32>,
    /// Clause that forced each variable (None for decisions and root facts)
    reason: Vec<Option<ClauseRef>>,
    /// Assigned literals in chronological order
    trail: Vec<Literal>,
    /// Count of trail entries already propagated; the suffix is the queue
    trail_head: usize,
    /// Trail index where each decision level begins; entry 0 is always 0
    level_start: Vec<usize>,
    /// Number of assigned variables
    assigned_vars: usize,
    /// Conflict threshold for the next restart
    restart_limit: f64,
    /// Latched when ingest discovers a trivially unsatisfiable formula
    unsat: bool,
    /// Scratch bitset for ingest-time literal deduplication
    ingest_seen: Vec<bool>,
    /// Search statistics
    stats: SolverStats,
}

impl Solver {
    /// Create a solver for n variables with no clauses
    pub fn new(num_vars: usize) -> Self {
        Solver {
            num_vars,
            clause_db: ClauseDb::with_capacity(num_vars * 4),
            watches: WatchedLists::new(num_vars),
            activities: VarActivities::new(num_vars),
            analyzer: ConflictAnalyzer::new(num_vars),
            assignment: vec![None; num_vars],
            saved_phase: vec![false; num_vars],
            var_level: vec![-1; num_vars],
            reason: vec![None; num_vars],
            trail: Vec::with_capacity(num_vars),
            trail_head: 0,
            level_start: vec![0],
            assigned_vars: 0,
            restart_limit: INITIAL_MAX_CONFLICTS,
            unsat: false,
            ingest_seen: vec![false; num_vars * 2],
            stats: SolverStats::default(),
        }
    }

    /// Number of variables
    #[inline]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Current value of a variable
    #[inline]
    pub fn value(&self, var: Variable) -> Option<bool> {
        self.assignment[var.index()]
    }

    /// Search statistics so far
    #[inline]
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// Snapshot of the live learned clauses
    pub fn get_learned_clauses(&self) -> Vec<Vec<Literal>> {
        self.clause_db
            .learned_refs()
            .iter()
            .map(|&r| self.clause_db.get(r))
            .filter(|c| !c.deleted)
            .map(|c| c.literals.to_vec())
            .collect()
    }

    /// Add a clause before solving.
    ///
    /// Duplicate literals are dropped; a tautological clause (containing a
    /// literal and its negation) is dropped entirely. A unit clause becomes
    /// a root-level fact immediately. Returns `false` when the clause makes
    /// the formula trivially unsatisfiable (an empty clause, or a unit fact
    /// contradicting an earlier one); the verdict is latched and `solve`
    /// will report UNSATISFIABLE.
    pub fn add_clause(&mut self, literals: Vec<Literal>) -> bool {
        let mut kept: Vec<Literal> = Vec::with_capacity(literals.len());
        let mut tautology = false;
        for &lit in &literals {
            debug_assert!(lit.variable().index() < self.num_vars);
            if self.ingest_seen[lit.index()] {
                continue;
            }
            if self.ingest_seen[lit.negated().index()] {
                tautology = true;
            }
            self.ingest_seen[lit.index()] = true;
            kept.push(lit);
        }
        for &lit in &kept {
            self.ingest_seen[lit.index()] = false;
        }

        if tautology {
            return true;
        }
        if kept.is_empty() {
            self.unsat = true;
            return false;
        }

        if kept.len() == 1 {
            let lit = kept[0];
            let cref = self.clause_db.add(Clause::new(kept, false));
            self.watches.add_watch(lit, cref);
            return match self.lit_value(lit) {
                None => {
                    self.enqueue(lit, None);
                    true
                }
                Some(true) => true,
                Some(false) => {
                    self.unsat = true;
                    false
                }
            };
        }

        let clause = Clause::new(kept, false);
        let (lit0, lit1) = (clause.lit(0), clause.lit(1));
        let cref = self.clause_db.add(clause);
        self.watches.add_watch(lit0, cref);
        self.watches.add_watch(lit1, cref);
        true
    }

    /// Run the CDCL search to a verdict
    pub fn solve(&mut self) -> SolveResult {
        if self.unsat {
            return SolveResult::Unsat;
        }

        loop {
            if let Some(conflict) = self.propagate() {
                if self.current_level() == 0 {
                    return SolveResult::Unsat;
                }
                let result = self.analyze(conflict);
                self.backjump(result);
            } else if self.assigned_vars == self.num_vars {
                return SolveResult::Sat(self.model());
            } else {
                self.decide();
            }
        }
    }

    /// Current decision level (0 = root)
    #[inline]
    fn current_level(&self) -> usize {
        self.level_start.len() - 1
    }

    /// Value of a literal under the current assignment
    #[inline]
    fn lit_value(&self, lit: Literal) -> Option<bool> {
        self.assignment[lit.variable().index()].map(|v| v == lit.is_positive())
    }

    /// Assign a literal, push it on the trail, and record its reason.
    /// The decision level is the current one.
    fn enqueue(&mut self, lit: Literal, reason: Option<ClauseRef>) {
        let idx = lit.variable().index();
        debug_assert!(self.assignment[idx].is_none());
        let value = lit.is_positive();
        self.assignment[idx] = Some(value);
        self.saved_phase[idx] = value;
        self.var_level[idx] = self.current_level() as i32;
        self.reason[idx] = reason;
        self.trail.push(lit);
        self.assigned_vars += 1;
    }

    /// Propagate the trail suffix to fixpoint.
    ///
    /// Returns the conflicting clause if one becomes all-false, otherwise
    /// `None` with every watched clause either satisfied or holding two
    /// non-false watches.
    fn propagate(&mut self) -> Option<ClauseRef> {
        while self.trail_head < self.trail.len() {
            let lit = self.trail[self.trail_head];
            self.stats.propagations += 1;
            debug!("propagating {}", lit);

            // This assignment falsified -lit; every clause watching it must
            // be revisited.
            let false_lit = lit.negated();

            let mut i = 0;
            while i < self.watches.watch_count(false_lit) {
                let cref = self.watches.watch_at(false_lit, i);
                let clause = self.clause_db.get(cref);
                debug_assert!(
                    clause.lit(clause.watch1) == false_lit
                        || clause.lit(clause.watch2) == false_lit
                );

                let other = if clause.lit(clause.watch1) == false_lit {
                    clause.lit(clause.watch2)
                } else {
                    clause.lit(clause.watch1)
                };
                if self.lit_value(other) == Some(true) {
                    // Satisfied; the watches must not move while `other`
                    // stays true.
                    i += 1;
                    continue;
                }

                let watch_lit1 = clause.lit(clause.watch1);
                let watch_lit2 = clause.lit(clause.watch2);
                let replacement = (0..clause.len()).find_map(|j| {
                    let cand = clause.lit(j);
                    if cand == watch_lit1 || cand == watch_lit2 {
                        return None;
                    }
                    (self.lit_value(cand) != Some(false)).then_some((j, cand))
                });

                if let Some((j, cand)) = replacement {
                    let clause = self.clause_db.get_mut(cref);
                    if clause.lit(clause.watch1) == false_lit {
                        clause.watch1 = j;
                    } else {
                        clause.watch2 = j;
                    }
                    // Swap-remove fills slot i with an unvisited clause, so
                    // the cursor stays put.
                    self.watches.swap_remove(false_lit, i);
                    self.watches.add_watch(cand, cref);
                    continue;
                }

                if self.lit_value(other) == Some(false) {
                    debug!(
                        "conflict in clause {:?}",
                        self.dimacs_clause(cref)
                    );
                    return Some(cref);
                }

                // All literals but `other` are false: unit implication.
                self.enqueue(other, Some(cref));
                debug!("assigning {} from clause {:?}", other, self.dimacs_clause(cref));
                i += 1;
            }

            self.trail_head += 1;
        }
        None
    }

    /// Open a new decision level and assign the highest-activity unassigned
    /// variable, with its saved phase as polarity.
    fn decide(&mut self) {
        let var = self
            .activities
            .pick_unassigned(&self.assignment)
            .expect("decide requires an unassigned variable");
        let lit = if self.saved_phase[var.index()] {
            Literal::positive(var)
        } else {
            Literal::negative(var)
        };
        self.level_start.push(self.trail.len());
        self.enqueue(lit, None);
        self.stats.decisions += 1;
        debug!("deciding {}", lit);
    }

    /// Derive the first-UIP learned clause from a conflict.
    ///
    /// Walks the trail backwards, resolving the working clause against the
    /// reason of each falsified literal it contains, until exactly one
    /// literal of the current decision level remains: the asserting UIP.
    /// Decisions and root facts have no reason and are never resolved away.
    fn analyze(&mut self, conflict: ClauseRef) -> ConflictResult {
        debug_assert!(self.current_level() > 0);
        let current = self.current_level() as i32;
        self.analyzer.clear();
        self.clause_db
            .get_mut(conflict)
            .bump_activity(CLAUSE_ACTIVITY_INC);

        let mut working: Vec<Literal> = Vec::new();
        let mut on_current = 0usize;
        {
            let clause = self.clause_db.get(conflict);
            for j in 0..clause.len() {
                let lit = clause.lit(j);
                if !self.analyzer.is_seen(lit) {
                    self.analyzer.mark_seen(lit);
                    working.push(lit);
                    if self.var_level[lit.variable().index()] == current {
                        on_current += 1;
                    }
                }
            }
        }

        for pos in (0..self.trail.len()).rev() {
            if on_current == 1 {
                break;
            }
            let trail_lit = self.trail[pos];
            let falsified = trail_lit.negated();
            let Some(idx) = working.iter().position(|&l| l == falsified) else {
                continue;
            };
            let Some(reason) = self.reason[trail_lit.variable().index()] else {
                continue;
            };
            self.clause_db
                .get_mut(reason)
                .bump_activity(CLAUSE_ACTIVITY_INC);

            for j in 0..self.clause_db.get(reason).len() {
                let lit = self.clause_db.get(reason).lit(j);
                if lit == trail_lit || self.analyzer.is_seen(lit) {
                    continue;
                }
                self.analyzer.mark_seen(lit);
                working.push(lit);
                if self.var_level[lit.variable().index()] == current {
                    on_current += 1;
                }
            }
            working.remove(idx);
            if self.var_level[trail_lit.variable().index()] == current {
                on_current -= 1;
            }
        }

        for &lit in &working {
            self.activities.bump(lit.variable(), VAR_ACTIVITY_INC);
        }
        self.activities.decay_all(VAR_ACTIVITY_DECAY);
        self.clause_db
            .decay_learned_activities(CLAUSE_ACTIVITY_DECAY);

        let uip_idx = working
            .iter()
            .position(|&l| self.var_level[l.variable().index()] == current)
            .expect("analysis leaves one literal at the conflict level");
        working.swap(0, uip_idx);

        let backjump_level = working[1..]
            .iter()
            .map(|&l| self.var_level[l.variable().index()])
            .max()
            .unwrap_or(0) as usize;

        // Watch a backjump-level literal next to the UIP so both watches
        // are unassigned together by any later backjump.
        ConflictAnalyzer::reorder_for_watches(&mut working, &self.var_level, backjump_level as i32);

        ConflictResult {
            literals: working,
            backjump_level,
        }
    }

    /// Undo to the backjump level, install the learned clause, and assert
    /// its UIP. Reduction and restarts are scheduled here, on the conflict
    /// count.
    fn backjump(&mut self, result: ConflictResult) {
        let target = result.backjump_level;
        debug_assert!(target < self.current_level());
        debug!("backjumping to level {}", target);

        let keep = self.level_start[target + 1];
        for pos in (keep..self.trail.len()).rev() {
            let idx = self.trail[pos].variable().index();
            self.assignment[idx] = None;
            self.var_level[idx] = -1;
            self.reason[idx] = None;
            self.assigned_vars -= 1;
        }
        self.trail.truncate(keep);
        self.level_start.truncate(target + 1);

        // The UIP leads the clause; the second literal sits at the backjump
        // level so both watches go unassigned together later on.
        let uip = result.literals[0];
        let learned = Clause::new(result.literals, true);
        let second = (!learned.is_unit()).then(|| learned.lit(1));
        let cref = self.clause_db.add(learned);
        self.watches.add_watch(uip, cref);
        if let Some(lit) = second {
            self.watches.add_watch(lit, cref);
        }
        self.stats.learned_clauses += 1;

        self.enqueue(uip, Some(cref));
        // Resume propagation at the freshly asserted UIP.
        self.trail_head = self.trail.len() - 1;

        self.stats.conflicts += 1;
        if self.stats.conflicts % REDUCE_INTERVAL == 0 {
            self.reduce();
        }
        if self.stats.conflicts as f64 >= self.restart_limit {
            self.restart();
        }
    }

    /// Delete the lowest-activity half of the learned clauses.
    ///
    /// A clause currently acting as the reason for an assigned variable is
    /// locked and survives regardless of activity; deleting it would leave
    /// a dangling reason on the trail.
    fn reduce(&mut self) {
        let mut locked = vec![false; self.clause_db.len()];
        for reason in self.reason.iter().flatten() {
            locked[reason.0 as usize] = true;
        }

        let mut candidates: Vec<ClauseRef> = self
            .clause_db
            .learned_refs()
            .iter()
            .copied()
            .filter(|&r| !self.clause_db.get(r).deleted)
            .collect();
        candidates.sort_by(|&a, &b| {
            let (a, b) = (self.clause_db.get(a).activity, self.clause_db.get(b).activity);
            a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut removed = 0u64;
        for &cref in &candidates[..candidates.len() / 2] {
            if locked[cref.0 as usize] {
                continue;
            }
            let clause = self.clause_db.get(cref);
            let watch_lit1 = clause.lit(clause.watch1);
            let watch_lit2 = clause.lit(clause.watch2);
            self.watches.remove_clause(watch_lit1, cref);
            if watch_lit2 != watch_lit1 {
                self.watches.remove_clause(watch_lit2, cref);
            }
            self.clause_db.delete(cref);
            removed += 1;
        }
        self.clause_db.compact_learned();
        self.stats.deleted_clauses += removed;
        debug!("reduced learned clauses, removed {}", removed);
    }

    /// Abandon the current partial trail and widen the restart schedule.
    ///
    /// Only assignments above the root level are undone; root facts stay
    /// assigned and re-propagate from a reset trail head, so the search
    /// resumes from the same deterministic base. Activities, saved phases
    /// and learned clauses all persist.
    fn restart(&mut self) {
        debug!("restarting after {} conflicts", self.stats.conflicts);
        let keep = if self.level_start.len() > 1 {
            self.level_start[1]
        } else {
            self.trail.len()
        };
        for pos in (keep..self.trail.len()).rev() {
            let idx = self.trail[pos].variable().index();
            self.assignment[idx] = None;
            self.var_level[idx] = -1;
            self.reason[idx] = None;
            self.assigned_vars -= 1;
        }
        self.trail.truncate(keep);
        self.level_start.truncate(1);
        self.trail_head = 0;
        self.restart_limit *= RESTART_GROWTH;
        self.stats.restarts += 1;
    }

    /// The current assignment as a model (unassigned defaults to false;
    /// only meaningful when the search has ended satisfiable)
    fn model(&self) -> Vec<bool> {
        self.assignment.iter().map(|v| v.unwrap_or(false)).collect()
    }

    /// A clause's literals in DIMACS form, for trace output
    fn dimacs_clause(&self, cref: ClauseRef) -> Vec<i32> {
        self.clause_db
            .get(cref)
            .literals
            .iter()
            .map(|l| l.to_dimacs())
            .collect()
    }
}
