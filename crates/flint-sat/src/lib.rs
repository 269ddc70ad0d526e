//! Flint - CDCL SAT solver core
//!
//! A Conflict-Driven Clause Learning solver for propositional formulas in
//! Conjunctive Normal Form, built around the competition workflow: parse a
//! DIMACS CNF formula, run the search, report SATISFIABLE or UNSATISFIABLE.
//!
//! ## Core CDCL Features
//! - 2-watched literal scheme for unit propagation
//! - Activity-based variable selection with multiplicative decay
//! - 1UIP conflict analysis by backward resolution along the trail
//! - Non-chronological backjumping
//! - Activity-based learned clause database reduction
//! - Geometric restarts with phase saving
//!
//! ## Example
//!
//! ```
//! use flint_sat::{parse_dimacs, SolveResult};
//!
//! let formula = parse_dimacs("p cnf 2 2\n1 2 0\n-1 2 0\n").unwrap();
//! let mut solver = formula.into_solver();
//! assert!(matches!(solver.solve(), SolveResult::Sat(_)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod activity;
pub mod clause;
pub mod clause_db;
pub mod conflict;
pub mod dimacs;
pub mod literal;
pub mod solver;
pub mod watched;

pub use clause::Clause;
pub use clause_db::ClauseDb;
pub use dimacs::{parse_str as parse_dimacs, DimacsError, DimacsFormula};
pub use literal::{Literal, Variable};
pub use solver::{SolveResult, Solver, SolverStats};
pub use watched::ClauseRef;
