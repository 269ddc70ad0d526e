//! End-to-end solver tests
//!
//! Verdicts are cross-checked against a brute-force oracle on small
//! instances, models are checked against the original clauses, and learned
//! clauses are checked to be consequences of the input formula.

use flint_sat::{parse_dimacs, Literal, SolveResult, Solver};
use proptest::prelude::*;

/// Deterministic pseudo-random number generator (LCG)
fn lcg_next(state: &mut u64) -> u64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    *state
}

fn solver_from_clauses(num_vars: usize, clauses: &[Vec<i32>]) -> Solver {
    let mut solver = Solver::new(num_vars);
    for clause in clauses {
        let literals = clause.iter().map(|&l| Literal::from_dimacs(l)).collect();
        solver.add_clause(literals);
    }
    solver
}

fn clause_satisfied(clause: &[i32], model: &[bool]) -> bool {
    clause
        .iter()
        .any(|&l| model[(l.unsigned_abs() - 1) as usize] == (l > 0))
}

/// Exhaustive satisfiability check; only usable for small variable counts
fn brute_force_sat(num_vars: usize, clauses: &[Vec<i32>]) -> bool {
    assert!(num_vars <= 20);
    (0u64..(1 << num_vars)).any(|bits| {
        let model: Vec<bool> = (0..num_vars).map(|v| (bits >> v) & 1 == 1).collect();
        clauses.iter().all(|c| clause_satisfied(c, &model))
    })
}

/// Random 3-SAT instance over distinct variables per clause
fn random_3sat(num_vars: usize, num_clauses: usize, seed: u64) -> Vec<Vec<i32>> {
    let mut state = seed;
    let mut clauses = Vec::with_capacity(num_clauses);
    for _ in 0..num_clauses {
        let mut vars: Vec<i32> = Vec::with_capacity(3);
        while vars.len() < 3 {
            let v = (lcg_next(&mut state) % num_vars as u64) as i32 + 1;
            if !vars.contains(&v) {
                vars.push(v);
            }
        }
        let clause = vars
            .into_iter()
            .map(|v| if lcg_next(&mut state) % 2 == 0 { v } else { -v })
            .collect();
        clauses.push(clause);
    }
    clauses
}

/// Pigeonhole formula: `holes + 1` pigeons into `holes` holes (UNSAT)
fn pigeonhole(holes: u32) -> (usize, Vec<Vec<i32>>) {
    let pigeons = holes + 1;
    let var = |p: u32, h: u32| (p * holes + h + 1) as i32;
    let mut clauses = Vec::new();
    for p in 0..pigeons {
        clauses.push((0..holes).map(|h| var(p, h)).collect());
    }
    for h in 0..holes {
        for p1 in 0..pigeons {
            for p2 in (p1 + 1)..pigeons {
                clauses.push(vec![-var(p1, h), -var(p2, h)]);
            }
        }
    }
    ((pigeons * holes) as usize, clauses)
}

#[test]
fn single_positive_unit_is_sat() {
    let formula = parse_dimacs("p cnf 1 1\n1 0\n").unwrap();
    let mut solver = formula.into_solver();
    assert_eq!(solver.solve(), SolveResult::Sat(vec![true]));
}

#[test]
fn opposite_units_are_unsat() {
    let formula = parse_dimacs("p cnf 1 2\n1 0\n-1 0\n").unwrap();
    let mut solver = formula.into_solver();
    assert_eq!(solver.solve(), SolveResult::Unsat);
    assert_eq!(solver.stats().decisions, 0);
}

#[test]
fn forced_chain_is_sat_with_consistent_model() {
    let formula = parse_dimacs("p cnf 3 3\n1 2 0\n-1 2 0\n-2 3 0\n").unwrap();
    let clauses = formula.clauses.clone();
    let mut solver = formula.into_solver();
    let SolveResult::Sat(model) = solver.solve() else {
        panic!("expected SAT");
    };
    for clause in &clauses {
        assert!(clause_satisfied(clause, &model));
    }
    assert!(model[1] && model[2]);
}

#[test]
fn two_variable_square_is_unsat() {
    let formula = parse_dimacs("p cnf 3 4\n1 2 0\n1 -2 0\n-1 2 0\n-1 -2 0\n").unwrap();
    let mut solver = formula.into_solver();
    assert_eq!(solver.solve(), SolveResult::Unsat);
}

#[test]
fn pigeonhole_three_into_two_is_unsat() {
    let (num_vars, clauses) = pigeonhole(2);
    assert_eq!(num_vars, 6);
    let mut solver = solver_from_clauses(num_vars, &clauses);
    assert_eq!(solver.solve(), SolveResult::Unsat);
    // The instance is too tight for plain backtracking to stumble through.
    assert!(solver.stats().conflicts >= 1);
    assert!(solver.stats().learned_clauses >= 1);
}

#[test]
fn larger_pigeonhole_is_unsat() {
    let (num_vars, clauses) = pigeonhole(4);
    let mut solver = solver_from_clauses(num_vars, &clauses);
    assert_eq!(solver.solve(), SolveResult::Unsat);
    let stats = solver.stats();
    if stats.conflicts >= 100 {
        assert!(stats.restarts >= 1, "restart schedule never fired");
    }
}

#[test]
fn planted_random_3sat_is_sat() {
    let num_vars = 50;
    let num_clauses = 200;
    let mut state = 0xfeed_beef_u64;
    let planted: Vec<bool> = (0..num_vars).map(|_| lcg_next(&mut state) % 2 == 0).collect();

    let mut clauses = random_3sat(num_vars, num_clauses, 0x5eed);
    for clause in &mut clauses {
        if !clause_satisfied(clause, &planted) {
            // Flip one literal so the planted assignment satisfies it.
            let v = clause[0].unsigned_abs() as usize - 1;
            clause[0] = if planted[v] { v as i32 + 1 } else { -(v as i32 + 1) };
        }
    }

    let mut solver = solver_from_clauses(num_vars, &clauses);
    let SolveResult::Sat(model) = solver.solve() else {
        panic!("expected SAT");
    };
    for clause in &clauses {
        assert!(clause_satisfied(clause, &model));
    }
}

#[test]
fn verdicts_agree_with_brute_force_oracle() {
    for seed in 0..40u64 {
        let num_vars = 8;
        let num_clauses = 30 + (seed as usize % 10);
        let clauses = random_3sat(num_vars, num_clauses, seed * 7 + 1);

        let expected = brute_force_sat(num_vars, &clauses);
        let mut solver = solver_from_clauses(num_vars, &clauses);
        match solver.solve() {
            SolveResult::Sat(model) => {
                assert!(expected, "solver found a model for an UNSAT instance (seed {seed})");
                for clause in &clauses {
                    assert!(clause_satisfied(clause, &model), "bad model (seed {seed})");
                }
            }
            SolveResult::Unsat => {
                assert!(!expected, "solver reported UNSAT for a SAT instance (seed {seed})");
            }
        }
    }
}

#[test]
fn learned_clauses_are_consequences_of_the_formula() {
    for seed in 0..10u64 {
        let num_vars = 8;
        let clauses = random_3sat(num_vars, 36, seed * 13 + 5);
        let mut solver = solver_from_clauses(num_vars, &clauses);
        solver.solve();

        for learned in solver.get_learned_clauses() {
            let learned: Vec<i32> = learned.iter().map(|l| l.to_dimacs()).collect();
            // Every total assignment satisfying the formula satisfies the
            // learned clause.
            for bits in 0u64..(1 << num_vars) {
                let model: Vec<bool> = (0..num_vars).map(|v| (bits >> v) & 1 == 1).collect();
                if clauses.iter().all(|c| clause_satisfied(c, &model)) {
                    assert!(
                        clause_satisfied(&learned, &model),
                        "learned clause {learned:?} is not implied (seed {seed})"
                    );
                }
            }
        }
    }
}

#[test]
fn identical_inputs_solve_identically() {
    let clauses = random_3sat(12, 50, 0xabcd);

    let mut first = solver_from_clauses(12, &clauses);
    let first_result = first.solve();
    let mut second = solver_from_clauses(12, &clauses);
    let second_result = second.solve();

    assert_eq!(first_result, second_result);
    assert_eq!(first.stats(), second.stats());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Arbitrary small formulas agree with the oracle
    #[test]
    fn prop_oracle_agreement(
        raw_clauses in prop::collection::vec(
            prop::collection::vec((1u32..=7, any::<bool>()), 1..=3),
            1..24,
        )
    ) {
        let num_vars = 7;
        let clauses: Vec<Vec<i32>> = raw_clauses
            .iter()
            .map(|clause| {
                clause
                    .iter()
                    .map(|&(v, positive)| if positive { v as i32 } else { -(v as i32) })
                    .collect()
            })
            .collect();

        let expected = brute_force_sat(num_vars, &clauses);
        let mut solver = solver_from_clauses(num_vars, &clauses);
        match solver.solve() {
            SolveResult::Sat(model) => {
                prop_assert!(expected);
                for clause in &clauses {
                    prop_assert!(clause_satisfied(clause, &model));
                }
            }
            SolveResult::Unsat => prop_assert!(!expected),
        }
    }
}
