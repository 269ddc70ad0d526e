//! DIMACS CNF parsing
//!
//! Accepts the competition format: `c` comment lines, one `p cnf <vars>
//! <clauses>` header, then whitespace-separated signed literals with each
//! clause terminated by `0`. Clauses may span lines and several clauses may
//! share a line.

use crate::literal::Literal;
use crate::solver::Solver;
use thiserror::Error;

/// Errors from DIMACS parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimacsError {
    /// No `p cnf` header before the first clause (or in the whole input)
    #[error("missing `p cnf <vars> <clauses>` header")]
    MissingHeader,

    /// More than one header line
    #[error("duplicate `p` header line")]
    DuplicateHeader,

    /// A `p` line that is not `p cnf <vars> <clauses>`
    #[error("invalid header line `{0}`")]
    InvalidHeader(String),

    /// A clause token that is not a signed integer
    #[error("invalid literal token `{0}`")]
    InvalidToken(String),

    /// A literal referencing a variable beyond the declared count
    #[error("literal {literal} out of range (formula declares {num_vars} variables)")]
    LiteralOutOfRange {
        /// The offending literal as written
        literal: i64,
        /// The declared variable count
        num_vars: usize,
    },

    /// Input ended inside a clause (missing `0` terminator)
    #[error("unterminated clause at end of input")]
    UnterminatedClause,
}

/// A parsed DIMACS formula
#[derive(Debug, Clone, PartialEq)]
pub struct DimacsFormula {
    /// Declared variable count (variables are 1..=num_vars)
    pub num_vars: usize,
    /// Declared clause count from the header
    pub num_clauses: usize,
    /// The clauses, in input order, as signed DIMACS literals
    pub clauses: Vec<Vec<i32>>,
}

impl DimacsFormula {
    /// Build a solver loaded with this formula's clauses
    pub fn into_solver(self) -> Solver {
        let mut solver = Solver::new(self.num_vars);
        for clause in &self.clauses {
            let literals = clause.iter().map(|&l| Literal::from_dimacs(l)).collect();
            solver.add_clause(literals);
        }
        solver
    }
}

/// Parse a DIMACS CNF formula from a string
pub fn parse_str(input: &str) -> Result<DimacsFormula, DimacsError> {
    let mut header: Option<(usize, usize)> = None;
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    let mut current: Vec<i32> = Vec::new();

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }

        if line.starts_with('p') {
            if header.is_some() {
                return Err(DimacsError::DuplicateHeader);
            }
            header = Some(parse_header(line)?);
            continue;
        }

        let (num_vars, _) = header.ok_or(DimacsError::MissingHeader)?;
        for token in line.split_whitespace() {
            let value: i64 = token
                .parse()
                .map_err(|_| DimacsError::InvalidToken(token.to_string()))?;
            if value == 0 {
                clauses.push(std::mem::take(&mut current));
            } else {
                if value.unsigned_abs() > num_vars as u64 {
                    return Err(DimacsError::LiteralOutOfRange {
                        literal: value,
                        num_vars,
                    });
                }
                current.push(value as i32);
            }
        }
    }

    if !current.is_empty() {
        return Err(DimacsError::UnterminatedClause);
    }

    let (num_vars, num_clauses) = header.ok_or(DimacsError::MissingHeader)?;
    Ok(DimacsFormula {
        num_vars,
        num_clauses,
        clauses,
    })
}

fn parse_header(line: &str) -> Result<(usize, usize), DimacsError> {
    let invalid = || DimacsError::InvalidHeader(line.to_string());
    let mut parts = line.split_whitespace();

    if parts.next() != Some("p") || parts.next() != Some("cnf") {
        return Err(invalid());
    }
    let num_vars = parts
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(invalid)?;
    let num_clauses = parts
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok((num_vars, num_clauses))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_formula() {
        let formula = parse_str("p cnf 3 2\n1 -2 0\n2 3 0\n").unwrap();
        assert_eq!(formula.num_vars, 3);
        assert_eq!(formula.num_clauses, 2);
        assert_eq!(formula.clauses, vec![vec![1, -2], vec![2, 3]]);
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let input = "c a comment\n\nc another\np cnf 2 1\nc inside\n1 2 0\n";
        let formula = parse_str(input).unwrap();
        assert_eq!(formula.clauses, vec![vec![1, 2]]);
    }

    #[test]
    fn test_clause_spanning_lines_and_shared_lines() {
        let formula = parse_str("p cnf 4 3\n1 2\n3 0 -1\n-2 0 4 0\n").unwrap();
        assert_eq!(
            formula.clauses,
            vec![vec![1, 2, 3], vec![-1, -2], vec![4]]
        );
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(parse_str("1 2 0\n"), Err(DimacsError::MissingHeader));
        assert_eq!(parse_str(""), Err(DimacsError::MissingHeader));
    }

    #[test]
    fn test_duplicate_header() {
        let input = "p cnf 1 1\np cnf 2 2\n1 0\n";
        assert_eq!(parse_str(input), Err(DimacsError::DuplicateHeader));
    }

    #[test]
    fn test_invalid_header() {
        assert!(matches!(
            parse_str("p dnf 2 1\n1 0\n"),
            Err(DimacsError::InvalidHeader(_))
        ));
        assert!(matches!(
            parse_str("p cnf two 1\n"),
            Err(DimacsError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_invalid_token() {
        assert!(matches!(
            parse_str("p cnf 2 1\n1 x 0\n"),
            Err(DimacsError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_literal_out_of_range() {
        assert_eq!(
            parse_str("p cnf 2 1\n1 -3 0\n"),
            Err(DimacsError::LiteralOutOfRange {
                literal: -3,
                num_vars: 2
            })
        );
    }

    #[test]
    fn test_unterminated_clause() {
        assert_eq!(
            parse_str("p cnf 2 1\n1 2\n"),
            Err(DimacsError::UnterminatedClause)
        );
    }

    #[test]
    fn test_into_solver_loads_clauses() {
        let formula = parse_str("p cnf 2 2\n1 2 0\n-1 0\n").unwrap();
        let solver = formula.into_solver();
        assert_eq!(solver.num_vars(), 2);
    }
}
