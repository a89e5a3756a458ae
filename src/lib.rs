mod activity;
mod buckets;
mod clause;
mod conflict;
mod database;
pub mod dimacs;
mod literal;
mod sign;
mod solver;
mod terms;
mod trail;

#[cfg(test)]
mod brute_force;

pub use clause::{derive_status, Clause, Status};
pub use database::{Database, Heuristic};
pub use literal::Literal;
pub use sign::Sign;
pub use solver::{Model, Solution, Solver, Stats};
pub use terms::Term;

/// Stable handle of a clause within its database, issued in insertion
/// order (learned clauses included).
pub type ClauseIdx = usize;

pub(crate) type DecisionLevel = usize;
