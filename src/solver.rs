use crate::{conflict::Analyzer, trail::Trail, Database, DecisionLevel, Literal};
use log::trace;

/// Outcome of a solve: a satisfying model or a proof that none exists.
/// Both are data; the library never reports UNSAT as an error.
#[derive(Clone, Debug)]
pub enum Solution {
    Sat(Model),
    Unsat,
}

impl Solution {
    pub fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }
}

/// Counters over one or more `solve` calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub learned: u64,
}

/// The search driver. The database is the single source of truth; the
/// driver holds only the decision stack and the implication graph, and
/// both are fully unwound before `solve` returns.
pub struct Solver {
    db: Database,
    trail: Trail,
    analyzer: Analyzer,
    stats: Stats,
}

impl Solver {
    pub fn new(db: Database) -> Self {
        let num_terms = db.term_count();
        Self {
            db,
            trail: Trail::new(num_terms),
            analyzer: Analyzer::new(num_terms),
            stats: Stats::default(),
        }
    }

    pub fn solve(&mut self) -> Solution {
        loop {
            if self.db.is_satisfied() {
                let model = self.snapshot();
                self.trail.clear(&mut self.db);
                return Solution::Sat(model);
            }

            if self.db.is_contradiction() {
                self.stats.conflicts += 1;
                if self.trail.level() == 0 {
                    self.trail.clear(&mut self.db);
                    return Solution::Unsat;
                }

                let learned = self.analyzer.analyze(&self.db, &self.trail);
                let back = self.backtrack_level(&learned);
                if back == 0 {
                    self.trail.clear(&mut self.db);
                    return Solution::Unsat;
                }
                self.trail.backtrack_to(back - 1, &mut self.db);
                let idx = self.db.insert_clause(learned);
                self.db.decay_activity();
                self.stats.learned += 1;
                trace!(
                    "learned {} and backtracked to level {}",
                    self.db.clause_text(idx),
                    back - 1
                );
                continue;
            }

            if let Some((literal, antecedent)) = self.db.any_unit() {
                self.stats.propagations += 1;
                trace!("implied {:?} at level {}", literal, self.trail.level());
                self.trail.push_implied(literal, antecedent);
                self.db.assign(literal.term(), Some(literal.sign().value()));
            } else {
                let literal = self.db.pick_branch();
                self.stats.decisions += 1;
                self.trail.push_decision(literal);
                trace!("decision {:?} at level {}", literal, self.trail.level());
                self.db.assign(literal.term(), Some(literal.sign().value()));
            }
        }
    }

    /// The highest decision level mentioned by the learned clause; zero
    /// means the conflict does not depend on any decision, i.e. UNSAT.
    fn backtrack_level(&self, learned: &[Literal]) -> DecisionLevel {
        learned
            .iter()
            .map(|lit| {
                self.trail
                    .implication(lit.term())
                    .expect("learned literals are assigned")
                    .level
            })
            .max()
            .unwrap_or(0)
    }

    fn snapshot(&self) -> Model {
        Model {
            entries: self
                .db
                .terms()
                .map(|(term, name)| (name.to_owned(), self.db.value(term).unwrap_or(false)))
                .collect(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn into_database(self) -> Database {
        self.db
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }
}

/// A satisfying assignment covering every term the database has seen, in
/// first-mention order. Terms left free once every clause was satisfied
/// report `false`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    entries: Vec<(String, bool)>,
}

impl Model {
    pub fn value(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|&(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{brute_force, Heuristic};
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::collections::BTreeMap;

    fn solver_for(clauses: &[Vec<(&str, bool)>]) -> Solver {
        let mut db = Database::new();
        for clause in clauses {
            db.add_clause(clause.iter().copied());
        }
        Solver::new(db)
    }

    fn satisfies(model: &Model, clauses: &[Vec<(&str, bool)>]) -> bool {
        clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|(name, polarity)| model.value(name) == Some(*polarity))
        })
    }

    #[test]
    fn empty_formula_is_sat_with_empty_model() {
        let mut solver = solver_for(&[]);
        match solver.solve() {
            Solution::Sat(model) => assert!(model.is_empty()),
            Solution::Unsat => panic!("empty formula must be satisfiable"),
        }
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut solver = solver_for(&[vec![]]);
        assert!(matches!(solver.solve(), Solution::Unsat));
    }

    #[test]
    fn single_unit_clause() {
        let mut solver = solver_for(&[vec![("x", true)]]);
        match solver.solve() {
            Solution::Sat(model) => assert_eq!(model.value("x"), Some(true)),
            Solution::Unsat => panic!("unit clause must be satisfiable"),
        }
    }

    #[test]
    fn complementary_units_are_unsat() {
        let mut solver = solver_for(&[vec![("x", true)], vec![("x", false)]]);
        assert!(matches!(solver.solve(), Solution::Unsat));
    }

    #[test]
    fn propagation_fixes_the_model() {
        let clauses = vec![vec![("a", true), ("b", true)], vec![("b", false)]];
        let mut solver = solver_for(&clauses);
        match solver.solve() {
            Solution::Sat(model) => {
                assert_eq!(model.value("a"), Some(true));
                assert_eq!(model.value("b"), Some(false));
            }
            Solution::Unsat => panic!("expected SAT"),
        }
    }

    #[test]
    fn all_two_literal_clauses_over_two_terms_are_unsat() {
        let clauses = vec![
            vec![("x", true), ("y", true)],
            vec![("x", true), ("y", false)],
            vec![("x", false), ("y", true)],
            vec![("x", false), ("y", false)],
        ];
        let mut solver = solver_for(&clauses);
        assert!(matches!(solver.solve(), Solution::Unsat));
    }

    #[test]
    fn pigeonhole_three_into_two_is_unsat() {
        let input = "c three pigeons, two holes
p cnf 6 9
1 2 0
3 4 0
5 6 0
-1 -3 0
-1 -5 0
-3 -5 0
-2 -4 0
-2 -6 0
-4 -6 0
";
        let clauses = crate::dimacs::parse(input.as_bytes()).unwrap();
        let mut db = Database::new();
        for clause in &clauses {
            db.add_clause(clause.iter().map(|(name, polarity)| (name.as_str(), *polarity)));
        }
        let mut solver = Solver::new(db);
        assert!(matches!(solver.solve(), Solution::Unsat));
        assert!(solver.stats().conflicts > 0);
    }

    #[test]
    fn state_unwinds_and_learned_clauses_remain() {
        let clauses = vec![
            vec![("a", true), ("b", true), ("c", true)],
            vec![("a", false), ("b", false), ("c", true)],
            vec![("b", false), ("c", false)],
            vec![("a", false), ("c", false)],
            vec![("a", true), ("c", false)],
        ];
        let mut solver = solver_for(&clauses);
        let first = solver.solve();

        let db = solver.database();
        for term in 0..db.term_count() {
            assert_eq!(db.value(term), None, "assignment must be unwound");
        }
        assert!(db.clause_count() >= clauses.len());

        // Learned clauses carry over; a second solve agrees.
        let second = solver.solve();
        assert_eq!(
            matches!(first, Solution::Sat(_)),
            matches!(second, Solution::Sat(_))
        );
    }

    #[test]
    fn planted_random_3sat_is_sat() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let num_terms = 25;
        let num_clauses = 75; // ratio m/n = 3
        let hidden = (0..num_terms).map(|_| rng.gen::<bool>()).collect::<Vec<bool>>();

        let mut clauses = Vec::new();
        for _ in 0..num_clauses {
            let mut terms = Vec::new();
            while terms.len() < 3 {
                let t = rng.gen_range(0..num_terms);
                if !terms.contains(&t) {
                    terms.push(t);
                }
            }
            let mut clause = terms
                .iter()
                .map(|&t| (t, rng.gen::<bool>()))
                .collect::<Vec<_>>();
            // Keep the hidden assignment a model of every clause.
            if !clause.iter().any(|&(t, polarity)| hidden[t] == polarity) {
                let fix = rng.gen_range(0..3);
                clause[fix].1 = hidden[clause[fix].0];
            }
            clauses.push(
                clause
                    .into_iter()
                    .map(|(t, polarity)| (format!("v{}", t), polarity))
                    .collect::<Vec<_>>(),
            );
        }

        let mut db = Database::new();
        for clause in &clauses {
            db.add_clause(clause.iter().map(|(name, polarity)| (name.as_str(), *polarity)));
        }
        let mut solver = Solver::new(db);
        match solver.solve() {
            Solution::Sat(model) => {
                // Verify the model clause by clause.
                for clause in &clauses {
                    assert!(
                        clause
                            .iter()
                            .any(|(name, polarity)| model.value(name) == Some(*polarity)),
                        "model leaves a clause unsatisfied"
                    );
                }
            }
            Solution::Unsat => panic!("planted instance must be satisfiable"),
        }
    }

    #[derive(Clone, Debug)]
    struct SmallFormula {
        clauses: Vec<Vec<(String, bool)>>,
    }

    impl Arbitrary for SmallFormula {
        fn arbitrary(g: &mut Gen) -> Self {
            let num_terms = usize::arbitrary(g) % 6 + 1;
            let num_clauses = usize::arbitrary(g) % 10;
            let clauses = (0..num_clauses)
                .map(|_| {
                    let width = usize::arbitrary(g) % 3 + 1;
                    let mut by_term = BTreeMap::new();
                    for _ in 0..width {
                        let term = usize::arbitrary(g) % num_terms;
                        let polarity = bool::arbitrary(g);
                        by_term.entry(term).or_insert(polarity);
                    }
                    by_term
                        .into_iter()
                        .map(|(term, polarity)| (format!("v{}", term), polarity))
                        .collect()
                })
                .collect();
            Self { clauses }
        }
    }

    fn check_against_oracle(formula: &SmallFormula, heuristic: Heuristic) -> bool {
        let expected = brute_force::satisfiable(&formula.clauses);
        let mut db = Database::with_heuristic(heuristic);
        for clause in &formula.clauses {
            db.add_clause(clause.iter().map(|(name, polarity)| (name.as_str(), *polarity)));
        }
        let mut solver = Solver::new(db);
        match solver.solve() {
            Solution::Sat(model) => {
                expected
                    && formula.clauses.iter().all(|clause| {
                        clause
                            .iter()
                            .any(|(name, polarity)| model.value(name) == Some(*polarity))
                    })
            }
            Solution::Unsat => !expected,
        }
    }

    #[quickcheck]
    fn agrees_with_brute_force(formula: SmallFormula) -> bool {
        check_against_oracle(&formula, Heuristic::ScoreHeap)
    }

    #[quickcheck]
    fn structural_heuristic_agrees_with_brute_force(formula: SmallFormula) -> bool {
        check_against_oracle(&formula, Heuristic::Structural)
    }

    #[test]
    fn model_satisfies_every_input_clause() {
        let clauses = vec![
            vec![("a", true), ("b", true), ("c", true)],
            vec![("a", false), ("b", true)],
            vec![("b", false), ("c", true)],
            vec![("c", false), ("a", true)],
        ];
        let mut solver = solver_for(&clauses);
        match solver.solve() {
            Solution::Sat(model) => assert!(satisfies(&model, &clauses)),
            Solution::Unsat => panic!("expected SAT"),
        }
    }
}
