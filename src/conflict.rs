use crate::{trail::Trail, Database, Literal, Term};
use fixedbitset::FixedBitSet;

/// Derives a learned clause from a contradicted database by resolution
/// over the implication graph. Propagated terms of the conflict level
/// collapse into their antecedents until only decisions and terms from
/// earlier levels remain; those are emitted with their assignments
/// negated. The learned clause is falsified by the current assignment, so
/// admitting it forces the search to back off the conflicting branch.
pub struct Analyzer {
    seen: FixedBitSet,
    frontier: Vec<Term>,
}

impl Analyzer {
    pub fn new(num_terms: usize) -> Self {
        Self {
            seen: FixedBitSet::with_capacity(num_terms),
            frontier: Vec::new(),
        }
    }

    pub fn analyze(&mut self, db: &Database, trail: &Trail) -> Vec<Literal> {
        let level = trail.level();
        debug_assert!(level > 0, "conflicts at level zero are unsatisfiable outright");

        let conflict = db
            .any_contradiction()
            .expect("analysis requires a contradicted clause");
        let top = trail.top().expect("a conflict implies at least one assignment");
        debug_assert!(
            db.clause(conflict).contains_term(top.term()),
            "the newest assignment is what falsified the conflict clause"
        );

        self.seen.clear();
        self.frontier.clear();
        let mut learned = Vec::new();

        // Seed with the contradicted clause and, when the top of the stack
        // was propagated, its antecedent (minus the top term itself).
        for literal in db.clause(conflict).literals() {
            self.visit(literal.term());
        }
        if let Some(antecedent) = trail.implication(top.term()).and_then(|imp| imp.antecedent) {
            for literal in db.clause(antecedent).literals() {
                if literal.term() != top.term() {
                    self.visit(literal.term());
                }
            }
        }

        while let Some(term) = self.frontier.pop() {
            let implication = trail
                .implication(term)
                .expect("every term reached by analysis is assigned");
            if implication.level < level || implication.antecedent.is_none() {
                let value = db.value(term).expect("every term reached by analysis is assigned");
                learned.push(Literal::new(term, !value));
            } else {
                let antecedent = implication.antecedent.unwrap();
                for literal in db.clause(antecedent).literals() {
                    if literal.term() != term {
                        self.visit(literal.term());
                    }
                }
            }
        }

        learned
    }

    fn visit(&mut self, term: Term) {
        if !self.seen.put(term) {
            self.frontier.push(term);
        }
    }
}
