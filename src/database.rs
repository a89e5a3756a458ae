use crate::{
    activity::Activity,
    buckets::Buckets,
    clause::{derive_status, Clause, Status},
    terms::TermTable,
    ClauseIdx, Literal, Sign, Term,
};

/// Which branching strategy `pick_branch` runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Heuristic {
    /// Highest decaying activity score over literals of free terms.
    #[default]
    ScoreHeap,
    /// Minority polarity among the free literals of some unresolved clause.
    Structural,
}

/// The incremental clause database: the single source of truth for the
/// search. Terms are discovered from the clauses supplied; every clause
/// keeps live counters against the current partial assignment and sits in
/// the status bucket those counters derive. The term -> clauses reverse
/// index is permanent for the lifetime of a clause.
pub struct Database {
    terms: TermTable,
    clauses: Vec<Clause>,
    buckets: Buckets,
    occurrences: Vec<Vec<ClauseIdx>>,
    values: Vec<Option<bool>>,
    activity: Activity,
    heuristic: Heuristic,
}

impl Database {
    pub fn new() -> Self {
        Self::with_heuristic(Heuristic::default())
    }

    pub fn with_heuristic(heuristic: Heuristic) -> Self {
        Self {
            terms: TermTable::new(),
            clauses: Vec::new(),
            buckets: Buckets::new(),
            occurrences: Vec::new(),
            values: Vec::new(),
            activity: Activity::new(),
            heuristic,
        }
    }

    /// Interns a term name, growing the per-term tables on first mention.
    pub fn intern_term(&mut self, name: &str) -> Term {
        let term = self.terms.intern(name);
        if term == self.values.len() {
            self.values.push(None);
            self.occurrences.push(Vec::new());
            self.activity.grow(self.values.len());
        }
        term
    }

    /// Admits a clause given as (term name, polarity) pairs. A repeated
    /// term within the clause is a caller bug and aborts.
    pub fn add_clause<'a>(&mut self, literals: impl IntoIterator<Item = (&'a str, bool)>) -> ClauseIdx {
        let literals = literals
            .into_iter()
            .map(|(name, polarity)| {
                let term = self.intern_term(name);
                Literal::new(term, polarity)
            })
            .collect();
        self.insert_clause(literals)
    }

    /// Admits a clause over already-interned terms (input or learned).
    /// Counters are initialized against the current assignment, so a
    /// clause whose literals are all falsified classifies as a
    /// contradiction immediately.
    pub(crate) fn insert_clause(&mut self, literals: Vec<Literal>) -> ClauseIdx {
        for &literal in &literals {
            debug_assert!(
                literal.term() < self.values.len(),
                "clause literal references an unknown term"
            );
            self.activity.bump(literal);
        }

        let values = &self.values;
        let clause = Clause::new(literals, |term| values[term]);

        let idx = self.clauses.len();
        for literal in clause.literals() {
            self.occurrences[literal.term()].push(idx);
        }
        self.buckets.insert(idx, clause.status());
        self.clauses.push(clause);
        debug_assert!(self.consistent());
        idx
    }

    /// Sets, unsets, or flips a term. The new value must differ from the
    /// current one; a direct flip decomposes into unset followed by set so
    /// the counter updates stay single-direction.
    pub fn assign(&mut self, term: Term, value: Option<bool>) {
        let current = self.values[term];
        assert_ne!(current, value, "assign must change the term's value");
        match (current, value) {
            (None, Some(v)) => self.set(term, v),
            (Some(_), None) => self.unset(term),
            (Some(_), Some(v)) => {
                self.unset(term);
                self.set(term, v);
            }
            (None, None) => unreachable!(),
        }
        debug_assert!(self.consistent());
    }

    fn set(&mut self, term: Term, value: bool) {
        self.values[term] = Some(value);
        for i in 0..self.occurrences[term].len() {
            let idx = self.occurrences[term][i];
            let sign = self.clauses[idx].sign_of(term).expect("reverse index is exact");
            let (old, new) = self.clauses[idx].note_set(sign.satisfied_by(value));
            if old != new {
                self.buckets.transfer(idx, old, new);
            }
        }
    }

    fn unset(&mut self, term: Term) {
        let value = self.values[term].take().expect("unset of a free term");
        for i in 0..self.occurrences[term].len() {
            let idx = self.occurrences[term][i];
            let sign = self.clauses[idx].sign_of(term).expect("reverse index is exact");
            let (old, new) = self.clauses[idx].note_unset(sign.satisfied_by(value));
            if old != new {
                self.buckets.transfer(idx, old, new);
            }
        }
        // The term's literals are branch candidates again.
        self.activity.restore(Literal::new(term, Sign::Positive));
        self.activity.restore(Literal::new(term, Sign::Negative));
    }

    /// Every clause is satisfied.
    pub fn is_satisfied(&self) -> bool {
        self.buckets.is_empty(Status::Contradiction)
            && self.buckets.is_empty(Status::Unit)
            && self.buckets.is_empty(Status::Other)
    }

    /// Some clause has every literal falsified.
    pub fn is_contradiction(&self) -> bool {
        !self.buckets.is_empty(Status::Contradiction)
    }

    pub(crate) fn any_contradiction(&self) -> Option<ClauseIdx> {
        self.buckets.any(Status::Contradiction)
    }

    /// Some unit clause and its one free literal, or None. Selection among
    /// multiple units is deterministic for a given history.
    pub fn any_unit(&self) -> Option<(Literal, ClauseIdx)> {
        let idx = self.buckets.any(Status::Unit)?;
        let literal = self.clauses[idx]
            .literals()
            .find(|lit| self.values[lit.term()].is_none())
            .expect("a unit clause has exactly one free literal");
        Some((literal, idx))
    }

    /// Chooses a free literal to branch on. Callers must only ask while
    /// some clause is unresolved.
    pub fn pick_branch(&mut self) -> Literal {
        match self.heuristic {
            Heuristic::ScoreHeap => loop {
                let literal = self.activity.pop().expect("no free term to branch on");
                if self.values[literal.term()].is_none() {
                    return literal;
                }
                // Stale entry for an assigned term; it returns to the heap
                // when the term is unset.
            },
            Heuristic::Structural => self.structural_branch(),
        }
    }

    fn structural_branch(&self) -> Literal {
        let idx = self
            .buckets
            .any(Status::Other)
            .or_else(|| self.buckets.any(Status::Unit))
            .expect("no unresolved clause to branch on");
        let free = self.clauses[idx]
            .literals()
            .filter(|lit| self.values[lit.term()].is_none())
            .collect::<Vec<_>>();
        let positives = free
            .iter()
            .filter(|lit| matches!(lit.sign(), Sign::Positive))
            .count();
        if positives <= 1 {
            if let Some(&negative) = free.iter().find(|lit| matches!(lit.sign(), Sign::Negative)) {
                return negative;
            }
        }
        *free
            .iter()
            .find(|lit| matches!(lit.sign(), Sign::Positive))
            .expect("an unresolved clause keeps a free literal of some polarity")
    }

    pub fn decay_activity(&mut self) {
        self.activity.decay();
    }

    pub fn value(&self, term: Term) -> Option<bool> {
        self.values[term]
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn term_name(&self, term: Term) -> &str {
        self.terms.name(term)
    }

    pub fn lookup_term(&self, name: &str) -> Option<Term> {
        self.terms.lookup(name)
    }

    pub fn terms(&self) -> impl Iterator<Item = (Term, &str)> {
        self.terms.iter()
    }

    pub fn clause(&self, idx: ClauseIdx) -> &Clause {
        &self.clauses[idx]
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// Snapshot of all clauses in insertion order, learned ones included.
    pub fn clause_list(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Renders a clause with interned term names, for diagnostics.
    pub fn clause_text(&self, idx: ClauseIdx) -> String {
        let clause = &self.clauses[idx];
        if clause.is_empty() {
            return "<empty>".to_owned();
        }
        clause
            .literals()
            .map(|lit| format!("{}{}", lit.sign(), self.terms.name(lit.term())))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Recomputes every counter and bucket membership from scratch and
    /// compares against the live state. Backs `debug_assert!`s only.
    fn consistent(&self) -> bool {
        let bucketed = [
            Status::Satisfied,
            Status::Contradiction,
            Status::Unit,
            Status::Other,
        ]
        .iter()
        .map(|&status| self.buckets.len(status))
        .sum::<usize>();
        if bucketed != self.clauses.len() {
            return false;
        }

        self.clauses.iter().enumerate().all(|(idx, clause)| {
            let n_sat = clause
                .literals()
                .filter(|lit| self.values[lit.term()].map_or(false, |v| lit.satisfied_by(v)))
                .count();
            let n_yet = clause
                .literals()
                .filter(|lit| self.values[lit.term()].is_none())
                .count();
            n_sat == clause.n_sat()
                && n_yet == clause.n_yet()
                && clause.status() == derive_status(n_sat, n_yet)
                && self.buckets.holds(idx, clause.status())
                && clause
                    .literals()
                    .all(|lit| self.occurrences[lit.term()].contains(&idx))
        })
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}
