use crate::{Literal, Sign, Term};

/// Classification of a clause under the current partial assignment,
/// derived from its live counters.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Status {
    Satisfied,
    Contradiction,
    Unit,
    Other,
}

/// The status function: satisfied beats everything, then the free-literal
/// count decides.
pub fn derive_status(n_sat: usize, n_yet: usize) -> Status {
    if n_sat > 0 {
        Status::Satisfied
    } else if n_yet == 0 {
        Status::Contradiction
    } else if n_yet == 1 {
        Status::Unit
    } else {
        Status::Other
    }
}

/// A clause record with live counters: `n_sat` satisfied literals and
/// `n_yet` free literals under the current assignment. The falsified count
/// is implicit (`len - n_sat - n_yet`).
pub struct Clause {
    literals: Vec<Literal>,
    n_sat: usize,
    n_yet: usize,
    status: Status,
}

impl Clause {
    /// Builds a record with counters initialized against `value`, the
    /// current assignment lookup. A repeated term within the clause is a
    /// caller bug and aborts.
    pub(crate) fn new(literals: Vec<Literal>, value: impl Fn(Term) -> Option<bool>) -> Self {
        let mut terms = literals.iter().map(|lit| lit.term()).collect::<Vec<_>>();
        terms.sort_unstable();
        assert!(
            terms.windows(2).all(|w| w[0] != w[1]),
            "repeated term in clause"
        );

        let mut n_sat = 0;
        let mut n_yet = 0;
        for literal in &literals {
            match value(literal.term()) {
                None => n_yet += 1,
                Some(v) if literal.satisfied_by(v) => n_sat += 1,
                Some(_) => {}
            }
        }

        Self {
            literals,
            n_sat,
            n_yet,
            status: derive_status(n_sat, n_yet),
        }
    }

    pub fn literals(&self) -> impl Iterator<Item = Literal> + ExactSizeIterator + '_ {
        self.literals.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn n_sat(&self) -> usize {
        self.n_sat
    }

    pub fn n_yet(&self) -> usize {
        self.n_yet
    }

    /// The sign under which `term` occurs, if it occurs.
    pub fn sign_of(&self, term: Term) -> Option<Sign> {
        self.literals
            .iter()
            .find(|lit| lit.term() == term)
            .map(|lit| lit.sign())
    }

    pub fn contains_term(&self, term: Term) -> bool {
        self.sign_of(term).is_some()
    }

    /// Counter delta for one of this clause's terms going free -> assigned.
    /// Returns (old, new) status so the caller can rebucket.
    pub(crate) fn note_set(&mut self, satisfies: bool) -> (Status, Status) {
        let old = self.status;
        debug_assert!(self.n_yet > 0, "set on a clause with no free literal");
        self.n_yet -= 1;
        if satisfies {
            self.n_sat += 1;
        }
        self.status = derive_status(self.n_sat, self.n_yet);
        (old, self.status)
    }

    /// Counter delta for one of this clause's terms going assigned -> free.
    pub(crate) fn note_unset(&mut self, was_satisfying: bool) -> (Status, Status) {
        let old = self.status;
        self.n_yet += 1;
        if was_satisfying {
            debug_assert!(self.n_sat > 0, "unset of a satisfier with n_sat = 0");
            self.n_sat -= 1;
        }
        self.status = derive_status(self.n_sat, self.n_yet);
        (old, self.status)
    }
}
