use crate::{ClauseIdx, Database, DecisionLevel, Literal, Term};

/// One assignment on the decision stack: the literal made true and whether
/// it was a branching decision or a unit-propagated implication.
#[derive(Clone, Copy, Debug)]
pub struct Entry {
    pub literal: Literal,
    pub decision: bool,
}

/// Per-term implication record: the level the term was assigned at and the
/// clause that forced it (None for decisions).
#[derive(Clone, Copy, Debug)]
pub struct Implication {
    pub level: DecisionLevel,
    pub antecedent: Option<ClauseIdx>,
}

/// The decision stack and implication graph for one solve. The database
/// keeps the truth values; the trail remembers order, levels and
/// antecedents so conflicts can be analyzed and undone.
pub struct Trail {
    entries: Vec<Entry>,
    level_breaks: Vec<usize>,
    implications: Vec<Option<Implication>>,
}

impl Trail {
    pub fn new(num_terms: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_terms),
            level_breaks: Vec::new(),
            implications: vec![None; num_terms],
        }
    }

    /// Current decision level: the number of decisions on the stack.
    pub fn level(&self) -> DecisionLevel {
        self.level_breaks.len()
    }

    /// The most recently assigned literal.
    pub fn top(&self) -> Option<Literal> {
        self.entries.last().map(|entry| entry.literal)
    }

    pub fn implication(&self, term: Term) -> Option<Implication> {
        self.implications[term]
    }

    /// Opens a new decision level with `literal` as its decision. The
    /// caller applies the matching `Database::assign`.
    pub fn push_decision(&mut self, literal: Literal) {
        self.level_breaks.push(self.entries.len());
        self.implications[literal.term()] = Some(Implication {
            level: self.level(),
            antecedent: None,
        });
        self.entries.push(Entry {
            literal,
            decision: true,
        });
    }

    /// Records a unit-propagated assignment forced by `antecedent` at the
    /// current level.
    pub fn push_implied(&mut self, literal: Literal, antecedent: ClauseIdx) {
        self.implications[literal.term()] = Some(Implication {
            level: self.level(),
            antecedent: Some(antecedent),
        });
        self.entries.push(Entry {
            literal,
            decision: false,
        });
    }

    /// Unwinds every entry above `level`, unassigning through the
    /// database, so `level` becomes the current decision level again.
    pub fn backtrack_to(&mut self, level: DecisionLevel, db: &mut Database) {
        if level >= self.level() {
            return;
        }
        let new_end = self.level_breaks[level];
        debug_assert!(
            self.entries[new_end].decision,
            "an unwound level starts at its decision"
        );
        for entry in self.entries.drain(new_end..) {
            self.implications[entry.literal.term()] = None;
            db.assign(entry.literal.term(), None);
        }
        self.level_breaks.truncate(level);
    }

    /// Unwinds the whole stack, level-zero implications included.
    pub fn clear(&mut self, db: &mut Database) {
        for entry in self.entries.drain(..) {
            self.implications[entry.literal.term()] = None;
            db.assign(entry.literal.term(), None);
        }
        self.level_breaks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[test]
fn backtracking_rewinds_assignments() {
    let mut db = Database::new();
    db.add_clause([("a", true), ("b", true), ("c", true), ("d", true)]);
    let (a, b, c, d) = (0, 1, 2, 3);

    let mut trail = Trail::new(db.term_count());

    // Level 0 implication
    trail.push_implied(Literal::new(a, true), 0);
    db.assign(a, Some(true));

    // Level 1
    trail.push_decision(Literal::new(b, false));
    db.assign(b, Some(false));
    trail.push_implied(Literal::new(c, true), 0);
    db.assign(c, Some(true));

    // Level 2
    trail.push_decision(Literal::new(d, false));
    db.assign(d, Some(false));

    assert_eq!(trail.level(), 2);
    assert_eq!(trail.top(), Some(Literal::new(d, false)));
    assert_eq!(trail.implication(c).unwrap().antecedent, Some(0));
    assert_eq!(trail.implication(d).unwrap().level, 2);

    trail.backtrack_to(1, &mut db);
    assert_eq!(trail.level(), 1);
    assert_eq!(db.value(d), None);
    assert!(trail.implication(d).is_none());
    assert_eq!(db.value(c), Some(true));

    trail.backtrack_to(0, &mut db);
    assert_eq!(trail.level(), 0);
    assert_eq!(db.value(b), None);
    assert_eq!(db.value(a), Some(true));

    trail.clear(&mut db);
    assert!(trail.is_empty());
    assert_eq!(db.value(a), None);
}
