/// Exhaustive satisfiability check for use as ground truth in tests.
pub(crate) fn satisfiable(clauses: &[Vec<(String, bool)>]) -> bool {
    let mut names = Vec::new();
    for clause in clauses {
        for (name, _) in clause {
            if !names.contains(&name.as_str()) {
                names.push(name.as_str());
            }
        }
    }
    assert!(names.len() <= 20); // this is a very bad solver

    (0..(1u32 << names.len())).any(|mask| {
        clauses.iter().all(|clause| {
            clause.iter().any(|(name, polarity)| {
                let idx = names.iter().position(|n| *n == name).unwrap();
                ((mask >> idx) & 1 == 1) == *polarity
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(literals: &[(&str, bool)]) -> Vec<(String, bool)> {
        literals
            .iter()
            .map(|&(name, polarity)| (name.to_owned(), polarity))
            .collect()
    }

    #[test]
    fn empty_formula_is_satisfiable() {
        assert!(satisfiable(&[]));
    }

    #[test]
    fn empty_clause_is_not() {
        assert!(!satisfiable(&[clause(&[])]));
    }

    #[test]
    fn complementary_units() {
        assert!(!satisfiable(&[
            clause(&[("x", true)]),
            clause(&[("x", false)])
        ]));
    }

    #[test]
    fn simple_sat() {
        assert!(satisfiable(&[
            clause(&[("a", true), ("b", true)]),
            clause(&[("b", false)])
        ]));
    }
}
