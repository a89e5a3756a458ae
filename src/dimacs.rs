//! DIMACS CNF reader. Clause bodies are whitespace-separated non-zero
//! signed integers terminated by `0`; a positive k reads as the literal
//! (x<k>, true) and a negative -k as (x<k>, false). Clauses may share a
//! line or span several; a trailing clause without its terminator is
//! accepted. Comment lines (`c`) are skipped and the `p cnf` header is
//! optional and unvalidated.

use std::io::{BufRead, BufReader, Read};

/// A clause as read from the input: term names with polarities.
pub type RawClause = Vec<(String, bool)>;

#[derive(Debug)]
pub enum DimacsError {
    Io(std::io::Error),
    Token(String),
}

impl std::fmt::Display for DimacsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{}", err),
            Self::Token(token) => write!(f, "unexpected token '{}'", token),
        }
    }
}

impl std::error::Error for DimacsError {}

impl From<std::io::Error> for DimacsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

pub fn parse(reader: impl Read) -> Result<Vec<RawClause>, DimacsError> {
    let reader = BufReader::new(reader);
    let mut clauses = Vec::new();
    let mut clause = RawClause::new();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim_start();
        if trimmed.starts_with('c') || trimmed.starts_with('p') {
            continue;
        }
        for token in trimmed.split_whitespace() {
            let k: i64 = token
                .parse()
                .map_err(|_| DimacsError::Token(token.to_owned()))?;
            if k == 0 {
                if !clause.is_empty() {
                    clauses.push(std::mem::take(&mut clause));
                }
            } else {
                clause.push((format!("x{}", k.unsigned_abs()), k > 0));
            }
        }
    }

    if !clause.is_empty() {
        clauses.push(clause);
    }
    Ok(clauses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(name: &str, polarity: bool) -> (String, bool) {
        (name.to_owned(), polarity)
    }

    #[test]
    fn comments_and_header_are_skipped() {
        let input = "c a comment
c another
p cnf 3 2
1 -3 0
2 3 -1 0
";
        let clauses = parse(input.as_bytes()).unwrap();
        assert_eq!(
            clauses,
            vec![
                vec![lit("x1", true), lit("x3", false)],
                vec![lit("x2", true), lit("x3", true), lit("x1", false)],
            ]
        );
    }

    #[test]
    fn clauses_share_and_span_lines() {
        let input = "-3 1 0 2 -1 0
3
0
";
        let clauses = parse(input.as_bytes()).unwrap();
        assert_eq!(
            clauses,
            vec![
                vec![lit("x3", false), lit("x1", true)],
                vec![lit("x2", true), lit("x1", false)],
                vec![lit("x3", true)],
            ]
        );
    }

    #[test]
    fn trailing_clause_without_terminator_is_accepted() {
        let clauses = parse("1 2 0 -2 3".as_bytes()).unwrap();
        assert_eq!(
            clauses,
            vec![
                vec![lit("x1", true), lit("x2", true)],
                vec![lit("x2", false), lit("x3", true)],
            ]
        );
    }

    #[test]
    fn missing_header_is_fine() {
        let clauses = parse("1 0".as_bytes()).unwrap();
        assert_eq!(clauses, vec![vec![lit("x1", true)]]);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            parse("1 two 0".as_bytes()),
            Err(DimacsError::Token(_))
        ));
    }
}
