use criterion::{criterion_group, criterion_main, Criterion};
use relsat::{Database, Solver};

fn pigeonhole(pigeons: usize, holes: usize) -> Vec<Vec<(String, bool)>> {
    let name = |p: usize, h: usize| format!("p{}h{}", p, h);
    let mut clauses = Vec::new();
    for p in 0..pigeons {
        clauses.push((0..holes).map(|h| (name(p, h), true)).collect());
    }
    for h in 0..holes {
        for a in 0..pigeons {
            for b in a + 1..pigeons {
                clauses.push(vec![(name(a, h), false), (name(b, h), false)]);
            }
        }
    }
    clauses
}

fn solve(clauses: &[Vec<(String, bool)>]) -> relsat::Solution {
    let mut db = Database::new();
    for clause in clauses {
        db.add_clause(clause.iter().map(|(name, polarity)| (name.as_str(), *polarity)));
    }
    Solver::new(db).solve()
}

pub fn php(c: &mut Criterion) {
    let unsat = pigeonhole(6, 5);
    c.bench_function("pigeonhole 6 into 5", |b| b.iter(|| solve(&unsat)));

    let sat = pigeonhole(5, 5);
    c.bench_function("pigeonhole 5 into 5", |b| b.iter(|| solve(&sat)));
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = php
}
criterion_main!(benches);
