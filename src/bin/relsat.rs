use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser};
use relsat::{dimacs, Database, Sign, Solution, Solver};

const GRID_COLUMNS: usize = 200;

// Flags count occurrences so a repeated flag can be rejected after
// parsing; clap's plain boolean action accepts repeats silently.
#[derive(Parser, Debug)]
#[command(
    name = "relsat",
    about = "Decides the satisfiability of a DIMACS CNF formula read from standard input"
)]
struct Cli {
    /// Print the parsed CNF before solving
    #[arg(long, action = ArgAction::Count, conflicts_with = "hide_cnf")]
    show_cnf: u8,
    /// Do not print the parsed CNF (the default)
    #[arg(long, action = ArgAction::Count)]
    hide_cnf: u8,
    /// Print the satisfying assignment (the default)
    #[arg(long, action = ArgAction::Count, conflicts_with = "hide_model")]
    show_model: u8,
    /// Do not print the satisfying assignment
    #[arg(long, action = ArgAction::Count)]
    hide_model: u8,
    /// Print the full clause list, learned clauses included, as a grid
    #[arg(long, action = ArgAction::Count, conflicts_with = "hide_learned_clauses")]
    show_learned_clauses: u8,
    /// Do not print the clause list (the default)
    #[arg(long, action = ArgAction::Count)]
    hide_learned_clauses: u8,
}

fn reject_repeats(cli: Cli) -> Result<Cli, clap::Error> {
    let occurrences = [
        (cli.show_cnf, "--show-cnf"),
        (cli.hide_cnf, "--hide-cnf"),
        (cli.show_model, "--show-model"),
        (cli.hide_model, "--hide-model"),
        (cli.show_learned_clauses, "--show-learned-clauses"),
        (cli.hide_learned_clauses, "--hide-learned-clauses"),
    ];
    for (count, flag) in occurrences {
        if count > 1 {
            return Err(clap::Error::raw(
                ErrorKind::ArgumentConflict,
                format!("the argument '{}' may only be given once\n", flag),
            )
            .format(&mut Cli::command()));
        }
    }
    Ok(cli)
}

fn main() {
    let cli = match Cli::try_parse().and_then(reject_repeats) {
        Ok(cli) => cli,
        Err(err) => {
            // Usage goes to stdout; only an explicit --help succeeds.
            print!("{}", err.render());
            std::process::exit(match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 2,
            });
        }
    };

    let clauses = match dimacs::parse(std::io::stdin().lock()) {
        Ok(clauses) => clauses,
        Err(err) => {
            eprintln!("relsat: {}", err);
            std::process::exit(1);
        }
    };

    let mut db = Database::new();
    for clause in &clauses {
        db.add_clause(clause.iter().map(|(name, polarity)| (name.as_str(), *polarity)));
    }
    let original = db.clause_count();

    if cli.show_cnf > 0 {
        for idx in 0..original {
            println!("{}", db.clause_text(idx));
        }
    }

    let mut solver = Solver::new(db);
    match solver.solve() {
        Solution::Sat(model) => {
            println!("SAT: true");
            if cli.hide_model == 0 {
                for (name, value) in model.iter() {
                    println!("\t{}\t=>\t{}", name, value);
                }
            }
        }
        Solution::Unsat => println!("SAT: false"),
    }

    if cli.show_learned_clauses > 0 {
        print_clause_grid(solver.database(), original);
    }
}

/// One row per clause, original clauses first: column k holds `T` when
/// literal xk appears positive, `~` when negative, a space otherwise. A
/// separator line follows the last original clause.
fn print_clause_grid(db: &Database, original: usize) {
    for idx in 0..original {
        println!("{}", grid_row(db, idx));
    }
    println!("{}", "-".repeat(GRID_COLUMNS));
    for idx in original..db.clause_count() {
        println!("{}", grid_row(db, idx));
    }
}

fn grid_row(db: &Database, idx: usize) -> String {
    let mut row = vec![b' '; GRID_COLUMNS];
    for literal in db.clause(idx).literals() {
        let column = db
            .term_name(literal.term())
            .strip_prefix('x')
            .and_then(|k| k.parse::<usize>().ok());
        if let Some(column) = column {
            if (1..=GRID_COLUMNS).contains(&column) {
                row[column - 1] = match literal.sign() {
                    Sign::Positive => b'T',
                    Sign::Negative => b'~',
                };
            }
        }
    }
    String::from_utf8(row).expect("grid rows are ascii")
}
