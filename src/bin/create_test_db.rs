use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use expenseshub::{
    NewTransaction, TransactionKind, count_transactions, create_transaction, initialize_db,
    round_to_cents,
};

/// A utility for creating a test database for the ExpensesHub server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many days of sample transactions to create, counting back from today.
    #[arg(long, short, default_value_t = 90)]
    days: i64,
}

/// Expense descriptions for each of the default expense categories, by category ID.
const EXPENSES: [(i64, &str, f64); 5] = [
    (1, "Groceries", 42.35),
    (2, "Bus fare", 3.8),
    (3, "Power bill", 120.0),
    (4, "New shoes", 89.99),
    (5, "Haircut", 25.0),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating sample transactions for the last {} days...", args.days);

    let now = OffsetDateTime::now_utc();

    for day in 0..args.days {
        let date = now - Duration::days(day);

        // One or two expenses a day, cycling through the categories.
        for offset in 0..(1 + day % 2) {
            let (category_id, description, amount) =
                EXPENSES[((day + offset) % EXPENSES.len() as i64) as usize];

            create_transaction(
                NewTransaction {
                    kind: TransactionKind::Expense,
                    amount: round_to_cents(amount + (day % 7) as f64),
                    category_id,
                    description: description.to_owned(),
                    date: Some(date - Duration::hours(offset)),
                },
                now,
                &conn,
            )?;
        }

        if day % 14 == 0 {
            create_transaction(
                NewTransaction {
                    kind: TransactionKind::Income,
                    amount: 2_150.0,
                    category_id: 6,
                    description: "Salary".to_owned(),
                    date: Some(date),
                },
                now,
                &conn,
            )?;
        }

        if day % 30 == 5 {
            create_transaction(
                NewTransaction {
                    kind: TransactionKind::Income,
                    amount: 400.0,
                    category_id: 7,
                    description: "Website design".to_owned(),
                    date: Some(date),
                },
                now,
                &conn,
            )?;
        }
    }

    println!("Created {} transactions.", count_transactions(&conn)?);
    println!("Success!");

    Ok(())
}
