use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use moneta_rs::{PasswordHash, ValidatedPassword, initialize_db};

/// A utility for creating a test database for the Moneta server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

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

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    conn.execute(
        "INSERT INTO user (email, password) VALUES (?1, ?2)",
        ("test@example.com", password_hash.to_string()),
    )?;
    let user_id = conn.last_insert_rowid();

    println!("Creating test transactions...");

    let today = OffsetDateTime::now_utc().date();
    let sample_rows: [(&str, f64, i64, &str, &str); 8] = [
        ("income", 55000.0, 0, "Salary", "Monthly salary"),
        ("expense", 15000.0, 1, "Rent", "Monthly rent"),
        ("expense", 2200.0, 3, "Groceries", "Weekly shop"),
        ("expense", 600.0, 5, "Transport", "Metro card top up"),
        ("expense", 1800.0, 12, "Entertainment", "Concert tickets"),
        ("income", 8000.0, 20, "Freelance", "Logo design"),
        ("expense", 2500.0, 45, "Healthcare", "Dentist"),
        ("expense", 3200.0, 90, "Shopping", "Winter clothes"),
    ];

    for (kind, amount, days_ago, category, description) in sample_rows {
        conn.execute(
            "INSERT INTO \"transaction\" (date, amount, kind, category, description, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                today - Duration::days(days_ago),
                amount,
                kind,
                category,
                description,
                user_id,
            ),
        )?;
    }

    println!("Success!");

    Ok(())
}
