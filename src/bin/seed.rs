use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use fintrack::{
    budget::{NewBudget, upsert_budget},
    category::Category,
    initialize_db,
    month::Month,
    transaction::{NewTransaction, create_transaction},
};

/// A utility for creating a database populated with sample data.
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
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating sample transactions...");

    let samples = [
        ("Weekly groceries", 85.5, Category::Groceries),
        ("Monthly rent", 1200.0, Category::Rent),
        ("Dinner out", 42.75, Category::FoodDining),
        ("Bus pass", 65.0, Category::Transportation),
        ("Streaming subscription", 15.99, Category::Entertainment),
        ("Electricity bill", 89.3, Category::BillsUtilities),
        ("New shoes", 120.0, Category::Shopping),
        ("Pharmacy", 23.4, Category::Healthcare),
    ];

    let mut count = 0;
    for month in Month::current().trailing(3) {
        for (day_offset, (description, amount, category)) in samples.iter().enumerate() {
            let date = month
                .first_day()
                .saturating_add(time::Duration::days(3 * day_offset as i64));

            create_transaction(
                NewTransaction::new(description, *amount, date, *category)?,
                &connection,
            )?;
            count += 1;
        }
    }
    println!("Created {count} transactions.");

    println!("Creating sample budgets...");

    let budgets = [
        (Category::Groceries, 400.0),
        (Category::FoodDining, 200.0),
        (Category::Entertainment, 100.0),
        (Category::Shopping, 150.0),
    ];

    for month in [Month::current().pred(), Month::current()] {
        for (category, amount) in budgets {
            upsert_budget(NewBudget::new(category, amount, month)?, &connection)?;
        }
    }
    println!("Created {} budgets.", budgets.len() * 2);

    println!("Success!");

    Ok(())
}
