use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use finance_tracker::{
    BudgetPeriod, BudgetSettings, BudgetUpsert, ExpenseCategory, IncomeType, NewTransaction,
    NewUser, PasswordHash, TransactionDetails, ValidatedPassword, create_user, initialize_db,
    record_transaction, upsert_budget_for_period,
};

/// A utility for creating a test database for the finance tracker server.
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
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user test@example.com with the password \"test\"...");

    let user = create_user(
        NewUser {
            name: "Test User".to_owned(),
            email: "test@example.com".parse::<EmailAddress>()?,
            password_hash: PasswordHash::new(
                ValidatedPassword::new_unchecked("test"),
                PasswordHash::DEFAULT_COST,
            )?,
        },
        &conn,
    )?;

    let today = OffsetDateTime::now_utc().date();
    let month = u8::from(today.month());

    println!("Creating budgets for {month}/{}...", today.year());

    for (category, budget_amount) in [
        (ExpenseCategory::Food, 600.0),
        (ExpenseCategory::Transport, 200.0),
        (ExpenseCategory::Bills, 900.0),
    ] {
        upsert_budget_for_period(
            user.id,
            BudgetUpsert {
                category,
                month,
                year: today.year(),
                settings: BudgetSettings {
                    budget_amount,
                    period: BudgetPeriod::Monthly,
                    alert_threshold: 80,
                    alert_enabled: true,
                },
            },
            &conn,
        )?;
    }

    println!("Creating transactions...");

    let salary = NewTransaction {
        amount: 4200.0,
        date: today.replace_day(1)?,
        details: TransactionDetails::Income {
            source: "Employer".to_owned(),
            income_type: IncomeType::Salary,
            note: None,
        },
    };
    record_transaction(user.id, &salary, &mut conn)?;

    for (days_ago, amount, category, description) in [
        (0, 54.20, ExpenseCategory::Food, "Groceries"),
        (1, 18.50, ExpenseCategory::Transport, "Bus pass top up"),
        (3, 850.00, ExpenseCategory::Bills, "Rent"),
        (5, 120.00, ExpenseCategory::Food, "Dinner out"),
        (40, 75.00, ExpenseCategory::Shopping, "Jacket"),
        (70, 60.00, ExpenseCategory::Health, "Pharmacy"),
    ] {
        let expense = NewTransaction {
            amount,
            date: today - Duration::days(days_ago),
            details: TransactionDetails::Expense {
                category,
                description: Some(description.to_owned()),
            },
        };

        if let Some(alert) = record_transaction(user.id, &expense, &mut conn)?.1 {
            println!("Budget alert: {}", alert.message);
        }
    }

    println!("Success!");

    Ok(())
}
