//! # Seed Data Generator
//!
//! Populates the database with demo users and expenses for development,
//! then logs the resulting balance sheet.
//!
//! ## Usage
//! ```bash
//! # Use DIVVY_* environment configuration
//! cargo run -p divvy-db --bin seed
//!
//! # Specify database path
//! cargo run -p divvy-db --bin seed -- --db ./data/divvy.db
//!
//! # More logging
//! RUST_LOG=debug cargo run -p divvy-db --bin seed
//! ```
//!
//! ## Generated Data
//! - Four users
//! - One expense per split method, submitted as JSON payloads the way a
//!   client would send them

use std::env;

use divvy_core::{ExpensePayload, NewUser, User};
use divvy_db::{Database, DbConfig};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Demo users: (name, email, mobile)
const USERS: &[(&str, &str, &str)] = &[
    ("Asha", "asha@example.com", "+919800000001"),
    ("Ben", "ben@example.com", "+447700900002"),
    ("Chloe", "chloe@example.com", "5550100003"),
    ("Dev", "dev@example.com", "5550100004"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Divvy Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: from DIVVY_* env)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let config = match db_path {
        Some(path) => DbConfig::new(path),
        None => DbConfig::from_env()?,
    };
    let db = Database::new(config).await?;

    let existing = db.users().count().await?;
    if existing > 0 {
        warn!(users = existing, "Database already seeded, skipping");
        return Ok(());
    }

    let mut users: Vec<User> = Vec::with_capacity(USERS.len());
    for (name, email, mobile) in USERS {
        let user = db
            .users()
            .create(&NewUser {
                name: name.to_string(),
                email: email.to_string(),
                mobile: mobile.to_string(),
            })
            .await?;
        users.push(user);
    }
    info!(count = users.len(), "Users created");

    for payload in demo_payloads(&users) {
        let description = payload.description.clone();
        match db.expenses().create_from_payload(payload).await {
            Ok(entry) => info!(
                id = %entry.expense.id,
                description = %description,
                amount = %entry.expense.amount(),
                "Expense recorded"
            ),
            Err(e) => error!(description = %description, error = %e, "Expense rejected"),
        }
    }

    let sheet = db.ledger().balance_sheet().await?;
    for row in sheet.entries() {
        info!(
            name = %row.name,
            paid = %row.total_paid,
            owed = %row.total_owed,
            net = %row.net_balance,
            "Balance"
        );
    }
    info!(sheet = %serde_json::to_string(&sheet)?, "Seed complete");

    db.close().await;
    Ok(())
}

/// Initializes tracing with `RUST_LOG`, defaulting to debug for divvy crates.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,divvy=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// One payload per split method, plus one that is rejected.
fn demo_payloads(users: &[User]) -> Vec<ExpensePayload> {
    let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
    let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);

    let raw = [
        format!(
            r#"{{"payer_id": "{a}", "amount": 300, "description": "Dinner",
                "split_method": "equal", "participants": ["{a}", "{b}", "{c}"]}}"#
        ),
        format!(
            r#"{{"payer_id": "{b}", "amount": "1000", "description": "Weekend cabin",
                "split_method": "percentage",
                "splits": [{{"user_id": "{a}", "percentage": 50}},
                           {{"user_id": "{b}", "percentage": 30}},
                           {{"user_id": "{d}", "percentage": 20}}]}}"#
        ),
        format!(
            r#"{{"payer_id": "{c}", "amount": "85.40", "description": "Groceries",
                "split_method": "exact",
                "splits": [{{"user_id": "{c}", "amount": "45.40"}},
                           {{"user_id": "{d}", "amount": 40}}]}}"#
        ),
        format!(
            r#"{{"payer_id": "{d}", "amount": 60, "description": "Taxi",
                "split_method": "percentage",
                "splits": [{{"user_id": "{a}", "percentage": 50}},
                           {{"user_id": "{d}", "percentage": 60}}]}}"#
        ),
    ];

    raw.iter()
        .filter_map(|json| match ExpensePayload::from_json(json) {
            Ok(payload) => Some(payload),
            Err(e) => {
                error!(error = %e, "Malformed demo payload");
                None
            }
        })
        .collect()
}
