//! # Seed Data Generator
//!
//! Populates a rental database with its default data, and optionally with a
//! small demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Memberships and booking types only
//! cargo run -p rental-db --bin seed
//!
//! # Plus demo cars, drivers and customers
//! cargo run -p rental-db --bin seed -- --demo
//!
//! # Specify database path
//! cargo run -p rental-db --bin seed -- --db ./data/rental.db
//! ```

use rental_core::validation::{validate_new_car, validate_new_customer, validate_new_driver};
use rental_core::{Money, NewCar, NewCustomer, NewDriver};
use rental_db::seed::seed_defaults;
use rental_db::{Database, DbConfig};
use std::env;
use tracing_subscriber::EnvFilter;

/// Demo cars as `(name, stock, daily rent)`.
const DEMO_CARS: &[(&str, i64, i64)] = &[
    ("Toyota Avanza", 3, 350_000),
    ("Honda Brio", 2, 250_000),
    ("Toyota Innova Reborn", 2, 550_000),
    ("Mitsubishi Pajero Sport", 1, 1_200_000),
];

/// Demo drivers as `(name, nik, phone, daily cost)`.
const DEMO_DRIVERS: &[(&str, &str, &str, i64)] = &[
    ("Joko Susilo", "3174010101800001", "081211110001", 150_000),
    ("Agus Pratama", "3174010101850002", "081211110002", 175_000),
];

/// Demo customers as `(name, nik, phone, membership)`.
const DEMO_CUSTOMERS: &[(&str, &str, &str, Option<&str>)] = &[
    ("Budi Santoso", "3171010101900001", "081300000001", Some("Gold")),
    ("Siti Rahayu", "3171010101920002", "081300000002", Some("Bronze")),
    ("Dewi Lestari", "3171010101950003", "081300000003", None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut demo = false;
    let mut db_path = String::from("./rental_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--demo" => demo = true,
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Car Rental Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./rental_dev.db)");
                println!("      --demo         Also insert demo cars, drivers and customers");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {other}"),
        }
        i += 1;
    }

    println!("Car Rental Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let report = seed_defaults(&db).await?;
    println!(
        "✓ Defaults: {} memberships, {} booking types inserted",
        report.memberships, report.booking_types
    );

    if demo {
        seed_demo(&db).await?;
    }

    println!();
    println!("✓ Seed complete!");
    Ok(())
}

async fn seed_demo(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let existing = db.cars().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} cars", existing);
        println!("  Skipping demo data to avoid duplicates.");
        return Ok(());
    }

    for (name, stock, daily_rent) in DEMO_CARS {
        let input = NewCar {
            name: (*name).to_string(),
            stock: *stock,
            daily_rent_cents: Money::from_major(*daily_rent).cents(),
        };
        validate_new_car(&input)?;
        db.cars().create(&input).await?;
    }
    println!("✓ {} demo cars", DEMO_CARS.len());

    for (name, nik, phone, daily_cost) in DEMO_DRIVERS {
        let input = NewDriver {
            name: (*name).to_string(),
            nik: (*nik).to_string(),
            phone_number: (*phone).to_string(),
            daily_cost_cents: Money::from_major(*daily_cost).cents(),
        };
        validate_new_driver(&input)?;
        db.drivers().create(&input).await?;
    }
    println!("✓ {} demo drivers", DEMO_DRIVERS.len());

    for (name, nik, phone, membership) in DEMO_CUSTOMERS {
        let membership_id = match membership {
            Some(plan) => db.memberships().get_by_name(plan).await?.map(|m| m.id),
            None => None,
        };
        let input = NewCustomer {
            name: (*name).to_string(),
            nik: (*nik).to_string(),
            phone_number: (*phone).to_string(),
            membership_id,
        };
        validate_new_customer(&input)?;
        db.customers().create(&input).await?;
    }
    println!("✓ {} demo customers", DEMO_CUSTOMERS.len());

    Ok(())
}
