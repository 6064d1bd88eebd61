//! Seed data for fresh databases
//!
//! Both helpers are idempotent: they skip seeding when the target
//! collection already has rows.

use chrono::{TimeZone, Utc};

use crate::storage::{
    GadgetStore, NewGadget, NewStatement, StatementStore, StorageError, StorageResult,
    TransactionType,
};

/// Store catalog used for fresh installs and `--in-memory` mode.
#[must_use]
pub fn gadget_catalog() -> Vec<NewGadget> {
    vec![
        NewGadget::new(
            "Pocket Drone",
            "Foldable quadcopter with a 4K camera and 20 minutes of flight time.",
            "https://images.finova.example/gadgets/pocket-drone.png",
            129.99,
        ),
        NewGadget::new(
            "Noise-Cancelling Earbuds",
            "True wireless earbuds with adaptive noise cancellation.",
            "https://images.finova.example/gadgets/earbuds.png",
            89.5,
        ),
        NewGadget::new(
            "Smart Ring",
            "Sleep, heart rate and activity tracking in a titanium ring.",
            "https://images.finova.example/gadgets/smart-ring.png",
            249.0,
        ),
        NewGadget::new(
            "Mechanical Keyboard",
            "Hot-swappable 75% keyboard with tactile switches.",
            "https://images.finova.example/gadgets/keyboard.png",
            74.0,
        ),
        NewGadget::new(
            "USB-C Power Bank",
            "20,000 mAh with 65 W passthrough charging.",
            "https://images.finova.example/gadgets/power-bank.png",
            39.99,
        ),
        NewGadget::new(
            "Holographic Display",
            "Limited edition showcase unit. Not for sale.",
            "https://images.finova.example/gadgets/holo.png",
            0.0,
        )
        .unpriced(),
    ]
}

/// Bank transactions used for fresh installs and `--in-memory` mode.
#[must_use]
#[rustfmt::skip]
pub fn statement_fixtures() -> Vec<NewStatement> {
    let rows = [
        ("4532-1234-5678-9012", "John Smith", TransactionType::Debit, 150.00, "Online Purchase - Electronics", "Amazon", ["shopping", "online"], (15, 10, 30, 0), "COMPLETED"),
        ("4532-1234-5678-9012", "John Smith", TransactionType::Credit, 2500.00, "Salary Deposit", "TechCorp Inc", ["salary", "income"], (1, 9, 0, 0), "COMPLETED"),
        ("5678-9012-3456-7890", "Sarah Johnson", TransactionType::Debit, 85.50, "Grocery Shopping", "Walmart", ["groceries", "food"], (16, 14, 15, 0), "COMPLETED"),
        ("5678-9012-3456-7890", "Sarah Johnson", TransactionType::Debit, 1200.00, "Monthly Rent Payment", "Riverside Property Management", ["rent", "housing"], (1, 8, 0, 0), "COMPLETED"),
        ("9012-3456-7890-1234", "Michael Brown", TransactionType::Credit, 500.00, "Freelance Web Design Payment", "Creative Design Studio", ["freelance", "income"], (17, 16, 45, 0), "PENDING"),
        ("9012-3456-7890-1234", "Michael Brown", TransactionType::Debit, 75.00, "Fuel Purchase", "Shell Gas Station", ["fuel", "transport"], (16, 11, 20, 0), "COMPLETED"),
        ("3456-7890-1234-5678", "Emily Davis", TransactionType::Debit, 250.00, "Medical Consultation Fee", "City General Hospital", ["healthcare", "medical"], (14, 13, 30, 0), "COMPLETED"),
        ("3456-7890-1234-5678", "Emily Davis", TransactionType::Credit, 3200.00, "Monthly Salary Deposit", "HealthCare Solutions Corp", ["salary", "income"], (1, 9, 15, 0), "COMPLETED"),
        ("4532-1234-5678-9012", "John Smith", TransactionType::Debit, 45.99, "Coffee & Lunch", "Starbucks", ["food", "dining"], (18, 12, 15, 0), "COMPLETED"),
        ("5678-9012-3456-7890", "Sarah Johnson", TransactionType::Credit, 150.00, "Cashback Reward", "FinovaBank Rewards", ["rewards", "cashback"], (19, 10, 0, 0), "COMPLETED"),
        ("9012-3456-7890-1234", "Michael Brown", TransactionType::Debit, 299.99, "Software Subscription", "Adobe Creative Cloud", ["software", "subscription"], (20, 9, 30, 0), "COMPLETED"),
        ("3456-7890-1234-5678", "Emily Davis", TransactionType::Debit, 120.00, "Pharmacy - Prescription", "CVS Pharmacy", ["healthcare", "pharmacy"], (21, 14, 45, 0), "COMPLETED"),
    ];

    rows.into_iter()
        .filter_map(
            |(account, customer, kind, amount, description, merchant, categories, (day, h, m, s), status)| {
                let transaction_date = Utc.with_ymd_and_hms(2025, 1, day, h, m, s).single()?;
                Some(NewStatement {
                    account_number: account.to_string(),
                    customer_name: customer.to_string(),
                    transaction_type: kind,
                    amount,
                    description: description.to_string(),
                    merchant_name: merchant.to_string(),
                    categories: categories.iter().map(|c| (*c).to_string()).collect(),
                    transaction_date,
                    status: status.to_string(),
                })
            },
        )
        .collect()
}

/// Insert the gadget catalog if the store is empty.
///
/// Returns the number of inserted gadgets.
///
/// # Errors
/// Propagates storage errors.
pub async fn seed_gadgets(store: &dyn GadgetStore) -> StorageResult<usize> {
    if !store.list_gadgets().await?.is_empty() {
        tracing::info!("Gadget catalog already present, skipping seed");
        return Ok(0);
    }

    let catalog = gadget_catalog();
    for gadget in &catalog {
        store.insert_gadget(gadget).await?;
    }
    tracing::info!(count = catalog.len(), "Seeded gadget catalog");
    Ok(catalog.len())
}

/// Insert the statement fixtures if the collection is empty.
///
/// Returns the number of inserted statements.
///
/// # Errors
/// Propagates storage errors.
pub async fn seed_statements(store: &dyn StatementStore) -> StorageResult<usize> {
    if store.count_statements().await? > 0 {
        tracing::info!("Statements already present, skipping seed");
        return Ok(0);
    }

    let fixtures = statement_fixtures();
    for statement in &fixtures {
        store.insert_statement(statement).await?;
    }

    let total = store.count_statements().await?;
    if total < fixtures.len() {
        return Err(StorageError::internal(format!(
            "seeded {} statements but only {total} are visible",
            fixtures.len()
        )));
    }

    tracing::info!(count = fixtures.len(), "Seeded statements collection");
    Ok(fixtures.len())
}
