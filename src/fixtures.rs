//! Test data shared by the API and browser suites.

use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};

use crate::api::models::CreateTransactionRequest;

pub const DEFAULT_SIGNUP_PASSWORD: &str = "defaultPassword123";
pub const LOGIN_ERROR: &str = "Hm... that username and/or password didn't work.";
pub const EMAIL_TAKEN_ERROR: &str = "Email is already taken. Already have a Household? Log in »";
pub const EMPTY_ENVELOPE_NAME_ERROR: &str = "Envelopes need a name.";
pub const INVALID_AMOUNT_ERROR: &str =
    "Please enter amount with no commas, letters, or symbols. Use positive amounts with 8 digits or less.";

/// Budget inputs the envelope editor must reject.
pub const INVALID_BUDGET_AMOUNTS: [&str; 3] = ["abc", "100,50", "$100.50"];

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn transaction(amount: f64, description: &str, category: &str, envelope_id: &str) -> CreateTransactionRequest {
    CreateTransactionRequest {
        amount,
        description: description.to_string(),
        category: category.to_string(),
        date: "2024-06-01".to_string(),
        envelope_id: envelope_id.to_string(),
        account_id: "acc_checking_001".to_string(),
    }
}

pub fn test_transactions() -> [CreateTransactionRequest; 3] {
    [
        transaction(-25.50, "Coffee at Starbucks", "Food & Dining", "env_food_001"),
        transaction(-120.00, "Grocery shopping", "Groceries", "env_groceries_001"),
        transaction(2500.00, "Monthly salary", "Income", "env_income_001"),
    ]
}

/// Payload without an amount.
pub fn missing_amount() -> Value {
    json!({
        "description": "Test transaction",
        "category": "Test",
        "date": "2024-06-01",
        "envelope_id": "env_test_001",
        "account_id": "acc_test_001"
    })
}

/// Payload whose amount is not a number.
pub fn invalid_amount() -> Value {
    json!({
        "amount": "invalid",
        "description": "Test transaction",
        "category": "Test",
        "date": "2024-06-01",
        "envelope_id": "env_test_001",
        "account_id": "acc_test_001"
    })
}

/// `test_<epoch ms>_<9 base36 chars>`
pub fn generate_unique_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("test_{}_{}", Utc::now().timestamp_millis(), suffix)
}

pub fn unique_envelope_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_millis())
}

pub fn unique_signup_email() -> String {
    format!("testuser_{}@example.com", Utc::now().timestamp_millis())
}
