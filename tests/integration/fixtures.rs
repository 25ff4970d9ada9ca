// tests/integration/fixtures.rs

//! Common test fixtures: a small back-office dataset and record helpers.

#![allow(dead_code)]

use rpserver::core::protocol::Record;
use rpserver::core::storage::{Credentials, Dataset};
use serde_json::{Value, json};

pub const ADMIN_PASSWORD: &str = "0000";
pub const WAITER_PASSWORD: &str = "1234";
pub const WRONG_PASSWORD: &str = "wrong";

pub const DB_USER: &str = "SYSDBA";
pub const DB_PASSWORD: &str = "masterkey";

/// Builds a record from a `json!` object literal.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture record must be a JSON object, got {other}"),
    }
}

/// Two people, two item groups, three items, two tables.
pub fn sample_dataset() -> Dataset {
    Dataset {
        credentials: None,
        peoples: vec![
            record(json!({"people_id": 1, "people_name": "Administrator", "people_password": ADMIN_PASSWORD})),
            record(json!({"people_id": 2, "people_name": "Waiter", "people_password": WAITER_PASSWORD})),
        ],
        items_groups: vec![
            record(json!({"group_id": 1, "group_name": "Drinks"})),
            record(json!({"group_id": 2, "group_name": "Kitchen"})),
        ],
        items: vec![
            record(json!({"item_id": 10, "group_id": 1, "item_name": "Espresso", "price": 2.5})),
            record(json!({"item_id": 11, "group_id": 1, "item_name": "Tea", "price": 2.0})),
            record(json!({"item_id": 20, "group_id": 2, "item_name": "Soup", "price": 6.0})),
        ],
        tables: vec![
            record(json!({"table_id": 1, "table_name": "Table 1"})),
            record(json!({"table_id": 2, "table_name": "Table 2"})),
        ],
        table_busy: vec![
            record(json!({"table_id": 1, "busy": true})),
            record(json!({"table_id": 2, "busy": false})),
        ],
    }
}

/// The sample dataset, guarded by the default database credentials.
pub fn protected_dataset() -> Dataset {
    Dataset {
        credentials: Some(Credentials {
            user: DB_USER.to_string(),
            password: DB_PASSWORD.to_string(),
        }),
        ..sample_dataset()
    }
}
