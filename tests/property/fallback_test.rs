// tests/property/fallback_test.rs

//! Property-based tests for the fallback envelope.
//! Any frame that is not a JSON object naming a known command must produce
//! exactly the unknown-command response.

use crate::fixtures::sample_dataset;
use proptest::prelude::*;
use rpserver::core::commands::ALL_COMMANDS;
use rpserver::core::protocol::UNKNOWN_CMD_JSON;
use rpserver::core::storage::MemoryStore;
use rpserver::core::{CommandRegistry, Dispatcher};
use serde_json::{Value, json};
use std::sync::Arc;

fn dispatcher() -> Dispatcher {
    Dispatcher::new(
        Arc::new(CommandRegistry::standard()),
        Arc::new(MemoryStore::new(sample_dataset())),
    )
}

fn dispatch(raw: &str) -> String {
    tokio_test::block_on(dispatcher().dispatch(raw))
}

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        ".{0,20}".prop_map(Value::from),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_arbitrary_text_never_fails(raw in ".{0,200}") {
        let response = dispatch(&raw);
        let value: Value = serde_json::from_str(&response).unwrap();
        prop_assert!(value["res"].is_string());
        prop_assert!(value["err"].is_i64());
    }

    #[test]
    fn test_unknown_command_names_get_fallback(cmd in "[a-zA-Z_]{0,24}") {
        prop_assume!(!ALL_COMMANDS.contains(&cmd.as_str()));
        let raw = json!({ "cmd": cmd }).to_string();
        prop_assert_eq!(dispatch(&raw), UNKNOWN_CMD_JSON);
    }

    #[test]
    fn test_non_object_json_gets_fallback(leaf in json_leaf(), len in 0usize..4) {
        let raw = json!(vec![leaf.clone(); len]).to_string();
        prop_assert_eq!(dispatch(&raw), UNKNOWN_CMD_JSON);
        prop_assert_eq!(dispatch(&leaf.to_string()), UNKNOWN_CMD_JSON);
    }

    #[test]
    fn test_non_string_cmd_gets_fallback(leaf in json_leaf()) {
        prop_assume!(!leaf.is_string());
        let raw = json!({ "cmd": leaf }).to_string();
        prop_assert_eq!(dispatch(&raw), UNKNOWN_CMD_JSON);
    }

    #[test]
    fn test_known_commands_echo_res(
        index in 0usize..ALL_COMMANDS.len(),
        extra in prop::collection::hash_map("[a-z]{1,8}", json_leaf(), 0..4)
    ) {
        let cmd = ALL_COMMANDS[index];
        let mut request = serde_json::Map::new();
        for (key, value) in extra {
            request.insert(key, value);
        }
        request.insert("cmd".into(), json!(cmd));

        let value: Value = serde_json::from_str(&dispatch(&Value::Object(request).to_string())).unwrap();
        prop_assert_eq!(&value["res"], &json!(cmd));
    }
}
