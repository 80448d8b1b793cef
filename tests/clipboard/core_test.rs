/*!
 * Clipboard Core Tests
 * Copy, paste, accessors and clear on a single context
 */

use crosstab_clipboard::{Clipboard, CopyOptions, SharedStore, DEFAULT_CLIPBOARD_KEY};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn clipboard() -> (SharedStore, Clipboard) {
    let store = SharedStore::new();
    let clipboard = Clipboard::new(Arc::new(store.context()));
    (store, clipboard)
}

#[test]
fn test_copy_paste() {
    let (_store, clipboard) = clipboard();

    clipboard
        .copy(json!({"a": 1}), CopyOptions::new().with_type("x"))
        .unwrap();

    assert!(clipboard.has_data().unwrap());
    assert_eq!(clipboard.paste().unwrap(), Some(json!({"a": 1})));
    assert_eq!(clipboard.get_type().unwrap(), Some("x".to_string()));
}

#[test]
fn test_copy_replaces_whole_payload() {
    let (_store, clipboard) = clipboard();

    clipboard
        .copy(
            json!({"a": 1}),
            CopyOptions::new()
                .with_type("x")
                .with_description("first")
                .with_metadata(json!({"k": "v"})),
        )
        .unwrap();
    clipboard.copy(json!({"a": 2}), CopyOptions::new()).unwrap();

    // No field carry-over from the previous payload
    assert_eq!(clipboard.paste().unwrap(), Some(json!({"a": 2})));
    assert_eq!(clipboard.get_type().unwrap(), None);
    assert_eq!(clipboard.get_description().unwrap(), None);
    assert_eq!(clipboard.get_metadata().unwrap(), None);
}

#[test]
fn test_payload_is_stored_under_well_known_key() {
    let (store, clipboard) = clipboard();

    clipboard
        .copy(json!("text"), CopyOptions::new().with_description("note"))
        .unwrap();

    assert_eq!(
        store.get(DEFAULT_CLIPBOARD_KEY).unwrap(),
        Some(json!({"content": "text", "description": "note"}))
    );
}

#[test]
fn test_falsy_options_are_not_stored() {
    let (store, clipboard) = clipboard();

    clipboard
        .copy(
            json!("text"),
            CopyOptions::new()
                .with_type("")
                .with_description("")
                .with_metadata(json!(false)),
        )
        .unwrap();

    assert_eq!(
        store.get(DEFAULT_CLIPBOARD_KEY).unwrap(),
        Some(json!({"content": "text"}))
    );
}

#[test]
fn test_clear() {
    let (store, clipboard) = clipboard();

    clipboard.copy(json!("data"), CopyOptions::new()).unwrap();
    clipboard.clear().unwrap();

    assert!(!clipboard.has_data().unwrap());
    assert_eq!(clipboard.paste().unwrap(), None);
    assert!(store.is_empty());

    // Clearing an empty clipboard is fine
    clipboard.clear().unwrap();
}

/// Falsy content is "present" for has_data but "absent" for paste.
/// This asymmetry is kept on purpose and pinned here.
#[test]
fn test_falsy_content_asymmetry() {
    let (_store, clipboard) = clipboard();

    for content in [json!(0), json!(""), json!(false), Value::Null] {
        clipboard.copy(content.clone(), CopyOptions::new()).unwrap();
        assert!(clipboard.has_data().unwrap(), "has_data for {}", content);
        assert_eq!(clipboard.paste().unwrap(), None, "paste for {}", content);

        // The full payload still carries it
        assert_eq!(clipboard.current().unwrap().unwrap().content, content);
    }
}

#[test]
fn test_foreign_value_under_key() {
    let (store, clipboard) = clipboard();
    let tab = store.context();

    // Something else wrote a non-payload value under the clipboard key
    crosstab_clipboard::StorageAdapter::set(&tab, DEFAULT_CLIPBOARD_KEY, &json!({"type": "x"}))
        .unwrap();

    assert!(!clipboard.has_data().unwrap());
    assert_eq!(clipboard.paste().unwrap(), None);
    assert_eq!(clipboard.get_type().unwrap(), Some("x".to_string()));
    assert_eq!(clipboard.current().unwrap(), None);
}

#[test]
fn test_stats() {
    let (_store, clipboard) = clipboard();
    assert!(!clipboard.stats().unwrap().has_data);

    clipboard.copy(json!(1), CopyOptions::new()).unwrap();
    clipboard.add_local_listener(crosstab_clipboard::ClipboardListener::new(|_, _, _| {}));

    let stats = clipboard.stats().unwrap();
    assert!(stats.has_data);
    assert_eq!(stats.local_listeners, 1);
    assert_eq!(stats.remote_listeners, 0);
}

fn short_string() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 0..8).prop_map(|chars| chars.into_iter().collect())
}

fn json_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        short_string().prop_map(Value::from),
    ]
}

proptest! {
    #[test]
    fn prop_paste_iff_truthy_has_data_always(content in json_scalar()) {
        let (_store, clipboard) = clipboard();
        clipboard.copy(content.clone(), CopyOptions::new()).unwrap();

        prop_assert!(clipboard.has_data().unwrap());
        let expected = crosstab_clipboard::is_truthy(&content).then(|| content.clone());
        prop_assert_eq!(clipboard.paste().unwrap(), expected);
    }

    #[test]
    fn prop_type_kept_iff_non_empty(kind in short_string()) {
        let (_store, clipboard) = clipboard();
        clipboard
            .copy(json!("c"), CopyOptions::new().with_type(kind.clone()))
            .unwrap();

        let expected = (!kind.is_empty()).then(|| kind.clone());
        prop_assert_eq!(clipboard.get_type().unwrap(), expected);
    }
}
