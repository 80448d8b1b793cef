/*!
 * Copy Observer Tests
 * Prop seeding, mount/unmount wiring and misuse errors
 */

use crosstab_clipboard::{
    on_copy, Clipboard, ClipboardError, ClipboardPayload, ContextStore, CopyOptions,
    LifecycleHooks, SharedStore,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

/// Stand-in for a UI component with a clipboard handler
#[derive(Default)]
struct Editor {
    received: Mutex<Vec<(Option<Value>, Option<Value>, Option<String>)>>,
}

impl Editor {
    fn on_clip(
        &self,
        new: Option<&ClipboardPayload>,
        old: Option<&ClipboardPayload>,
        url: Option<&str>,
    ) {
        self.received.lock().push((
            new.map(|p| p.content.clone()),
            old.map(|p| p.content.clone()),
            url.map(str::to_string),
        ));
    }

    fn received(&self) -> Vec<(Option<Value>, Option<Value>, Option<String>)> {
        self.received.lock().clone()
    }
}

fn tab(store: &SharedStore, address: &str) -> (Arc<ContextStore>, Arc<Clipboard>) {
    let context = Arc::new(store.context_at(address));
    let clipboard = Arc::new(Clipboard::new(context.clone()));
    (context, clipboard)
}

#[test]
fn test_mount_without_component_fails() {
    let store = SharedStore::new();
    let (_context, clipboard) = tab(&store, "https://app.test/a");
    let hooks = on_copy(clipboard.clone(), Editor::on_clip, "clipProp");

    let result = hooks.did_mount(None);
    assert!(matches!(result, Err(ClipboardError::InvalidUsage(_))));
    assert!(!hooks.is_attached());
    assert_eq!(clipboard.remote_listener_count(), 0);
}

#[test]
fn test_inject_props_seeds_current_value() {
    let store = SharedStore::new();
    let (_context, clipboard) = tab(&store, "https://app.test/a");
    clipboard
        .copy(json!("seed"), CopyOptions::new().with_type("text"))
        .unwrap();

    let hooks = on_copy(clipboard, Editor::on_clip, "clipProp");
    let mut props = Vec::new();
    hooks
        .inject_props(&mut |name, value| props.push((name.to_string(), value)))
        .unwrap();

    assert_eq!(props.len(), 1);
    assert_eq!(props[0].0, "clipProp");
    let seeded = props[0].1.clone().unwrap();
    assert_eq!(seeded.content, json!("seed"));
    assert_eq!(seeded.kind.as_deref(), Some("text"));
}

#[test]
fn test_inject_props_on_empty_clipboard() {
    let store = SharedStore::new();
    let (_context, clipboard) = tab(&store, "https://app.test/a");
    let hooks = on_copy(clipboard, Editor::on_clip, "clipProp");

    let mut seeded: Option<Option<ClipboardPayload>> = None;
    hooks
        .inject_props(&mut |_, value| seeded = Some(value))
        .unwrap();
    assert_eq!(seeded, Some(None));
}

#[test]
fn test_inject_props_keeps_content_with_bad_type() {
    let store = SharedStore::new();
    let (context, clipboard) = tab(&store, "https://app.test/a");
    crosstab_clipboard::StorageAdapter::set(
        context.as_ref(),
        clipboard.key(),
        &json!({"content": "text", "type": ["not", "a", "string"]}),
    )
    .unwrap();

    let hooks = on_copy(clipboard, Editor::on_clip, "clipProp");
    let mut seeded = None;
    hooks
        .inject_props(&mut |_, value| seeded = value)
        .unwrap();

    let seeded = seeded.unwrap();
    assert_eq!(seeded.content, json!("text"));
    assert_eq!(seeded.kind, None);
}

#[test]
fn test_mount_unmount_restores_listener_counts() {
    let store = SharedStore::new();
    let (_context, clipboard) = tab(&store, "https://app.test/a");
    let before = (clipboard.local_listener_count(), clipboard.remote_listener_count());

    let hooks = on_copy(clipboard.clone(), Editor::on_clip, "clipProp").listen_on_local_changes(true);
    let editor = Arc::new(Editor::default());

    hooks.did_mount(Some(&editor)).unwrap();
    assert_eq!(clipboard.local_listener_count(), before.0 + 1);
    assert_eq!(clipboard.remote_listener_count(), before.1 + 1);

    hooks.will_unmount();
    assert_eq!(
        (clipboard.local_listener_count(), clipboard.remote_listener_count()),
        before
    );
    assert!(!hooks.is_attached());
}

#[test]
fn test_remote_changes_reach_component() {
    let store = SharedStore::new();
    let (context_a, clipboard_a) = tab(&store, "https://app.test/a");
    let (_context_b, clipboard_b) = tab(&store, "https://app.test/b");

    let hooks = on_copy(clipboard_a.clone(), Editor::on_clip, "clipProp");
    let editor = Arc::new(Editor::default());
    hooks.attach(&editor).unwrap();

    // Local copies are not delivered unless enabled
    clipboard_a.copy(json!("local"), CopyOptions::new()).unwrap();
    context_a.dispatch_pending();
    assert!(editor.received().is_empty());

    clipboard_b.copy(json!("remote"), CopyOptions::new()).unwrap();
    context_a.dispatch_pending();
    assert_eq!(
        editor.received(),
        vec![(
            Some(json!("remote")),
            Some(json!("local")),
            Some("https://app.test/b".to_string())
        )]
    );

    assert!(hooks.detach());
    clipboard_b.copy(json!("ignored"), CopyOptions::new()).unwrap();
    context_a.dispatch_pending();
    assert_eq!(editor.received().len(), 1);
}

#[test]
fn test_local_changes_when_enabled() {
    let store = SharedStore::new();
    let (_context, clipboard) = tab(&store, "https://app.test/a");

    let hooks = on_copy(clipboard.clone(), Editor::on_clip, "clipProp").listen_on_local_changes(true);
    let editor = Arc::new(Editor::default());
    hooks.attach(&editor).unwrap();

    clipboard.copy(json!("typed"), CopyOptions::new()).unwrap();
    assert_eq!(
        editor.received(),
        vec![(
            Some(json!("typed")),
            None,
            Some("https://app.test/a".to_string())
        )]
    );
}

#[test]
fn test_remount_after_unmount() {
    let store = SharedStore::new();
    let (_context, clipboard) = tab(&store, "https://app.test/a");
    let hooks = on_copy(clipboard.clone(), Editor::on_clip, "clipProp");

    let first = Arc::new(Editor::default());
    hooks.did_mount(Some(&first)).unwrap();
    assert!(matches!(
        hooks.did_mount(Some(&first)),
        Err(ClipboardError::AlreadyAttached)
    ));

    hooks.will_unmount();
    let second = Arc::new(Editor::default());
    hooks.did_mount(Some(&second)).unwrap();
    assert_eq!(clipboard.remote_listener_count(), 1);

    // Unmounting twice is harmless
    hooks.will_unmount();
    hooks.will_unmount();
    assert_eq!(clipboard.remote_listener_count(), 0);
}
