use chrono::TimeZone;
use form_replay::agent::error::FormError;
use form_replay::capture::snapshot_model::FormSnapshot;
use form_replay::replay::strategy::FillMode;
use form_replay::store::kv_store::{JsonFileStore, KeyValueStore, MemoryStore};
use form_replay::store::repository::{FILL_MODE_KEY, FormRepository, SAVED_FORMS_KEY};
use form_replay::store::transfer::{export_filename, export_json, merge_import, parse_import};
use serde_json::json;

fn snapshot(id: &str, timestamp: i64) -> FormSnapshot {
    FormSnapshot {
        id: id.into(),
        url: "https://example.com/signup".into(),
        title: "Sign up".into(),
        timestamp,
        fields: Vec::new(),
    }
}

fn memory_repo() -> FormRepository<MemoryStore> {
    let repo = FormRepository::new(MemoryStore::new());
    repo.initialize().unwrap();
    repo
}

fn ids(forms: &[FormSnapshot]) -> Vec<&str> {
    forms.iter().map(|f| f.id.as_str()).collect()
}

// ============================================================================
// Key-value stores
// ============================================================================

#[test]
fn memory_store_get_set_remove() {
    let store = MemoryStore::new();
    assert_eq!(store.get("k").unwrap(), None);

    store.set("k", json!([1, 2])).unwrap();
    assert_eq!(store.get("k").unwrap(), Some(json!([1, 2])));

    store.remove("k").unwrap();
    assert_eq!(store.get("k").unwrap(), None);
}

#[test]
fn json_file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");

    let store = JsonFileStore::new(&path);
    assert_eq!(store.get("fillMode").unwrap(), None);
    store.set("fillMode", json!("slow")).unwrap();
    store.set("savedForms", json!([])).unwrap();

    let reopened = JsonFileStore::new(&path);
    assert_eq!(reopened.get("fillMode").unwrap(), Some(json!("slow")));

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, json!({ "fillMode": "slow", "savedForms": [] }));
}

#[test]
fn json_file_store_rejects_non_object_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let err = JsonFileStore::new(&path).get("savedForms").unwrap_err();
    assert!(matches!(err, FormError::Store(_)));
}

#[test]
fn json_file_store_treats_blank_file_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "  \n").unwrap();

    assert_eq!(JsonFileStore::new(&path).get("savedForms").unwrap(), None);
}

// ============================================================================
// Repository
// ============================================================================

#[test]
fn initialize_creates_empty_collection_once() {
    let repo = FormRepository::new(MemoryStore::new());
    repo.initialize().unwrap();
    assert_eq!(repo.store().get(SAVED_FORMS_KEY).unwrap(), Some(json!([])));

    repo.insert(snapshot("form_1_a", 1)).unwrap();
    repo.initialize().unwrap();
    assert_eq!(repo.get().unwrap().len(), 1);
}

#[test]
fn insert_find_and_list_newest_first() {
    let repo = memory_repo();
    repo.insert(snapshot("old", 100)).unwrap();
    repo.insert(snapshot("new", 300)).unwrap();
    repo.insert(snapshot("mid", 200)).unwrap();

    assert_eq!(ids(&repo.get().unwrap()), vec!["old", "new", "mid"]);
    assert_eq!(ids(&repo.list().unwrap()), vec!["new", "mid", "old"]);
    assert_eq!(repo.find("mid").unwrap().unwrap().timestamp, 200);
    assert!(repo.find("missing").unwrap().is_none());
}

#[test]
fn deleting_every_snapshot_leaves_empty_collection() {
    let repo = memory_repo();
    repo.insert(snapshot("a", 1)).unwrap();
    repo.insert(snapshot("b", 2)).unwrap();

    assert!(repo.delete("a").unwrap());
    assert!(repo.delete("b").unwrap());
    assert!(!repo.delete("b").unwrap());

    assert!(repo.get().unwrap().is_empty());
    assert!(repo.list().unwrap().is_empty());
}

#[test]
fn reset_drops_everything() {
    let repo = memory_repo();
    repo.insert(snapshot("a", 1)).unwrap();
    repo.reset().unwrap();
    assert!(repo.get().unwrap().is_empty());
}

#[test]
fn fill_mode_defaults_to_instant() {
    let repo = memory_repo();
    assert_eq!(repo.fill_mode().unwrap(), FillMode::Instant);

    repo.set_fill_mode(FillMode::Paste).unwrap();
    assert_eq!(repo.fill_mode().unwrap(), FillMode::Paste);
    assert_eq!(repo.store().get(FILL_MODE_KEY).unwrap(), Some(json!("paste")));
}

#[test]
fn unknown_stored_fill_mode_falls_back_to_instant() {
    let repo = memory_repo();
    repo.store().set(FILL_MODE_KEY, json!("turbo")).unwrap();
    assert_eq!(repo.fill_mode().unwrap(), FillMode::Instant);
}

#[test]
fn repository_over_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forms.json");

    let repo = FormRepository::new(JsonFileStore::new(&path));
    repo.initialize().unwrap();
    repo.insert(snapshot("form_1_a", 1)).unwrap();
    repo.set_fill_mode(FillMode::Human).unwrap();

    let reopened = FormRepository::new(JsonFileStore::new(&path));
    assert_eq!(ids(&reopened.get().unwrap()), vec!["form_1_a"]);
    assert_eq!(reopened.fill_mode().unwrap(), FillMode::Human);
}

// ============================================================================
// Export / import
// ============================================================================

#[test]
fn export_is_pretty_printed_array() {
    let json = export_json(&[snapshot("a", 1)]).unwrap();

    assert!(json.starts_with("[\n  {\n    \"id\": \"a\""));
    let back: Vec<FormSnapshot> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, vec![snapshot("a", 1)]);
}

#[test]
fn export_filename_uses_timestamp_without_colons() {
    let at = chrono::Utc.with_ymd_and_hms(2026, 10, 17, 5, 48, 9).unwrap();
    assert_eq!(export_filename(at), "form-replay_export_2026-10-17T05-48-09.json");
}

#[test]
fn import_keeps_only_well_formed_entries() {
    let text = json!([
        { "id": "a", "url": "https://x.test", "title": "A", "timestamp": 1, "fields": [] },
        { "id": "b", "url": "https://x.test", "title": "B", "timestamp": 2 },
        { "id": "", "url": "https://x.test", "title": "C", "timestamp": 3, "fields": [] },
        { "id": "d", "url": "https://x.test", "title": "D", "timestamp": 4, "fields": "nope" },
        { "id": "e", "url": "https://x.test", "title": "E", "fields": [] },
        "not even an object"
    ])
    .to_string();

    let parsed = parse_import(&text).unwrap();
    assert_eq!(ids(&parsed), vec!["a", "e"]);
    assert_eq!(parsed[1].timestamp, 0);
}

#[test]
fn import_drops_undecodable_fields_but_keeps_the_form() {
    let text = json!([{
        "id": "a",
        "url": "https://x.test",
        "title": "A",
        "timestamp": 1,
        "fields": [
            { "type": "input", "inputType": "text", "id": "email", "value": "a@b.com", "index": 0 },
            { "type": "input", "id": "age", "value": 42 },
            { "type": "button", "id": "go", "value": "Go" },
            { "type": "textarea", "id": "bio", "value": "hi", "index": 0 }
        ]
    }])
    .to_string();

    let parsed = parse_import(&text).unwrap();

    assert_eq!(parsed.len(), 1);
    let kept: Vec<&str> = parsed[0].fields.iter().map(|f| f.identity.id.as_str()).collect();
    assert_eq!(kept, vec!["email", "bio"]);
}

#[test]
fn import_without_fields_yields_nothing() {
    let text = json!([{ "id": "a", "url": "https://x.test", "title": "A", "timestamp": 1 }]);
    assert!(parse_import(&text.to_string()).unwrap().is_empty());
}

#[test]
fn import_rejects_non_array() {
    let err = parse_import(r#"{"savedForms": []}"#).unwrap_err();
    assert!(matches!(err, FormError::InvalidImport(_)));

    let err = parse_import("not json").unwrap_err();
    assert!(matches!(err, FormError::JsonParse { .. }));
}

#[test]
fn merge_is_a_union_keyed_by_id() {
    let existing = vec![snapshot("a", 1), snapshot("b", 2)];
    let mut clash = snapshot("b", 99);
    clash.title = "Imported".into();

    let outcome = merge_import(&existing, vec![clash, snapshot("c", 3)]);

    assert_eq!(outcome.valid, 2);
    assert_eq!(ids(&outcome.added), vec!["c"]);
}

#[test]
fn merging_the_same_file_twice_adds_nothing_the_second_time() {
    let file = vec![snapshot("x", 1), snapshot("y", 2)];
    let mut stored = vec![snapshot("a", 0)];

    let first = merge_import(&stored, file.clone());
    stored.extend(first.added);
    let second = merge_import(&stored, file);

    assert_eq!(ids(&stored), vec!["a", "x", "y"]);
    assert!(second.added.is_empty());
    assert_eq!(second.valid, 2);
}

#[test]
fn duplicate_ids_inside_one_file_keep_the_first() {
    let mut later = snapshot("x", 2);
    later.title = "Second".into();

    let outcome = merge_import(&[], vec![snapshot("x", 1), later]);

    assert_eq!(outcome.added.len(), 1);
    assert_eq!(outcome.added[0].title, "Sign up");
}
