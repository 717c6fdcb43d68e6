use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;

use crate::{
    load_json_document, write_json_document, Clock, EditorSettings, JsonFileSettings,
    ManagerSettings, IGNORED_PACKAGES_KEY,
};

#[derive(Default)]
struct CountingClock {
    sleeps: AtomicUsize,
}

impl Clock for CountingClock {
    fn sleep(&self, _duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn missing_document_yields_default() {
    let dir = tempfile::tempdir().expect("must create temp dir");
    let clock = CountingClock::default();
    let settings: ManagerSettings =
        load_json_document(&dir.path().join("missing.json"), &clock).expect("must load default");
    assert_eq!(settings, ManagerSettings::default());
    assert_eq!(clock.sleeps.load(Ordering::SeqCst), 0);
}

#[test]
fn document_round_trips() {
    let dir = tempfile::tempdir().expect("must create temp dir");
    let path = dir.path().join("settings.json");
    let clock = CountingClock::default();

    let mut settings = ManagerSettings {
        installed_packages: vec!["B".to_string(), "A".to_string()],
        remove_orphaned: Some(false),
        ..ManagerSettings::default()
    };
    settings.store(&path).expect("must store");

    let loaded: ManagerSettings = load_json_document(&path, &clock).expect("must load");
    assert_eq!(loaded.installed_packages, vec!["A", "B"]);
    assert_eq!(loaded.remove_orphaned, Some(false));
}

#[test]
fn corrupt_document_fails_after_bounded_retries() {
    let dir = tempfile::tempdir().expect("must create temp dir");
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").expect("must write corrupt file");

    let clock = CountingClock::default();
    let err = load_json_document::<ManagerSettings>(&path, &clock)
        .expect_err("corrupt document must fail");
    assert!(err.to_string().contains("after 10 attempts"));
    assert_eq!(clock.sleeps.load(Ordering::SeqCst), 9);
}

#[test]
fn manager_settings_preserve_host_owned_keys() {
    let dir = tempfile::tempdir().expect("must create temp dir");
    let path = dir.path().join("settings.json");
    let clock = CountingClock::default();

    fs::write(
        &path,
        r#"{
  "installed_packages": ["A"],
  "repositories": ["https://example.test/extra"],
  "debug": true
}"#,
    )
    .expect("must write");

    let mut settings = ManagerSettings::load(&path, &clock).expect("must load");
    settings.add_installed("B");
    settings.add_installed("A");
    settings.store(&path).expect("must store");

    let raw = fs::read_to_string(&path).expect("must read back");
    let document: serde_json::Map<String, Value> =
        serde_json::from_str(&raw).expect("must parse");
    assert_eq!(document["installed_packages"], serde_json::json!(["A", "B"]));
    assert_eq!(
        document["repositories"],
        serde_json::json!(["https://example.test/extra"])
    );
    assert_eq!(document["debug"], Value::Bool(true));
}

#[test]
fn clean_for_handover_parks_orphan_preference() {
    let live = ManagerSettings {
        bootstrapped: Some(true),
        installed_packages: vec!["A".to_string()],
        remove_orphaned: Some(false),
        ..ManagerSettings::default()
    };
    let clean = live.clean_for_handover();
    assert_eq!(clean.bootstrapped, Some(false));
    assert_eq!(clean.remove_orphaned, Some(false));
    assert_eq!(clean.remove_orphaned_backup, Some(false));
    assert!(clean.installed_packages.is_empty());

    let backed_up = ManagerSettings {
        remove_orphaned: Some(false),
        remove_orphaned_backup: Some(true),
        ..ManagerSettings::default()
    };
    assert_eq!(
        backed_up.clean_for_handover().remove_orphaned_backup,
        Some(true)
    );

    let untouched = ManagerSettings::default();
    assert_eq!(
        untouched.clean_for_handover().remove_orphaned_backup,
        Some(true)
    );
}

#[test]
fn file_settings_persist_and_read_back() {
    let dir = tempfile::tempdir().expect("must create temp dir");
    let path = dir.path().join("Preferences.json");
    let mut settings = JsonFileSettings::new(&path);

    assert!(settings.string_list(IGNORED_PACKAGES_KEY).is_empty());

    settings.set_string_list(
        IGNORED_PACKAGES_KEY,
        &["B".to_string(), "A".to_string()],
    );
    settings.persist().expect("must persist");
    assert_eq!(settings.string_list(IGNORED_PACKAGES_KEY), vec!["B", "A"]);
}

#[test]
fn file_settings_observe_external_rewrites() {
    let dir = tempfile::tempdir().expect("must create temp dir");
    let path = dir.path().join("Preferences.json");
    let mut settings = JsonFileSettings::new(&path);

    settings.set_string_list(IGNORED_PACKAGES_KEY, &["A".to_string()]);
    settings.persist().expect("must persist");

    write_json_document(
        &path,
        &serde_json::json!({ IGNORED_PACKAGES_KEY: ["Vintage"], "theme": "dark" }),
    )
    .expect("must rewrite");
    assert_eq!(settings.string_list(IGNORED_PACKAGES_KEY), vec!["Vintage"]);

    settings.set_string_list(IGNORED_PACKAGES_KEY, &[]);
    settings.persist().expect("must persist");
    let raw = fs::read_to_string(&path).expect("must read");
    let document: serde_json::Map<String, Value> =
        serde_json::from_str(&raw).expect("must parse");
    assert_eq!(document[IGNORED_PACKAGES_KEY], serde_json::json!([]));
    assert_eq!(document["theme"], Value::from("dark"));
}
