use crate::{
    add_unique, remove_existing, ChannelManifest, InstallationType, ProgressRecord,
    RepositoryCatalog, RunOutcome, StopSignal, PROGRESS_RECORD_VERSION,
};

const MANIFEST: &str = r#"
channel_name = "StudioChannel"
channel_url = "https://example.test/channel.json"
root_url = "https://example.test/studio-channel"
install_first = ["A File Icon", "SideBarEnhancements"]
install_last = ["Color Scheme Editor"]
skip_on_stable = ["User"]
exclusive_install = []
forbidden = ["ChannelRepositoryTools"]

[managers]
legacy = "Package Control"
legacy_loader = "0_package_control_loader"
replacement = "PackagesManager"
replacement_loader = "0_packagesmanager_loader"
"#;

#[test]
fn manifest_parses_with_defaults() {
    let manifest = ChannelManifest::from_toml_str(MANIFEST).expect("manifest must parse");
    assert_eq!(manifest.channel_name, "StudioChannel");
    assert_eq!(manifest.managers.replacement, "PackagesManager");
    assert!(manifest.skip_on_development.is_empty());
    assert!(manifest.default_package_files.is_empty());
    assert_eq!(
        manifest.late_phase_packages(),
        vec!["PackagesManager".to_string(), "StudioChannel".to_string()]
    );
}

#[test]
fn manifest_rejects_empty_channel_name() {
    let raw = MANIFEST.replace("StudioChannel", " ");
    let err = ChannelManifest::from_toml_str(&raw).expect_err("blank channel name must fail");
    assert!(err.to_string().contains("channel name"));
}

#[test]
fn manifest_rejects_channel_in_priority_bucket() {
    let raw = MANIFEST.replace("\"A File Icon\"", "\"A File Icon\", \"StudioChannel\"");
    let err = ChannelManifest::from_toml_str(&raw).expect_err("self priority must fail");
    assert!(err.to_string().contains("priority bucket"));
}

#[test]
fn manifest_rejects_identical_managers() {
    let raw = MANIFEST.replace("replacement = \"PackagesManager\"", "replacement = \"Package Control\"");
    let err = ChannelManifest::from_toml_str(&raw).expect_err("identical managers must fail");
    assert!(err.to_string().contains("legacy and replacement"));
}

#[test]
fn catalog_flags_dependency_entries() {
    let catalog = RepositoryCatalog::from_toml_str(
        r#"
[packages."A File Icon"]
url = "https://example.test/a-file-icon"

[packages.bz2]
dependency = true
"#,
    )
    .expect("catalog must parse");

    assert!(catalog.contains("A File Icon"));
    assert!(!catalog.is_dependency("A File Icon"));
    assert!(catalog.is_dependency("bz2"));
    assert!(!catalog.is_dependency("missing"));
}

#[test]
fn progress_record_round_trips_through_json() {
    let mut record = ProgressRecord {
        packages_to_uninstall: vec!["B".to_string(), "A".to_string()],
        packages_to_unignore: vec!["C".to_string()],
        files_to_uninstall: vec!["Packages/A/readme.md".to_string()],
        folders_to_uninstall: vec!["Packages/A".to_string()],
        next_packages_to_ignore: vec!["B".to_string()],
        packages_not_installed: vec!["D".to_string()],
        installation_type: "install".to_string(),
        default_package_files: vec!["Main.sublime-menu".to_string()],
        ..ProgressRecord::default()
    };
    record.normalize();

    let raw = serde_json::to_string_pretty(&record).expect("record must serialize");
    let loaded: ProgressRecord = serde_json::from_str(&raw).expect("record must deserialize");
    assert_eq!(loaded, record);
    assert_eq!(loaded.packages_to_uninstall, vec!["A", "B"]);
}

#[test]
fn progress_record_tolerates_missing_fields() {
    let loaded: ProgressRecord =
        serde_json::from_str(r#"{"packages_to_uninstall": ["A"]}"#).expect("must deserialize");
    assert_eq!(loaded.version, PROGRESS_RECORD_VERSION);
    assert_eq!(loaded.packages_to_uninstall, vec!["A"]);
    assert!(loaded.installation_type.is_empty());
}

#[test]
fn progress_record_tracking_is_idempotent() {
    let mut record = ProgressRecord::default();
    record.track_for_uninstall("A");
    record.track_for_uninstall("A");
    record.track_file("Packages/A/readme.md");
    record.track_file("Packages/A/readme.md");
    assert_eq!(record.packages_to_uninstall, vec!["A"]);
    assert_eq!(record.files_to_uninstall.len(), 1);

    record.untrack_package("A");
    assert!(record.packages_to_uninstall.is_empty());
}

#[test]
fn installation_type_round_trips() {
    for value in [
        InstallationType::Install,
        InstallationType::Upgrade,
        InstallationType::Uninstall,
        InstallationType::Downgrade,
    ] {
        let parsed = InstallationType::parse(value.as_str()).expect("must parse");
        assert_eq!(parsed, value);
    }
    assert!(InstallationType::parse("sideload").is_err());
    assert!(InstallationType::Upgrade.is_update());
    assert!(!InstallationType::Install.is_update());
}

#[test]
fn stop_signal_maps_to_outcome() {
    let cancelled = StopSignal::Cancelled("installation".to_string());
    let empty = StopSignal::NoPackagesAvailable("install".to_string());
    assert_eq!(RunOutcome::from_stop(&cancelled), RunOutcome::Cancelled);
    assert_eq!(RunOutcome::from_stop(&empty), RunOutcome::Empty);
}

#[test]
fn unique_list_helpers_behave() {
    let mut list = vec!["A".to_string()];
    add_unique(&mut list, "A");
    add_unique(&mut list, "B");
    remove_existing(&mut list, "missing");
    remove_existing(&mut list, "A");
    assert_eq!(list, vec!["B"]);
}
