use std::collections::BTreeSet;

use chanpack_core::{ChannelManifest, ProgressRecord, RepositoryCatalog, StopSignal};

use super::*;

fn manifest(extra: &str) -> ChannelManifest {
    let raw = format!(
        r#"
channel_name = "StudioChannel"
channel_url = "https://example.test/channel.json"
{extra}

[managers]
legacy = "Package Control"
legacy_loader = "0_package_control_loader"
replacement = "PackagesManager"
replacement_loader = "0_packagesmanager_loader"
"#
    );
    ChannelManifest::from_toml_str(&raw).expect("manifest must parse")
}

fn catalog(names: &[&str]) -> RepositoryCatalog {
    let body = names
        .iter()
        .map(|name| format!("[packages.\"{name}\"]\n"))
        .collect::<String>();
    RepositoryCatalog::from_toml_str(&body).expect("catalog must parse")
}

fn installed(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn install_first_package_leads_the_worklist() {
    let manifest = manifest("install_first = [\"C\"]");
    let plan = resolve_install_set(
        &catalog(&["A", "B", "C"]),
        &manifest,
        &InstalledView::default(),
        false,
    )
    .expect("must resolve");
    assert_eq!(plan.packages, vec!["C", "A", "B"]);
    assert!(plan.already_installed.is_empty());
}

#[test]
fn exclusive_install_narrows_to_allow_list() {
    let manifest = manifest("exclusive_install = [\"A\"]");
    let plan = resolve_install_set(
        &catalog(&["A", "B", "C"]),
        &manifest,
        &InstalledView::default(),
        false,
    )
    .expect("must resolve");
    assert_eq!(plan.packages, vec!["A"]);
}

#[test]
fn install_set_never_contains_excluded_names() {
    let manifest = manifest("skip_on_stable = [\"User\"]\nignore_on_development = [\"Vintage\"]");
    let view = InstalledView {
        installed: installed(&["Installed", "Package Control"]),
        tracked_for_uninstall: installed(&["Owned"]),
        not_installed: BTreeSet::new(),
    };
    let plan = resolve_install_set(
        &catalog(&[
            "A",
            "Installed",
            "Owned",
            "Package Control",
            "StudioChannel",
            "User",
            "Vintage",
        ]),
        &manifest,
        &view,
        false,
    )
    .expect("must resolve");
    assert_eq!(plan.packages, vec!["A"]);
    assert_eq!(plan.already_installed, vec!["Installed", "Package Control"]);
}

#[test]
fn dependency_only_entries_are_never_offered() {
    let catalog = RepositoryCatalog::from_toml_str(
        r#"
[packages.App]

[packages.bz2]
dependency = true
"#,
    )
    .expect("catalog must parse");
    let plan = resolve_install_set(
        &catalog,
        &manifest(""),
        &InstalledView::default(),
        false,
    )
    .expect("must resolve");
    assert_eq!(plan.packages, vec!["App"]);
}

#[test]
fn upgrade_excludes_previously_declined_names() {
    let manifest = manifest("");
    let view = InstalledView {
        not_installed: installed(&["Declined"]),
        ..InstalledView::default()
    };
    let plan = resolve_install_set(&catalog(&["A", "Declined"]), &manifest, &view, true)
        .expect("must resolve");
    assert_eq!(plan.packages, vec!["A"]);
    assert!(plan.already_installed.is_empty());
}

#[test]
fn empty_filtered_set_reports_no_packages_available() {
    let manifest = manifest("");
    let view = InstalledView {
        installed: installed(&["A", "B"]),
        ..InstalledView::default()
    };
    let err = resolve_install_set(&catalog(&["A", "B"]), &manifest, &view, false)
        .expect_err("must report empty set");
    assert!(matches!(err, StopSignal::NoPackagesAvailable(_)));
}

#[test]
fn uninstall_order_reverses_install_priority() {
    let manifest = manifest("install_first = [\"C\"]");
    let progress = ProgressRecord {
        packages_to_uninstall: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        ..ProgressRecord::default()
    };
    let ordered = resolve_uninstall_set(&progress, &manifest, &catalog(&[]), false)
        .expect("must resolve");
    assert_eq!(ordered, vec!["A", "B", "C"]);
}

#[test]
fn install_last_names_uninstall_before_install_first_names() {
    let manifest = manifest("install_first = [\"F1\", \"F2\"]\ninstall_last = [\"L1\", \"L2\"]");
    let progress = ProgressRecord {
        packages_to_uninstall: vec![
            "F1".to_string(),
            "F2".to_string(),
            "L1".to_string(),
            "L2".to_string(),
            "M".to_string(),
        ],
        ..ProgressRecord::default()
    };
    let ordered = resolve_uninstall_set(&progress, &manifest, &catalog(&[]), false)
        .expect("must resolve");
    assert_eq!(ordered, vec!["L2", "L1", "M", "F2", "F1"]);
}

#[test]
fn name_on_both_priority_lists_obeys_install_last() {
    let manifest = manifest("install_first = [\"X\"]\ninstall_last = [\"X\"]");

    let plan = resolve_install_set(
        &catalog(&["A", "X"]),
        &manifest,
        &InstalledView::default(),
        false,
    )
    .expect("must resolve");
    assert_eq!(plan.packages, vec!["A", "X"]);

    let progress = ProgressRecord {
        packages_to_uninstall: vec!["A".to_string(), "X".to_string()],
        ..ProgressRecord::default()
    };
    let ordered = resolve_uninstall_set(&progress, &manifest, &catalog(&[]), false)
        .expect("must resolve");
    assert_eq!(ordered, vec!["X", "A"]);
}

#[test]
fn downgrade_unions_declined_and_respects_allow_list() {
    let manifest = manifest("exclusive_install = [\"Kept\"]");
    let progress = ProgressRecord {
        packages_to_uninstall: vec!["Kept".to_string(), "Removed".to_string()],
        packages_not_installed: vec!["Declined".to_string()],
        ..ProgressRecord::default()
    };
    let ordered = resolve_uninstall_set(&progress, &manifest, &catalog(&["Kept"]), true)
        .expect("must resolve");
    assert_eq!(ordered, vec!["Declined", "Removed"]);
}

#[test]
fn empty_uninstall_set_reports_no_packages_available() {
    let err = resolve_uninstall_set(
        &ProgressRecord::default(),
        &manifest(""),
        &catalog(&[]),
        false,
    )
    .expect_err("must report empty set");
    assert!(matches!(err, StopSignal::NoPackagesAvailable(_)));
}

#[test]
fn development_set_keeps_only_package_submodules() {
    let manifest = manifest("skip_on_development = [\"Skipped\"]\ninstall_first = [\"Zeta\"]");
    let submodules = vec![
        (
            "Packages/Alpha".to_string(),
            "https://example.test/alpha".to_string(),
        ),
        (
            "Packages/Skipped".to_string(),
            "https://example.test/skipped".to_string(),
        ),
        (
            "Packages/Present".to_string(),
            "https://example.test/present".to_string(),
        ),
        (
            "Tools/NotAPackage".to_string(),
            "https://example.test/tools".to_string(),
        ),
        (
            "Packages/Zeta".to_string(),
            "https://example.test/zeta".to_string(),
        ),
    ];
    let packages =
        resolve_development_set(&submodules, &manifest, &installed(&["Present"]));
    let names: Vec<&str> = packages.iter().map(|package| package.name.as_str()).collect();
    assert_eq!(names, vec!["Zeta", "Alpha"]);
    assert_eq!(packages[0].path, "Packages/Zeta");
    assert_eq!(packages[1].url, "https://example.test/alpha");
}
