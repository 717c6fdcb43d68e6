use chanpack_core::RunOutcome;
use chanpack_host::SelectionOutcome;
use clap::Parser;

use crate::prompt::parse_selection;
use crate::report::format_outcome_summary;
use crate::{Cli, Commands};

#[test]
fn install_arguments_parse() {
    let cli = Cli::parse_from([
        "chanpack",
        "--data-dir",
        "/tmp/editor",
        "install",
        "--upgrade",
        "--yes",
    ]);
    match cli.command {
        Commands::Install {
            development,
            upgrade,
            forced,
            yes,
        } => {
            assert!(!development);
            assert!(upgrade);
            assert!(!forced);
            assert!(yes);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn uninstall_arguments_parse() {
    let cli = Cli::parse_from(["chanpack", "uninstall", "--downgrade"]);
    match cli.command {
        Commands::Uninstall {
            downgrade, forced, ..
        } => {
            assert!(downgrade);
            assert!(!forced);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn selection_input_maps_to_outcomes() {
    assert_eq!(parse_selection("", 3), Some(SelectionOutcome::Continue));
    assert_eq!(parse_selection("c\n", 3), Some(SelectionOutcome::Continue));
    assert_eq!(parse_selection("q\n", 3), Some(SelectionOutcome::Cancelled));
    assert_eq!(parse_selection("2\n", 3), Some(SelectionOutcome::Toggled(2)));
    assert_eq!(parse_selection("7\n", 3), None);
    assert_eq!(parse_selection("nonsense", 3), None);
}

#[test]
fn outcome_summaries_are_stable() {
    assert_eq!(
        format_outcome_summary(&RunOutcome::Completed { failed: vec![] }),
        "completed"
    );
    assert_eq!(
        format_outcome_summary(&RunOutcome::Completed {
            failed: vec!["A".to_string()]
        }),
        "completed with 1 failure(s)"
    );
    assert_eq!(format_outcome_summary(&RunOutcome::Cancelled), "cancelled");
    assert_eq!(format_outcome_summary(&RunOutcome::Empty), "nothing to do");
}
