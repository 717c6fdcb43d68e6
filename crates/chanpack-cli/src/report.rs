use anstyle::{AnsiColor, Style};
use chanpack_core::RunOutcome;
use indicatif::{ProgressBar, ProgressStyle};

fn error_style() -> Style {
    Style::new().bold().fg_color(Some(AnsiColor::Red.into()))
}

fn success_style() -> Style {
    Style::new().bold().fg_color(Some(AnsiColor::Green.into()))
}

fn colorize(style: Style, text: &str) -> String {
    format!("{style}{text}{style:#}")
}

pub fn run_spinner(label: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("{label} in progress..."));
    spinner
}

pub fn print_outcome(label: &str, outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed { failed } if failed.is_empty() => {
            println!(
                "{}",
                colorize(
                    success_style(),
                    &format!("The {label} was successfully completed.")
                )
            );
            println!("Restart the editor to finish loading the changed packages.");
        }
        RunOutcome::Completed { .. } => {
            println!(
                "{}",
                colorize(
                    error_style(),
                    &format!("The {label} completed with failures.")
                )
            );
        }
        RunOutcome::Cancelled => println!("The {label} was cancelled."),
        RunOutcome::Empty => println!("There was nothing for the {label} to do."),
    }
}

pub fn print_failed_packages(failed: &[String]) {
    if failed.is_empty() {
        return;
    }

    println!(
        "{}",
        colorize(
            error_style(),
            &format!("{} package(s) failed:", failed.len())
        )
    );
    for name in failed {
        println!("  - {name}");
    }
    println!("Check the console log for the detailed record.");
}

pub fn format_outcome_summary(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Completed { failed } if failed.is_empty() => "completed".to_string(),
        RunOutcome::Completed { failed } => format!("completed with {} failure(s)", failed.len()),
        RunOutcome::Cancelled => "cancelled".to_string(),
        RunOutcome::Empty => "nothing to do".to_string(),
    }
}
