use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chanpack_core::{ChannelManifest, InstallationType, RepositoryCatalog, RunOutcome};
use chanpack_host::{AcceptAllPrompt, JsonFileSettings, SelectionPrompt, SystemClock};
use chanpack_installer::{is_running, spawn_migration, MigrationConfig, SessionPaths};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod local_host;
mod prompt;
mod report;

use local_host::LocalPackageHost;
use prompt::ConsolePrompt;

#[derive(Parser, Debug)]
#[command(name = "chanpack")]
#[command(about = "Channel package migration helper for editor plugin setups", long_about = None)]
struct Cli {
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    manifest: Option<PathBuf>,
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Install {
        #[arg(long)]
        development: bool,
        #[arg(long)]
        upgrade: bool,
        #[arg(long)]
        forced: bool,
        #[arg(long)]
        yes: bool,
    },
    Uninstall {
        #[arg(long)]
        downgrade: bool,
        #[arg(long)]
        forced: bool,
        #[arg(long)]
        yes: bool,
    },
    Status,
    Completions { shell: Shell },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chanpack=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Install {
            development,
            upgrade,
            forced,
            yes,
        } => {
            let installation_type = if *upgrade {
                InstallationType::Upgrade
            } else {
                InstallationType::Install
            };
            let config = build_config(&cli, installation_type, *development, *forced, *yes)?;
            run_and_report(config)
        }
        Commands::Uninstall {
            downgrade,
            forced,
            yes,
        } => {
            let installation_type = if *downgrade {
                InstallationType::Downgrade
            } else {
                InstallationType::Uninstall
            };
            let config = build_config(&cli, installation_type, false, *forced, *yes)?;
            run_and_report(config)
        }
        Commands::Status => {
            if is_running() {
                println!("a migration run is active");
            } else {
                println!("idle");
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "chanpack", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn build_config(
    cli: &Cli,
    installation_type: InstallationType,
    development: bool,
    forced: bool,
    yes: bool,
) -> Result<MigrationConfig> {
    let data_dir = cli
        .data_dir
        .clone()
        .ok_or_else(|| anyhow!("--data-dir is required for this command"))?;

    let manifest_path = cli
        .manifest
        .clone()
        .unwrap_or_else(|| data_dir.join("channel.toml"));
    let manifest_raw = fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read manifest: {}", manifest_path.display()))?;
    let manifest = ChannelManifest::from_toml_str(&manifest_raw)?;

    let catalog_path = cli
        .catalog
        .clone()
        .unwrap_or_else(|| data_dir.join("repository.toml"));
    let catalog_raw = fs::read_to_string(&catalog_path)
        .with_context(|| format!("failed to read catalog: {}", catalog_path.display()))?;
    let catalog = RepositoryCatalog::from_toml_str(&catalog_raw)?;

    if !development && !forced && data_dir.join(".git").exists() {
        return Err(anyhow!(
            "'{}' holds a development checkout of the channel; pass --forced to run anyway",
            data_dir.display()
        ));
    }

    let paths = SessionPaths::for_data_dir(&data_dir, &manifest);
    let user_settings_path = paths
        .packages_dir
        .join("User")
        .join("Preferences.settings.json");

    let prompt: Box<dyn SelectionPrompt> = if yes {
        Box::new(AcceptAllPrompt)
    } else {
        Box::new(ConsolePrompt::new(installation_type.process_label()))
    };

    Ok(MigrationConfig {
        host: Box::new(LocalPackageHost::new(
            paths.packages_dir.clone(),
            catalog.clone(),
        )),
        editor_settings: Box::new(JsonFileSettings::new(user_settings_path)),
        prompt,
        clock: Arc::new(SystemClock),
        manifest,
        catalog,
        paths,
        installation_type,
        development,
    })
}

fn run_and_report(config: MigrationConfig) -> Result<()> {
    let label = config.installation_type.process_label();
    let Some(handle) = spawn_migration(config) else {
        println!("a migration is already running; wait until it finishes");
        return Ok(());
    };

    let spinner = report::run_spinner(label);
    while !handle.is_finished() {
        spinner.tick();
        std::thread::sleep(Duration::from_millis(120));
    }
    spinner.finish_and_clear();

    let outcome = handle
        .join()
        .map_err(|_| anyhow!("the migration worker thread panicked"))??;

    report::print_outcome(label, &outcome);
    if let RunOutcome::Completed { failed } = &outcome {
        report::print_failed_packages(failed);
    }
    tracing::info!("run outcome: {}", report::format_outcome_summary(&outcome));
    Ok(())
}

#[cfg(test)]
mod tests;
