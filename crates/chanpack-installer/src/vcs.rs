use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

pub(crate) fn base_git_command() -> Command {
    let mut command = Command::new("git");
    command
        .arg("-c")
        .arg("core.autocrlf=false")
        .arg("-c")
        .arg("core.eol=lf");
    if cfg!(windows) {
        command.arg("-c").arg("core.longpaths=true");
    }
    command
}

pub(crate) fn run_git_clone(url: &str, destination: &str, cwd: &Path) -> Result<()> {
    run_git_command(cwd, &["clone", "--", url, destination])
}

pub(crate) fn run_git_clone_recursive(url: &str, destination: &str, cwd: &Path) -> Result<()> {
    run_git_command(cwd, &["clone", "--recursive", "--", url, destination])
}

pub(crate) fn run_git_checkout(repo_root: &Path, branch: &str) -> Result<()> {
    run_git_command(repo_root, &["checkout", branch])
}

pub(crate) fn run_git_command(cwd: &Path, args: &[&str]) -> Result<()> {
    let output = base_git_command()
        .args(args)
        .current_dir(cwd)
        .output()
        .with_context(|| format!("failed launching git {}", args.join(" ")))?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleEntry {
    pub path: String,
    pub url: String,
}

pub fn parse_submodule_descriptor(raw: &str) -> Vec<SubmoduleEntry> {
    let mut entries = Vec::new();
    let mut path = None;
    let mut url = None;

    let mut push_current = |path: &mut Option<String>, url: &mut Option<String>| {
        if let (Some(path), Some(url)) = (path.take(), url.take()) {
            entries.push(SubmoduleEntry { path, url });
        }
    };

    for line in raw.lines().map(str::trim) {
        if line.starts_with('[') {
            push_current(&mut path, &mut url);
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "path" => path = Some(value.trim().to_string()),
            "url" => url = Some(value.trim().to_string()),
            _ => {}
        }
    }
    push_current(&mut path, &mut url);

    entries
}

pub fn submodule_pairs(entries: &[SubmoduleEntry]) -> Vec<(String, String)> {
    entries
        .iter()
        .map(|entry| (entry.path.clone(), entry.url.clone()))
        .collect()
}
