use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopiedOverrides {
    pub files: Vec<String>,
    pub folders: Vec<String>,
}

pub fn copy_overrides(
    source_root: &Path,
    dest_root: &Path,
    channel_root: &Path,
    move_files: bool,
    replace: bool,
) -> Result<CopiedOverrides> {
    let mut copied = CopiedOverrides::default();
    copy_overrides_recursive(
        source_root,
        source_root,
        dest_root,
        channel_root,
        move_files,
        replace,
        &mut copied,
    )?;
    debug!(
        files = copied.files.len(),
        folders = copied.folders.len(),
        "copied override tree"
    );
    Ok(copied)
}

#[allow(clippy::too_many_arguments)]
fn copy_overrides_recursive(
    source_root: &Path,
    current: &Path,
    dest_root: &Path,
    channel_root: &Path,
    move_files: bool,
    replace: bool,
    copied: &mut CopiedOverrides,
) -> Result<()> {
    let rel = current
        .strip_prefix(source_root)
        .with_context(|| format!("failed to relativize {}", current.display()))?;
    let dest_folder = dest_root.join(rel);
    if !dest_folder.exists() {
        fs::create_dir_all(&dest_folder)
            .with_context(|| format!("failed to create {}", dest_folder.display()))?;
    }

    for entry in
        fs::read_dir(current).with_context(|| format!("failed to read {}", current.display()))?
    {
        let entry = entry?;
        let source_path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            copy_overrides_recursive(
                source_root,
                &source_path,
                dest_root,
                channel_root,
                move_files,
                replace,
                copied,
            )?;
            continue;
        }

        let dest_path = dest_folder.join(entry.file_name());
        if dest_path.exists() {
            if replace {
                remove_read_only_file(&dest_path)?;
            } else {
                continue;
            }
        }

        if move_files {
            move_file(&source_path, &dest_path)?;
        } else {
            fs::copy(&source_path, &dest_path).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    source_path.display(),
                    dest_path.display()
                )
            })?;
        }

        if let Some(rel_file) = relative_unix_path(&dest_path, channel_root) {
            chanpack_core::add_unique(&mut copied.files, &rel_file);
        }
        if let Some(rel_folder) = relative_unix_path(&dest_folder, channel_root) {
            chanpack_core::add_unique(&mut copied.folders, &rel_folder);
        }
    }

    Ok(())
}

fn move_file(source: &Path, dest: &Path) -> Result<()> {
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }
    fs::copy(source, dest).with_context(|| {
        format!(
            "failed to move {} to {}",
            source.display(),
            dest.display()
        )
    })?;
    fs::remove_file(source)
        .with_context(|| format!("failed to remove moved file: {}", source.display()))
}

pub fn collect_tree_for_removal(
    tree_root: &Path,
    channel_root: &Path,
    files: &mut Vec<String>,
    folders: &mut Vec<String>,
) -> Result<()> {
    if let Some(rel) = relative_unix_path(tree_root, channel_root) {
        chanpack_core::add_unique(folders, &rel);
    }
    collect_tree_recursive(tree_root, channel_root, files, folders)
}

fn collect_tree_recursive(
    current: &Path,
    channel_root: &Path,
    files: &mut Vec<String>,
    folders: &mut Vec<String>,
) -> Result<()> {
    for entry in
        fs::read_dir(current).with_context(|| format!("failed to read {}", current.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            if let Some(rel) = relative_unix_path(&path, channel_root) {
                chanpack_core::add_unique(folders, &rel);
            }
            collect_tree_recursive(&path, channel_root, files, folders)?;
        } else if let Some(rel) = relative_unix_path(&path, channel_root) {
            chanpack_core::add_unique(files, &rel);
        }
    }
    Ok(())
}

pub fn recursively_delete_empty_folders(path: &Path, not_empty: &mut Vec<PathBuf>) {
    if !path.is_dir() {
        return;
    }

    let Ok(entries) = fs::read_dir(path) else {
        not_empty.push(path.to_path_buf());
        return;
    };
    for entry in entries.flatten() {
        let child = entry.path();
        if child.is_dir() {
            recursively_delete_empty_folders(&child, not_empty);
        }
    }

    if is_directory_empty(path) {
        if let Err(err) = fs::remove_dir(path) {
            warn!(path = %path.display(), "failed to remove empty folder: {err}");
            not_empty.push(path.to_path_buf());
        }
    } else {
        not_empty.push(path.to_path_buf());
    }
}

pub fn is_directory_empty(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

pub fn remove_git_folder(git_folder: &Path, parent_to_prune: Option<&Path>) {
    if git_folder.exists() {
        if let Err(err) = remove_dir_all_including_read_only(git_folder) {
            warn!(path = %git_folder.display(), "failed to remove git folder: {err}");
        }
    }

    if let Some(parent) = parent_to_prune {
        if is_directory_empty(parent) {
            if let Err(err) = fs::remove_dir(parent) {
                warn!(path = %parent.display(), "failed to prune emptied folder: {err}");
            }
        }
    }
}

fn remove_dir_all_including_read_only(path: &Path) -> Result<()> {
    make_tree_writable(path);
    fs::remove_dir_all(path).with_context(|| format!("failed to remove {}", path.display()))
}

fn make_tree_writable(path: &Path) {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return;
    };
    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        let _ = fs::set_permissions(path, permissions);
    }
    if metadata.is_dir() {
        if let Ok(entries) = fs::read_dir(path) {
            for entry in entries.flatten() {
                make_tree_writable(&entry.path());
            }
        }
    }
}

pub fn add_git_folder_by_file(rel_file: &str, git_folders: &mut Vec<String>) {
    let mut prefix = Vec::new();
    for segment in rel_file.split('/') {
        prefix.push(segment);
        if segment == ".git" {
            let folder = prefix.join("/");
            chanpack_core::add_unique(git_folders, &folder);
            return;
        }
    }
}

pub fn safe_remove(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(_) => {
            if let Err(err) = remove_read_only_file(path) {
                warn!(path = %path.display(), "failed to remove file: {err}");
            }
        }
    }
}

fn remove_read_only_file(path: &Path) -> Result<()> {
    if let Ok(metadata) = fs::symlink_metadata(path) {
        let mut permissions = metadata.permissions();
        if permissions.readonly() {
            #[allow(clippy::permissions_set_readonly_false)]
            permissions.set_readonly(false);
            let _ = fs::set_permissions(path, permissions);
        }
    }
    fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))
}

pub fn relative_unix_path(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}
