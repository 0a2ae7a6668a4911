//! # Filesystem Staging
//!
//! Everything the commands do to the filesystem directly:
//! - copying runtime dependencies (DLLs, PDBs) next to a freshly built executable,
//! - recursively removing and copying directory trees for `deploy`.
//!
//! Dependency copies never overwrite. A file already sitting in the output directory is
//! left alone, whatever its contents.

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{Configuration, Layout};
use crate::invariants::{Invariant, assert_invariant};

/// Outcome of a single copy-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// Destination already existed.
    Skipped,
}

/// Which files to take from a vendored directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every file directly inside the directory with one of these extensions.
    Extensions(Vec<&'static str>),
    /// Exactly these file names.
    Files(Vec<String>),
}

/// A vendored directory plus the files to stage from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySource {
    pub dir: PathBuf,
    pub selection: Selection,
}

/// What a staging pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub copied: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    /// Sources that were expected but not found.
    pub missing: Vec<PathBuf>,
}

/// The runtime files the engine needs next to its executable for `config`:
/// the Mono runtime libraries and symbols, and the matching Assimp build.
pub fn dependency_sources(root: &Path, layout: &Layout, config: &Configuration) -> Vec<DependencySource> {
    let external = root.join(&layout.external_dir);
    let assimp = if config.is_debug() {
        "assimp-vc143-mtd"
    } else {
        "assimp-vc143-mt"
    };

    vec![
        DependencySource {
            dir: external.join("mono").join("bin").join(config.as_str()),
            selection: Selection::Extensions(vec!["dll", "pdb"]),
        },
        DependencySource {
            dir: external.join("assimp").join("lib").join(config.as_str()),
            selection: Selection::Files(vec![format!("{assimp}.dll"), format!("{assimp}.pdb")]),
        },
    ]
}

/// Copies every selected file into `dest_dir`, skipping any that already exist there.
///
/// Missing vendored directories or files are reported and skipped, not fatal:
/// not every platform ships every library.
pub fn stage_dependencies(sources: &[DependencySource], dest_dir: &Path) -> Result<StageReport> {
    let mut report = StageReport::default();

    for source in sources {
        if !source.dir.is_dir() {
            warn!("Dependency directory {:?} not found, skipping", source.dir);
            report.missing.push(source.dir.clone());
            continue;
        }

        let files = match &source.selection {
            Selection::Extensions(exts) => list_with_extensions(&source.dir, exts),
            Selection::Files(names) => names.iter().map(|n| source.dir.join(n)).collect(),
        };

        for file in files {
            if !file.is_file() {
                warn!("Dependency {:?} not found, skipping", file);
                report.missing.push(file);
                continue;
            }
            match copy_if_absent(&file, dest_dir)? {
                CopyOutcome::Copied => report.copied.push(file),
                CopyOutcome::Skipped => report.skipped.push(file),
            }
        }
    }

    info!(
        "Staged {} dependencies ({} already present, {} missing)",
        report.copied.len(),
        report.skipped.len(),
        report.missing.len()
    );
    Ok(report)
}

/// Copies `src` into `dest_dir` under the same file name, unless a file by that
/// name is already there.
///
/// The destination is opened with `create_new`, so the existence check and the
/// write are one step: anything that shows up at `dest` first wins and is left alone.
pub fn copy_if_absent(src: &Path, dest_dir: &Path) -> Result<CopyOutcome> {
    let name = src
        .file_name()
        .with_context(|| format!("{src:?} has no file name"))?;
    let dest = dest_dir.join(name);

    let mut src_file = File::open(src).with_context(|| format!("Failed to open {src:?}"))?;
    let mut dest_file = match OpenOptions::new().write(true).create_new(true).open(&dest) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!("{:?} already present, not overwriting", dest);
            return Ok(CopyOutcome::Skipped);
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to create {dest:?}")),
    };

    let fresh = dest_file.metadata().map(|m| m.len() == 0).unwrap_or(false);
    assert_invariant(
        fresh,
        Invariant::StagingNeverOverwrites,
        &format!("{dest:?} was not a new, empty file before copying"),
    );

    io::copy(&mut src_file, &mut dest_file)
        .with_context(|| format!("Failed to copy {src:?} to {dest:?}"))?;
    if let Ok(meta) = src_file.metadata() {
        let _ = dest_file.set_permissions(meta.permissions());
    }
    debug!("Copied {:?} -> {:?}", src, dest);
    Ok(CopyOutcome::Copied)
}

/// Removes `dir` and everything under it. Returns whether anything was removed.
pub fn remove_tree_if_exists(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(dir).with_context(|| format!("Failed to remove {dir:?}"))?;
    Ok(true)
}

/// Recursively copies the tree at `src` to `dst`, creating `dst` and any parents.
/// Symlinks are followed and their targets copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst).with_context(|| format!("Failed to create {dst:?}"))?;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {src:?}"))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("{:?} is outside {src:?}", entry.path()))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {target:?}"))?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {parent:?}"))?;
            }
            std::fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {:?} to {target:?}", entry.path()))?;
        }
    }

    Ok(())
}

/// Replaces the tree at `dst` with a fresh copy of `src`. Anything previously under
/// `dst` is gone afterwards, including files the source no longer has.
pub fn replace_tree(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        anyhow::bail!("Source directory {src:?} does not exist");
    }

    if remove_tree_if_exists(dst)? {
        info!("Removed old directory {:?}", dst);
    }
    assert_invariant(
        !dst.exists(),
        Invariant::DeployReplacesTree,
        &format!("{dst:?} still exists after removal"),
    );

    info!("Copying {:?} -> {:?}", src, dst);
    copy_tree(src, dst)
}

/// Files directly inside `dir` whose extension matches one of `exts`
/// (case-insensitive), sorted by name.
fn list_with_extensions(dir: &Path, exts: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy().to_lowercase();
                    exts.iter().any(|want| *want == ext)
                })
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}
