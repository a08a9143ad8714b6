//! Input expansion: files, glob patterns, folders and zip archives.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::TempDir;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// PDF paths ready for processing.
///
/// Archives are unpacked into temporary directories that live as long as
/// this value.
pub struct Intake {
    pub paths: Vec<PathBuf>,
    _unpacked: Vec<TempDir>,
}

impl Intake {
    /// Expand every input, keeping input order.
    pub fn collect(inputs: &[String]) -> anyhow::Result<Self> {
        let mut intake = Intake {
            paths: Vec::new(),
            _unpacked: Vec::new(),
        };

        for input in inputs {
            let path = Path::new(input);
            if path.exists() {
                intake.add(path)?;
                continue;
            }

            let mut matched = false;
            for entry in glob::glob(input).with_context(|| format!("invalid pattern: {}", input))? {
                match entry {
                    Ok(path) => {
                        matched = true;
                        intake.add(&path)?;
                    }
                    Err(e) => warn!("Skipping unreadable match: {}", e),
                }
            }
            if !matched {
                warn!("No files match {}", input);
            }
        }

        debug!("Collected {} PDF files", intake.paths.len());
        Ok(intake)
    }

    fn add(&mut self, path: &Path) -> anyhow::Result<()> {
        if path.is_dir() {
            self.paths.extend(walk_pdfs(path));
        } else if has_extension(path, "zip") {
            let dir = unpack_zip(path)?;
            self.paths.extend(walk_pdfs(dir.path()));
            self._unpacked.push(dir);
        } else if has_extension(path, "pdf") {
            self.paths.push(path.to_path_buf());
        } else {
            warn!("Skipping {}: not a PDF or zip archive", path.display());
        }
        Ok(())
    }
}

fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(expected))
}

fn is_skipped_name(name: &str) -> bool {
    name.starts_with('.') || name == "__MACOSX"
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0 && is_skipped_name(&entry.file_name().to_string_lossy())
}

/// All PDFs below `root`, sorted by name within each directory.
fn walk_pdfs(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && has_extension(e.path(), "pdf"))
        .map(DirEntry::into_path)
        .collect()
}

/// Unpack a zip archive into a fresh temporary directory.
fn unpack_zip(path: &Path) -> anyhow::Result<TempDir> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("failed to open zip {}", path.display()))?;
    let dir = tempfile::tempdir()?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        // Entries escaping the archive root are dropped
        let Some(name) = entry.enclosed_name() else {
            continue;
        };
        if entry.is_dir()
            || name
                .components()
                .any(|c| is_skipped_name(&c.as_os_str().to_string_lossy()))
        {
            continue;
        }

        let target = dir.path().join(&name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("failed to extract {}", name.display()))?;
    }

    debug!("Unpacked {} into {}", path.display(), dir.path().display());
    Ok(dir)
}
