//! Fragment persistence under the sass root

use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::generate::{GeneratedFragment, GENERATED_HEADER};

/// Errors raised while writing or pruning fragments
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove stale fragment {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// What happened to one fragment on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Contents already matched; the file was left alone
    Unchanged,
}

/// Writes generated fragments relative to a sass root directory
#[derive(Debug, Clone)]
pub struct FragmentWriter {
    root: PathBuf,
}

impl FragmentWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write every fragment, creating parent directories as needed
    pub fn write_all(&self, fragments: &[GeneratedFragment]) -> Result<Vec<WriteOutcome>, EmitError> {
        let mut outcomes = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let path = self.root.join(&fragment.path);
            let outcome = self.write_one(&path, &fragment.contents)?;
            tracing::debug!(path = %path.display(), ?outcome, "fragment");
            outcomes.push(outcome);
        }
        let written = outcomes.iter().filter(|o| **o == WriteOutcome::Written).count();
        tracing::info!(total = fragments.len(), written, "fragments emitted");
        Ok(outcomes)
    }

    fn write_one(&self, path: &Path, contents: &str) -> Result<WriteOutcome, EmitError> {
        let wrap = |source| EmitError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Ok(existing) = fs::read_to_string(path) {
            if existing == contents {
                return Ok(WriteOutcome::Unchanged);
            }
        }

        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir).map_err(wrap)?;
        atomic_write(path, contents.as_bytes()).map_err(wrap)?;
        Ok(WriteOutcome::Written)
    }

    /// Remove generated `_*.scss` files directly under `dir` that are not in `keep`.
    ///
    /// Only files carrying the generated banner are touched; hand-written
    /// partials in the same directory survive.
    pub fn prune_stale(&self, dir: &str, keep: &[GeneratedFragment]) -> Result<Vec<PathBuf>, EmitError> {
        let target = self.root.join(dir);
        if !target.is_dir() {
            return Ok(Vec::new());
        }

        let keep: HashSet<PathBuf> = keep.iter().map(|f| self.root.join(&f.path)).collect();
        let mut removed = Vec::new();

        for entry in WalkDir::new(&target)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let name = entry.file_name().to_string_lossy();
            if !(name.starts_with('_') && name.ends_with(".scss")) || keep.contains(path) {
                continue;
            }
            if !is_generated(path) {
                tracing::debug!(path = %path.display(), "keeping hand-written partial");
                continue;
            }

            fs::remove_file(path).map_err(|source| EmitError::Remove {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::info!(path = %path.display(), "removed stale fragment");
            removed.push(path.to_path_buf());
        }

        Ok(removed)
    }
}

/// Write to a dot-prefixed sibling, then rename over the target
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
        .to_string_lossy();
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&temp_path, content)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(())
}

fn is_generated(path: &Path) -> bool {
    let Ok(file) = fs::File::open(path) else {
        return false;
    };
    let mut first = String::new();
    if BufReader::new(file).read_line(&mut first).is_err() {
        return false;
    }
    first.trim_end() == format!("// {}", GENERATED_HEADER)
}
