//! Stylesheet compilation
//!
//! - [`Compiler`]: one compile of an entry file into a css file plus map
//! - [`SassCompiler`]: the external `sass` executable
//! - [`MockCompiler`]: in-process stand-in for tests
//! - [`CompileOrchestrator`]: stages the output and commits it so a failed
//!   compile never replaces the previous artifacts

mod compiler;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::emit::atomic_write;

pub use compiler::{MockBehavior, MockCompiler, SassCompiler, DEFAULT_SASS_BIN, SASS_BIN_ENV};

/// Compiles one entry stylesheet
pub trait Compiler: Send + Sync {
    /// Compile `entry` into `css_out`, with the source map at `<css_out>.map`
    fn compile(&self, entry: &Path, css_out: &Path) -> Result<(), CompileError>;
}

/// Compilation errors
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("compiler exited with {}: {stderr}", status_label(.status))]
    Failed { status: Option<i32>, stderr: String },

    #[error("entry stylesheet not found: {}", .0.display())]
    MissingEntry(PathBuf),

    #[error("compiler reported success but did not produce {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn status_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> CompileError + '_ {
    move |source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Committed output of a successful compile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledArtifacts {
    pub css: PathBuf,
    pub map: PathBuf,
    pub css_sha256: String,
    pub css_bytes: u64,
}

/// Source map path for a css output (`main.min.css` → `main.min.css.map`)
pub fn map_path(css: &Path) -> PathBuf {
    let mut name = css.as_os_str().to_os_string();
    name.push(".map");
    PathBuf::from(name)
}

/// Runs a [`Compiler`] into a staging directory and commits the result
pub struct CompileOrchestrator<'a> {
    compiler: &'a dyn Compiler,
}

impl<'a> CompileOrchestrator<'a> {
    pub fn new(compiler: &'a dyn Compiler) -> Self {
        Self { compiler }
    }

    /// Staging directory for an output: a dot-prefixed sibling of its parent,
    /// so relative paths inside the source map stay valid after the move
    pub fn staging_dir(css_out: &Path) -> PathBuf {
        let out_dir = css_out.parent().unwrap_or_else(|| Path::new("."));
        let name = out_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        out_dir.with_file_name(format!(".{}-staging", name))
    }

    pub fn run(&self, entry: &Path, css_out: &Path) -> Result<CompiledArtifacts, CompileError> {
        if !entry.is_file() {
            return Err(CompileError::MissingEntry(entry.to_path_buf()));
        }

        let staging = Self::staging_dir(css_out);
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(io_error(&staging))?;
        }
        fs::create_dir_all(&staging).map_err(io_error(&staging))?;

        let result = self.compile_and_commit(entry, css_out, &staging);
        if let Err(e) = fs::remove_dir_all(&staging) {
            tracing::warn!(path = %staging.display(), error = %e, "failed to remove staging directory");
        }
        result
    }

    fn compile_and_commit(
        &self,
        entry: &Path,
        css_out: &Path,
        staging: &Path,
    ) -> Result<CompiledArtifacts, CompileError> {
        let file_name = css_out
            .file_name()
            .ok_or_else(|| CompileError::MissingOutput(css_out.to_path_buf()))?;
        let staged_css = staging.join(file_name);
        let staged_map = map_path(&staged_css);

        tracing::info!(entry = %entry.display(), "compiling");
        self.compiler.compile(entry, &staged_css)?;

        for staged in [&staged_css, &staged_map] {
            if !staged.is_file() {
                return Err(CompileError::MissingOutput(staged.clone()));
            }
        }

        let css_bytes = fs::read(&staged_css).map_err(io_error(&staged_css))?;
        let map_bytes = fs::read(&staged_map).map_err(io_error(&staged_map))?;

        let out_dir = css_out.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(out_dir).map_err(io_error(out_dir))?;

        // Map first, css last: the css is what consumers load
        let final_map = map_path(css_out);
        let previous_map = match fs::read(&final_map) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(io_error(&final_map)(e)),
        };
        atomic_write(&final_map, &map_bytes).map_err(io_error(&final_map))?;
        if let Err(source) = atomic_write(css_out, &css_bytes) {
            restore_map(&final_map, previous_map.as_deref());
            return Err(CompileError::Io {
                path: css_out.to_path_buf(),
                source,
            });
        }

        let mut hasher = Sha256::new();
        hasher.update(&css_bytes);
        let artifacts = CompiledArtifacts {
            css: css_out.to_path_buf(),
            map: final_map,
            css_sha256: hex::encode(hasher.finalize()),
            css_bytes: css_bytes.len() as u64,
        };
        tracing::info!(css = %artifacts.css.display(), bytes = artifacts.css_bytes, "stylesheet committed");
        Ok(artifacts)
    }
}

/// Put back the map that was committed before, or remove the new one
fn restore_map(map: &Path, previous: Option<&[u8]>) {
    let restored = match previous {
        Some(bytes) => atomic_write(map, bytes),
        None => fs::remove_file(map),
    };
    if let Err(e) = restored {
        tracing::warn!(path = %map.display(), error = %e, "failed to restore source map");
    }
}
