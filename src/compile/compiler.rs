//! Compiler implementations

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{map_path, CompileError, Compiler};

/// Program name used when no override is given
pub const DEFAULT_SASS_BIN: &str = "sass";

/// Environment variable overriding the sass program
pub const SASS_BIN_ENV: &str = "LAZIT_SASS_BIN";

/// The external `sass` command line compiler
#[derive(Debug, Clone)]
pub struct SassCompiler {
    program: PathBuf,
}

impl SassCompiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(entry: &Path, css_out: &Path) -> Vec<String> {
        vec![
            entry.to_string_lossy().into_owned(),
            css_out.to_string_lossy().into_owned(),
            "--style=compressed".to_string(),
            "--source-map".to_string(),
            "--no-error-css".to_string(),
        ]
    }
}

impl Default for SassCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_SASS_BIN)
    }
}

impl Compiler for SassCompiler {
    fn compile(&self, entry: &Path, css_out: &Path) -> Result<(), CompileError> {
        let args = Self::args(entry, css_out);
        tracing::debug!(program = %self.program.display(), ?args, "spawning compiler");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| CompileError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            tracing::debug!(target: "lazit::sass", "{}", line);
        }

        if !output.status.success() {
            return Err(CompileError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // Deprecation warnings land on stderr even on success
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            tracing::warn!(target: "lazit::sass", "{}", line);
        }
        Ok(())
    }
}

/// What a [`MockCompiler`] does when invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Write the given css and an empty source map
    Succeed { css: String },
    /// Report a non-zero exit without writing anything
    Fail { status: i32, stderr: String },
    /// Report success but write only the css
    CssOnly,
}

/// In-process compiler for tests
#[derive(Debug)]
pub struct MockCompiler {
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockCompiler {
    pub const DEFAULT_CSS: &'static str = ".lz-display-block{display:block}";

    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Succeed {
            css: Self::DEFAULT_CSS.to_string(),
        })
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of compile calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler for MockCompiler {
    fn compile(&self, _entry: &Path, css_out: &Path) -> Result<(), CompileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let write = |path: &Path, contents: &str| {
            fs::write(path, contents).map_err(|source| CompileError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        match &self.behavior {
            MockBehavior::Succeed { css } => {
                write(css_out, css)?;
                write(&map_path(css_out), "{\"version\":3,\"mappings\":\"\"}")
            }
            MockBehavior::Fail { status, stderr } => Err(CompileError::Failed {
                status: Some(*status),
                stderr: stderr.clone(),
            }),
            MockBehavior::CssOnly => write(css_out, Self::DEFAULT_CSS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sass_args() {
        let args = SassCompiler::args(Path::new("sass/main.scss"), Path::new("public/main.min.css"));
        assert_eq!(
            args,
            vec![
                "sass/main.scss",
                "public/main.min.css",
                "--style=compressed",
                "--source-map",
                "--no-error-css",
            ]
        );
    }

    #[test]
    fn test_spawn_failure() {
        let compiler = SassCompiler::new("/nonexistent/lazit-test-sass");
        let err = compiler
            .compile(Path::new("main.scss"), Path::new("main.min.css"))
            .unwrap_err();

        assert!(matches!(err, CompileError::Spawn { ref program, .. } if program.contains("lazit-test-sass")));
    }

    #[test]
    fn test_mock_counts_calls() {
        let temp = tempfile::TempDir::new().unwrap();
        let compiler = MockCompiler::new();
        let css = temp.path().join("out.css");

        compiler.compile(Path::new("main.scss"), &css).unwrap();
        compiler.compile(Path::new("main.scss"), &css).unwrap();

        assert_eq!(compiler.calls(), 2);
        assert!(map_path(&css).is_file());
    }
}
