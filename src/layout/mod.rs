//! Where the tool's inputs and outputs live
//!
//! The tool either runs from its own checkout or as an installed package
//! under `node_modules/lazit-css` of a consuming project. In both cases the
//! user configuration is read from the directory the tool was invoked in.

use std::path::{Path, PathBuf};

use crate::config::{DEFAULT_CONFIG_FILE, USER_CONFIG_FILE};

/// Package directory name when installed as a dependency
pub const PACKAGE_DIR: &str = "lazit-css";

/// Environment variable overriding the base directory
pub const BASE_PATH_ENV: &str = "LAZIT_BASE_PATH";

/// Output stylesheet file name
pub const OUTPUT_CSS: &str = "main.min.css";

/// Build summary file name
pub const SUMMARY_FILE: &str = "lazit-build.json";

/// How the base directory was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// `--base` or `LAZIT_BASE_PATH`
    Explicit,
    /// `<cwd>/node_modules/lazit-css`
    Installed,
    /// The working directory is the tool's own checkout
    Development,
}

/// Resolved filesystem paths for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub mode: LayoutMode,
    pub cwd: PathBuf,
    pub base: PathBuf,
}

impl ProjectLayout {
    /// Pick the base directory: explicit override, installed package, or `cwd`
    pub fn detect(cwd: &Path, base_override: Option<&Path>) -> Self {
        let (mode, base) = match base_override {
            Some(base) if base.is_absolute() => (LayoutMode::Explicit, base.to_path_buf()),
            Some(base) => (LayoutMode::Explicit, cwd.join(base)),
            None => {
                let installed = cwd.join("node_modules").join(PACKAGE_DIR);
                if installed.is_dir() {
                    (LayoutMode::Installed, installed)
                } else {
                    (LayoutMode::Development, cwd.to_path_buf())
                }
            }
        };

        tracing::debug!(?mode, base = %base.display(), "layout detected");
        Self {
            mode,
            cwd: cwd.to_path_buf(),
            base,
        }
    }

    pub fn default_config(&self) -> PathBuf {
        self.base.join("build").join(DEFAULT_CONFIG_FILE)
    }

    pub fn user_config(&self) -> PathBuf {
        self.cwd.join(USER_CONFIG_FILE)
    }

    pub fn sass_root(&self) -> PathBuf {
        self.base.join("sass")
    }

    pub fn entry(&self) -> PathBuf {
        self.sass_root().join("main.scss")
    }

    pub fn public_dir(&self) -> PathBuf {
        self.base.join("public")
    }

    pub fn output_css(&self) -> PathBuf {
        self.public_dir().join(OUTPUT_CSS)
    }

    pub fn output_map(&self) -> PathBuf {
        self.public_dir().join(format!("{}.map", OUTPUT_CSS))
    }

    pub fn summary(&self) -> PathBuf {
        self.public_dir().join(SUMMARY_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_development_layout() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::detect(temp.path(), None);

        assert_eq!(layout.mode, LayoutMode::Development);
        assert_eq!(layout.base, temp.path());
        assert_eq!(
            layout.default_config(),
            temp.path().join("build/lazit_default.conf.json")
        );
        assert_eq!(layout.entry(), temp.path().join("sass/main.scss"));
    }

    #[test]
    fn test_installed_layout() {
        let temp = TempDir::new().unwrap();
        let package = temp.path().join("node_modules/lazit-css");
        fs::create_dir_all(&package).unwrap();

        let layout = ProjectLayout::detect(temp.path(), None);

        assert_eq!(layout.mode, LayoutMode::Installed);
        assert_eq!(layout.base, package);
        assert_eq!(layout.user_config(), temp.path().join("lazit.conf.json"));
        assert_eq!(layout.output_css(), package.join("public/main.min.css"));
        assert_eq!(layout.output_map(), package.join("public/main.min.css.map"));
        assert_eq!(layout.summary(), package.join("public/lazit-build.json"));
    }

    #[test]
    fn test_explicit_base_wins() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("node_modules/lazit-css")).unwrap();

        let layout = ProjectLayout::detect(temp.path(), Some(Path::new("vendor/lazit")));

        assert_eq!(layout.mode, LayoutMode::Explicit);
        assert_eq!(layout.base, temp.path().join("vendor/lazit"));
        assert_eq!(layout.user_config(), temp.path().join("lazit.conf.json"));
    }
}
