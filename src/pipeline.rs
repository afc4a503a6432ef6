//! Build pipeline
//!
//! One run resolves the configuration, generates the settings and utility
//! fragments, writes them under the sass root, prunes fragments left over
//! from earlier runs, compiles the entry stylesheet (unless only generating)
//! and records a build summary.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::compile::{CompileError, CompileOrchestrator, Compiler};
use crate::config::{ConfigError, EffectiveConfig, LazitConfig};
use crate::emit::{EmitError, FragmentWriter};
use crate::generate::{
    check_rule_sources, GenerateError, GeneratedModules, SettingsGenerator, UtilitiesGenerator,
    SETTINGS_DIR, UTILITIES_DIR,
};
use crate::layout::ProjectLayout;
use crate::summary::{BuildSummary, FragmentRecord};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),

    #[error("emit error: {0}")]
    Emit(#[from] EmitError),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("failed to write build summary {}: {source}", .path.display())]
    Summary {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 2,
            PipelineError::Generate(_) => 3,
            PipelineError::Emit(_) => 4,
            PipelineError::Compile(_) => 5,
            PipelineError::Summary { .. } => 1,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub layout: ProjectLayout,

    /// User configuration path; defaults to `lazit.conf.json` in the working directory
    pub user_config: Option<PathBuf>,

    /// Stop after writing the fragments
    pub generate_only: bool,
}

impl PipelineConfig {
    pub fn new(layout: ProjectLayout) -> Self {
        Self {
            layout,
            user_config: None,
            generate_only: false,
        }
    }

    pub fn user_config_path(&self) -> PathBuf {
        self.user_config
            .clone()
            .unwrap_or_else(|| self.layout.user_config())
    }
}

/// Fragments produced by both generators
#[derive(Debug, Clone)]
pub struct GeneratedSources {
    pub settings: GeneratedModules,
    pub utilities: GeneratedModules,
}

/// Pipeline execution context
pub struct Pipeline<'a> {
    config: PipelineConfig,
    compiler: &'a dyn Compiler,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: PipelineConfig, compiler: &'a dyn Compiler) -> Self {
        Self { config, compiler }
    }

    /// Merge the default and user documents
    pub fn resolve(&self) -> PipelineResult<EffectiveConfig> {
        let user = self.config.user_config_path();
        let effective = EffectiveConfig::resolve(&self.config.layout.default_config(), Some(&user))?;
        tracing::info!(user_config = effective.uses_user_config(), "configuration resolved");
        Ok(effective)
    }

    /// Generate every fragment in memory
    pub fn generate(config: &LazitConfig) -> PipelineResult<GeneratedSources> {
        let settings = SettingsGenerator::new(&config.setup, &config.settings).generate()?;
        check_rule_sources(&config.utilities, &settings.enabled)?;
        let utilities = UtilitiesGenerator::new(&config.utilities).generate()?;
        Ok(GeneratedSources { settings, utilities })
    }

    /// Run the whole pipeline and return the summary that was written
    pub fn run(&self) -> PipelineResult<BuildSummary> {
        let layout = &self.config.layout;

        let effective = self.resolve()?;
        let typed = effective.typed()?;
        let sources = Self::generate(&typed)?;

        let writer = FragmentWriter::new(layout.sass_root());
        writer.write_all(&sources.settings.fragments)?;
        writer.write_all(&sources.utilities.fragments)?;

        let mut pruned = writer.prune_stale(SETTINGS_DIR, &sources.settings.fragments)?;
        pruned.extend(writer.prune_stale(UTILITIES_DIR, &sources.utilities.fragments)?);

        let artifacts = if self.config.generate_only {
            tracing::info!("generate only, skipping compile");
            None
        } else {
            let orchestrator = CompileOrchestrator::new(self.compiler);
            Some(orchestrator.run(&layout.entry(), &layout.output_css())?)
        };

        let mut summary = BuildSummary::new(effective.digest()?, effective.sources.clone());
        summary.settings = sources.settings.enabled.clone();
        summary.utilities = sources.utilities.enabled.clone();
        summary.fragments = sources
            .settings
            .fragments
            .iter()
            .chain(&sources.utilities.fragments)
            .map(|f| FragmentRecord {
                path: relative_display(&f.path),
                sha256: f.digest(),
            })
            .collect();
        summary.pruned = pruned
            .iter()
            .map(|p| relative_display(p.strip_prefix(writer.root()).unwrap_or(p)))
            .collect();
        summary.artifacts = artifacts;

        let summary_path = layout.summary();
        summary
            .write_to_file(&summary_path)
            .map_err(|source| PipelineError::Summary {
                path: summary_path.clone(),
                source,
            })?;

        tracing::info!(summary = %summary_path.display(), "{}", summary.human_summary());
        Ok(summary)
    }
}

fn relative_display(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
