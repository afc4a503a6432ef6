//! lazit - design-token driven utility stylesheet generator
//!
//! Resolves a JSON design-token configuration (bundled defaults merged with
//! an optional user document), generates the settings and utility SCSS
//! fragments it describes and compiles the entry stylesheet with `sass`.

pub mod compile;
pub mod config;
pub mod emit;
pub mod generate;
pub mod layout;
pub mod naming;
pub mod pipeline;
pub mod summary;

pub use compile::{CompileError, CompileOrchestrator, Compiler, MockCompiler, SassCompiler};
pub use config::{BundledDefaults, ConfigError, EffectiveConfig, LazitConfig};
pub use generate::{GenerateError, SettingsGenerator, UtilitiesGenerator};
pub use layout::ProjectLayout;
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineResult};
pub use summary::BuildSummary;
