//! Configuration resolution
//!
//! Two layers, merged once per run:
//! 1. Bundled default configuration (`build/lazit_default.conf.json`)
//! 2. Optional user configuration (`lazit.conf.json` at the project root)
//!
//! The merged tree is then deserialized into the typed schema.

mod defaults;
mod effective;
mod merge;
mod schema;

pub use defaults::{BundledDefaults, DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_JSON, USER_CONFIG_FILE};
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, SourceStatus};
pub use merge::{is_mergeable_key, merge, merge_maps, NO_MERGE_KEYS};
pub use schema::{
    BreakpointSettings, ColorSettings, LazitConfig, RootVars, Settings, Setup, SpacingSettings,
    TokenValue, Utilities, Utility, UtilityDefinition, UtilityKind,
};
