//! Build summary written next to the compiled stylesheet

mod build_summary;

pub use build_summary::{
    BuildSummary, FragmentRecord, BUILD_SUMMARY_SCHEMA_ID, BUILD_SUMMARY_SCHEMA_VERSION,
};
