//! Stage orchestration for hcmdoc.
//!
//! This crate ties the link extractor, format converter and metadata
//! extractor together into a single forward-only run (see [`pipeline`]).

pub mod pipeline;

pub use pipeline::{
    ConvertSummary, HarvestSummary, LinksSummary, PipelineConfig, PipelineSummary,
    ProgressReporter, SilentProgress, convert_stage, extract_links_stage,
    extract_metadata_stage, run_pipeline,
};
