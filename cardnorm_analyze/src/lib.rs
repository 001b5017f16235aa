#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

//! Turns captured card pages into normalized cards.
//!
//! The per-record pipeline is extract → classify → map fields → match rules →
//! apply overrides, all pure; [`AnalysisOrchestrator`] runs it over the
//! pending records of a [`CardStore`](cardnorm_core::CardStore).

pub mod classify;
pub mod extract;
pub mod fields;
pub mod matcher;
pub mod orchestrator;
pub mod overrides;
pub mod pipeline;
pub mod store;

pub use classify::{Classification, classify};
pub use extract::{DefinitionList, Layout, extract};
pub use fields::{Field, FieldKind, FieldValue, MappedFields, map_fields};
pub use matcher::{Matched, RuleError, RuleSet, validate_examples};
pub use orchestrator::{
    AnalysisOrchestrator, BatchFailure, BatchOptions, BatchSummary, DEFAULT_PAGE_SIZE, StopSignal,
};
pub use overrides::OverrideResolver;
pub use pipeline::{Analysis, CardAnalyzer};
pub use store::{DatabaseStore, MemoryStore};
