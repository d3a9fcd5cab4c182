//! Deterministic fabrication of synthetic CMS content.
//!
//! This crate consumes a content model plus a recipe and fills an entity
//! store with nodes and paragraph sub-entities. Runs are seeded: the same
//! model and recipe produce byte-identical artifacts.

pub mod engine;
pub mod errors;
pub mod fields;
pub mod model;
pub mod output;
pub mod params;
pub mod reference;
pub mod samplers;

pub use engine::PopulateEngine;
pub use errors::PopulateError;
pub use model::{JobReport, PopulateIssue, PopulateOptions, PopulateOutcome, PopulateReport};
pub use reference::{populate_reference_field, resolve_target_bundles};
pub use samplers::{Sampler, SamplerContext, SamplerRegistry, default_sampler_id};
