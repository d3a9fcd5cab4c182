//! Recipe contract and validation.
//!
//! A recipe tells the population engine what to fabricate against a given
//! content model: which jobs to run, how entities are titled, and which
//! samplers override the per-field defaults.

mod errors;
mod model;
mod schema;
mod validate;

pub use errors::{IssueSeverity, RecipeError, Result, ValidationIssue, ValidationReport};
pub use model::{
    ContentJob, FieldRule, Job, LandingPageJob, ModelRef, Recipe, RecipeOptions, SamplerRef,
    SamplerSpec,
};
pub use schema::recipe_json_schema;
pub use validate::{
    ValidatedRecipe, validate_recipe, validate_recipe_against_model, validate_recipe_json,
};

/// Version stamp carried by every serialized recipe document.
pub const RECIPE_VERSION: &str = "0.1";
