use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A population recipe: which jobs to run against which model, plus
/// per-field sampler overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recipe {
    /// Contract version, see [`crate::RECIPE_VERSION`].
    pub recipe_version: String,
    /// Seed for the deterministic random stream.
    pub seed: u64,
    pub model_ref: ModelRef,
    pub jobs: Vec<Job>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_rules: Vec<FieldRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RecipeOptions>,
}

/// Pins a recipe to the model it was written for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelRef {
    pub model_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_fingerprint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Job {
    /// Fabricate landing pages and attach one paragraph of every allowed
    /// bundle to the components field.
    LandingPage(LandingPageJob),
    /// Fabricate nodes of arbitrary types, expanding unlimited paragraph
    /// fields the same way.
    Content(ContentJob),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LandingPageJob {
    #[serde(default = "default_landing_page_count")]
    pub count: u32,
    /// Prepended to every generated title, separated by a space.
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
    /// Reference-revisions field that receives the paragraphs.
    #[serde(default = "default_components_field")]
    pub components_field: String,
    /// When false, the components field goes through the generic sampler
    /// path instead of the one-per-bundle expansion.
    #[serde(default = "default_true")]
    pub all_paragraphs: bool,
    /// Delete existing landing pages before generating new ones.
    #[serde(default)]
    pub kill: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContentJob {
    /// Node types to generate. Empty means every node type in the model.
    #[serde(default)]
    pub node_types: Vec<String>,
    /// Nodes per listed type.
    #[serde(default = "default_content_count")]
    pub count: u32,
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
    /// When true, unlimited paragraph fields get one paragraph of every
    /// allowed bundle instead of random sampler output.
    #[serde(default = "default_true")]
    pub all_paragraphs: bool,
}

/// Overrides the default sampler for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldRule {
    pub entity_type: String,
    pub bundle: String,
    pub field: String,
    pub sampler: SamplerRef,
}

/// Sampler selection, either a bare id or an id with parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SamplerRef {
    Id(String),
    Spec(SamplerSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SamplerSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl SamplerRef {
    pub fn id(&self) -> &str {
        match self {
            SamplerRef::Id(id) => id,
            SamplerRef::Spec(spec) => &spec.id,
        }
    }

    pub fn params(&self) -> Option<&Value> {
        match self {
            SamplerRef::Id(_) => None,
            SamplerRef::Spec(spec) => spec.params.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecipeOptions {
    /// Fail the run when it would otherwise finish with warnings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    /// Caps how many bundles the one-per-bundle expansion attaches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_limit: Option<u32>,
}

fn default_landing_page_count() -> u32 {
    2
}

fn default_content_count() -> u32 {
    1
}

fn default_title_prefix() -> String {
    "[Stagehand]".to_string()
}

fn default_components_field() -> String {
    "field_components".to_string()
}

fn default_true() -> bool {
    true
}
