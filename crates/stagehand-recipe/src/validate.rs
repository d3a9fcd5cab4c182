use std::collections::{HashMap, HashSet};

use jsonschema::JSONSchema;
use serde_json::Value;
use stagehand_model::{ContentModel, FieldDefinition, FieldType};

use crate::RECIPE_VERSION;
use crate::errors::{RecipeError, Result, ValidationIssue, ValidationReport};
use crate::model::{ContentJob, FieldRule, Job, LandingPageJob, ModelRef, Recipe};

const NODE_TYPE: &str = "node";
const LANDING_PAGE_BUNDLE: &str = "landing_page";
const PARAGRAPH_TYPE: &str = "paragraph";

/// A recipe that passed structural and semantic validation.
#[derive(Debug, Clone)]
pub struct ValidatedRecipe {
    pub recipe: Recipe,
    pub warnings: Vec<ValidationIssue>,
}

/// Validates a raw recipe document against the recipe JSON Schema.
pub fn validate_recipe_json(recipe_json: &Value, recipe_schema: &Value) -> Result<ValidationReport> {
    let compiled = JSONSchema::compile(recipe_schema)
        .map_err(|err| RecipeError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();
    if let Err(errors) = compiled.validate(recipe_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error("schema_violation", path, error.to_string(), None);
        }
    }
    Ok(report)
}

/// Semantic checks of a parsed recipe against a content model.
///
/// `known_sampler_ids` lists the sampler ids the executing registry carries;
/// rules naming anything else get an `unknown_sampler` warning. Callers
/// without a registry at hand pass an empty list to skip that check.
pub fn validate_recipe_against_model(
    recipe: &Recipe,
    model: &ContentModel,
    known_sampler_ids: &[&str],
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let index = build_model_index(model);

    if recipe.recipe_version != RECIPE_VERSION {
        report.push_error(
            "recipe_version_unsupported",
            "/recipe_version",
            format!(
                "recipe version {} is not supported (expected {})",
                recipe.recipe_version, RECIPE_VERSION
            ),
            None,
        );
    }

    validate_model_ref(&recipe.model_ref, model, &mut report);

    if recipe.jobs.is_empty() {
        report.push_error(
            "jobs_empty",
            "/jobs",
            "recipe has no jobs",
            Some("add a landing_page or content job".to_string()),
        );
    }
    for (job_index, job) in recipe.jobs.iter().enumerate() {
        match job {
            Job::LandingPage(job) => {
                validate_landing_page_job(job, job_index, &index, &mut report);
            }
            Job::Content(job) => validate_content_job(job, job_index, &index, &mut report),
        }
    }

    validate_field_rules(&recipe.field_rules, &index, known_sampler_ids, &mut report);

    if let Some(options) = &recipe.options {
        if options.paragraph_limit == Some(0) {
            report.push_error(
                "paragraph_limit_zero",
                "/options/paragraph_limit",
                "paragraph_limit must be at least 1",
                None,
            );
        }
    }

    report
}

/// Structural plus semantic validation in one call.
///
/// Structural violations and contract-parse failures short-circuit; semantic
/// findings are merged afterwards. On success the warnings travel with the
/// parsed recipe.
pub fn validate_recipe(
    recipe_json: &Value,
    recipe_schema: &Value,
    model: &ContentModel,
    known_sampler_ids: &[&str],
) -> std::result::Result<ValidatedRecipe, ValidationReport> {
    let mut report = match validate_recipe_json(recipe_json, recipe_schema) {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error("schema_compile_failed", "/", err.to_string(), None);
            return Err(report);
        }
    };
    if !report.is_ok() {
        return Err(report);
    }

    let recipe: Recipe = match serde_json::from_value(recipe_json.clone()) {
        Ok(recipe) => recipe,
        Err(err) => {
            report.push_error(
                "recipe_parse_failed",
                "/",
                format!("recipe does not match the contract: {err}"),
                None,
            );
            return Err(report);
        }
    };

    report.merge(validate_recipe_against_model(&recipe, model, known_sampler_ids));
    if report.is_ok() {
        Ok(ValidatedRecipe {
            recipe,
            warnings: report.warnings,
        })
    } else {
        Err(report)
    }
}

fn validate_model_ref(model_ref: &ModelRef, model: &ContentModel, report: &mut ValidationReport) {
    if model_ref.model_version != model.model_version {
        report.push_error(
            "model_version_mismatch",
            "/model_ref/model_version",
            format!(
                "recipe targets model version {} but the model is {}",
                model_ref.model_version, model.model_version
            ),
            None,
        );
    }
    match (&model_ref.model_fingerprint, &model.model_fingerprint) {
        (Some(expected), Some(actual)) if expected != actual => {
            report.push_error(
                "fingerprint_mismatch",
                "/model_ref/model_fingerprint",
                "model fingerprint does not match the recipe",
                Some("re-export the model or update the recipe's model_ref".to_string()),
            );
        }
        (Some(_), None) => {
            report.push_warning(
                "fingerprint_unverified",
                "/model_ref/model_fingerprint",
                "the model carries no fingerprint to verify against",
                None,
            );
        }
        _ => {}
    }
}

fn validate_landing_page_job(
    job: &LandingPageJob,
    job_index: usize,
    index: &ModelIndex<'_>,
    report: &mut ValidationReport,
) {
    let path = format!("/jobs/{job_index}");
    if job.count == 0 {
        report.push_error(
            "count_zero",
            format!("{path}/count"),
            "job generates nothing",
            Some("set count to at least 1".to_string()),
        );
    }

    let Some(node_type) = index.entity_type(NODE_TYPE) else {
        report.push_error(
            "unknown_entity_type",
            path,
            "model has no node entity type",
            None,
        );
        return;
    };
    let Some(bundle) = node_type.bundles.get(LANDING_PAGE_BUNDLE) else {
        report.push_error(
            "unknown_node_type",
            path,
            format!("model has no {LANDING_PAGE_BUNDLE} node type"),
            None,
        );
        return;
    };

    match bundle.fields.get(job.components_field.as_str()) {
        None => {
            report.push_error(
                "unknown_components_field",
                format!("{path}/components_field"),
                format!(
                    "field {} does not exist on node.{LANDING_PAGE_BUNDLE}",
                    job.components_field
                ),
                None,
            );
        }
        Some(field) if field.field_type != FieldType::ReferenceRevisions => {
            report.push_error(
                "components_not_revisions",
                format!("{path}/components_field"),
                format!(
                    "field {} is not a reference_revisions field",
                    job.components_field
                ),
                None,
            );
        }
        Some(field) => {
            let targets_paragraphs = field
                .reference
                .as_ref()
                .map(|reference| reference.target_type == PARAGRAPH_TYPE)
                .unwrap_or(false);
            if !targets_paragraphs {
                report.push_warning(
                    "components_target_not_paragraph",
                    format!("{path}/components_field"),
                    format!("field {} does not reference paragraphs", job.components_field),
                    None,
                );
            }
        }
    }
}

fn validate_content_job(
    job: &ContentJob,
    job_index: usize,
    index: &ModelIndex<'_>,
    report: &mut ValidationReport,
) {
    let path = format!("/jobs/{job_index}");
    if job.count == 0 {
        report.push_error(
            "count_zero",
            format!("{path}/count"),
            "job generates nothing",
            Some("set count to at least 1".to_string()),
        );
    }

    let node_bundles = index.entity_type(NODE_TYPE).map(|info| &info.bundles);
    let has_node_bundles = node_bundles.map(|bundles| !bundles.is_empty()).unwrap_or(false);
    if !has_node_bundles {
        report.push_error(
            "no_node_types",
            path,
            "no content types can be generated for this model",
            Some("export a model that includes node bundles".to_string()),
        );
        return;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for (entry_index, name) in job.node_types.iter().enumerate() {
        let entry_path = format!("{path}/node_types/{entry_index}");
        if !seen.insert(name.as_str()) {
            report.push_warning(
                "duplicate_node_type",
                entry_path,
                format!("node type {name} is listed more than once"),
                None,
            );
            continue;
        }
        let known = node_bundles
            .map(|bundles| bundles.contains_key(name.as_str()))
            .unwrap_or(false);
        if !known {
            report.push_error(
                "unknown_node_type",
                entry_path,
                format!("node type {name} does not exist in the model"),
                None,
            );
        }
    }
}

fn validate_field_rules(
    rules: &[FieldRule],
    index: &ModelIndex<'_>,
    known_sampler_ids: &[&str],
    report: &mut ValidationReport,
) {
    let mut seen: HashMap<String, String> = HashMap::new();
    for (rule_index, rule) in rules.iter().enumerate() {
        let path = format!("/field_rules/{rule_index}");
        let sampler_id = rule.sampler.id();
        if sampler_id.trim().is_empty() {
            report.push_error(
                "sampler_id_empty",
                format!("{path}/sampler"),
                "sampler id is empty",
                None,
            );
        } else if !known_sampler_ids.is_empty() && !known_sampler_ids.contains(&sampler_id) {
            report.push_warning(
                "unknown_sampler",
                format!("{path}/sampler"),
                format!("sampler {sampler_id} is not a registered sampler id"),
                Some("the run falls back to the field type default".to_string()),
            );
        }
        if let Some(params) = rule.sampler.params() {
            if !params.is_object() {
                report.push_error(
                    "sampler_params_not_object",
                    format!("{path}/sampler/params"),
                    "sampler params must be an object",
                    None,
                );
            }
        }

        let target = format!("{}.{}.{}", rule.entity_type, rule.bundle, rule.field);
        match seen.insert(target.clone(), rule.sampler.id().to_string()) {
            Some(previous) if previous != rule.sampler.id() => {
                report.push_error(
                    "duplicate_field_rule",
                    path.clone(),
                    format!("field {target} has conflicting rules"),
                    None,
                );
            }
            Some(_) => {
                report.push_warning(
                    "duplicate_field_rule",
                    path.clone(),
                    format!("field {target} is ruled more than once"),
                    None,
                );
            }
            None => {}
        }

        let Some(entity_type) = index.entity_type(&rule.entity_type) else {
            report.push_error(
                "unknown_entity_type",
                format!("{path}/entity_type"),
                format!("entity type {} does not exist in the model", rule.entity_type),
                None,
            );
            continue;
        };
        let Some(bundle) = entity_type.bundles.get(rule.bundle.as_str()) else {
            report.push_error(
                "unknown_bundle",
                format!("{path}/bundle"),
                format!(
                    "bundle {}.{} does not exist in the model",
                    rule.entity_type, rule.bundle
                ),
                None,
            );
            continue;
        };
        match bundle.fields.get(rule.field.as_str()) {
            None => {
                report.push_error(
                    "unknown_field",
                    format!("{path}/field"),
                    format!("field {target} does not exist in the model"),
                    None,
                );
            }
            Some(field) if field.base_field => {
                report.push_warning(
                    "base_field_rule",
                    format!("{path}/field"),
                    format!("field {target} is a base field and is never populated"),
                    None,
                );
            }
            Some(_) => {}
        }
    }
}

fn normalized_json_pointer(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

struct ModelIndex<'a> {
    entity_types: HashMap<&'a str, EntityTypeInfo<'a>>,
}

struct EntityTypeInfo<'a> {
    bundles: HashMap<&'a str, BundleInfo<'a>>,
}

struct BundleInfo<'a> {
    fields: HashMap<&'a str, &'a FieldDefinition>,
}

impl<'a> ModelIndex<'a> {
    fn entity_type(&self, name: &str) -> Option<&EntityTypeInfo<'a>> {
        self.entity_types.get(name)
    }
}

fn build_model_index(model: &ContentModel) -> ModelIndex<'_> {
    let mut entity_types = HashMap::new();
    for entity_type in &model.entity_types {
        let mut bundles = HashMap::new();
        for bundle in &entity_type.bundles {
            let mut fields = HashMap::new();
            for field in &bundle.fields {
                fields.insert(field.name.as_str(), field);
            }
            bundles.insert(bundle.name.as_str(), BundleInfo { fields });
        }
        entity_types.insert(entity_type.name.as_str(), EntityTypeInfo { bundles });
    }
    ModelIndex { entity_types }
}
