use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use stagehand_model::ContentModel;
use stagehand_recipe::{
    Job, Recipe, ValidationReport, recipe_json_schema, validate_recipe,
    validate_recipe_against_model, validate_recipe_json,
};

fn load_json(path: &Path) -> Value {
    let contents =
        fs::read_to_string(path).unwrap_or_else(|_| panic!("missing json at {}", path.display()));
    serde_json::from_str(&contents).expect("parse json")
}

fn load_model() -> ContentModel {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../models/examples/staging_site.model.json");
    serde_json::from_value(load_json(&path)).expect("parse model json")
}

fn load_recipe_json(name: &str) -> Value {
    let path =
        Path::new(env!("CARGO_MANIFEST_DIR")).join(format!("../../recipes/examples/{name}"));
    load_json(&path)
}

fn recipe_schema() -> Value {
    serde_json::to_value(recipe_json_schema()).expect("serialize recipe schema")
}

fn has_error(report: &ValidationReport, code: &str) -> bool {
    report.errors.iter().any(|issue| issue.code == code)
}

fn has_warning(report: &ValidationReport, code: &str) -> bool {
    report.warnings.iter().any(|issue| issue.code == code)
}

#[test]
fn landing_pages_recipe_validates() {
    let recipe_json = load_recipe_json("landing_pages.recipe.json");
    let schema = recipe_schema();
    let model = load_model();

    let structural = validate_recipe_json(&recipe_json, &schema).expect("compile recipe schema");
    assert!(structural.errors.is_empty(), "structural errors found");

    let validated =
        validate_recipe(&recipe_json, &schema, &model, &[]).expect("recipe should validate");
    assert!(validated.warnings.is_empty(), "unexpected warnings");
    assert_eq!(validated.recipe.jobs.len(), 1);
}

#[test]
fn articles_recipe_validates() {
    let recipe_json = load_recipe_json("articles.recipe.json");
    let validated = validate_recipe(&recipe_json, &recipe_schema(), &load_model(), &[])
        .expect("recipe should validate");
    assert!(validated.warnings.is_empty(), "unexpected warnings");
    match &validated.recipe.jobs[0] {
        Job::Content(job) => assert_eq!(job.node_types, vec!["article".to_string()]),
        other => panic!("expected content job, got {other:?}"),
    }
    assert_eq!(validated.recipe.field_rules.len(), 3);
    assert_eq!(validated.recipe.field_rules[2].sampler.id(), "list.allowed");
}

#[test]
fn job_defaults_apply() {
    let recipe: Recipe = serde_json::from_value(json!({
        "recipe_version": "0.1",
        "seed": 1,
        "model_ref": { "model_version": "0.1" },
        "jobs": [ { "type": "landing_page" }, { "type": "content" } ]
    }))
    .expect("parse recipe");

    match &recipe.jobs[0] {
        Job::LandingPage(job) => {
            assert_eq!(job.count, 2);
            assert_eq!(job.title_prefix, "[Stagehand]");
            assert_eq!(job.components_field, "field_components");
            assert!(job.all_paragraphs);
            assert!(!job.kill);
        }
        other => panic!("expected landing page job, got {other:?}"),
    }
    match &recipe.jobs[1] {
        Job::Content(job) => {
            assert_eq!(job.count, 1);
            assert!(job.node_types.is_empty());
            assert!(job.all_paragraphs);
        }
        other => panic!("expected content job, got {other:?}"),
    }
}

#[test]
fn missing_seed_fails_structurally() {
    let mut recipe_json = load_recipe_json("landing_pages.recipe.json");
    recipe_json
        .as_object_mut()
        .expect("recipe object")
        .remove("seed");

    let report =
        validate_recipe_json(&recipe_json, &recipe_schema()).expect("compile recipe schema");
    assert!(!report.errors.is_empty(), "missing seed should be rejected");
    assert!(has_error(&report, "schema_violation"));
}

#[test]
fn unknown_node_type_is_rejected() {
    let mut recipe_json = load_recipe_json("articles.recipe.json");
    recipe_json["jobs"][0]["node_types"][0] = json!("missing");

    let report = validate_recipe(&recipe_json, &recipe_schema(), &load_model(), &[])
        .expect_err("unknown node type should fail");
    assert!(has_error(&report, "unknown_node_type"));
}

#[test]
fn model_version_mismatch_is_rejected() {
    let mut recipe_json = load_recipe_json("landing_pages.recipe.json");
    recipe_json["model_ref"]["model_version"] = json!("9.9");

    let report = validate_recipe(&recipe_json, &recipe_schema(), &load_model(), &[])
        .expect_err("version mismatch should fail");
    assert!(has_error(&report, "model_version_mismatch"));
}

#[test]
fn fingerprint_pinning() {
    let model = load_model();
    let mut recipe: Recipe =
        serde_json::from_value(load_recipe_json("landing_pages.recipe.json"))
            .expect("parse recipe");

    recipe.model_ref.model_fingerprint = Some("abc123".to_string());
    let report = validate_recipe_against_model(&recipe, &model, &[]);
    assert!(
        has_warning(&report, "fingerprint_unverified"),
        "model without fingerprint should only warn"
    );

    let mut stamped = model.clone();
    stamped.model_fingerprint = Some("def456".to_string());
    let report = validate_recipe_against_model(&recipe, &stamped, &[]);
    assert!(has_error(&report, "fingerprint_mismatch"));

    recipe.model_ref.model_fingerprint = Some("def456".to_string());
    let report = validate_recipe_against_model(&recipe, &stamped, &[]);
    assert!(report.is_ok(), "matching fingerprints should pass");
}

#[test]
fn count_zero_is_rejected() {
    let mut recipe_json = load_recipe_json("landing_pages.recipe.json");
    recipe_json["jobs"][0]["count"] = json!(0);

    let report = validate_recipe(&recipe_json, &recipe_schema(), &load_model(), &[])
        .expect_err("count zero should fail");
    assert!(has_error(&report, "count_zero"));
}

#[test]
fn empty_jobs_are_rejected() {
    let mut recipe_json = load_recipe_json("landing_pages.recipe.json");
    recipe_json["jobs"] = json!([]);

    let report = validate_recipe(&recipe_json, &recipe_schema(), &load_model(), &[])
        .expect_err("empty jobs should fail");
    assert!(has_error(&report, "jobs_empty"));
}

#[test]
fn components_field_must_be_reference_revisions() {
    let mut recipe_json = load_recipe_json("landing_pages.recipe.json");
    recipe_json["jobs"][0]["components_field"] = json!("field_summary");

    let report = validate_recipe(&recipe_json, &recipe_schema(), &load_model(), &[])
        .expect_err("non-revisions components field should fail");
    assert!(has_error(&report, "components_not_revisions"));
}

#[test]
fn conflicting_field_rules_are_rejected() {
    let mut recipe_json = load_recipe_json("articles.recipe.json");
    recipe_json["field_rules"]
        .as_array_mut()
        .expect("field_rules array")
        .push(json!({
            "entity_type": "node",
            "bundle": "article",
            "field": "field_rating",
            "sampler": "number.decimal"
        }));

    let report = validate_recipe(&recipe_json, &recipe_schema(), &load_model(), &[])
        .expect_err("conflicting rules should fail");
    assert!(has_error(&report, "duplicate_field_rule"));
}

#[test]
fn repeated_identical_rule_only_warns() {
    let mut recipe_json = load_recipe_json("articles.recipe.json");
    recipe_json["field_rules"]
        .as_array_mut()
        .expect("field_rules array")
        .push(json!({
            "entity_type": "node",
            "bundle": "article",
            "field": "field_topics",
            "sampler": "list.allowed"
        }));

    let validated = validate_recipe(&recipe_json, &recipe_schema(), &load_model(), &[])
        .expect("identical duplicate should still validate");
    assert!(
        validated
            .warnings
            .iter()
            .any(|issue| issue.code == "duplicate_field_rule")
    );
}

#[test]
fn base_field_rule_warns() {
    let mut recipe_json = load_recipe_json("articles.recipe.json");
    recipe_json["field_rules"]
        .as_array_mut()
        .expect("field_rules array")
        .push(json!({
            "entity_type": "node",
            "bundle": "article",
            "field": "title",
            "sampler": "text.sentence"
        }));

    let validated = validate_recipe(&recipe_json, &recipe_schema(), &load_model(), &[])
        .expect("base field rule should still validate");
    assert!(
        validated
            .warnings
            .iter()
            .any(|issue| issue.code == "base_field_rule")
    );
}

#[test]
fn unknown_sampler_id_warns_against_the_registry() {
    let known = ["text.body", "number.int", "list.allowed"];

    let mut recipe_json = load_recipe_json("articles.recipe.json");
    recipe_json["field_rules"][1]["sampler"]["id"] = json!("number.itn");

    let validated = validate_recipe(&recipe_json, &recipe_schema(), &load_model(), &known)
        .expect("typo'd sampler id should only warn");
    let warning = validated
        .warnings
        .iter()
        .find(|issue| issue.code == "unknown_sampler")
        .expect("expected an unknown_sampler warning");
    assert_eq!(warning.path, "/field_rules/1/sampler");
    assert!(warning.message.contains("number.itn"));

    // Without a registry to check against, the rule passes silently.
    let validated = validate_recipe(&recipe_json, &recipe_schema(), &load_model(), &[])
        .expect("recipe should validate");
    assert!(
        !validated
            .warnings
            .iter()
            .any(|issue| issue.code == "unknown_sampler")
    );
}

#[test]
fn paragraph_limit_zero_is_rejected() {
    let mut recipe_json = load_recipe_json("landing_pages.recipe.json");
    recipe_json["options"] = json!({ "paragraph_limit": 0 });

    let report = validate_recipe(&recipe_json, &recipe_schema(), &load_model(), &[])
        .expect_err("paragraph_limit 0 should fail");
    assert!(has_error(&report, "paragraph_limit_zero"));
}
