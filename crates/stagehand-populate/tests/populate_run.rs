use std::fs;
use std::path::{Path, PathBuf};

use stagehand_model::ContentModel;
use stagehand_populate::{PopulateEngine, PopulateError, PopulateOptions};
use stagehand_recipe::{Job, Recipe, RecipeOptions, SamplerRef};
use stagehand_store::{Entity, EntityStore, MemoryStore};

fn load_json(path: &Path) -> serde_json::Value {
    let contents =
        fs::read_to_string(path).unwrap_or_else(|_| panic!("missing json at {}", path.display()));
    serde_json::from_str(&contents).expect("parse json")
}

fn load_model() -> ContentModel {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../models/examples/staging_site.model.json");
    serde_json::from_value(load_json(&path)).expect("parse model json")
}

fn load_recipe(name: &str) -> Recipe {
    let path =
        Path::new(env!("CARGO_MANIFEST_DIR")).join(format!("../../recipes/examples/{name}"));
    serde_json::from_value(load_json(&path)).expect("parse recipe json")
}

fn temp_out_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("stagehand_{label}_{}", uuid::Uuid::new_v4()))
}

fn run_options(out_dir: PathBuf) -> PopulateOptions {
    PopulateOptions {
        out_dir,
        run_id: Some("test-run".to_string()),
        ..PopulateOptions::default()
    }
}

fn landing_pages(store: &MemoryStore) -> Vec<Entity> {
    store
        .ids_of_bundle("node", "landing_page")
        .into_iter()
        .filter_map(|id| store.load("node", id).cloned())
        .collect()
}

#[test]
fn landing_page_job_attaches_every_paragraph_bundle() {
    let model = load_model();
    let recipe = load_recipe("landing_pages.recipe.json");
    let out_dir = temp_out_dir("landing");

    let mut store = MemoryStore::new();
    let engine = PopulateEngine::new(run_options(out_dir.clone()));
    let outcome = engine.run(&model, &recipe, &mut store).expect("run recipe");

    let nodes = landing_pages(&store);
    assert_eq!(nodes.len(), 2);
    for node in &nodes {
        let title = node.label.as_deref().expect("node has a title");
        assert!(title.starts_with("[Stagehand] "), "unexpected title {title}");

        let components = node.value("field_components").expect("components attached");
        // field_components has no allow-list, so every paragraph bundle
        // contributes one stub: hero, quote, gallery.
        assert_eq!(components.len(), 3);
        for value in components {
            let (_, revision) = value.as_reference().expect("reference value");
            assert!(revision.is_some(), "components carry revision ids");
        }
    }
    assert_eq!(store.count("paragraph"), 6, "three paragraphs per node");

    assert_eq!(outcome.report.nodes_created, 2);
    assert_eq!(outcome.report.jobs.len(), 1);
    assert_eq!(outcome.report.jobs[0].bundle, "landing_page");
    assert_eq!(outcome.report.jobs[0].created, 2);
    assert_eq!(outcome.report.jobs[0].killed, 0);

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn unlimited_cardinality_draws_between_one_and_five() {
    let model = load_model();
    let recipe = load_recipe("landing_pages.recipe.json");
    let out_dir = temp_out_dir("cardinality");

    let mut store = MemoryStore::new();
    let engine = PopulateEngine::new(run_options(out_dir.clone()));
    engine.run(&model, &recipe, &mut store).expect("run recipe");

    let gallery_ids = store.ids_of_bundle("paragraph", "gallery");
    assert!(!gallery_ids.is_empty(), "landing pages fabricate gallery paragraphs");
    for id in gallery_ids {
        let paragraph = store.load("paragraph", id).expect("load paragraph");
        let captions = paragraph
            .value("field_captions")
            .expect("captions populated");
        assert!(
            (1..=5).contains(&captions.len()),
            "unlimited field produced {} values",
            captions.len()
        );
    }

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn kill_pass_deletes_existing_landing_pages() {
    let model = load_model();
    let mut recipe = load_recipe("landing_pages.recipe.json");
    if let Job::LandingPage(job) = &mut recipe.jobs[0] {
        job.kill = true;
    }
    let out_dir = temp_out_dir("kill");

    let mut store = MemoryStore::new();
    store
        .save(&mut Entity::stub("node", "landing_page"))
        .expect("seed node");
    store
        .save(&mut Entity::stub("node", "landing_page"))
        .expect("seed node");
    store
        .save(&mut Entity::stub("node", "article"))
        .expect("seed article");

    let engine = PopulateEngine::new(run_options(out_dir.clone()));
    let outcome = engine.run(&model, &recipe, &mut store).expect("run recipe");

    assert_eq!(outcome.report.jobs[0].killed, 2);
    assert_eq!(store.ids_of_bundle("node", "landing_page").len(), 2);
    assert_eq!(
        store.ids_of_bundle("node", "article").len(),
        1,
        "kill pass only touches landing pages"
    );

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn kill_pass_with_nothing_to_delete_still_runs() {
    let model = load_model();
    let mut recipe = load_recipe("landing_pages.recipe.json");
    if let Job::LandingPage(job) = &mut recipe.jobs[0] {
        job.kill = true;
    }
    let out_dir = temp_out_dir("kill_empty");

    let mut store = MemoryStore::new();
    let engine = PopulateEngine::new(run_options(out_dir.clone()));
    let outcome = engine.run(&model, &recipe, &mut store).expect("run recipe");

    assert_eq!(outcome.report.jobs[0].killed, 0);
    assert_eq!(outcome.report.jobs[0].created, 2);

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn content_job_expands_allowed_section_bundles() {
    let model = load_model();
    let recipe = load_recipe("articles.recipe.json");
    let out_dir = temp_out_dir("articles");

    let mut store = MemoryStore::new();
    let engine = PopulateEngine::new(run_options(out_dir.clone()));
    let outcome = engine.run(&model, &recipe, &mut store).expect("run recipe");

    let article_ids = store.ids_of_bundle("node", "article");
    assert_eq!(article_ids.len(), 2);
    for id in article_ids {
        let node = store.load("node", id).expect("load article");

        // field_sections allows hero and quote only.
        let sections = node.value("field_sections").expect("sections attached");
        assert_eq!(sections.len(), 2);

        let rating = node
            .first_value("field_rating")
            .and_then(|value| value.as_i64())
            .expect("rating populated");
        assert!((1..=5).contains(&rating), "field rule bounds ignored");

        let topics = node.value("field_topics").expect("topics populated");
        assert_eq!(topics.len(), 3, "fixed cardinality respected");
        for topic in topics {
            let text = topic.as_str().expect("text value");
            assert!(["news", "culture", "science"].contains(&text));
        }
    }
    assert_eq!(store.ids_of_bundle("paragraph", "gallery").len(), 0);

    assert!(outcome.report.warnings.is_empty(), "run should be clean");

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn identical_recipes_produce_identical_artifacts() {
    let model = load_model();
    let recipe = load_recipe("articles.recipe.json");

    let out_a = temp_out_dir("det_a");
    let out_b = temp_out_dir("det_b");

    let mut store_a = MemoryStore::new();
    let outcome_a = PopulateEngine::new(run_options(out_a.clone()))
        .run(&model, &recipe, &mut store_a)
        .expect("run A");

    let mut store_b = MemoryStore::new();
    let outcome_b = PopulateEngine::new(run_options(out_b.clone()))
        .run(&model, &recipe, &mut store_b)
        .expect("run B");

    let entities_a =
        fs::read_to_string(outcome_a.run_dir.join("entities.json")).expect("read entities A");
    let entities_b =
        fs::read_to_string(outcome_b.run_dir.join("entities.json")).expect("read entities B");
    assert_eq!(entities_a, entities_b, "entities.json should be deterministic");

    let index_a =
        fs::read_to_string(outcome_a.run_dir.join("entities.csv")).expect("read index A");
    let index_b =
        fs::read_to_string(outcome_b.run_dir.join("entities.csv")).expect("read index B");
    assert_eq!(index_a, index_b, "entities.csv should be deterministic");

    fs::remove_dir_all(&out_a).ok();
    fs::remove_dir_all(&out_b).ok();
}

#[test]
fn run_writes_all_artifacts() {
    let model = load_model();
    let recipe = load_recipe("landing_pages.recipe.json");
    let out_dir = temp_out_dir("artifacts");

    let mut store = MemoryStore::new();
    let outcome = PopulateEngine::new(run_options(out_dir.clone()))
        .run(&model, &recipe, &mut store)
        .expect("run recipe");

    for name in [
        "resolved_recipe.json",
        "entities.json",
        "entities.csv",
        "populate_report.json",
    ] {
        assert!(
            outcome.run_dir.join(name).exists(),
            "missing artifact {name}"
        );
    }
    assert!(outcome.report.bytes_written > 0);

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn strict_recipe_fails_on_unknown_sampler() {
    let model = load_model();
    let mut recipe = load_recipe("articles.recipe.json");
    recipe.field_rules[0].sampler = SamplerRef::Id("text.bogus".to_string());
    recipe.options = Some(RecipeOptions {
        strict: Some(true),
        paragraph_limit: None,
    });
    let out_dir = temp_out_dir("strict");

    let mut store = MemoryStore::new();
    let err = PopulateEngine::new(run_options(out_dir.clone()))
        .run(&model, &recipe, &mut store)
        .expect_err("strict run should fail");
    assert!(matches!(err, PopulateError::InvalidRecipe(_)));

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn paragraph_limit_caps_the_expansion() {
    let model = load_model();
    let mut recipe = load_recipe("landing_pages.recipe.json");
    recipe.options = Some(RecipeOptions {
        strict: None,
        paragraph_limit: Some(1),
    });
    let out_dir = temp_out_dir("limit");

    let mut store = MemoryStore::new();
    PopulateEngine::new(run_options(out_dir.clone()))
        .run(&model, &recipe, &mut store)
        .expect("run recipe");

    for node in landing_pages(&store) {
        let components = node.value("field_components").expect("components attached");
        assert_eq!(components.len(), 1);
    }
    assert_eq!(store.count("paragraph"), 2, "one paragraph per node");

    fs::remove_dir_all(&out_dir).ok();
}
