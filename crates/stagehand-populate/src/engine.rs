//! The population engine: runs recipe jobs against a model and a store and
//! leaves run artifacts behind.

use std::path::{Path, PathBuf};
use std::time::Instant;

use fake::Fake;
use fake::faker::lorem::en::Sentence;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use stagehand_model::{ContentModel, EntityTypeDef, FieldDefinition, FieldValue, validate_model};
use stagehand_recipe::{
    ContentJob, Job, LandingPageJob, Recipe, ValidationIssue, ValidationReport,
    recipe_json_schema, validate_recipe,
};
use stagehand_store::{Entity, EntityStore};

use crate::errors::PopulateError;
use crate::fields::{FieldSampler, RuleIndex, is_deferred_paragraph_field, stamp_entity};
use crate::model::{JobReport, PopulateIssue, PopulateOptions, PopulateOutcome, PopulateReport};
use crate::output::csv::write_entity_index;
use crate::reference::populate_reference_field;
use crate::samplers::SamplerRegistry;

const NODE_TYPE: &str = "node";
const LANDING_PAGE_BUNDLE: &str = "landing_page";
const TITLE_MIN_WORDS: usize = 4;
const TITLE_MAX_WORDS: usize = 10;

/// Entry point for populating a store from model + recipe.
#[derive(Debug, Clone)]
pub struct PopulateEngine {
    options: PopulateOptions,
}

impl PopulateEngine {
    pub fn new(options: PopulateOptions) -> Self {
        Self { options }
    }

    /// Runs the recipe, creating a fresh `{timestamp}__run_{id}` directory
    /// under the configured output directory.
    pub fn run(
        &self,
        model: &ContentModel,
        recipe: &Recipe,
        store: &mut dyn EntityStore,
    ) -> Result<PopulateOutcome, PopulateError> {
        let run_id = self.run_id();
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
        let run_dir = self
            .options
            .out_dir
            .join(format!("{timestamp}__run_{run_id}"));
        self.execute(model, recipe, store, run_dir, run_id)
    }

    /// Runs the recipe with artifacts written into an existing directory,
    /// for callers that manage run directories themselves.
    pub fn run_in_dir(
        &self,
        model: &ContentModel,
        recipe: &Recipe,
        store: &mut dyn EntityStore,
        run_dir: &Path,
    ) -> Result<PopulateOutcome, PopulateError> {
        self.execute(model, recipe, store, run_dir.to_path_buf(), self.run_id())
    }

    fn run_id(&self) -> String {
        self.options
            .run_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }

    fn execute(
        &self,
        model: &ContentModel,
        recipe: &Recipe,
        store: &mut dyn EntityStore,
        run_dir: PathBuf,
        run_id: String,
    ) -> Result<PopulateOutcome, PopulateError> {
        let start = Instant::now();

        validate_model(model)?;
        let registry = SamplerRegistry::new();
        let recipe_json = serde_json::to_value(recipe)?;
        let schema = serde_json::to_value(recipe_json_schema())?;
        let validated = validate_recipe(&recipe_json, &schema, model, &registry.sampler_ids())
            .map_err(|report| PopulateError::InvalidRecipe(summarize_failures(&report)))?;

        let strict = recipe
            .options
            .as_ref()
            .and_then(|options| options.strict)
            .unwrap_or(self.options.strict);
        let paragraph_limit = recipe
            .options
            .as_ref()
            .and_then(|options| options.paragraph_limit);

        std::fs::create_dir_all(&run_dir)?;
        std::fs::write(
            run_dir.join("resolved_recipe.json"),
            serde_json::to_vec_pretty(recipe)?,
        )?;

        let mut report = PopulateReport::new(run_id.clone(), recipe.seed, strict);
        for issue in &validated.warnings {
            report.record_warning(validation_warning(issue));
        }

        let sampler = FieldSampler {
            model,
            registry: &registry,
            rules: RuleIndex::new(&recipe.field_rules),
            strict,
            base_date: self.options.base_date,
        };

        info!(
            run_id = %run_id,
            jobs = recipe.jobs.len(),
            strict,
            seed = recipe.seed,
            "population started"
        );

        for (job_index, job) in recipe.jobs.iter().enumerate() {
            match job {
                Job::LandingPage(job) => self.run_landing_page(
                    job,
                    job_index,
                    model,
                    &sampler,
                    paragraph_limit,
                    store,
                    recipe.seed,
                    &mut report,
                )?,
                Job::Content(job) => self.run_content(
                    job,
                    job_index,
                    model,
                    &sampler,
                    paragraph_limit,
                    store,
                    recipe.seed,
                    &mut report,
                )?,
            }
        }

        let entities = store.all();
        std::fs::write(
            run_dir.join("entities.json"),
            serde_json::to_vec_pretty(&entities)?,
        )?;
        report.bytes_written = write_entity_index(&run_dir.join("entities.csv"), &entities)?;
        report.duration_ms = start.elapsed().as_millis() as u64;

        std::fs::write(
            run_dir.join("populate_report.json"),
            serde_json::to_vec_pretty(&report)?,
        )?;

        if strict && !report.warnings.is_empty() {
            warn!(
                run_id = %run_id,
                warnings = report.warnings.len(),
                "population finished with warnings in strict mode"
            );
            return Err(PopulateError::Failed(report));
        }

        info!(
            run_id = %run_id,
            nodes = report.nodes_created,
            duration_ms = report.duration_ms,
            bytes_written = report.bytes_written,
            "population completed"
        );
        Ok(PopulateOutcome { run_dir, report })
    }

    #[allow(clippy::too_many_arguments)]
    fn run_landing_page(
        &self,
        job: &LandingPageJob,
        job_index: usize,
        model: &ContentModel,
        sampler: &FieldSampler<'_>,
        paragraph_limit: Option<u32>,
        store: &mut dyn EntityStore,
        seed: u64,
        report: &mut PopulateReport,
    ) -> Result<(), PopulateError> {
        let job_seed = hash_seed(seed, &format!("job/{job_index}/landing_page"));

        let mut killed = 0;
        if job.kill {
            let ids = store.ids_of_bundle(NODE_TYPE, LANDING_PAGE_BUNDLE);
            killed = store.delete(NODE_TYPE, &ids)?;
            info!(job = job_index, killed, "existing landing pages deleted");
        }

        let node_type = model.entity_type(NODE_TYPE).ok_or_else(|| {
            PopulateError::Unsupported("model has no node entity type".to_string())
        })?;
        let bundle = node_type.bundle(LANDING_PAGE_BUNDLE).ok_or_else(|| {
            PopulateError::Unsupported(format!("model has no {LANDING_PAGE_BUNDLE} node type"))
        })?;

        let mut created = 0;
        for ordinal in 0..job.count {
            let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(job_seed, &format!("node/{ordinal}")));
            let mut node = Entity::stub(NODE_TYPE, LANDING_PAGE_BUNDLE);
            set_title(&mut node, node_type, &job.title_prefix, &mut rng);
            stamp_entity(&mut node, self.options.base_date, &mut rng);

            for field in &bundle.fields {
                if field.base_field {
                    continue;
                }
                // With all_paragraphs the components field is deferred to the
                // one-per-bundle expansion below.
                if job.all_paragraphs && field.name == job.components_field {
                    continue;
                }
                let values = sampler.populate_field(
                    NODE_TYPE,
                    LANDING_PAGE_BUNDLE,
                    field,
                    store,
                    &mut rng,
                    report,
                )?;
                node.set_value(field.name.clone(), values);
            }

            if job.all_paragraphs {
                if let Some(field) = bundle.field(&job.components_field) {
                    let references = populate_reference_field(
                        field,
                        sampler,
                        paragraph_limit,
                        store,
                        &mut rng,
                        report,
                    )?;
                    node.set_value(field.name.clone(), references);
                }
            }

            let saved = store.save(&mut node)?;
            report.record_node();
            created += 1;
            info!(job = job_index, id = saved.id, "created landing page node");
        }

        report.jobs.push(JobReport {
            job: "landing_page".to_string(),
            bundle: LANDING_PAGE_BUNDLE.to_string(),
            requested: job.count,
            created,
            killed,
        });
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn run_content(
        &self,
        job: &ContentJob,
        job_index: usize,
        model: &ContentModel,
        sampler: &FieldSampler<'_>,
        paragraph_limit: Option<u32>,
        store: &mut dyn EntityStore,
        seed: u64,
        report: &mut PopulateReport,
    ) -> Result<(), PopulateError> {
        let job_seed = hash_seed(seed, &format!("job/{job_index}/content"));

        let node_type = model
            .entity_type(NODE_TYPE)
            .filter(|def| !def.bundles.is_empty())
            .ok_or_else(|| {
                PopulateError::Unsupported(
                    "no content types can be generated for this model".to_string(),
                )
            })?;

        let selected: Vec<&str> = if job.node_types.is_empty() {
            node_type.bundle_names()
        } else {
            job.node_types.iter().map(String::as_str).collect()
        };

        for bundle_name in selected {
            let bundle = node_type.bundle(bundle_name).ok_or_else(|| {
                PopulateError::InvalidRecipe(format!(
                    "node type {bundle_name} does not exist in the model"
                ))
            })?;

            let mut created = 0;
            for ordinal in 0..job.count {
                let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(
                    job_seed,
                    &format!("{bundle_name}/{ordinal}"),
                ));
                let mut node = Entity::stub(NODE_TYPE, bundle_name);
                set_title(&mut node, node_type, &job.title_prefix, &mut rng);
                stamp_entity(&mut node, self.options.base_date, &mut rng);

                let deferred: Vec<&FieldDefinition> = if job.all_paragraphs {
                    bundle
                        .fields
                        .iter()
                        .filter(|field| is_deferred_paragraph_field(field))
                        .collect()
                } else {
                    Vec::new()
                };

                for field in &bundle.fields {
                    if field.base_field {
                        continue;
                    }
                    if deferred.iter().any(|skip| skip.name == field.name) {
                        continue;
                    }
                    let values = sampler.populate_field(
                        NODE_TYPE,
                        bundle_name,
                        field,
                        store,
                        &mut rng,
                        report,
                    )?;
                    node.set_value(field.name.clone(), values);
                }

                for field in &deferred {
                    let references = populate_reference_field(
                        field,
                        sampler,
                        paragraph_limit,
                        store,
                        &mut rng,
                        report,
                    )?;
                    node.set_value(field.name.clone(), references);
                }

                let saved = store.save(&mut node)?;
                report.record_node();
                created += 1;
                info!(
                    job = job_index,
                    node_type = %bundle_name,
                    id = saved.id,
                    "created node"
                );
            }

            report.jobs.push(JobReport {
                job: "content".to_string(),
                bundle: bundle_name.to_string(),
                requested: job.count,
                created,
                killed: 0,
            });
        }
        Ok(())
    }
}

/// Titles a node: a lorem sentence, with the configured prefix prepended
/// when it is non-empty.
fn set_title(
    node: &mut Entity,
    node_type: &EntityTypeDef,
    prefix: &str,
    rng: &mut dyn RngCore,
) {
    let sentence: String = Sentence(TITLE_MIN_WORDS..TITLE_MAX_WORDS + 1).fake_with_rng(rng);
    let title = if prefix.is_empty() {
        sentence
    } else {
        format!("{prefix} {sentence}")
    };
    if let Some(label_key) = &node_type.label_key {
        node.set_value(label_key.clone(), vec![FieldValue::Text(title.clone())]);
    }
    node.label = Some(title);
}

fn validation_warning(issue: &ValidationIssue) -> PopulateIssue {
    PopulateIssue {
        level: "warning".to_string(),
        code: issue.code.clone(),
        message: format!("{} (at {})", issue.message, issue.path),
        entity_type: None,
        bundle: None,
        field: None,
        sampler_id: None,
    }
}

fn summarize_failures(report: &ValidationReport) -> String {
    let first = report
        .errors
        .first()
        .map(|issue| format!("{} at {}: {}", issue.code, issue.path, issue.message))
        .unwrap_or_else(|| "unknown validation failure".to_string());
    if report.errors.len() > 1 {
        format!("{first} (+{} more)", report.errors.len() - 1)
    } else {
        first
    }
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
