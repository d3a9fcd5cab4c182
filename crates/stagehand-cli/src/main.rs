mod registry;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use registry::{RegistryError, RunContext, RunOptions, init_run_logging, start_run};
use settings::{SettingsError, StagehandSettings, load_or_create_settings};
use stagehand_model::{ContentModel, model_fingerprint, model_json_schema, validate_model};
use stagehand_populate::{PopulateEngine, PopulateError, PopulateOptions, SamplerRegistry};
use stagehand_recipe::{
    ContentJob, IssueSeverity, Job, LandingPageJob, ModelRef, RECIPE_VERSION, Recipe,
    ValidationIssue, recipe_json_schema, validate_recipe,
};
use stagehand_store::MemoryStore;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("model error: {0}")]
    Model(#[from] stagehand_model::Error),
    #[error("population error: {0}")]
    Populate(#[from] PopulateError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("recipe failed validation with {0} error(s)")]
    ValidationFailed(usize),
}

#[derive(Parser, Debug)]
#[command(name = "stagehand", version, about = "Synthetic CMS content fabricator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fabricate landing pages with one paragraph of every allowed bundle.
    LandingPage(LandingPageArgs),
    /// Fabricate nodes of selected types, expanding paragraph fields.
    Content(ContentArgs),
    /// Execute a full recipe file.
    Run(RunArgs),
    /// Validate a recipe against a model without fabricating anything.
    Validate(ValidateArgs),
    /// Print a JSON Schema contract.
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Content model JSON file.
    #[arg(long, value_name = "PATH")]
    model: PathBuf,
    /// Directory that receives run directories.
    #[arg(long, value_name = "DIR")]
    run_dir: Option<PathBuf>,
    /// Settings file with quick-command defaults.
    #[arg(long, value_name = "PATH", default_value = "stagehand.toml")]
    settings: PathBuf,
    /// Seed for the deterministic random stream.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Args, Debug)]
struct LandingPageArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Landing pages to fabricate.
    #[arg(long)]
    count: Option<u32>,
    /// Title prefix; pass an empty string for bare titles.
    #[arg(long)]
    prefix: Option<String>,
    /// Field that receives the paragraphs.
    #[arg(long)]
    components_field: Option<String>,
    /// Delete existing landing pages first.
    #[arg(long, default_value_t = false)]
    kill: bool,
    /// Sample the components field generically instead of expanding it.
    #[arg(long, default_value_t = false)]
    no_paragraphs: bool,
}

#[derive(Args, Debug)]
struct ContentArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Node type to fabricate; repeat for several, omit for all.
    #[arg(long = "node-type", value_name = "TYPE")]
    node_types: Vec<String>,
    /// Nodes per type.
    #[arg(long)]
    count: Option<u32>,
    /// Title prefix; pass an empty string for bare titles.
    #[arg(long)]
    prefix: Option<String>,
    /// Skip the one-per-bundle paragraph expansion.
    #[arg(long, default_value_t = false)]
    no_paragraphs: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Recipe JSON file.
    #[arg(long, value_name = "PATH")]
    recipe: PathBuf,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Content model JSON file.
    #[arg(long, value_name = "PATH")]
    model: PathBuf,
    /// Recipe JSON file.
    #[arg(long, value_name = "PATH")]
    recipe: PathBuf,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Which contract to print.
    #[arg(long, value_enum, default_value_t = Contract::Recipe)]
    contract: Contract,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Contract {
    Model,
    Recipe,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::LandingPage(args) => run_landing_page(args),
        Command::Content(args) => run_content(args),
        Command::Run(args) => run_recipe(args),
        Command::Validate(args) => run_validate(args),
        Command::Schema(args) => run_schema(args),
    }
}

fn run_landing_page(args: LandingPageArgs) -> Result<(), CliError> {
    let settings = load_or_create_settings(&args.common.settings)?;
    let model = load_model(&args.common.model)?;

    let job = LandingPageJob {
        count: args.count.unwrap_or(settings.default_count),
        title_prefix: args
            .prefix
            .unwrap_or_else(|| settings.title_prefix.clone()),
        components_field: args
            .components_field
            .unwrap_or_else(|| settings.components_field.clone()),
        all_paragraphs: !args.no_paragraphs,
        kill: args.kill,
    };
    let recipe = quick_recipe(&model, args.common.seed, Job::LandingPage(job));

    execute_run(&model, &recipe, runs_dir(args.common.run_dir, &settings))
}

fn run_content(args: ContentArgs) -> Result<(), CliError> {
    let settings = load_or_create_settings(&args.common.settings)?;
    let model = load_model(&args.common.model)?;

    let job = ContentJob {
        node_types: args.node_types,
        count: args.count.unwrap_or(settings.default_count),
        title_prefix: args
            .prefix
            .unwrap_or_else(|| settings.title_prefix.clone()),
        all_paragraphs: !args.no_paragraphs,
    };
    let recipe = quick_recipe(&model, args.common.seed, Job::Content(job));

    execute_run(&model, &recipe, runs_dir(args.common.run_dir, &settings))
}

fn run_recipe(args: RunArgs) -> Result<(), CliError> {
    let settings = load_or_create_settings(&args.common.settings)?;
    let model = load_model(&args.common.model)?;
    let recipe: Recipe = serde_json::from_str(&std::fs::read_to_string(&args.recipe)?)?;

    execute_run(&model, &recipe, runs_dir(args.common.run_dir, &settings))
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let model = load_model(&args.model)?;
    let recipe_json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&args.recipe)?)?;
    let schema = serde_json::to_value(recipe_json_schema())?;
    let registry = SamplerRegistry::new();

    match validate_recipe(&recipe_json, &schema, &model, &registry.sampler_ids()) {
        Ok(validated) => {
            for issue in &validated.warnings {
                print_issue(issue);
            }
            println!(
                "recipe is valid ({} warning(s))",
                validated.warnings.len()
            );
            Ok(())
        }
        Err(report) => {
            for issue in report.errors.iter().chain(report.warnings.iter()) {
                print_issue(issue);
            }
            Err(CliError::ValidationFailed(report.errors.len()))
        }
    }
}

fn run_schema(args: SchemaArgs) -> Result<(), CliError> {
    let schema = match args.contract {
        Contract::Model => serde_json::to_value(model_json_schema())?,
        Contract::Recipe => serde_json::to_value(recipe_json_schema())?,
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Loads, validates, and fingerprints a content model file.
fn load_model(path: &Path) -> Result<ContentModel, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|err| {
        CliError::InvalidConfig(format!("cannot read model {}: {err}", path.display()))
    })?;
    let mut model: ContentModel = serde_json::from_str(&contents)?;
    validate_model(&model)?;
    if model.model_fingerprint.is_none() {
        model.model_fingerprint = Some(model_fingerprint(&model)?);
    }
    Ok(model)
}

/// A one-job recipe for the quick commands, pinned to the loaded model.
fn quick_recipe(model: &ContentModel, seed: u64, job: Job) -> Recipe {
    Recipe {
        recipe_version: RECIPE_VERSION.to_string(),
        seed,
        model_ref: ModelRef {
            model_version: model.model_version.clone(),
            model_fingerprint: model.model_fingerprint.clone(),
        },
        jobs: vec![job],
        field_rules: Vec::new(),
        options: None,
    }
}

fn runs_dir(flag: Option<PathBuf>, settings: &StagehandSettings) -> PathBuf {
    flag.unwrap_or_else(|| settings.runs_dir.clone())
}

fn execute_run(
    model: &ContentModel,
    recipe: &Recipe,
    runs_dir: PathBuf,
) -> Result<(), CliError> {
    let run_id = Uuid::new_v4().to_string();
    let started_at = chrono::Utc::now();
    let strict = recipe
        .options
        .as_ref()
        .and_then(|options| options.strict)
        .unwrap_or(false);

    let ctx = RunContext {
        run_id: run_id.clone(),
        started_at,
        recipe_version: recipe.recipe_version.clone(),
        model_version: model.model_version.clone(),
        model_fingerprint: model.model_fingerprint.clone(),
        options: RunOptions {
            seed: recipe.seed,
            jobs: recipe.jobs.len(),
            strict,
            runs_dir,
        },
    };

    let run_paths = start_run(&ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(event = "run_started", run_id = %run_id, seed = recipe.seed, jobs = recipe.jobs.len());
    tracing::info!(event = "model_loaded", entity_types = model.entity_types.len());

    let timer = Instant::now();

    let options = PopulateOptions {
        run_id: Some(run_id.clone()),
        strict,
        ..PopulateOptions::default()
    };
    let engine = PopulateEngine::new(options);
    let mut store = MemoryStore::new();
    let outcome = engine.run_in_dir(model, recipe, &mut store, &run_paths.run_root)?;

    for job in &outcome.report.jobs {
        tracing::info!(
            event = "job_finished",
            job = %job.job,
            bundle = %job.bundle,
            created = job.created,
            killed = job.killed
        );
    }

    let duration_ms = timer.elapsed().as_millis() as u64;
    tracing::info!(event = "run_finished", status = "success", duration_ms);

    let paragraphs: u64 = outcome.report.paragraphs_by_bundle.values().sum();
    println!(
        "run {run_id}: {} node(s), {} paragraph(s), artifacts in {}",
        outcome.report.nodes_created,
        paragraphs,
        outcome.run_dir.display()
    );
    if !outcome.report.warnings.is_empty() {
        println!("{} warning(s), see populate_report.json", outcome.report.warnings.len());
    }
    Ok(())
}

fn print_issue(issue: &ValidationIssue) {
    let severity = match issue.severity {
        IssueSeverity::Error => "error",
        IssueSeverity::Warning => "warning",
    };
    match &issue.hint {
        Some(hint) => println!(
            "{severity} [{}] {}: {} (hint: {hint})",
            issue.code, issue.path, issue.message
        ),
        None => println!("{severity} [{}] {}: {}", issue.code, issue.path, issue.message),
    }
}
