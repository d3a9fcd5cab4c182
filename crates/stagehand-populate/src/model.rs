use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

/// Knobs for a population run.
#[derive(Debug, Clone)]
pub struct PopulateOptions {
    /// Directory that receives the run artifacts. Created if missing.
    pub out_dir: PathBuf,
    /// Fail the run when it would otherwise finish with warnings. A recipe's
    /// own `options.strict` takes precedence.
    pub strict: bool,
    /// Anchor date for generated `created` timestamps, kept fixed so runs
    /// with the same seed produce identical artifacts.
    pub base_date: NaiveDate,
    /// Run id to stamp into the report. Generated when absent.
    pub run_id: Option<String>,
}

impl Default for PopulateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            strict: false,
            base_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            run_id: None,
        }
    }
}

/// Per-job outcome counters.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// Job kind, `landing_page` or `content`.
    pub job: String,
    /// Node type the entry covers.
    pub bundle: String,
    pub requested: u32,
    pub created: u64,
    pub killed: u64,
}

/// One finding recorded during population.
#[derive(Debug, Clone, Serialize)]
pub struct PopulateIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler_id: Option<String>,
}

/// Summary of a population run, written as `populate_report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct PopulateReport {
    pub run_id: String,
    pub seed: u64,
    pub strict: bool,
    pub jobs: Vec<JobReport>,
    pub nodes_created: u64,
    pub paragraphs_by_bundle: BTreeMap<String, u64>,
    pub sampler_usage: BTreeMap<String, u64>,
    pub fallbacks: u64,
    pub unknown_sampler_ids: u64,
    pub warnings_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<PopulateIssue>,
    pub duration_ms: u64,
    pub bytes_written: u64,
}

impl PopulateReport {
    pub fn new(run_id: String, seed: u64, strict: bool) -> Self {
        Self {
            run_id,
            seed,
            strict,
            jobs: Vec::new(),
            nodes_created: 0,
            paragraphs_by_bundle: BTreeMap::new(),
            sampler_usage: BTreeMap::new(),
            fallbacks: 0,
            unknown_sampler_ids: 0,
            warnings_by_code: BTreeMap::new(),
            warnings: Vec::new(),
            duration_ms: 0,
            bytes_written: 0,
        }
    }

    pub fn record_node(&mut self) {
        self.nodes_created += 1;
    }

    pub fn record_paragraph(&mut self, bundle: &str) {
        *self
            .paragraphs_by_bundle
            .entry(bundle.to_string())
            .or_insert(0) += 1;
    }

    pub fn record_sampler_usage(&mut self, sampler_id: &str) {
        *self
            .sampler_usage
            .entry(sampler_id.to_string())
            .or_insert(0) += 1;
    }

    pub fn record_fallback(&mut self) {
        self.fallbacks += 1;
    }

    pub fn record_unknown_sampler(&mut self) {
        self.unknown_sampler_ids += 1;
    }

    pub fn record_warning(&mut self, issue: PopulateIssue) {
        *self
            .warnings_by_code
            .entry(issue.code.clone())
            .or_insert(0) += 1;
        self.warnings.push(issue);
    }
}

/// Where a finished run left its artifacts.
#[derive(Debug, Clone)]
pub struct PopulateOutcome {
    pub run_dir: PathBuf,
    pub report: PopulateReport,
}
