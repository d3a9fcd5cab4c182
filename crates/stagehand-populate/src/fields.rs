//! Per-field sample population: sampler resolution, cardinality handling,
//! and the common stamping applied to every fabricated entity.

use std::collections::HashMap;

use chrono::NaiveDate;
use rand::{Rng, RngCore};
use serde_json::Value;
use stagehand_model::{Cardinality, ContentModel, FieldDefinition, FieldType, FieldValue};
use stagehand_recipe::FieldRule;
use stagehand_store::{Entity, EntityStore};

use crate::errors::PopulateError;
use crate::model::{PopulateIssue, PopulateReport};
use crate::samplers::{Sampler, SamplerContext, SamplerRegistry, default_sampler_id};

/// Value count drawn for unlimited-cardinality fields.
const UNLIMITED_MIN_ITEMS: u32 = 1;
const UNLIMITED_MAX_ITEMS: u32 = 5;

const PARAGRAPH_TYPE: &str = "paragraph";

/// Field rules from the recipe, keyed by `entity_type.bundle.field`.
pub struct RuleIndex<'a> {
    rules: HashMap<String, &'a FieldRule>,
}

impl<'a> RuleIndex<'a> {
    pub fn new(rules: &'a [FieldRule]) -> Self {
        let mut index = HashMap::new();
        for rule in rules {
            index.insert(rule_key(&rule.entity_type, &rule.bundle, &rule.field), rule);
        }
        Self { rules: index }
    }

    pub fn rule(&self, entity_type: &str, bundle: &str, field: &str) -> Option<&'a FieldRule> {
        self.rules.get(&rule_key(entity_type, bundle, field)).copied()
    }
}

fn rule_key(entity_type: &str, bundle: &str, field: &str) -> String {
    format!("{entity_type}.{bundle}.{field}")
}

/// How many values to fabricate for a field. Unlimited cardinality maps to
/// a small random count, mirroring the sample-item convention of the CMS.
pub fn resolve_item_count(cardinality: Cardinality, rng: &mut dyn RngCore) -> u32 {
    match cardinality.limit() {
        Some(count) => count,
        None => rng.random_range(UNLIMITED_MIN_ITEMS..=UNLIMITED_MAX_ITEMS),
    }
}

/// True for the fields the content job defers to the one-per-bundle
/// paragraph expansion: configurable reference-revisions fields targeting
/// paragraphs with unlimited cardinality.
pub fn is_deferred_paragraph_field(field: &FieldDefinition) -> bool {
    !field.base_field
        && field.field_type == FieldType::ReferenceRevisions
        && field.cardinality.is_unlimited()
        && field
            .reference
            .as_ref()
            .map(|reference| reference.target_type == PARAGRAPH_TYPE)
            .unwrap_or(false)
}

/// Sets the uuid and creation timestamp of a freshly fabricated entity from
/// the run's random stream, keeping artifacts reproducible under a fixed seed.
pub fn stamp_entity(entity: &mut Entity, base_date: NaiveDate, rng: &mut dyn RngCore) {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    entity.uuid = Some(uuid::Builder::from_random_bytes(bytes).into_uuid());
    entity.created = base_date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
}

/// Resolves and runs samplers for individual fields.
pub struct FieldSampler<'a> {
    pub model: &'a ContentModel,
    pub registry: &'a SamplerRegistry,
    pub rules: RuleIndex<'a>,
    pub strict: bool,
    pub base_date: NaiveDate,
}

impl FieldSampler<'_> {
    /// Fabricates every value of one field: resolves the sampler (rule
    /// override or per-type default), draws the item count from the field's
    /// cardinality, and samples once per item.
    pub fn populate_field(
        &self,
        entity_type: &str,
        bundle: &str,
        field: &FieldDefinition,
        store: &mut dyn EntityStore,
        rng: &mut dyn RngCore,
        report: &mut PopulateReport,
    ) -> Result<Vec<FieldValue>, PopulateError> {
        let (sampler, params) = self.resolve_sampler(entity_type, bundle, field, report)?;
        let count = resolve_item_count(field.cardinality, rng);

        let mut values = Vec::with_capacity(count as usize);
        for item_index in 0..count {
            let mut ctx = SamplerContext {
                entity_type,
                bundle,
                field,
                item_index,
                base_date: self.base_date,
                model: self.model,
                store: Some(&mut *store),
            };
            if let Some(value) = sampler.sample(&mut ctx, params, rng)? {
                report.record_sampler_usage(sampler.id());
                values.push(clamp_value(field, value));
            }
        }
        Ok(values)
    }

    fn resolve_sampler(
        &self,
        entity_type: &str,
        bundle: &str,
        field: &FieldDefinition,
        report: &mut PopulateReport,
    ) -> Result<(&dyn Sampler, Option<&Value>), PopulateError> {
        if let Some(rule) = self.rules.rule(entity_type, bundle, &field.name) {
            let id = rule.sampler.id();
            match self.registry.sampler(id) {
                Some(sampler) => return Ok((sampler, rule.sampler.params())),
                None if self.strict => {
                    return Err(PopulateError::InvalidRecipe(format!(
                        "unknown sampler '{id}' for field {entity_type}.{bundle}.{}",
                        field.name
                    )));
                }
                None => {
                    report.record_unknown_sampler();
                    report.record_fallback();
                    report.record_warning(PopulateIssue {
                        level: "warning".to_string(),
                        code: "unknown_sampler".to_string(),
                        message: format!(
                            "sampler '{id}' is not registered, falling back to the default"
                        ),
                        entity_type: Some(entity_type.to_string()),
                        bundle: Some(bundle.to_string()),
                        field: Some(field.name.clone()),
                        sampler_id: Some(id.to_string()),
                    });
                }
            }
        }

        let default_id = default_sampler_id(field.field_type);
        let sampler = self.registry.sampler(default_id).ok_or_else(|| {
            PopulateError::Unsupported(format!(
                "no sampler registered for field type {:?}",
                field.field_type
            ))
        })?;
        Ok((sampler, None))
    }
}

/// Truncates text values to the field's `max_length`, when it has one.
fn clamp_value(field: &FieldDefinition, value: FieldValue) -> FieldValue {
    let Some(max_length) = field.max_length else {
        return value;
    };
    if !field.field_type.is_textual() {
        return value;
    }
    match value {
        FieldValue::Text(text) if text.chars().count() > max_length as usize => {
            FieldValue::Text(text.chars().take(max_length as usize).collect())
        }
        other => other,
    }
}
