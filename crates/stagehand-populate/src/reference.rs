//! The reference population routine: bundle resolution and one-stub-per-bundle
//! paragraph fabrication.

use rand::{Rng, RngCore};
use stagehand_model::{ContentModel, FieldDefinition, FieldType, FieldValue, ReferenceSettings};
use stagehand_store::{Entity, EntityStore};

use crate::errors::PopulateError;
use crate::fields::{FieldSampler, stamp_entity};
use crate::model::{PopulateIssue, PopulateReport};

const LABEL_MIN_LEN: u32 = 1;
const LABEL_MAX_LEN: u32 = 10;

/// Bundles a reference field may point at, in declaration order.
///
/// An allow-list selects exactly the listed bundles; with `negate` set it
/// becomes an exclusion list against every bundle of the target type.
/// Negating away every bundle yields an empty list, which callers attach
/// as-is.
pub fn resolve_target_bundles(
    model: &ContentModel,
    settings: &ReferenceSettings,
) -> Result<Vec<String>, PopulateError> {
    let target_type = model
        .entity_type(&settings.target_type)
        .ok_or_else(|| stagehand_model::Error::UnknownEntityType(settings.target_type.clone()))?;

    let bundles = match &settings.target_bundles {
        Some(listed) if !settings.negate => listed.clone(),
        Some(excluded) => target_type
            .bundle_names()
            .into_iter()
            .filter(|name| !excluded.iter().any(|entry| entry == name))
            .map(str::to_string)
            .collect(),
        None => target_type
            .bundle_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };
    Ok(bundles)
}

/// Random lowercase label of 1..=10 letters, the shape the CMS uses for
/// sample entity labels.
pub fn random_label(rng: &mut dyn RngCore) -> String {
    let len = rng.random_range(LABEL_MIN_LEN..=LABEL_MAX_LEN);
    (0..len)
        .map(|_| rng.random_range(b'a'..=b'z') as char)
        .collect()
}

/// Expands a reference field into one saved stub per allowed bundle.
///
/// Each stub gets a random label when the target type has a label key, has
/// its configurable fields filled with sample values, and is saved before
/// its ids are collected. The result order follows the resolved bundle
/// order, truncated by `paragraph_limit` when the recipe caps it.
pub fn populate_reference_field(
    field: &FieldDefinition,
    sampler: &FieldSampler<'_>,
    paragraph_limit: Option<u32>,
    store: &mut dyn EntityStore,
    rng: &mut dyn RngCore,
    report: &mut PopulateReport,
) -> Result<Vec<FieldValue>, PopulateError> {
    let settings = field.reference.as_ref().ok_or_else(|| {
        PopulateError::Unsupported(format!(
            "field {} has no reference settings",
            field.name
        ))
    })?;

    let mut bundles = resolve_target_bundles(sampler.model, settings)?;
    if let Some(limit) = paragraph_limit {
        bundles.truncate(limit as usize);
    }
    if bundles.is_empty() {
        report.record_warning(PopulateIssue {
            level: "warning".to_string(),
            code: "no_allowed_bundles".to_string(),
            message: format!(
                "field {} allows no target bundles, nothing attached",
                field.name
            ),
            entity_type: Some(settings.target_type.clone()),
            bundle: None,
            field: Some(field.name.clone()),
            sampler_id: None,
        });
        return Ok(Vec::new());
    }

    let target_type = sampler
        .model
        .entity_type(&settings.target_type)
        .ok_or_else(|| stagehand_model::Error::UnknownEntityType(settings.target_type.clone()))?;
    let include_revision = field.field_type == FieldType::ReferenceRevisions;

    let mut references = Vec::with_capacity(bundles.len());
    for bundle_name in &bundles {
        let bundle = target_type.bundle(bundle_name).ok_or_else(|| {
            stagehand_model::Error::UnknownBundle(settings.target_type.clone(), bundle_name.clone())
        })?;

        let mut stub = Entity::stub(settings.target_type.clone(), bundle_name.clone());
        if let Some(label_key) = &target_type.label_key {
            let label = random_label(rng);
            stub.set_value(label_key.clone(), vec![FieldValue::Text(label.clone())]);
            stub.label = Some(label);
        }
        stamp_entity(&mut stub, sampler.base_date, rng);

        for stub_field in &bundle.fields {
            if stub_field.base_field {
                continue;
            }
            let values = sampler.populate_field(
                &settings.target_type,
                bundle_name,
                stub_field,
                store,
                rng,
                report,
            )?;
            stub.set_value(stub_field.name.clone(), values);
        }

        let saved = store.save(&mut stub)?;
        report.record_paragraph(bundle_name);
        references.push(FieldValue::Reference {
            target_id: saved.id,
            target_revision_id: include_revision.then_some(saved.revision_id),
        });
    }

    Ok(references)
}
