//! The generic reference sampler used for nested reference fields.
//!
//! Where the one-per-bundle expansion fabricates a fully populated paragraph
//! per allowed bundle, this sampler saves a single bare stub of one randomly
//! chosen bundle and references it. Paragraph fields inside paragraphs go
//! through here, which caps the recursion at one level.

use rand::{Rng, RngCore};
use serde_json::Value;
use stagehand_model::{FieldType, FieldValue};
use stagehand_store::Entity;

use crate::errors::PopulateError;
use crate::fields::stamp_entity;
use crate::params::validate_params;
use crate::reference::{random_label, resolve_target_bundles};
use crate::samplers::{Sampler, SamplerContext, SamplerRegistry};

pub fn register(registry: &mut SamplerRegistry) {
    registry.register_sampler(Box::new(StubSampler));
}

pub struct StubSampler;

impl Sampler for StubSampler {
    fn id(&self) -> &'static str {
        "reference.stub"
    }

    fn sample(
        &self,
        ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        validate_params(params, &[], self.id())?;
        let Some(settings) = ctx.field.reference.as_ref() else {
            return Err(PopulateError::Unsupported(format!(
                "field {} is not a reference field",
                ctx.field.name
            )));
        };

        let bundles = resolve_target_bundles(ctx.model, settings)?;
        if bundles.is_empty() {
            return Ok(None);
        }
        let bundle = &bundles[rng.random_range(0..bundles.len())];

        let target_type = ctx
            .model
            .entity_type(&settings.target_type)
            .ok_or_else(|| {
                stagehand_model::Error::UnknownEntityType(settings.target_type.clone())
            })?;

        // Without a store there is nothing to reference.
        let Some(store) = ctx.store.as_deref_mut() else {
            return Ok(None);
        };

        let mut stub = Entity::stub(settings.target_type.clone(), bundle.clone());
        if let Some(label_key) = &target_type.label_key {
            let label = random_label(rng);
            stub.set_value(label_key.clone(), vec![FieldValue::Text(label.clone())]);
            stub.label = Some(label);
        }
        stamp_entity(&mut stub, ctx.base_date, rng);

        let saved = store.save(&mut stub)?;
        let include_revision = ctx.field.field_type == FieldType::ReferenceRevisions;
        Ok(Some(FieldValue::Reference {
            target_id: saved.id,
            target_revision_id: include_revision.then_some(saved.revision_id),
        }))
    }
}
