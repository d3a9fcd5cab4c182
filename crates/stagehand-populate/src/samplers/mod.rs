//! Field samplers and their registry.
//!
//! Every field type has a default sampler; recipes override per field via
//! `field_rules`. Samplers draw from the run's seeded random stream only,
//! which keeps population deterministic for a fixed model and seed.

pub mod contact;
pub mod reference;
pub mod scalar;
pub mod text;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::RngCore;
use serde_json::Value;
use stagehand_model::{ContentModel, FieldDefinition, FieldType, FieldValue};
use stagehand_store::EntityStore;

use crate::errors::PopulateError;

/// Everything a sampler may look at while producing one value.
pub struct SamplerContext<'a> {
    pub entity_type: &'a str,
    pub bundle: &'a str,
    pub field: &'a FieldDefinition,
    /// Index of the value within the field, starting at 0.
    pub item_index: u32,
    pub base_date: NaiveDate,
    pub model: &'a ContentModel,
    /// Present when the run can create referenced entities.
    pub store: Option<&'a mut dyn EntityStore>,
}

/// Produces one field value at a time.
///
/// Returning `Ok(None)` means the sampler has nothing to attach for this
/// item; the field is left shorter rather than failing the run.
pub trait Sampler: Send + Sync {
    fn id(&self) -> &'static str;

    fn sample(
        &self,
        ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError>;
}

pub struct SamplerRegistry {
    samplers: BTreeMap<&'static str, Box<dyn Sampler>>,
}

impl SamplerRegistry {
    /// Registry with every built-in sampler.
    pub fn new() -> Self {
        let mut registry = Self {
            samplers: BTreeMap::new(),
        };
        text::register(&mut registry);
        scalar::register(&mut registry);
        contact::register(&mut registry);
        reference::register(&mut registry);
        registry
    }

    pub fn register_sampler(&mut self, sampler: Box<dyn Sampler>) {
        self.samplers.insert(sampler.id(), sampler);
    }

    pub fn sampler(&self, id: &str) -> Option<&dyn Sampler> {
        self.samplers.get(id).map(|sampler| sampler.as_ref())
    }

    /// Registered ids, sorted.
    pub fn sampler_ids(&self) -> Vec<&'static str> {
        self.samplers.keys().copied().collect()
    }
}

impl Default for SamplerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The sampler used for a field type when no rule overrides it.
pub fn default_sampler_id(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String => "text.words",
        FieldType::StringLong | FieldType::TextLong => "text.body",
        FieldType::Integer => "number.int",
        FieldType::Decimal => "number.decimal",
        FieldType::Float => "number.float",
        FieldType::Boolean => "flag.bool",
        FieldType::Datetime => "moment.datetime",
        FieldType::Timestamp => "moment.timestamp",
        FieldType::Email => "contact.email",
        FieldType::Link => "web.link",
        FieldType::Telephone => "contact.telephone",
        FieldType::ListString => "list.allowed",
        FieldType::Reference | FieldType::ReferenceRevisions => "reference.stub",
    }
}
