//! Contact and web samplers backed by `fake`.

use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Word, Words};
use fake::faker::phone_number::en::PhoneNumber;
use rand::{Rng, RngCore};
use serde_json::Value;
use stagehand_model::FieldValue;

use crate::errors::PopulateError;
use crate::params::validate_params;
use crate::samplers::{Sampler, SamplerContext, SamplerRegistry};

const LINK_TITLE_RATIO: f64 = 0.5;

pub fn register(registry: &mut SamplerRegistry) {
    registry.register_sampler(Box::new(EmailSampler));
    registry.register_sampler(Box::new(TelephoneSampler));
    registry.register_sampler(Box::new(LinkSampler));
}

/// Safe (example-domain) email addresses.
pub struct EmailSampler;

impl Sampler for EmailSampler {
    fn id(&self) -> &'static str {
        "contact.email"
    }

    fn sample(
        &self,
        _ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        validate_params(params, &[], self.id())?;
        let value: String = SafeEmail().fake_with_rng(rng);
        Ok(Some(FieldValue::Text(value)))
    }
}

pub struct TelephoneSampler;

impl Sampler for TelephoneSampler {
    fn id(&self) -> &'static str {
        "contact.telephone"
    }

    fn sample(
        &self,
        _ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        validate_params(params, &[], self.id())?;
        let value: String = PhoneNumber().fake_with_rng(rng);
        Ok(Some(FieldValue::Text(value)))
    }
}

/// Link values with an example-domain uri and an occasional title.
pub struct LinkSampler;

impl Sampler for LinkSampler {
    fn id(&self) -> &'static str {
        "web.link"
    }

    fn sample(
        &self,
        _ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        validate_params(params, &[], self.id())?;
        let host: String = Word().fake_with_rng(rng);
        let path: String = Word().fake_with_rng(rng);
        let uri = format!("https://{host}.example.com/{path}");

        let title = if rng.random_bool(LINK_TITLE_RATIO) {
            let words: Vec<String> = Words(2..5).fake_with_rng(rng);
            Some(words.join(" "))
        } else {
            None
        };

        Ok(Some(FieldValue::Link { uri, title }))
    }
}
