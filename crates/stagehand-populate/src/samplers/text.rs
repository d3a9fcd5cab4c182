//! Lorem-style text samplers.

use fake::Fake;
use fake::faker::lorem::en::{Paragraph, Sentence, Word, Words};
use rand::{Rng, RngCore};
use serde_json::Value;
use stagehand_model::FieldValue;

use crate::errors::PopulateError;
use crate::params::{ParamKind, ParamMap, ParamSpec, validate_params};
use crate::samplers::{Sampler, SamplerContext, SamplerRegistry};

const DEFAULT_MIN_WORDS: i64 = 2;
const DEFAULT_MAX_WORDS: i64 = 5;
const DEFAULT_MIN_SENTENCE_WORDS: i64 = 4;
const DEFAULT_MAX_SENTENCE_WORDS: i64 = 10;
const DEFAULT_MIN_SENTENCES: i64 = 2;
const DEFAULT_MAX_SENTENCES: i64 = 5;
const DEFAULT_MAX_REPEAT: u32 = 8;

const WORDS_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min_words", ParamKind::Int, false),
    ParamSpec::new("max_words", ParamKind::Int, false),
];

const SENTENCE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min_words", ParamKind::Int, false),
    ParamSpec::new("max_words", ParamKind::Int, false),
];

const BODY_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min_sentences", ParamKind::Int, false),
    ParamSpec::new("max_sentences", ParamKind::Int, false),
];

const PATTERN_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("pattern", ParamKind::String, true),
    ParamSpec::new("max_repeat", ParamKind::Int, false),
];

pub fn register(registry: &mut SamplerRegistry) {
    registry.register_sampler(Box::new(WordSampler));
    registry.register_sampler(Box::new(WordsSampler));
    registry.register_sampler(Box::new(SentenceSampler));
    registry.register_sampler(Box::new(BodySampler));
    registry.register_sampler(Box::new(PatternSampler));
}

/// A single lorem word.
pub struct WordSampler;

impl Sampler for WordSampler {
    fn id(&self) -> &'static str {
        "text.word"
    }

    fn sample(
        &self,
        _ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        validate_params(params, &[], self.id())?;
        let value: String = Word().fake_with_rng(rng);
        Ok(Some(FieldValue::Text(value)))
    }
}

/// A short run of lorem words, the default for plain string fields.
pub struct WordsSampler;

impl Sampler for WordsSampler {
    fn id(&self) -> &'static str {
        "text.words"
    }

    fn sample(
        &self,
        _ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        let params = validate_params(params, WORDS_PARAMS, self.id())?;
        let (min, max) = resolve_bounds(
            &params,
            ("min_words", DEFAULT_MIN_WORDS),
            ("max_words", DEFAULT_MAX_WORDS),
            self.id(),
        )?;
        let count = rng.random_range(min..=max);
        let words: Vec<String> = Words(count..count + 1).fake_with_rng(rng);
        Ok(Some(FieldValue::Text(words.join(" "))))
    }
}

/// One sentence, the shape node titles are built from.
pub struct SentenceSampler;

impl Sampler for SentenceSampler {
    fn id(&self) -> &'static str {
        "text.sentence"
    }

    fn sample(
        &self,
        _ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        let params = validate_params(params, SENTENCE_PARAMS, self.id())?;
        let (min, max) = resolve_bounds(
            &params,
            ("min_words", DEFAULT_MIN_SENTENCE_WORDS),
            ("max_words", DEFAULT_MAX_SENTENCE_WORDS),
            self.id(),
        )?;
        let value: String = Sentence(min..max + 1).fake_with_rng(rng);
        Ok(Some(FieldValue::Text(value)))
    }
}

/// A paragraph of sentences, the default for long text fields.
pub struct BodySampler;

impl Sampler for BodySampler {
    fn id(&self) -> &'static str {
        "text.body"
    }

    fn sample(
        &self,
        _ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        let params = validate_params(params, BODY_PARAMS, self.id())?;
        let (min, max) = resolve_bounds(
            &params,
            ("min_sentences", DEFAULT_MIN_SENTENCES),
            ("max_sentences", DEFAULT_MAX_SENTENCES),
            self.id(),
        )?;
        let value: String = Paragraph(min..max + 1).fake_with_rng(rng);
        Ok(Some(FieldValue::Text(value)))
    }
}

/// Text matching a regular expression, e.g. SKU-like codes.
pub struct PatternSampler;

impl Sampler for PatternSampler {
    fn id(&self) -> &'static str {
        "text.pattern"
    }

    fn sample(
        &self,
        _ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        let params = validate_params(params, PATTERN_PARAMS, self.id())?;
        let pattern = params.get_str("pattern").unwrap_or_default();
        let max_repeat = params.get_u32("max_repeat").unwrap_or(DEFAULT_MAX_REPEAT);

        let compiled = rand_regex::Regex::compile(pattern, max_repeat).map_err(|err| {
            PopulateError::InvalidRecipe(format!(
                "sampler '{}' cannot compile pattern '{pattern}': {err}",
                self.id()
            ))
        })?;
        if !compiled.is_utf8() {
            return Err(PopulateError::InvalidRecipe(format!(
                "sampler '{}' pattern '{pattern}' can produce non-UTF-8 output",
                self.id()
            )));
        }

        let value: String = rng.sample(&compiled);
        Ok(Some(FieldValue::Text(value)))
    }
}

fn resolve_bounds(
    params: &ParamMap,
    (min_key, min_default): (&str, i64),
    (max_key, max_default): (&str, i64),
    sampler_id: &str,
) -> Result<(usize, usize), PopulateError> {
    let min = params.get_i64(min_key).unwrap_or(min_default);
    let max = params.get_i64(max_key).unwrap_or(max_default);
    if min < 1 || max < min {
        return Err(PopulateError::InvalidRecipe(format!(
            "sampler '{sampler_id}' bounds {min}..={max} are invalid"
        )));
    }
    Ok((min as usize, max as usize))
}
