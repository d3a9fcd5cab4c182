//! Numeric, boolean, list, and date/time samplers.

use chrono::{Days, NaiveDate};
use rand::{Rng, RngCore};
use serde_json::Value;
use stagehand_model::FieldValue;

use crate::errors::PopulateError;
use crate::params::{ParamKind, ParamSpec, validate_params};
use crate::samplers::{Sampler, SamplerContext, SamplerRegistry};

const DEFAULT_INT_MIN: i64 = 0;
const DEFAULT_INT_MAX: i64 = 10000;
const DEFAULT_FLOAT_MIN: f64 = 0.0;
const DEFAULT_FLOAT_MAX: f64 = 10000.0;
const DEFAULT_SCALE: u32 = 2;
const DEFAULT_TRUE_RATIO: f64 = 0.5;
/// Window behind the base date that datetime and timestamp samplers draw from.
const DEFAULT_SPAN_DAYS: u64 = 730;
const SECONDS_PER_DAY: i64 = 86_400;

const INT_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Int, false),
    ParamSpec::new("max", ParamKind::Int, false),
];

const FLOAT_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Float, false),
    ParamSpec::new("max", ParamKind::Float, false),
];

const DECIMAL_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Float, false),
    ParamSpec::new("max", ParamKind::Float, false),
    ParamSpec::new("scale", ParamKind::Int, false),
];

const BOOL_PARAMS: &[ParamSpec] = &[ParamSpec::new("true_ratio", ParamKind::Float, false)];

const DATE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Date, false),
    ParamSpec::new("max", ParamKind::Date, false),
];

const TIMESTAMP_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Timestamp, false),
    ParamSpec::new("max", ParamKind::Timestamp, false),
];

pub fn register(registry: &mut SamplerRegistry) {
    registry.register_sampler(Box::new(IntSampler));
    registry.register_sampler(Box::new(FloatSampler));
    registry.register_sampler(Box::new(DecimalSampler));
    registry.register_sampler(Box::new(BoolSampler));
    registry.register_sampler(Box::new(ListAllowedSampler));
    registry.register_sampler(Box::new(DatetimeSampler));
    registry.register_sampler(Box::new(TimestampSampler));
}

pub struct IntSampler;

impl Sampler for IntSampler {
    fn id(&self) -> &'static str {
        "number.int"
    }

    fn sample(
        &self,
        _ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        let params = validate_params(params, INT_PARAMS, self.id())?;
        let min = params.get_i64("min").unwrap_or(DEFAULT_INT_MIN);
        let max = params.get_i64("max").unwrap_or(DEFAULT_INT_MAX);
        if max < min {
            return Err(invalid_bounds(self.id(), min, max));
        }
        Ok(Some(FieldValue::Integer(rng.random_range(min..=max))))
    }
}

pub struct FloatSampler;

impl Sampler for FloatSampler {
    fn id(&self) -> &'static str {
        "number.float"
    }

    fn sample(
        &self,
        _ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        let params = validate_params(params, FLOAT_PARAMS, self.id())?;
        let min = params.get_f64("min").unwrap_or(DEFAULT_FLOAT_MIN);
        let max = params.get_f64("max").unwrap_or(DEFAULT_FLOAT_MAX);
        if max < min {
            return Err(PopulateError::InvalidRecipe(format!(
                "sampler '{}' bounds {min}..={max} are invalid",
                self.id()
            )));
        }
        Ok(Some(FieldValue::Decimal(rng.random_range(min..=max))))
    }
}

/// Decimal with a fixed scale, rounded half-up.
pub struct DecimalSampler;

impl Sampler for DecimalSampler {
    fn id(&self) -> &'static str {
        "number.decimal"
    }

    fn sample(
        &self,
        _ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        let params = validate_params(params, DECIMAL_PARAMS, self.id())?;
        let min = params.get_f64("min").unwrap_or(DEFAULT_FLOAT_MIN);
        let max = params.get_f64("max").unwrap_or(DEFAULT_FLOAT_MAX);
        let scale = params.get_u32("scale").unwrap_or(DEFAULT_SCALE);
        if max < min {
            return Err(PopulateError::InvalidRecipe(format!(
                "sampler '{}' bounds {min}..={max} are invalid",
                self.id()
            )));
        }
        let raw: f64 = rng.random_range(min..=max);
        let factor = 10f64.powi(scale as i32);
        Ok(Some(FieldValue::Decimal((raw * factor).round() / factor)))
    }
}

pub struct BoolSampler;

impl Sampler for BoolSampler {
    fn id(&self) -> &'static str {
        "flag.bool"
    }

    fn sample(
        &self,
        _ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        let params = validate_params(params, BOOL_PARAMS, self.id())?;
        let ratio = params.get_f64("true_ratio").unwrap_or(DEFAULT_TRUE_RATIO);
        if !(0.0..=1.0).contains(&ratio) {
            return Err(PopulateError::InvalidRecipe(format!(
                "sampler '{}' true_ratio {ratio} is out of range",
                self.id()
            )));
        }
        Ok(Some(FieldValue::Boolean(rng.random_bool(ratio))))
    }
}

/// Picks one of the field's configured allowed values.
pub struct ListAllowedSampler;

impl Sampler for ListAllowedSampler {
    fn id(&self) -> &'static str {
        "list.allowed"
    }

    fn sample(
        &self,
        ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        validate_params(params, &[], self.id())?;
        let allowed = ctx
            .field
            .allowed_values
            .as_deref()
            .filter(|values| !values.is_empty())
            .ok_or_else(|| {
                PopulateError::Unsupported(format!(
                    "field {} has no allowed values to sample from",
                    ctx.field.name
                ))
            })?;
        let choice = &allowed[rng.random_range(0..allowed.len())];
        Ok(Some(FieldValue::Text(choice.clone())))
    }
}

/// ISO 8601 datetime text inside a date window, the storage form of
/// datetime fields.
pub struct DatetimeSampler;

impl Sampler for DatetimeSampler {
    fn id(&self) -> &'static str {
        "moment.datetime"
    }

    fn sample(
        &self,
        ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        let params = validate_params(params, DATE_PARAMS, self.id())?;
        let max = params.get_date("max").unwrap_or(ctx.base_date);
        let min = params
            .get_date("min")
            .unwrap_or_else(|| default_window_start(max));
        if max < min {
            return Err(PopulateError::InvalidRecipe(format!(
                "sampler '{}' date window {min}..={max} is invalid",
                self.id()
            )));
        }

        let span_days = (max - min).num_days();
        let date = min + Days::new(rng.random_range(0..=span_days) as u64);
        let seconds = rng.random_range(0..SECONDS_PER_DAY) as u32;
        let moment = date
            .and_hms_opt(seconds / 3600, (seconds / 60) % 60, seconds % 60)
            .unwrap_or_default();
        Ok(Some(FieldValue::Text(
            moment.format("%Y-%m-%dT%H:%M:%S").to_string(),
        )))
    }
}

/// Epoch-seconds timestamp inside a window ending at the base date.
pub struct TimestampSampler;

impl Sampler for TimestampSampler {
    fn id(&self) -> &'static str {
        "moment.timestamp"
    }

    fn sample(
        &self,
        ctx: &mut SamplerContext<'_>,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<FieldValue>, PopulateError> {
        let params = validate_params(params, TIMESTAMP_PARAMS, self.id())?;
        let base_epoch = ctx
            .base_date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().timestamp())
            .unwrap_or_default();
        let max = params.get_timestamp("max").unwrap_or(base_epoch);
        let min = params
            .get_timestamp("min")
            .unwrap_or(max - DEFAULT_SPAN_DAYS as i64 * SECONDS_PER_DAY);
        if max < min {
            return Err(PopulateError::InvalidRecipe(format!(
                "sampler '{}' timestamp window {min}..={max} is invalid",
                self.id()
            )));
        }
        Ok(Some(FieldValue::Timestamp(rng.random_range(min..=max))))
    }
}

fn default_window_start(end: NaiveDate) -> NaiveDate {
    end.checked_sub_days(Days::new(DEFAULT_SPAN_DAYS)).unwrap_or(end)
}

fn invalid_bounds(sampler_id: &str, min: i64, max: i64) -> PopulateError {
    PopulateError::InvalidRecipe(format!(
        "sampler '{sampler_id}' bounds {min}..={max} are invalid"
    ))
}
