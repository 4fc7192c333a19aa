//! Field rules for actions.
//!
//! The repository and form-side callers share these functions, so a draft
//! rejected here is rejected by the server with the same messages.

use crate::models::{ActionInput, FieldErrors};
use chrono::{Local, NaiveDate};
use serde_json::Value;

pub const MIN_DESCRIPTION_LEN: usize = 3;
pub const MAX_DESCRIPTION_LEN: usize = 255;
pub const MAX_POINTS: u64 = 1000;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const FIELD_DESCRIPTION: &str = "action";
pub const FIELD_DATE: &str = "date";
pub const FIELD_POINTS: &str = "points";

/// A draft in which every field passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteFields {
    pub description: String,
    pub date: NaiveDate,
    pub points: u32,
}

/// Normalized values of the supplied fields that passed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidFields {
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub points: Option<u32>,
}

/// Form-side entry point: full validation against the local current date.
pub fn validate(input: &ActionInput) -> FieldErrors {
    validate_at(input, Local::now().date_naive())
}

pub fn validate_at(input: &ActionInput, today: NaiveDate) -> FieldErrors {
    match check_full(input, today) {
        Ok(_) => FieldErrors::new(),
        Err(errors) => errors,
    }
}

/// Every field is required. All failures are collected, not just the first.
pub fn check_full(input: &ActionInput, today: NaiveDate) -> Result<CompleteFields, FieldErrors> {
    let mut errors = FieldErrors::new();

    let description = record(
        &mut errors,
        FIELD_DESCRIPTION,
        required(&input.description, DESCRIPTION_REQUIRED).and_then(check_description),
    );
    let date = record(
        &mut errors,
        FIELD_DATE,
        required(&input.date, DATE_REQUIRED).and_then(|raw| check_date(raw, today)),
    );
    let points = record(
        &mut errors,
        FIELD_POINTS,
        required(&input.points, POINTS_REQUIRED).and_then(check_points),
    );

    match (description, date, points) {
        (Some(description), Some(date), Some(points)) => Ok(CompleteFields {
            description,
            date,
            points,
        }),
        _ => Err(errors),
    }
}

/// Only supplied fields are checked; omitted ones stay `None`.
pub fn check_partial(input: &ActionInput, today: NaiveDate) -> Result<ValidFields, FieldErrors> {
    let mut errors = FieldErrors::new();

    let fields = ValidFields {
        description: input
            .description
            .as_ref()
            .and_then(|raw| record(&mut errors, FIELD_DESCRIPTION, check_description(raw))),
        date: input
            .date
            .as_ref()
            .and_then(|raw| record(&mut errors, FIELD_DATE, check_date(raw, today))),
        points: input
            .points
            .as_ref()
            .and_then(|raw| record(&mut errors, FIELD_POINTS, check_points(raw))),
    };

    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(errors)
    }
}

const DESCRIPTION_REQUIRED: &str = "Action description is required.";
const DESCRIPTION_NOT_TEXT: &str = "Action description must be a string.";
const DESCRIPTION_TOO_SHORT: &str = "Action description must be at least 3 characters long.";
const DESCRIPTION_TOO_LONG: &str = "Action description must be 255 characters or less.";
const DATE_REQUIRED: &str = "Date is required.";
const DATE_FORMAT_INVALID: &str = "Date must be in YYYY-MM-DD format.";
const DATE_IN_FUTURE: &str = "Action date cannot be in the future.";
const POINTS_REQUIRED: &str = "Points are required.";
const POINTS_NOT_A_NUMBER: &str = "Points must be a positive number.";
const POINTS_TOO_HIGH: &str = "Points cannot exceed 1000 per action.";

fn required<'a>(raw: &'a Option<Value>, message: &'static str) -> Result<&'a Value, &'static str> {
    match raw {
        Some(Value::Null) | None => Err(message),
        Some(value) => Ok(value),
    }
}

fn check_description(raw: &Value) -> Result<String, &'static str> {
    let text = match raw {
        Value::Null => return Err(DESCRIPTION_REQUIRED),
        Value::String(text) => text,
        _ => return Err(DESCRIPTION_NOT_TEXT),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DESCRIPTION_REQUIRED);
    }
    let len = trimmed.chars().count();
    if len < MIN_DESCRIPTION_LEN {
        return Err(DESCRIPTION_TOO_SHORT);
    }
    if len > MAX_DESCRIPTION_LEN {
        return Err(DESCRIPTION_TOO_LONG);
    }
    Ok(trimmed.to_string())
}

fn check_date(raw: &Value, today: NaiveDate) -> Result<NaiveDate, &'static str> {
    let text = match raw {
        Value::Null => return Err(DATE_REQUIRED),
        Value::String(text) => text,
        _ => return Err(DATE_FORMAT_INVALID),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DATE_REQUIRED);
    }
    let date =
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| DATE_FORMAT_INVALID)?;
    if date > today {
        return Err(DATE_IN_FUTURE);
    }
    Ok(date)
}

fn check_points(raw: &Value) -> Result<u32, &'static str> {
    let value = match raw {
        Value::Null => return Err(POINTS_REQUIRED),
        Value::Number(number) => match number.as_u64() {
            Some(value) => value,
            None => whole_number(number.as_f64())?,
        },
        Value::String(text) if text.trim().is_empty() => return Err(POINTS_REQUIRED),
        Value::String(text) => match text.trim().parse::<u64>() {
            Ok(value) => value,
            Err(_) => whole_number(text.trim().parse::<f64>().ok())?,
        },
        _ => return Err(POINTS_NOT_A_NUMBER),
    };
    if value > MAX_POINTS {
        return Err(POINTS_TOO_HIGH);
    }
    u32::try_from(value).map_err(|_| POINTS_TOO_HIGH)
}

/// Accepts floats such as `25.0` that carry no fractional part.
fn whole_number(value: Option<f64>) -> Result<u64, &'static str> {
    match value {
        Some(value) if value >= 0.0 && value.fract() == 0.0 => Ok(value as u64),
        _ => Err(POINTS_NOT_A_NUMBER),
    }
}

fn record<T>(errors: &mut FieldErrors, field: &str, result: Result<T, &'static str>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors
                .entry(field.to_string())
                .or_default()
                .push(message.to_string());
            None
        }
    }
}
