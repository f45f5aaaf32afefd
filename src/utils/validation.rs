use std::borrow::Cow;
use std::str::FromStr;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::{AppError, FieldErrors};
use crate::models::salary::{max_amount, AMOUNT_SCALE};

lazy_static! {
    /// local@domain.tld with no whitespace and a single '@'.
    pub static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(|err| AppError::Validation(field_errors(&err)))
}

/// Keeps one message per field, the first one reported.
pub fn field_errors(err: &ValidationErrors) -> FieldErrors {
    err.field_errors()
        .iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(invalid("required", "Name is required"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(invalid("required", "Email is required"));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(invalid("email", "Please enter a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(invalid("required", "Password is required"));
    }
    if password.chars().count() < 6 {
        return Err(invalid("length", "Password must be at least 6 characters"));
    }
    Ok(())
}

pub fn validate_date_of_birth(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "Date of birth is required"));
    }
    parse_date(value)
        .map(|_| ())
        .ok_or_else(|| invalid("date", "Date of birth must be a valid date"))
}

pub fn validate_department_id(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || Uuid::parse_str(value.trim()).is_err() {
        return Err(invalid("required", "Please select a department"));
    }
    Ok(())
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Coerces a loosely typed amount: numbers and numeric strings are taken as-is,
/// absent, null and empty values become zero. The result always fits a
/// NUMERIC(14, 2) column without rounding.
pub fn coerce_amount(value: Option<&Value>) -> Result<Decimal, &'static str> {
    let amount = match value {
        None | Some(Value::Null) => return Ok(Decimal::ZERO),
        Some(Value::Number(n)) => parse_decimal(&n.to_string())?,
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(Decimal::ZERO),
        Some(Value::String(s)) => parse_decimal(s.trim())?,
        Some(_) => return Err("Must be a number"),
    };
    let amount = amount.normalize();
    if amount.scale() > AMOUNT_SCALE {
        return Err("At most 2 decimal places are allowed");
    }
    if amount.abs() > max_amount() {
        return Err("Amount is too large");
    }
    Ok(amount)
}

fn parse_decimal(raw: &str) -> Result<Decimal, &'static str> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| "Must be a number")
}
