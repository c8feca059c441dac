//! Request validation helpers shared by the route handlers.
//!
//! Presence, format and enumeration problems are collected into a single
//! field map so a request reports every broken field at once; reference
//! resolution happens afterwards in the handlers, one field at a time.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::error::FieldErrors;

pub fn require_str(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.insert(field.to_string(), "este campo es obligatorio".to_string());
            None
        }
    }
}

pub fn optional_str(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn parse_date(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = require_str(errors, field, raw)?;
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.insert(
                field.to_string(),
                "fecha no válida, se espera AAAA-MM-DD".to_string(),
            );
            None
        }
    }
}

pub fn parse_time(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<NaiveTime> {
    let raw = require_str(errors, field, raw)?;
    NaiveTime::parse_from_str(&raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
        .map_err(|_| {
            errors.insert(
                field.to_string(),
                "hora no válida, se espera HH:MM".to_string(),
            );
        })
        .ok()
}

/// Accepts JSON numbers and strings; the original API serialized decimals
/// as strings, so clients send either.
pub fn parse_amount(errors: &mut FieldErrors, field: &str, raw: Option<&Value>) -> Option<BigDecimal> {
    let text = match raw {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Null) | None | Some(Value::String(_)) => {
            errors.insert(field.to_string(), "este campo es obligatorio".to_string());
            return None;
        }
        Some(_) => {
            errors.insert(field.to_string(), "importe no válido".to_string());
            return None;
        }
    };

    match text.parse::<BigDecimal>() {
        Ok(amount) => Some(amount),
        Err(_) => {
            errors.insert(field.to_string(), "importe no válido".to_string());
            None
        }
    }
}

pub fn require_email(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<String> {
    let value = require_str(errors, field, raw)?;
    if looks_like_email(&value) {
        Some(value)
    } else {
        errors.insert(field.to_string(), "correo electrónico no válido".to_string());
        None
    }
}

pub fn optional_email(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<String> {
    let value = optional_str(raw)?;
    if looks_like_email(&value) {
        Some(value)
    } else {
        errors.insert(field.to_string(), "correo electrónico no válido".to_string());
        None
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

pub fn check_choice(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    allowed: &[&str],
) -> bool {
    if allowed.contains(&value) {
        true
    } else {
        errors.insert(
            field.to_string(),
            format!("valor no permitido, opciones: {}", allowed.join(", ")),
        );
        false
    }
}

/// Choice field with a default: missing/empty falls back, present values are
/// checked for membership.
pub fn choice_or_default(
    errors: &mut FieldErrors,
    field: &str,
    raw: Option<&str>,
    allowed: &[&str],
    default: &str,
) -> String {
    match optional_str(raw) {
        Some(value) => {
            check_choice(errors, field, &value, allowed);
            value
        }
        None => default.to_string(),
    }
}

pub fn signatures_or_default(raw: Option<Value>) -> Value {
    match raw {
        Some(value @ Value::Array(_)) => value,
        _ => Value::Array(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DOCUMENT_STATUSES;

    #[test]
    fn collects_missing_fields_together() {
        let mut errors = FieldErrors::new();
        assert!(require_str(&mut errors, "code", None).is_none());
        assert!(require_str(&mut errors, "description", Some("   ")).is_none());
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("code"));
        assert!(errors.contains_key("description"));
    }

    #[test]
    fn parses_dates_and_reports_bad_format() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            parse_date(&mut errors, "startDate", Some("2025-01-05")),
            NaiveDate::from_ymd_opt(2025, 1, 5)
        );
        assert!(parse_date(&mut errors, "endDate", Some("05/01/2025")).is_none());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn accepts_times_with_and_without_seconds() {
        let mut errors = FieldErrors::new();
        assert!(parse_time(&mut errors, "time", Some("10:30")).is_some());
        assert!(parse_time(&mut errors, "time", Some("10:30:15")).is_some());
        assert!(parse_time(&mut errors, "time", Some("25:00")).is_none());
    }

    #[test]
    fn amounts_accept_numbers_and_strings() {
        let mut errors = FieldErrors::new();
        let from_number = parse_amount(&mut errors, "amount", Some(&serde_json::json!(10000.00)));
        let from_string = parse_amount(&mut errors, "amount", Some(&serde_json::json!("10000.00")));
        assert!(from_number.is_some());
        assert_eq!(from_string.unwrap().to_string(), "10000.00");
        assert!(errors.is_empty());

        assert!(parse_amount(&mut errors, "amount", Some(&serde_json::json!("abc"))).is_none());
        assert!(errors.contains_key("amount"));
    }

    #[test]
    fn emails_need_a_local_part_and_dotted_domain() {
        let mut errors = FieldErrors::new();
        assert!(require_email(&mut errors, "email", Some("ana@empresa.es")).is_some());
        assert!(require_email(&mut errors, "email", Some("sin-arroba")).is_none());
        assert!(optional_email(&mut errors, "contactEmail", Some("@empresa.es")).is_none());
        assert!(optional_email(&mut errors, "contactEmail", None).is_none());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn choice_defaults_apply_only_when_missing() {
        let mut errors = FieldErrors::new();
        let status = choice_or_default(&mut errors, "status", None, DOCUMENT_STATUSES, "BORRADOR");
        assert_eq!(status, "BORRADOR");
        assert!(errors.is_empty());

        choice_or_default(&mut errors, "status", Some("INVENTADO"), DOCUMENT_STATUSES, "BORRADOR");
        assert!(errors.contains_key("status"));
    }
}
