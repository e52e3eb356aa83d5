//! Per-route validation chains: ordered field rules mixing synchronous
//! format checks with database-backed uniqueness/existence checks.
//!
//! Execution semantics: fields are evaluated in declared order; within one
//! field the checks short-circuit on the first failure, but evaluation
//! always continues to the next field so every failing field shows up in
//! the final error list.

use std::str::FromStr;

use email_address::EmailAddress;
use serde_json::Value;
use sqlx::{PgPool, Row};

use crate::error::{ApiError, FieldError};

pub mod chains;

/// A single validation check. Sync variants inspect the request body only;
/// `Unique` and `Exists` query the shared pool.
#[derive(Debug)]
pub enum Check {
    /// Field must be present and non-empty after trimming
    Required { message: &'static str },
    /// Field must parse as an email address
    Email { message: &'static str },
    /// Trimmed length must fall within `min..=max`
    Length {
        min: usize,
        max: usize,
        message: &'static str,
    },
    /// Digits only
    Numeric { message: &'static str },
    /// Positive integer, given either as a JSON number or a numeric string
    PositiveInt { message: &'static str },
    /// No other row in `table` may hold this value in `column`. The row
    /// identified by the route's path id is allowed to keep its own value.
    Unique {
        table: &'static str,
        column: &'static str,
        message: &'static str,
    },
    /// A row with this id must exist in `table`
    Exists {
        table: &'static str,
        message: &'static str,
    },
}

impl Check {
    fn message(&self) -> &'static str {
        match self {
            Check::Required { message }
            | Check::Email { message }
            | Check::Length { message, .. }
            | Check::Numeric { message }
            | Check::PositiveInt { message }
            | Check::Unique { message, .. }
            | Check::Exists { message, .. } => message,
        }
    }
}

/// All checks for one request field, run in declared order
#[derive(Debug)]
pub struct FieldRule {
    pub field: &'static str,
    pub checks: &'static [Check],
}

/// An ordered validation chain, constructed once at startup and executed
/// fresh per request (no shared mutable state)
pub type Chain = &'static [FieldRule];

/// Evaluate a chain against a request body.
///
/// `path_id` is the route's `:id` parameter when the request edits an
/// existing row; uniqueness checks exclude that row. Returns the complete
/// aggregated error list on failure. Persistence errors abort with an
/// internal error rather than a validation failure.
pub async fn run(
    chain: Chain,
    body: &Value,
    path_id: Option<i64>,
    pool: &PgPool,
) -> Result<(), ApiError> {
    let mut errors: Vec<FieldError> = Vec::new();

    for rule in chain {
        let value = body.get(rule.field);
        for check in rule.checks {
            if evaluate(check, value, path_id, pool).await? {
                continue;
            }
            errors.push(FieldError::new(rule.field, check.message()));
            // First failure ends this field; later fields still run
            break;
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_failed(errors))
    }
}

async fn evaluate(
    check: &Check,
    value: Option<&Value>,
    path_id: Option<i64>,
    pool: &PgPool,
) -> Result<bool, ApiError> {
    match check {
        Check::Required { .. } => Ok(text(value).is_some_and(|s| !s.is_empty())),
        Check::Email { .. } => Ok(text(value).is_some_and(|s| EmailAddress::from_str(s).is_ok())),
        Check::Length { min, max, .. } => {
            Ok(text(value).is_some_and(|s| (*min..=*max).contains(&s.chars().count())))
        }
        Check::Numeric { .. } => {
            Ok(text(value).is_some_and(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())))
        }
        Check::PositiveInt { .. } => Ok(integer(value).is_some_and(|n| n > 0)),
        Check::Unique { table, column, .. } => {
            // Format checks run first; a value they rejected never gets here
            let Some(candidate) = text(value) else {
                return Ok(true);
            };
            // table/column come from the static chain definitions, never from input
            let sql = format!("SELECT id FROM {table} WHERE {column} = $1");
            let row = sqlx::query(&sql).bind(candidate).fetch_optional(pool).await?;
            let owner = row.map(|row| row.get::<i64, _>("id"));
            Ok(!collides(owner, path_id))
        }
        Check::Exists { table, .. } => {
            let Some(id) = integer(value) else {
                return Ok(true);
            };
            let sql = format!("SELECT id FROM {table} WHERE id = $1");
            let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
            Ok(row.is_some())
        }
    }
}

/// A unique value collides when some row already owns it, unless that
/// row is the one being edited.
fn collides(owner: Option<i64>, path_id: Option<i64>) -> bool {
    match owner {
        Some(owner) => path_id != Some(owner),
        None => false,
    }
}

fn text(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) => Some(s.trim()),
        _ => None,
    }
}

pub(crate) fn integer(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Validate a `:id` path parameter as a positive integer. Failure takes
/// the same 400 shape as a body validation failure, with a single entry.
pub fn validate_id(raw: &str) -> Result<i64, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ApiError::validation_failed(vec![FieldError::new(
            "id",
            "id must be a positive integer",
        )])),
    }
}
