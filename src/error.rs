use chrono::NaiveDate;
use thiserror::Error;

use crate::model::line_item::PayField;

/// Payroll engine errors.
///
/// Fatal and validation failures only. Degraded collaborator fetches are
/// reported as [`Warning`] values alongside results, never as an `Err`.
#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("invalid pay period: end date {end} is before start date {start}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("no pay period is currently loaded")]
    NoActivePeriod,

    #[error("no payroll line item for employee {0} in the active period")]
    UnknownEmployee(u64),

    #[error("unknown payroll field '{0}'")]
    UnknownField(String),

    #[error("field '{field}' is not editable for employee {employee_id}: {reason}")]
    FieldNotEditable {
        employee_id: u64,
        field: PayField,
        reason: String,
    },

    #[error("13th month pay cannot be applied for employee {employee_id}: {reason}")]
    ThirteenthMonthNotApplicable { employee_id: u64, reason: String },

    #[error("report selection is empty")]
    EmptySelection,

    #[error("report selection matches no line items in the active period")]
    SelectionNotFound,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("employee directory fetch failed for period {period_start}..{period_end}: {message}")]
    EmployeeDirectory {
        period_start: NaiveDate,
        period_end: NaiveDate,
        message: String,
    },

    #[error("collaborator '{collaborator}' failed: {message}")]
    Collaborator {
        collaborator: String,
        message: String,
    },

    #[error("report sink rejected submission: {0}")]
    ReportSink(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Non-fatal degradation notice attached to an operation result.
///
/// A warning names the collaborator that failed and what the engine
/// substituted so the caller can surface it without blocking edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub source: String,
    pub detail: String,
}

impl Warning {
    pub fn new(source: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.detail)
    }
}
