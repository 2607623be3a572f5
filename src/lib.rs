//! Payroll computation and draft-reconciliation engine.
//!
//! For a selected pay period the engine turns employee attendance and
//! adjustment inputs plus statutory contribution schedules (SSS,
//! PhilHealth, Pag-IBIG) into reconciled per-employee earnings,
//! deductions and net pay, persists the worksheet as a re-editable
//! draft, and finalizes a selected subset into an immutable report.
//!
//! [`session::PayrollSession`] is the entry point for anything driving
//! the engine; collaborators (employee directory, charge/leave ledgers,
//! draft store, report sink) are the async traits in [`gateway`], with
//! MySQL and in-memory implementations provided.

pub mod auth;
pub mod brackets;
pub mod calc;
pub mod config;
pub mod db;
pub mod draft;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod report;
pub mod session;
pub mod store;
pub mod utils;

pub use auth::{AuthContext, Role};
pub use brackets::{ContributionTables, PAGIBIG_EMPLOYEE_CAP};
pub use config::Config;
pub use error::{PayrollError, Warning};
pub use gateway::Gateways;
pub use model::bracket::{ContributionBracket, Scheme};
pub use model::employee::{EmployeeProfile, PayBasis};
pub use model::line_item::{PayField, PayrollLineItem};
pub use model::period::PayPeriod;
pub use model::report::PayrollReport;
pub use session::{PayrollSession, PeriodView};
pub use store::ThirteenthOutcome;
