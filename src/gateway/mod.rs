//! Collaborator interfaces the engine consumes: employee directory,
//! charge/leave ledgers, 13th-month values, contribution schedules, draft
//! persistence and the report sink.
//!
//! Everything here is read-only except the draft store (bulk upsert/delete)
//! and the report sink (one-shot submit). Every call carries the caller's
//! [`AuthContext`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::AuthContext;
use crate::error::PayrollError;
use crate::model::bracket::{ContributionBracket, Scheme};
use crate::model::employee::EmployeeProfile;
use crate::model::line_item::PayrollLineItem;
use crate::model::period::PayPeriod;
use crate::model::report::PayrollReport;

pub mod memory;
pub mod mysql;

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Full employee master list. Eligibility filtering (active,
    /// monthly-basis) is the store's job, not the directory's.
    async fn list_employees(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<EmployeeProfile>, PayrollError>;
}

#[async_trait]
pub trait ChargeLedger: Send + Sync {
    /// Total cash-advance charges per employee within the period.
    async fn charges_for_period(
        &self,
        auth: &AuthContext,
        period: PayPeriod,
    ) -> Result<HashMap<u64, f64>, PayrollError>;
}

#[async_trait]
pub trait LeaveLedger: Send + Sync {
    /// Total leave pay per employee within the period.
    async fn leave_pay_for_period(
        &self,
        auth: &AuthContext,
        period: PayPeriod,
    ) -> Result<HashMap<u64, f64>, PayrollError>;
}

#[async_trait]
pub trait ThirteenthMonthSource: Send + Sync {
    /// Precomputed 13th-month pay for one employee. Absence is a normal
    /// zero result, not an error.
    async fn thirteenth_month_for(
        &self,
        auth: &AuthContext,
        employee_id: u64,
    ) -> Result<f64, PayrollError>;
}

#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Bracket rows for one statutory scheme, sorted by range start.
    async fn contribution_schedule(
        &self,
        auth: &AuthContext,
        scheme: Scheme,
    ) -> Result<Vec<ContributionBracket>, PayrollError>;
}

#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Persisted line items for the period, in employee order. Empty when
    /// no draft was ever saved.
    async fn fetch_draft(
        &self,
        auth: &AuthContext,
        period: PayPeriod,
    ) -> Result<Vec<PayrollLineItem>, PayrollError>;

    /// Wholesale replacement of the period's draft. No per-field merging;
    /// last write wins.
    async fn upsert_draft(
        &self,
        auth: &AuthContext,
        period: PayPeriod,
        items: &[PayrollLineItem],
    ) -> Result<(), PayrollError>;

    async fn delete_draft(
        &self,
        auth: &AuthContext,
        period: PayPeriod,
    ) -> Result<(), PayrollError>;
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Submits an immutable report snapshot and returns its identifier.
    /// Duplicate submissions create duplicate reports; the sink performs
    /// no dedup.
    async fn submit_report(
        &self,
        auth: &AuthContext,
        report: PayrollReport,
    ) -> Result<String, PayrollError>;
}

/// Handles to every collaborator the engine talks to.
#[derive(Clone)]
pub struct Gateways {
    pub employees: Arc<dyn EmployeeDirectory>,
    pub charges: Arc<dyn ChargeLedger>,
    pub leave: Arc<dyn LeaveLedger>,
    pub thirteenth: Arc<dyn ThirteenthMonthSource>,
    pub schedules: Arc<dyn ScheduleSource>,
    pub drafts: Arc<dyn DraftStore>,
    pub reports: Arc<dyn ReportSink>,
}

impl Gateways {
    /// All collaborators backed by the HR MySQL database.
    pub fn mysql(pool: sqlx::MySqlPool) -> Self {
        let gateway = Arc::new(mysql::MySqlGateway::new(pool));
        Self {
            employees: gateway.clone(),
            charges: gateway.clone(),
            leave: gateway.clone(),
            thirteenth: gateway.clone(),
            schedules: gateway.clone(),
            drafts: gateway.clone(),
            reports: gateway,
        }
    }

    /// All collaborators backed by one in-memory gateway. Used by tests
    /// and by embedders that feed the engine themselves.
    pub fn memory(gateway: Arc<memory::MemoryGateway>) -> Self {
        Self {
            employees: gateway.clone(),
            charges: gateway.clone(),
            leave: gateway.clone(),
            thirteenth: gateway.clone(),
            schedules: gateway.clone(),
            drafts: gateway.clone(),
            reports: gateway,
        }
    }
}
