//! In-memory gateway: every collaborator trait behind mutex-held maps.
//! Serves the test suite and embedders that run without a database.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::PayrollError;
use crate::gateway::{
    ChargeLedger, DraftStore, EmployeeDirectory, LeaveLedger, ReportSink, ScheduleSource,
    ThirteenthMonthSource,
};
use crate::model::bracket::{ContributionBracket, Scheme};
use crate::model::employee::EmployeeProfile;
use crate::model::line_item::PayrollLineItem;
use crate::model::period::PayPeriod;
use crate::model::report::PayrollReport;

type PeriodKey = (chrono::NaiveDate, chrono::NaiveDate);

fn key(period: PayPeriod) -> PeriodKey {
    (period.start, period.end)
}

#[derive(Default)]
pub struct MemoryGateway {
    pub employees: Mutex<Vec<EmployeeProfile>>,
    pub charges: Mutex<HashMap<PeriodKey, HashMap<u64, f64>>>,
    pub leave: Mutex<HashMap<PeriodKey, HashMap<u64, f64>>>,
    pub thirteenth: Mutex<HashMap<u64, f64>>,
    pub schedules: Mutex<HashMap<Scheme, Vec<ContributionBracket>>>,
    pub drafts: Mutex<HashMap<PeriodKey, Vec<PayrollLineItem>>>,
    pub reports: Mutex<Vec<(String, PayrollReport)>>,

    // Fault injection toggles for degraded-path coverage.
    pub fail_employees: AtomicBool,
    pub fail_charges: AtomicBool,
    pub fail_leave: AtomicBool,
    pub fail_schedules: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_employees(&self, list: Vec<EmployeeProfile>) {
        *self.employees.lock().unwrap() = list;
    }

    pub fn set_charges(&self, period: PayPeriod, map: HashMap<u64, f64>) {
        self.charges.lock().unwrap().insert(key(period), map);
    }

    pub fn set_leave(&self, period: PayPeriod, map: HashMap<u64, f64>) {
        self.leave.lock().unwrap().insert(key(period), map);
    }

    pub fn set_thirteenth(&self, employee_id: u64, amount: f64) {
        self.thirteenth.lock().unwrap().insert(employee_id, amount);
    }

    pub fn set_schedule(&self, scheme: Scheme, rows: Vec<ContributionBracket>) {
        self.schedules.lock().unwrap().insert(scheme, rows);
    }

    pub fn report_count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    fn failed(flag: &AtomicBool, collaborator: &str) -> Result<(), PayrollError> {
        if flag.load(Ordering::SeqCst) {
            Err(PayrollError::Collaborator {
                collaborator: collaborator.to_string(),
                message: "injected failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryGateway {
    async fn list_employees(
        &self,
        _auth: &AuthContext,
    ) -> Result<Vec<EmployeeProfile>, PayrollError> {
        Self::failed(&self.fail_employees, "employee directory")?;
        Ok(self.employees.lock().unwrap().clone())
    }
}

#[async_trait]
impl ChargeLedger for MemoryGateway {
    async fn charges_for_period(
        &self,
        _auth: &AuthContext,
        period: PayPeriod,
    ) -> Result<HashMap<u64, f64>, PayrollError> {
        Self::failed(&self.fail_charges, "charge ledger")?;
        Ok(self
            .charges
            .lock()
            .unwrap()
            .get(&key(period))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl LeaveLedger for MemoryGateway {
    async fn leave_pay_for_period(
        &self,
        _auth: &AuthContext,
        period: PayPeriod,
    ) -> Result<HashMap<u64, f64>, PayrollError> {
        Self::failed(&self.fail_leave, "leave ledger")?;
        Ok(self
            .leave
            .lock()
            .unwrap()
            .get(&key(period))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ThirteenthMonthSource for MemoryGateway {
    async fn thirteenth_month_for(
        &self,
        _auth: &AuthContext,
        employee_id: u64,
    ) -> Result<f64, PayrollError> {
        Ok(self
            .thirteenth
            .lock()
            .unwrap()
            .get(&employee_id)
            .copied()
            .unwrap_or(0.0))
    }
}

#[async_trait]
impl ScheduleSource for MemoryGateway {
    async fn contribution_schedule(
        &self,
        _auth: &AuthContext,
        scheme: Scheme,
    ) -> Result<Vec<ContributionBracket>, PayrollError> {
        Self::failed(&self.fail_schedules, "contribution schedules")?;
        Ok(self
            .schedules
            .lock()
            .unwrap()
            .get(&scheme)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl DraftStore for MemoryGateway {
    async fn fetch_draft(
        &self,
        _auth: &AuthContext,
        period: PayPeriod,
    ) -> Result<Vec<PayrollLineItem>, PayrollError> {
        Ok(self
            .drafts
            .lock()
            .unwrap()
            .get(&key(period))
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_draft(
        &self,
        _auth: &AuthContext,
        period: PayPeriod,
        items: &[PayrollLineItem],
    ) -> Result<(), PayrollError> {
        self.drafts
            .lock()
            .unwrap()
            .insert(key(period), items.to_vec());
        Ok(())
    }

    async fn delete_draft(
        &self,
        _auth: &AuthContext,
        period: PayPeriod,
    ) -> Result<(), PayrollError> {
        self.drafts.lock().unwrap().remove(&key(period));
        Ok(())
    }
}

#[async_trait]
impl ReportSink for MemoryGateway {
    async fn submit_report(
        &self,
        _auth: &AuthContext,
        report: PayrollReport,
    ) -> Result<String, PayrollError> {
        let id = Uuid::new_v4().to_string();
        self.reports.lock().unwrap().push((id.clone(), report));
        Ok(id)
    }
}
