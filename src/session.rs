use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::auth::AuthContext;
use crate::config::Config;
use crate::draft::{DraftLoad, DraftRepository};
use crate::error::{PayrollError, Warning};
use crate::gateway::Gateways;
use crate::model::line_item::{PayField, PayrollLineItem};
use crate::model::period::PayPeriod;
use crate::report::ReportSubmitter;
use crate::store::{LineItemStore, ThirteenthOutcome};
use crate::utils::schedule_cache::ScheduleCache;
use std::str::FromStr;

/// Plain-data snapshot of the active period handed back to whatever
/// drives the engine (UI, CLI).
#[derive(Debug, Clone)]
pub struct PeriodView {
    pub period: PayPeriod,
    pub existed: bool,
    pub items: Vec<PayrollLineItem>,
    pub warnings: Vec<Warning>,
}

struct ActivePeriod {
    store: LineItemStore,
    existed: bool,
    warnings: Vec<Warning>,
}

/// One user's payroll editing session: the single logical thread of
/// control over the in-memory line items for the selected period.
///
/// All mutations are synchronous with respect to the store; collaborator
/// I/O completes before the store changes state. A `select_period` call
/// supersedes any in-flight load for a previous selection — the stale
/// load's results are discarded, never merged.
pub struct PayrollSession {
    auth: AuthContext,
    drafts: DraftRepository,
    reports: ReportSubmitter,
    schedule_cache: ScheduleCache,
    active: Option<ActivePeriod>,
    load_generation: Arc<AtomicU64>,
}

impl PayrollSession {
    pub fn new(auth: AuthContext, gateways: Gateways) -> Self {
        Self {
            auth,
            reports: ReportSubmitter::new(gateways.reports.clone()),
            drafts: DraftRepository::new(gateways),
            schedule_cache: ScheduleCache::new(),
            active: None,
            load_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Like [`Self::new`] but with the schedule cache TTL taken from the
    /// environment-driven [`Config`].
    pub fn with_config(auth: AuthContext, gateways: Gateways, config: &Config) -> Self {
        let mut session = Self::new(auth, gateways);
        session.schedule_cache =
            ScheduleCache::with_ttl(std::time::Duration::from_secs(config.schedule_cache_ttl));
        session
    }

    /// Selects a pay period and loads it: a saved draft when one exists,
    /// otherwise a fresh initialization from the employee list.
    ///
    /// Returns `None` when a newer selection superseded this load while
    /// its collaborator fetches were in flight.
    pub async fn select_period(
        &mut self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Option<PeriodView>, PayrollError> {
        self.auth.require_payroll_access()?;
        let period = PayPeriod::new(start, end)?;
        let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let DraftLoad {
            store,
            existed,
            warnings,
        } = self.drafts.load(&self.auth, period, &self.schedule_cache).await?;

        if self.load_generation.load(Ordering::SeqCst) != generation {
            debug!(period = %period, "Discarding superseded period load");
            return Ok(None);
        }

        info!(period = %period, existed, count = store.items().len(), "Loaded pay period");
        let active = ActivePeriod {
            store,
            existed,
            warnings,
        };
        let view = PeriodView {
            period: active.store.period(),
            existed: active.existed,
            items: active.store.items().to_vec(),
            warnings: active.warnings.clone(),
        };
        self.active = Some(active);
        Ok(Some(view))
    }

    fn active(&self) -> Result<&ActivePeriod, PayrollError> {
        self.active.as_ref().ok_or(PayrollError::NoActivePeriod)
    }

    fn active_mut(&mut self) -> Result<&mut ActivePeriod, PayrollError> {
        self.active.as_mut().ok_or(PayrollError::NoActivePeriod)
    }

    /// Line items of the active period.
    pub fn line_items(&self) -> Result<&[PayrollLineItem], PayrollError> {
        Ok(self.active()?.store.items())
    }

    /// Warnings accumulated by the most recent load and any degraded
    /// refetches since.
    pub fn warnings(&self) -> &[Warning] {
        match &self.active {
            Some(active) => &active.warnings,
            None => &[],
        }
    }

    /// Applies one raw field edit and returns the recomputed line item.
    pub fn edit_field(
        &mut self,
        employee_id: u64,
        field: &str,
        raw_value: &str,
    ) -> Result<PayrollLineItem, PayrollError> {
        let field = PayField::from_str(field)
            .map_err(|_| PayrollError::UnknownField(field.to_string()))?;
        let active = self.active_mut()?;
        let item = active.store.apply_field_edit(employee_id, field, raw_value)?;
        Ok(item.clone())
    }

    /// Flips the override flag for one employee. Turning override off
    /// refetches charges and leave so the calculator re-owns the five
    /// owned fields against current collaborator data.
    pub async fn toggle_override(
        &mut self,
        employee_id: u64,
    ) -> Result<PayrollLineItem, PayrollError> {
        let currently = self.active()?.store.is_override(employee_id)?;

        if currently {
            // Transition to override-off: fresh charge/leave fetch.
            let period = self.active()?.store.period();
            let (charges, leave, mut warnings) = self
                .drafts
                .refetch_charge_and_leave(&self.auth, period)
                .await;
            let active = self.active_mut()?;
            active.warnings.append(&mut warnings);
            let item = active
                .store
                .set_override(employee_id, false, Some(charges), Some(leave))?;
            Ok(item.clone())
        } else {
            let active = self.active_mut()?;
            let item = active.store.set_override(employee_id, true, None, None)?;
            Ok(item.clone())
        }
    }

    /// Fetches the precomputed 13th-month value for the employee and
    /// applies it. A zero/absent value is an informational no-op.
    pub async fn apply_thirteenth_month(
        &mut self,
        employee_id: u64,
    ) -> Result<ThirteenthOutcome, PayrollError> {
        // Gate before fetching; the store enforces the same gate again on
        // apply.
        self.active()?.store.thirteenth_applicable(employee_id)?;

        let fetched = self
            .drafts
            .gateways()
            .thirteenth
            .thirteenth_month_for(&self.auth, employee_id)
            .await?;

        self.active_mut()?
            .store
            .apply_thirteenth_month(employee_id, fetched)
    }

    /// Persists the active period's line items wholesale. Returns the
    /// number of items saved.
    pub async fn save_draft(&mut self) -> Result<usize, PayrollError> {
        self.auth.require_payroll_access()?;
        let active = self.active()?;
        let count = self.drafts.save(&self.auth, &active.store).await?;
        // A saved draft now exists for this period.
        if let Some(active) = self.active.as_mut() {
            active.existed = true;
        }
        Ok(count)
    }

    /// Deletes the period's persisted draft and drops the in-memory line
    /// items; the caller re-selects the period to reinitialize.
    pub async fn clear_draft(&mut self) -> Result<(), PayrollError> {
        self.auth.require_payroll_access()?;
        let period = self.active()?.store.period();
        self.drafts.clear(&self.auth, period).await?;
        self.active = None;
        Ok(())
    }

    /// Submits the selected employees' line items as an immutable report
    /// and returns the report identifier.
    pub async fn generate_report(
        &mut self,
        selection: &HashSet<u64>,
    ) -> Result<String, PayrollError> {
        self.auth.require_payroll_access()?;
        let active = self.active()?;
        self.reports
            .submit(&self.auth, active.store.items(), selection, active.store.period())
            .await
    }
}
