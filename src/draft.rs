use std::collections::HashMap;
use std::sync::Arc;

use futures::join;
use tracing::{debug, warn};

use crate::auth::AuthContext;
use crate::brackets::ContributionTables;
use crate::error::{PayrollError, Warning};
use crate::gateway::Gateways;
use crate::model::bracket::{ContributionBracket, Scheme};
use crate::model::period::PayPeriod;
use crate::store::LineItemStore;
use crate::utils::schedule_cache::ScheduleCache;

/// Result of loading a period: the rehydrated or freshly initialized
/// store, whether a saved draft existed, and any degraded-source
/// warnings.
pub struct DraftLoad {
    pub store: LineItemStore,
    pub existed: bool,
    pub warnings: Vec<Warning>,
}

/// Governs whether a period starts from a saved draft or from
/// employee-list initialization, and persists/clears the draft wholesale.
#[derive(Clone)]
pub struct DraftRepository {
    gateways: Gateways,
}

impl DraftRepository {
    pub fn new(gateways: Gateways) -> Self {
        Self { gateways }
    }

    pub fn gateways(&self) -> &Gateways {
        &self.gateways
    }

    /// Loads the period's line items.
    ///
    /// A found, non-empty draft is rehydrated with the five owned fields
    /// re-derived for every non-overridden item, because brackets,
    /// charges and leave may have moved since the save. With no draft the
    /// store is initialized from the employee directory.
    ///
    /// Schedule/charge/leave subfetch failures degrade that source to
    /// empty and are reported as warnings; an employee-directory failure
    /// on cold initialization is fatal.
    pub async fn load(
        &self,
        auth: &AuthContext,
        period: PayPeriod,
        cache: &ScheduleCache,
    ) -> Result<DraftLoad, PayrollError> {
        let mut warnings = Vec::new();

        let draft = match self.gateways.drafts.fetch_draft(auth, period).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, period = %period, "Draft fetch degraded to empty");
                warnings.push(Warning::new(
                    "draft store",
                    format!("saved draft unavailable for {period}: {e}"),
                ));
                Vec::new()
            }
        };

        let (tables, charges, leave) = join!(
            self.fetch_tables(auth, cache),
            self.gateways.charges.charges_for_period(auth, period),
            self.gateways.leave.leave_pay_for_period(auth, period),
        );
        let (tables, mut table_warnings) = tables;
        warnings.append(&mut table_warnings);

        let charges = degrade(charges, "charge ledger", &mut warnings);
        let leave = degrade(leave, "leave ledger", &mut warnings);

        if tables.is_empty() {
            warnings.push(Warning::new(
                "contribution schedules",
                "all schedules empty; statutory contributions compute as 0",
            ));
        }

        if !draft.is_empty() {
            debug!(period = %period, count = draft.len(), "Rehydrating saved draft");
            let store = LineItemStore::from_draft(period, draft, tables, charges, leave);
            return Ok(DraftLoad {
                store,
                existed: true,
                warnings,
            });
        }

        let employees = self
            .gateways
            .employees
            .list_employees(auth)
            .await
            .map_err(|e| PayrollError::EmployeeDirectory {
                period_start: period.start,
                period_end: period.end,
                message: e.to_string(),
            })?;

        let store = LineItemStore::initialize(period, &employees, tables, charges, leave);
        Ok(DraftLoad {
            store,
            existed: false,
            warnings,
        })
    }

    async fn fetch_tables(
        &self,
        auth: &AuthContext,
        cache: &ScheduleCache,
    ) -> (ContributionTables, Vec<Warning>) {
        let mut warnings = Vec::new();
        let (sss, philhealth, pagibig) = join!(
            self.fetch_schedule(auth, cache, Scheme::Sss),
            self.fetch_schedule(auth, cache, Scheme::Philhealth),
            self.fetch_schedule(auth, cache, Scheme::Pagibig),
        );
        let sss = take_schedule(sss, Scheme::Sss, &mut warnings);
        let philhealth = take_schedule(philhealth, Scheme::Philhealth, &mut warnings);
        let pagibig = take_schedule(pagibig, Scheme::Pagibig, &mut warnings);
        (ContributionTables::new(sss, philhealth, pagibig), warnings)
    }

    async fn fetch_schedule(
        &self,
        auth: &AuthContext,
        cache: &ScheduleCache,
        scheme: Scheme,
    ) -> Result<Arc<Vec<ContributionBracket>>, PayrollError> {
        cache
            .get_or_fetch(self.gateways.schedules.as_ref(), auth, scheme)
            .await
    }

    /// Fresh charge and leave maps for an override-off transition,
    /// degrading each failed source to empty with a warning.
    pub async fn refetch_charge_and_leave(
        &self,
        auth: &AuthContext,
        period: PayPeriod,
    ) -> (HashMap<u64, f64>, HashMap<u64, f64>, Vec<Warning>) {
        let mut warnings = Vec::new();
        let (charges, leave) = join!(
            self.gateways.charges.charges_for_period(auth, period),
            self.gateways.leave.leave_pay_for_period(auth, period),
        );
        let charges = degrade(charges, "charge ledger", &mut warnings);
        let leave = degrade(leave, "leave ledger", &mut warnings);
        (charges, leave, warnings)
    }

    /// Persists the whole store as the period's draft; last write wins.
    pub async fn save(
        &self,
        auth: &AuthContext,
        store: &LineItemStore,
    ) -> Result<usize, PayrollError> {
        let items = store.items();
        self.gateways
            .drafts
            .upsert_draft(auth, store.period(), items)
            .await?;
        debug!(period = %store.period(), count = items.len(), "Saved payroll draft");
        Ok(items.len())
    }

    /// Deletes every persisted line item for the period.
    pub async fn clear(&self, auth: &AuthContext, period: PayPeriod) -> Result<(), PayrollError> {
        self.gateways.drafts.delete_draft(auth, period).await?;
        debug!(period = %period, "Cleared payroll draft");
        Ok(())
    }
}

fn take_schedule(
    result: Result<Arc<Vec<ContributionBracket>>, PayrollError>,
    scheme: Scheme,
    warnings: &mut Vec<Warning>,
) -> Arc<Vec<ContributionBracket>> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, scheme = %scheme, "Schedule fetch degraded to empty");
            warnings.push(Warning::new(
                "contribution schedules",
                format!("{scheme} schedule unavailable: {e}"),
            ));
            Arc::new(Vec::new())
        }
    }
}

fn degrade(
    result: Result<HashMap<u64, f64>, PayrollError>,
    source: &str,
    warnings: &mut Vec<Warning>,
) -> HashMap<u64, f64> {
    match result {
        Ok(map) => map,
        Err(e) => {
            warn!(error = %e, source, "Collaborator fetch degraded to empty");
            warnings.push(Warning::new(source, format!("unavailable, using 0: {e}")));
            HashMap::new()
        }
    }
}
