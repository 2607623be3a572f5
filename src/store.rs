use std::collections::HashMap;

use tracing::debug;

use crate::brackets::ContributionTables;
use crate::calc::recompute;
use crate::error::PayrollError;
use crate::model::employee::EmployeeProfile;
use crate::model::line_item::{PayField, PayrollLineItem, parse_field_input};
use crate::model::period::PayPeriod;

/// Outcome of a 13th-month apply action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThirteenthOutcome {
    /// The fetched value was stored and the line item recomputed.
    Applied(f64),
    /// The collaborator had no value for this employee; informational,
    /// the line item is unchanged.
    NothingToApply,
}

/// In-memory collection of line items for the active pay period.
///
/// Every mutation entry point re-invokes the calculator for the touched
/// line item; derived fields are never stale. The store keeps the
/// charge/leave maps captured at load so each recompute can hand the
/// calculator the collaborator amounts without another fetch.
pub struct LineItemStore {
    period: PayPeriod,
    items: Vec<PayrollLineItem>,
    tables: ContributionTables,
    charges: HashMap<u64, f64>,
    leave: HashMap<u64, f64>,
}

impl LineItemStore {
    /// Cold initialization from the employee master list: one line item
    /// per active monthly-basis employee, everything zeroed except the
    /// charge/leave amounts, then a first recompute.
    pub fn initialize(
        period: PayPeriod,
        employees: &[EmployeeProfile],
        tables: ContributionTables,
        charges: HashMap<u64, f64>,
        leave: HashMap<u64, f64>,
    ) -> Self {
        let mut store = Self {
            period,
            items: Vec::new(),
            tables,
            charges,
            leave,
        };
        for profile in employees.iter().filter(|e| e.is_payroll_eligible()) {
            let mut item = PayrollLineItem::for_employee(profile, period);
            store.recompute_item(&mut item);
            store.items.push(item);
        }
        debug!(period = %period, count = store.items.len(), "Initialized payroll line items");
        store
    }

    /// Rehydration from a persisted draft. Non-overridden items pick up
    /// fresh bracket/charge/leave data through the recompute; overridden
    /// items keep their five owned fields verbatim.
    pub fn from_draft(
        period: PayPeriod,
        items: Vec<PayrollLineItem>,
        tables: ContributionTables,
        charges: HashMap<u64, f64>,
        leave: HashMap<u64, f64>,
    ) -> Self {
        let mut store = Self {
            period,
            items,
            tables,
            charges,
            leave,
        };
        for i in 0..store.items.len() {
            let mut item = store.items[i].clone();
            store.recompute_item(&mut item);
            store.items[i] = item;
        }
        store
    }

    pub fn period(&self) -> PayPeriod {
        self.period
    }

    pub fn items(&self) -> &[PayrollLineItem] {
        &self.items
    }

    pub fn get(&self, employee_id: u64) -> Option<&PayrollLineItem> {
        self.items.iter().find(|i| i.employee_id == employee_id)
    }

    fn recompute_item(&self, item: &mut PayrollLineItem) {
        let charge = self.charges.get(&item.employee_id).copied().unwrap_or(0.0);
        let leave = self.leave.get(&item.employee_id).copied().unwrap_or(0.0);
        recompute(item, &self.tables, charge, leave);
    }

    fn index_of(&self, employee_id: u64) -> Result<usize, PayrollError> {
        self.items
            .iter()
            .position(|i| i.employee_id == employee_id)
            .ok_or(PayrollError::UnknownEmployee(employee_id))
    }

    /// Parses and stores one raw field edit, then recomputes that line
    /// item only.
    ///
    /// The five calculator-owned fields are rejected while the item's
    /// override flag is off, and the 13th-month field is only mutated
    /// through [`Self::apply_thirteenth_month`].
    pub fn apply_field_edit(
        &mut self,
        employee_id: u64,
        field: PayField,
        raw_value: &str,
    ) -> Result<&PayrollLineItem, PayrollError> {
        let idx = self.index_of(employee_id)?;

        if field == PayField::ThirteenthMonth {
            return Err(PayrollError::FieldNotEditable {
                employee_id,
                field,
                reason: "13th month pay is set through the apply action".to_string(),
            });
        }
        if field.is_override_owned() && !self.items[idx].is_override {
            return Err(PayrollError::FieldNotEditable {
                employee_id,
                field,
                reason: "owned by the calculator while override is off".to_string(),
            });
        }

        let value = parse_field_input(raw_value, field.allows_negative());
        let mut item = self.items[idx].clone();
        item.set_field(field, value);
        self.recompute_item(&mut item);
        debug!(employee_id, field = %field, value, "Applied payroll field edit");
        self.items[idx] = item;
        Ok(&self.items[idx])
    }

    /// Sets the override flag.
    ///
    /// Turning override off hands the five owned fields back to the
    /// calculator: the provided fresh charge/leave maps replace the
    /// captured ones and the recompute discards any manual edits. Turning
    /// it on preserves current values untouched.
    pub fn set_override(
        &mut self,
        employee_id: u64,
        on: bool,
        fresh_charges: Option<HashMap<u64, f64>>,
        fresh_leave: Option<HashMap<u64, f64>>,
    ) -> Result<&PayrollLineItem, PayrollError> {
        let idx = self.index_of(employee_id)?;

        if !on {
            if let Some(charges) = fresh_charges {
                self.charges = charges;
            }
            if let Some(leave) = fresh_leave {
                self.leave = leave;
            }
        }

        let mut item = self.items[idx].clone();
        item.is_override = on;
        self.recompute_item(&mut item);
        debug!(employee_id, is_override = on, "Toggled payroll override");
        self.items[idx] = item;
        Ok(&self.items[idx])
    }

    pub fn is_override(&self, employee_id: u64) -> Result<bool, PayrollError> {
        Ok(self.items[self.index_of(employee_id)?].is_override)
    }

    /// Checks the state gate for the 13th-month apply action without
    /// mutating anything, so callers can skip the collaborator fetch
    /// when the action would be rejected anyway.
    pub fn thirteenth_applicable(&self, employee_id: u64) -> Result<(), PayrollError> {
        let item = &self.items[self.index_of(employee_id)?];
        if item.is_override {
            return Err(PayrollError::ThirteenthMonthNotApplicable {
                employee_id,
                reason: "line item is overridden".to_string(),
            });
        }
        if item.thirteenth_month != 0.0 {
            return Err(PayrollError::ThirteenthMonthNotApplicable {
                employee_id,
                reason: "13th month pay is already set".to_string(),
            });
        }
        Ok(())
    }

    /// Stores a fetched 13th-month value and recomputes. The same state
    /// gate as [`Self::thirteenth_applicable`] is enforced here so the
    /// store rejects the call even when the caller skipped the check.
    pub fn apply_thirteenth_month(
        &mut self,
        employee_id: u64,
        fetched: f64,
    ) -> Result<ThirteenthOutcome, PayrollError> {
        self.thirteenth_applicable(employee_id)?;
        let idx = self.index_of(employee_id)?;

        if fetched == 0.0 {
            debug!(employee_id, "No precomputed 13th month pay to apply");
            return Ok(ThirteenthOutcome::NothingToApply);
        }

        let mut item = self.items[idx].clone();
        item.thirteenth_month = fetched;
        self.recompute_item(&mut item);
        debug!(employee_id, amount = fetched, "Applied 13th month pay");
        self.items[idx] = item;
        Ok(ThirteenthOutcome::Applied(fetched))
    }
}
