use serde::{Deserialize, Serialize};

use crate::model::line_item::PayrollLineItem;
use crate::model::period::PayPeriod;

/// Immutable payroll report snapshot. Created once at submission and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollReport {
    pub period: PayPeriod,
    pub line_items: Vec<PayrollLineItem>,
}

impl PayrollReport {
    pub fn new(period: PayPeriod, line_items: Vec<PayrollLineItem>) -> Self {
        Self { period, line_items }
    }
}
