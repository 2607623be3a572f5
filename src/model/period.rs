use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PayrollError;

/// A pay period: the identity key for drafts and every per-period lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PayPeriod {
    /// Builds a period, rejecting an end date before the start date.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PayrollError> {
        if end < start {
            return Err(PayrollError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }
}

impl std::fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
