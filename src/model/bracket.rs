use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Statutory contribution scheme a bracket row belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Scheme {
    Sss,
    Philhealth,
    Pagibig,
}

/// One contribution bracket: a contiguous wage/gross range mapped to an
/// employee share. The share is a flat currency amount for SSS and
/// PhilHealth and a percentage of wage for Pag-IBIG.
///
/// `range_end = None` is an open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContributionBracket {
    pub range_start: f64,
    pub range_end: Option<f64>,
    pub employee_share: f64,
}

impl ContributionBracket {
    pub fn matches(&self, value: f64) -> bool {
        value >= self.range_start && self.range_end.is_none_or(|end| value <= end)
    }
}
