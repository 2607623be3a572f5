use std::sync::Arc;

use crate::calc::round2;
use crate::model::bracket::{ContributionBracket, Scheme};

/// Fixed ceiling on the Pag-IBIG employee contribution, in currency.
pub const PAGIBIG_EMPLOYEE_CAP: f64 = 100.0;

/// Immutable, period-independent statutory lookup tables.
///
/// Lookup policy differs per scheme and is intentionally not unified:
/// SSS and PhilHealth return 0 when no bracket matches, while Pag-IBIG
/// falls back to the bracket with the highest range end. This mirrors the
/// statutory schedules as the charge system publishes them.
#[derive(Debug, Clone, Default)]
pub struct ContributionTables {
    sss: Arc<Vec<ContributionBracket>>,
    philhealth: Arc<Vec<ContributionBracket>>,
    pagibig: Arc<Vec<ContributionBracket>>,
}

impl ContributionTables {
    pub fn new(
        sss: Arc<Vec<ContributionBracket>>,
        philhealth: Arc<Vec<ContributionBracket>>,
        pagibig: Arc<Vec<ContributionBracket>>,
    ) -> Self {
        Self {
            sss: Self::normalized(sss),
            philhealth: Self::normalized(philhealth),
            pagibig: Self::normalized(pagibig),
        }
    }

    /// Brackets are published sorted and non-overlapping; sort here so a
    /// malformed schedule still scans deterministically.
    fn normalized(rows: Arc<Vec<ContributionBracket>>) -> Arc<Vec<ContributionBracket>> {
        if rows.windows(2).all(|w| w[0].range_start <= w[1].range_start) {
            return rows;
        }
        let mut sorted = rows.as_ref().clone();
        sorted.sort_by(|a, b| a.range_start.total_cmp(&b.range_start));
        Arc::new(sorted)
    }

    pub fn is_empty(&self) -> bool {
        self.sss.is_empty() && self.philhealth.is_empty() && self.pagibig.is_empty()
    }

    pub fn schedule(&self, scheme: Scheme) -> &[ContributionBracket] {
        match scheme {
            Scheme::Sss => &self.sss,
            Scheme::Philhealth => &self.philhealth,
            Scheme::Pagibig => &self.pagibig,
        }
    }

    /// SSS employee contribution for a total gross pay. 0 when the table
    /// is empty or the value falls outside every bracket; no
    /// extrapolation above the top bracket.
    pub fn lookup_sss(&self, total_gross_pay: f64) -> f64 {
        self.sss
            .iter()
            .find(|b| b.matches(total_gross_pay))
            .map_or(0.0, |b| b.employee_share)
    }

    /// PhilHealth flat employee share for a monthly wage. An absent range
    /// end is an open-ended top bracket.
    pub fn lookup_philhealth(&self, monthly_wage: f64) -> f64 {
        self.philhealth
            .iter()
            .find(|b| b.matches(monthly_wage))
            .map_or(0.0, |b| b.employee_share)
    }

    /// Pag-IBIG employee contribution: the bracket's share is a percentage
    /// of the monthly wage, clamped to [`PAGIBIG_EMPLOYEE_CAP`]. A wage
    /// outside every bracket uses the bracket with the numerically highest
    /// range end.
    pub fn lookup_pagibig(&self, monthly_wage: f64) -> f64 {
        let bracket = self
            .pagibig
            .iter()
            .find(|b| b.matches(monthly_wage))
            .or_else(|| {
                self.pagibig
                    .iter()
                    .max_by(|a, b| top_bound(a).total_cmp(&top_bound(b)))
            });
        let Some(bracket) = bracket else {
            return 0.0;
        };
        let raw = monthly_wage * bracket.employee_share / 100.0;
        round2(raw.min(PAGIBIG_EMPLOYEE_CAP))
    }
}

fn top_bound(bracket: &ContributionBracket) -> f64 {
    bracket.range_end.unwrap_or(f64::INFINITY)
}
