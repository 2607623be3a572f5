use crate::brackets::ContributionTables;
use crate::model::line_item::PayrollLineItem;

/// Payroll amounts round to two decimals everywhere.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Recomputes every derived field of a line item in place.
///
/// Pure with respect to its arguments; callers invoke it synchronously
/// after every mutation, there is no deferred recompute. While
/// `is_override` is off the calculator owns `sss`, `philhealth`,
/// `pagibig`, `ca_charges` and `sil_pay`; while it is on those five are
/// preserved verbatim and only the derived totals move.
///
/// The collaborator-owned inputs (`ca_charges`, `sil_pay`) refresh before
/// the totals so the stored values always satisfy
/// `total_gross_pay = gross_pay + earnings_adjustment + over_time +
/// holiday_pay + sil_pay + thirteenth_month` and
/// `net_pay = total_gross_pay - total_deductions`.
pub fn recompute(
    item: &mut PayrollLineItem,
    tables: &ContributionTables,
    charge_amount: f64,
    leave_amount: f64,
) {
    if !item.is_override {
        item.ca_charges = round2(charge_amount.max(0.0));
        item.sil_pay = round2(leave_amount.max(0.0));
    }

    let daily_rate = item.monthly_wage / 30.0;
    item.gross_pay = round2(daily_rate * item.regular_days_worked);
    item.total_gross_pay = round2(
        item.gross_pay
            + item.earnings_adjustment
            + item.over_time
            + item.holiday_pay
            + item.sil_pay
            + item.thirteenth_month,
    );

    if !item.is_override {
        item.sss = tables.lookup_sss(item.total_gross_pay);
        item.philhealth = tables.lookup_philhealth(item.monthly_wage);
        item.pagibig = tables.lookup_pagibig(item.monthly_wage);
    }

    item.total_deductions = round2(
        item.sss
            + item.philhealth
            + item.pagibig
            + item.ca_charges
            + item.deductions_adjustment
            + item.withholding_tax,
    );
    item.net_pay = round2(item.total_gross_pay - item.total_deductions);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::bracket::ContributionBracket;
    use crate::model::employee::{EmployeeProfile, PayBasis};
    use crate::model::period::PayPeriod;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn period() -> PayPeriod {
        PayPeriod::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        )
        .unwrap()
    }

    fn item(wage: f64) -> PayrollLineItem {
        let profile = EmployeeProfile {
            employee_id: 7,
            monthly_wage: wage,
            pay_basis: PayBasis::Monthly,
            department: None,
            active: true,
        };
        PayrollLineItem::for_employee(&profile, period())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn full_month_with_empty_tables() {
        let mut li = item(20000.0);
        li.regular_days_worked = 30.0;
        recompute(&mut li, &ContributionTables::default(), 0.0, 0.0);

        assert!(close(li.gross_pay, 20000.0));
        assert!(close(li.total_gross_pay, 20000.0));
        assert!(close(li.total_deductions, 0.0));
        assert!(close(li.net_pay, 20000.0));
    }

    #[test]
    fn daily_rate_is_thirtieth_of_wage() {
        let mut li = item(15000.0);
        li.regular_days_worked = 12.0;
        recompute(&mut li, &ContributionTables::default(), 0.0, 0.0);
        assert!(close(li.gross_pay, 6000.0));
    }

    #[test]
    fn sum_invariants_hold_with_all_fields_populated() {
        let tables = ContributionTables::new(
            Arc::new(vec![ContributionBracket {
                range_start: 0.0,
                range_end: None,
                employee_share: 500.0,
            }]),
            Arc::new(vec![ContributionBracket {
                range_start: 0.0,
                range_end: None,
                employee_share: 300.0,
            }]),
            Arc::new(vec![ContributionBracket {
                range_start: 0.0,
                range_end: None,
                employee_share: 2.0,
            }]),
        );

        let mut li = item(21000.0);
        li.regular_days_worked = 22.0;
        li.earnings_adjustment = -250.5;
        li.over_time = 1200.0;
        li.holiday_pay = 700.0;
        li.thirteenth_month = 5000.0;
        li.deductions_adjustment = -100.0;
        li.withholding_tax = 850.25;
        recompute(&mut li, &tables, 430.0, 675.5);

        assert!(close(li.ca_charges, 430.0));
        assert!(close(li.sil_pay, 675.5));
        assert!(close(li.sss, 500.0));
        assert!(close(li.philhealth, 300.0));
        assert!(close(li.pagibig, 100.0));
        assert!(close(
            li.total_gross_pay,
            li.gross_pay
                + li.earnings_adjustment
                + li.over_time
                + li.holiday_pay
                + li.sil_pay
                + li.thirteenth_month
        ));
        assert!(close(
            li.total_deductions,
            li.sss
                + li.philhealth
                + li.pagibig
                + li.ca_charges
                + li.deductions_adjustment
                + li.withholding_tax
        ));
        assert!(close(li.net_pay, li.total_gross_pay - li.total_deductions));
    }

    #[test]
    fn sss_is_looked_up_on_total_gross_not_wage() {
        let tables = ContributionTables::new(
            Arc::new(vec![
                ContributionBracket {
                    range_start: 0.0,
                    range_end: Some(9999.99),
                    employee_share: 100.0,
                },
                ContributionBracket {
                    range_start: 10000.0,
                    range_end: None,
                    employee_share: 200.0,
                },
            ]),
            Arc::new(vec![]),
            Arc::new(vec![]),
        );

        // Wage alone stays in the low bracket; overtime pushes the total
        // gross into the high one.
        let mut li = item(9000.0);
        li.regular_days_worked = 30.0;
        li.over_time = 2000.0;
        recompute(&mut li, &tables, 0.0, 0.0);
        assert!(close(li.total_gross_pay, 11000.0));
        assert!(close(li.sss, 200.0));
    }

    #[test]
    fn override_preserves_the_five_owned_fields() {
        let mut li = item(20000.0);
        li.regular_days_worked = 30.0;
        li.is_override = true;
        li.sss = 123.45;
        li.philhealth = 67.89;
        li.pagibig = 55.0;
        li.ca_charges = 1000.0;
        li.sil_pay = 500.0;

        // Charge/leave arguments and the (empty) tables must not clobber
        // the hand-edited values.
        recompute(&mut li, &ContributionTables::default(), 999.0, 888.0);

        assert!(close(li.sss, 123.45));
        assert!(close(li.philhealth, 67.89));
        assert!(close(li.pagibig, 55.0));
        assert!(close(li.ca_charges, 1000.0));
        assert!(close(li.sil_pay, 500.0));
        assert!(close(li.total_gross_pay, 20000.0 + 500.0));
        assert!(close(
            li.total_deductions,
            123.45 + 67.89 + 55.0 + 1000.0
        ));
        assert!(close(li.net_pay, li.total_gross_pay - li.total_deductions));
    }

    #[test]
    fn negative_charge_and_leave_clamp_to_zero() {
        let mut li = item(10000.0);
        recompute(&mut li, &ContributionTables::default(), -50.0, -20.0);
        assert!(close(li.ca_charges, 0.0));
        assert!(close(li.sil_pay, 0.0));
    }

    #[test]
    fn rounding_is_two_decimals() {
        assert!(close(round2(0.125), 0.13));
        assert!(close(round2(1.004), 1.0));
        assert!(close(round2(-3.333333), -3.33));

        let mut li = item(10000.0);
        li.regular_days_worked = 1.0;
        recompute(&mut li, &ContributionTables::default(), 0.0, 0.0);
        // 10000 / 30 = 333.333... rounds to 333.33.
        assert!(close(li.gross_pay, 333.33));
    }
}
