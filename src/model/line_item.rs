use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::model::employee::EmployeeProfile;
use crate::model::period::PayPeriod;

/// Editable payroll inputs addressable by name from a driving UI/CLI.
///
/// Derived values (gross pay, totals, net pay) are intentionally absent:
/// they are recomputed after every mutation and never typed directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PayField {
    MonthlyWage,
    RegularDaysWorked,
    EarningsAdjustment,
    OverTime,
    HolidayPay,
    SilPay,
    ThirteenthMonth,
    DeductionsAdjustment,
    WithholdingTax,
    CaCharges,
    Sss,
    Philhealth,
    Pagibig,
}

impl PayField {
    /// Only the two adjustment fields accept negative amounts.
    pub fn allows_negative(self) -> bool {
        matches!(self, Self::EarningsAdjustment | Self::DeductionsAdjustment)
    }

    /// The five fields owned by the calculator/gateway while the line
    /// item's override flag is off.
    pub fn is_override_owned(self) -> bool {
        matches!(
            self,
            Self::Sss | Self::Philhealth | Self::Pagibig | Self::CaCharges | Self::SilPay
        )
    }
}

/// The full set of inputs and computed outputs for one employee in one
/// pay period. One row of the payroll worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PayrollLineItem {
    pub employee_id: u64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,

    // Raw/editable inputs.
    pub monthly_wage: f64,
    pub regular_days_worked: f64,
    pub earnings_adjustment: f64,
    pub over_time: f64,
    pub holiday_pay: f64,
    pub sil_pay: f64,
    pub thirteenth_month: f64,
    pub deductions_adjustment: f64,
    pub withholding_tax: f64,
    pub ca_charges: f64,
    pub sss: f64,
    pub philhealth: f64,
    pub pagibig: f64,

    // Derived, recomputed after every mutation.
    pub gross_pay: f64,
    pub total_gross_pay: f64,
    pub total_deductions: f64,
    pub net_pay: f64,

    /// When false the calculator/gateway owns `sss`, `philhealth`,
    /// `pagibig`, `ca_charges`, `sil_pay`; when true the user does.
    pub is_override: bool,
}

impl PayrollLineItem {
    /// A zeroed line item for a newly initialized period.
    pub fn for_employee(profile: &EmployeeProfile, period: PayPeriod) -> Self {
        Self {
            employee_id: profile.employee_id,
            period_start: period.start,
            period_end: period.end,
            monthly_wage: profile.monthly_wage,
            regular_days_worked: 0.0,
            earnings_adjustment: 0.0,
            over_time: 0.0,
            holiday_pay: 0.0,
            sil_pay: 0.0,
            thirteenth_month: 0.0,
            deductions_adjustment: 0.0,
            withholding_tax: 0.0,
            ca_charges: 0.0,
            sss: 0.0,
            philhealth: 0.0,
            pagibig: 0.0,
            gross_pay: 0.0,
            total_gross_pay: 0.0,
            total_deductions: 0.0,
            net_pay: 0.0,
            is_override: false,
        }
    }

    pub fn set_field(&mut self, field: PayField, value: f64) {
        match field {
            PayField::MonthlyWage => self.monthly_wage = value,
            PayField::RegularDaysWorked => self.regular_days_worked = value,
            PayField::EarningsAdjustment => self.earnings_adjustment = value,
            PayField::OverTime => self.over_time = value,
            PayField::HolidayPay => self.holiday_pay = value,
            PayField::SilPay => self.sil_pay = value,
            PayField::ThirteenthMonth => self.thirteenth_month = value,
            PayField::DeductionsAdjustment => self.deductions_adjustment = value,
            PayField::WithholdingTax => self.withholding_tax = value,
            PayField::CaCharges => self.ca_charges = value,
            PayField::Sss => self.sss = value,
            PayField::Philhealth => self.philhealth = value,
            PayField::Pagibig => self.pagibig = value,
        }
    }

    pub fn field(&self, field: PayField) -> f64 {
        match field {
            PayField::MonthlyWage => self.monthly_wage,
            PayField::RegularDaysWorked => self.regular_days_worked,
            PayField::EarningsAdjustment => self.earnings_adjustment,
            PayField::OverTime => self.over_time,
            PayField::HolidayPay => self.holiday_pay,
            PayField::SilPay => self.sil_pay,
            PayField::ThirteenthMonth => self.thirteenth_month,
            PayField::DeductionsAdjustment => self.deductions_adjustment,
            PayField::WithholdingTax => self.withholding_tax,
            PayField::CaCharges => self.ca_charges,
            PayField::Sss => self.sss,
            PayField::Philhealth => self.philhealth,
            PayField::Pagibig => self.pagibig,
        }
    }
}

/// Sanitizes raw field input the way the payroll worksheet accepts typing:
/// digits, at most one decimal point, and a leading minus only where the
/// field permits a signed amount. Anything that still fails to parse
/// clamps to 0.
pub fn parse_field_input(raw: &str, allow_negative: bool) -> f64 {
    let mut cleaned = String::with_capacity(raw.len());
    let mut seen_dot = false;
    for c in raw.trim().chars() {
        match c {
            '-' if allow_negative && cleaned.is_empty() => cleaned.push('-'),
            '.' if !seen_dot => {
                seen_dot = true;
                cleaned.push('.');
            }
            '0'..='9' => cleaned.push(c),
            _ => {}
        }
    }
    let value = cleaned.parse::<f64>().unwrap_or(0.0);
    if !allow_negative && value < 0.0 { 0.0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn field_names_parse_from_snake_case() {
        assert_eq!(
            PayField::from_str("regular_days_worked").unwrap(),
            PayField::RegularDaysWorked
        );
        assert_eq!(PayField::from_str("sss").unwrap(), PayField::Sss);
        assert!(PayField::from_str("net_pay").is_err());
        assert!(PayField::from_str("gross_pay").is_err());
    }

    #[test]
    fn override_owned_fields_are_exactly_five() {
        let owned: Vec<PayField> = [
            PayField::MonthlyWage,
            PayField::RegularDaysWorked,
            PayField::EarningsAdjustment,
            PayField::OverTime,
            PayField::HolidayPay,
            PayField::SilPay,
            PayField::ThirteenthMonth,
            PayField::DeductionsAdjustment,
            PayField::WithholdingTax,
            PayField::CaCharges,
            PayField::Sss,
            PayField::Philhealth,
            PayField::Pagibig,
        ]
        .into_iter()
        .filter(|f| f.is_override_owned())
        .collect();
        assert_eq!(
            owned,
            vec![
                PayField::SilPay,
                PayField::CaCharges,
                PayField::Sss,
                PayField::Philhealth,
                PayField::Pagibig
            ]
        );
    }

    #[test]
    fn parses_plain_decimals() {
        assert_eq!(parse_field_input("1234.56", false), 1234.56);
        assert_eq!(parse_field_input("  42 ", false), 42.0);
        assert_eq!(parse_field_input(".5", false), 0.5);
    }

    #[test]
    fn strips_invalid_characters() {
        assert_eq!(parse_field_input("1,234.56", false), 1234.56);
        assert_eq!(parse_field_input("12a3", false), 123.0);
        assert_eq!(parse_field_input("1.2.3", false), 1.23);
    }

    #[test]
    fn minus_only_honored_on_signed_fields() {
        assert_eq!(parse_field_input("-500", true), -500.0);
        assert_eq!(parse_field_input("-500", false), 500.0);
        assert_eq!(parse_field_input("5-00", true), 500.0);
    }

    #[test]
    fn garbage_clamps_to_zero() {
        assert_eq!(parse_field_input("abc", false), 0.0);
        assert_eq!(parse_field_input("", false), 0.0);
        assert_eq!(parse_field_input("-", true), 0.0);
        assert_eq!(parse_field_input(".", false), 0.0);
    }
}
