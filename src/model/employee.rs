use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// How an employee's pay is denominated. Only `Monthly` employees enter
/// the payroll computation for a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum PayBasis {
    Monthly,
    Daily,
}

/// Employee master record as served by the employee directory collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub employee_id: u64,
    pub monthly_wage: f64,
    pub pay_basis: PayBasis,
    pub department: Option<String>,
    pub active: bool,
}

impl EmployeeProfile {
    /// Directory rows store the pay basis as free text; anything that does
    /// not parse is treated as daily-basis and excluded from payroll.
    pub fn parse_pay_basis(raw: &str) -> PayBasis {
        PayBasis::from_str(raw.trim()).unwrap_or(PayBasis::Daily)
    }

    pub fn is_payroll_eligible(&self) -> bool {
        self.active && self.pay_basis == PayBasis::Monthly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pay_basis_parses_case_insensitively() {
        assert_eq!(EmployeeProfile::parse_pay_basis("monthly"), PayBasis::Monthly);
        assert_eq!(EmployeeProfile::parse_pay_basis(" MONTHLY "), PayBasis::Monthly);
        assert_eq!(EmployeeProfile::parse_pay_basis("daily"), PayBasis::Daily);
        assert_eq!(EmployeeProfile::parse_pay_basis("weekly"), PayBasis::Daily);
    }

    #[test]
    fn eligibility_requires_active_and_monthly() {
        let mut emp = EmployeeProfile {
            employee_id: 1,
            monthly_wage: 20000.0,
            pay_basis: PayBasis::Monthly,
            department: None,
            active: true,
        };
        assert!(emp.is_payroll_eligible());

        emp.active = false;
        assert!(!emp.is_payroll_eligible());

        emp.active = true;
        emp.pay_basis = PayBasis::Daily;
        assert!(!emp.is_payroll_eligible());
    }
}
