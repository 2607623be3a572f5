//! MySQL-backed gateway over the HR database.
//!
//! Collaborator tables (employees, charges, leave pay, 13th-month values)
//! belong to other subsystems and are read as-is; `ensure_schema` creates
//! only the tables this engine owns: drafts, contribution schedules and
//! submitted reports.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::error;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::PayrollError;
use crate::gateway::{
    ChargeLedger, DraftStore, EmployeeDirectory, LeaveLedger, ReportSink, ScheduleSource,
    ThirteenthMonthSource,
};
use crate::model::bracket::{ContributionBracket, Scheme};
use crate::model::employee::EmployeeProfile;
use crate::model::line_item::PayrollLineItem;
use crate::model::period::PayPeriod;
use crate::model::report::PayrollReport;

#[derive(Debug, Clone)]
pub struct MySqlGateway {
    pool: MySqlPool,
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: u64,
    monthly_wage: f64,
    pay_basis: String,
    department: Option<String>,
    status: Option<String>,
}

impl From<EmployeeRow> for EmployeeProfile {
    fn from(row: EmployeeRow) -> Self {
        EmployeeProfile {
            employee_id: row.id,
            monthly_wage: row.monthly_wage,
            pay_basis: EmployeeProfile::parse_pay_basis(&row.pay_basis),
            department: row.department,
            active: row.status.as_deref() == Some("active"),
        }
    }
}

impl MySqlGateway {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Creates the engine-owned tables when missing.
    pub async fn ensure_schema(&self) -> Result<(), PayrollError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS payroll_drafts (
                employee_id BIGINT UNSIGNED NOT NULL,
                period_start DATE NOT NULL,
                period_end DATE NOT NULL,
                monthly_wage DOUBLE NOT NULL DEFAULT 0,
                regular_days_worked DOUBLE NOT NULL DEFAULT 0,
                earnings_adjustment DOUBLE NOT NULL DEFAULT 0,
                over_time DOUBLE NOT NULL DEFAULT 0,
                holiday_pay DOUBLE NOT NULL DEFAULT 0,
                sil_pay DOUBLE NOT NULL DEFAULT 0,
                thirteenth_month DOUBLE NOT NULL DEFAULT 0,
                deductions_adjustment DOUBLE NOT NULL DEFAULT 0,
                withholding_tax DOUBLE NOT NULL DEFAULT 0,
                ca_charges DOUBLE NOT NULL DEFAULT 0,
                sss DOUBLE NOT NULL DEFAULT 0,
                philhealth DOUBLE NOT NULL DEFAULT 0,
                pagibig DOUBLE NOT NULL DEFAULT 0,
                gross_pay DOUBLE NOT NULL DEFAULT 0,
                total_gross_pay DOUBLE NOT NULL DEFAULT 0,
                total_deductions DOUBLE NOT NULL DEFAULT 0,
                net_pay DOUBLE NOT NULL DEFAULT 0,
                is_override BOOLEAN NOT NULL DEFAULT FALSE,
                PRIMARY KEY (employee_id, period_start, period_end)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contribution_schedules (
                scheme VARCHAR(16) NOT NULL,
                range_start DOUBLE NOT NULL,
                range_end DOUBLE NULL,
                employee_share DOUBLE NOT NULL,
                KEY idx_scheme (scheme)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS payroll_reports (
                id VARCHAR(36) NOT NULL PRIMARY KEY,
                period_start DATE NOT NULL,
                period_end DATE NOT NULL,
                payload JSON NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlGateway {
    async fn list_employees(
        &self,
        _auth: &AuthContext,
    ) -> Result<Vec<EmployeeProfile>, PayrollError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, monthly_wage, pay_basis, department, status
            FROM employees
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch employee list");
            PayrollError::Database(e)
        })?;

        Ok(rows.into_iter().map(EmployeeProfile::from).collect())
    }
}

#[async_trait]
impl ChargeLedger for MySqlGateway {
    async fn charges_for_period(
        &self,
        _auth: &AuthContext,
        period: PayPeriod,
    ) -> Result<HashMap<u64, f64>, PayrollError> {
        let rows = sqlx::query_as::<_, (u64, Option<f64>)>(
            r#"
            SELECT employee_id, SUM(amount)
            FROM employee_charges
            WHERE charge_date BETWEEN ? AND ?
            GROUP BY employee_id
            "#,
        )
        .bind(period.start)
        .bind(period.end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, period = %period, "Failed to fetch charges");
            PayrollError::Database(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|(id, total)| (id, total.unwrap_or(0.0)))
            .collect())
    }
}

#[async_trait]
impl LeaveLedger for MySqlGateway {
    async fn leave_pay_for_period(
        &self,
        _auth: &AuthContext,
        period: PayPeriod,
    ) -> Result<HashMap<u64, f64>, PayrollError> {
        let rows = sqlx::query_as::<_, (u64, Option<f64>)>(
            r#"
            SELECT employee_id, SUM(amount)
            FROM leave_pay
            WHERE pay_date BETWEEN ? AND ?
            GROUP BY employee_id
            "#,
        )
        .bind(period.start)
        .bind(period.end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, period = %period, "Failed to fetch leave pay");
            PayrollError::Database(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|(id, total)| (id, total.unwrap_or(0.0)))
            .collect())
    }
}

#[async_trait]
impl ThirteenthMonthSource for MySqlGateway {
    async fn thirteenth_month_for(
        &self,
        _auth: &AuthContext,
        employee_id: u64,
    ) -> Result<f64, PayrollError> {
        let amount = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT amount
            FROM thirteenth_month_pay
            WHERE employee_id = ?
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch 13th month pay");
            PayrollError::Database(e)
        })?;

        Ok(amount.unwrap_or(0.0))
    }
}

#[async_trait]
impl ScheduleSource for MySqlGateway {
    async fn contribution_schedule(
        &self,
        _auth: &AuthContext,
        scheme: Scheme,
    ) -> Result<Vec<ContributionBracket>, PayrollError> {
        sqlx::query_as::<_, ContributionBracket>(
            r#"
            SELECT range_start, range_end, employee_share
            FROM contribution_schedules
            WHERE scheme = ?
            ORDER BY range_start
            "#,
        )
        .bind(scheme.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, scheme = %scheme, "Failed to fetch contribution schedule");
            PayrollError::Database(e)
        })
    }
}

#[async_trait]
impl DraftStore for MySqlGateway {
    async fn fetch_draft(
        &self,
        _auth: &AuthContext,
        period: PayPeriod,
    ) -> Result<Vec<PayrollLineItem>, PayrollError> {
        sqlx::query_as::<_, PayrollLineItem>(
            r#"
            SELECT *
            FROM payroll_drafts
            WHERE period_start = ? AND period_end = ?
            ORDER BY employee_id
            "#,
        )
        .bind(period.start)
        .bind(period.end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, period = %period, "Failed to fetch draft");
            PayrollError::Database(e)
        })
    }

    async fn upsert_draft(
        &self,
        _auth: &AuthContext,
        period: PayPeriod,
        items: &[PayrollLineItem],
    ) -> Result<(), PayrollError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM payroll_drafts
            WHERE period_start = ? AND period_end = ?
            "#,
        )
        .bind(period.start)
        .bind(period.end)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO payroll_drafts
                (employee_id, period_start, period_end,
                 monthly_wage, regular_days_worked, earnings_adjustment,
                 over_time, holiday_pay, sil_pay, thirteenth_month,
                 deductions_adjustment, withholding_tax, ca_charges,
                 sss, philhealth, pagibig,
                 gross_pay, total_gross_pay, total_deductions, net_pay,
                 is_override)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(item.employee_id)
            .bind(item.period_start)
            .bind(item.period_end)
            .bind(item.monthly_wage)
            .bind(item.regular_days_worked)
            .bind(item.earnings_adjustment)
            .bind(item.over_time)
            .bind(item.holiday_pay)
            .bind(item.sil_pay)
            .bind(item.thirteenth_month)
            .bind(item.deductions_adjustment)
            .bind(item.withholding_tax)
            .bind(item.ca_charges)
            .bind(item.sss)
            .bind(item.philhealth)
            .bind(item.pagibig)
            .bind(item.gross_pay)
            .bind(item.total_gross_pay)
            .bind(item.total_deductions)
            .bind(item.net_pay)
            .bind(item.is_override)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await.map_err(|e| {
            error!(error = %e, period = %period, "Failed to commit draft save");
            PayrollError::Database(e)
        })
    }

    async fn delete_draft(
        &self,
        _auth: &AuthContext,
        period: PayPeriod,
    ) -> Result<(), PayrollError> {
        sqlx::query(
            r#"
            DELETE FROM payroll_drafts
            WHERE period_start = ? AND period_end = ?
            "#,
        )
        .bind(period.start)
        .bind(period.end)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, period = %period, "Failed to clear draft");
            PayrollError::Database(e)
        })?;

        Ok(())
    }
}

#[async_trait]
impl ReportSink for MySqlGateway {
    async fn submit_report(
        &self,
        _auth: &AuthContext,
        report: PayrollReport,
    ) -> Result<String, PayrollError> {
        let id = Uuid::new_v4().to_string();
        let payload = serde_json::to_string(&report.line_items)
            .map_err(|e| PayrollError::ReportSink(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO payroll_reports (id, period_start, period_end, payload)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(report.period.start)
        .bind(report.period.end)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, period = %report.period, "Failed to submit report");
            PayrollError::Database(e)
        })?;

        Ok(id)
    }
}
