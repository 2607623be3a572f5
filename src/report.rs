use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::auth::AuthContext;
use crate::error::PayrollError;
use crate::gateway::ReportSink;
use crate::model::line_item::PayrollLineItem;
use crate::model::period::PayPeriod;
use crate::model::report::PayrollReport;

/// Validates a user-selected subset of line items and submits it as an
/// immutable report snapshot.
///
/// Submission is one-shot and non-idempotent: submitting the same
/// selection twice creates two reports.
#[derive(Clone)]
pub struct ReportSubmitter {
    sink: Arc<dyn ReportSink>,
}

impl ReportSubmitter {
    pub fn new(sink: Arc<dyn ReportSink>) -> Self {
        Self { sink }
    }

    pub async fn submit(
        &self,
        auth: &AuthContext,
        items: &[PayrollLineItem],
        selection: &HashSet<u64>,
        period: PayPeriod,
    ) -> Result<String, PayrollError> {
        if selection.is_empty() {
            return Err(PayrollError::EmptySelection);
        }

        let selected: Vec<PayrollLineItem> = items
            .iter()
            .filter(|item| selection.contains(&item.employee_id))
            .cloned()
            .collect();
        if selected.is_empty() {
            return Err(PayrollError::SelectionNotFound);
        }

        let count = selected.len();
        let report = PayrollReport::new(period, selected);
        let report_id = self.sink.submit_report(auth, report).await?;
        info!(report_id = %report_id, period = %period, count, "Submitted payroll report");
        Ok(report_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::gateway::memory::MemoryGateway;
    use crate::model::employee::{EmployeeProfile, PayBasis};
    use chrono::NaiveDate;

    fn period() -> PayPeriod {
        PayPeriod::new(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 15).unwrap(),
        )
        .unwrap()
    }

    fn item(id: u64) -> PayrollLineItem {
        let profile = EmployeeProfile {
            employee_id: id,
            monthly_wage: 10000.0,
            pay_basis: PayBasis::Monthly,
            department: None,
            active: true,
        };
        PayrollLineItem::for_employee(&profile, period())
    }

    #[tokio::test]
    async fn rejects_empty_selection() {
        let gateway = Arc::new(MemoryGateway::new());
        let submitter = ReportSubmitter::new(gateway);
        let auth = AuthContext::new(1, "hr", Role::Hr);

        let err = submitter
            .submit(&auth, &[item(1)], &HashSet::new(), period())
            .await
            .unwrap_err();
        assert!(matches!(err, PayrollError::EmptySelection));
    }

    #[tokio::test]
    async fn rejects_selection_matching_nothing() {
        let gateway = Arc::new(MemoryGateway::new());
        let submitter = ReportSubmitter::new(gateway);
        let auth = AuthContext::new(1, "hr", Role::Hr);

        let err = submitter
            .submit(&auth, &[item(1)], &HashSet::from([42]), period())
            .await
            .unwrap_err();
        assert!(matches!(err, PayrollError::SelectionNotFound));
    }

    #[tokio::test]
    async fn submits_only_the_selected_subset() {
        let gateway = Arc::new(MemoryGateway::new());
        let submitter = ReportSubmitter::new(gateway.clone());
        let auth = AuthContext::new(1, "hr", Role::Hr);

        let items = vec![item(1), item(2), item(3)];
        let id = submitter
            .submit(&auth, &items, &HashSet::from([1, 3]), period())
            .await
            .unwrap();
        assert!(!id.is_empty());

        let reports = gateway.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        let (stored_id, report) = &reports[0];
        assert_eq!(stored_id, &id);
        let mut ids: Vec<u64> = report.line_items.iter().map(|i| i.employee_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn duplicate_submission_creates_duplicate_reports() {
        let gateway = Arc::new(MemoryGateway::new());
        let submitter = ReportSubmitter::new(gateway.clone());
        let auth = AuthContext::new(1, "hr", Role::Hr);

        let items = vec![item(1)];
        let first = submitter
            .submit(&auth, &items, &HashSet::from([1]), period())
            .await
            .unwrap();
        let second = submitter
            .submit(&auth, &items, &HashSet::from([1]), period())
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(gateway.report_count(), 2);
    }
}
