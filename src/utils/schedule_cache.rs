use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;

use crate::auth::AuthContext;
use crate::error::PayrollError;
use crate::gateway::ScheduleSource;
use crate::model::bracket::{ContributionBracket, Scheme};

/// Statutory schedules are period-independent, so fetched bracket rows are
/// kept in-process with a TTL instead of being re-read on every period
/// load.
pub struct ScheduleCache {
    inner: Cache<Scheme, Arc<Vec<ContributionBracket>>>,
}

impl ScheduleCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(86_400)) // 24h TTL
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(8).time_to_live(ttl).build(),
        }
    }

    pub async fn get(&self, scheme: Scheme) -> Option<Arc<Vec<ContributionBracket>>> {
        self.inner.get(&scheme).await
    }

    pub async fn insert(&self, scheme: Scheme, rows: Vec<ContributionBracket>) {
        self.inner.insert(scheme, Arc::new(rows)).await;
    }

    /// Cached rows for the scheme, fetching through the collaborator on a
    /// miss.
    pub async fn get_or_fetch(
        &self,
        source: &dyn ScheduleSource,
        auth: &AuthContext,
        scheme: Scheme,
    ) -> Result<Arc<Vec<ContributionBracket>>, PayrollError> {
        if let Some(rows) = self.inner.get(&scheme).await {
            return Ok(rows);
        }
        let rows = Arc::new(source.contribution_schedule(auth, scheme).await?);
        self.inner.insert(scheme, rows.clone()).await;
        Ok(rows)
    }

    /// Drops every cached schedule; the next load re-fetches.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

impl Default for ScheduleCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Load all contribution schedules into the cache in one streamed pass.
pub async fn warmup_schedule_cache(cache: &ScheduleCache, pool: &MySqlPool) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, f64, Option<f64>, f64)>(
        r#"
        SELECT scheme, range_start, range_end, employee_share
        FROM contribution_schedules
        ORDER BY scheme, range_start
        "#,
    )
    .fetch(pool);

    let mut grouped: HashMap<Scheme, Vec<ContributionBracket>> = HashMap::new();
    let mut total_count = 0usize;
    let mut skipped = 0usize;

    while let Some(row) = stream.next().await {
        let (scheme, range_start, range_end, employee_share) = row?;
        match Scheme::from_str(&scheme) {
            Ok(scheme) => {
                grouped.entry(scheme).or_default().push(ContributionBracket {
                    range_start,
                    range_end,
                    employee_share,
                });
                total_count += 1;
            }
            Err(_) => skipped += 1,
        }
    }

    let inserts: Vec<_> = grouped
        .into_iter()
        .map(|(scheme, rows)| cache.insert(scheme, rows))
        .collect();
    futures::future::join_all(inserts).await;

    log::info!(
        "Schedule cache warmup complete: {} bracket rows ({} unknown-scheme rows skipped)",
        total_count,
        skipped
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthContext, Role};
    use crate::gateway::memory::MemoryGateway;
    use std::sync::atomic::Ordering;

    fn bracket(start: f64, share: f64) -> ContributionBracket {
        ContributionBracket {
            range_start: start,
            range_end: None,
            employee_share: share,
        }
    }

    #[tokio::test]
    async fn miss_fetches_and_caches() {
        let gateway = MemoryGateway::new();
        gateway.set_schedule(Scheme::Sss, vec![bracket(0.0, 180.0)]);
        let cache = ScheduleCache::new();
        let auth = AuthContext::new(1, "hr", Role::Hr);

        let rows = cache
            .get_or_fetch(&gateway, &auth, Scheme::Sss)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        // Subsequent fetches are served from the cache even when the
        // source starts failing.
        gateway.fail_schedules.store(true, Ordering::SeqCst);
        let cached = cache
            .get_or_fetch(&gateway, &auth, Scheme::Sss)
            .await
            .unwrap();
        assert_eq!(cached.len(), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let gateway = MemoryGateway::new();
        gateway.set_schedule(Scheme::Pagibig, vec![bracket(0.0, 1.0)]);
        let cache = ScheduleCache::new();
        let auth = AuthContext::new(1, "hr", Role::Hr);

        cache
            .get_or_fetch(&gateway, &auth, Scheme::Pagibig)
            .await
            .unwrap();

        gateway.set_schedule(Scheme::Pagibig, vec![bracket(0.0, 2.0), bracket(10.0, 3.0)]);
        cache.invalidate_all();

        let rows = cache
            .get_or_fetch(&gateway, &auth, Scheme::Pagibig)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }
}
