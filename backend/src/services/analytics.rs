//! Analytics service for the staff dashboard
//!
//! Aggregate reads are cached in a capacity-bounded TTL cache keyed by the
//! stringified query parameters. Analytics tolerate staleness, so entries
//! are invalidated only by expiry, never by writes.

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::time::Duration;

use shared::types::{ApplicationStatus, MemberType};

use crate::config::AnalyticsConfig;
use crate::error::{AppError, AppResult};

/// Analytics service with an in-process result cache
#[derive(Clone)]
pub struct AnalyticsService {
    db: PgPool,
    cache: Cache<String, serde_json::Value>,
}

/// Application counts per status
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub status: String,
    pub count: i64,
}

/// Application counts per member type
#[derive(Debug, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub member_type: String,
    pub count: i64,
}

/// Summary of applications across all types
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total: i64,
    pub by_status: Vec<StatusBreakdown>,
    pub by_type: Vec<TypeBreakdown>,
}

/// Submission count for one month
#[derive(Debug, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: i32,
    pub count: i64,
}

/// Applications submitted per month of one year
#[derive(Debug, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub months: Vec<MonthCount>,
}

impl AnalyticsService {
    /// Create a new AnalyticsService instance
    pub fn new(db: PgPool, config: &AnalyticsConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
            .build();
        Self { db, cache }
    }

    /// Application counts by status and member type
    pub async fn summary(&self) -> AppResult<SummaryReport> {
        self.cached("summary", || self.load_summary()).await
    }

    /// Applications submitted per month of `year`
    pub async fn monthly(&self, year: i32) -> AppResult<MonthlyReport> {
        self.cached(&format!("monthly:{}", year), || self.load_monthly(year))
            .await
    }

    /// Look up a report in the cache, computing and storing it on a miss
    async fn cached<T, F, Fut>(&self, key: &str, load: F) -> AppResult<T>
    where
        T: Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = AppResult<T>>,
    {
        if let Some(value) = self.cache.get(key).await {
            if let Ok(report) = serde_json::from_value(value) {
                return Ok(report);
            }
        }

        let report = load().await?;
        let value = serde_json::to_value(&report)
            .map_err(|e| AppError::Internal(format!("failed to cache report: {}", e)))?;
        self.cache.insert(key.to_string(), value).await;

        Ok(report)
    }

    async fn load_summary(&self) -> AppResult<SummaryReport> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applications")
                .fetch_one(&self.db)
                .await?;

        let status_rows = sqlx::query_as::<_, (i16, i64)>(
            "SELECT status, COUNT(*) FROM applications GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.db)
        .await?;

        let by_status = status_rows
            .into_iter()
            .map(|(code, count)| StatusBreakdown {
                status: ApplicationStatus::from_code(code)
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| format!("unknown({})", code)),
                count,
            })
            .collect();

        let type_rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT member_type, COUNT(*) FROM applications GROUP BY member_type ORDER BY member_type",
        )
        .fetch_all(&self.db)
        .await?;

        let by_type = type_rows
            .into_iter()
            .map(|(tag, count)| TypeBreakdown {
                member_type: MemberType::from_str(&tag)
                    .map(|t| t.as_str().to_string())
                    .unwrap_or(tag),
                count,
            })
            .collect();

        Ok(SummaryReport {
            total,
            by_status,
            by_type,
        })
    }

    async fn load_monthly(&self, year: i32) -> AppResult<MonthlyReport> {
        let rows = sqlx::query_as::<_, (i32, i64)>(
            r#"
            SELECT EXTRACT(MONTH FROM created_at)::INT AS month, COUNT(*)
            FROM applications
            WHERE EXTRACT(YEAR FROM created_at)::INT = $1
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(year)
        .fetch_all(&self.db)
        .await?;

        // Fill the months with no submissions
        let mut months: Vec<MonthCount> = (1..=12)
            .map(|month| MonthCount { month, count: 0 })
            .collect();
        for (month, count) in rows {
            if (1..=12).contains(&month) {
                months[(month - 1) as usize].count = count;
            }
        }

        Ok(MonthlyReport { year, months })
    }
}
