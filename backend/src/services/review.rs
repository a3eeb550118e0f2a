//! Application review workflow for the staff back-office
//!
//! Holds the status state machine of §approve/reject: Pending and
//! Resubmitted applications can be approved or rejected by staff; a
//! rejection requires an applicant-visible reason and may carry a separate
//! staff-only note. Decision emails are queued best-effort after the
//! status change has committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::types::{ApplicationStatus, MemberType, PaginatedResponse, PaginationMeta};
use shared::validation;

use crate::error::{AppError, AppResult};
use crate::services::application::decode_status;
use crate::services::email::Notifier;

/// Review service for approving and rejecting applications
#[derive(Clone)]
pub struct ReviewService {
    db: PgPool,
    notifier: Notifier,
}

/// Recipient information shown before and returned after a decision
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipientInfo {
    pub recipient_email: String,
    pub recipient_name: String,
    pub company_name: String,
    pub tax_id: String,
}

/// Outcome of an approve or reject decision
#[derive(Debug, Serialize)]
pub struct DecisionOutcome {
    pub email_sent: bool,
    #[serde(flatten)]
    pub recipient: RecipientInfo,
}

/// Input for rejecting an application
#[derive(Debug, Deserialize)]
pub struct RejectInput {
    pub rejection_reason: String,
    pub admin_note: Option<String>,
}

/// Input for approving an application
#[derive(Debug, Deserialize)]
pub struct ApproveInput {
    pub admin_note: Option<String>,
}

/// Query parameters for the cross-type request listing
#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<i16>,
    #[serde(rename = "type")]
    pub member_type: Option<String>,
    pub search: Option<String>,
}

/// One row of the request listing
#[derive(Debug, Serialize, FromRow)]
pub struct RequestSummary {
    pub id: Uuid,
    pub member_type: String,
    pub status: i16,
    pub company_name_th: String,
    pub company_name_en: Option<String>,
    pub tax_id: String,
    pub email: String,
    pub resubmission_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewService {
    /// Create a new ReviewService instance
    pub fn new(db: PgPool, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    // ========================================================================
    // Decisions
    // ========================================================================

    /// Approve an application, with an optional staff note
    pub async fn approve(
        &self,
        admin_id: Uuid,
        member_type: MemberType,
        application_id: Uuid,
        input: ApproveInput,
    ) -> AppResult<DecisionOutcome> {
        let current = self.fetch_status(member_type, application_id).await?;
        if !current.can_transition_to(ApplicationStatus::Approved) {
            return Err(AppError::InvalidStateTransition(format!(
                "cannot approve an application in status {}",
                current.as_str()
            )));
        }

        let recipient = self.fetch_recipient(member_type, application_id).await?;

        sqlx::query(
            r#"
            UPDATE applications SET
                status = $3,
                reviewed_by = $4,
                reviewed_at = NOW(),
                admin_note = COALESCE($5, admin_note),
                admin_note_by = CASE WHEN $5 IS NULL THEN admin_note_by ELSE $4 END,
                admin_note_at = CASE WHEN $5 IS NULL THEN admin_note_at ELSE NOW() END,
                updated_at = NOW()
            WHERE id = $1 AND member_type = $2
            "#,
        )
        .bind(application_id)
        .bind(member_type.as_str())
        .bind(ApplicationStatus::Approved.as_code())
        .bind(admin_id)
        .bind(&input.admin_note)
        .execute(&self.db)
        .await?;

        tracing::info!(%application_id, member_type = member_type.as_str(), "application approved");

        let email_sent = self.notifier.notify_approved(
            &recipient.recipient_email,
            &recipient.recipient_name,
            &recipient.company_name,
        );

        Ok(DecisionOutcome { email_sent, recipient })
    }

    /// Reject an application.
    ///
    /// The rejection reason is validated before anything is touched; a
    /// whitespace-only reason fails with a validation error and the
    /// application is left unchanged.
    pub async fn reject(
        &self,
        admin_id: Uuid,
        member_type: MemberType,
        application_id: Uuid,
        input: RejectInput,
    ) -> AppResult<DecisionOutcome> {
        validation::validate_rejection_reason(&input.rejection_reason).map_err(|_| {
            AppError::Validation {
                field: "rejection_reason".to_string(),
                message: "Rejection reason is required".to_string(),
                message_th: "กรุณาระบุเหตุผลในการปฏิเสธ".to_string(),
            }
        })?;

        let current = self.fetch_status(member_type, application_id).await?;
        if !current.can_transition_to(ApplicationStatus::Rejected) {
            return Err(AppError::InvalidStateTransition(format!(
                "cannot reject an application in status {}",
                current.as_str()
            )));
        }

        let recipient = self.fetch_recipient(member_type, application_id).await?;

        sqlx::query(
            r#"
            UPDATE applications SET
                status = $3,
                rejection_reason = $4,
                reviewed_by = $5,
                reviewed_at = NOW(),
                admin_note = COALESCE($6, admin_note),
                admin_note_by = CASE WHEN $6 IS NULL THEN admin_note_by ELSE $5 END,
                admin_note_at = CASE WHEN $6 IS NULL THEN admin_note_at ELSE NOW() END,
                updated_at = NOW()
            WHERE id = $1 AND member_type = $2
            "#,
        )
        .bind(application_id)
        .bind(member_type.as_str())
        .bind(ApplicationStatus::Rejected.as_code())
        .bind(&input.rejection_reason)
        .bind(admin_id)
        .bind(&input.admin_note)
        .execute(&self.db)
        .await?;

        tracing::info!(%application_id, member_type = member_type.as_str(), "application rejected");

        let email_sent = self.notifier.notify_rejected(
            &recipient.recipient_email,
            &recipient.recipient_name,
            &recipient.company_name,
            &input.rejection_reason,
        );

        Ok(DecisionOutcome { email_sent, recipient })
    }

    /// Attach or replace the staff-only note without a status change
    pub async fn set_note(
        &self,
        admin_id: Uuid,
        member_type: MemberType,
        application_id: Uuid,
        note: String,
    ) -> AppResult<()> {
        if note.trim().is_empty() {
            return Err(AppError::Validation {
                field: "admin_note".to_string(),
                message: "Note must not be empty".to_string(),
                message_th: "กรุณาระบุข้อความบันทึก".to_string(),
            });
        }

        let result = sqlx::query(
            r#"
            UPDATE applications SET
                admin_note = $3,
                admin_note_by = $4,
                admin_note_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND member_type = $2
            "#,
        )
        .bind(application_id)
        .bind(member_type.as_str())
        .bind(&note)
        .bind(admin_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Application".to_string()));
        }

        Ok(())
    }

    /// Recipient info for the rejection confirmation dialog
    pub async fn recipient_preview(
        &self,
        member_type: MemberType,
        application_id: Uuid,
    ) -> AppResult<RecipientInfo> {
        self.fetch_recipient(member_type, application_id).await
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// List applications across all member types with filters
    pub async fn list(
        &self,
        query: ListRequestsQuery,
    ) -> AppResult<PaginatedResponse<RequestSummary>> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;

        if let Some(code) = query.status {
            // Reject filters on reserved or unknown codes up front
            if ApplicationStatus::from_code(code).is_none() {
                return Err(AppError::Validation {
                    field: "status".to_string(),
                    message: format!("Invalid status code: {}", code),
                    message_th: format!("รหัสสถานะไม่ถูกต้อง: {}", code),
                });
            }
        }

        let member_type = match &query.member_type {
            Some(raw) => Some(
                MemberType::from_str(raw)
                    .ok_or_else(|| AppError::Validation {
                        field: "type".to_string(),
                        message: format!("Invalid member type: {}", raw),
                        message_th: format!("ประเภทสมาชิกไม่ถูกต้อง: {}", raw),
                    })?
                    .as_str(),
            ),
            None => None,
        };

        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let total_items = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM applications
            WHERE ($1::smallint IS NULL OR status = $1)
              AND ($2::text IS NULL OR member_type = $2)
              AND ($3::text IS NULL
                   OR company_name_th ILIKE '%' || $3 || '%'
                   OR company_name_en ILIKE '%' || $3 || '%'
                   OR tax_id LIKE '%' || $3 || '%')
            "#,
        )
        .bind(query.status)
        .bind(member_type)
        .bind(search)
        .fetch_one(&self.db)
        .await?;

        let data = sqlx::query_as::<_, RequestSummary>(
            r#"
            SELECT id, member_type, status, company_name_th, company_name_en, tax_id,
                   email, resubmission_count, created_at, updated_at
            FROM applications
            WHERE ($1::smallint IS NULL OR status = $1)
              AND ($2::text IS NULL OR member_type = $2)
              AND ($3::text IS NULL
                   OR company_name_th ILIKE '%' || $3 || '%'
                   OR company_name_en ILIKE '%' || $3 || '%'
                   OR tax_id LIKE '%' || $3 || '%')
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(query.status)
        .bind(member_type)
        .bind(search)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.db)
        .await?;

        let total_pages = ((total_items as u64) as f64 / limit as f64).ceil() as u32;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta {
                page,
                per_page: limit,
                total_items: total_items as u64,
                total_pages,
            },
        })
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    async fn fetch_status(
        &self,
        member_type: MemberType,
        application_id: Uuid,
    ) -> AppResult<ApplicationStatus> {
        let code = sqlx::query_scalar::<_, i16>(
            "SELECT status FROM applications WHERE id = $1 AND member_type = $2",
        )
        .bind(application_id)
        .bind(member_type.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application".to_string()))?;

        decode_status(code)
    }

    /// The decision email goes to the application's contact address,
    /// addressed to the primary representative when one exists.
    async fn fetch_recipient(
        &self,
        member_type: MemberType,
        application_id: Uuid,
    ) -> AppResult<RecipientInfo> {
        sqlx::query_as::<_, RecipientInfo>(
            r#"
            SELECT a.email AS recipient_email,
                   COALESCE(r.first_name_th || ' ' || r.last_name_th, a.company_name_th) AS recipient_name,
                   a.company_name_th AS company_name,
                   a.tax_id
            FROM applications a
            LEFT JOIN application_representatives r
                ON r.application_id = a.id AND r.is_primary = TRUE
            WHERE a.id = $1 AND a.member_type = $2
            "#,
        )
        .bind(application_id)
        .bind(member_type.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application".to_string()))
    }
}
