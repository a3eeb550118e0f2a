//! Address-change request workflow
//!
//! Approved members may request a change to one of their registered
//! addresses. The request stores the old and new address as paired JSON
//! blobs and follows the same two-state approve/reject contract as the
//! application review: reason required on reject, optional staff note,
//! ownership checked before mutation, best-effort decision email.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::address_request::{diff_addresses, FieldChange};
use shared::models::application::AddressPayload;
use shared::types::{ApplicationStatus, MemberType, PaginatedResponse, PaginationMeta};
use shared::validation;

use crate::error::{AppError, AppResult};
use crate::services::application::decode_status;
use crate::services::email::Notifier;

/// Address-change request service
#[derive(Clone)]
pub struct AddressRequestService {
    db: PgPool,
    notifier: Notifier,
}

/// Input for submitting an address-change request
#[derive(Debug, Deserialize)]
pub struct SubmitAddressRequestInput {
    pub application_id: Uuid,
    pub new_address: AddressPayload,
}

/// Input for rejecting an address-change request
#[derive(Debug, Deserialize)]
pub struct RejectAddressRequestInput {
    pub rejection_reason: String,
    pub admin_note: Option<String>,
}

/// Input for approving an address-change request
#[derive(Debug, Deserialize)]
pub struct ApproveAddressRequestInput {
    pub admin_note: Option<String>,
}

/// Query parameters for listing address-change requests
#[derive(Debug, Deserialize)]
pub struct ListAddressRequestsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<i16>,
}

#[derive(Debug, FromRow)]
struct AddressRequestRow {
    id: Uuid,
    application_id: Uuid,
    status: i16,
    old_address: serde_json::Value,
    new_address: serde_json::Value,
    rejection_reason: Option<String>,
    admin_note: Option<String>,
    reviewed_by: Option<Uuid>,
    reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Member-facing view of an address-change request
#[derive(Debug, Serialize)]
pub struct AddressRequestView {
    pub id: Uuid,
    pub application_id: Uuid,
    pub status: String,
    pub status_code: i16,
    pub old_address: serde_json::Value,
    pub new_address: serde_json::Value,
    pub changes: Vec<FieldChange>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Staff view, including the private note and review stamps
#[derive(Debug, Serialize)]
pub struct AdminAddressRequestView {
    #[serde(flatten)]
    pub request: AddressRequestView,
    pub admin_note: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl AddressRequestRow {
    fn changes(&self) -> AppResult<Vec<FieldChange>> {
        let old: AddressPayload = serde_json::from_value(self.old_address.clone())
            .map_err(|e| AppError::Internal(format!("corrupt old address blob: {}", e)))?;
        let new: AddressPayload = serde_json::from_value(self.new_address.clone())
            .map_err(|e| AppError::Internal(format!("corrupt new address blob: {}", e)))?;
        Ok(diff_addresses(&old, &new))
    }

    fn into_view(self) -> AppResult<AddressRequestView> {
        let status = decode_status(self.status)?;
        let changes = self.changes()?;
        Ok(AddressRequestView {
            id: self.id,
            application_id: self.application_id,
            status: status.as_str().to_string(),
            status_code: self.status,
            old_address: self.old_address,
            new_address: self.new_address,
            changes,
            rejection_reason: self.rejection_reason,
            created_at: self.created_at,
        })
    }

    fn into_admin_view(self) -> AppResult<AdminAddressRequestView> {
        let admin_note = self.admin_note.clone();
        let reviewed_by = self.reviewed_by;
        let reviewed_at = self.reviewed_at;
        Ok(AdminAddressRequestView {
            request: self.into_view()?,
            admin_note,
            reviewed_by,
            reviewed_at,
        })
    }
}

const REQUEST_COLUMNS: &str = "id, application_id, status, old_address, new_address, \
     rejection_reason, admin_note, reviewed_by, reviewed_at, created_at";

impl AddressRequestService {
    /// Create a new AddressRequestService instance
    pub fn new(db: PgPool, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    // ========================================================================
    // Member operations
    // ========================================================================

    /// Submit an address-change request for an approved application.
    ///
    /// The caller must own the application; the current address of the
    /// same type becomes the stored "old" blob.
    pub async fn submit(
        &self,
        user_id: Uuid,
        input: SubmitAddressRequestInput,
    ) -> AppResult<Uuid> {
        let application = sqlx::query_as::<_, (Uuid, String, i16)>(
            "SELECT user_id, member_type, status FROM applications WHERE id = $1",
        )
        .bind(input.application_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application".to_string()))?;

        let (owner_id, _member_type, status_code) = application;
        if owner_id != user_id {
            return Err(AppError::InsufficientPermissions);
        }

        let status = decode_status(status_code)?;
        if status != ApplicationStatus::Approved {
            return Err(AppError::InvalidStateTransition(
                "address changes require an approved membership".to_string(),
            ));
        }

        validation::validate_thai_postal_code(&input.new_address.postal_code).map_err(|msg| {
            AppError::Validation {
                field: "postal_code".to_string(),
                message: msg.to_string(),
                message_th: "รหัสไปรษณีย์ไม่ถูกต้อง".to_string(),
            }
        })?;

        let old = sqlx::query_as::<_, (String, String, String, String, String, Option<String>, Option<String>, Option<String>)>(
            r#"
            SELECT address_line, subdistrict, district, province, postal_code, phone, fax, email
            FROM application_addresses
            WHERE application_id = $1 AND address_type = $2
            "#,
        )
        .bind(input.application_id)
        .bind(input.new_address.address_type.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Address".to_string()))?;

        let old_address = AddressPayload {
            address_type: input.new_address.address_type,
            address_line: old.0,
            subdistrict: old.1,
            district: old.2,
            province: old.3,
            postal_code: old.4,
            phone: old.5,
            fax: old.6,
            email: old.7,
        };

        if diff_addresses(&old_address, &input.new_address).is_empty() {
            return Err(AppError::Validation {
                field: "new_address".to_string(),
                message: "The new address is identical to the current one".to_string(),
                message_th: "ที่อยู่ใหม่เหมือนกับที่อยู่ปัจจุบัน".to_string(),
            });
        }

        let old_value = serde_json::to_value(&old_address)
            .map_err(|e| AppError::Internal(format!("failed to serialize address: {}", e)))?;
        let new_value = serde_json::to_value(&input.new_address)
            .map_err(|e| AppError::Internal(format!("failed to serialize address: {}", e)))?;

        let request_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO address_change_requests (application_id, user_id, status, old_address, new_address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.application_id)
        .bind(user_id)
        .bind(ApplicationStatus::Pending.as_code())
        .bind(&old_value)
        .bind(&new_value)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(%request_id, application_id = %input.application_id, "address-change request submitted");

        Ok(request_id)
    }

    /// List the caller's own address-change requests
    pub async fn list_owned(&self, user_id: Uuid) -> AppResult<Vec<AddressRequestView>> {
        let rows = sqlx::query_as::<_, AddressRequestRow>(&format!(
            "SELECT {} FROM address_change_requests WHERE user_id = $1 ORDER BY created_at DESC",
            REQUEST_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(AddressRequestRow::into_view).collect()
    }

    // ========================================================================
    // Staff operations
    // ========================================================================

    /// List address-change requests for review, with the field diff computed
    pub async fn list(
        &self,
        query: ListAddressRequestsQuery,
    ) -> AppResult<PaginatedResponse<AdminAddressRequestView>> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;

        let total_items = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM address_change_requests WHERE ($1::smallint IS NULL OR status = $1)",
        )
        .bind(query.status)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, AddressRequestRow>(&format!(
            r#"
            SELECT {}
            FROM address_change_requests
            WHERE ($1::smallint IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            REQUEST_COLUMNS
        ))
        .bind(query.status)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.db)
        .await?;

        let data = rows
            .into_iter()
            .map(AddressRequestRow::into_admin_view)
            .collect::<AppResult<Vec<_>>>()?;

        let total_pages = (total_items as f64 / limit as f64).ceil() as u32;

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

    /// Approve a pending request and apply the new address to the
    /// application's matching address row, all in one transaction.
    pub async fn approve(
        &self,
        admin_id: Uuid,
        request_id: Uuid,
        input: ApproveAddressRequestInput,
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, (Uuid, i16, serde_json::Value, String)>(
            r#"
            SELECT r.application_id, r.status, r.new_address, a.email
            FROM address_change_requests r
            JOIN applications a ON a.id = r.application_id
            WHERE r.id = $1
            FOR UPDATE OF r
            "#,
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Address-change request".to_string()))?;

        let (application_id, status_code, new_value, applicant_email) = row;

        let status = decode_status(status_code)?;
        if !status.can_transition_to(ApplicationStatus::Approved) {
            return Err(AppError::InvalidStateTransition(format!(
                "cannot approve an address-change request in status {}",
                status.as_str()
            )));
        }

        let new_address: AddressPayload = serde_json::from_value(new_value)
            .map_err(|e| AppError::Internal(format!("corrupt new address blob: {}", e)))?;

        let updated = sqlx::query(
            r#"
            UPDATE application_addresses SET
                address_line = $3,
                subdistrict = $4,
                district = $5,
                province = $6,
                postal_code = $7,
                phone = $8,
                fax = $9,
                email = $10
            WHERE application_id = $1 AND address_type = $2
            "#,
        )
        .bind(application_id)
        .bind(new_address.address_type.as_str())
        .bind(&new_address.address_line)
        .bind(&new_address.subdistrict)
        .bind(&new_address.district)
        .bind(&new_address.province)
        .bind(&new_address.postal_code)
        .bind(&new_address.phone)
        .bind(&new_address.fax)
        .bind(&new_address.email)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Address".to_string()));
        }

        sqlx::query(
            r#"
            UPDATE address_change_requests SET
                status = $2,
                reviewed_by = $3,
                reviewed_at = NOW(),
                admin_note = COALESCE($4, admin_note)
            WHERE id = $1
            "#,
        )
        .bind(request_id)
        .bind(ApplicationStatus::Approved.as_code())
        .bind(admin_id)
        .bind(&input.admin_note)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(%request_id, %application_id, "address-change request approved");

        self.notifier
            .notify_address_decision(&applicant_email, true, None);

        Ok(())
    }

    /// Reject a pending request; the reason is required and validated
    /// before anything is touched.
    pub async fn reject(
        &self,
        admin_id: Uuid,
        request_id: Uuid,
        input: RejectAddressRequestInput,
    ) -> AppResult<()> {
        validation::validate_rejection_reason(&input.rejection_reason).map_err(|_| {
            AppError::Validation {
                field: "rejection_reason".to_string(),
                message: "Rejection reason is required".to_string(),
                message_th: "กรุณาระบุเหตุผลในการปฏิเสธ".to_string(),
            }
        })?;

        let row = sqlx::query_as::<_, (i16, String)>(
            r#"
            SELECT r.status, a.email
            FROM address_change_requests r
            JOIN applications a ON a.id = r.application_id
            WHERE r.id = $1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Address-change request".to_string()))?;

        let (status_code, applicant_email) = row;

        let status = decode_status(status_code)?;
        if !status.can_transition_to(ApplicationStatus::Rejected) {
            return Err(AppError::InvalidStateTransition(format!(
                "cannot reject an address-change request in status {}",
                status.as_str()
            )));
        }

        sqlx::query(
            r#"
            UPDATE address_change_requests SET
                status = $2,
                rejection_reason = $3,
                reviewed_by = $4,
                reviewed_at = NOW(),
                admin_note = COALESCE($5, admin_note)
            WHERE id = $1
            "#,
        )
        .bind(request_id)
        .bind(ApplicationStatus::Rejected.as_code())
        .bind(&input.rejection_reason)
        .bind(admin_id)
        .bind(&input.admin_note)
        .execute(&self.db)
        .await?;

        tracing::info!(%request_id, "address-change request rejected");

        self.notifier.notify_address_decision(
            &applicant_email,
            false,
            Some(&input.rejection_reason),
        );

        Ok(())
    }
}
