//! Membership type-switch migration
//!
//! Moves an application from one membership type to an adjacent one
//! (oc ↔ ac only). The shared fields and every child collection are
//! type-agnostic under the normalized schema, so the switch is a remap of
//! the type-specific payload plus a tag change on the main row, executed
//! under a row lock in a single transaction. A failure at any step leaves
//! the source application untouched.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::types::MemberType;

use crate::error::{AppError, AppResult};
use crate::services::application::{decode_details, decode_member_type, decode_status};

/// Type-switch service
#[derive(Clone)]
pub struct TypeSwitchService {
    db: sqlx::PgPool,
}

/// Input for the switch-type operation
#[derive(Debug, Deserialize)]
pub struct SwitchTypeInput {
    pub application_id: Uuid,
    pub from_type: String,
    pub to_type: String,
}

/// Identity of the application after the switch.
///
/// Under the normalized schema the application keeps its id across a
/// switch; `new_id` echoes it so callers can redirect to the detail view
/// of the destination type.
#[derive(Debug, Serialize)]
pub struct SwitchOutcome {
    pub new_id: Uuid,
    pub new_type: String,
}

impl TypeSwitchService {
    /// Create a new TypeSwitchService instance
    pub fn new(db: sqlx::PgPool) -> Self {
        Self { db }
    }

    /// Switch an application between adjacent membership types.
    ///
    /// Validates the pair and the application's status before mutating;
    /// the remap and tag change commit atomically or not at all.
    pub async fn switch(&self, admin_id: Uuid, input: SwitchTypeInput) -> AppResult<SwitchOutcome> {
        let from_type = MemberType::from_str(&input.from_type).ok_or_else(|| {
            AppError::Validation {
                field: "from_type".to_string(),
                message: format!("Invalid member type: {}", input.from_type),
                message_th: format!("ประเภทสมาชิกไม่ถูกต้อง: {}", input.from_type),
            }
        })?;
        let to_type = MemberType::from_str(&input.to_type).ok_or_else(|| {
            AppError::Validation {
                field: "to_type".to_string(),
                message: format!("Invalid member type: {}", input.to_type),
                message_th: format!("ประเภทสมาชิกไม่ถูกต้อง: {}", input.to_type),
            }
        })?;

        if !from_type.can_switch_to(to_type) {
            return Err(AppError::Validation {
                field: "to_type".to_string(),
                message: format!(
                    "Switching from {} to {} is not supported",
                    from_type.as_str(),
                    to_type.as_str()
                ),
                message_th: format!(
                    "ไม่รองรับการเปลี่ยนประเภทสมาชิกจาก {} เป็น {}",
                    from_type.display_name_th(),
                    to_type.display_name_th()
                ),
            });
        }

        let mut tx = self.db.begin().await?;

        // Lock the row for the duration of the migration
        let row = sqlx::query_as::<_, (String, i16, serde_json::Value)>(
            r#"
            SELECT member_type, status, type_details
            FROM applications
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(input.application_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Application".to_string()))?;

        let (stored_type, status_code, details_value) = row;

        if decode_member_type(&stored_type)? != from_type {
            return Err(AppError::NotFound(format!(
                "Application under type {}",
                from_type.as_str()
            )));
        }

        let status = decode_status(status_code)?;
        if !status.allows_type_switch() {
            return Err(AppError::InvalidStateTransition(format!(
                "cannot switch the type of an application in status {}",
                status.as_str()
            )));
        }

        let details = decode_details(details_value)?;
        let converted = details.convert_to(to_type).map_err(|e| {
            // Adjacency was already checked; a failure here means the stored
            // payload disagrees with the member_type tag
            AppError::Internal(format!("type details remap failed: {}", e))
        })?;

        let converted_value = serde_json::to_value(&converted)
            .map_err(|e| AppError::Internal(format!("failed to serialize type details: {}", e)))?;

        sqlx::query(
            r#"
            UPDATE applications SET
                member_type = $2,
                type_details = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(input.application_id)
        .bind(to_type.as_str())
        .bind(&converted_value)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            application_id = %input.application_id,
            %admin_id,
            from = from_type.as_str(),
            to = to_type.as_str(),
            "membership type switched"
        );

        Ok(SwitchOutcome {
            new_id: input.application_id,
            new_type: to_type.as_str().to_string(),
        })
    }
}
