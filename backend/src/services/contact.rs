//! Contact message service
//!
//! Stores messages from the public contact form for staff follow-up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::types::{PaginatedResponse, PaginationMeta};
use shared::validation;

use crate::error::{AppError, AppResult};

/// Contact message service
#[derive(Clone)]
pub struct ContactService {
    db: PgPool,
}

/// Input for the public contact form
#[derive(Debug, Deserialize)]
pub struct CreateContactMessageInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

/// Stored contact message
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for listing contact messages
#[derive(Debug, Deserialize)]
pub struct ListContactMessagesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub unread_only: Option<bool>,
}

impl ContactService {
    /// Create a new ContactService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Store a message from the public contact form
    pub async fn create(&self, input: CreateContactMessageInput) -> AppResult<ContactMessage> {
        if input.name.trim().is_empty() || input.message.trim().is_empty() {
            return Err(AppError::Validation {
                field: "message".to_string(),
                message: "Name and message are required".to_string(),
                message_th: "กรุณาระบุชื่อและข้อความ".to_string(),
            });
        }
        validation::validate_email(&input.email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
            message_th: "รูปแบบอีเมลไม่ถูกต้อง".to_string(),
        })?;

        let message = sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (name, email, phone, subject, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, phone, subject, message, is_read, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.subject)
        .bind(&input.message)
        .fetch_one(&self.db)
        .await?;

        Ok(message)
    }

    /// List contact messages for staff, newest first
    pub async fn list(
        &self,
        query: ListContactMessagesQuery,
    ) -> AppResult<PaginatedResponse<ContactMessage>> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;
        let unread_only = query.unread_only.unwrap_or(false);

        let total_items = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM contact_messages WHERE (NOT $1 OR is_read = FALSE)",
        )
        .bind(unread_only)
        .fetch_one(&self.db)
        .await?;

        let data = sqlx::query_as::<_, ContactMessage>(
            r#"
            SELECT id, name, email, phone, subject, message, is_read, created_at
            FROM contact_messages
            WHERE (NOT $1 OR is_read = FALSE)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(unread_only)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.db)
        .await?;

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

    /// Mark a contact message as read
    pub async fn mark_read(&self, message_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE contact_messages SET is_read = TRUE WHERE id = $1")
            .bind(message_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Contact message".to_string()));
        }

        Ok(())
    }
}
