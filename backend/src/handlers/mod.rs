//! HTTP handlers for the FTI Member Portal

pub mod address_request;
pub mod admin;
pub mod analytics;
pub mod auth;
pub mod contact;
pub mod health;
pub mod membership;

pub use address_request::*;
pub use admin::*;
pub use analytics::*;
pub use auth::*;
pub use contact::*;
pub use health::*;
pub use membership::*;

use serde::Serialize;

use shared::types::{MemberType, PaginatedResponse, PaginationMeta};

use crate::error::{AppError, AppResult};

/// Generic success response with a Thai-language toast message
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Paginated list response
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> From<PaginatedResponse<T>> for ListResponse<T> {
    fn from(page: PaginatedResponse<T>) -> Self {
        Self {
            success: true,
            data: page.data,
            pagination: page.pagination,
        }
    }
}

/// Parse a member type from a path segment
pub(crate) fn parse_member_type(raw: &str) -> AppResult<MemberType> {
    MemberType::from_str(raw).ok_or_else(|| AppError::Validation {
        field: "member_type".to_string(),
        message: format!("Invalid member type: {}", raw),
        message_th: format!("ประเภทสมาชิกไม่ถูกต้อง: {}", raw),
    })
}
