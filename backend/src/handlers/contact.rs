//! HTTP handlers for contact message endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AdminUser;
use crate::services::contact::{
    ContactMessage, ContactService, CreateContactMessageInput, ListContactMessagesQuery,
};
use crate::AppState;

use super::{ListResponse, SuccessResponse};

/// Store a message from the public contact form
pub async fn submit_contact_message(
    State(state): State<AppState>,
    Json(input): Json<CreateContactMessageInput>,
) -> AppResult<Json<SuccessResponse>> {
    let service = ContactService::new(state.db);
    service.create(input).await?;
    Ok(Json(SuccessResponse::new("ส่งข้อความเรียบร้อยแล้ว")))
}

/// List contact messages for staff
pub async fn list_contact_messages(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListContactMessagesQuery>,
) -> AppResult<Json<ListResponse<ContactMessage>>> {
    let service = ContactService::new(state.db);
    let page = service.list(query).await?;
    Ok(Json(page.into()))
}

/// Mark a contact message as read
pub async fn mark_contact_message_read(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(message_id): Path<Uuid>,
) -> AppResult<Json<SuccessResponse>> {
    let service = ContactService::new(state.db);
    service.mark_read(message_id).await?;
    Ok(Json(SuccessResponse::new("ทำเครื่องหมายว่าอ่านแล้ว")))
}
