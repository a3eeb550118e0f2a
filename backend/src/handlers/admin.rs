//! HTTP handlers for the staff back-office: request review, in-place
//! section edits, and the membership type switch

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AdminUser;
use crate::services::application::{AdminApplicationView, ApplicationDetail, ApplicationService};
use crate::services::review::{
    ApproveInput, DecisionOutcome, ListRequestsQuery, RecipientInfo, RejectInput, RequestSummary,
    ReviewService,
};
use crate::services::type_switch::{SwitchOutcome, SwitchTypeInput, TypeSwitchService};
use crate::services::Notifier;
use crate::AppState;

use super::{parse_member_type, ListResponse, SuccessResponse};

/// Response after an approve or reject decision
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: DecisionOutcome,
}

/// Recipient info returned before a rejection is confirmed
#[derive(Debug, Serialize)]
pub struct RecipientPreviewResponse {
    pub success: bool,
    #[serde(flatten)]
    pub recipient: RecipientInfo,
}

/// Response after a type switch
#[derive(Debug, Serialize)]
pub struct SwitchTypeResponse {
    pub success: bool,
    pub data: SwitchOutcome,
    pub message: String,
}

/// Input for the staff-only note endpoint
#[derive(Debug, Deserialize)]
pub struct SetNoteInput {
    pub admin_note: String,
}

/// Input for the in-place section edit
#[derive(Debug, Deserialize)]
pub struct UpdateSectionInput {
    pub application_id: Uuid,
    #[serde(rename = "type")]
    pub member_type: String,
    pub section: String,
    pub data: serde_json::Value,
}

/// List applications across all member types
pub async fn list_membership_requests(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListRequestsQuery>,
) -> AppResult<Json<ListResponse<RequestSummary>>> {
    let notifier = Notifier::new(&state.config.smtp);
    let service = ReviewService::new(state.db, notifier);
    let page = service.list(query).await?;
    Ok(Json(page.into()))
}

/// Get one application with its full graph for the detail view
pub async fn get_membership_request(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((member_type, application_id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApplicationDetail<AdminApplicationView>>> {
    let member_type = parse_member_type(&member_type)?;
    let notifier = Notifier::new(&state.config.smtp);
    let service = ApplicationService::new(state.db, notifier);
    let detail = service.get_admin_detail(member_type, application_id).await?;
    Ok(Json(detail))
}

/// Approve an application
pub async fn approve_membership_request(
    State(state): State<AppState>,
    admin: AdminUser,
    Path((member_type, application_id)): Path<(String, Uuid)>,
    Json(input): Json<ApproveInput>,
) -> AppResult<Json<DecisionResponse>> {
    let member_type = parse_member_type(&member_type)?;
    let notifier = Notifier::new(&state.config.smtp);
    let service = ReviewService::new(state.db, notifier);
    let outcome = service
        .approve(admin.0.user_id, member_type, application_id, input)
        .await?;
    Ok(Json(DecisionResponse {
        success: true,
        outcome,
    }))
}

/// Reject an application; the reason is required
pub async fn reject_membership_request(
    State(state): State<AppState>,
    admin: AdminUser,
    Path((member_type, application_id)): Path<(String, Uuid)>,
    Json(input): Json<RejectInput>,
) -> AppResult<Json<DecisionResponse>> {
    let member_type = parse_member_type(&member_type)?;
    let notifier = Notifier::new(&state.config.smtp);
    let service = ReviewService::new(state.db, notifier);
    let outcome = service
        .reject(admin.0.user_id, member_type, application_id, input)
        .await?;
    Ok(Json(DecisionResponse {
        success: true,
        outcome,
    }))
}

/// Preview recipient info before rejecting
pub async fn preview_rejection(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((member_type, application_id)): Path<(String, Uuid)>,
) -> AppResult<Json<RecipientPreviewResponse>> {
    let member_type = parse_member_type(&member_type)?;
    let notifier = Notifier::new(&state.config.smtp);
    let service = ReviewService::new(state.db, notifier);
    let recipient = service.recipient_preview(member_type, application_id).await?;
    Ok(Json(RecipientPreviewResponse {
        success: true,
        recipient,
    }))
}

/// Attach or replace the staff-only note
pub async fn set_admin_note(
    State(state): State<AppState>,
    admin: AdminUser,
    Path((member_type, application_id)): Path<(String, Uuid)>,
    Json(input): Json<SetNoteInput>,
) -> AppResult<Json<SuccessResponse>> {
    let member_type = parse_member_type(&member_type)?;
    let notifier = Notifier::new(&state.config.smtp);
    let service = ReviewService::new(state.db, notifier);
    service
        .set_note(admin.0.user_id, member_type, application_id, input.admin_note)
        .await?;
    Ok(Json(SuccessResponse::new("บันทึกข้อความเรียบร้อยแล้ว")))
}

/// Replace one section of an application in place
pub async fn update_request_section(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<UpdateSectionInput>,
) -> AppResult<Json<SuccessResponse>> {
    let member_type = parse_member_type(&input.member_type)?;
    let notifier = Notifier::new(&state.config.smtp);
    let service = ApplicationService::new(state.db, notifier);
    service
        .update_section(member_type, input.application_id, &input.section, input.data)
        .await?;
    Ok(Json(SuccessResponse::new("แก้ไขข้อมูลเรียบร้อยแล้ว")))
}

/// Switch an application between adjacent membership types
pub async fn switch_membership_type(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(input): Json<SwitchTypeInput>,
) -> AppResult<Json<SwitchTypeResponse>> {
    let service = TypeSwitchService::new(state.db);
    let outcome = service.switch(admin.0.user_id, input).await?;
    Ok(Json(SwitchTypeResponse {
        success: true,
        data: outcome,
        message: "เปลี่ยนประเภทสมาชิกเรียบร้อยแล้ว".to_string(),
    }))
}
