//! HTTP handlers for member-facing application endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use shared::models::application::{ApplicationForm, UpdateForm};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::application::{ApplicationDetail, ApplicationService, ApplicationView};
use crate::services::Notifier;
use crate::AppState;

use super::{parse_member_type, SuccessResponse};

/// Response after a successful submission
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub application_id: Uuid,
    pub message: String,
}

/// Submit a new membership application
pub async fn submit_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(member_type): Path<String>,
    Json(form): Json<ApplicationForm>,
) -> AppResult<Json<SubmitResponse>> {
    let member_type = parse_member_type(&member_type)?;
    let notifier = Notifier::new(&state.config.smtp);
    let service = ApplicationService::new(state.db, notifier);
    let application_id = service
        .submit(current_user.0.user_id, member_type, form)
        .await?;
    Ok(Json(SubmitResponse {
        success: true,
        application_id,
        message: "ส่งใบสมัครสมาชิกเรียบร้อยแล้ว".to_string(),
    }))
}

/// List the caller's applications
pub async fn list_my_applications(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ApplicationView>>> {
    let notifier = Notifier::new(&state.config.smtp);
    let service = ApplicationService::new(state.db, notifier);
    let applications = service.list_owned(current_user.0.user_id).await?;
    Ok(Json(applications))
}

/// Get one of the caller's applications with its full graph
pub async fn get_my_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((member_type, application_id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApplicationDetail<ApplicationView>>> {
    let member_type = parse_member_type(&member_type)?;
    let notifier = Notifier::new(&state.config.smtp);
    let service = ApplicationService::new(state.db, notifier);
    let detail = service
        .get_owned(current_user.0.user_id, member_type, application_id)
        .await?;
    Ok(Json(detail))
}

/// Resubmit a rejected application with replacement data
pub async fn resubmit_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((member_type, application_id)): Path<(String, Uuid)>,
    Json(form): Json<UpdateForm>,
) -> AppResult<Json<SuccessResponse>> {
    let member_type = parse_member_type(&member_type)?;
    let notifier = Notifier::new(&state.config.smtp);
    let service = ApplicationService::new(state.db, notifier);
    service
        .resubmit(current_user.0.user_id, member_type, application_id, form)
        .await?;
    Ok(Json(SuccessResponse::new(
        "ส่งข้อมูลใบสมัครที่แก้ไขแล้วเรียบร้อย",
    )))
}
