//! HTTP handlers for address-change request endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{AdminUser, CurrentUser};
use crate::services::address_request::{
    AddressRequestService, AddressRequestView, AdminAddressRequestView,
    ApproveAddressRequestInput, ListAddressRequestsQuery, RejectAddressRequestInput,
    SubmitAddressRequestInput,
};
use crate::services::Notifier;
use crate::AppState;

use super::{ListResponse, SuccessResponse};

/// Response after submitting an address-change request
#[derive(Debug, Serialize)]
pub struct SubmitAddressRequestResponse {
    pub success: bool,
    pub request_id: Uuid,
    pub message: String,
}

/// Submit an address-change request for an approved application
pub async fn submit_address_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SubmitAddressRequestInput>,
) -> AppResult<Json<SubmitAddressRequestResponse>> {
    let notifier = Notifier::new(&state.config.smtp);
    let service = AddressRequestService::new(state.db, notifier);
    let request_id = service.submit(current_user.0.user_id, input).await?;
    Ok(Json(SubmitAddressRequestResponse {
        success: true,
        request_id,
        message: "ส่งคำขอเปลี่ยนแปลงที่อยู่เรียบร้อยแล้ว".to_string(),
    }))
}

/// List the caller's own address-change requests
pub async fn list_my_address_requests(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<AddressRequestView>>> {
    let notifier = Notifier::new(&state.config.smtp);
    let service = AddressRequestService::new(state.db, notifier);
    let requests = service.list_owned(current_user.0.user_id).await?;
    Ok(Json(requests))
}

/// List address-change requests for staff review
pub async fn list_address_requests(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListAddressRequestsQuery>,
) -> AppResult<Json<ListResponse<AdminAddressRequestView>>> {
    let notifier = Notifier::new(&state.config.smtp);
    let service = AddressRequestService::new(state.db, notifier);
    let page = service.list(query).await?;
    Ok(Json(page.into()))
}

/// Approve an address-change request
pub async fn approve_address_request(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<ApproveAddressRequestInput>,
) -> AppResult<Json<SuccessResponse>> {
    let notifier = Notifier::new(&state.config.smtp);
    let service = AddressRequestService::new(state.db, notifier);
    service.approve(admin.0.user_id, request_id, input).await?;
    Ok(Json(SuccessResponse::new("อนุมัติคำขอเปลี่ยนแปลงที่อยู่แล้ว")))
}

/// Reject an address-change request; the reason is required
pub async fn reject_address_request(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<RejectAddressRequestInput>,
) -> AppResult<Json<SuccessResponse>> {
    let notifier = Notifier::new(&state.config.smtp);
    let service = AddressRequestService::new(state.db, notifier);
    service.reject(admin.0.user_id, request_id, input).await?;
    Ok(Json(SuccessResponse::new("ปฏิเสธคำขอเปลี่ยนแปลงที่อยู่แล้ว")))
}
