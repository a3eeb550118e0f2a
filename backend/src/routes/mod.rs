//! Route definitions for the FTI Member Portal

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Contact form (public)
        .route("/contact", post(handlers::submit_contact_message))
        // Member-facing membership routes (protected)
        .nest("/membership", membership_routes())
        // Member-facing address-change routes (protected)
        .nest("/address-change", address_change_routes())
        // Staff back-office (protected, admin checked per handler)
        .nest("/admin", admin_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Membership application routes for applicants (protected)
fn membership_routes() -> Router<AppState> {
    Router::new()
        .route("/my-applications", get(handlers::list_my_applications))
        .route("/:member_type/apply", post(handlers::submit_application))
        .route("/:member_type/:application_id", get(handlers::get_my_application))
        .route("/:member_type/:application_id/update", post(handlers::resubmit_application))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Address-change request routes for approved members (protected)
fn address_change_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_my_address_requests).post(handlers::submit_address_request))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Staff back-office routes (protected)
fn admin_routes() -> Router<AppState> {
    Router::new()
        // Membership request review
        .route("/membership-requests", get(handlers::list_membership_requests))
        .route("/membership-requests/update", post(handlers::update_request_section))
        .route("/membership-requests/switch-type", post(handlers::switch_membership_type))
        .route(
            "/membership-requests/:member_type/:application_id",
            get(handlers::get_membership_request),
        )
        .route(
            "/membership-requests/:member_type/:application_id/approve",
            post(handlers::approve_membership_request),
        )
        .route(
            "/membership-requests/:member_type/:application_id/reject",
            get(handlers::preview_rejection).post(handlers::reject_membership_request),
        )
        .route(
            "/membership-requests/:member_type/:application_id/note",
            post(handlers::set_admin_note),
        )
        // Address-change request review
        .route("/address-change-requests", get(handlers::list_address_requests))
        .route(
            "/address-change-requests/:request_id/approve",
            post(handlers::approve_address_request),
        )
        .route(
            "/address-change-requests/:request_id/reject",
            post(handlers::reject_address_request),
        )
        // Contact messages
        .route("/contact-messages", get(handlers::list_contact_messages))
        .route("/contact-messages/:message_id/read", post(handlers::mark_contact_message_read))
        // Analytics
        .route("/analytics/summary", get(handlers::analytics_summary))
        .route("/analytics/monthly", get(handlers::analytics_monthly))
        .route_layer(middleware::from_fn(auth_middleware))
}
