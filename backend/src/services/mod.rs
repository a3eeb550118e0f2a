//! Business logic services for the FTI Member Portal

pub mod address_request;
pub mod analytics;
pub mod application;
pub mod auth;
pub mod contact;
pub mod email;
pub mod review;
pub mod type_switch;

pub use address_request::AddressRequestService;
pub use analytics::AnalyticsService;
pub use application::ApplicationService;
pub use auth::AuthService;
pub use contact::ContactService;
pub use email::Notifier;
pub use review::ReviewService;
pub use type_switch::TypeSwitchService;
