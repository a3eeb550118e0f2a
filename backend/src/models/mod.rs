//! Data models for the FTI Member Portal
//!
//! Most domain models live in the shared crate so the public forms can
//! reuse them; re-export them for backend use.

pub use shared::models::*;
pub use shared::types::*;
