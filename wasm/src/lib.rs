//! WebAssembly module for the FTI Member Portal
//!
//! Provides client-side validation for the public application forms so
//! applicants see identifier errors before submitting.

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Validate a Thai tax ID (13 digits)
#[wasm_bindgen]
pub fn check_tax_id(tax_id: &str) -> bool {
    validate_thai_tax_id(tax_id).is_ok()
}

/// Validate a Thai national ID card number, including the checksum
#[wasm_bindgen]
pub fn check_national_id(id: &str) -> bool {
    validate_thai_national_id(id).is_ok()
}

/// Validate a Thai phone number
#[wasm_bindgen]
pub fn check_phone(phone: &str) -> bool {
    validate_thai_phone(phone).is_ok()
}

/// Validate a Thai postal code
#[wasm_bindgen]
pub fn check_postal_code(postal_code: &str) -> bool {
    validate_thai_postal_code(postal_code).is_ok()
}

/// Validate an email address
#[wasm_bindgen]
pub fn check_email(email: &str) -> bool {
    validate_email(email).is_ok()
}

/// Validate a representative list given as JSON; returns an error message
/// or an empty string when the list is valid
#[wasm_bindgen]
pub fn check_representatives(representatives_json: &str) -> String {
    let representatives: Vec<RepresentativePayload> =
        match serde_json::from_str(representatives_json) {
            Ok(parsed) => parsed,
            Err(e) => return format!("Invalid representatives JSON: {}", e),
        };

    match validate_representatives(&representatives) {
        Ok(()) => String::new(),
        Err(msg) => msg.to_string(),
    }
}

/// Validate an address list given as JSON; returns an error message or an
/// empty string when the list is valid
#[wasm_bindgen]
pub fn check_addresses(addresses_json: &str) -> String {
    let addresses: Vec<AddressPayload> = match serde_json::from_str(addresses_json) {
        Ok(parsed) => parsed,
        Err(e) => return format!("Invalid addresses JSON: {}", e),
    };

    match validate_addresses(&addresses) {
        Ok(()) => String::new(),
        Err(msg) => msg.to_string(),
    }
}

/// Display name for a membership type code, in Thai
#[wasm_bindgen]
pub fn member_type_name_th(code: &str) -> String {
    MemberType::from_str(code)
        .map(|t| t.display_name_th().to_string())
        .unwrap_or_default()
}

/// Display name for a status code, in Thai
#[wasm_bindgen]
pub fn status_name_th(code: i16) -> String {
    ApplicationStatus::from_code(code)
        .map(|s| s.display_name_th().to_string())
        .unwrap_or_default()
}
