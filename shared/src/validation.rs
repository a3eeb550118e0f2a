//! Validation utilities for the FTI Member Portal
//!
//! Includes Thailand-specific validations for registration identifiers.

use crate::models::application::{AddressPayload, RepresentativePayload};

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate a rejection reason: must contain at least one
/// non-whitespace character.
pub fn validate_rejection_reason(reason: &str) -> Result<(), &'static str> {
    if reason.trim().is_empty() {
        return Err("Rejection reason must not be empty");
    }
    Ok(())
}

// ============================================================================
// Thailand-Specific Validations
// ============================================================================

/// Validate Thai phone number format
/// Accepts: 0812345678, 081-234-5678, +66812345678
pub fn validate_thai_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Thai number: 9-10 digits starting with 0 (mobile or landline)
    if (digits.len() == 9 || digits.len() == 10) && digits.starts_with('0') {
        return Ok(());
    }
    // International format without leading 0
    if digits.len() == 9 && !digits.starts_with('0') {
        return Ok(());
    }
    // International format with country code: starts with 66
    if digits.len() == 11 && digits.starts_with("66") {
        return Ok(());
    }

    Err("Invalid Thai phone number format")
}

/// Validate Thai National ID (เลขประจำตัวประชาชน)
/// 13-digit number with checksum validation
pub fn validate_thai_national_id(id: &str) -> Result<(), &'static str> {
    let digits: String = id.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 13 {
        return Err("Thai National ID must be 13 digits");
    }

    // Checksum validation using modulo 11 algorithm
    let chars: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    if chars.len() != 13 {
        return Err("Invalid Thai National ID format");
    }

    let mut sum = 0;
    for (i, &digit) in chars.iter().take(12).enumerate() {
        sum += digit * (13 - i as u32);
    }

    let check_digit = (11 - (sum % 11)) % 10;
    if check_digit != chars[12] {
        return Err("Invalid Thai National ID checksum");
    }

    Ok(())
}

/// Validate Thai Tax ID (เลขประจำตัวผู้เสียภาษี)
/// 13-digit number for businesses/individuals
pub fn validate_thai_tax_id(tax_id: &str) -> Result<(), &'static str> {
    let digits: String = tax_id.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 13 {
        return Err("Thai Tax ID must be 13 digits");
    }

    Ok(())
}

/// Validate Thai postal code (5 digits)
pub fn validate_thai_postal_code(postal_code: &str) -> Result<(), &'static str> {
    if postal_code.len() == 5 && postal_code.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("Thai postal code must be 5 digits")
    }
}

// ============================================================================
// Application Payload Validations
// ============================================================================

/// Validate an application's address list: at least one address, no
/// duplicate address types, and a valid postal code on each.
pub fn validate_addresses(addresses: &[AddressPayload]) -> Result<(), &'static str> {
    if addresses.is_empty() {
        return Err("At least one address is required");
    }

    for (i, address) in addresses.iter().enumerate() {
        validate_thai_postal_code(&address.postal_code)?;
        if addresses[..i]
            .iter()
            .any(|a| a.address_type == address.address_type)
        {
            return Err("Duplicate address type");
        }
    }

    Ok(())
}

/// Validate an application's representative list: non-empty with exactly
/// one representative marked primary.
pub fn validate_representatives(
    representatives: &[RepresentativePayload],
) -> Result<(), &'static str> {
    if representatives.is_empty() {
        return Err("At least one representative is required");
    }

    let primary_count = representatives.iter().filter(|r| r.is_primary).count();
    if primary_count != 1 {
        return Err("Exactly one representative must be marked primary");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::AddressType;

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co.th").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@.").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_rejection_reason() {
        assert!(validate_rejection_reason("เอกสารไม่ครบ").is_ok());
        assert!(validate_rejection_reason("missing documents").is_ok());
        assert!(validate_rejection_reason("").is_err());
        assert!(validate_rejection_reason("   ").is_err());
        assert!(validate_rejection_reason("\t\n").is_err());
    }

    // ========================================================================
    // Thailand-Specific Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_thai_phone_valid() {
        // Standard Thai mobile
        assert!(validate_thai_phone("0812345678").is_ok());
        // With dashes
        assert!(validate_thai_phone("081-234-5678").is_ok());
        // Bangkok landline (9 digits)
        assert!(validate_thai_phone("021234567").is_ok());
        // International format
        assert!(validate_thai_phone("+66812345678").is_ok());
        assert!(validate_thai_phone("66812345678").is_ok());
    }

    #[test]
    fn test_validate_thai_phone_invalid() {
        assert!(validate_thai_phone("12345").is_err());
        assert!(validate_thai_phone("123456789012").is_err());
        assert!(validate_thai_phone("abcdefghij").is_err());
    }

    #[test]
    fn test_validate_thai_national_id_valid() {
        // Valid Thai ID with correct checksum
        assert!(validate_thai_national_id("1100700000001").is_ok());
    }

    #[test]
    fn test_validate_thai_national_id_invalid() {
        // Wrong length
        assert!(validate_thai_national_id("123456789").is_err());
        // Invalid checksum
        assert!(validate_thai_national_id("1234567890123").is_err());
    }

    #[test]
    fn test_validate_thai_tax_id_valid() {
        assert!(validate_thai_tax_id("0123456789012").is_ok());
        assert!(validate_thai_tax_id("1234567890123").is_ok());
    }

    #[test]
    fn test_validate_thai_tax_id_invalid() {
        assert!(validate_thai_tax_id("123456789").is_err());
        assert!(validate_thai_tax_id("12345678901234").is_err());
    }

    #[test]
    fn test_validate_thai_postal_code() {
        assert!(validate_thai_postal_code("10110").is_ok());
        assert!(validate_thai_postal_code("50000").is_ok());
        assert!(validate_thai_postal_code("1011").is_err());
        assert!(validate_thai_postal_code("101100").is_err());
        assert!(validate_thai_postal_code("1011x").is_err());
    }

    // ========================================================================
    // Payload Validation Tests
    // ========================================================================

    fn address(address_type: AddressType) -> AddressPayload {
        AddressPayload {
            address_type,
            address_line: "123 ถนนสุขุมวิท".to_string(),
            subdistrict: "คลองเตย".to_string(),
            district: "คลองเตย".to_string(),
            province: "กรุงเทพมหานคร".to_string(),
            postal_code: "10110".to_string(),
            phone: None,
            fax: None,
            email: None,
        }
    }

    fn representative(is_primary: bool) -> RepresentativePayload {
        RepresentativePayload {
            is_primary,
            title: Some("นาย".to_string()),
            first_name_th: "สมชาย".to_string(),
            last_name_th: "ใจดี".to_string(),
            first_name_en: None,
            last_name_en: None,
            position: Some("กรรมการผู้จัดการ".to_string()),
            phone: None,
            email: None,
            display_order: 1,
        }
    }

    #[test]
    fn test_validate_addresses_valid() {
        let addresses = vec![address(AddressType::HeadOffice), address(AddressType::Factory)];
        assert!(validate_addresses(&addresses).is_ok());
    }

    #[test]
    fn test_validate_addresses_empty() {
        assert!(validate_addresses(&[]).is_err());
    }

    #[test]
    fn test_validate_addresses_duplicate_type() {
        let addresses = vec![address(AddressType::HeadOffice), address(AddressType::HeadOffice)];
        assert!(validate_addresses(&addresses).is_err());
    }

    #[test]
    fn test_validate_addresses_bad_postal_code() {
        let mut bad = address(AddressType::HeadOffice);
        bad.postal_code = "abc".to_string();
        assert!(validate_addresses(&[bad]).is_err());
    }

    #[test]
    fn test_validate_representatives_exactly_one_primary() {
        assert!(validate_representatives(&[representative(true)]).is_ok());
        assert!(validate_representatives(&[representative(true), representative(false)]).is_ok());
    }

    #[test]
    fn test_validate_representatives_invalid() {
        assert!(validate_representatives(&[]).is_err());
        assert!(validate_representatives(&[representative(false)]).is_err());
        assert!(validate_representatives(&[representative(true), representative(true)]).is_err());
    }
}
