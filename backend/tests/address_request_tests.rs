//! Address-change request tests
//!
//! Covers the field diff shown to reviewers and the two-state decision
//! contract the workflow shares with the application review.

use proptest::prelude::*;
use shared::models::address_request::diff_addresses;
use shared::models::application::{AddressPayload, AddressType};
use shared::types::ApplicationStatus;
use shared::validation::validate_rejection_reason;

fn base_address() -> AddressPayload {
    AddressPayload {
        address_type: AddressType::HeadOffice,
        address_line: "1126/2 อาคารวานิช 2 ถนนเพชรบุรีตัดใหม่".to_string(),
        subdistrict: "มักกะสัน".to_string(),
        district: "ราชเทวี".to_string(),
        province: "กรุงเทพมหานคร".to_string(),
        postal_code: "10400".to_string(),
        phone: Some("023451000".to_string()),
        fax: Some("023451296".to_string()),
        email: Some("member@fti.or.th".to_string()),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// An unchanged address produces an empty diff
    #[test]
    fn test_no_diff_for_identical_addresses() {
        let address = base_address();
        assert!(diff_addresses(&address, &address).is_empty());
    }

    /// Each changed field appears exactly once with its old and new value
    #[test]
    fn test_diff_lists_changed_fields() {
        let old = base_address();
        let mut new = base_address();
        new.address_line = "88 หมู่ 4 ถนนบางนา-ตราด".to_string();
        new.province = "สมุทรปราการ".to_string();
        new.postal_code = "10540".to_string();

        let changes = diff_addresses(&old, &new);
        let fields: Vec<&str> = changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["address_line", "province", "postal_code"]);

        let province = changes.iter().find(|c| c.field == "province").unwrap();
        assert_eq!(province.old.as_deref(), Some("กรุงเทพมหานคร"));
        assert_eq!(province.new.as_deref(), Some("สมุทรปราการ"));
    }

    /// Clearing an optional field shows old Some → new None
    #[test]
    fn test_diff_cleared_optional_field() {
        let old = base_address();
        let mut new = base_address();
        new.fax = None;

        let changes = diff_addresses(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "fax");
        assert!(changes[0].old.is_some());
        assert!(changes[0].new.is_none());
    }

    /// The request shares the reject contract: a blank reason is invalid
    #[test]
    fn test_reject_reason_required() {
        assert!(validate_rejection_reason("ที่อยู่ไม่ตรงกับเอกสาร").is_ok());
        assert!(validate_rejection_reason("").is_err());
        assert!(validate_rejection_reason(" \t ").is_err());
    }

    /// Requests only move Pending → Approved / Rejected; decisions are final
    #[test]
    fn test_request_transitions() {
        use ApplicationStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn address_strategy() -> impl Strategy<Value = AddressPayload> {
        (
            "[ก-ฮ0-9 /]{5,30}",
            "[ก-ฮ]{3,15}",
            "[ก-ฮ]{3,15}",
            "[ก-ฮ]{3,15}",
            "[0-9]{5}",
            prop::option::of("[0-9]{9,10}"),
        )
            .prop_map(|(line, subdistrict, district, province, postal, phone)| AddressPayload {
                address_type: AddressType::HeadOffice,
                address_line: line,
                subdistrict,
                district,
                province,
                postal_code: postal,
                phone,
                fax: None,
                email: None,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The diff of an address with itself is always empty
        #[test]
        fn prop_self_diff_is_empty(address in address_strategy()) {
            prop_assert!(diff_addresses(&address, &address).is_empty());
        }

        /// Swapping old and new swaps the reported values, field for field
        #[test]
        fn prop_diff_is_antisymmetric(
            old in address_strategy(),
            new in address_strategy()
        ) {
            let forward = diff_addresses(&old, &new);
            let backward = diff_addresses(&new, &old);
            prop_assert_eq!(forward.len(), backward.len());
            for (f, b) in forward.iter().zip(backward.iter()) {
                prop_assert_eq!(&f.field, &b.field);
                prop_assert_eq!(&f.old, &b.new);
                prop_assert_eq!(&f.new, &b.old);
            }
        }

        /// Every reported change really differs between the two addresses
        #[test]
        fn prop_diff_reports_only_real_changes(
            old in address_strategy(),
            new in address_strategy()
        ) {
            for change in diff_addresses(&old, &new) {
                prop_assert_ne!(change.old, change.new, "field {}", change.field);
            }
        }

        /// Changing exactly one field yields exactly one change entry
        #[test]
        fn prop_single_field_change(
            address in address_strategy(),
            new_province in "[ก-ฮ]{3,15}"
        ) {
            prop_assume!(address.province != new_province);
            let mut new = address.clone();
            new.province = new_province;

            let changes = diff_addresses(&address, &new);
            prop_assert_eq!(changes.len(), 1);
            prop_assert_eq!(changes[0].field.as_str(), "province");
        }
    }
}
