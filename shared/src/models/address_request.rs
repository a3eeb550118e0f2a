//! Address-change request model and field diffing
//!
//! After approval, a member may request a change to one of their addresses.
//! The request stores the old and new address as paired JSON blobs; the
//! admin view shows a field-by-field diff of the two.

use serde::{Deserialize, Serialize};

use super::application::AddressPayload;

/// A single changed field between the old and the new address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

/// Compare the old and new address field by field, returning only the
/// fields whose values differ.
pub fn diff_addresses(old: &AddressPayload, new: &AddressPayload) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    let mut push = |field: &str, old_val: Option<&str>, new_val: Option<&str>| {
        if old_val != new_val {
            changes.push(FieldChange {
                field: field.to_string(),
                old: old_val.map(|s| s.to_string()),
                new: new_val.map(|s| s.to_string()),
            });
        }
    };

    push(
        "address_type",
        Some(old.address_type.as_str()),
        Some(new.address_type.as_str()),
    );
    push("address_line", Some(&old.address_line), Some(&new.address_line));
    push("subdistrict", Some(&old.subdistrict), Some(&new.subdistrict));
    push("district", Some(&old.district), Some(&new.district));
    push("province", Some(&old.province), Some(&new.province));
    push("postal_code", Some(&old.postal_code), Some(&new.postal_code));
    push("phone", old.phone.as_deref(), new.phone.as_deref());
    push("fax", old.fax.as_deref(), new.fax.as_deref());
    push("email", old.email.as_deref(), new.email.as_deref());

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::AddressType;

    fn base_address() -> AddressPayload {
        AddressPayload {
            address_type: AddressType::HeadOffice,
            address_line: "123/45 ถนนพระราม 4".to_string(),
            subdistrict: "คลองเตย".to_string(),
            district: "คลองเตย".to_string(),
            province: "กรุงเทพมหานคร".to_string(),
            postal_code: "10110".to_string(),
            phone: Some("021234567".to_string()),
            fax: None,
            email: None,
        }
    }

    #[test]
    fn test_identical_addresses_produce_no_changes() {
        let a = base_address();
        assert!(diff_addresses(&a, &a).is_empty());
    }

    #[test]
    fn test_diff_reports_only_changed_fields() {
        let old = base_address();
        let mut new = base_address();
        new.province = "นนทบุรี".to_string();
        new.postal_code = "11000".to_string();

        let changes = diff_addresses(&old, &new);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, "province");
        assert_eq!(changes[0].old.as_deref(), Some("กรุงเทพมหานคร"));
        assert_eq!(changes[0].new.as_deref(), Some("นนทบุรี"));
        assert_eq!(changes[1].field, "postal_code");
    }

    #[test]
    fn test_diff_handles_optional_fields() {
        let old = base_address();
        let mut new = base_address();
        new.phone = None;
        new.fax = Some("021234568".to_string());

        let changes = diff_addresses(&old, &new);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, "phone");
        assert_eq!(changes[0].new, None);
        assert_eq!(changes[1].field, "fax");
        assert_eq!(changes[1].old, None);
    }
}
