//! Membership application payloads and the tagged type-details variant
//!
//! The four membership types share roughly 80% of their structure; the
//! type-specific remainder is carried in [`TypeDetails`], a serde-tagged
//! sum type persisted as a single JSONB column. Child collections
//! (addresses, representatives, products, ...) are type-agnostic and keyed
//! by application id.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::MemberType;

/// Address type codes for application addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    HeadOffice,
    Factory,
    Billing,
    Mailing,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::HeadOffice => "head_office",
            AddressType::Factory => "factory",
            AddressType::Billing => "billing",
            AddressType::Mailing => "mailing",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "head_office" => Some(AddressType::HeadOffice),
            "factory" => Some(AddressType::Factory),
            "billing" => Some(AddressType::Billing),
            "mailing" => Some(AddressType::Mailing),
            _ => None,
        }
    }
}

/// One address row of an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressPayload {
    pub address_type: AddressType,
    pub address_line: String,
    pub subdistrict: String,
    pub district: String,
    pub province: String,
    pub postal_code: String,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
}

/// One company representative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativePayload {
    pub is_primary: bool,
    pub title: Option<String>,
    pub first_name_th: String,
    pub last_name_th: String,
    pub first_name_en: Option<String>,
    pub last_name_en: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub display_order: i32,
}

/// Additional contact person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactPersonPayload {
    pub name: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub line_id: Option<String>,
}

/// Business type category tag; code "other" carries free-text detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessTypePayload {
    pub category_code: String,
    pub other_detail: Option<String>,
}

/// Product name pair (TH/EN)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub name_th: String,
    pub name_en: Option<String>,
}

/// Industry group membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryGroupPayload {
    pub group_code: String,
    pub group_name: Option<String>,
}

/// Provincial chapter membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceChapterPayload {
    pub chapter_code: String,
    pub chapter_name: Option<String>,
}

/// Reference to an uploaded document (storage itself is external)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub document_type: String,
    pub file_name: String,
    pub file_url: String,
    pub file_size_bytes: Option<i64>,
    pub mime_type: Option<String>,
}

// ============================================================================
// Type-specific details
// ============================================================================

/// Details for an ordinary factory member (OC)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcDetails {
    pub juristic_registration_no: Option<String>,
    pub factory_license_no: Option<String>,
    pub factory_registration_no: Option<String>,
    pub machine_horsepower: Option<Decimal>,
    pub industrial_estate: Option<String>,
    pub factory_province: Option<String>,
}

/// Details for an ordinary trade-association member (AM)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmDetails {
    pub association_license_no: Option<String>,
    pub association_member_count: Option<i32>,
    pub founded_year: Option<i32>,
}

/// Details for an associate corporate member (AC)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcDetails {
    pub juristic_registration_no: Option<String>,
    pub business_category: Option<String>,
}

/// Details for an associate individual member (IC)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IcDetails {
    pub title: Option<String>,
    pub first_name_th: Option<String>,
    pub last_name_th: Option<String>,
    pub first_name_en: Option<String>,
    pub last_name_en: Option<String>,
    pub id_card_no: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub occupation: Option<String>,
    pub education_level: Option<String>,
}

/// Tagged type-specific payload of an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member_type", rename_all = "lowercase")]
pub enum TypeDetails {
    Oc(OcDetails),
    Am(AmDetails),
    Ac(AcDetails),
    Ic(IcDetails),
}

/// Error converting details between membership types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("switching from {from} to {to} is not supported")]
    UnsupportedPair { from: &'static str, to: &'static str },
}

impl TypeDetails {
    /// The membership type this payload belongs to
    pub fn member_type(&self) -> MemberType {
        match self {
            TypeDetails::Oc(_) => MemberType::Oc,
            TypeDetails::Am(_) => MemberType::Am,
            TypeDetails::Ac(_) => MemberType::Ac,
            TypeDetails::Ic(_) => MemberType::Ic,
        }
    }

    /// Remap this payload to the `target` membership type.
    ///
    /// Shared fields are preserved, fields without a counterpart in the
    /// destination are dropped, and destination-only fields start empty.
    /// Only the oc ↔ ac pair is supported; every other pair fails without
    /// producing a partial result.
    pub fn convert_to(&self, target: MemberType) -> Result<TypeDetails, ConvertError> {
        match (self, target) {
            (TypeDetails::Oc(oc), MemberType::Ac) => Ok(TypeDetails::Ac(AcDetails {
                juristic_registration_no: oc.juristic_registration_no.clone(),
                business_category: None,
            })),
            (TypeDetails::Ac(ac), MemberType::Oc) => Ok(TypeDetails::Oc(OcDetails {
                juristic_registration_no: ac.juristic_registration_no.clone(),
                factory_license_no: None,
                factory_registration_no: None,
                machine_horsepower: None,
                industrial_estate: None,
                factory_province: None,
            })),
            (details, target) => Err(ConvertError::UnsupportedPair {
                from: details.member_type().as_str(),
                to: target.as_str(),
            }),
        }
    }
}

// ============================================================================
// Form payloads
// ============================================================================

/// Full application submission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationForm {
    pub company_name_th: String,
    pub company_name_en: Option<String>,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    pub website: Option<String>,
    pub registered_capital: Option<Decimal>,
    pub employee_count: Option<i32>,
    pub type_details: TypeDetails,
    pub addresses: Vec<AddressPayload>,
    pub representatives: Vec<RepresentativePayload>,
    #[serde(default)]
    pub contact_persons: Vec<ContactPersonPayload>,
    #[serde(default)]
    pub business_types: Vec<BusinessTypePayload>,
    #[serde(default)]
    pub products: Vec<ProductPayload>,
    #[serde(default)]
    pub industry_groups: Vec<IndustryGroupPayload>,
    #[serde(default)]
    pub province_chapters: Vec<ProvinceChapterPayload>,
    #[serde(default)]
    pub documents: Vec<DocumentPayload>,
}

/// Replacement payload for an update or resubmission.
///
/// Main fields are optional; an absent child collection leaves that table
/// untouched, a present one replaces it wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateForm {
    pub company_name_th: Option<String>,
    pub company_name_en: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub registered_capital: Option<Decimal>,
    pub employee_count: Option<i32>,
    pub type_details: Option<TypeDetails>,
    pub addresses: Option<Vec<AddressPayload>>,
    pub representatives: Option<Vec<RepresentativePayload>>,
    pub contact_persons: Option<Vec<ContactPersonPayload>>,
    pub business_types: Option<Vec<BusinessTypePayload>>,
    pub products: Option<Vec<ProductPayload>>,
    pub industry_groups: Option<Vec<IndustryGroupPayload>>,
    pub province_chapters: Option<Vec<ProvinceChapterPayload>>,
    pub documents: Option<Vec<DocumentPayload>>,
}

impl UpdateForm {
    /// Names of the child collections this payload replaces
    pub fn replaced_collections(&self) -> Vec<&'static str> {
        let mut replaced = Vec::new();
        if self.addresses.is_some() {
            replaced.push("addresses");
        }
        if self.representatives.is_some() {
            replaced.push("representatives");
        }
        if self.contact_persons.is_some() {
            replaced.push("contact_persons");
        }
        if self.business_types.is_some() {
            replaced.push("business_types");
        }
        if self.products.is_some() {
            replaced.push("products");
        }
        if self.industry_groups.is_some() {
            replaced.push("industry_groups");
        }
        if self.province_chapters.is_some() {
            replaced.push("province_chapters");
        }
        if self.documents.is_some() {
            replaced.push("documents");
        }
        replaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_oc() -> OcDetails {
        OcDetails {
            juristic_registration_no: Some("0105536000123".to_string()),
            factory_license_no: Some("กท-123/2560".to_string()),
            factory_registration_no: Some("3-12(1)-45/60".to_string()),
            machine_horsepower: Some(Decimal::from(250)),
            industrial_estate: Some("นิคมอุตสาหกรรมบางปู".to_string()),
            factory_province: Some("สมุทรปราการ".to_string()),
        }
    }

    #[test]
    fn test_convert_oc_to_ac_keeps_juristic_no() {
        let oc = sample_oc();
        let converted = TypeDetails::Oc(oc.clone()).convert_to(MemberType::Ac).unwrap();
        match converted {
            TypeDetails::Ac(ac) => {
                assert_eq!(ac.juristic_registration_no, oc.juristic_registration_no);
                assert_eq!(ac.business_category, None);
            }
            other => panic!("expected ac details, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_ac_to_oc_defaults_factory_fields() {
        let ac = AcDetails {
            juristic_registration_no: Some("0105536000123".to_string()),
            business_category: Some("การค้า".to_string()),
        };
        let converted = TypeDetails::Ac(ac.clone()).convert_to(MemberType::Oc).unwrap();
        match converted {
            TypeDetails::Oc(oc) => {
                assert_eq!(oc.juristic_registration_no, ac.juristic_registration_no);
                assert_eq!(oc.factory_license_no, None);
                assert_eq!(oc.machine_horsepower, None);
            }
            other => panic!("expected oc details, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_rejects_non_adjacent_pairs() {
        let oc = TypeDetails::Oc(sample_oc());
        assert!(oc.convert_to(MemberType::Am).is_err());
        assert!(oc.convert_to(MemberType::Ic).is_err());

        let am = TypeDetails::Am(AmDetails::default());
        assert!(am.convert_to(MemberType::Oc).is_err());
        assert!(am.convert_to(MemberType::Ac).is_err());

        let ic = TypeDetails::Ic(IcDetails::default());
        assert!(ic.convert_to(MemberType::Ac).is_err());
    }

    #[test]
    fn test_convert_round_trip_preserves_shared_fields() {
        let oc = sample_oc();
        let there = TypeDetails::Oc(oc.clone()).convert_to(MemberType::Ac).unwrap();
        let back = there.convert_to(MemberType::Oc).unwrap();
        match back {
            TypeDetails::Oc(round) => {
                assert_eq!(round.juristic_registration_no, oc.juristic_registration_no);
                // Factory-only fields are gone after the round trip
                assert_eq!(round.factory_license_no, None);
            }
            other => panic!("expected oc details, got {:?}", other),
        }
    }

    #[test]
    fn test_type_details_tag_serialization() {
        let details = TypeDetails::Ac(AcDetails::default());
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["member_type"], "ac");

        let parsed: TypeDetails = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.member_type(), MemberType::Ac);
    }

    #[test]
    fn test_update_form_replaced_collections() {
        let form = UpdateForm {
            products: Some(vec![]),
            addresses: Some(vec![]),
            ..UpdateForm::default()
        };
        assert_eq!(form.replaced_collections(), vec!["addresses", "products"]);
        assert!(UpdateForm::default().replaced_collections().is_empty());
    }
}
