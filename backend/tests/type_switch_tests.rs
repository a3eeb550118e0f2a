//! Membership type-switch tests
//!
//! Covers the variant remap and the adjacency table:
//! - Only oc ↔ ac is a legal switch pair
//! - The remap preserves shared fields, drops source-only fields, and
//!   defaults destination-only fields
//! - A remap either fully succeeds or returns an error without producing a
//!   partial payload

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::models::application::{AcDetails, AmDetails, IcDetails, OcDetails, TypeDetails};
use shared::types::MemberType;

const ALL_TYPES: [MemberType; 4] = [
    MemberType::Oc,
    MemberType::Am,
    MemberType::Ac,
    MemberType::Ic,
];

fn details_for(member_type: MemberType) -> TypeDetails {
    match member_type {
        MemberType::Oc => TypeDetails::Oc(OcDetails::default()),
        MemberType::Am => TypeDetails::Am(AmDetails::default()),
        MemberType::Ac => TypeDetails::Ac(AcDetails::default()),
        MemberType::Ic => TypeDetails::Ic(IcDetails::default()),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Scenario C: switching oc → ac keeps the payload under the new tag
    #[test]
    fn test_switch_oc_to_ac() {
        let oc = TypeDetails::Oc(OcDetails {
            juristic_registration_no: Some("0105536000123".to_string()),
            factory_license_no: Some("กท-123/2560".to_string()),
            factory_registration_no: Some("3-12(1)-45/60".to_string()),
            machine_horsepower: Some(Decimal::from(400)),
            industrial_estate: None,
            factory_province: Some("ระยอง".to_string()),
        });

        let converted = oc.convert_to(MemberType::Ac).unwrap();
        assert_eq!(converted.member_type(), MemberType::Ac);
        match converted {
            TypeDetails::Ac(ac) => {
                assert_eq!(ac.juristic_registration_no.as_deref(), Some("0105536000123"));
                assert_eq!(ac.business_category, None);
            }
            other => panic!("expected ac details, got {:?}", other),
        }
    }

    /// The adjacency table is exactly {oc → ac, ac → oc}
    #[test]
    fn test_adjacency_table_is_fixed() {
        let mut allowed = Vec::new();
        for from in ALL_TYPES {
            for to in ALL_TYPES {
                if from.can_switch_to(to) {
                    allowed.push((from, to));
                }
            }
        }
        assert_eq!(
            allowed,
            vec![
                (MemberType::Oc, MemberType::Ac),
                (MemberType::Ac, MemberType::Oc)
            ]
        );
    }

    /// am and ic applications cannot be switched at all
    #[test]
    fn test_am_and_ic_have_no_switch_targets() {
        for from in [MemberType::Am, MemberType::Ic] {
            for to in ALL_TYPES {
                assert!(!from.can_switch_to(to), "{:?} -> {:?}", from, to);
            }
        }
    }

    /// A failed conversion reports the offending pair
    #[test]
    fn test_unsupported_pair_error_names_types() {
        let err = details_for(MemberType::Am)
            .convert_to(MemberType::Ic)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("am"));
        assert!(message.contains("ic"));
    }

    /// The JSONB round trip keeps the tag consistent with the variant
    #[test]
    fn test_converted_payload_serializes_under_new_tag() {
        let converted = details_for(MemberType::Oc)
            .convert_to(MemberType::Ac)
            .unwrap();
        let json = serde_json::to_value(&converted).unwrap();
        assert_eq!(json["member_type"], "ac");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating member types
    fn member_type_strategy() -> impl Strategy<Value = MemberType> {
        prop_oneof![
            Just(MemberType::Oc),
            Just(MemberType::Am),
            Just(MemberType::Ac),
            Just(MemberType::Ic),
        ]
    }

    /// Strategy for generating OC details with arbitrary field presence
    fn oc_details_strategy() -> impl Strategy<Value = OcDetails> {
        (
            prop::option::of("[0-9]{13}"),
            prop::option::of("[ก-ฮ0-9/-]{4,12}"),
            prop::option::of("[0-9()/-]{4,12}"),
            prop::option::of(1i64..100_000),
            prop::option::of("[A-Za-z ]{3,20}"),
        )
            .prop_map(|(juristic, license, registration, hp, estate)| OcDetails {
                juristic_registration_no: juristic,
                factory_license_no: license,
                factory_registration_no: registration,
                machine_horsepower: hp.map(Decimal::from),
                industrial_estate: estate.clone(),
                factory_province: estate,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// convert_to succeeds exactly on the pairs the adjacency allows
        #[test]
        fn prop_convert_agrees_with_adjacency(
            from in member_type_strategy(),
            to in member_type_strategy()
        ) {
            let result = details_for(from).convert_to(to);
            prop_assert_eq!(result.is_ok(), from.can_switch_to(to));
        }

        /// A successful conversion always carries the destination tag
        #[test]
        fn prop_converted_tag_matches_target(
            from in member_type_strategy(),
            to in member_type_strategy()
        ) {
            if let Ok(converted) = details_for(from).convert_to(to) {
                prop_assert_eq!(converted.member_type(), to);
            }
        }

        /// oc → ac preserves the juristic registration number for any payload
        #[test]
        fn prop_oc_to_ac_preserves_juristic_no(oc in oc_details_strategy()) {
            let juristic = oc.juristic_registration_no.clone();
            let converted = TypeDetails::Oc(oc).convert_to(MemberType::Ac).unwrap();
            match converted {
                TypeDetails::Ac(ac) => prop_assert_eq!(ac.juristic_registration_no, juristic),
                other => prop_assert!(false, "expected ac details, got {:?}", other),
            }
        }

        /// The oc → ac → oc round trip never resurrects factory fields
        #[test]
        fn prop_round_trip_drops_factory_fields(oc in oc_details_strategy()) {
            let juristic = oc.juristic_registration_no.clone();
            let back = TypeDetails::Oc(oc)
                .convert_to(MemberType::Ac)
                .unwrap()
                .convert_to(MemberType::Oc)
                .unwrap();
            match back {
                TypeDetails::Oc(round) => {
                    prop_assert_eq!(round.juristic_registration_no, juristic);
                    prop_assert_eq!(round.factory_license_no, None);
                    prop_assert_eq!(round.factory_registration_no, None);
                    prop_assert_eq!(round.machine_horsepower, None);
                    prop_assert_eq!(round.industrial_estate, None);
                    prop_assert_eq!(round.factory_province, None);
                }
                other => prop_assert!(false, "expected oc details, got {:?}", other),
            }
        }

        /// A failed conversion leaves the source usable and unchanged
        #[test]
        fn prop_failed_convert_is_side_effect_free(oc in oc_details_strategy()) {
            let details = TypeDetails::Oc(oc);
            let snapshot = details.clone();
            let _ = details.convert_to(MemberType::Ic);
            prop_assert_eq!(details, snapshot);
        }
    }
}
