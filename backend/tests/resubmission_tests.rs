//! Resubmission workflow tests
//!
//! Covers the applicant-side contract of the update operation:
//! - Ownership is enforced before any mutation
//! - Only rejected applications can be resubmitted
//! - The resubmission counter strictly increases by one per success
//! - A provided child collection fully replaces the stored rows; an
//!   absent one is left untouched

use proptest::prelude::*;
use shared::models::application::{ProductPayload, UpdateForm};
use shared::types::ApplicationStatus;
use uuid::Uuid;

/// The pieces of an application the resubmission contract touches
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationState {
    pub owner: Uuid,
    pub status: ApplicationStatus,
    pub resubmission_count: i32,
    pub products: Vec<ProductPayload>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ResubmitError {
    NotOwner,
    WrongStatus,
}

/// Apply a resubmission the way the application service does: authorization
/// first, status gate second, then the atomic update. On error the state is
/// returned unchanged.
pub fn apply_resubmission(
    state: &ApplicationState,
    caller: Uuid,
    form: &UpdateForm,
) -> Result<ApplicationState, ResubmitError> {
    if state.owner != caller {
        return Err(ResubmitError::NotOwner);
    }
    if !state.status.can_transition_to(ApplicationStatus::Resubmitted) {
        return Err(ResubmitError::WrongStatus);
    }

    let mut next = state.clone();
    next.status = ApplicationStatus::Resubmitted;
    next.resubmission_count += 1;
    if let Some(products) = &form.products {
        next.products = products.clone();
    }
    Ok(next)
}

fn product(name: &str) -> ProductPayload {
    ProductPayload {
        name_th: name.to_string(),
        name_en: None,
    }
}

fn rejected_application(owner: Uuid, products: usize) -> ApplicationState {
    ApplicationState {
        owner,
        status: ApplicationStatus::Rejected,
        resubmission_count: 0,
        products: (0..products)
            .map(|i| product(&format!("สินค้า {}", i)))
            .collect(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Scenario B: resubmitting with 2 products when 3 were stored leaves
    /// exactly 2, the status becomes resubmitted, and the counter is 1
    #[test]
    fn test_resubmission_replaces_products_wholesale() {
        let owner = Uuid::new_v4();
        let state = rejected_application(owner, 3);

        let form = UpdateForm {
            products: Some(vec![product("สินค้าใหม่ 1"), product("สินค้าใหม่ 2")]),
            ..UpdateForm::default()
        };

        let next = apply_resubmission(&state, owner, &form).unwrap();
        assert_eq!(next.status, ApplicationStatus::Resubmitted);
        assert_eq!(next.status.as_code(), 4);
        assert_eq!(next.resubmission_count, 1);
        assert_eq!(next.products.len(), 2);
    }

    /// An absent collection key leaves the stored rows untouched
    #[test]
    fn test_absent_collection_is_untouched() {
        let owner = Uuid::new_v4();
        let state = rejected_application(owner, 3);

        let next = apply_resubmission(&state, owner, &UpdateForm::default()).unwrap();
        assert_eq!(next.products.len(), 3);
        assert_eq!(next.products, state.products);
    }

    /// A non-owner caller is refused before anything changes
    #[test]
    fn test_non_owner_cannot_resubmit() {
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let state = rejected_application(owner, 2);

        let form = UpdateForm {
            products: Some(vec![]),
            ..UpdateForm::default()
        };
        assert_eq!(
            apply_resubmission(&state, intruder, &form),
            Err(ResubmitError::NotOwner)
        );
    }

    /// Pending and approved applications cannot be resubmitted
    #[test]
    fn test_status_gate() {
        let owner = Uuid::new_v4();
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Approved,
            ApplicationStatus::Resubmitted,
        ] {
            let mut state = rejected_application(owner, 1);
            state.status = status;
            assert_eq!(
                apply_resubmission(&state, owner, &UpdateForm::default()),
                Err(ResubmitError::WrongStatus),
                "status {:?}",
                status
            );
        }
    }

    /// An empty replacement list clears the collection entirely
    #[test]
    fn test_empty_replacement_clears_collection() {
        let owner = Uuid::new_v4();
        let state = rejected_application(owner, 5);

        let form = UpdateForm {
            products: Some(vec![]),
            ..UpdateForm::default()
        };
        let next = apply_resubmission(&state, owner, &form).unwrap();
        assert!(next.products.is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn status_strategy() -> impl Strategy<Value = ApplicationStatus> {
        prop_oneof![
            Just(ApplicationStatus::Pending),
            Just(ApplicationStatus::Approved),
            Just(ApplicationStatus::Rejected),
            Just(ApplicationStatus::Resubmitted),
        ]
    }

    fn products_strategy(max: usize) -> impl Strategy<Value = Vec<ProductPayload>> {
        proptest::collection::vec("[ก-ฮa-z ]{1,12}", 0..max)
            .prop_map(|names| names.iter().map(|n| product(n)).collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Counter monotonicity: every successful resubmission increases the
        /// counter by exactly one and lands in the resubmitted state
        #[test]
        fn prop_counter_strictly_increases(
            count in 0i32..1000,
            stored in products_strategy(5)
        ) {
            let owner = Uuid::new_v4();
            let state = ApplicationState {
                owner,
                status: ApplicationStatus::Rejected,
                resubmission_count: count,
                products: stored,
            };
            let next = apply_resubmission(&state, owner, &UpdateForm::default()).unwrap();
            prop_assert_eq!(next.resubmission_count, count + 1);
            prop_assert_eq!(next.status, ApplicationStatus::Resubmitted);
        }

        /// Full replace: with N stored rows and a payload of M rows, exactly
        /// M remain, never N + M
        #[test]
        fn prop_full_replace_row_count(
            stored in products_strategy(8),
            replacement in products_strategy(8)
        ) {
            let owner = Uuid::new_v4();
            let state = ApplicationState {
                owner,
                status: ApplicationStatus::Rejected,
                resubmission_count: 0,
                products: stored,
            };
            let form = UpdateForm {
                products: Some(replacement.clone()),
                ..UpdateForm::default()
            };
            let next = apply_resubmission(&state, owner, &form).unwrap();
            prop_assert_eq!(next.products.len(), replacement.len());
        }

        /// Ownership enforcement: a caller other than the owner never
        /// modifies anything, whatever the status
        #[test]
        fn prop_ownership_enforced(
            status in status_strategy(),
            stored in products_strategy(5)
        ) {
            let state = ApplicationState {
                owner: Uuid::new_v4(),
                status,
                resubmission_count: 0,
                products: stored,
            };
            let form = UpdateForm {
                products: Some(vec![]),
                ..UpdateForm::default()
            };
            let result = apply_resubmission(&state, Uuid::new_v4(), &form);
            prop_assert_eq!(result, Err(ResubmitError::NotOwner));
        }

        /// A failed resubmission is completely side-effect free
        #[test]
        fn prop_failure_leaves_state_unchanged(status in status_strategy()) {
            let owner = Uuid::new_v4();
            let mut state = rejected_application(owner, 3);
            state.status = status;
            let snapshot = state.clone();

            let form = UpdateForm {
                products: Some(vec![product("ใหม่")]),
                ..UpdateForm::default()
            };
            if apply_resubmission(&state, owner, &form).is_err() {
                prop_assert_eq!(state, snapshot);
            }
        }
    }
}
