//! Application review workflow tests
//!
//! Covers the status state machine and the reject contract:
//! - Reject requires a non-empty reason and leaves the status unchanged
//!   when validation fails
//! - Only the documented transitions are legal
//! - Status codes decode to exactly {0, 1, 2, 4}

use proptest::prelude::*;
use shared::types::ApplicationStatus;
use shared::validation::validate_rejection_reason;

/// Apply a reject decision the way the review service does: the reason is
/// validated before the transition is attempted, so an invalid reason
/// leaves the current status untouched.
pub fn try_reject(
    current: ApplicationStatus,
    reason: &str,
) -> Result<ApplicationStatus, ApplicationStatus> {
    if validate_rejection_reason(reason).is_err() {
        return Err(current);
    }
    if !current.can_transition_to(ApplicationStatus::Rejected) {
        return Err(current);
    }
    Ok(ApplicationStatus::Rejected)
}

/// Apply an approve decision under the same contract
pub fn try_approve(current: ApplicationStatus) -> Result<ApplicationStatus, ApplicationStatus> {
    if !current.can_transition_to(ApplicationStatus::Approved) {
        return Err(current);
    }
    Ok(ApplicationStatus::Approved)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Scenario A: rejecting a pending application with a Thai reason
    #[test]
    fn test_reject_pending_with_thai_reason() {
        let result = try_reject(ApplicationStatus::Pending, "เอกสารไม่ครบ");
        assert_eq!(result, Ok(ApplicationStatus::Rejected));
        assert_eq!(ApplicationStatus::Rejected.as_code(), 2);
    }

    /// Scenario D: an empty reason fails and the status does not change
    #[test]
    fn test_reject_with_empty_reason_keeps_status() {
        for current in [
            ApplicationStatus::Pending,
            ApplicationStatus::Resubmitted,
            ApplicationStatus::Approved,
        ] {
            assert_eq!(try_reject(current, ""), Err(current));
        }
    }

    /// Whitespace-only reasons are as invalid as empty ones
    #[test]
    fn test_reject_with_whitespace_reason() {
        assert_eq!(
            try_reject(ApplicationStatus::Pending, "   \t\n"),
            Err(ApplicationStatus::Pending)
        );
    }

    /// Approving a rejected application is not a legal transition
    #[test]
    fn test_cannot_approve_rejected() {
        assert_eq!(
            try_approve(ApplicationStatus::Rejected),
            Err(ApplicationStatus::Rejected)
        );
    }

    /// Re-review after resubmission behaves like the initial review
    #[test]
    fn test_resubmitted_can_be_re_reviewed() {
        assert_eq!(
            try_approve(ApplicationStatus::Resubmitted),
            Ok(ApplicationStatus::Approved)
        );
        assert_eq!(
            try_reject(ApplicationStatus::Resubmitted, "ข้อมูลไม่ถูกต้อง"),
            Ok(ApplicationStatus::Rejected)
        );
    }

    /// Decisions are terminal on approved applications
    #[test]
    fn test_approved_is_terminal_for_review() {
        assert_eq!(
            try_approve(ApplicationStatus::Approved),
            Err(ApplicationStatus::Approved)
        );
        assert_eq!(
            try_reject(ApplicationStatus::Approved, "reason"),
            Err(ApplicationStatus::Approved)
        );
    }

    /// Status codes are 0/1/2/4 with 3 reserved
    #[test]
    fn test_status_code_mapping() {
        assert_eq!(ApplicationStatus::Pending.as_code(), 0);
        assert_eq!(ApplicationStatus::Approved.as_code(), 1);
        assert_eq!(ApplicationStatus::Rejected.as_code(), 2);
        assert_eq!(ApplicationStatus::Resubmitted.as_code(), 4);
        assert_eq!(ApplicationStatus::from_code(3), None);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating any application status
    fn status_strategy() -> impl Strategy<Value = ApplicationStatus> {
        prop_oneof![
            Just(ApplicationStatus::Pending),
            Just(ApplicationStatus::Approved),
            Just(ApplicationStatus::Rejected),
            Just(ApplicationStatus::Resubmitted),
        ]
    }

    /// Strategy for whitespace-only strings
    fn whitespace_strategy() -> impl Strategy<Value = String> {
        proptest::collection::vec(prop_oneof![Just(' '), Just('\t'), Just('\n')], 0..20)
            .prop_map(|chars| chars.into_iter().collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A whitespace-only reason never rejects, regardless of status
        #[test]
        fn prop_blank_reason_never_rejects(
            current in status_strategy(),
            reason in whitespace_strategy()
        ) {
            prop_assert_eq!(try_reject(current, &reason), Err(current));
        }

        /// A non-blank reason rejects exactly the reviewable statuses
        #[test]
        fn prop_reject_only_from_reviewable_statuses(current in status_strategy()) {
            let result = try_reject(current, "เอกสารไม่ครบ");
            let reviewable = matches!(
                current,
                ApplicationStatus::Pending | ApplicationStatus::Resubmitted
            );
            if reviewable {
                prop_assert_eq!(result, Ok(ApplicationStatus::Rejected));
            } else {
                prop_assert_eq!(result, Err(current));
            }
        }

        /// Approve succeeds from exactly the reviewable statuses
        #[test]
        fn prop_approve_only_from_reviewable_statuses(current in status_strategy()) {
            let result = try_approve(current);
            let reviewable = matches!(
                current,
                ApplicationStatus::Pending | ApplicationStatus::Resubmitted
            );
            prop_assert_eq!(result.is_ok(), reviewable);
        }

        /// Every decodable status code round-trips; everything else decodes
        /// to nothing
        #[test]
        fn prop_status_codes_closed(code in -10i16..10) {
            match ApplicationStatus::from_code(code) {
                Some(status) => prop_assert_eq!(status.as_code(), code),
                None => prop_assert!(!matches!(code, 0 | 1 | 2 | 4)),
            }
        }

        /// Only a rejected application can enter the resubmitted state
        #[test]
        fn prop_resubmission_gate(current in status_strategy()) {
            let allowed = current.can_transition_to(ApplicationStatus::Resubmitted);
            prop_assert_eq!(allowed, current == ApplicationStatus::Rejected);
        }
    }
}
