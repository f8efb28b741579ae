//! Transition Policy
//!
//! The state machine as an explicit table: which targets are reachable
//! from each status, who may request them, and which side-fields each
//! target requires. Pure functions with no storage dependency.

use shared::models::{Actor, OrderStatus};

use super::error::OrderError;

/// Side-fields accompanying a transition request
#[derive(Debug, Clone, Default)]
pub struct TransitionFields {
    pub tracking_number: Option<String>,
    pub courier: Option<String>,
    pub admin_notes: Option<String>,
    pub cancellation_reason: Option<String>,
}

/// Targets an administrator may request from `current`.
///
/// Forward chain only, no skipping, no backward movement; cancellation
/// is available at any pre-delivered point.
pub fn admin_targets(current: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match current {
        Pending => &[Approved, Cancelled],
        Approved => &[Delivering, Cancelled],
        Delivering => &[Delivered, Cancelled],
        Delivered => &[Complete],
        Complete | Cancelled => &[],
    }
}

/// Validate a requested transition against the table.
///
/// Check order matters: terminal states reject everything (for either
/// actor) before role rules apply, and same-status requests are rejected
/// so a retried request cannot append a duplicate ledger row.
pub fn check(current: OrderStatus, target: OrderStatus, actor: Actor) -> Result<(), OrderError> {
    if current.is_terminal() {
        return Err(OrderError::InvalidTransition(format!(
            "cannot mark {target}: order is {current}"
        )));
    }

    if target == current {
        return Err(OrderError::InvalidTransition(format!(
            "order is already {current}"
        )));
    }

    match actor {
        Actor::Admin { .. } => {
            if admin_targets(current).contains(&target) {
                Ok(())
            } else {
                Err(OrderError::InvalidTransition(format!(
                    "cannot mark {target}: order is {current}"
                )))
            }
        }
        Actor::Customer { .. } => {
            if target != OrderStatus::Cancelled {
                return Err(OrderError::Forbidden(
                    "Customers may only cancel their orders".to_string(),
                ));
            }
            if current == OrderStatus::Pending {
                Ok(())
            } else {
                Err(OrderError::InvalidTransition(format!(
                    "Only pending orders can be cancelled. Current status: {current}"
                )))
            }
        }
    }
}

/// Enforce required side-fields for the requested target
pub fn validate_fields(target: OrderStatus, fields: &TransitionFields) -> Result<(), OrderError> {
    match target {
        OrderStatus::Delivering => {
            if is_blank(&fields.tracking_number) {
                return Err(OrderError::InvalidInput(
                    "tracking_number is required".to_string(),
                ));
            }
            if is_blank(&fields.courier) {
                return Err(OrderError::InvalidInput("courier is required".to_string()));
            }
            Ok(())
        }
        OrderStatus::Cancelled => {
            if is_blank(&fields.cancellation_reason) {
                return Err(OrderError::InvalidInput(
                    "cancellation_reason is required".to_string(),
                ));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().is_none_or(|s| s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    fn admin() -> Actor {
        Actor::Admin { id: 1 }
    }

    fn customer() -> Actor {
        Actor::Customer { id: 2 }
    }

    fn cancel_fields() -> TransitionFields {
        TransitionFields {
            cancellation_reason: Some("changed mind".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_admin_transition_closure() {
        // For every (current, target) pair, only the forward chain and
        // pre-delivered cancellation are allowed
        let allowed = [
            (Pending, Approved),
            (Pending, Cancelled),
            (Approved, Delivering),
            (Approved, Cancelled),
            (Delivering, Delivered),
            (Delivering, Cancelled),
            (Delivered, Complete),
        ];

        for current in OrderStatus::ALL {
            for target in OrderStatus::ALL {
                let result = check(current, target, admin());
                if allowed.contains(&(current, target)) {
                    assert!(result.is_ok(), "{current} -> {target} should be allowed");
                } else {
                    assert!(result.is_err(), "{current} -> {target} should be denied");
                }
            }
        }
    }

    #[test]
    fn test_customer_transition_closure() {
        for current in OrderStatus::ALL {
            for target in OrderStatus::ALL {
                let result = check(current, target, customer());
                if current == Pending && target == Cancelled {
                    assert!(result.is_ok());
                } else {
                    assert!(result.is_err(), "{current} -> {target} should be denied");
                }
            }
        }
    }

    #[test]
    fn test_no_skipping_forward() {
        assert!(matches!(
            check(Pending, Delivering, admin()),
            Err(OrderError::InvalidTransition(_))
        ));
        assert!(matches!(
            check(Pending, Delivered, admin()),
            Err(OrderError::InvalidTransition(_))
        ));
        assert!(matches!(
            check(Approved, Complete, admin()),
            Err(OrderError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_no_backward_movement() {
        assert!(check(Delivering, Approved, admin()).is_err());
        assert!(check(Delivered, Delivering, admin()).is_err());
        assert!(check(Approved, Pending, admin()).is_err());
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for terminal in [Complete, Cancelled] {
            for target in OrderStatus::ALL {
                for actor in [admin(), customer()] {
                    assert!(
                        matches!(
                            check(terminal, target, actor),
                            Err(OrderError::InvalidTransition(_))
                        ),
                        "{terminal} -> {target} must be InvalidTransition"
                    );
                }
            }
        }
    }

    #[test]
    fn test_same_status_rejected() {
        // Re-entering the current status is not a silent no-op
        for status in [Pending, Approved, Delivering, Delivered] {
            assert!(matches!(
                check(status, status, admin()),
                Err(OrderError::InvalidTransition(_))
            ));
        }
    }

    #[test]
    fn test_admin_cannot_cancel_after_delivered() {
        assert!(check(Delivered, Cancelled, admin()).is_err());
    }

    #[test]
    fn test_customer_non_cancel_target_is_forbidden() {
        assert!(matches!(
            check(Pending, Approved, customer()),
            Err(OrderError::Forbidden(_))
        ));
        assert!(matches!(
            check(Approved, Delivering, customer()),
            Err(OrderError::Forbidden(_))
        ));
    }

    #[test]
    fn test_customer_cancel_outside_pending_is_invalid_transition() {
        for current in [Approved, Delivering, Delivered] {
            assert!(matches!(
                check(current, Cancelled, customer()),
                Err(OrderError::InvalidTransition(_))
            ));
        }
    }

    #[test]
    fn test_delivering_requires_tracking_and_courier() {
        let mut fields = TransitionFields::default();
        assert!(matches!(
            validate_fields(Delivering, &fields),
            Err(OrderError::InvalidInput(_))
        ));

        fields.tracking_number = Some("1234".to_string());
        assert!(matches!(
            validate_fields(Delivering, &fields),
            Err(OrderError::InvalidInput(_))
        ));

        fields.courier = Some("  ".to_string());
        assert!(matches!(
            validate_fields(Delivering, &fields),
            Err(OrderError::InvalidInput(_))
        ));

        fields.courier = Some("LBC".to_string());
        assert!(validate_fields(Delivering, &fields).is_ok());
    }

    #[test]
    fn test_cancellation_requires_reason() {
        assert!(matches!(
            validate_fields(Cancelled, &TransitionFields::default()),
            Err(OrderError::InvalidInput(_))
        ));
        assert!(validate_fields(Cancelled, &cancel_fields()).is_ok());
    }

    #[test]
    fn test_approve_and_delivered_need_no_fields() {
        assert!(validate_fields(Approved, &TransitionFields::default()).is_ok());
        assert!(validate_fields(Delivered, &TransitionFields::default()).is_ok());
        assert!(validate_fields(Complete, &TransitionFields::default()).is_ok());
    }
}
