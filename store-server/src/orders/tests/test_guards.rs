use super::*;
use crate::db::repository::order::{
    self as order_repo, HistoryEntry, StatusMutation, TransitionOutcome,
};
use crate::orders::OrderError;

#[tokio::test]
async fn test_delivering_missing_fields_never_mutates() {
    let (service, _pool, _dir) = test_service().await;
    let order_id = seed_order(&service).await.order.id;
    service.approve(order_id, None, admin()).await.unwrap();

    let err = service
        .mark_delivering(order_id, "".to_string(), "LBC".to_string(), admin())
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidInput(_)));

    let err = service
        .mark_delivering(order_id, "TRK-1".to_string(), "   ".to_string(), admin())
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidInput(_)));

    let details = service.get_order(order_id).await.unwrap();
    assert_eq!(details.order.status, OrderStatus::Approved);
    assert!(details.order.tracking_number.is_none());
    assert!(details.order.courier.is_none());
    // creation + approve only
    assert_eq!(details.status_history.len(), 2);
}

#[tokio::test]
async fn test_duplicate_transition_rejected() {
    let (service, _pool, _dir) = test_service().await;
    let order_id = seed_order(&service).await.order.id;

    service.approve(order_id, None, admin()).await.unwrap();
    let err = service.approve(order_id, None, admin()).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition(_)));

    let details = service.get_order(order_id).await.unwrap();
    assert_eq!(details.status_history.len(), 2);
}

#[tokio::test]
async fn test_terminal_states_reject_all_transitions() {
    let (service, _pool, _dir) = test_service().await;

    // Completed order
    let order_id = seed_order(&service).await.order.id;
    service.approve(order_id, None, admin()).await.unwrap();
    service
        .mark_delivering(order_id, "TRK-9".to_string(), "JRS".to_string(), admin())
        .await
        .unwrap();
    service.mark_delivered(order_id, admin()).await.unwrap();
    service.mark_complete(order_id, admin()).await.unwrap();

    for result in [
        service.approve(order_id, None, admin()).await,
        service
            .mark_delivering(order_id, "T".to_string(), "C".to_string(), admin())
            .await,
        service.mark_delivered(order_id, admin()).await,
        service
            .cancel(order_id, "too late".to_string(), admin())
            .await,
    ] {
        assert!(matches!(
            result.unwrap_err(),
            OrderError::InvalidTransition(_)
        ));
    }

    let details = service.get_order(order_id).await.unwrap();
    assert_eq!(details.order.status, OrderStatus::Complete);
    assert_eq!(details.status_history.len(), 5);
}

/// The losing side of a race sees the fresh status, not a silent
/// overwrite: the guard matches zero rows and no ledger row is written
#[tokio::test]
async fn test_stale_guard_rejects_racing_writer() {
    let (service, pool, _dir) = test_service().await;
    let order_id = seed_order(&service).await.order.id;

    // First writer wins
    service.approve(order_id, None, admin()).await.unwrap();

    // Second writer still believes the order is pending
    let mutation = StatusMutation {
        status: OrderStatus::Cancelled,
        cancellation_reason: Some("late cancel".to_string()),
        ..Default::default()
    };
    let history = HistoryEntry {
        previous_status: Some(OrderStatus::Pending),
        new_status: OrderStatus::Cancelled,
        is_admin: false,
        actor_id: Some(CUSTOMER_ID),
        note: None,
    };

    let outcome =
        order_repo::apply_transition(&pool, order_id, OrderStatus::Pending, &mutation, &history)
            .await
            .unwrap();
    assert_eq!(
        outcome,
        TransitionOutcome::Stale {
            actual: OrderStatus::Approved
        }
    );

    // Neither the status nor the ledger moved for the loser
    let details = service.get_order(order_id).await.unwrap();
    assert_eq!(details.order.status, OrderStatus::Approved);
    assert!(details.order.cancellation_reason.is_none());
    assert_eq!(details.status_history.len(), 2);
}

/// Through the service, the racing customer gets the policy's verdict
/// against the fresh status
#[tokio::test]
async fn test_racing_cancel_surfaces_invalid_transition() {
    let (service, _pool, _dir) = test_service().await;
    let order_id = seed_order(&service).await.order.id;

    service.approve(order_id, None, admin()).await.unwrap();

    // The customer's cancel was based on a stale pending view; by load
    // time the order is approved, so the policy rejects it up front
    let err = service
        .cancel(order_id, "changed mind".to_string(), customer())
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_stale_guard_on_vanished_row() {
    let (_service, pool, _dir) = test_service().await;

    let mutation = StatusMutation {
        status: OrderStatus::Approved,
        ..Default::default()
    };
    let history = HistoryEntry {
        previous_status: Some(OrderStatus::Pending),
        new_status: OrderStatus::Approved,
        is_admin: true,
        actor_id: Some(ADMIN_ID),
        note: None,
    };

    let outcome =
        order_repo::apply_transition(&pool, 42, OrderStatus::Pending, &mutation, &history)
            .await
            .unwrap();
    assert_eq!(outcome, TransitionOutcome::Missing);
}

#[tokio::test]
async fn test_timestamps_set_once() {
    let (service, _pool, _dir) = test_service().await;
    let order_id = seed_order(&service).await.order.id;

    let approved = service.approve(order_id, None, admin()).await.unwrap();
    let approved_at = approved.order.approved_at.unwrap();

    service
        .mark_delivering(order_id, "TRK".to_string(), "LBC".to_string(), admin())
        .await
        .unwrap();
    let details = service.get_order(order_id).await.unwrap();

    // The earlier stamp survives later transitions untouched
    assert_eq!(details.order.approved_at, Some(approved_at));
    assert!(details.order.shipped_at.is_some());
    assert!(details.order.delivered_at.is_none());
}
