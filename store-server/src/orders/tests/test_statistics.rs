use super::*;

#[tokio::test]
async fn test_statistics_over_seeded_population() {
    let (service, _pool, _dir) = test_service().await;

    // Two pending, one approved, one delivered, one complete, one cancelled
    let _p1 = seed_order(&service).await;
    let _p2 = seed_order(&service).await;

    let a = seed_order(&service).await.order.id;
    service.approve(a, None, admin()).await.unwrap();

    let d = seed_order(&service).await.order.id;
    service.approve(d, None, admin()).await.unwrap();
    service
        .mark_delivering(d, "TRK-D".to_string(), "LBC".to_string(), admin())
        .await
        .unwrap();
    service.mark_delivered(d, admin()).await.unwrap();

    let c = seed_order(&service).await.order.id;
    service.approve(c, None, admin()).await.unwrap();
    service
        .mark_delivering(c, "TRK-C".to_string(), "LBC".to_string(), admin())
        .await
        .unwrap();
    service.mark_delivered(c, admin()).await.unwrap();
    service.mark_complete(c, admin()).await.unwrap();

    let x = seed_order(&service).await.order.id;
    service
        .cancel(x, "changed mind".to_string(), customer())
        .await
        .unwrap();

    let stats = service.statistics().await.unwrap();
    let counts = stats.status_counts;

    assert_eq!(counts.pending, 2);
    assert_eq!(counts.approved, 1);
    assert_eq!(counts.delivering, 0);
    assert_eq!(counts.delivered, 1);
    assert_eq!(counts.complete, 1);
    assert_eq!(counts.cancelled, 1);
    assert_eq!(counts.total, 6);
    assert_eq!(
        counts.pending
            + counts.approved
            + counts.delivering
            + counts.delivered
            + counts.complete
            + counts.cancelled,
        counts.total
    );

    // Revenue recognizes delivered + complete only (3650 each),
    // regardless of payment_status
    assert_eq!(stats.total_revenue, 7300.0);

    // Everything was created just now, within the local day
    assert_eq!(stats.today_orders, 6);
}

#[tokio::test]
async fn test_statistics_empty_population() {
    let (service, _pool, _dir) = test_service().await;

    let stats = service.statistics().await.unwrap();
    assert_eq!(stats.status_counts.total, 0);
    assert_eq!(stats.total_revenue, 0.0);
    assert_eq!(stats.today_orders, 0);
}

#[tokio::test]
async fn test_pending_count() {
    let (service, _pool, _dir) = test_service().await;

    seed_order(&service).await;
    seed_order(&service).await;
    let a = seed_order(&service).await.order.id;
    service.approve(a, None, admin()).await.unwrap();

    assert_eq!(service.pending_count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_list_filters() {
    let (service, _pool, _dir) = test_service().await;

    seed_order(&service).await;
    let a = seed_order(&service).await.order.id;
    service.approve(a, None, admin()).await.unwrap();

    let pending = service
        .list_orders(shared::models::OrderFilter {
            status: Some(OrderStatus::Pending),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);

    let by_name = service
        .list_orders(shared::models::OrderFilter {
            search: Some("maria".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 2);

    let none = service
        .list_orders(shared::models::OrderFilter {
            search: Some("nobody".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(none.is_empty());
}
