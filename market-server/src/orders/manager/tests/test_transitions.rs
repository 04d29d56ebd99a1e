use super::*;
use shared::{AppError, ErrorCode};

#[test]
fn test_happy_path_to_completed() {
    let env = create_test_env();
    let order = place_order(&env);

    let steps = [
        (OrderStatus::Confirmed, OrderStatus::Pending),
        (OrderStatus::Preparing, OrderStatus::Confirmed),
        (OrderStatus::Delivering, OrderStatus::Preparing),
        (OrderStatus::Completed, OrderStatus::Delivering),
    ];
    for (i, (next, previous)) in steps.into_iter().enumerate() {
        let change = env
            .manager
            .update_status("s1", &order.id, next, 100 + i as i64)
            .unwrap();
        assert_eq!(change.previous, previous);
        assert_eq!(change.order.status, next);
        assert_eq!(change.message, next.message());
    }

    let done = env.manager.get_order(&order.id).unwrap();
    assert_eq!(done.status, OrderStatus::Completed);
    assert_eq!(done.delivered_at, Some(103));
    assert_eq!(done.updated_at, 103);
    assert_eq!(env.catalog.get_product("p1").unwrap().sold, 1);
}

#[test]
fn test_cancel_does_not_count_sales() {
    let env = create_test_env();
    let order = place_order(&env);
    advance(&env, &order.id, OrderStatus::Preparing);

    let change = env
        .manager
        .update_status("s1", &order.id, OrderStatus::Cancelled, 50)
        .unwrap();
    assert_eq!(change.order.status, OrderStatus::Cancelled);
    assert!(change.order.delivered_at.is_none());
    assert_eq!(env.catalog.get_product("p1").unwrap().sold, 0);
}

#[test]
fn test_transition_table_enforced() {
    let env = create_test_env();

    for from in OrderStatus::ALL {
        for to in OrderStatus::ALL {
            let order = place_order(&env);
            advance(&env, &order.id, from);

            let result = env.manager.update_status("s1", &order.id, to, 99);
            if from.can_transition_to(to) {
                assert_eq!(result.unwrap().order.status, to, "{} -> {}", from, to);
            } else {
                match result {
                    Err(ManagerError::InvalidTransition { from: f, to: t }) => {
                        assert_eq!((f, t), (from, to));
                    }
                    other => panic!("{} -> {} should be rejected: {:?}", from, to, other),
                }
                assert_eq!(env.manager.get_order(&order.id).unwrap().status, from);
            }
        }
    }
}

#[test]
fn test_terminal_states_reject_everything() {
    let env = create_test_env();
    for terminal in [OrderStatus::Completed, OrderStatus::Cancelled] {
        let order = place_order(&env);
        advance(&env, &order.id, terminal);
        for to in OrderStatus::ALL {
            let err = env
                .manager
                .update_status("s1", &order.id, to, 200)
                .unwrap_err();
            assert_eq!(AppError::from(err).code, ErrorCode::InvalidStatusTransition);
        }
    }
}

#[test]
fn test_foreign_seller_sees_not_found() {
    let env = create_test_env();
    let order = place_order(&env);

    let foreign = env
        .manager
        .update_status("s2", &order.id, OrderStatus::Confirmed, 10)
        .unwrap_err();
    let missing = env
        .manager
        .update_status("s2", "no-such-order", OrderStatus::Confirmed, 10)
        .unwrap_err();

    assert!(matches!(foreign, ManagerError::OrderNotFound(_)));
    assert_eq!(
        AppError::from(foreign).code,
        AppError::from(missing).code
    );
    assert_eq!(env.manager.get_order(&order.id).unwrap().status, OrderStatus::Pending);
}

#[test]
fn test_concurrent_transitions_single_winner() {
    let env = create_test_env();
    let order = place_order(&env);

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let manager = env.manager.clone();
                let order_id = order.id.clone();
                let next = if i % 2 == 0 {
                    OrderStatus::Confirmed
                } else {
                    OrderStatus::Cancelled
                };
                scope.spawn(move || manager.update_status("s1", &order_id, next, 10 + i))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].previous, OrderStatus::Pending);

    for loser in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(loser, ManagerError::InvalidTransition { .. }), "{:?}", loser);
    }

    let stored = env.manager.get_order(&order.id).unwrap();
    assert_eq!(stored.status, winners[0].order.status);
}

#[tokio::test]
async fn test_status_update_reaches_customer() {
    let env = create_test_env();
    let order = place_order(&env);
    let mut stream = env.hub.subscribe(Audience::Customer, "c1").unwrap();

    env.manager
        .update_status("s1", &order.id, OrderStatus::Confirmed, 10)
        .unwrap();

    assert_eq!(
        stream.recv().await,
        Some(NotificationEvent::OrderStatusUpdate {
            order_id: order.id.clone(),
            status: OrderStatus::Confirmed,
            message: OrderStatus::Confirmed.message().to_string(),
        })
    );

    // push runs on a spawned task
    for _ in 0..20 {
        if !env.push.sent.lock().is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }
    let sent = env.push.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ExponentPushToken[c1]");
    assert_eq!(sent[0].title, PUSH_TITLE);
    assert_eq!(sent[0].data["orderId"], order.id.as_str());
    assert_eq!(sent[0].data["status"], "confirmed");
}

#[tokio::test]
async fn test_rejected_transition_sends_nothing() {
    let env = create_test_env();
    let order = place_order(&env);
    let mut stream = env.hub.subscribe(Audience::Customer, "c1").unwrap();

    env.manager
        .update_status("s1", &order.id, OrderStatus::Completed, 10)
        .unwrap_err();

    let waited = tokio::time::timeout(std::time::Duration::from_millis(50), stream.recv()).await;
    assert!(waited.is_err());
    assert!(env.push.sent.lock().is_empty());
}

#[test]
fn test_listing_newest_first() {
    let env = create_test_env();
    let mut ids = Vec::new();
    for now in 1..=5 {
        let order = env
            .manager
            .create_order("c1", order_request("s1", vec![line("p1", None, &[], 1)], 0.01), now)
            .unwrap();
        ids.push(order.id);
    }
    env.manager
        .update_status("s1", &ids[0], OrderStatus::Cancelled, 20)
        .unwrap();

    let page = env
        .manager
        .orders_of_customer("c1", None, Page::new(1, 2))
        .unwrap();
    assert_eq!(page.meta.total, 5);
    let got: Vec<_> = page.result.iter().map(|o| o.id.clone()).collect();
    assert_eq!(got, vec![ids[4].clone(), ids[3].clone()]);

    let cancelled = env
        .manager
        .orders_of_seller("s1", Some(OrderStatus::Cancelled), Page::default())
        .unwrap();
    assert_eq!(cancelled.meta.total, 1);
    assert_eq!(cancelled.result[0].id, ids[0]);

    assert_eq!(
        env.manager
            .orders_of_seller("s2", None, Page::default())
            .unwrap()
            .meta
            .total,
        0
    );
}

#[test]
fn test_deleted_order_is_hidden() {
    let env = create_test_env();
    let order = place_order(&env);

    env.manager.delete_order(&order.id, 30).unwrap();

    assert!(matches!(
        env.manager.get_order(&order.id),
        Err(ManagerError::OrderNotFound(_))
    ));
    assert!(matches!(
        env.manager.update_status("s1", &order.id, OrderStatus::Confirmed, 31),
        Err(ManagerError::OrderNotFound(_))
    ));
    assert_eq!(
        env.manager
            .orders_of_customer("c1", None, Page::default())
            .unwrap()
            .meta
            .total,
        0
    );
    assert!(env.manager.delete_order(&order.id, 32).is_err());
}
