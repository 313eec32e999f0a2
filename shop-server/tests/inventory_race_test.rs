//! Concurrency scenarios: racing placements over finite stock and racing
//! callback deliveries for the same order.

mod common;

use common::{available_units, seed_product, single_item, test_shop};
use shop_server::gateway::MockGateway;
use shop_server::orders::{self, ReconcileOutcome};
use shared::error::ErrorCode;
use shared::models::order::{LineItemInput, PlaceOrderRequest};

#[tokio::test]
async fn test_two_buyers_race_for_last_unit() {
    let shop = test_shop().await;
    let product = seed_product(&shop, "Widget", 10000, 1).await;

    let state_a = shop.state.clone();
    let state_b = shop.state.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { orders::place_order(&state_a, single_item(product, 1)).await }),
        tokio::spawn(async move { orders::place_order(&state_b, single_item(product, 1)).await }),
    );
    let results = [a.unwrap(), b.unwrap()];

    let ok = results.iter().filter(|r| r.is_ok()).count();
    let out_of_stock = results
        .iter()
        .filter(|r| {
            r.as_ref()
                .err()
                .is_some_and(|e| e.code == ErrorCode::ProductOutOfStock)
        })
        .count();

    assert_eq!(ok, 1, "exactly one buyer wins the last unit");
    assert_eq!(out_of_stock, 1, "the other loses with OUT_OF_STOCK");
    assert_eq!(available_units(&shop, product).await, 0);
}

#[tokio::test]
async fn test_n_buyers_m_units() {
    const UNITS: i64 = 3;
    const BUYERS: usize = 10;

    let shop = test_shop().await;
    let product = seed_product(&shop, "Widget", 10000, UNITS).await;

    let mut handles = Vec::new();
    for _ in 0..BUYERS {
        let state = shop.state.clone();
        handles.push(tokio::spawn(async move {
            orders::place_order(&state, single_item(product, 1)).await
        }));
    }

    let mut ok = 0;
    let mut out_of_stock = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) if e.code == ErrorCode::ProductOutOfStock => out_of_stock += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(ok, UNITS as usize);
    assert_eq!(out_of_stock, BUYERS - UNITS as usize);
    assert_eq!(available_units(&shop, product).await, 0);
}

#[tokio::test]
async fn test_stock_accounting_under_mixed_quantities() {
    const UNITS: i64 = 10;

    let shop = test_shop().await;
    let product = seed_product(&shop, "Widget", 10000, UNITS).await;

    let mut handles = Vec::new();
    for i in 0..12_i64 {
        let state = shop.state.clone();
        let quantity = i % 3 + 1;
        handles.push(tokio::spawn(async move {
            orders::place_order(&state, single_item(product, quantity)).await
        }));
    }

    let mut reserved = 0;
    for handle in handles {
        if let Ok(placed) = handle.await.unwrap() {
            reserved += placed.order.total_amount / 10000;
        }
    }

    let remaining = available_units(&shop, product).await;
    assert!(remaining >= 0, "stock must never go negative");
    assert_eq!(remaining, UNITS - reserved, "every reserved unit is accounted for");
}

#[tokio::test]
async fn test_multi_item_order_rolls_back_completely_on_partial_stock() {
    let shop = test_shop().await;
    let plenty = seed_product(&shop, "Widget", 10000, 5).await;
    let scarce = seed_product(&shop, "Gadget", 5000, 1).await;

    let request = PlaceOrderRequest {
        customer_ref: None,
        items: vec![
            LineItemInput {
                product_id: plenty,
                quantity: 2,
            },
            LineItemInput {
                product_id: scarce,
                quantity: 2,
            },
        ],
    };

    let err = orders::place_order(&shop.state, request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductOutOfStock);

    // The first line's reservation was rolled back with the transaction
    assert_eq!(available_units(&shop, plenty).await, 5);
    assert_eq!(available_units(&shop, scarce).await, 1);
}

#[tokio::test]
async fn test_concurrent_callbacks_confirm_once() {
    let shop = test_shop().await;
    let product = seed_product(&shop, "Widget", 10000, 2).await;

    let placed = orders::place_order(&shop.state, single_item(product, 1))
        .await
        .unwrap();
    let order_id = placed.order.id;
    let authority = MockGateway::authority_for(order_id);

    let state_a = shop.state.clone();
    let state_b = shop.state.clone();
    let authority_a = authority.clone();
    let authority_b = authority.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(
            async move { orders::handle_callback(&state_a, &authority_a, true, order_id).await }
        ),
        tokio::spawn(
            async move { orders::handle_callback(&state_b, &authority_b, true, order_id).await }
        ),
    );
    let outcomes = [a.unwrap().unwrap(), b.unwrap().unwrap()];

    let confirmed = outcomes
        .iter()
        .filter(|o| matches!(o, ReconcileOutcome::Confirmed(_)))
        .count();
    // The loser either hit the fast path or lost the transition guard
    let noop = outcomes
        .iter()
        .filter(|o| matches!(o, ReconcileOutcome::AlreadyReconciled { .. }))
        .count();

    assert_eq!(confirmed, 1, "at most one delivery may win the transition");
    assert_eq!(noop, 1);
    assert_eq!(shop.notifier.count_with_prefix("confirmed:"), 1);
}
