//! HTTP surface tests: the storefront API and the gateway callback
//! endpoint, driven through a real listener.

mod common;

use common::{test_shop, TestShop};
use shop_server::core::Server;

async fn spawn_server(shop: &TestShop) -> String {
    let app = Server::router(shop.state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn create_product(
    client: &reqwest::Client,
    base: &str,
    name: &str,
    price: &str,
    units: i64,
) -> serde_json::Value {
    let resp = client
        .post(format!("{base}/api/products"))
        .json(&serde_json::json!({
            "name": name,
            "description": "test product",
            "price": price,
            "available_units": units,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_place_verify_and_replay_over_http() {
    let shop = test_shop().await;
    let base = spawn_server(&shop).await;
    let client = reqwest::Client::new();

    let product = create_product(&client, &base, "Widget", "100.00", 3).await;
    let product_id = product["id"].as_i64().unwrap();
    assert_eq!(product["price"].as_i64(), Some(10000));

    // Place an order for 2 units
    let resp = client
        .post(format!("{base}/api/orders"))
        .json(&serde_json::json!({
            "customer_ref": "chat-100",
            "items": [{ "product_id": product_id, "quantity": 2 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let placed: serde_json::Value = resp.json().await.unwrap();
    let order_id = placed["order_id"].as_i64().unwrap();
    assert_eq!(placed["total_amount"].as_i64(), Some(20000));
    assert!(placed["payment_url"].as_str().unwrap().contains("StartPay"));

    // Gateway callback (the gateway capitalizes its query keys)
    let verify_url = format!(
        "{base}/verify?Authority=A{order_id}&Status=OK&order_id={order_id}"
    );
    let resp = client.get(&verify_url).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("confirmed"), "unexpected body: {body}");

    // A replayed delivery still answers 200 so the gateway stops retrying
    let resp = client.get(&verify_url).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("already been processed"), "unexpected body: {body}");

    // Order is confirmed with its items, stock is down to 1
    let detail: serde_json::Value = client
        .get(format!("{base}/api/orders/{order_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["status"].as_str(), Some("CONFIRMED"));
    assert_eq!(detail["payment_status"].as_str(), Some("PAID"));
    assert_eq!(detail["items"][0]["quantity"].as_i64(), Some(2));

    let product: serde_json::Value = client
        .get(format!("{base}/api/products/{product_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(product["available_units"].as_i64(), Some(1));
}

#[tokio::test]
async fn test_out_of_stock_reason_over_http() {
    let shop = test_shop().await;
    let base = spawn_server(&shop).await;
    let client = reqwest::Client::new();

    let product = create_product(&client, &base, "Widget", "10.00", 3).await;
    let product_id = product["id"].as_i64().unwrap();

    let resp = client
        .post(format!("{base}/api/orders"))
        .json(&serde_json::json!({
            "items": [{ "product_id": product_id, "quantity": 5 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["reason"].as_str(), Some("OUT_OF_STOCK"));
    assert_eq!(body["code"].as_u64(), Some(6003));
}

#[tokio::test]
async fn test_cancel_over_http() {
    let shop = test_shop().await;
    let base = spawn_server(&shop).await;
    let client = reqwest::Client::new();

    let product = create_product(&client, &base, "Widget", "10.00", 2).await;
    let product_id = product["id"].as_i64().unwrap();

    let placed: serde_json::Value = client
        .post(format!("{base}/api/orders"))
        .json(&serde_json::json!({
            "customer_ref": "chat-100",
            "items": [{ "product_id": product_id, "quantity": 2 }],
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let order_id = placed["order_id"].as_i64().unwrap();

    let resp = client
        .post(format!("{base}/api/orders/{order_id}/cancel"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let order: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(order["status"].as_str(), Some("CANCELLED"));

    // Cancelling again reports the terminal state
    let resp = client
        .post(format!("{base}/api/orders/{order_id}/cancel"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["reason"].as_str(), Some("ALREADY_CANCELLED"));

    // The customer's order listing still shows the cancelled order
    let orders: serde_json::Value = client
        .get(format!("{base}/api/orders?customer_ref=chat-100"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_product_crud_over_http() {
    let shop = test_shop().await;
    let base = spawn_server(&shop).await;
    let client = reqwest::Client::new();

    // Price strings with more than two decimals are rejected, not rounded
    let resp = client
        .post(format!("{base}/api/products"))
        .json(&serde_json::json!({
            "name": "Widget",
            "price": "12.345",
            "available_units": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["reason"].as_str(), Some("INVALID_PRICE"));

    let product = create_product(&client, &base, "Widget", "12.50", 4).await;
    let product_id = product["id"].as_i64().unwrap();

    // Update the price
    let resp = client
        .put(format!("{base}/api/products/{product_id}"))
        .json(&serde_json::json!({ "price": "15.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(updated["price"].as_i64(), Some(1500));
    assert_eq!(updated["available_units"].as_i64(), Some(4));

    // Storefront listing only shows stocked products
    let listing: serde_json::Value = client
        .get(format!("{base}/api/products/available"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing.as_array().unwrap().len(), 1);

    // Delete, then 404
    let resp = client
        .delete(format!("{base}/api/products/{product_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let resp = client
        .get(format!("{base}/api/products/{product_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_health_probe() {
    let shop = test_shop().await;
    let base = spawn_server(&shop).await;

    let body: serde_json::Value = reqwest::Client::new()
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"].as_str(), Some("healthy"));
    assert_eq!(body["database"].as_str(), Some("ok"));
}
