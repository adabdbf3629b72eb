//! HTTP-level tests for the node routes.

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use pow_ledger::Node;
use pow_ledger::api;
use pow_ledger::config::Config;

fn node() -> web::Data<Node> {
    let config = Config::from_lookup(|key| match key {
        "DIFFICULTY" => Some("2".into()),
        "NODE_ID" => Some("node-X".into()),
        _ => None,
    })
    .expect("valid test config");
    web::Data::new(Node::new(&config))
}

#[actix_web::test]
async fn submit_then_mine_over_http() {
    let node = node();
    let app =
        test::init_service(App::new().app_data(node.clone()).configure(api::init_routes)).await;

    let req = test::TestRequest::post()
        .uri("/transactions/new")
        .set_json(json!({"sender": "A", "recipient": "B", "amount": 10}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["index"], 2);
    assert_eq!(body["message"], "Transaction will be added to Block 2");

    let req = test::TestRequest::get().uri("/mempool").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["size"], 1);

    let req = test::TestRequest::get().uri("/mine").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "New Block Forged");
    assert_eq!(body["index"], 2);
    let txs = body["transactions"].as_array().unwrap();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0], json!({"sender": "A", "recipient": "B", "amount": 10}));
    assert_eq!(txs[1], json!({"sender": "0", "recipient": "node-X", "amount": 1}));

    let req = test::TestRequest::get().uri("/chain").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["length"], 2);
    assert_eq!(body["chain"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get().uri("/validate").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["difficulty"], 2);

    let req = test::TestRequest::get().uri("/mempool").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["size"], 0);
}

#[actix_web::test]
async fn transaction_with_missing_fields_is_rejected() {
    let app = test::init_service(App::new().app_data(node()).configure(api::init_routes)).await;

    let req = test::TestRequest::post()
        .uri("/transactions/new")
        .set_json(json!({"sender": "A", "amount": 10}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn register_nodes_dedups_and_validates() {
    let app = test::init_service(App::new().app_data(node()).configure(api::init_routes)).await;

    let req = test::TestRequest::post()
        .uri("/nodes/register")
        .set_json(json!({"nodes": ["http://10.0.0.2:5000", "https://10.0.0.2:5000", "10.0.0.1:5000"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_nodes"], json!(["10.0.0.1:5000", "10.0.0.2:5000"]));

    let req = test::TestRequest::post()
        .uri("/nodes/register")
        .set_json(json!({"nodes": []}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::post()
        .uri("/nodes/register")
        .set_json(json!({"nodes": ["10.0.0.9:5000", "http://"]}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    // The rejected batch added nothing.
    let req = test::TestRequest::post()
        .uri("/nodes/register")
        .set_json(json!({"nodes": ["10.0.0.1:5000"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_nodes"], json!(["10.0.0.1:5000", "10.0.0.2:5000"]));
}

#[actix_web::test]
async fn resolve_without_peers_keeps_chain() {
    let app = test::init_service(App::new().app_data(node()).configure(api::init_routes)).await;

    let req = test::TestRequest::get().uri("/nodes/resolve").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["replaced"], false);
    assert_eq!(body["message"], "Our chain is authoritative");
    assert_eq!(body["chain"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn health() {
    let app = test::init_service(App::new().configure(api::init_routes)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
