//! End-to-end tests driving the router directly, with an in-memory
//! database and a sandboxed (or deliberately unreachable) quote provider.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use stockfolio_backend::alphavantage::QuoteClient;
use stockfolio_backend::{app, AppState, Config, DatabasePool};

fn test_config() -> Config {
    Config {
        database_path: ":memory:".into(),
        jwt_secret: "test-secret".into(),
        access_ttl_minutes: 30,
        refresh_ttl_days: 7,
        alpha_vantage_api_key: String::new(),
        quote_base_url: "http://unused".into(),
        quote_sandbox: true,
        bind_addr: "127.0.0.1:0".into(),
        frontend_url: "http://localhost:5173".into(),
    }
}

/// App with deterministic canned quotes.
fn sandbox_app() -> Router {
    let config = test_config();
    app(AppState {
        pool: DatabasePool::in_memory().unwrap(),
        quotes: QuoteClient::new("http://unused".into(), String::new(), true),
        config,
    })
}

/// App whose quote provider is unreachable, so every fetch falls back.
fn offline_app() -> Router {
    let config = test_config();
    app(AppState {
        pool: DatabasePool::in_memory().unwrap(),
        quotes: QuoteClient::new("http://127.0.0.1:1".into(), "key".into(), false),
        config,
    })
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Register a user and return their (access, refresh) pair.
async fn register_and_login(app: &Router, username: &str) -> (String, String) {
    let creds = json!({ "username": username, "password": "hunter22" });
    let (status, _) = send(app, "POST", "/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, "POST", "/token", None, Some(creds)).await;
    assert_eq!(status, StatusCode::OK);
    (
        body["access"].as_str().unwrap().to_string(),
        body["refresh"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = sandbox_app();
    let creds = json!({ "username": "alice", "password": "hunter22" });

    let (status, body) = send(&app, "POST", "/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");

    let (status, body) = send(&app, "POST", "/register", None, Some(creds)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");

    // the first account still works
    let login = json!({ "username": "alice", "password": "hunter22" });
    let (status, _) = send(&app, "POST", "/token", None, Some(login)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let app = sandbox_app();
    register_and_login(&app, "alice").await;

    let wrong = json!({ "username": "alice", "password": "wrong" });
    let (status, _) = send(&app, "POST", "/token", None, Some(wrong)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let unknown = json!({ "username": "nobody", "password": "hunter22" });
    let (status, _) = send(&app, "POST", "/token", None, Some(unknown)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = sandbox_app();

    let (status, _) = send(&app, "GET", "/stocks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/portfolio/value", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() {
    let app = sandbox_app();
    let (_, refresh) = register_and_login(&app, "alice").await;

    let (status, _) = send(&app, "GET", "/stocks", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stock_crud_round_trip() {
    let app = sandbox_app();
    let (access, _) = register_and_login(&app, "alice").await;

    let new = json!({ "name": "Apple", "ticker": "AAPL", "quantity": 3, "buy_price": 150.00 });
    let (status, created) = send(&app, "POST", "/stocks", Some(&access), Some(new)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Apple");
    assert_eq!(created["ticker"], "AAPL");
    assert_eq!(created["quantity"], 3);
    assert_eq!(created["buy_price"], 150.0);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert!(!created["created_at"].as_str().unwrap().is_empty());
    assert!(!created["updated_at"].as_str().unwrap().is_empty());

    let (status, fetched) = send(&app, "GET", &format!("/stocks/{id}"), Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Apple");
    assert_eq!(fetched["ticker"], "AAPL");
    assert_eq!(fetched["quantity"], 3);
    assert_eq!(fetched["buy_price"], 150.0);

    let patch = json!({ "quantity": 5 });
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/stocks/{id}"),
        Some(&access),
        Some(patch),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 5);
    assert_eq!(updated["name"], "Apple");

    let (status, _) = send(&app, "DELETE", &format!("/stocks/{id}"), Some(&access), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/stocks/{id}"), Some(&access), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Stock not found");
}

#[tokio::test]
async fn holdings_are_isolated_between_users() {
    let app = sandbox_app();
    let (alice, _) = register_and_login(&app, "alice").await;
    let (bob, _) = register_and_login(&app, "bob").await;

    let new = json!({ "name": "Apple", "ticker": "AAPL", "quantity": 1, "buy_price": 150.00 });
    let (_, created) = send(&app, "POST", "/stocks", Some(&alice), Some(new)).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, list) = send(&app, "GET", "/stocks", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 0);

    let (status, _) = send(&app, "GET", &format!("/stocks/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let patch = json!({ "quantity": 99 });
    let (status, _) = send(&app, "PUT", &format!("/stocks/{id}"), Some(&bob), Some(patch)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/stocks/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Alice's holding survives all of Bob's attempts
    let (status, fetched) = send(&app, "GET", &format!("/stocks/{id}"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["quantity"], 1);
}

#[tokio::test]
async fn invalid_stock_bodies_are_bad_requests() {
    let app = sandbox_app();
    let (access, _) = register_and_login(&app, "alice").await;

    let missing_price = json!({ "name": "Apple", "ticker": "AAPL", "quantity": 1 });
    let (status, _) = send(&app, "POST", "/stocks", Some(&access), Some(missing_price)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let negative = json!({ "name": "Apple", "ticker": "AAPL", "quantity": -2, "buy_price": 10.0 });
    let (status, _) = send(&app, "POST", "/stocks", Some(&access), Some(negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let blank = json!({ "name": "  ", "ticker": "AAPL", "buy_price": 10.0 });
    let (status, _) = send(&app, "POST", "/stocks", Some(&access), Some(blank)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_portfolio_values_to_zero() {
    let app = sandbox_app();
    let (access, _) = register_and_login(&app, "alice").await;

    let (status, body) = send(&app, "GET", "/portfolio/value", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_value"], 0.0);
    assert_eq!(body["stocks"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn portfolio_value_uses_live_quotes() {
    let app = sandbox_app();
    let (access, _) = register_and_login(&app, "alice").await;

    let new = json!({ "name": "Apple", "ticker": "AAPL", "quantity": 3, "buy_price": 150.00 });
    send(&app, "POST", "/stocks", Some(&access), Some(new)).await;

    let (status, body) = send(&app, "GET", "/portfolio/value", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    // sandbox quote price is 136.24
    assert_eq!(body["stocks"][0]["current_price"], 136.24);
    assert_eq!(body["stocks"][0]["value"], 408.72);
    assert_eq!(body["total_value"], 408.72);
}

#[tokio::test]
async fn portfolio_degrades_to_buy_price_when_quotes_fail() {
    let app = offline_app();
    let (access, _) = register_and_login(&app, "alice").await;

    let new = json!({ "name": "Apple", "ticker": "AAPL", "quantity": 3, "buy_price": 150.00 });
    send(&app, "POST", "/stocks", Some(&access), Some(new)).await;

    let (status, body) = send(&app, "GET", "/portfolio/value", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stocks"][0]["current_price"], 150.0);
    assert_eq!(body["stocks"][0]["value"], 450.0);
    assert_eq!(body["total_value"], 450.0);

    let (status, body) = send(&app, "GET", "/portfolio/metrics", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    let line = &body["stocks"][0];
    assert_eq!(line["current_price"], 150.0);
    assert_eq!(line["previous_close"], 150.0);
    assert_eq!(line["change"], "0.00");
    assert_eq!(line["change_percent"], "0.00%");
}

#[tokio::test]
async fn portfolio_metrics_report_live_quotes() {
    let app = sandbox_app();
    let (access, _) = register_and_login(&app, "alice").await;

    let new = json!({ "name": "Nvidia", "ticker": "NVDA", "quantity": 1, "buy_price": 100.00 });
    send(&app, "POST", "/stocks", Some(&access), Some(new)).await;

    let (status, body) = send(&app, "GET", "/portfolio/metrics", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    let line = &body["stocks"][0];
    assert_eq!(line["ticker"], "NVDA");
    assert_eq!(line["current_price"], 136.24);
    assert_eq!(line["previous_close"], 131.76);
    assert_eq!(line["change"], "4.4800");
    assert_eq!(line["change_percent"], "3.4001%");
}

#[tokio::test]
async fn random_stocks_returns_one_sample() {
    let app = sandbox_app();
    let (access, _) = register_and_login(&app, "alice").await;

    let (status, body) = send(&app, "GET", "/stocks/random", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    let samples = body.as_array().unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0]["current_price"], 136.24);
    assert!(!samples[0]["ticker"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn random_stocks_skips_failed_quotes() {
    let app = offline_app();
    let (access, _) = register_and_login(&app, "alice").await;

    let (status, body) = send(&app, "GET", "/stocks/random", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn logout_blacklists_the_refresh_token() {
    let app = sandbox_app();
    let (access, refresh) = register_and_login(&app, "alice").await;

    let body = json!({ "refresh_token": refresh });
    let (status, resp) = send(&app, "POST", "/logout", Some(&access), Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["message"], "Logout successful");

    // a second logout with the same token is a generic failure
    let (status, resp) = send(&app, "POST", "/logout", Some(&access), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "Invalid token or logout failed");

    // the blacklisted token can no longer mint access tokens
    let (status, _) = send(
        &app,
        "POST",
        "/token/refresh",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_with_malformed_token_fails_gracefully() {
    let app = sandbox_app();
    let (access, _) = register_and_login(&app, "alice").await;

    let garbage = json!({ "refresh_token": "not-a-jwt" });
    let (status, resp) = send(&app, "POST", "/logout", Some(&access), Some(garbage)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "Invalid token or logout failed");

    // an access token is not a refresh token
    let wrong_type = json!({ "refresh_token": access });
    let (status, _) = send(&app, "POST", "/logout", Some(&access), Some(wrong_type)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = json!({});
    let (status, _) = send(&app, "POST", "/logout", Some(&access), Some(missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_issues_a_working_access_token() {
    let app = sandbox_app();
    let (_, refresh) = register_and_login(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/token/refresh",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["access"].as_str().unwrap();

    let (status, _) = send(&app, "GET", "/stocks", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);
}
