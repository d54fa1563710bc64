//! API tests against a running server and database.
//!
//! Expects a server at `BASE_URL` bootstrapped with the `admin`/`admin`
//! superuser (CATALOG_BOOTSTRAP__ADMIN_USERNAME / _PASSWORD).

use chrono::{Duration, Local};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Decimal fields are serialized as strings
fn money(value: &Value) -> f64 {
    value.as_str().and_then(|s| s.parse().ok()).expect("Not a decimal string")
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

/// 13 digit ISBN unlikely to collide between runs
fn unique_isbn() -> String {
    let n = uuid::Uuid::new_v4().as_u128() % 10_000_000_000_000;
    format!("{:013}", n)
}

async fn post(client: &Client, token: &str, path: &str, body: Value) -> (u16, Value) {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status().as_u16();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get(client: &Client, token: &str, path: &str) -> (u16, Value) {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status().as_u16();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn create_member(client: &Client, token: &str) -> Value {
    let (status, member) = post(
        client,
        token,
        "/members",
        json!({ "user": { "username": unique("member"), "password": "secret" } }),
    )
    .await;
    assert_eq!(status, 201);
    member
}

/// Book with one available copy; returns (book id, instance id)
async fn create_book_with_copy(client: &Client, token: &str, title: &str) -> (i64, String) {
    let (status, book) = post(
        client,
        token,
        "/books",
        json!({ "title": title, "isbn": unique_isbn() }),
    )
    .await;
    assert_eq!(status, 201);
    let book_id = book["id"].as_i64().unwrap();

    let (status, instance) = post(
        client,
        token,
        "/instances",
        json!({ "book_id": book_id, "imprint": "Sample Imprint", "status": "available" }),
    )
    .await;
    assert_eq!(status, 201);

    (book_id, instance["id"].as_str().unwrap().to_string())
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_login_sets_session_cookie() {
    let client = Client::builder().cookie_store(true).build().unwrap();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(response.cookies().any(|c| c.name() == "catalog_session" && c.http_only()));

    // The cookie alone authenticates
    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "admin");
    assert!(body.get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_member_creation_starts_without_debt() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let member = create_member(&client, &token).await;
    assert_eq!(money(&member["outstanding_debt"]), 0.0);
    assert_eq!(member["can_borrow"], true);

    // Same username again is a field error
    let (status, body) = post(
        &client,
        &token,
        "/members",
        json!({ "user": { "username": member["user"]["username"], "password": "secret" } }),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(
        body["fields"]["username"][0],
        "A user with that username already exists."
    );
}

#[tokio::test]
#[ignore]
async fn test_issue_then_return_charges_nothing_on_time() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let member = create_member(&client, &token).await;
    let user_id = member["user"]["id"].as_i64().unwrap();
    let (_, instance_id) = create_book_with_copy(&client, &token, &unique("Sample Loan")).await;

    let (status, issued) = post(
        &client,
        &token,
        "/loans/issue",
        json!({ "user_id": user_id, "instance_id": instance_id }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(issued["status"], "on_loan");
    assert_eq!(issued["borrower_id"], user_id);
    let due = (Local::now().date_naive() + Duration::days(21)).to_string();
    assert_eq!(issued["due_back"], due.as_str());

    // Not available any more
    let (status, _) = post(
        &client,
        &token,
        "/loans/issue",
        json!({ "user_id": user_id, "instance_id": instance_id }),
    )
    .await;
    assert_eq!(status, 409);

    let (status, receipt) = post(&client, &token, "/loans/return", json!({ "instance_id": instance_id })).await;
    assert_eq!(status, 200);
    assert_eq!(money(&receipt["fee"]), 0.0);
    assert_eq!(receipt["instance"]["status"], "available");
    assert!(receipt["instance"]["borrower_id"].is_null());
    assert!(receipt["instance"]["due_back"].is_null());

    // Returning twice is rejected
    let (status, _) = post(&client, &token, "/loans/return", json!({ "instance_id": instance_id })).await;
    assert_eq!(status, 409);
}

#[tokio::test]
#[ignore]
async fn test_overdue_return_adds_fee_to_debt() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let member = create_member(&client, &token).await;
    let user_id = member["user"]["id"].as_i64().unwrap();
    let (book_id, _) = create_book_with_copy(&client, &token, &unique("Sample Overdue")).await;

    let five_days_ago = (Local::now().date_naive() - Duration::days(5)).to_string();
    let (status, instance) = post(
        &client,
        &token,
        "/instances",
        json!({
            "book_id": book_id,
            "imprint": "Sample Imprint",
            "status": "on_loan",
            "borrower_id": user_id,
            "due_back": five_days_ago,
        }),
    )
    .await;
    assert_eq!(status, 201);

    let (status, receipt) = post(
        &client,
        &token,
        "/loans/return",
        json!({ "instance_id": instance["id"] }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(money(&receipt["fee"]), 250.0);
    assert_eq!(money(&receipt["outstanding_debt"]), 250.0);
    assert_eq!(money(&receipt["instance"]["rent_fee"]), 250.0);
}

#[tokio::test]
#[ignore]
async fn test_renewal_window() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (_, instance_id) = create_book_with_copy(&client, &token, &unique("Sample Renewal")).await;
    let today = Local::now().date_naive();
    let path = format!("/instances/{}/renew", instance_id);

    let (status, proposal) = get(&client, &token, &path).await;
    assert_eq!(status, 200);
    assert_eq!(proposal["proposed_renewal_date"], (today + Duration::days(21)).to_string().as_str());

    for (offset, expected) in [(0, 200), (28, 200), (-1, 422), (29, 422)] {
        let date = (today + Duration::days(offset)).to_string();
        let (status, body) = post(&client, &token, &path, json!({ "renewal_date": date })).await;
        assert_eq!(status, expected, "offset {}", offset);
        if expected == 422 {
            assert!(body["fields"]["renewal_date"][0]
                .as_str()
                .unwrap()
                .starts_with("Invalid date - renewal"));
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_book_with_copies_cannot_be_deleted() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (book_id, instance_id) = create_book_with_copy(&client, &token, &unique("Sample Delete")).await;

    let delete = |path: String| {
        let client = client.clone();
        let token = token.clone();
        async move {
            client
                .delete(format!("{}{}", BASE_URL, path))
                .bearer_auth(token)
                .send()
                .await
                .expect("Failed to send request")
                .status()
                .as_u16()
        }
    };

    let (_, details) = get(&client, &token, &format!("/books/{}", book_id)).await;
    assert_eq!(details["display_genre"], "");
    assert_eq!(details["instances"].as_array().unwrap().len(), 1);

    assert_eq!(delete(format!("/books/{}", book_id)).await, 409);
    assert_eq!(delete(format!("/instances/{}", instance_id)).await, 204);
    assert_eq!(delete(format!("/books/{}", book_id)).await, 204);
}

#[tokio::test]
#[ignore]
async fn test_search_by_title_or_author() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let marker = uuid::Uuid::new_v4().simple().to_string();

    let (status, author) = post(
        &client,
        &token,
        "/authors",
        json!({ "first_name": format!("John{}", marker), "last_name": "Doe" }),
    )
    .await;
    assert_eq!(status, 201);

    let (status, _) = post(
        &client,
        &token,
        "/books",
        json!({ "title": "Untitled", "isbn": unique_isbn(), "author_id": author["id"] }),
    )
    .await;
    assert_eq!(status, 201);
    let (status, _) = post(
        &client,
        &token,
        "/books",
        json!({ "title": format!("Sample {}", marker), "isbn": unique_isbn() }),
    )
    .await;
    assert_eq!(status, 201);

    let (_, by_title) = get(&client, &token, &format!("/search?book_name=SAMPLE%20{}", marker)).await;
    assert_eq!(by_title.as_array().unwrap().len(), 1);

    let (_, by_author) = get(&client, &token, &format!("/search?author_name=john{}", marker)).await;
    assert_eq!(by_author.as_array().unwrap().len(), 1);
    assert_eq!(by_author[0]["title"], "Untitled");

    let (_, both) = get(
        &client,
        &token,
        &format!("/search?book_name=Sample%20{m}&author_name=John{m}", m = marker),
    )
    .await;
    assert_eq!(both.as_array().unwrap().len(), 2);
}

#[tokio::test]
#[ignore]
async fn test_malformed_body_is_a_bad_request() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let (status, body) = post(&client, &token, "/loans/return", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
#[ignore]
async fn test_access_changes_apply_to_live_sessions() {
    let client = Client::new();
    let admin = get_auth_token(&client).await;

    let member = create_member(&client, &admin).await;
    let user_id = member["user"]["id"].as_i64().unwrap();
    let member_id = member["id"].as_i64().unwrap();

    let set_access = |permissions: Value| {
        let client = client.clone();
        let admin = admin.clone();
        async move {
            client
                .put(format!("{}/users/{}/access", BASE_URL, user_id))
                .bearer_auth(admin)
                .json(&json!({ "is_superuser": false, "permissions": permissions }))
                .send()
                .await
                .expect("Failed to send request")
                .status()
                .as_u16()
        }
    };
    assert_eq!(set_access(json!(["can_mark_returned"])).await, 200);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": member["user"]["username"], "password": "secret" }))
        .send()
        .await
        .expect("Failed to send login request");
    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = get(&client, &token, "/loans").await;
    assert_eq!(status, 200);

    // Same token, access revoked
    assert_eq!(set_access(json!([])).await, 200);
    let (status, _) = get(&client, &token, "/loans").await;
    assert_eq!(status, 403);

    // Same token, account deleted
    let status = client
        .delete(format!("{}/members/{}", BASE_URL, member_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request")
        .status();
    assert_eq!(status, 204);
    let (status, _) = get(&client, &token, "/auth/me").await;
    assert_eq!(status, 401);
}
