//! Admin API tests against a real database.
//!
//! These tests require a `PostgreSQL` database named by
//! `LOYALTY_TEST_DATABASE_URL`. Migrations are applied on connect.
//!
//! Run with: cargo test -p loyalty-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use loyalty_admin::db::users::{NewUser, UserRepository};
use loyalty_core::UserRole;
use loyalty_integration_tests::{authed, authed_json, db_app, send};

fn unique_uid(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

async fn seed_user(pool: &sqlx::PgPool, uid: &str) {
    UserRepository::new(pool)
        .create(&NewUser {
            uid: uid.to_string(),
            email: Some(format!("{uid}@example.com")),
            display_name: None,
            role: UserRole::Customer,
        })
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "Requires LOYALTY_TEST_DATABASE_URL"]
async fn test_bulk_delete_reports_missing_uids() {
    let (app, pool) = db_app().await.expect("LOYALTY_TEST_DATABASE_URL not set");
    let present = unique_uid("present");
    let missing = unique_uid("missing");
    seed_user(&pool, &present).await;

    let (status, body) = send(
        app.clone(),
        authed_json("POST", "/api/users", &json!({ "uids": [present, missing] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["successCount"], 1);
    assert_eq!(body["failureCount"], 1);
    assert_eq!(body["errors"][0]["index"], 1);
    assert_eq!(body["errors"][0]["uid"], missing.as_str());

    let request = authed("GET", &format!("/api/users/{present}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires LOYALTY_TEST_DATABASE_URL"]
async fn test_update_user_claims_set_role() {
    let (app, pool) = db_app().await.expect("LOYALTY_TEST_DATABASE_URL not set");
    let uid = unique_uid("claims");
    seed_user(&pool, &uid).await;

    let (status, body) = send(
        app,
        authed_json(
            "PUT",
            &format!("/api/users/{uid}"),
            &json!({ "customClaims": { "role": "business" }, "disabled": true }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "business");
    assert_eq!(body["disabled"], true);
    assert_eq!(body["customClaims"]["role"], "business");
}

#[tokio::test]
#[ignore = "Requires LOYALTY_TEST_DATABASE_URL"]
async fn test_business_points_labels_round_trip() {
    let (app, _pool) = db_app().await.expect("LOYALTY_TEST_DATABASE_URL not set");

    let (status, created) = send(
        app.clone(),
        authed_json(
            "POST",
            "/api/admin/businesses",
            &json!({ "name": format!("Cafe {}", Uuid::new_v4().simple()) }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["pointsLabel"], "Points");
    let business_id = created["businessId"].as_str().unwrap().to_string();

    let (status, updated) = send(
        app.clone(),
        authed_json(
            "PUT",
            &format!("/api/admin/businesses/{business_id}"),
            &json!({ "pointsLabel": "  Beans  ", "pointsLabelShort": "B" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["pointsLabel"], "Beans");
    assert_eq!(updated["pointsLabelShort"], "B");

    let (status, kept) = send(
        app.clone(),
        authed_json(
            "PUT",
            &format!("/api/admin/businesses/{business_id}"),
            &json!({ "pointsLabel": "Coffee Beans" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(kept["pointsLabel"], "Coffee Beans");
    assert_eq!(kept["pointsLabelShort"], "B");

    let (status, cleared) = send(
        app,
        authed_json(
            "PUT",
            &format!("/api/admin/businesses/{business_id}"),
            &json!({ "pointsLabel": "Beans", "pointsLabelShort": null }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared["pointsLabelShort"].is_null());
}

async fn create_business(app: &Router) -> String {
    let (status, created) = send(
        app.clone(),
        authed_json(
            "POST",
            "/api/admin/businesses",
            &json!({ "name": format!("Shop {}", Uuid::new_v4().simple()) }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    created["businessId"].as_str().unwrap().to_string()
}

async fn unused_business_id(pool: &sqlx::PgPool) -> String {
    sqlx::query_scalar(
        "SELECT 'BIZ' || lpad(n::text, 4, '0')
         FROM generate_series(0, 9999) AS n
         WHERE NOT EXISTS (
             SELECT 1 FROM loyalty.business
             WHERE business_id = 'BIZ' || lpad(n::text, 4, '0')
         )
         LIMIT 1",
    )
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "Requires LOYALTY_TEST_DATABASE_URL"]
async fn test_create_class_allocates_code() {
    let (app, _pool) = db_app().await.expect("LOYALTY_TEST_DATABASE_URL not set");
    let business_id = create_business(&app).await;

    let (status, class) = send(
        app,
        authed_json(
            "POST",
            &format!("/api/admin/businesses/{business_id}/classes"),
            &json!({ "name": "  Gold  " }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(class["businessId"], business_id.as_str());
    assert_eq!(class["name"], "Gold");
    let class_id = class["classId"].as_str().unwrap();
    assert_eq!(class_id.len(), 11);
    assert!(class_id.starts_with("CLASS"));
    assert!(class_id[5..].bytes().all(|b| b.is_ascii_digit()));
}

#[tokio::test]
#[ignore = "Requires LOYALTY_TEST_DATABASE_URL"]
async fn test_create_class_unknown_business() {
    let (app, pool) = db_app().await.expect("LOYALTY_TEST_DATABASE_URL not set");
    let business_id = unused_business_id(&pool).await;

    let (status, body) = send(
        app,
        authed_json(
            "POST",
            &format!("/api/admin/businesses/{business_id}/classes"),
            &json!({ "name": "Gold" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&business_id));
}

#[tokio::test]
#[ignore = "Requires LOYALTY_TEST_DATABASE_URL"]
async fn test_enroll_customer_once() {
    let (app, pool) = db_app().await.expect("LOYALTY_TEST_DATABASE_URL not set");
    let uid = unique_uid("enroll");
    seed_user(&pool, &uid).await;

    let (status, customer) = send(
        app.clone(),
        authed_json("POST", "/api/admin/customers", &json!({ "uid": uid, "public": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(customer["uid"], uid.as_str());
    assert_eq!(customer["public"], true);
    assert!(customer["customerId"].as_str().unwrap().starts_with("BC"));

    let (status, _) = send(
        app.clone(),
        authed_json("POST", "/api/admin/customers", &json!({ "uid": uid })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        app,
        authed_json(
            "POST",
            "/api/admin/customers",
            &json!({ "uid": unique_uid("nobody") }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn token_request(method: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri("/api/fcm-token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
#[ignore = "Requires LOYALTY_TEST_DATABASE_URL"]
async fn test_fcm_token_reregistration() {
    let (app, pool) = db_app().await.expect("LOYALTY_TEST_DATABASE_URL not set");
    let owner = unique_uid("device-owner");
    let next_owner = unique_uid("device-owner");
    seed_user(&pool, &owner).await;
    seed_user(&pool, &next_owner).await;
    let token = unique_uid("token");

    let (status, first) = send(
        app.clone(),
        token_request("POST", &json!({ "token": token, "uid": owner })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["uid"], owner.as_str());

    let (status, second) = send(app.clone(), token_request("POST", &json!({ "token": token }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["uid"], owner.as_str());
    assert_eq!(second["createdAt"], first["createdAt"]);
    assert!(timestamp(&second["lastUsedAt"]) >= timestamp(&first["lastUsedAt"]));

    let (status, third) = send(
        app.clone(),
        token_request("POST", &json!({ "token": token, "uid": next_owner })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(third["uid"], next_owner.as_str());

    let (status, body) = send(app.clone(), token_request("DELETE", &json!({ "token": token }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(app, token_request("DELETE", &json!({ "token": token }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires LOYALTY_TEST_DATABASE_URL"]
async fn test_users_page_token_resumes_after_uid() {
    let (app, pool) = db_app().await.expect("LOYALTY_TEST_DATABASE_URL not set");
    let prefix = unique_uid("page");
    for suffix in ["a", "b", "c"] {
        seed_user(&pool, &format!("{prefix}-{suffix}")).await;
    }

    let request = authed("GET", &format!("/api/users?pageSize=2&pageToken={prefix}-"))
        .body(Body::empty())
        .unwrap();
    let (status, page) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["users"][0]["uid"], format!("{prefix}-a"));
    assert_eq!(page["users"][1]["uid"], format!("{prefix}-b"));
    assert_eq!(page["pageToken"], format!("{prefix}-b"));

    let token = page["pageToken"].as_str().unwrap();
    let request = authed("GET", &format!("/api/auth-users?pageSize=1&pageToken={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, page) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["users"].as_array().unwrap().len(), 1);
    assert_eq!(page["users"][0]["uid"], format!("{prefix}-c"));
}

#[tokio::test]
#[ignore = "Requires LOYALTY_TEST_DATABASE_URL"]
async fn test_users_last_page_has_no_token() {
    let (app, pool) = db_app().await.expect("LOYALTY_TEST_DATABASE_URL not set");
    seed_user(&pool, &unique_uid("tail")).await;
    seed_user(&pool, &unique_uid("tail")).await;

    let last_two: Vec<String> =
        sqlx::query_scalar("SELECT uid FROM loyalty.user_account ORDER BY uid DESC LIMIT 2")
            .fetch_all(&pool)
            .await
            .unwrap();

    let request = authed("GET", &format!("/api/users?pageSize=1&pageToken={}", last_two[1]))
        .body(Body::empty())
        .unwrap();
    let (status, page) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["users"][0]["uid"], last_two[0].as_str());
    assert!(page.get("pageToken").is_none());
}

#[tokio::test]
#[ignore = "Requires LOYALTY_TEST_DATABASE_URL"]
async fn test_unknown_user_is_not_found() {
    let (app, _pool) = db_app().await.expect("LOYALTY_TEST_DATABASE_URL not set");
    let uid = unique_uid("ghost");

    for method in ["GET", "DELETE"] {
        let request = authed(method, &format!("/api/users/{uid}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} /api/users/{uid}");
    }

    let request = authed("DELETE", &format!("/api/auth-users?uid={uid}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires LOYALTY_TEST_DATABASE_URL"]
async fn test_transactions_newest_first_across_customers() {
    let (app, pool) = db_app().await.expect("LOYALTY_TEST_DATABASE_URL not set");
    let kind = format!("test-{}", Uuid::new_v4().simple());

    for (uid, minutes) in [(unique_uid("a"), [1, 4]), (unique_uid("b"), [2, 3])] {
        seed_user(&pool, &uid).await;
        for minute in minutes {
            sqlx::query(
                "INSERT INTO loyalty.transaction (customer_uid, kind, points, created_at)
                 VALUES ($1, $2, $3, NOW() - make_interval(mins => $3))",
            )
            .bind(&uid)
            .bind(&kind)
            .bind(minute)
            .execute(&pool)
            .await
            .unwrap();
        }
    }

    let request = authed("GET", &format!("/api/admin/transactions?type={kind}&limit=3"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["returned"], 3);
    let points: Vec<i64> = body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["points"].as_i64().unwrap())
        .collect();
    assert_eq!(points, vec![1, 2, 3]);
}
