mod common;

use axum::http::StatusCode;
use book_service::infrastructure::cache::CacheKeys;
use serde_json::{Value, json};

async fn create(app: &common::TestApp, title: &str) -> i64 {
    let response = app
        .server
        .post("/v1/books")
        .json(&json!({
            "title": title,
            "author": "Frank Herbert",
            "description": "Desert planet",
            "published_date": "1965-08-01"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_get_delete_flow() {
    let app = common::test_app();

    let response = app
        .server
        .post("/v1/books")
        .json(&json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "description": "Desert planet",
            "published_date": "1965-08-01"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Value>();
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(created["title"], "Dune");
    assert!(created["deleted_at"].is_null());

    let response = app.server.get(&format!("/v1/books/{id}")).await;
    response.assert_status_ok();
    let fetched = response.json::<Value>();
    assert_eq!(fetched["id"], id);
    assert_eq!(fetched["author"], "Frank Herbert");
    assert_eq!(fetched["published_date"], "1965-08-01");

    app.server
        .delete(&format!("/v1/books/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = app.server.get(&format!("/v1/books/{id}")).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_get_is_served_from_cache_after_first_read() {
    let app = common::test_app();
    let id = create(&app, "Dune").await;

    app.server.get(&format!("/v1/books/{id}")).await.assert_status_ok();
    app.server.get(&format!("/v1/books/{id}")).await.assert_status_ok();

    assert_eq!(app.store.store_reads(), 1);
    assert!(app.cache.contains_key(&CacheKeys::default().by_id(id)));
}

#[tokio::test]
async fn test_list_paginates_with_defaults() {
    let app = common::test_app();
    let mut ids = Vec::new();
    for i in 0..25 {
        ids.push(create(&app, &format!("Book {i}")).await);
    }

    let response = app.server.get("/v1/books").await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["page"], 1);
    assert_eq!(json["size"], 10);
    assert_eq!(json["total_pages"], 3);
    assert_eq!(json["data"].as_array().unwrap().len(), 10);

    // Newest first.
    let newest = *ids.iter().max().unwrap();
    assert_eq!(json["data"][0]["id"], newest);

    let json = app
        .server
        .get("/v1/books")
        .add_query_param("page", 3)
        .add_query_param("size", 10)
        .await
        .json::<Value>();
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    assert_eq!(json["total_pages"], 3);
}

#[tokio::test]
async fn test_list_reflects_new_book_after_cached_read() {
    let app = common::test_app();
    create(&app, "First").await;

    let json = app.server.get("/v1/books").await.json::<Value>();
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    create(&app, "Second").await;

    let json = app.server.get("/v1/books").await.json::<Value>();
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"][0]["title"], "Second");
}

#[tokio::test]
async fn test_list_empty() {
    let app = common::test_app();

    let json = app.server.get("/v1/books").await.json::<Value>();

    assert_eq!(json["data"].as_array().unwrap().len(), 0);
    assert_eq!(json["total_pages"], 0);
}

#[tokio::test]
async fn test_list_with_maximum_size() {
    let app = common::test_app();
    create(&app, "First").await;
    create(&app, "Second").await;

    let response = app
        .server
        .get("/v1/books")
        .add_query_param("size", i64::MAX)
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["size"], i64::MAX);
    assert_eq!(json["total_pages"], 1);

    let json = app
        .server
        .get("/v1/books")
        .add_query_param("page", 2)
        .add_query_param("size", i64::MAX)
        .await
        .json::<Value>();
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
    assert_eq!(json["total_pages"], 1);
}

#[tokio::test]
async fn test_list_rejects_non_numeric_query() {
    let app = common::test_app();

    let response = app
        .server
        .get("/v1/books")
        .add_query_param("page", "abc")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_get_rejects_invalid_id() {
    let app = common::test_app();

    let response = app.server.get("/v1/books/not-a-number").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<Value>();
    assert_eq!(json["error"]["message"], "ID param is invalid");
}

#[tokio::test]
async fn test_get_missing_book() {
    let app = common::test_app();

    let response = app.server.get("/v1/books/12345").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["details"]["id"], 12345);
}

#[tokio::test]
async fn test_create_rejects_malformed_body() {
    let app = common::test_app();

    let response = app
        .server
        .post("/v1/books")
        .json(&json!({ "title": 42 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_changes_only_given_fields() {
    let app = common::test_app();
    let id = create(&app, "Dune").await;

    // Warm the cache so the update has something to invalidate.
    app.server.get(&format!("/v1/books/{id}")).await.assert_status_ok();

    let response = app
        .server
        .put("/v1/books")
        .json(&json!({ "id": id, "title": "Dune Messiah", "author": "" }))
        .await;

    response.assert_status_ok();
    let updated = response.json::<Value>();
    assert_eq!(updated["title"], "Dune Messiah");
    assert_eq!(updated["author"], "Frank Herbert");
    assert_eq!(updated["description"], "Desert planet");

    let fetched = app
        .server
        .get(&format!("/v1/books/{id}"))
        .await
        .json::<Value>();
    assert_eq!(fetched["title"], "Dune Messiah");
}

#[tokio::test]
async fn test_update_missing_book() {
    let app = common::test_app();

    let response = app
        .server
        .put("/v1/books")
        .json(&json!({ "id": 999, "title": "Nothing" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_requires_id() {
    let app = common::test_app();

    let response = app
        .server
        .put("/v1/books")
        .json(&json!({ "title": "No id" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_twice_returns_not_found() {
    let app = common::test_app();
    let id = create(&app, "Dune").await;

    app.server
        .delete(&format!("/v1/books/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .delete(&format!("/v1/books/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // The row is kept with a deletion timestamp.
    assert!(app.store.raw(id).unwrap().deleted_at.is_some());
}

#[tokio::test]
async fn test_cache_outage_is_reported_as_server_error() {
    let app = common::test_app();
    let id = create(&app, "Dune").await;

    app.cache.set_available(false);

    let response = app.server.get(&format!("/v1/books/{id}")).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "internal_error");
    assert_eq!(json["error"]["message"], "Cache error");
}
