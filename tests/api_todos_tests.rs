// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Todo API tests over the in-memory backend.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::json;

mod common;

#[tokio::test]
async fn test_ownership_scenario() {
    let app = common::create_test_app().await;
    let alice_id = app.register_user("alice").await;
    app.register_user("bob").await;

    let (status, todo) = app
        .send_json(
            Method::POST,
            "/api/todos",
            json!({"title": "Buy milk", "author": "alice"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(todo["title"], "Buy milk");
    assert_eq!(todo["author"], "alice");
    assert_eq!(todo["authorId"], alice_id);
    assert_eq!(todo["completed"], false);
    assert_eq!(todo["description"], serde_json::Value::Null);
    assert_eq!(todo["imageUrl"], serde_json::Value::Null);
    assert_eq!(todo["_id"], todo["id"]);
    let id = todo["id"].as_u64().unwrap();
    let uri = format!("/api/todos/{}", id);

    // Bob may not touch Alice's todo
    let (status, body) = app
        .send_json(Method::PUT, &uri, json!({"completed": true, "author": "bob"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized");

    let (status, _) = app
        .send_json(Method::DELETE, &uri, json!({"author": "bob"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send_json(Method::PUT, &uri, json!({"completed": true, "author": "alice"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], true);
    assert_eq!(body["title"], "Buy milk");
    assert_eq!(body["createdAt"], todo["createdAt"]);

    let (status, body) = app
        .send_json(Method::DELETE, &uri, json!({"author": "alice"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted");

    let (status, list) = app.get("/api/todos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = common::create_test_app().await;
    app.register_user("alice").await;

    for title in ["first", "second", "third"] {
        app.create_todo("alice", title).await;
    }

    let (_, list) = app.get("/api/todos").await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_create_validation() {
    let app = common::create_test_app().await;
    app.register_user("alice").await;

    for body in [
        json!({"author": "alice"}),
        json!({"title": "   ", "author": "alice"}),
        json!({"title": "No author"}),
    ] {
        let (status, response) = app.send_json(Method::POST, "/api/todos", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], "Title and author required");
    }

    let (status, response) = app
        .send_json(
            Method::POST,
            "/api/todos",
            json!({"title": "Ghost", "author": "ghost"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "User not found");

    let (_, list) = app.get("/api/todos").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_create_stores_optional_fields() {
    let app = common::create_test_app().await;
    app.register_user("alice").await;

    let (status, todo) = app
        .send_json(
            Method::POST,
            "/api/todos",
            json!({
                "title": "Frame photo",
                "description": "the one from the beach",
                "author": "alice",
                "imageUrl": "/uploads/1704103200000-42.png"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(todo["description"], "the one from the beach");
    assert_eq!(todo["imageUrl"], "/uploads/1704103200000-42.png");

    // Empty strings are the same as absent
    let (_, todo) = app
        .send_json(
            Method::POST,
            "/api/todos",
            json!({"title": "Plain", "description": "", "imageUrl": "", "author": "alice"}),
        )
        .await;
    assert_eq!(todo["description"], serde_json::Value::Null);
    assert_eq!(todo["imageUrl"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_partial_update_semantics() {
    let app = common::create_test_app().await;
    app.register_user("alice").await;

    let (_, todo) = app
        .send_json(
            Method::POST,
            "/api/todos",
            json!({"title": "Original", "description": "details", "author": "alice"}),
        )
        .await;
    let uri = format!("/api/todos/{}", todo["id"]);

    // Empty title is ignored, absent description is untouched
    let (status, body) = app
        .send_json(Method::PUT, &uri, json!({"title": "", "author": "alice"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Original");
    assert_eq!(body["description"], "details");

    let (_, body) = app
        .send_json(Method::PUT, &uri, json!({"title": "Renamed", "author": "alice"}))
        .await;
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["completed"], false);

    // Explicit null clears the description
    let (_, body) = app
        .send_json(Method::PUT, &uri, json!({"description": null, "author": "alice"}))
        .await;
    assert_eq!(body["description"], serde_json::Value::Null);
    assert_eq!(body["title"], "Renamed");
}

#[tokio::test]
async fn test_missing_todo_is_not_found() {
    let app = common::create_test_app().await;
    app.register_user("alice").await;

    let (status, body) = app
        .send_json(Method::PUT, "/api/todos/999", json!({"author": "alice"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Todo not found");

    let (status, _) = app
        .send_json(Method::DELETE, "/api/todos/999", json!({"author": "alice"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send_json(Method::PUT, "/api/todos/not-a-number", json!({"author": "alice"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Todo not found");
}

#[tokio::test]
async fn test_delete_without_body_is_forbidden() {
    let app = common::create_test_app().await;
    app.register_user("alice").await;
    let todo = app.create_todo("alice", "Keep me").await;

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/todos/{}", todo["id"]))
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, list) = app.get("/api/todos").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

fn bare_request(method: Method, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn test_update_without_body_checks_existence_then_ownership() {
    let app = common::create_test_app().await;
    app.register_user("alice").await;
    let todo = app.create_todo("alice", "Keep me").await;

    let (status, body) = app
        .send(bare_request(Method::PUT, "/api/todos/999", Body::empty()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Todo not found");

    let uri = format!("/api/todos/{}", todo["id"]);
    let (status, body) = app
        .send(bare_request(Method::PUT, &uri, Body::empty()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized");

    let (_, list) = app.get("/api/todos").await;
    assert_eq!(list[0], todo);
}

#[tokio::test]
async fn test_update_body_without_content_type_is_accepted() {
    let app = common::create_test_app().await;
    app.register_user("alice").await;
    let todo = app.create_todo("alice", "Plain text client").await;
    let uri = format!("/api/todos/{}", todo["id"]);

    let body = Body::from(json!({"completed": true, "author": "alice"}).to_string());
    let (status, updated) = app.send(bare_request(Method::PUT, &uri, body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);

    let (status, _) = app
        .send(bare_request(Method::PUT, &uri, Body::from("{not json")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listed_todo_matches_created_response() {
    let app = common::create_test_app().await;
    app.register_user("alice").await;

    let (status, created) = app
        .send_json(
            Method::POST,
            "/api/todos",
            json!({
                "title": "Frame photo",
                "description": "the one from the beach",
                "author": "alice",
                "imageUrl": "/uploads/1704103200000-42.png"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = app.get("/api/todos").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0], created);
}

#[tokio::test]
async fn test_delete_is_not_repeatable() {
    let app = common::create_test_app().await;
    app.register_user("alice").await;
    let todo = app.create_todo("alice", "Once").await;
    let uri = format!("/api/todos/{}", todo["id"]);

    let (status, _) = app
        .send_json(Method::DELETE, &uri, json!({"author": "alice"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send_json(Method::DELETE, &uri, json!({"author": "alice"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ids_are_not_reused() {
    let app = common::create_test_app().await;
    app.register_user("alice").await;

    let first = app.create_todo("alice", "one").await;
    app.send_json(
        Method::DELETE,
        &format!("/api/todos/{}", first["id"]),
        json!({"author": "alice"}),
    )
    .await;
    let second = app.create_todo("alice", "two").await;

    assert!(second["id"].as_u64().unwrap() > first["id"].as_u64().unwrap());
}

#[tokio::test]
async fn test_security_headers_on_api() {
    let app = common::create_test_app().await;

    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        Request::builder()
            .uri("/api/todos")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
}
