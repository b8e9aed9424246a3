// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /api/chat streaming and non-streaming behaviour

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use rag_chat_node::api::{create_app, ChatResponse};
use rag_chat_node::providers::{ChatRole, ProviderError};
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt;

use crate::common::{test_state, FakeChat, FakeExtractor, SAMPLE_TEXT};

fn chat_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_chat_streams_plain_text_by_default() {
    let chat = Arc::new(FakeChat::new("unused"));
    let app = create_app(test_state(
        chat.clone(),
        Arc::new(FakeExtractor::new(SAMPLE_TEXT)),
    ));

    let response = app
        .oneshot(chat_request(json!({
            "developer_message": "You are terse.",
            "user_message": "Say hello"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"Hello!");

    let request = chat.last_request().unwrap();
    assert_eq!(request.model, "gpt-4.1-mini");
    assert_eq!(request.messages[0].role, ChatRole::Developer);
    assert_eq!(request.messages[0].content, "You are terse.");
    assert_eq!(request.messages[1].role, ChatRole::User);
}

#[tokio::test]
async fn test_chat_non_streaming_returns_json() {
    let chat = Arc::new(FakeChat::new("Hello there."));
    let app = create_app(test_state(
        chat.clone(),
        Arc::new(FakeExtractor::new(SAMPLE_TEXT)),
    ));

    let response = app
        .oneshot(chat_request(json!({
            "developer_message": "Be polite.",
            "user_message": "Greet me",
            "model": "gpt-4o-mini",
            "stream": false
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let reply: ChatResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply.content, "Hello there.");
    assert_eq!(reply.model, "gpt-4o-mini");
}

#[tokio::test]
async fn test_chat_provider_failure_is_502() {
    let chat = Arc::new(FakeChat::failing(ProviderError::Api {
        status: 401,
        message: "invalid api key".to_string(),
    }));
    let app = create_app(test_state(chat, Arc::new(FakeExtractor::new(SAMPLE_TEXT))));

    let response = app
        .oneshot(chat_request(json!({
            "developer_message": "",
            "user_message": "hi"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_chat_empty_user_message_is_400() {
    let app = create_app(test_state(
        Arc::new(FakeChat::new("x")),
        Arc::new(FakeExtractor::new(SAMPLE_TEXT)),
    ));

    let response = app
        .oneshot(chat_request(json!({
            "developer_message": "sys",
            "user_message": ""
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
