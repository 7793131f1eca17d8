//! Chat endpoint integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use recall_gateway::db::FactRepo;
use tower::ServiceExt;

mod common;
use common::{CapturingGenerator, FailingGenerator, StaticEmbedder, build_test_router, setup_test_db};

/// Build a `POST /chat` request with the given JSON body
fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_empty_message_returns_400() {
    let db = setup_test_db();
    let app = build_test_router(
        db,
        Arc::new(StaticEmbedder::new(&[])),
        Arc::new(CapturingGenerator::new("unused")),
    );

    let response = app.oneshot(chat_request(r#"{"message": ""}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No message provided");
}

#[tokio::test]
async fn test_missing_message_returns_400() {
    let db = setup_test_db();
    let app = build_test_router(
        db,
        Arc::new(StaticEmbedder::new(&[])),
        Arc::new(CapturingGenerator::new("unused")),
    );

    let response = app.oneshot(chat_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No message provided");
}

#[tokio::test]
async fn test_chat_returns_generated_reply() {
    let db = setup_test_db();
    let generator = Arc::new(CapturingGenerator::new("Hello! How can I help?"));
    let app = build_test_router(db, Arc::new(StaticEmbedder::new(&[])), generator);

    let response = app
        .oneshot(chat_request(r#"{"message": "Hi there"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["response"], "Hello! How can I help?");
}

#[tokio::test]
async fn test_relevant_fact_injected_into_prompt() {
    let db = setup_test_db();
    let repo = FactRepo::new(db.clone());
    repo.insert(&recall_gateway::Fact::new(
        None,
        "The user's name is alice.".to_string(),
    ))
    .unwrap();

    let embedder = StaticEmbedder::new(&[
        ("What's my name?", &[1.0, 0.0, 0.0]),
        ("The user's name is alice.", &[0.9, 0.1, 0.0]),
    ]);
    let generator = Arc::new(CapturingGenerator::new("Your name is Alice."));
    let app = build_test_router(db, Arc::new(embedder), generator.clone());

    let response = app
        .oneshot(chat_request(r#"{"message": "What's my name?"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let prompts = generator.prompts.lock().unwrap();
    assert!(
        prompts[0].contains("The user has previously mentioned: The user's name is alice."),
        "chat prompt should carry the retrieved fact: {}",
        prompts[0]
    );
}

#[tokio::test]
async fn test_below_threshold_keeps_context_empty() {
    let db = setup_test_db();
    let repo = FactRepo::new(db.clone());
    repo.insert(&recall_gateway::Fact::new(
        None,
        "The user's name is Alice.".to_string(),
    ))
    .unwrap();

    // Orthogonal vectors: similarity 0.0, well below the 0.7 threshold
    let embedder = StaticEmbedder::new(&[
        ("What's my name?", &[1.0, 0.0, 0.0]),
        ("The user's name is Alice.", &[0.0, 1.0, 0.0]),
    ]);
    let generator = Arc::new(CapturingGenerator::new("I don't know your name."));
    let app = build_test_router(db, Arc::new(embedder), generator.clone());

    let response = app
        .oneshot(chat_request(r#"{"message": "What's my name?"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let prompts = generator.prompts.lock().unwrap();
    assert!(!prompts[0].contains("previously mentioned"));
    // The context section is present but empty
    assert!(prompts[0].contains("\n\n\n\n"));
}

#[tokio::test]
async fn test_generation_failure_returns_502() {
    let db = setup_test_db();
    let app = build_test_router(
        db,
        Arc::new(StaticEmbedder::new(&[])),
        Arc::new(FailingGenerator),
    );

    let response = app
        .oneshot(chat_request(r#"{"message": "Hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    let error = json["error"].as_str().unwrap();
    assert!(error.starts_with("generation failed:"), "{error}");
}

#[tokio::test]
async fn test_name_rule_persists_fact_and_skips_summary() {
    let db = setup_test_db();
    let generator = Arc::new(CapturingGenerator::new("Nice to meet you, Alice!"));
    let app = build_test_router(
        db.clone(),
        Arc::new(StaticEmbedder::new(&[])),
        generator.clone(),
    );

    let response = app
        .oneshot(chat_request(r#"{"message": "My Name is Alice"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let facts = FactRepo::new(db).list(None).unwrap();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].content, "The user's name is alice.");

    // The generator was only called for the chat reply, not for summarization
    assert_eq!(generator.prompts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_name_fact_round_trip() {
    let db = setup_test_db();
    let embedder = StaticEmbedder::new(&[
        ("What's my name?", &[1.0, 0.0, 0.0]),
        ("The user's name is alice.", &[0.9, 0.1, 0.0]),
    ]);
    let generator = Arc::new(CapturingGenerator::new("Alice!"));
    let app = build_test_router(db, Arc::new(embedder), generator.clone());

    // First turn teaches the gateway the name
    let response = app
        .clone()
        .oneshot(chat_request(r#"{"message": "my name is Alice"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Second turn retrieves it as the top match
    let response = app
        .oneshot(chat_request(r#"{"message": "What's my name?"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let prompts = generator.prompts.lock().unwrap();
    let second_chat_prompt = prompts
        .iter()
        .find(|p| p.contains("What's my name?"))
        .expect("second chat prompt");
    assert!(
        second_chat_prompt
            .contains("The user has previously mentioned: The user's name is alice.")
    );
}

#[tokio::test]
async fn test_summary_fact_persisted_after_reply() {
    let db = setup_test_db();
    let generator = Arc::new(CapturingGenerator::new("The user enjoys hiking."));
    let app = build_test_router(
        db.clone(),
        Arc::new(StaticEmbedder::new(&[])),
        generator.clone(),
    );

    let response = app
        .oneshot(chat_request(r#"{"message": "I went hiking this weekend"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Chat call plus summarization call
    assert_eq!(generator.prompts.lock().unwrap().len(), 2);

    let facts = FactRepo::new(db).list(None).unwrap();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].content, "The user enjoys hiking.");
}

#[tokio::test]
async fn test_health_endpoint() {
    let db = setup_test_db();
    let app = build_test_router(
        db,
        Arc::new(StaticEmbedder::new(&[])),
        Arc::new(CapturingGenerator::new("unused")),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ready_endpoint() {
    let db = setup_test_db();
    let app = build_test_router(
        db,
        Arc::new(StaticEmbedder::new(&[])),
        Arc::new(CapturingGenerator::new("unused")),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["database"]["status"], "ok");
}
