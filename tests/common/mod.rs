#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use turon_proxy::{ChatService, KnowledgeFacts, PredictionClient, PredictionSettings};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "r8_test_token";
pub const VERSION: &str = "mpt-7b-chat-version";
pub const JOB_ID: &str = "ufawqhfynnddngldkgtslldrkq";

/// Settings pointed at a mock server, with a tiny poll interval.
pub fn settings(server: &MockServer) -> PredictionSettings {
    PredictionSettings {
        api_base: server.uri(),
        api_token: Some(TOKEN.to_string()),
        model_version: Some(VERSION.to_string()),
        poll_interval: Duration::from_millis(1),
        ..PredictionSettings::default()
    }
}

pub fn client(settings: PredictionSettings) -> PredictionClient {
    PredictionClient::new(settings).unwrap()
}

pub fn chat_service(settings: PredictionSettings) -> Arc<ChatService> {
    Arc::new(ChatService::new(
        Arc::new(KnowledgeFacts::turon()),
        client(settings),
    ))
}

pub fn job(status: &str, output: Value) -> Value {
    json!({
        "id": JOB_ID,
        "version": VERSION,
        "status": status,
        "output": output,
        "error": null,
        "logs": "",
    })
}

pub async fn mount_create(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/predictions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Answer the first `times` status reads with `body`, ahead of any
/// default-priority mock mounted for the same path.
pub async fn mount_status_first(server: &MockServer, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/predictions/{}", JOB_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(times)
        .with_priority(1)
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, body: Value, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/predictions/{}", JOB_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected)
        .mount(server)
        .await;
}
