//! Integration tests for the chat panel.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};

use nexus_integration_tests::{TestServer, client, location, public_dir, sign_up_user};
use nexus_server::{LatencyConfig, ServerConfig};

const GENERAL_SUFFIX: &str =
    "[Simulated response - In production, this would query the actual knowledge base]";
const DOMAIN_SUFFIX: &str = "[Simulated domain-specific response - In production, this would query the domain's knowledge base]";

const LEGAL_OPENERS: [&str; 3] = [
    "Based on legal resources and compliance documents:",
    "From the legal knowledge base:",
    "According to organizational legal guidelines:",
];

async fn ask(server: &TestServer, client: &reqwest::Client, message: &str) -> reqwest::Response {
    client
        .post(server.url("/chat/messages"))
        .json(&json!({ "message": message }))
        .send()
        .await
        .unwrap()
}

/// A server whose chat replies take a fixed 400ms.
async fn slow_chat_server() -> TestServer {
    let mut config = ServerConfig::with_public_dir(public_dir()).unwrap();
    config.latency = LatencyConfig {
        chat_min: Duration::from_millis(400),
        chat_jitter: Duration::ZERO,
        upload: Duration::ZERO,
    };
    TestServer::with_config(config).await
}

/// Send `message` in the background on a clone of `client`.
fn ask_in_background(
    server: &TestServer,
    client: &reqwest::Client,
    message: &str,
) -> tokio::task::JoinHandle<reqwest::Response> {
    let client = client.clone();
    let url = server.url("/chat/messages");
    let body = json!({ "message": message });
    tokio::spawn(async move { client.post(url).json(&body).send().await.unwrap() })
}

async fn conversation(server: &TestServer, client: &reqwest::Client) -> Vec<Value> {
    client
        .get(server.url("/chat/messages"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_locked_user_gets_domain_reply() {
    let server = TestServer::start().await;
    let client = client();
    sign_up_user(&server, &client, "ada@example.com", Some("Legal")).await;
    client.get(server.url("/chat")).send().await.unwrap();

    let exchange: Value = ask(&server, &client, "What is our NDA policy?")
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(exchange["user"]["sender"], "user");
    assert_eq!(exchange["user"]["content"], "What is our NDA policy?");
    assert_eq!(exchange["ai"]["sender"], "ai");

    let reply = exchange["ai"]["content"].as_str().unwrap();
    let opener = reply.split("\n\n").next().unwrap();
    assert!(LEGAL_OPENERS.contains(&opener), "{opener}");
    assert!(reply.ends_with(DOMAIN_SUFFIX));
}

#[tokio::test]
async fn test_general_user_gets_general_reply() {
    let server = TestServer::start().await;
    let client = client();
    sign_up_user(&server, &client, "ada@example.com", None).await;

    let exchange: Value = ask(&server, &client, "hello").await.json().await.unwrap();
    assert!(exchange["ai"]["content"].as_str().unwrap().ends_with(GENERAL_SUFFIX));
}

#[tokio::test]
async fn test_conversation_resets_on_page_load() {
    let server = TestServer::start().await;
    let client = client();
    sign_up_user(&server, &client, "ada@example.com", None).await;

    ask(&server, &client, "first").await;
    ask(&server, &client, "second").await;

    let messages = conversation(&server, &client).await;
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2]["content"], "second");

    client.get(server.url("/chat")).send().await.unwrap();
    assert!(conversation(&server, &client).await.is_empty());
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let server = TestServer::start().await;
    let client = client();
    sign_up_user(&server, &client, "ada@example.com", None).await;

    let response = ask(&server, &client, "   ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_api_requires_session() {
    let server = TestServer::start().await;
    let response = ask(&server, &client(), "hello").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_overlapping_sends_keep_every_message() {
    let server = slow_chat_server().await;
    let client = client();
    sign_up_user(&server, &client, "ada@example.com", None).await;

    let first = ask_in_background(&server, &client, "first");
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = ask_in_background(&server, &client, "second");

    assert_eq!(first.await.unwrap().status(), StatusCode::OK);
    assert_eq!(second.await.unwrap().status(), StatusCode::OK);

    let messages = conversation(&server, &client).await;
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["content"], "first");
    assert_eq!(messages[1]["content"], "second");
    let replies = messages.iter().filter(|m| m["sender"] == "ai").count();
    assert_eq!(replies, 2);
}

#[tokio::test]
async fn test_logout_during_pending_reply_ends_session() {
    let server = slow_chat_server().await;
    let client = client();
    sign_up_user(&server, &client, "ada@example.com", None).await;

    let pending = ask_in_background(&server, &client, "hello");
    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = client.post(server.url("/logout")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let reply = pending.await.unwrap();
    assert_eq!(reply.status(), StatusCode::CONFLICT);

    let response = client.get(server.url("/chat")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/signup");
}

#[tokio::test]
async fn test_reply_pending_across_page_load_is_dropped() {
    let server = slow_chat_server().await;
    let client = client();
    sign_up_user(&server, &client, "ada@example.com", None).await;

    let pending = ask_in_background(&server, &client, "hello");
    tokio::time::sleep(Duration::from_millis(100)).await;
    client.get(server.url("/chat")).send().await.unwrap();

    assert_eq!(pending.await.unwrap().status(), StatusCode::CONFLICT);
    assert!(conversation(&server, &client).await.is_empty());
}
