//! Search-term extraction tests, including the Groq extractor against a mock.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use research_advisor::config::Config;
use research_advisor::terms::{GroqExtractor, KeywordExtractor, MAX_TERMS, TermExtractor};

fn chat_response(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

#[tokio::test]
async fn test_groq_terms() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer groq-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(
            "precision agriculture, remote sensing, \"crop yield prediction\"",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let extractor = GroqExtractor::new(&Config::for_testing(&mock_server.uri()), "groq-key").unwrap();
    let terms = extractor.extract("AI for precision farming").await;

    assert_eq!(terms, vec!["precision agriculture", "remote sensing", "crop yield prediction"]);
}

#[tokio::test]
async fn test_groq_request_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("graph theory")))
        .mount(&mock_server)
        .await;

    let extractor = GroqExtractor::new(&Config::for_testing(&mock_server.uri()), "k").unwrap();
    extractor.extract("routing delivery vans").await;

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "llama3-8b-8192");
    assert_eq!(body["max_tokens"], 50);
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][1]["content"].as_str().unwrap().contains("routing delivery vans"));
}

#[tokio::test]
async fn test_groq_failure_falls_back_to_keywords() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let extractor = GroqExtractor::new(&Config::for_testing(&mock_server.uri()), "k").unwrap();
    let idea = "AI for precision farming";

    assert_eq!(extractor.extract(idea).await, KeywordExtractor::extract_terms(idea));
}

#[tokio::test]
async fn test_groq_unusable_answer_falls_back_to_keywords() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("1, 22, ok")))
        .mount(&mock_server)
        .await;

    let extractor = GroqExtractor::new(&Config::for_testing(&mock_server.uri()), "k").unwrap();
    let idea = "telemedicine for rural patient triage";

    let terms = extractor.extract(idea).await;
    assert_eq!(terms, KeywordExtractor::extract_terms(idea));
    assert_eq!(terms[0], "healthcare");
}

#[tokio::test]
async fn test_groq_empty_choices_falls_back_to_keywords() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&mock_server)
        .await;

    let extractor = GroqExtractor::new(&Config::for_testing(&mock_server.uri()), "k").unwrap();
    assert_eq!(extractor.extract("solar panel cleaning robots").await, vec![
        "solar", "panel", "cleaning", "robots"
    ]);
}

#[tokio::test]
async fn test_keyword_extractor_caps_terms() {
    let terms = KeywordExtractor
        .extract("machine learning for crop and patient diagnosis across many regions")
        .await;
    assert_eq!(terms.len(), MAX_TERMS);
    assert_eq!(terms[..3], ["artificial intelligence", "machine learning", "neural networks"]);
}
