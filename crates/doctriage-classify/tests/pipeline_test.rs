//! Integration tests for the classification pipeline against a mocked Gemini API.

use doctriage_classify::{
    ClassificationInput, ClassificationPipeline, ClassifyError, GeminiClassifier, KeywordRuleSet,
    NoopClassifier, PipelineConfig, PrimaryClassifier,
};
use doctriage_core::{Category, Priority};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-pro:generateContent";

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
}

fn classifier_for(server: &MockServer) -> GeminiClassifier {
    GeminiClassifier::builder()
        .base_url(server.uri())
        .model("gemini-pro")
        .api_key(Some("test-key".to_string()))
        .build()
        .expect("client should build")
}

fn pipeline_for(server: &MockServer, timeout: Duration) -> ClassificationPipeline {
    ClassificationPipeline::new(
        Arc::new(classifier_for(server)),
        PipelineConfig {
            max_input_chars: 2000,
            classifier_timeout: timeout,
        },
    )
}

// ==================== Gemini client ====================

#[tokio::test]
async fn test_gemini_parses_structured_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            "```json\n{\"category\": \"Legal\", \"priority\": \"Medium\", \"summary\": \"A lease agreement.\"}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let output = classifier_for(&server)
        .classify("Lease terms", "lease.pdf")
        .await
        .expect("classification should succeed");

    assert_eq!(output.category, Category::Legal);
    assert_eq!(output.priority, Priority::Medium);
    assert_eq!(output.summary, "A lease agreement.");
}

#[tokio::test]
async fn test_gemini_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = classifier_for(&server)
        .classify("text", "a.txt")
        .await
        .unwrap_err();

    match err {
        ClassifyError::Status { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "overloaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_gemini_without_candidates_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = classifier_for(&server)
        .classify("text", "a.txt")
        .await
        .unwrap_err();

    assert!(matches!(err, ClassifyError::MalformedResponse(_)));
}

// ==================== Pipeline ====================

#[tokio::test]
async fn test_pipeline_uses_model_output_when_keywords_are_weak() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            r#"{"category": "Reports", "priority": "Medium", "summary": "Quarterly figures."}"#,
        )))
        .mount(&server)
        .await;

    let result = pipeline_for(&server, Duration::from_secs(5))
        .classify(&ClassificationInput::new(
            "Quarterly report on system performance.",
            "q3-report.txt",
        ))
        .await;

    assert_eq!(result.category, Category::Reports);
    assert_eq!(result.priority, Priority::Medium);
    assert_eq!(result.summary, "Quarterly figures.");
    assert!(!result.degraded);
}

#[tokio::test]
async fn test_pipeline_keyword_override_beats_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            r#"{"category": "Finance", "priority": "Low", "summary": "Evacuation notice."}"#,
        )))
        .mount(&server)
        .await;

    let result = pipeline_for(&server, Duration::from_secs(5))
        .classify(&ClassificationInput::new(
            "Please note the updated safety protocol for emergency evacuation.",
            "circular.docx",
        ))
        .await;

    assert_eq!(result.category, Category::Safety);
    assert_eq!(result.priority, Priority::High);
    assert_eq!(result.summary, "Evacuation notice.");
}

#[tokio::test]
async fn test_pipeline_times_out_to_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply(r#"{"category": "Legal"}"#))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = pipeline_for(&server, Duration::from_millis(100))
        .classify(&ClassificationInput::new("Canteen menu for next week", "menu.txt"))
        .await;

    assert_eq!(result.category, Category::Other);
    assert_eq!(result.priority, Priority::Low);
    assert_eq!(
        result.summary,
        "Document contains 5 words and has been processed for review."
    );
    assert!(result.degraded);
}

#[tokio::test]
async fn test_pipeline_handles_non_json_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(gemini_reply("I am unable to classify this.")),
        )
        .mount(&server)
        .await;

    let result = pipeline_for(&server, Duration::from_secs(5))
        .classify(&ClassificationInput::new("Staff training calendar", "training.txt"))
        .await;

    assert!(result.degraded);
    assert_eq!(result.category, Category::Hr);
    assert_eq!(result.priority, Priority::Low);
}

#[tokio::test]
async fn test_pipeline_without_credential_never_calls_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let classifier = GeminiClassifier::builder()
        .base_url(server.uri())
        .api_key(None)
        .build()
        .unwrap();
    let pipeline = ClassificationPipeline::new(Arc::new(classifier), PipelineConfig::default());

    let result = pipeline
        .classify(&ClassificationInput::new("", "empty.txt"))
        .await;

    assert!(result.degraded);
    assert_eq!(result.category, Category::Other);
}

// ==================== Properties ====================

#[tokio::test]
async fn test_results_always_within_enumerations() {
    let pipeline = ClassificationPipeline::new(Arc::new(NoopClassifier), PipelineConfig::default());
    let inputs = [
        "",
        "   ",
        "Unsupported file type.",
        "Error during OCR or text extraction.",
        "URGENT URGENT",
        "invoice budget payment vendor supplier tender legal contract",
        "\u{0000}\u{FFFF}",
        "日本語のテキスト",
    ];

    for text in inputs {
        let result = pipeline
            .classify(&ClassificationInput::new(text, "file"))
            .await;
        assert!(Category::ALL.contains(&result.category));
        assert!(matches!(
            result.priority,
            Priority::High | Priority::Medium | Priority::Low
        ));
    }
}

#[tokio::test]
async fn test_single_category_evidence_overrides_any_primary() {
    let rules = KeywordRuleSet::standard();
    for rule in rules.category_rules() {
        let text = format!("{} {}", rule.keywords[0], rule.keywords[1]);
        let matches = rules.category_matches(&text, "");
        let expected = rule.category;
        // Only meaningful when no other rule sees the same text.
        let others = matches
            .iter()
            .filter(|(c, n)| *c != expected && *n > 0)
            .count();
        if others > 0 {
            continue;
        }

        let pipeline =
            ClassificationPipeline::new(Arc::new(NoopClassifier), PipelineConfig::default());
        let result = pipeline
            .classify(&ClassificationInput::new(text.clone(), ""))
            .await;
        assert_eq!(result.category, expected, "text: {text}");
    }
}
