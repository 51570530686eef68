use gemini_ask::{
    ai::{GeminiHttpClient, GenerationService, MockGenerationClient},
    app::{App, AppServices},
    catalog::ModelCatalog,
    instruction::INSTRUCTION_FILE_NAME,
    models::Config,
    output::WriteOutcome,
    terminal::ScriptedOperator,
    Error,
};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEFAULT: &str = "gemini-2.5-flash";

fn config_in(dir: &Path) -> Config {
    Config {
        instruction_path: dir.join(INSTRUCTION_FILE_NAME),
        output_path: dir.join("response.txt"),
        api_key: None,
        base_url: "http://127.0.0.1:1".to_string(),
        timeout: None,
        catalog: ModelCatalog::default(),
        open_viewer: false,
    }
}

fn workspace_with_instruction() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(INSTRUCTION_FILE_NAME),
        "You are a concise assistant.",
    )
    .unwrap();
    dir
}

fn app_with_mock(config: Config, operator: &ScriptedOperator, mock: &MockGenerationClient) -> App {
    let mock = mock.clone();
    App::with_services(
        config,
        AppServices {
            operator: Box::new(operator.clone()),
            generation: Box::new(move |_: &Config, _: &str| {
                Box::new(mock.clone()) as Box<dyn GenerationService>
            }),
        },
    )
}

#[tokio::test]
async fn test_missing_instruction_fails_before_any_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let operator = ScriptedOperator::new().with_answer("key");
    let mock = MockGenerationClient::new();

    let err = app_with_mock(config_in(dir.path()), &operator, &mock)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingInstruction(_)));
    assert_eq!(err.exit_code(), 1);
    assert!(operator.transcript().is_empty());
    assert_eq!(mock.get_call_count(), 0);
}

#[tokio::test]
async fn test_empty_credential_makes_no_network_call() {
    let dir = workspace_with_instruction();
    let operator = ScriptedOperator::new().with_answer("   ");
    let mock = MockGenerationClient::new().with_text_response(&["unused"]);

    let err = app_with_mock(config_in(dir.path()), &operator, &mock)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptyCredential));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(operator.prompts_shown(), 1);
    assert_eq!(mock.get_call_count(), 0);
}

#[tokio::test]
async fn test_numeric_choice_selects_catalog_entry() {
    let dir = workspace_with_instruction();
    let operator = ScriptedOperator::new()
        .with_answer("key")
        .with_answer("3")
        .with_answer("What is Rust?")
        .with_answer("");
    let mock = MockGenerationClient::new().with_text_response(&["A language."]);

    let outcome = app_with_mock(config_in(dir.path()), &operator, &mock)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.model, "gemini-2.5-flash-lite");
    assert_eq!(mock.called_models(), vec!["gemini-2.5-flash-lite"]);
}

#[tokio::test]
async fn test_denied_model_falls_back_to_default_with_warning() {
    let dir = workspace_with_instruction();
    let operator = ScriptedOperator::new()
        .with_answer("key")
        .with_answer("gemini-2.0-pro")
        .with_answer("hello")
        .with_answer("");
    let mock = MockGenerationClient::new().with_text_response(&["hi"]);

    let outcome = app_with_mock(config_in(dir.path()), &operator, &mock)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.model, DEFAULT);
    assert_eq!(mock.called_models(), vec![DEFAULT]);
    assert!(operator
        .transcript()
        .iter()
        .any(|line| line.starts_with("Warning:") && line.contains("gemini-2.0-pro")));
}

#[tokio::test]
async fn test_declined_retry_exits_with_failure() {
    let dir = workspace_with_instruction();
    let config = config_in(dir.path());
    let output_path = config.output_path.clone();
    let operator = ScriptedOperator::new()
        .with_answer("key")
        .with_answer("gemini-3-pro-preview")
        .with_answer("hello")
        .with_answer("")
        .with_answer("n");
    let mock = MockGenerationClient::new()
        .with_failure(404, "model not found")
        .with_text_response(&["unused"]);

    let err = app_with_mock(config, &operator, &mock)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RetryDeclined { .. }));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(mock.called_models(), vec!["gemini-3-pro-preview"]);
    assert!(!output_path.exists());
}

#[tokio::test]
async fn test_accepted_retry_writes_fallback_answer() {
    let dir = workspace_with_instruction();
    let config = config_in(dir.path());
    let output_path = config.output_path.clone();
    let operator = ScriptedOperator::new()
        .with_answer("key")
        .with_answer("4")
        .with_answer("hello")
        .with_answer("")
        .with_answer("y");
    let mock = MockGenerationClient::new()
        .with_failure(503, "overloaded")
        .with_text_response(&["from default"]);

    let outcome = app_with_mock(config, &operator, &mock)
        .run()
        .await
        .unwrap();

    assert!(outcome.retried);
    assert_eq!(outcome.model, DEFAULT);
    assert_eq!(mock.called_models(), vec!["gemini-3-pro-preview", DEFAULT]);
    assert_eq!(fs::read_to_string(output_path).unwrap(), "from default");
}

#[tokio::test]
async fn test_text_parts_are_joined_into_output_file() {
    let dir = workspace_with_instruction();
    let config = config_in(dir.path());
    let output_path = config.output_path.clone();
    fs::write(&output_path, "previous run").unwrap();
    let operator = ScriptedOperator::new()
        .with_answer("key")
        .with_answer("")
        .with_answer("Give me two letters")
        .with_answer("");
    let mock = MockGenerationClient::new().with_text_response(&["A", "B"]);

    let outcome = app_with_mock(config, &operator, &mock)
        .run()
        .await
        .unwrap();

    assert!(matches!(outcome.output, WriteOutcome::Written { .. }));
    assert_eq!(fs::read_to_string(output_path).unwrap(), "A\nB");
}

#[tokio::test]
async fn test_no_text_response_is_not_a_failure() {
    let dir = workspace_with_instruction();
    let config = config_in(dir.path());
    let output_path = config.output_path.clone();
    let operator = ScriptedOperator::new()
        .with_answer("key")
        .with_answer("")
        .with_answer("blocked question")
        .with_answer("");
    let mock = MockGenerationClient::new().with_result(Ok(serde_json::from_value(
        serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }),
    )
    .unwrap()));

    let outcome = app_with_mock(config, &operator, &mock)
        .run()
        .await
        .unwrap();

    assert!(matches!(outcome.output, WriteOutcome::NoContent { .. }));
    assert!(!output_path.exists());
    assert!(operator
        .transcript()
        .iter()
        .any(|line| line.contains("blockReason")));
}

#[tokio::test]
async fn test_missing_image_sends_text_only() {
    let dir = workspace_with_instruction();
    let missing = dir.path().join("missing.png");
    let operator = ScriptedOperator::new()
        .with_answer("key")
        .with_answer("")
        .with_answer("describe")
        .with_answer(format!("\"{}\"", missing.display()));
    let mock = MockGenerationClient::new().with_text_response(&["nothing to see"]);

    app_with_mock(config_in(dir.path()), &operator, &mock)
        .run()
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].contents[0].parts.len(), 1);
    assert!(operator
        .transcript()
        .iter()
        .any(|line| line.contains("not found")));
}

#[tokio::test]
async fn test_env_credential_skips_secret_prompt() {
    let dir = workspace_with_instruction();
    let mut config = config_in(dir.path());
    config.api_key = Some("from-env".to_string());
    let operator = ScriptedOperator::new()
        .with_answer("1")
        .with_answer("hi")
        .with_answer("");
    let mock = MockGenerationClient::new().with_text_response(&["ok"]);
    let seen_key = Arc::new(Mutex::new(String::new()));

    let mock_for_factory = mock.clone();
    let seen = seen_key.clone();
    let mut app = App::with_services(
        config,
        AppServices {
            operator: Box::new(operator.clone()),
            generation: Box::new(move |_: &Config, api_key: &str| {
                *seen.lock().unwrap() = api_key.to_string();
                Box::new(mock_for_factory.clone()) as Box<dyn GenerationService>
            }),
        },
    );

    let outcome = app.run().await.unwrap();

    assert_eq!(outcome.model, "gemini-2.5-pro");
    assert_eq!(*seen_key.lock().unwrap(), "from-env");
    assert_eq!(operator.prompts_shown(), 3);
}

#[tokio::test]
async fn test_full_workflow_over_http_with_image() {
    let server = MockServer::start().await;
    let dir = workspace_with_instruction();
    let image_path = dir.path().join("cat.png");
    fs::write(&image_path, [0x89, 0x50, 0x4E, 0x47]).unwrap();

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .and(header("x-goog-api-key", "real-key"))
        .and(body_string_contains("You are a concise assistant."))
        .and(body_string_contains("\"mimeType\":\"image/png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "A cat." }] },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_in(dir.path());
    config.base_url = server.uri();
    let output_path = config.output_path.clone();
    let operator = ScriptedOperator::new()
        .with_answer("real-key")
        .with_answer("gemini-2.5-pro")
        .with_answer("What animal is this?")
        .with_answer(image_path.display().to_string());

    let mut app = App::with_services(
        config,
        AppServices {
            operator: Box::new(operator.clone()),
            generation: Box::new(|config: &Config, api_key: &str| {
                Box::new(
                    GeminiHttpClient::new(api_key.to_string())
                        .with_base_url(config.base_url.clone()),
                ) as Box<dyn GenerationService>
            }),
        },
    );

    let outcome = app.run().await.unwrap();

    assert_eq!(outcome.model, "gemini-2.5-pro");
    assert!(!outcome.retried);
    assert_eq!(fs::read_to_string(output_path).unwrap(), "A cat.");
}

#[tokio::test]
async fn test_default_model_http_failure_is_fatal_without_retry() {
    let server = MockServer::start().await;
    let dir = workspace_with_instruction();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_in(dir.path());
    config.base_url = server.uri();
    let operator = ScriptedOperator::new()
        .with_answer("key")
        .with_answer("")
        .with_answer("hello")
        .with_answer("")
        .with_answer("y");

    let mut app = App::with_services(
        config,
        AppServices {
            operator: Box::new(operator.clone()),
            generation: Box::new(|config: &Config, api_key: &str| {
                Box::new(
                    GeminiHttpClient::new(api_key.to_string())
                        .with_base_url(config.base_url.clone()),
                ) as Box<dyn GenerationService>
            }),
        },
    );

    let err = app.run().await.unwrap_err();

    match err {
        Error::RequestFailed { model, detail } => {
            assert_eq!(model, DEFAULT);
            assert!(detail.contains("500"));
            assert!(detail.contains("internal error"));
        }
        other => panic!("expected RequestFailed, got {:?}", other),
    }
    // The "y" answer is never consumed: only credential, model, question, image.
    assert_eq!(operator.prompts_shown(), 4);
}

#[tokio::test]
async fn test_prefixed_default_model_failure_hits_endpoint_once() {
    let server = MockServer::start().await;
    let dir = workspace_with_instruction();

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_in(dir.path());
    config.base_url = server.uri();
    let operator = ScriptedOperator::new()
        .with_answer("key")
        .with_answer("models/gemini-2.5-flash")
        .with_answer("hello")
        .with_answer("")
        .with_answer("y");

    let mut app = App::with_services(
        config,
        AppServices {
            operator: Box::new(operator.clone()),
            generation: Box::new(|config: &Config, api_key: &str| {
                Box::new(
                    GeminiHttpClient::new(api_key.to_string())
                        .with_base_url(config.base_url.clone()),
                ) as Box<dyn GenerationService>
            }),
        },
    );

    let err = app.run().await.unwrap_err();

    assert!(matches!(err, Error::RequestFailed { ref model, .. } if model == DEFAULT));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert_eq!(operator.prompts_shown(), 4);
}
