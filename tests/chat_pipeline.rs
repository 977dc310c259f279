//! End-to-end pipeline tests with the upstream services faked out behind the
//! `TokenProvider` / `VectorSearch` / `CompletionProvider` seams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use tokio::sync::mpsc;

use zerochat_backend::chat::types::ChatMessage;
use zerochat_backend::core::config::{AppConfig, CompletionConfig, ZeroDbConfig};
use zerochat_backend::core::errors::ChatError;
use zerochat_backend::llm::CompletionProvider;
use zerochat_backend::server::handlers::chat::chat;
use zerochat_backend::state::AppState;
use zerochat_backend::zerodb::{AuthToken, SearchResult, TokenProvider, VectorSearch};

const BODY_LIMIT: usize = 1024 * 1024;

fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        log_dir: std::env::temp_dir(),
        zerodb: ZeroDbConfig {
            base_url: "https://api.ainative.studio".to_string(),
            project_id: "proj-test".to_string(),
            username: "svc@example.com".to_string(),
            password: "secret".to_string(),
            api_key: None,
            namespace: "knowledge_base".to_string(),
        },
        completion: CompletionConfig {
            base_url: "https://api.llama.com/v1".to_string(),
            api_key: "llm-key".to_string(),
            default_model: None,
        },
    }
}

#[derive(Default)]
struct CountingAuth {
    calls: AtomicUsize,
}

#[async_trait]
impl TokenProvider for CountingAuth {
    async fn acquire_token(&self) -> Result<AuthToken, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AuthToken {
            token: "jwt-test".to_string(),
            expires_in: 3600,
        })
    }
}

struct CountingSearch {
    calls: AtomicUsize,
    results: Vec<SearchResult>,
}

impl CountingSearch {
    fn new(results: Vec<SearchResult>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            results,
        }
    }
}

#[async_trait]
impl VectorSearch for CountingSearch {
    async fn search(
        &self,
        _token: &AuthToken,
        _query: &str,
        _similarity_metric: &str,
    ) -> Result<Vec<SearchResult>, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.clone())
    }
}

#[derive(Default)]
struct RecordingCompletion {
    calls: AtomicUsize,
    seen_messages: Mutex<Vec<ChatMessage>>,
}

#[async_trait]
impl CompletionProvider for RecordingCompletion {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _model_id: &str,
    ) -> Result<String, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_messages.lock().unwrap() = messages.to_vec();
        Ok("ZeroDB stores vectors for you.".to_string())
    }

    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        _model_id: &str,
    ) -> Result<mpsc::Receiver<Result<String, ChatError>>, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_messages.lock().unwrap() = messages.to_vec();
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            for fragment in ["ZeroDB ", "stores ", "vectors."] {
                if tx.send(Ok(fragment.to_string())).await.is_err() {
                    return;
                }
            }
        });
        Ok(rx)
    }
}

fn doc_result(document: &str) -> SearchResult {
    SearchResult {
        document: Some(document.to_string()),
        ..SearchResult::default()
    }
}

fn text_result(text: &str) -> SearchResult {
    SearchResult {
        text: Some(text.to_string()),
        ..SearchResult::default()
    }
}

fn build_state(
    auth: Arc<CountingAuth>,
    search: Arc<CountingSearch>,
    completion: Arc<RecordingCompletion>,
) -> Arc<AppState> {
    AppState::with_components(test_config(), auth, search, completion)
}

#[tokio::test]
async fn rag_request_answers_with_plain_text() {
    let auth = Arc::new(CountingAuth::default());
    let search = Arc::new(CountingSearch::new(vec![
        text_result("ZeroDB is a vector database"),
        text_result("It supports semantic search"),
    ]));
    let completion = Arc::new(RecordingCompletion::default());
    let state = build_state(auth, search, completion.clone());

    let body = Bytes::from_static(
        br#"{
            "messages": [{"role": "user", "content": "What is ZeroDB?"}],
            "useRag": true,
            "similarityMetric": "cosine"
        }"#,
    );
    let response = chat(State(state), body).await.unwrap();

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/plain"));

    let reply = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
        .await
        .unwrap();
    assert_eq!(&reply[..], b"ZeroDB stores vectors for you.");

    let messages = completion.seen_messages.lock().unwrap();
    let system = &messages[0];
    assert_eq!(system.role, "system");
    let start = system.content.find("START CONTEXT").unwrap();
    let end = system.content.find("END CONTEXT").unwrap();
    let between = &system.content[start..end];
    assert!(between.contains("ZeroDB is a vector database"));
    assert!(between.contains("It supports semantic search"));
}

#[tokio::test]
async fn rag_disabled_makes_exactly_one_completion_call() {
    let auth = Arc::new(CountingAuth::default());
    let search = Arc::new(CountingSearch::new(vec![]));
    let completion = Arc::new(RecordingCompletion::default());
    let state = build_state(auth.clone(), search.clone(), completion.clone());

    let body = Bytes::from_static(
        br#"{"messages": [{"role": "user", "content": "hi"}], "useRag": false}"#,
    );
    let response = chat(State(state), body).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(auth.calls.load(Ordering::SeqCst), 0);
    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    assert_eq!(completion.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_body_fails_before_any_upstream_call() {
    let auth = Arc::new(CountingAuth::default());
    let search = Arc::new(CountingSearch::new(vec![]));
    let completion = Arc::new(RecordingCompletion::default());
    let state = build_state(auth.clone(), search.clone(), completion.clone());

    let bodies: [&[u8]; 4] = [
        b"not json",
        br#"{"useRag": true}"#,
        br#"{"messages": []}"#,
        br#"{"messages": "nope"}"#,
    ];
    for body in bodies {
        let err = chat(State(state.clone()), Bytes::copy_from_slice(body))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
    }

    assert_eq!(auth.calls.load(Ordering::SeqCst), 0);
    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn document_only_results_reach_the_context_block() {
    let auth = Arc::new(CountingAuth::default());
    let search = Arc::new(CountingSearch::new(vec![doc_result(
        "ZeroDB is a vector database",
    )]));
    let completion = Arc::new(RecordingCompletion::default());
    let state = build_state(auth, search, completion.clone());

    let body = Bytes::from_static(
        br#"{"messages": [{"role": "user", "content": "What is ZeroDB?"}], "useRag": true}"#,
    );
    chat(State(state), body).await.unwrap();

    let messages = completion.seen_messages.lock().unwrap();
    assert!(messages[0].content.contains("ZeroDB is a vector database"));
}

#[tokio::test]
async fn zero_results_still_frame_the_context() {
    let auth = Arc::new(CountingAuth::default());
    let search = Arc::new(CountingSearch::new(vec![]));
    let completion = Arc::new(RecordingCompletion::default());
    let state = build_state(auth, search, completion.clone());

    let body = Bytes::from_static(
        br#"{"messages": [{"role": "user", "content": "anything"}], "useRag": true}"#,
    );
    chat(State(state), body).await.unwrap();

    let messages = completion.seen_messages.lock().unwrap();
    assert!(messages[0].content.contains("START CONTEXT\n\nEND CONTEXT"));
}

#[tokio::test]
async fn streamed_reply_arrives_fragment_by_fragment() {
    let auth = Arc::new(CountingAuth::default());
    let search = Arc::new(CountingSearch::new(vec![]));
    let completion = Arc::new(RecordingCompletion::default());
    let state = build_state(auth, search, completion);

    let body = Bytes::from_static(
        br#"{"messages": [{"role": "user", "content": "hi"}], "useRag": false, "stream": true}"#,
    );
    let response = chat(State(state), body).await.unwrap();

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/plain"));

    let reply = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
        .await
        .unwrap();
    assert_eq!(&reply[..], b"ZeroDB stores vectors.");
}
