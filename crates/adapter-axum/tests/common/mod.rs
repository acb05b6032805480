//! Shared fixtures: fake speech engines, a fake downstream API and a
//! multipart request builder.

#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};

use adapter_axum::{AxumContext, create_router};
use adapter_core::{
    AdapterSettings, AudioRef, ConversionError, SynthesisPort, SynthesizedAudio, Transcript,
    TranscriptionPort,
};
use adapter_voice::SpeechEngines;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{Value, json};

// ── Fake engines ────────────────────────────────────────────────────

/// Transcribes audio by reading it as UTF-8. `garbled` is unintelligible.
pub struct EchoTranscriber;

#[async_trait]
impl TranscriptionPort for EchoTranscriber {
    async fn transcribe(
        &self,
        audio: &[u8],
        _format: &str,
        language: &str,
    ) -> Result<Transcript, ConversionError> {
        let text = String::from_utf8_lossy(audio).trim().to_string();
        if text == "garbled" {
            return Err(ConversionError::Unintelligible);
        }
        Ok(Transcript {
            text,
            language: language.to_string(),
        })
    }

    fn engine_name(&self) -> &str {
        "fake-stt"
    }
}

/// "Speaks" text by writing it to a temp file. Text containing `FAIL` fails.
pub struct TextSynthesizer;

#[async_trait]
impl SynthesisPort for TextSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        _language: &str,
        _slow: bool,
    ) -> Result<SynthesizedAudio, ConversionError> {
        if text.contains("FAIL") {
            return Err(ConversionError::Failed("synthesis refused".into()));
        }
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(text.as_bytes())?;
        let path = file.into_temp_path();
        Ok(SynthesizedAudio {
            audio: AudioRef::with_owner(path.to_path_buf(), path),
            file_size_bytes: text.len() as u64,
        })
    }

    fn engine_name(&self) -> &str {
        "fake-tts"
    }
}

pub fn fake_engines() -> SpeechEngines {
    SpeechEngines {
        transcriber: Arc::new(EchoTranscriber),
        synthesizer: Arc::new(TextSynthesizer),
    }
}

// ── Fake downstream ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Received {
    pub api_key: Option<String>,
    pub body: Value,
}

pub type Inbox = Arc<Mutex<Vec<Received>>>;

/// Text the adapter sent: a transcription object or a plain string.
fn sent_text(body: &Value) -> String {
    let text = &body["text"];
    text["text"]
        .as_str()
        .or_else(|| text.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Starts a downstream with `/chat` replying `{"response": "echo: <text>"}`
/// (or an unrelated body for the text `silent`) and `/fail` replying 500.
pub async fn start_downstream() -> (String, Inbox) {
    let inbox = Inbox::default();
    let chat_inbox = inbox.clone();
    let app = Router::new()
        .route(
            "/chat",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let inbox = chat_inbox.clone();
                async move {
                    let text = sent_text(&body);
                    inbox.lock().unwrap().push(Received {
                        api_key: headers
                            .get("x-api-key")
                            .and_then(|v| v.to_str().ok())
                            .map(String::from),
                        body,
                    });
                    if text == "silent" {
                        Json(json!({ "unrelated_field": 42 }))
                    } else {
                        Json(json!({ "response": format!("echo: {text}") }))
                    }
                }
            }),
        )
        .route(
            "/fail",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "downstream broke") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), inbox)
}

// ── App / requests ──────────────────────────────────────────────────

pub fn test_settings(target_url: &str) -> AdapterSettings {
    AdapterSettings {
        target_url: target_url.to_string(),
        request_timeout_secs: 5,
        max_batch_items: 5,
        ..AdapterSettings::with_defaults()
    }
}

pub fn app(target_url: &str) -> Router {
    create_router(AxumContext::new(test_settings(target_url), fake_engines()))
}

pub enum Part<'a> {
    Field(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

const BOUNDARY: &str = "adapter-test-boundary";

pub fn multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Field(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn urlencoded(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("Expected valid JSON body: {e}"))
}

pub fn header<'a>(response: &'a axum::response::Response, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
