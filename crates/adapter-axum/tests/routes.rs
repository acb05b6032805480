//! Router tests driving every endpoint with fake engines and a real
//! downstream bound on `127.0.0.1:0`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{Part, app, body_bytes, body_json, header, multipart, start_downstream, urlencoded};

const UNUSED_TARGET: &str = "http://127.0.0.1:1/chat";

// ── Info ────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_and_root() {
    let app = app(UNUSED_TARGET);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "healthy", "service": "channel-adapter"})
    );

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let info = body_json(response).await;
    assert_eq!(info["status"], "running");
    assert!(
        info["features"]
            .as_array()
            .unwrap()
            .contains(&json!("voice-to-voice workflow"))
    );
}

// ── Plain conversions ───────────────────────────────────────────────

#[tokio::test]
async fn text_input_acknowledges_text() {
    let response = app(UNUSED_TARGET)
        .oneshot(urlencoded(
            "/text-input/",
            "text=++hello+there++&timestamp=2024-01-01T00:00:00Z",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "ui");
    assert_eq!(body["text_length"], 15);
    assert_eq!(body["processed_text"], "hello there");
    assert_eq!(body["received_at"], "2024-01-01T00:00:00Z");
}

#[tokio::test]
async fn missing_required_field_is_422() {
    let response = app(UNUSED_TARGET)
        .oneshot(urlencoded("/text-input/", "source=ui"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["status"], 422);
    assert_eq!(body["error"], "Missing required field: text");
}

#[tokio::test]
async fn voice_to_text_transcribes_upload() {
    let response = app(UNUSED_TARGET)
        .oneshot(multipart(
            "/voice-to-text/?language=de-DE",
            &[Part::File("file", "Clip.WAV", b"guten tag")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["type"], "voice_to_text");
    assert_eq!(body["text"], "guten tag");
    assert_eq!(body["language"], "de-DE");
    assert_eq!(body["format"], "wav");
    assert_eq!(body["filename"], "Clip.WAV");
}

#[tokio::test]
async fn voice_to_text_rejects_unsupported_format() {
    let response = app(UNUSED_TARGET)
        .oneshot(multipart(
            "/voice-to-text/",
            &[Part::File("file", "notes.txt", b"hello")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Supported formats"));
}

#[tokio::test]
async fn voice_to_text_batch_isolates_bad_files() {
    let response = app(UNUSED_TARGET)
        .oneshot(multipart(
            "/voice-to-text/batch/",
            &[
                Part::File("files", "a.mp3", b"first"),
                Part::File("files", "b.ogg", b"garbled"),
                Part::File("files", "c.flac", b"third"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["type"], "voice_to_text_batch");
    assert_eq!(body["total_files"], 3);
    assert_eq!(body["successful_transcriptions"], 2);
    assert_eq!(body["failed_transcriptions"], 1);
    assert_eq!(body["results"][1]["success"], false);
    assert_eq!(body["results"][1]["filename"], "b.ogg");
    assert_eq!(body["results"][2]["text"], "third");
}

#[tokio::test]
async fn batch_over_limit_is_rejected() {
    let files: Vec<Part<'_>> = (0..6).map(|_| Part::File("files", "a.wav", b"x")).collect();
    let response = app(UNUSED_TARGET)
        .oneshot(multipart("/voice-to-text/batch/", &files))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn text_to_voice_returns_audio() {
    let response = app(UNUSED_TARGET)
        .oneshot(urlencoded(
            "/text-to-voice/",
            "text=Speak+this&language=fr&slow=on",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "audio/mpeg");
    assert_eq!(
        header(&response, "content-disposition"),
        "attachment; filename=\"speech.mp3\""
    );
    assert_eq!(header(&response, "x-tts-engine"), "fake-tts");
    assert_eq!(header(&response, "x-language"), "fr");
    assert_eq!(header(&response, "x-slow"), "true");
    assert_eq!(header(&response, "x-text-length"), "10");
    assert_eq!(body_bytes(response).await, b"Speak this");
}

#[tokio::test]
async fn text_to_voice_info_reports_summary_only() {
    let response = app(UNUSED_TARGET)
        .oneshot(urlencoded("/text-to-voice/info/", "text=Hi+there"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["type"], "text_to_voice");
    assert_eq!(body["text_length"], 8);
    assert_eq!(body["file_size_bytes"], 8);
    assert_eq!(body["tts_engine"], "fake-tts");
    assert_eq!(body["output_format"], "mp3");
    assert!(body.get("file_path").is_none());
}

#[tokio::test]
async fn text_to_voice_batch_counts_failures() {
    let response = app(UNUSED_TARGET)
        .oneshot(urlencoded(
            "/text-to-voice/batch/",
            "texts=one&texts=FAIL+two&texts=three",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["type"], "text_to_voice_batch");
    assert_eq!(body["total_texts"], 3);
    assert_eq!(body["successful_conversions"], 2);
    assert_eq!(body["failed_conversions"], 1);
    assert_eq!(body["results"][1]["index"], 1);
    assert_eq!(body["results"][2]["filename"], "batch_speech_2.mp3");
}

#[tokio::test]
async fn engine_failure_maps_to_500() {
    let response = app(UNUSED_TARGET)
        .oneshot(urlencoded("/text-to-voice/", "text=FAIL"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "text-to-voice failed: synthesis refused");
}

// ── Forwarding ──────────────────────────────────────────────────────

#[tokio::test]
async fn text_input_forward_passes_custom_headers() {
    let (base, inbox) = start_downstream().await;
    let target = format!("{base}/chat");

    let response = app(&target)
        .oneshot(multipart(
            "/text-input-forward/",
            &[
                Part::Field("text", "hello"),
                Part::Field("custom_headers", "x-api-key:secret"),
                Part::Field("session_id", "s-1"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["text_input"]["type"], "text_input");
    assert_eq!(body["forward_result"]["status_code"], 200);
    assert_eq!(body["forward_result"]["method"], "POST");
    assert_eq!(body["forward_result"]["url"], target);
    assert_eq!(
        body["forward_result"]["response_data"],
        json!({"response": "echo: hello"})
    );

    let received = inbox.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].api_key.as_deref(), Some("secret"));
    assert_eq!(received[0].body["text"], "hello");
    assert_eq!(received[0].body["session_id"], "s-1");
    assert_eq!(received[0].body["metadata"]["original_source"], "ui");
}

#[tokio::test]
async fn malformed_custom_headers_are_ignored() {
    let (base, inbox) = start_downstream().await;

    let response = app(&format!("{base}/chat"))
        .oneshot(urlencoded(
            "/forward-transcription/",
            "transcription_text=typed+words&custom_headers=x-api-key1",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["transcription"]["source"], "manual");
    assert_eq!(body["transcription"]["language"], "en-US");

    let received = inbox.lock().unwrap();
    assert_eq!(received[0].api_key, None);
    assert_eq!(received[0].body["text"]["text"], "typed words");
}

#[tokio::test]
async fn downstream_error_is_reported_not_raised() {
    let (base, _) = start_downstream().await;

    let response = app(&format!("{base}/fail"))
        .oneshot(multipart(
            "/voice-to-text-forward/",
            &[Part::File("file", "a.wav", b"hi")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["transcription"]["text"], "hi");
    assert_eq!(body["forward_result"]["status_code"], 500);
    assert_eq!(
        body["forward_result"]["error"],
        "HTTP 500: downstream broke"
    );
}

#[tokio::test]
async fn voice_to_text_batch_forward_dispatches_successes() {
    let (base, inbox) = start_downstream().await;

    let response = app(&format!("{base}/chat"))
        .oneshot(multipart(
            "/voice-to-text-batch-forward/",
            &[
                Part::File("files", "a.wav", b"one"),
                Part::File("files", "b.wav", b"garbled"),
                Part::File("files", "c.wav", b"three"),
                Part::Field("concurrent_limit", "2"),
                Part::Field("include_metadata", "false"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total_items"], 3);
    assert_eq!(body["successful_forwards"], 2);
    assert_eq!(body["transcription_results"]["failed_transcriptions"], 1);

    let forwards = body["forward_results"].as_array().unwrap();
    assert_eq!(forwards.len(), 2);
    assert_eq!(forwards[0]["index"], 0);
    assert_eq!(forwards[1]["index"], 1);
    assert_eq!(forwards[1]["response_data"]["response"], "echo: three");

    let received = inbox.lock().unwrap();
    assert_eq!(received.len(), 2);
    assert!(received.iter().all(|r| r.body.get("metadata").is_none()));
}

#[tokio::test]
async fn text_to_voice_forward_embeds_audio_on_request() {
    let (base, inbox) = start_downstream().await;

    let response = app(&format!("{base}/chat"))
        .oneshot(urlencoded(
            "/text-to-voice-forward/",
            "text=abc&include_audio_data=true",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["text_to_voice"]["tts_engine"], "fake-tts");

    let received = inbox.lock().unwrap();
    let audio = &received[0].body["audio_data"];
    assert_eq!(audio["data"], "YWJj");
    assert_eq!(audio["encoding"], "base64");
    assert_eq!(audio["format"], "mp3");
}

#[tokio::test]
async fn text_to_voice_batch_forward_rejects_zero_limit() {
    let (base, inbox) = start_downstream().await;

    for body in [
        "texts=a&texts=b&concurrent_limit=0",
        "texts=a&texts=b&concurrent_limit=-2",
    ] {
        let response = app(&format!("{base}/chat"))
            .oneshot(urlencoded("/text-to-voice-batch-forward/", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
    assert!(inbox.lock().unwrap().is_empty());
}

#[tokio::test]
async fn text_to_voice_batch_forward_keeps_batch_index() {
    let (base, inbox) = start_downstream().await;

    let response = app(&format!("{base}/chat"))
        .oneshot(urlencoded(
            "/text-to-voice-batch-forward/",
            "texts=FAIL+zero&texts=one&texts=two",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total_items"], 3);
    assert_eq!(body["successful_forwards"], 2);
    assert_eq!(body["text_to_voice_results"]["failed_conversions"], 1);

    let received = inbox.lock().unwrap();
    let mut indices: Vec<_> = received
        .iter()
        .map(|r| r.body["metadata"]["batch_index"].as_u64().unwrap())
        .collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![1, 2]);
}

// ── Voice-to-voice ──────────────────────────────────────────────────

#[tokio::test]
async fn voice_to_voice_completes() {
    let (base, inbox) = start_downstream().await;

    let response = app(&format!("{base}/chat"))
        .oneshot(multipart(
            "/voice-to-voice/",
            &[
                Part::File("file", "q.wav", b"hello"),
                Part::Field("session_id", "s-42"),
                Part::Field("user_id", "u-7"),
                Part::Field("channel", "web"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "audio/mpeg");
    assert_eq!(header(&response, "x-original-text"), "hello");
    assert_eq!(header(&response, "x-response-text"), "echo: hello");
    assert_eq!(header(&response, "x-session-id"), "s-42");
    assert_eq!(header(&response, "x-user-id"), "u-7");
    assert_eq!(header(&response, "x-channel"), "web");
    assert_eq!(header(&response, "x-workflow"), "voice-to-voice-complete");
    assert_eq!(
        header(&response, "content-disposition"),
        "attachment; filename=\"response_s-42.mp3\""
    );
    assert_eq!(body_bytes(response).await, b"echo: hello");

    let received = inbox.lock().unwrap();
    assert_eq!(received[0].body["text"]["session_info"]["channel"], "web");
    assert_eq!(received[0].body["session_id"], "s-42");
}

#[tokio::test]
async fn voice_to_voice_encodes_non_ascii_headers() {
    let (base, _) = start_downstream().await;

    let response = app(&format!("{base}/chat"))
        .oneshot(multipart(
            "/voice-to-voice/",
            &[Part::File("file", "q.wav", "héllo".as_bytes())],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-original-text"), "h%C3%A9llo");
    assert_eq!(header(&response, "x-response-text"), "echo%3A%20h%C3%A9llo");
    assert_eq!(header(&response, "x-session-id"), "");
    assert_eq!(
        header(&response, "content-disposition"),
        "attachment; filename=\"response_audio.mp3\""
    );
}

#[tokio::test]
async fn voice_to_voice_without_reply_text_stops_at_forwarded() {
    let (base, inbox) = start_downstream().await;

    let response = app(&format!("{base}/chat"))
        .oneshot(multipart(
            "/voice-to-voice/",
            &[Part::File("file", "q.wav", b"silent")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["stage"], "FORWARDED");
    assert_eq!(body["type"], "WORKFLOW_STAGE_FAILED");
    assert_eq!(body["error"], "No text field found in external API response");
    assert_eq!(inbox.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn voice_to_voice_transcription_failure_is_400() {
    let (base, inbox) = start_downstream().await;

    let response = app(&format!("{base}/chat"))
        .oneshot(multipart(
            "/voice-to-voice/",
            &[Part::File("file", "q.wav", b"garbled")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["stage"], "RECEIVED");
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to transcribe audio")
    );
    assert!(inbox.lock().unwrap().is_empty());
}

#[tokio::test]
async fn voice_to_voice_forward_failure_stops_at_converted() {
    let (base, _) = start_downstream().await;

    let response = app(&format!("{base}/fail"))
        .oneshot(multipart(
            "/voice-to-voice/",
            &[Part::File("file", "q.wav", b"hello")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["stage"], "CONVERTED");
    assert_eq!(
        body["error"],
        "Failed to forward transcription to external API: HTTP 500: downstream broke"
    );
}

#[tokio::test]
async fn voice_to_voice_synthesis_failure_stops_at_extracted() {
    let (base, inbox) = start_downstream().await;

    // The downstream echoes the transcript, which the fake synthesizer refuses.
    let response = app(&format!("{base}/chat"))
        .oneshot(multipart(
            "/voice-to-voice/",
            &[Part::File("file", "q.wav", b"FAIL please")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["stage"], "EXTRACTED");
    assert_eq!(body["type"], "WORKFLOW_STAGE_FAILED");
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Failed to synthesize response"));
    assert!(error.contains("synthesis refused"));
    assert_eq!(inbox.lock().unwrap().len(), 1);
}
