//! End-to-end tests against a single-shot local HTTP stub.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rstest::rstest;
use swipe_core::test_support::SequenceSource;
use swipe_core::{CapturedImage, ClassifierError, ClassifierFactory, classify_attributes};
use swipe_gemini::{CredentialPool, GeminiClassifierFactory, GeminiConfig};

/// Request as seen by the stub.
struct Captured {
    request_line: String,
    api_key: Option<String>,
    body: String,
}

/// Serve one request with `status` and `body`, returning the base URL and a
/// receiver for what the client sent.
fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    let address = listener.local_addr().expect("local address");
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("request line");
        let mut api_key = None;
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("header line");
            let header = line.trim_end();
            if header.is_empty() {
                break;
            }
            let Some((name, value)) = header.split_once(':') else {
                continue;
            };
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().expect("length"),
                "x-goog-api-key" => api_key = Some(value.trim().to_owned()),
                _ => {}
            }
        }
        let mut raw_body = vec![0; content_length];
        reader.read_exact(&mut raw_body).expect("request body");

        write!(
            stream,
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
        .expect("write response");
        stream.flush().expect("flush response");

        sender
            .send(Captured {
                request_line: request_line.trim_end().to_owned(),
                api_key,
                body: String::from_utf8(raw_body).expect("utf8 body"),
            })
            .expect("report request");
    });
    (format!("http://{address}"), receiver)
}

fn factory(base_url: &str) -> GeminiClassifierFactory<SequenceSource> {
    GeminiClassifierFactory::with_random(
        GeminiConfig::default()
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(5)),
        CredentialPool::new(["key-a", "key-b"]).expect("pool"),
        SequenceSource::new([0.75]),
    )
    .expect("factory should build")
}

#[rstest]
fn fenced_json_is_parsed_into_attributes() {
    let (base_url, requests) = serve_once(
        "200 OK",
        r#"{"candidates":[{"content":{"parts":[{"text":"```json\n{\"Age\": 25, \"interest\": [\"travel\", \"food\"]}\n```"}]}}]}"#,
    );
    let mut factory = factory(&base_url);
    let classifier = factory.create().expect("classifier");

    let attributes = classify_attributes(
        classifier.as_ref(),
        "describe",
        &CapturedImage::new(vec![0x89, b'P', b'N', b'G']),
    )
    .expect("attributes");

    assert_eq!(attributes.get("age"), Some("25"));
    assert_eq!(attributes.get("interest"), Some("travel, food"));

    let request = requests.recv().expect("captured request");
    assert_eq!(
        request.request_line,
        "POST /v1beta/models/gemini-1.5-flash:generateContent HTTP/1.1"
    );
    assert_eq!(request.api_key.as_deref(), Some("key-b"));
    let body: serde_json::Value = serde_json::from_str(&request.body).expect("json body");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "describe");
    assert_eq!(
        body["contents"][0]["parts"][1]["inline_data"]["mime_type"],
        "image/png"
    );
}

#[rstest]
fn error_statuses_carry_the_service_message() {
    let (base_url, _requests) = serve_once(
        "429 Too Many Requests",
        r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#,
    );
    let mut factory = factory(&base_url);
    let classifier = factory.create().expect("classifier");

    let err = classifier
        .classify("describe", &CapturedImage::new(vec![1]))
        .expect_err("http error");

    assert_eq!(
        err,
        ClassifierError::Http {
            status: 429,
            message: "RESOURCE_EXHAUSTED: Quota exceeded".to_owned(),
        }
    );
}

#[rstest]
fn candidates_without_text_are_empty_responses() {
    let (base_url, _requests) =
        serve_once("200 OK", r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
    let mut factory = factory(&base_url);
    let classifier = factory.create().expect("classifier");

    let err = classifier
        .classify("describe", &CapturedImage::new(vec![1]))
        .expect_err("empty response");

    assert_eq!(err, ClassifierError::EmptyResponse);
}

#[rstest]
fn unreachable_hosts_are_transport_errors() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let address = listener.local_addr().expect("address");
    drop(listener);
    let mut factory = factory(&format!("http://{address}"));
    let classifier = factory.create().expect("classifier");

    let err = classifier
        .classify("describe", &CapturedImage::new(vec![1]))
        .expect_err("connection refused");

    assert!(matches!(err, ClassifierError::Transport { .. }));
}
