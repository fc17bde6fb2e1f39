use super::*;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
struct RecordedField {
    name: String,
    filename: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
struct RecordedRequest {
    fields: Vec<RecordedField>,
}

impl RecordedRequest {
    fn field(&self, name: &str) -> Option<&RecordedField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Clone)]
enum MockResponse {
    Binary {
        content_disposition: Option<&'static str>,
        bytes: Vec<u8>,
    },
    PlainText(&'static str),
    JsonMessage(&'static str),
    ErrorJson {
        status: u16,
        error: &'static str,
    },
}

#[derive(Clone)]
struct MockServerState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    response: MockResponse,
}

async fn handle_upload(
    State(state): State<MockServerState>,
    mut multipart: Multipart,
) -> axum::response::Response {
    let mut recorded = RecordedRequest::default();
    while let Some(field) = multipart.next_field().await.expect("read multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(|name| name.to_string());
        let bytes = field.bytes().await.expect("field bytes").to_vec();
        recorded.fields.push(RecordedField {
            name,
            filename,
            bytes,
        });
    }
    state.requests.lock().await.push(recorded);

    match &state.response {
        MockResponse::Binary {
            content_disposition,
            bytes,
        } => {
            let mut response = bytes.clone().into_response();
            if let Some(value) = content_disposition {
                response.headers_mut().insert(
                    header::CONTENT_DISPOSITION,
                    value.parse().expect("header value"),
                );
            }
            response
        }
        MockResponse::PlainText(text) => (*text).to_string().into_response(),
        MockResponse::JsonMessage(message) => {
            Json(serde_json::json!({ "message": message })).into_response()
        }
        MockResponse::ErrorJson { status, error } => (
            StatusCode::from_u16(*status).expect("status"),
            Json(serde_json::json!({ "error": error })),
        )
            .into_response(),
    }
}

async fn spawn_stego_server(
    response: MockResponse,
) -> (String, Arc<Mutex<Vec<RecordedRequest>>>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockServerState {
        requests: Arc::clone(&requests),
        response,
    };
    let app = Router::new()
        .route(ENCODE_PATH, post(handle_upload))
        .route(DECODE_PATH, post(handle_upload))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), requests)
}

fn staged_cover() -> StagedFile {
    StagedFile::new(
        "cover.png",
        Some("image/png".to_string()),
        b"\x89PNG fake cover bytes".to_vec(),
    )
}

fn staged_stego() -> StagedFile {
    StagedFile::new(
        "stego.png",
        Some("image/png".to_string()),
        b"\x89PNG fake stego bytes".to_vec(),
    )
}

#[tokio::test]
async fn encode_posts_multipart_file_and_message() {
    let (server_url, requests) = spawn_stego_server(MockResponse::Binary {
        content_disposition: Some("attachment; filename=\"cover_encoded.png\""),
        bytes: b"encoded artifact".to_vec(),
    })
    .await;
    let client = StegoClient::new(&server_url).expect("client");

    let artifact = client
        .encode(&staged_cover(), "hello", None)
        .await
        .expect("encode");

    assert_eq!(artifact.filename, "cover_encoded.png");
    assert_eq!(artifact.bytes, b"encoded artifact".to_vec());

    let requests = requests.lock().await;
    assert_eq!(requests.len(), 1, "exactly one POST to /encode");
    let request = &requests[0];
    let file = request.field(FILE_FIELD).expect("file field");
    assert_eq!(file.filename.as_deref(), Some("cover.png"));
    assert_eq!(file.bytes, staged_cover().bytes);
    let message = request.field(MESSAGE_FIELD).expect("message field");
    assert_eq!(message.bytes, b"hello".to_vec());
    assert!(request.field(PASSWORD_FIELD).is_none());
}

#[tokio::test]
async fn encode_sends_password_field_when_set() {
    let (server_url, requests) = spawn_stego_server(MockResponse::Binary {
        content_disposition: None,
        bytes: b"encoded".to_vec(),
    })
    .await;
    let client = StegoClient::new(&server_url).expect("client");

    client
        .encode(&staged_cover(), "hello", Some("s3cret"))
        .await
        .expect("encode");

    let requests = requests.lock().await;
    let password = requests[0].field(PASSWORD_FIELD).expect("password field");
    assert_eq!(password.bytes, b"s3cret".to_vec());
}

#[tokio::test]
async fn encode_derives_artifact_name_when_header_is_absent() {
    let (server_url, _requests) = spawn_stego_server(MockResponse::Binary {
        content_disposition: None,
        bytes: b"encoded".to_vec(),
    })
    .await;
    let client = StegoClient::new(&server_url).expect("client");

    let artifact = client
        .encode(&staged_cover(), "hello", None)
        .await
        .expect("encode");

    assert_eq!(artifact.filename, "cover_encoded.png");
}

#[tokio::test]
async fn encode_surfaces_server_rejection() {
    let (server_url, _requests) = spawn_stego_server(MockResponse::ErrorJson {
        status: 400,
        error: "File and message are required!",
    })
    .await;
    let client = StegoClient::new(&server_url).expect("client");

    let err = client
        .encode(&staged_cover(), "hello", None)
        .await
        .expect_err("must fail");

    match err {
        StegoClientError::Rejected(rejection) => {
            assert_eq!(rejection.status, 400);
            assert_eq!(rejection.message, "File and message are required!");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn encode_rejects_empty_message_before_any_request() {
    let (server_url, requests) = spawn_stego_server(MockResponse::Binary {
        content_disposition: None,
        bytes: Vec::new(),
    })
    .await;
    let client = StegoClient::new(&server_url).expect("client");

    let err = client
        .encode(&staged_cover(), "   ", None)
        .await
        .expect_err("must fail");

    assert!(matches!(err, StegoClientError::EmptyMessage));
    assert!(requests.lock().await.is_empty(), "no request reached server");
}

#[tokio::test]
async fn encode_rejects_unsupported_cover_before_any_request() {
    let (server_url, requests) = spawn_stego_server(MockResponse::Binary {
        content_disposition: None,
        bytes: Vec::new(),
    })
    .await;
    let client = StegoClient::new(&server_url).expect("client");
    let staged = StagedFile::new("payload.exe", None, b"MZ".to_vec());

    let err = client
        .encode(&staged, "hello", None)
        .await
        .expect_err("must fail");

    assert!(matches!(err, StegoClientError::UnsupportedFormat { .. }));
    assert!(requests.lock().await.is_empty(), "no request reached server");
}

#[tokio::test]
async fn encode_rejects_unstaged_upload() {
    let client = StegoClient::new("http://127.0.0.1:1").expect("client");
    let staged = StagedFile::new("", None, Vec::new());

    let err = client
        .encode(&staged, "hello", None)
        .await
        .expect_err("must fail");

    assert!(matches!(err, StegoClientError::NoFileStaged));
}

#[tokio::test]
async fn decode_posts_single_file_field_and_returns_plaintext() {
    let (server_url, requests) = spawn_stego_server(MockResponse::PlainText("hello")).await;
    let client = StegoClient::new(&server_url).expect("client");

    let message = client
        .decode(&staged_stego(), None)
        .await
        .expect("decode");

    assert_eq!(message, "hello");
    let requests = requests.lock().await;
    assert_eq!(requests.len(), 1, "exactly one POST to /decode");
    let request = &requests[0];
    assert_eq!(request.fields.len(), 1);
    let file = request.field(FILE_FIELD).expect("file field");
    assert_eq!(file.filename.as_deref(), Some("stego.png"));
    assert_eq!(file.bytes, staged_stego().bytes);
}

#[tokio::test]
async fn decode_unwraps_json_message_envelope() {
    let (server_url, _requests) = spawn_stego_server(MockResponse::JsonMessage("hello")).await;
    let client = StegoClient::new(&server_url).expect("client");

    let message = client
        .decode(&staged_stego(), None)
        .await
        .expect("decode");

    assert_eq!(message, "hello");
}

#[tokio::test]
async fn decode_sends_password_field_when_set() {
    let (server_url, requests) = spawn_stego_server(MockResponse::PlainText("hello")).await;
    let client = StegoClient::new(&server_url).expect("client");

    client
        .decode(&staged_stego(), Some("s3cret"))
        .await
        .expect("decode");

    let requests = requests.lock().await;
    let password = requests[0].field(PASSWORD_FIELD).expect("password field");
    assert_eq!(password.bytes, b"s3cret".to_vec());
}

#[tokio::test]
async fn decode_surfaces_server_rejection() {
    let (server_url, _requests) = spawn_stego_server(MockResponse::ErrorJson {
        status: 500,
        error: "Failed to encode file!",
    })
    .await;
    let client = StegoClient::new(&server_url).expect("client");

    let err = client
        .decode(&staged_stego(), None)
        .await
        .expect_err("must fail");

    assert!(matches!(err, StegoClientError::Rejected(_)));
}

#[tokio::test]
async fn decode_surfaces_transport_failure() {
    // Bind then drop to get an address with nothing listening on it.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = StegoClient::new(&format!("http://{addr}")).expect("client");
    let err = client
        .decode(&staged_stego(), None)
        .await
        .expect_err("must fail");

    assert!(matches!(err, StegoClientError::Transport(_)));
}

#[test]
fn rejects_malformed_server_url() {
    let err = StegoClient::new("not a url").expect_err("must fail");
    assert!(matches!(err, StegoClientError::InvalidServerUrl(_)));
}

#[test]
fn normalizes_trailing_slash_in_server_url() {
    let client = StegoClient::new("http://127.0.0.1:5000/").expect("client");
    assert_eq!(client.server_url(), "http://127.0.0.1:5000");
}

#[test]
fn parses_quoted_and_bare_content_disposition_filenames() {
    assert_eq!(
        filename_from_content_disposition("attachment; filename=\"cover_encoded.png\""),
        Some("cover_encoded.png".to_string())
    );
    assert_eq!(
        filename_from_content_disposition("attachment; filename=cover_encoded.png"),
        Some("cover_encoded.png".to_string())
    );
    assert_eq!(filename_from_content_disposition("attachment"), None);
    assert_eq!(filename_from_content_disposition("attachment; filename=\"\""), None);
}

#[test]
fn derives_encoded_filename_like_the_server() {
    assert_eq!(encoded_filename("cover.png"), "cover_encoded.png");
    assert_eq!(encoded_filename("notes.tar.gz"), "notes_encoded.tar.gz");
    assert_eq!(encoded_filename("bare"), "bare_encoded");
}

#[test]
fn renders_non_envelope_decode_bodies_verbatim() {
    assert_eq!(extract_decoded_message("hello"), "hello");
    assert_eq!(extract_decoded_message("{\"foo\": 1}"), "{\"foo\": 1}");
    assert_eq!(
        extract_decoded_message("{\"message\": \"hello\"}"),
        "hello"
    );
    assert_eq!(extract_decoded_message(""), "");
}
