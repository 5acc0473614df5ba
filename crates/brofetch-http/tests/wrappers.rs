use brofetch_http::{ClientError, ClientOptions, Content, FormValue, HttpClient, JsonBody, Method};
use brofetch_test_utils::TestHttpServer;
use serde_json::json;

fn client() -> HttpClient {
    HttpClient::with_options(ClientOptions {
        timeout_ms: 2000,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_ask_json_round_trip() {
    let server = TestHttpServer::start().await;
    server.echo("/echo").await;

    let mut client = client();
    let answer = client
        .ask_json(
            &server.url_for("/echo"),
            Method::POST,
            Some(JsonBody::from(json!({"a": 1}))),
        )
        .await
        .unwrap();

    assert_eq!(answer.status, 200);
    assert_eq!(answer.res.content, Some(Content::Json(json!({"a": 1}))));

    let headers = client.get_req_headers();
    assert_eq!(headers.get("accept").map(String::as_str), Some("application/json"));
    assert_eq!(
        headers.get("content-type").map(String::as_str),
        Some("application/json; charset=utf-8")
    );
}

#[tokio::test]
async fn test_ask_json_accepts_json_string_body() {
    let server = TestHttpServer::start().await;
    server.echo("/echo").await;

    let mut client = client();
    let answer = client
        .ask_json(&server.url_for("/echo"), Method::POST, Some(r#"{"b": [1, 2]}"#.into()))
        .await
        .unwrap();

    assert_eq!(answer.json(), Some(&json!({"b": [1, 2]})));
}

#[tokio::test]
async fn test_ask_json_rejects_bad_body_before_sending() {
    let server = TestHttpServer::start().await;
    server.echo("/echo").await;

    let mut client = client();
    let result = client
        .ask_json(&server.url_for("/echo"), Method::POST, Some("{bad json".into()))
        .await;

    assert!(matches!(result, Err(ClientError::InvalidRequestJson(_))));
    assert!(server.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_ask_json_rejects_non_json_response() {
    let server = TestHttpServer::start().await;
    server.text("/page", 200, "<html></html>").await;

    let mut client = client();
    let result = client.ask_json(&server.url_for("/page"), Method::GET, None).await;

    match result {
        Err(ClientError::InvalidResponseJson { status, body, .. }) => {
            assert_eq!(status, 200);
            assert_eq!(body, "<html></html>");
        }
        other => panic!("expected InvalidResponseJson, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ask_json_get() {
    let server = TestHttpServer::start().await;
    server
        .get_json("/todos/1", &json!({"id": 1, "completed": false}))
        .await;

    let mut client = client();
    let answer = client
        .ask_json(&server.url_for("/todos/1"), Method::GET, None)
        .await
        .unwrap();

    assert_eq!(answer.json().unwrap()["id"], 1);
}

#[tokio::test]
async fn test_ask_json_transport_failure_is_not_an_error() {
    let mut client = client();
    let answer = client
        .ask_json("http://127.0.0.1:1/", Method::GET, None)
        .await
        .unwrap();

    assert_eq!(answer.status, 400);
    assert!(answer.res.content.is_none());
}

#[tokio::test]
async fn test_ask_html_and_js_presets() {
    let server = TestHttpServer::start().await;
    server.echo_headers("/page.html").await;
    server.echo_headers("/app.js").await;

    let mut client = client();

    let answer = client.ask_html(&server.url_for("/page.html")).await;
    assert_eq!(answer.request_method, "GET");
    let seen: serde_json::Value = serde_json::from_str(answer.text().unwrap()).unwrap();
    assert_eq!(seen["accept"], "text/html");
    assert_eq!(seen["content-type"], "text/html");

    let answer = client.ask_js(&server.url_for("/app.js")).await;
    let seen: serde_json::Value = serde_json::from_str(answer.text().unwrap()).unwrap();
    assert_eq!(seen["accept"], "application/javascript");
    assert_eq!(seen["content-type"], "application/javascript; charset=utf-8");
}

#[tokio::test]
async fn test_send_form_data_posts_multipart() {
    let server = TestHttpServer::start().await;
    server.echo_headers("/upload").await;

    let mut client = client();
    client.set_req_header("content-type", "application/json");

    let mut form = client.object_to_form_data([("name", "Ana"), ("city", "Split")]);
    form.set("avatar", FormValue::file("a.png", vec![137, 80, 78, 71]).with_mime("image/png"));

    let answer = client.send_form_data(&server.url_for("/upload"), &form).await;

    assert_eq!(answer.status, 200);
    assert_eq!(answer.request_method, "POST");
    let seen = answer.json().expect("headers echoed as JSON");
    assert!(seen["content-type"]
        .as_str()
        .unwrap()
        .starts_with("multipart/form-data; boundary="));
    assert_eq!(seen["accept"], "*/*");
    assert!(!client.get_req_headers().contains_key("content-type"));

    let received = server.received_requests().await;
    let body = String::from_utf8_lossy(&received[0].body);
    assert!(body.contains(r#"name="city""#));
    assert!(body.contains("Split"));
    assert!(body.contains(r#"filename="a.png""#));
}

#[tokio::test]
async fn test_send_form_data_keeps_non_json_response() {
    let server = TestHttpServer::start().await;
    server.text("/upload", 201, "stored").await;

    let mut client = client();
    let form = client.object_to_form_data([("k", "v")]);
    let answer = client.send_form_data(&server.url_for("/upload"), &form).await;

    assert_eq!(answer.status, 201);
    assert_eq!(answer.res.content, Some(Content::Text("stored".to_string())));
}
