//! NetworkClient behaviour against a local mock API
//!
//! Opt-in: `cargo test --features http-tests --test network`

use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use photoop::ErrorKind;
use photoop::auth::{ConsumerKey, Credential};
use photoop::client::models::PhotoInfoEnvelope;
use photoop::client::{
    ApiEndpoints, FilePart, JsonDecoder, NetworkClient, RequestSpec, ScalarXmlDecoder, TextDecoder,
    VoidDecoder,
};
use photoop::completion::CompletionContext;
use photoop::error::{Error, TransportError};

fn client(host: &str, credential: Option<Credential>) -> NetworkClient {
    NetworkClient::new(
        ConsumerKey::new("consumer", "consumer-secret"),
        ApiEndpoints::with_host(host),
        Arc::new(credential),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn signed_in() -> Option<Credential> {
    Some(Credential::new("tok", "tok-secret", "12345@N00"))
}

const PHOTO_INFO: &str = r#"{
    "photo": {
        "id": "42", "secret": "abc", "server": "7",
        "owner": {"nsid": "12345@N00", "username": "alice"},
        "title": {"_content": "Sunset"},
        "description": {"_content": ""},
        "visibility": {"ispublic": 1, "isfriend": 0, "isfamily": 0},
        "dates": {"posted": "1700000000", "taken": "2023-11-14 22:13:20"},
        "views": "3"
    },
    "stat": "ok"
}"#;

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[tokio::test]
async fn signed_get_decodes_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/services/rest")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("method".into(), "flickr.photos.getInfo".into()),
            Matcher::UrlEncoded("photo_id".into(), "42".into()),
            Matcher::UrlEncoded("api_key".into(), "consumer".into()),
            Matcher::UrlEncoded("format".into(), "json".into()),
            Matcher::UrlEncoded("nojsoncallback".into(), "1".into()),
            Matcher::UrlEncoded("oauth_token".into(), "tok".into()),
            Matcher::UrlEncoded("oauth_signature_method".into(), "HMAC-SHA1".into()),
            Matcher::Regex("oauth_signature=".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PHOTO_INFO)
        .create_async()
        .await;

    let spec = RequestSpec::rest("flickr.photos.getInfo").param("photo_id", "42");
    let info = client(&server.url(), signed_in())
        .request(&spec, &JsonDecoder::<PhotoInfoEnvelope>::new())
        .await
        .unwrap();

    assert_eq!(info.photo.id, "42");
    assert_eq!(info.photo.title.content, "Sunset");
    mock.assert_async().await;
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[tokio::test]
async fn anonymous_call_is_not_signed() {
    let mut server = mockito::Server::new_async().await;
    let _signed = server
        .mock("GET", "/services/rest")
        .match_query(Matcher::Regex("oauth_".into()))
        .with_status(401)
        .expect(0)
        .create_async()
        .await;
    let plain = server
        .mock("GET", "/services/rest")
        .match_query(Matcher::UrlEncoded("method".into(), "flickr.test.echo".into()))
        .with_status(200)
        .with_body("echo")
        .create_async()
        .await;

    let spec = RequestSpec::rest("flickr.test.echo").anonymous();
    let body = client(&server.url(), None)
        .request(&spec, &TextDecoder)
        .await
        .unwrap();

    assert_eq!(body, "echo");
    plain.assert_async().await;
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[tokio::test]
async fn post_sends_form_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/services/rest")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("method=flickr.photos.delete".into()),
            Matcher::Regex("photo_id=42".into()),
            Matcher::Regex("oauth_signature=".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"stat":"ok"}"#)
        .create_async()
        .await;

    let spec = RequestSpec::rest("flickr.photos.delete")
        .param("photo_id", "42")
        .post();
    client(&server.url(), signed_in())
        .request(&spec, &VoidDecoder)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[tokio::test]
async fn server_error_short_circuits_decoder() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/services/rest")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let spec = RequestSpec::rest("flickr.photos.getInfo");
    let err = client(&server.url(), signed_in())
        .request(&spec, &JsonDecoder::<PhotoInfoEnvelope>::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(err, Error::Transport(TransportError::ServerError(ref m)) if m == "boom"));
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[tokio::test]
async fn rate_limit_reports_retry_after() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/services/rest")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("retry-after", "7")
        .create_async()
        .await;

    let spec = RequestSpec::rest("flickr.photos.search");
    let err = client(&server.url(), signed_in())
        .request(&spec, &VoidDecoder)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Transport(TransportError::RateLimit(d)) if d == Duration::from_secs(7)
    ));
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[tokio::test]
async fn schema_mismatch_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/services/rest")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"unexpected": true}"#)
        .create_async()
        .await;

    let spec = RequestSpec::rest("flickr.photos.getInfo");
    let err = client(&server.url(), signed_in())
        .request(&spec, &JsonDecoder::<PhotoInfoEnvelope>::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains("PhotoInfoEnvelope"));
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[tokio::test]
async fn api_failure_envelope_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/services/rest")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"stat":"fail","code":1,"message":"Photo \"9\" not found"}"#)
        .create_async()
        .await;

    let spec = RequestSpec::rest("flickr.photos.getInfo").param("photo_id", "9");
    let err = client(&server.url(), signed_in())
        .request(&spec, &JsonDecoder::<PhotoInfoEnvelope>::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains("API error 1"));
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[tokio::test]
async fn upload_sends_multipart_and_reads_photo_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/services/upload/")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=photoop-[A-Za-z0-9]+$".into()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="title"\r\n\r\nBeach\r\n"#.into()),
            Matcher::Regex(r#"name="oauth_signature""#.into()),
            Matcher::Regex(r#"name="photo"; filename="beach.jpg"\r\nContent-Type: image/jpeg"#.into()),
        ]))
        .with_status(200)
        .with_body(r#"<?xml version="1.0" encoding="utf-8" ?><rsp stat="ok"><photoid>123</photoid></rsp>"#)
        .create_async()
        .await;

    let fields = vec![("title".to_string(), "Beach".to_string())];
    let file = FilePart::new("beach.jpg", "image/jpeg", b"jpeg-bytes".to_vec());
    let photo_id = client(&server.url(), signed_in())
        .upload(&fields, file, &ScalarXmlDecoder::photo_id())
        .await
        .unwrap();

    assert_eq!(photo_id, "123");
    mock.assert_async().await;
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[tokio::test]
async fn replace_targets_replace_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/services/replace/")
        .match_body(Matcher::Regex(r#"name="photo_id"\r\n\r\n42\r\n"#.into()))
        .with_status(200)
        .with_body(r#"<rsp stat="ok"><photoid secret="s">42</photoid></rsp>"#)
        .create_async()
        .await;

    let photo_id = client(&server.url(), signed_in())
        .replace("42", FilePart::jpeg(vec![0xff, 0xd8]), &ScalarXmlDecoder::photo_id())
        .await
        .unwrap();

    assert_eq!(photo_id, "42");
    mock.assert_async().await;
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[tokio::test]
async fn missing_credential_sends_unsigned_and_reports_401() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/services/rest")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("method".into(), "flickr.people.getPhotos".into()),
            Matcher::UrlEncoded("api_key".into(), "consumer".into()),
        ]))
        .with_status(401)
        .create_async()
        .await;
    let _signed = server
        .mock("GET", "/services/rest")
        .match_query(Matcher::Regex("oauth_signature".into()))
        .expect(0)
        .create_async()
        .await;

    let spec = RequestSpec::rest("flickr.people.getPhotos");
    let err = client(&server.url(), None)
        .request(&spec, &VoidDecoder)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(TransportError::Unauthorized)));
    mock.assert_async().await;
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[tokio::test]
async fn upload_without_credential_is_sent_unsigned() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/services/upload/")
        .match_body(Matcher::Regex(r#"name="photo"; filename="photo.jpg""#.into()))
        .with_status(401)
        .create_async()
        .await;

    let err = client(&server.url(), None)
        .upload(&[], FilePart::jpeg(vec![1, 2, 3]), &ScalarXmlDecoder::photo_id())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(TransportError::Unauthorized)));
    mock.assert_async().await;
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[tokio::test]
async fn completions_arrive_on_one_context() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/services/rest")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("ok")
        .expect(3)
        .create_async()
        .await;

    let client = Arc::new(client(&server.url(), None));
    let (context, mut queue) = CompletionContext::channel();
    let results = Arc::new(std::sync::Mutex::new(Vec::new()));

    for i in 0..3 {
        let results = Arc::clone(&results);
        let spec = RequestSpec::rest("flickr.test.echo")
            .param("n", i.to_string())
            .anonymous();
        client.request_with_completion(spec, TextDecoder, &context, move |outcome| {
            results
                .lock()
                .unwrap()
                .push((outcome.unwrap(), std::thread::current().id()));
        });
    }

    for _ in 0..3 {
        assert!(queue.run_next().await);
    }

    let results = results.lock().unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|(body, _)| body == "ok"));
    assert!(results.iter().all(|(_, id)| *id == std::thread::current().id()));
}
