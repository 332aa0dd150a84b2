use base64::Engine as _;
use photopoem::{
    ai::{MockPoemClient, PoemService},
    app::App,
    models::{CanonicalImage, LocalFile, PoemRequest},
    normalize::{normalize_local_file, RemoteImageFetcher},
    track::ResultSlot,
};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn test_app(poem: MockPoemClient) -> App {
    App::with_services(
        RemoteImageFetcher::new(Duration::from_secs(5)),
        Box::new(poem),
    )
}

#[tokio::test]
async fn test_full_workflow_from_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sunset.png");
    std::fs::write(&path, PNG_BYTES).unwrap();

    let app = test_app(
        MockPoemClient::new().with_poem_response("The sun folds into the sea".to_string()),
    );

    let poem = app.poem_from_file(&path).await.unwrap();
    assert_eq!(poem, "The sun folds into the sea");
    assert_eq!(app.latest_poem(), Some(poem));
}

#[tokio::test]
async fn test_full_workflow_from_remote_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sunset.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(vec![0xFFu8, 0xD8, 0xFF, 0xE0]),
        )
        .mount(&server)
        .await;

    let app = test_app(MockPoemClient::new().with_poem_response("Amber light".to_string()));

    let poem = app
        .poem_from_url(&format!("{}/sunset.jpg", server.uri()))
        .await
        .unwrap();
    assert_eq!(poem, "Amber light");
}

#[tokio::test]
async fn test_remote_failure_surfaces_message_and_leaves_no_poem() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let app = test_app(MockPoemClient::new());

    let err = app
        .poem_from_url(&format!("{}/page", server.uri()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("text/html"));
    assert_eq!(app.latest_poem(), None);
}

#[tokio::test]
async fn test_normalizer_output_feeds_generator_contract() {
    let source = LocalFile {
        bytes: PNG_BYTES.to_vec(),
        declared_mime_type: "image/png".to_string(),
        byte_size: PNG_BYTES.len() as u64,
    };

    let conversion = normalize_local_file(&source);
    assert!(conversion.success);
    let image = conversion.canonical_image.unwrap();

    // The canonical payload round-trips through the wire format the
    // generator validates.
    let parsed = CanonicalImage::from_data_uri(&image.data_uri()).unwrap();
    assert_eq!(parsed, image);
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(&parsed.base64_body)
        .unwrap();
    assert_eq!(decoded, PNG_BYTES);

    let client = MockPoemClient::new().with_poem_response("verse".to_string());
    let response = client
        .generate_poem(&PoemRequest {
            photo_data_uri: image.data_uri(),
        })
        .await
        .unwrap();
    assert_eq!(response.poem, "verse");
    assert_eq!(client.get_call_count(), 1);
}

#[tokio::test]
async fn test_concurrent_generations_are_independent() {
    let client = MockPoemClient::new()
        .with_poem_response("one".to_string())
        .with_poem_response("two".to_string());

    let request = PoemRequest {
        photo_data_uri: "data:image/png;base64,Zm9v".to_string(),
    };

    let (a, b) = tokio::join!(
        client.generate_poem(&request),
        client.generate_poem(&request)
    );

    let mut poems = vec![a.unwrap().poem, b.unwrap().poem];
    poems.sort();
    assert_eq!(poems, vec!["one".to_string(), "two".to_string()]);
    assert_eq!(client.get_call_count(), 2);
}

#[tokio::test]
async fn test_stale_completion_is_discarded() {
    let slot = ResultSlot::new();

    // A slow URL fetch is initiated first, then a fast file upload.
    let slow_fetch = slot.begin();
    let fast_upload = slot.begin();

    assert!(slot.complete(fast_upload, "poem for the upload".to_string()));
    assert!(!slot.complete(slow_fetch, "poem for the stale fetch".to_string()));

    assert_eq!(slot.current(), Some("poem for the upload".to_string()));
}
