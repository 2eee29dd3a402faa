//! Integration tests for the aggregator service client against a mock
//! HTTP server.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use feedgrid::service::{ApiClient, ApiError, ScrapeRequest};

async fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(Url::parse(&server.uri()).unwrap()).unwrap()
}

#[tokio::test]
async fn test_fetch_images_parses_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "src": "https://cdn.example.com/a.jpg",
                "alt": "a",
                "source": "example.com",
                "author": "ana",
                "sourceId": 7,
                "isFavorited": false
            },
            {
                "id": 2,
                "src": "https://cdn.example.com/b.jpg",
                "sourceId": null,
                "isFavorited": true
            }
        ])))
        .mount(&server)
        .await;

    let images = client_for(&server).await.fetch_images().await.unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].id, 1);
    assert_eq!(images[0].source_id, Some(7));
    assert_eq!(images[1].source_id, None);
    assert!(images[1].is_favorited);
}

#[tokio::test]
async fn test_fetch_sources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "example.com", "url": "https://example.com"}
        ])))
        .mount(&server)
        .await;

    let sources = client_for(&server).await.fetch_sources().await.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].name, "example.com");
}

#[tokio::test]
async fn test_set_favorite_posts_expected_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .and(body_json(json!({"imageId": 42, "favorite": true})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .await
        .set_favorite(42, true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_scrape_single_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/images/scrape"))
        .and(body_json(json!({"url": "https://example.com/gallery"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "newSource": {"id": 5, "name": "example.com", "url": "https://example.com/gallery"},
            "newImages": [
                {"id": 10, "src": "https://cdn.example.com/x.jpg", "sourceId": 5}
            ]
        })))
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .await
        .scrape(&ScrapeRequest::Single {
            url: "https://example.com/gallery".into(),
        })
        .await
        .unwrap();
    assert_eq!(outcome.new_source.id, 5);
    assert_eq!(outcome.new_images.len(), 1);
    assert_eq!(outcome.new_images[0].source_id, Some(5));
}

#[tokio::test]
async fn test_scrape_surfaces_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/images/scrape"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "no images found"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .scrape(&ScrapeRequest::Single {
            url: "https://example.com/empty".into(),
        })
        .await
        .unwrap_err();
    match err {
        ApiError::Rejected(message) => assert_eq!(message, "no images found"),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sync_source() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sources/3/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "newImages": [
                {"id": 11, "src": "https://cdn.example.com/n.jpg", "sourceId": 3}
            ]
        })))
        .mount(&server)
        .await;

    let outcome = client_for(&server).await.sync_source(3).await.unwrap();
    assert_eq!(outcome.new_images.len(), 1);
}

#[tokio::test]
async fn test_remove_source_maps_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/sources/9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).await.remove_source(9).await.unwrap_err();
    assert!(matches!(err, ApiError::Status(500)));
}

#[tokio::test]
async fn test_download_writes_file_named_from_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/download"))
        .and(query_param("url", "https://cdn.example.com/photos/cat.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let saved = client_for(&server)
        .await
        .download("https://cdn.example.com/photos/cat.jpg", dir.path())
        .await
        .unwrap();

    assert_eq!(saved.file_name().unwrap(), "cat.jpg");
    assert_eq!(std::fs::read(&saved).unwrap(), b"jpeg-bytes");
}
