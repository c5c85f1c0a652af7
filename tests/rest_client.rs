//! REST client integration tests against a mock companion server.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytmd_companion::{CompanionConnector, Error, RepeatMode, RestClient, Settings, TrackState};

// ============================================================================
// Test Infrastructure
// ============================================================================

fn settings_for(server: &MockServer) -> Settings {
    Settings::new(
        "127.0.0.1",
        server.address().port(),
        "test-app",
        "Test App",
        "1.0.0",
    )
    .unwrap()
}

fn authorized_client(server: &MockServer) -> RestClient {
    RestClient::new(settings_for(server).with_token("secret-token"))
}

// ============================================================================
// Headers
// ============================================================================

#[tokio::test]
async fn authorized_calls_send_raw_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/command"))
        .and(header("authorization", "secret-token"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({"command": "playPause"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    client.play_pause().await.unwrap();
}

#[tokio::test]
async fn public_calls_send_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"apiVersions": ["v1"]})))
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    let metadata = client.get_metadata().await.unwrap();
    assert_eq!(metadata.api_versions, vec!["v1".to_string()]);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(
        requests[0].headers.get("accept").map(|v| v.as_bytes()),
        Some(&b"application/json"[..])
    );
}

#[tokio::test]
async fn token_rotation_is_seen_by_next_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/command"))
        .and(header("authorization", "rotated"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (connector, _events) =
        CompanionConnector::new(settings_for(&server).with_token("secret-token"));
    connector.set_auth_token("rotated");
    connector.rest().next().await.unwrap();
}

// ============================================================================
// Pairing
// ============================================================================

#[tokio::test]
async fn pairing_flow_returns_code_then_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/requestcode"))
        .and(body_json(json!({
            "appId": "test-app",
            "appName": "Test App",
            "appVersion": "1.0.0"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "1234"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/request"))
        .and(body_json(json!({"appId": "test-app", "code": "1234"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok"})))
        .mount(&server)
        .await;

    let client = RestClient::new(settings_for(&server));
    let code = client
        .get_auth_code("test-app", "Test App", "1.0.0")
        .await
        .unwrap();
    assert_eq!(code, "1234");
    let token = client.get_auth_token("test-app", &code).await.unwrap();
    assert_eq!(token, "tok");
}

#[tokio::test]
async fn pairing_validates_identity_before_sending() {
    let server = MockServer::start().await;
    let client = RestClient::new(settings_for(&server));

    let err = client
        .get_auth_code("Bad App", "Test App", "1.0.0")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { field: "app_id", .. }));

    let err = client.get_auth_code("test-app", "x", "1.0.0").await.unwrap_err();
    assert!(matches!(err, Error::Configuration { field: "app_name", .. }));

    let err = client
        .get_auth_code("test-app", "Test App", "banana")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { field: "app_version", .. }));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn forbidden_pairing_surfaces_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/requestcode"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "statusCode": 403,
            "code": "AUTHORIZATION_DISABLED",
            "error": "Forbidden",
            "message": "Authorization requests are disabled"
        })))
        .mount(&server)
        .await;

    let client = RestClient::new(settings_for(&server));
    let err = client
        .get_auth_code("test-app", "Test App", "1.0.0")
        .await
        .unwrap_err();
    let Error::Api(api) = &err else {
        panic!("Expected Api error, got {err:?}");
    };
    assert_eq!(api.status_code, Some(403));
    assert_eq!(api.code.as_deref(), Some("AUTHORIZATION_DISABLED"));
}

// ============================================================================
// Error mapping
// ============================================================================

#[tokio::test]
async fn error_status_with_plain_body_is_synthesized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/state"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    let err = client.get_state().await.unwrap_err();
    let api = err.api_error().expect("api error");
    assert_eq!(api.status_code, Some(500));
    assert_eq!(api.error.as_deref(), Some("Internal Server Error"));
    assert_eq!(api.message.as_deref(), Some("boom"));
}

#[tokio::test]
async fn success_status_with_complete_error_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/command"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 400,
            "code": "INVALID_COMMAND",
            "error": "Bad Request",
            "message": "Unknown command"
        })))
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    let err = client.shuffle().await.unwrap_err();
    assert!(matches!(&err, Error::Api(api) if api.status_code == Some(400)));
}

#[tokio::test]
async fn unreachable_server_is_a_request_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let settings = Settings::new("127.0.0.1", port, "test-app", "Test App", "1.0.0").unwrap();
    let client = RestClient::new(settings);

    let err = client.get_metadata().await.unwrap_err();
    let Error::Request { error, .. } = &err else {
        panic!("Expected Request error, got {err:?}");
    };
    assert_eq!(error.error.as_deref(), Some("Unknown Exception"));
    assert!(error.message.is_some());
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn empty_playlists_body_is_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/playlists"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    assert!(client.get_playlists().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_state_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/state"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  "))
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    let err = client.get_state().await.unwrap_err();
    assert!(matches!(err, Error::EmptyResponse { path: "/api/v1/state" }));
}

#[tokio::test]
async fn state_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "player": {
                "trackState": 2,
                "videoProgress": 30.0,
                "volume": 55,
                "adPlaying": false,
                "queue": {
                    "autoplay": true,
                    "items": [],
                    "automixItems": [],
                    "isGenerating": false,
                    "isInfinite": false,
                    "repeatMode": 1,
                    "selectedItemIndex": 0
                }
            },
            "video": null,
            "playlistId": null
        })))
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    let state = client.get_state().await.unwrap();
    assert_eq!(state.player.track_state, TrackState::Buffering);
    assert_eq!(
        state.player.queue.map(|q| q.repeat_mode),
        Some(RepeatMode::All)
    );
    assert!(state.video.is_none());
}

// ============================================================================
// Commands
// ============================================================================

#[tokio::test]
async fn commands_with_payload_send_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/command"))
        .and(body_json(json!({"command": "setVolume", "data": 42})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/command"))
        .and(body_json(json!({"command": "repeatMode", "data": 2})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    client.set_volume(42).await.unwrap();
    client.set_repeat_mode(RepeatMode::One).await.unwrap();
}

#[tokio::test]
async fn change_video_resolves_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/command"))
        .and(body_json(json!({
            "command": "changeVideo",
            "data": {"videoId": "dQw4w9WgXcQ", "playlistId": "PL123"}
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    client
        .change_video(
            Some("ignored"),
            None,
            Some("https://music.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn change_video_without_target_sends_nothing() {
    let server = MockServer::start().await;
    let client = authorized_client(&server);

    let err = client.change_video(None, Some(" "), None).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
