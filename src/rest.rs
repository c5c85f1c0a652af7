//! REST client for the companion server API.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, trace};
use url::Url;

use crate::command::Command;
use crate::config::{SharedSettings, validate_app_id, validate_app_name, validate_app_version};
use crate::endpoints;
use crate::error::ApiError;
use crate::types::{
    AuthCodeRequest, AuthCodeResponse, AuthTokenRequest, AuthTokenResponse, Metadata, Playlist,
    RepeatMode, State,
};
use crate::{Error, Result};

/// Whether a request carries the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Authorized,
}

/// Client for the companion server's request/response API.
///
/// Holds no per-call state; clones share the HTTP connection pool and the
/// settings handle, so calls may run concurrently.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    settings: SharedSettings,
}

impl RestClient {
    pub fn new(settings: impl Into<SharedSettings>) -> Self {
        Self::with_http_client(settings, Client::new())
    }

    /// Use a preconfigured `reqwest` client (timeouts, proxies).
    pub fn with_http_client(settings: impl Into<SharedSettings>, http: Client) -> Self {
        Self {
            http,
            settings: settings.into(),
        }
    }

    /// Read-only view of the settings used for each call.
    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    /// Fetch the server capability descriptor.
    #[instrument(skip_all)]
    pub async fn get_metadata(&self) -> Result<Metadata> {
        self.get(endpoints::METADATA, Access::Public)
            .await?
            .ok_or(Error::EmptyResponse {
                path: endpoints::METADATA,
            })
    }

    /// Request a pairing code that the user confirms in the companion app.
    #[instrument(skip_all, fields(app_id = app_id))]
    pub async fn get_auth_code(
        &self,
        app_id: &str,
        app_name: &str,
        app_version: &str,
    ) -> Result<String> {
        let app_id = validate_app_id(app_id.to_string())?;
        let app_name = validate_app_name(app_name.to_string())?;
        let app_version = validate_app_version(app_version.to_string())?;
        let body = AuthCodeRequest {
            app_id: &app_id,
            app_name: &app_name,
            app_version: &app_version,
        };
        let response: Option<AuthCodeResponse> = self
            .post(endpoints::AUTH_REQUEST_CODE, Access::Public, &body)
            .await?;
        response
            .map(|r| r.code)
            .ok_or(Error::EmptyResponse {
                path: endpoints::AUTH_REQUEST_CODE,
            })
    }

    /// Exchange a confirmed pairing code for a token.
    ///
    /// The token is returned, not stored; pass it to
    /// [`CompanionConnector::set_auth_token`](crate::CompanionConnector::set_auth_token).
    #[instrument(skip_all, fields(app_id = app_id))]
    pub async fn get_auth_token(&self, app_id: &str, code: &str) -> Result<String> {
        let app_id = validate_app_id(app_id.to_string())?;
        let body = AuthTokenRequest {
            app_id: &app_id,
            code,
        };
        let response: Option<AuthTokenResponse> = self
            .post(endpoints::AUTH_REQUEST, Access::Public, &body)
            .await?;
        response
            .map(|r| r.token)
            .ok_or(Error::EmptyResponse {
                path: endpoints::AUTH_REQUEST,
            })
    }

    #[instrument(skip_all)]
    pub async fn get_state(&self) -> Result<State> {
        self.get(endpoints::STATE, Access::Authorized)
            .await?
            .ok_or(Error::EmptyResponse {
                path: endpoints::STATE,
            })
    }

    /// List the user's playlists. An empty body yields an empty list.
    #[instrument(skip_all)]
    pub async fn get_playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self
            .get(endpoints::PLAYLISTS, Access::Authorized)
            .await?
            .unwrap_or_default())
    }

    /// Send any command to the player.
    #[instrument(skip_all, fields(command = command.name()))]
    pub async fn send_command(&self, command: Command) -> Result<()> {
        let _: Option<IgnoredAny> = self
            .post(endpoints::COMMAND, Access::Authorized, &command)
            .await?;
        Ok(())
    }

    pub async fn play_pause(&self) -> Result<()> {
        self.send_command(Command::PlayPause).await
    }

    pub async fn play(&self) -> Result<()> {
        self.send_command(Command::Play).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send_command(Command::Pause).await
    }

    pub async fn volume_up(&self) -> Result<()> {
        self.send_command(Command::VolumeUp).await
    }

    pub async fn volume_down(&self) -> Result<()> {
        self.send_command(Command::VolumeDown).await
    }

    /// Set the volume (0-100).
    pub async fn set_volume(&self, volume: u32) -> Result<()> {
        self.send_command(Command::SetVolume(volume)).await
    }

    pub async fn mute(&self) -> Result<()> {
        self.send_command(Command::Mute).await
    }

    pub async fn unmute(&self) -> Result<()> {
        self.send_command(Command::Unmute).await
    }

    /// Seek to a position in seconds.
    pub async fn seek_to(&self, seconds: u32) -> Result<()> {
        self.send_command(Command::SeekTo(seconds)).await
    }

    pub async fn next(&self) -> Result<()> {
        self.send_command(Command::Next).await
    }

    pub async fn previous(&self) -> Result<()> {
        self.send_command(Command::Previous).await
    }

    pub async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()> {
        self.send_command(Command::RepeatMode(mode)).await
    }

    pub async fn shuffle(&self) -> Result<()> {
        self.send_command(Command::Shuffle).await
    }

    pub async fn play_queue_index(&self, index: u32) -> Result<()> {
        self.send_command(Command::PlayQueueIndex(index)).await
    }

    pub async fn toggle_like(&self) -> Result<()> {
        self.send_command(Command::ToggleLike).await
    }

    pub async fn toggle_dislike(&self) -> Result<()> {
        self.send_command(Command::ToggleDislike).await
    }

    /// Play a video and/or playlist.
    ///
    /// When `url` is given, its `v` and `list` query parameters replace
    /// `video_id` and `playlist_id`. Fails with [`Error::Validation`] when
    /// nothing to play can be resolved.
    pub async fn change_video(
        &self,
        video_id: Option<&str>,
        playlist_id: Option<&str>,
        url: Option<&str>,
    ) -> Result<()> {
        let command = resolve_change_video(video_id, playlist_id, url)?;
        self.send_command(command).await
    }

    // --- Private helpers ---

    async fn get<T: DeserializeOwned>(
        &self,
        path: &'static str,
        access: Access,
    ) -> Result<Option<T>> {
        self.send(Method::GET, path, access, None).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &'static str,
        access: Access,
        body: &B,
    ) -> Result<Option<T>> {
        let body = serde_json::to_vec(body).map_err(|e| {
            Error::request(
                ApiError::client_side(format!("failed to build request body: {e}")),
                e,
            )
        })?;
        self.send(Method::POST, path, access, Some(body)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &'static str,
        access: Access,
        body: Option<Vec<u8>>,
    ) -> Result<Option<T>> {
        let settings = self.settings.snapshot();
        let url = format!("{}{}", settings.base_url(), path);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json");

        if access == Access::Authorized {
            match settings.token() {
                Some(token) => request = request.header(AUTHORIZATION, token),
                None => debug!(path, "No token set for authorized request"),
            }
        }

        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        debug!(%method, path, "Sending request");

        let response = request.send().await.map_err(|e| {
            let mut error = ApiError::client_side(e.to_string());
            error.status_code = e.status().map(|s| i32::from(s.as_u16()));
            Error::request(error, e)
        })?;

        let status = response.status();
        let content = response.text().await.map_err(|e| {
            let mut error = ApiError::client_side(e.to_string());
            error.status_code = Some(i32::from(status.as_u16()));
            Error::request(error, e)
        })?;

        trace!(status = status.as_u16(), bytes = content.len(), "Response received");
        decode_response(status, &content)
    }
}

/// Turn a status and body into a payload or an error.
///
/// The body shape wins over the status: a success response whose body is a
/// fully populated [`ApiError`] is still an error.
fn decode_response<T: DeserializeOwned>(status: StatusCode, content: &str) -> Result<Option<T>> {
    if !status.is_success() {
        let mut error = serde_json::from_str::<ApiError>(content).unwrap_or_else(|_| ApiError {
            status_code: None,
            code: None,
            error: Some(
                status
                    .canonical_reason()
                    .unwrap_or("Unknown Error")
                    .to_string(),
            ),
            message: (!content.trim().is_empty()).then(|| content.to_string()),
        });
        error.status_code = Some(i32::from(status.as_u16()));
        debug!(%error, "Request failed");
        return Err(Error::Api(error));
    }

    if content.trim().is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(content)?;
    if value.is_object()
        && let Ok(error) = ApiError::deserialize(&value)
        && error.is_complete()
    {
        debug!(%error, "Error body in success response");
        return Err(Error::Api(error));
    }

    Ok(Some(serde_json::from_value(value)?))
}

/// Resolve the target of a `changeVideo` command.
fn resolve_change_video(
    video_id: Option<&str>,
    playlist_id: Option<&str>,
    url: Option<&str>,
) -> Result<Command> {
    let url = url.filter(|u| !u.trim().is_empty());
    let mut video_id = video_id.map(str::to_string);
    let mut playlist_id = playlist_id.map(str::to_string);

    if let Some(url) = url {
        let parsed = Url::parse(url)
            .map_err(|e| Error::Validation(format!("invalid url {url:?}: {e}")))?;
        video_id = None;
        playlist_id = None;
        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "v" if video_id.is_none() => video_id = Some(value.into_owned()),
                "list" if playlist_id.is_none() => playlist_id = Some(value.into_owned()),
                _ => {}
            }
        }
    }

    let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
    if blank(&video_id) && blank(&playlist_id) && url.is_none() {
        return Err(Error::Validation(
            "videoId, playlistId and url cannot all be empty".to_string(),
        ));
    }

    Ok(Command::ChangeVideo {
        video_id,
        playlist_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change_video_target(command: Command) -> (Option<String>, Option<String>) {
        match command {
            Command::ChangeVideo {
                video_id,
                playlist_id,
            } => (video_id, playlist_id),
            other => panic!("Expected ChangeVideo, got {other:?}"),
        }
    }

    #[test]
    fn change_video_url_overrides_explicit_ids() {
        let cmd = resolve_change_video(
            Some("ignored"),
            Some("ignored"),
            Some("https://x/watch?v=ABC&list=XYZ"),
        )
        .unwrap();
        assert_eq!(
            change_video_target(cmd),
            (Some("ABC".into()), Some("XYZ".into()))
        );
    }

    #[test]
    fn change_video_url_without_params_clears_ids() {
        let cmd = resolve_change_video(Some("ignored"), None, Some("https://x/watch")).unwrap();
        assert_eq!(change_video_target(cmd), (None, None));
    }

    #[test]
    fn change_video_accepts_explicit_ids() {
        let cmd = resolve_change_video(None, Some("PL1"), None).unwrap();
        assert_eq!(change_video_target(cmd), (None, Some("PL1".into())));
    }

    #[test]
    fn change_video_requires_a_target() {
        assert!(matches!(
            resolve_change_video(None, None, None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            resolve_change_video(Some(" "), Some(""), Some("  ")),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            resolve_change_video(None, None, Some("not a url")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn decode_error_status_uses_server_body() {
        let body = r#"{"statusCode":403,"error":"Forbidden","message":"Authorization requests are disabled"}"#;
        let err = decode_response::<Value>(StatusCode::FORBIDDEN, body).unwrap_err();
        let Error::Api(api) = err else {
            panic!("Expected Api error");
        };
        assert_eq!(api.status_code, Some(403));
        assert_eq!(api.error.as_deref(), Some("Forbidden"));
        assert_eq!(
            api.message.as_deref(),
            Some("Authorization requests are disabled")
        );
        assert_eq!(api.code, None);
    }

    #[test]
    fn decode_error_status_synthesizes_from_reason() {
        let err = decode_response::<Value>(StatusCode::BAD_GATEWAY, "<html>oops</html>").unwrap_err();
        let api = err.api_error().unwrap();
        assert_eq!(api.status_code, Some(502));
        assert_eq!(api.error.as_deref(), Some("Bad Gateway"));
        assert_eq!(api.message.as_deref(), Some("<html>oops</html>"));
    }

    #[test]
    fn decode_error_status_forces_transport_status() {
        let body = r#"{"statusCode":200,"error":"Unauthorized","message":"nope"}"#;
        let err = decode_response::<Value>(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert_eq!(err.api_error().unwrap().status_code, Some(401));
    }

    #[test]
    fn decode_success_with_complete_error_body_is_error() {
        let body = r#"{"statusCode":403,"code":"AUTHORIZATION_DISABLED","error":"Forbidden","message":"disabled"}"#;
        let err = decode_response::<Value>(StatusCode::OK, body).unwrap_err();
        assert_eq!(
            err.api_error().unwrap().code.as_deref(),
            Some("AUTHORIZATION_DISABLED")
        );
    }

    #[test]
    fn decode_success_with_partial_error_shape_is_payload() {
        let body = r#"{"statusCode":200,"error":null,"message":"ok","code":"X"}"#;
        let value = decode_response::<Value>(StatusCode::OK, body).unwrap();
        assert!(value.is_some());
    }

    #[test]
    fn decode_empty_success_is_absent() {
        assert!(decode_response::<Metadata>(StatusCode::NO_CONTENT, "").unwrap().is_none());
        assert!(decode_response::<Metadata>(StatusCode::OK, "  \n").unwrap().is_none());
    }

    #[test]
    fn decode_non_json_success_is_decode_error() {
        assert!(matches!(
            decode_response::<Metadata>(StatusCode::OK, "hello"),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn decode_playlists_array() {
        let body = r#"[{"id":"PL1","title":"Liked"},{"id":"PL2","title":"Mix"}]"#;
        let playlists = decode_response::<Vec<Playlist>>(StatusCode::OK, body)
            .unwrap()
            .unwrap();
        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[1].title, "Mix");
    }
}
