//! Payloads exchanged with the companion server.

use serde::{Deserialize, Serialize};

/// Server capability descriptor from `GET /metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub api_versions: Vec<String>,
}

/// Body of `POST /api/v1/auth/requestcode`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthCodeRequest<'a> {
    pub app_id: &'a str,
    pub app_name: &'a str,
    pub app_version: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthCodeResponse {
    pub code: String,
}

/// Body of `POST /api/v1/auth/request`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthTokenRequest<'a> {
    pub app_id: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthTokenResponse {
    pub token: String,
}

/// Playback state of the current track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum TrackState {
    #[default]
    Unknown,
    Paused,
    Playing,
    Buffering,
}

impl From<i32> for TrackState {
    fn from(value: i32) -> Self {
        match value {
            0 => TrackState::Paused,
            1 => TrackState::Playing,
            2 => TrackState::Buffering,
            _ => TrackState::Unknown,
        }
    }
}

impl From<TrackState> for i32 {
    fn from(value: TrackState) -> Self {
        match value {
            TrackState::Unknown => -1,
            TrackState::Paused => 0,
            TrackState::Playing => 1,
            TrackState::Buffering => 2,
        }
    }
}

/// Queue repeat mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum RepeatMode {
    #[default]
    Unknown,
    None,
    All,
    One,
}

impl From<i32> for RepeatMode {
    fn from(value: i32) -> Self {
        match value {
            0 => RepeatMode::None,
            1 => RepeatMode::All,
            2 => RepeatMode::One,
            _ => RepeatMode::Unknown,
        }
    }
}

impl From<RepeatMode> for i32 {
    fn from(value: RepeatMode) -> Self {
        match value {
            RepeatMode::Unknown => -1,
            RepeatMode::None => 0,
            RepeatMode::All => 1,
            RepeatMode::One => 2,
        }
    }
}

/// Like status of the current video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum LikeStatus {
    #[default]
    Unknown,
    Dislike,
    Indifferent,
    Like,
}

impl From<i32> for LikeStatus {
    fn from(value: i32) -> Self {
        match value {
            0 => LikeStatus::Dislike,
            1 => LikeStatus::Indifferent,
            2 => LikeStatus::Like,
            _ => LikeStatus::Unknown,
        }
    }
}

impl From<LikeStatus> for i32 {
    fn from(value: LikeStatus) -> Self {
        match value {
            LikeStatus::Unknown => -1,
            LikeStatus::Dislike => 0,
            LikeStatus::Indifferent => 1,
            LikeStatus::Like => 2,
        }
    }
}

/// Player and video state, from `GET /api/v1/state` or a `state-update` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub player: Player,
    #[serde(default)]
    pub video: Option<Video>,
    #[serde(default)]
    pub playlist_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(default)]
    pub track_state: TrackState,
    #[serde(default)]
    pub video_progress: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub ad_playing: bool,
    #[serde(default)]
    pub queue: Option<Queue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Queue {
    #[serde(default)]
    pub autoplay: bool,
    pub items: Vec<QueueItem>,
    #[serde(default)]
    pub automix_items: Vec<QueueItem>,
    #[serde(default)]
    pub is_generating: bool,
    #[serde(default)]
    pub is_infinite: bool,
    #[serde(default)]
    pub repeat_mode: RepeatMode,
    #[serde(default)]
    pub selected_item_index: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub thumbnails: Vec<Thumbnail>,
    pub title: String,
    pub author: String,
    pub duration: String,
    #[serde(default)]
    pub selected: bool,
    pub video_id: String,
    #[serde(default)]
    pub counterparts: Option<Vec<QueueItem>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub author: String,
    pub channel_id: String,
    pub title: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub album_id: Option<String>,
    #[serde(default)]
    pub like_status: Option<LikeStatus>,
    pub thumbnails: Vec<Thumbnail>,
    pub duration_seconds: u32,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// A user playlist.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub title: String,
}
