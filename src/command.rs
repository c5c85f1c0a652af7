//! Player commands sent to `POST /api/v1/command`.
//!
//! A command serializes to `{"command": "<name>", "data": <payload>}` where
//! the name is the variant name with its first character lowercased and
//! `data` is omitted for commands without a payload.

use serde::Serialize;

use crate::types::RepeatMode;

/// A player command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "data", rename_all = "camelCase")]
pub enum Command {
    PlayPause,
    Play,
    Pause,
    VolumeUp,
    VolumeDown,
    /// Volume level, 0-100.
    SetVolume(u32),
    Mute,
    Unmute,
    /// Position in seconds.
    SeekTo(u32),
    Next,
    Previous,
    RepeatMode(RepeatMode),
    Shuffle,
    PlayQueueIndex(u32),
    ToggleLike,
    ToggleDislike,
    ChangeVideo {
        #[serde(rename = "videoId")]
        video_id: Option<String>,
        #[serde(rename = "playlistId")]
        playlist_id: Option<String>,
    },
}

impl Command {
    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::PlayPause => "playPause",
            Command::Play => "play",
            Command::Pause => "pause",
            Command::VolumeUp => "volumeUp",
            Command::VolumeDown => "volumeDown",
            Command::SetVolume(_) => "setVolume",
            Command::Mute => "mute",
            Command::Unmute => "unmute",
            Command::SeekTo(_) => "seekTo",
            Command::Next => "next",
            Command::Previous => "previous",
            Command::RepeatMode(_) => "repeatMode",
            Command::Shuffle => "shuffle",
            Command::PlayQueueIndex(_) => "playQueueIndex",
            Command::ToggleLike => "toggleLike",
            Command::ToggleDislike => "toggleDislike",
            Command::ChangeVideo { .. } => "changeVideo",
        }
    }
}
