//! Events delivered by the realtime client.

use serde_json::Value;

use crate::Error;
use crate::types::{Playlist, State};

/// Server event carrying a full player state snapshot.
pub const STATE_UPDATE: &str = "state-update";
/// Server event carrying a newly created playlist.
pub const PLAYLIST_CREATED: &str = "playlist-created";
/// Server event carrying the id of a deleted playlist.
pub const PLAYLIST_DELETE: &str = "playlist-delete";

/// Server events the realtime client listens for.
pub(crate) const SUBSCRIBED: [&str; 3] = [STATE_UPDATE, PLAYLIST_CREATED, PLAYLIST_DELETE];

/// Lifecycle of the realtime connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    Connecting,
    Connected,
    #[default]
    Disconnected,
    Error,
}

/// Events from a [`SocketClient`](crate::SocketClient).
///
/// # Example
///
/// ```ignore
/// while let Some(event) = events.recv().await {
///     match event {
///         SocketEvent::ConnectionChanged(state) => println!("{state:?}"),
///         SocketEvent::StateUpdate(state) => println!("volume {}", state.player.volume),
///         SocketEvent::Error(e) => eprintln!("{e}"),
///         _ => {}
///     }
/// }
/// ```
#[derive(Debug)]
pub enum SocketEvent {
    ConnectionChanged(ConnectionState),

    /// Connection failure or an event payload that failed to decode.
    Error(Error),

    StateUpdate(Box<State>),

    PlaylistCreated(Playlist),

    /// Id of the deleted playlist.
    PlaylistDeleted(String),
}

impl SocketEvent {
    /// Decode a named server event. Returns `None` for names we don't handle.
    pub(crate) fn decode(name: &str, payload: Option<Value>) -> Option<Result<Self, Error>> {
        let payload = payload.unwrap_or(Value::Null);
        let event = match name {
            STATE_UPDATE => serde_json::from_value(payload)
                .map(|state| SocketEvent::StateUpdate(Box::new(state))),
            PLAYLIST_CREATED => serde_json::from_value(payload).map(SocketEvent::PlaylistCreated),
            PLAYLIST_DELETE => serde_json::from_value(payload).map(SocketEvent::PlaylistDeleted),
            _ => return None,
        };
        Some(event.map_err(Error::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_playlist_events() {
        let created = SocketEvent::decode(
            PLAYLIST_CREATED,
            Some(json!({"id": "PL1", "title": "Road trip"})),
        );
        let Some(Ok(SocketEvent::PlaylistCreated(playlist))) = created else {
            panic!("Expected PlaylistCreated, got {created:?}");
        };
        assert_eq!(playlist.id, "PL1");
        assert_eq!(playlist.title, "Road trip");

        let deleted = SocketEvent::decode(PLAYLIST_DELETE, Some(json!("PL1")));
        assert!(matches!(deleted, Some(Ok(SocketEvent::PlaylistDeleted(id))) if id == "PL1"));
    }

    #[test]
    fn decode_state_update() {
        let payload = json!({
            "player": {
                "trackState": 1,
                "videoProgress": 12.5,
                "volume": 40,
                "adPlaying": false,
                "queue": null
            },
            "video": null,
            "playlistId": "PL1"
        });
        let Some(Ok(SocketEvent::StateUpdate(state))) = SocketEvent::decode(STATE_UPDATE, Some(payload))
        else {
            panic!("Expected StateUpdate");
        };
        assert_eq!(state.player.volume, 40.0);
        assert_eq!(state.playlist_id.as_deref(), Some("PL1"));
    }

    #[test]
    fn decode_failure_is_an_error() {
        let result = SocketEvent::decode(PLAYLIST_DELETE, Some(json!({"id": 1})));
        assert!(matches!(result, Some(Err(Error::Decode(_)))));
        let missing = SocketEvent::decode(PLAYLIST_CREATED, None);
        assert!(matches!(missing, Some(Err(Error::Decode(_)))));
    }

    #[test]
    fn unknown_events_are_ignored() {
        assert!(SocketEvent::decode("queue-update", Some(json!({}))).is_none());
        assert!(SocketEvent::decode("", None).is_none());
    }

    #[test]
    fn default_state_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }
}
