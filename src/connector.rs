//! Session facade over the REST and realtime clients.

use tokio::sync::mpsc;

use crate::config::{Settings, SharedSettings};
use crate::event::SocketEvent;
use crate::rest::RestClient;
use crate::socket::{SocketClient, SocketOptions};

/// One companion session: a REST client and a realtime client sharing the
/// same settings.
///
/// This is the main entry point for the library. Rotate the token through
/// [`CompanionConnector::set_auth_token`] so the realtime connection picks it
/// up.
///
/// # Example
///
/// ```ignore
/// let (connector, mut events) = CompanionConnector::new(settings);
/// let code = connector.rest().get_auth_code("my-app", "My App", "1.0.0").await?;
/// let token = connector.rest().get_auth_token("my-app", &code).await?;
/// connector.set_auth_token(token);
///
/// connector.socket().connect().await;
/// connector.rest().play_pause().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CompanionConnector {
    settings: SharedSettings,
    rest: RestClient,
    socket: SocketClient,
}

impl CompanionConnector {
    /// Build both clients over `settings`.
    ///
    /// Returns the connector and the receiver for realtime events.
    pub fn new(settings: Settings) -> (Self, mpsc::Receiver<SocketEvent>) {
        Self::with_options(settings, SocketOptions::default())
    }

    pub fn with_options(
        settings: Settings,
        options: SocketOptions,
    ) -> (Self, mpsc::Receiver<SocketEvent>) {
        let settings = SharedSettings::new(settings);
        let rest = RestClient::new(settings.clone());
        let (socket, events) = SocketClient::with_options(settings.clone(), options);
        (
            Self {
                settings,
                rest,
                socket,
            },
            events,
        )
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub fn socket(&self) -> &SocketClient {
        &self.socket
    }

    /// Current settings.
    pub fn settings(&self) -> Settings {
        self.settings.snapshot()
    }

    /// Replace the settings for both clients.
    pub fn set_settings(&self, settings: Settings) {
        self.socket.set_settings(settings);
    }

    /// Set the token for both clients, reconnecting the realtime client if
    /// it changed.
    pub fn set_auth_token(&self, token: impl Into<String>) {
        self.socket.set_auth_token(token);
    }

    pub fn clear_auth_token(&self) {
        self.socket.clear_auth_token();
    }
}
