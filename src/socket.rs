//! Realtime event client.
//!
//! [`SocketClient`] keeps at most one Socket.IO connection to the server's
//! realtime namespace. The `rust_socketio` client answers pings and
//! reconnects after transport loss; the callbacks registered here decode
//! server events and publish them on the event channel.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use rust_socketio::asynchronous::{Client, ClientBuilder};
use rust_socketio::{Event, Payload, TransportType};
use serde_json::{Value, json};
use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, info, trace, warn};

use crate::Error;
use crate::config::{Settings, SharedSettings};
use crate::endpoints;
use crate::event::{self, ConnectionState, SocketEvent};

/// How the transport retries after losing an established connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Maximum attempts per outage. `None` retries forever.
    pub attempts: Option<u8>,
    /// Delay before the first retry. Grows after each failure.
    pub delay: Duration,
    pub max_delay: Duration,
}

impl ReconnectPolicy {
    /// Never reconnect automatically.
    pub fn disabled() -> Self {
        Self {
            attempts: Some(0),
            ..Self::default()
        }
    }

    fn enabled(&self) -> bool {
        self.attempts != Some(0)
    }

    /// Delay bounds in milliseconds; the upper bound never drops below the
    /// lower one.
    fn delay_bounds_ms(&self) -> (u64, u64) {
        let min = millis(self.delay);
        (min, millis(self.max_delay).max(min))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            attempts: None,
            delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Tuning for [`SocketClient`].
#[derive(Debug, Clone)]
pub struct SocketOptions {
    pub reconnect: ReconnectPolicy,
    /// Limit for opening and for closing a connection.
    pub connect_timeout: Duration,
    /// Capacity of the event channel.
    pub event_buffer: usize,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            connect_timeout: Duration::from_secs(20),
            event_buffer: 100,
        }
    }
}

/// Client for the realtime event stream.
///
/// Clones share the same connection. Events are delivered through the
/// receiver returned by [`SocketClient::new`]; the client never returns
/// connection errors directly.
///
/// Connection state changes never wait for the receiver. When the buffer is
/// full they are dropped from the channel, but [`SocketClient::state`] and
/// [`SocketClient::subscribe_state`] always reflect them. Server events wait
/// for buffer space until the connection they came from is replaced or
/// closed.
///
/// # Example
///
/// ```ignore
/// let (socket, mut events) = SocketClient::new(settings);
/// socket.connect().await;
///
/// while let Some(event) = events.recv().await {
///     if let SocketEvent::StateUpdate(state) = event {
///         println!("{:?}", state.player.track_state);
///     }
/// }
/// ```
#[derive(Clone)]
pub struct SocketClient {
    inner: Arc<Inner>,
}

struct Inner {
    settings: SharedSettings,
    options: SocketOptions,
    link: Mutex<Option<Link>>,
    events: Arc<Emitter>,
}

impl SocketClient {
    pub fn new(settings: impl Into<SharedSettings>) -> (Self, mpsc::Receiver<SocketEvent>) {
        Self::with_options(settings, SocketOptions::default())
    }

    pub fn with_options(
        settings: impl Into<SharedSettings>,
        options: SocketOptions,
    ) -> (Self, mpsc::Receiver<SocketEvent>) {
        let (events, event_rx) = Emitter::new(options.event_buffer);
        let client = Self {
            inner: Arc::new(Inner {
                settings: settings.into(),
                options,
                link: Mutex::new(None),
                events: Arc::new(events),
            }),
        };
        (client, event_rx)
    }

    /// Read-only view of the settings used for the next connection.
    pub fn settings(&self) -> &SharedSettings {
        &self.inner.settings
    }

    /// Last connection state emitted.
    pub fn state(&self) -> ConnectionState {
        self.inner.events.current()
    }

    /// Watch connection state changes without consuming events.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.events.state.subscribe()
    }

    /// Open the connection, replacing any existing one.
    ///
    /// Emits `Connecting`, then `Connected` once the server accepts the
    /// namespace. If the connection can't be opened it emits an `Error`
    /// event and `ConnectionChanged(Error)`.
    pub async fn connect(&self) {
        let mut link = self.inner.link.lock().await;
        self.inner.open(&mut link).await;
    }

    /// Close the connection and stop reconnecting.
    pub async fn disconnect(&self) {
        let mut link = self.inner.link.lock().await;
        self.inner.events.advance();
        if let Some(old) = link.take() {
            old.close(self.inner.options.connect_timeout).await;
        }
        self.inner.events.disconnected();
    }

    /// Replace the settings. Reconnects when host, port or token changed
    /// and the client has been connected.
    pub fn set_settings(&self, settings: Settings) {
        let previous = self.inner.settings.replace(settings);
        let current = self.inner.settings.snapshot();
        if previous.connection_differs(&current) {
            self.reconnect_detached();
        } else {
            trace!("Settings unchanged for realtime connection");
        }
    }

    /// Set the token. Reconnects when it differs from the current one.
    pub fn set_auth_token(&self, token: impl Into<String>) {
        self.apply_token(Some(token.into()));
    }

    pub fn clear_auth_token(&self) {
        self.apply_token(None);
    }

    // --- Private helpers ---

    fn apply_token(&self, token: Option<String>) {
        let previous = self.inner.settings.set_token(token.clone());
        if previous != token {
            self.reconnect_detached();
        }
    }

    fn reconnect_detached(&self) {
        let Ok(handle) = Handle::try_current() else {
            warn!("No tokio runtime, realtime connection keeps its old settings");
            return;
        };
        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            let mut link = inner.link.lock().await;
            if link.is_none() {
                trace!("Not connected, nothing to reconnect");
                return;
            }
            debug!("Connection settings changed, reconnecting");
            inner.open(&mut link).await;
        });
    }
}

impl fmt::Debug for SocketClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketClient")
            .field("state", &self.state())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl Inner {
    async fn open(&self, slot: &mut Option<Link>) {
        // Callbacks of the old link stop publishing from here on.
        let generation = self.events.advance();
        if let Some(old) = slot.take() {
            old.close(self.options.connect_timeout).await;
            self.events.disconnected();
        }

        self.events.set_state(ConnectionState::Connecting);
        let settings = self.settings.snapshot();
        let url = settings.base_url();
        let builder = self.builder(&settings, generation);

        let connecting = tokio::time::timeout(self.options.connect_timeout, builder.connect());
        let client = match connecting.await {
            Ok(Ok(client)) => {
                info!(%url, "Realtime connection established");
                Some(client)
            }
            Ok(Err(e)) => {
                self.failed(&url, Error::from(Box::new(e)));
                None
            }
            Err(_) => {
                self.failed(&url, Error::Timeout);
                None
            }
        };
        // Keep the slot even on failure so a later settings change retries.
        *slot = Some(Link { client });
    }

    fn failed(&self, url: &str, error: Error) {
        warn!(url, error = %error, "Realtime connection failed");
        self.events.error(error);
        self.events.set_state(ConnectionState::Error);
    }

    /// Socket.IO client for `settings`, with callbacks bound to `generation`.
    fn builder(&self, settings: &Settings, generation: u64) -> ClientBuilder {
        use ConnectionState::{Connected, Disconnected};

        let policy = &self.options.reconnect;
        let (min_delay, max_delay) = policy.delay_bounds_ms();

        let mut builder = ClientBuilder::new(settings.base_url())
            .namespace(endpoints::REALTIME)
            .transport_type(TransportType::Websocket)
            .auth(json!({ "token": settings.token() }))
            .reconnect(policy.enabled())
            .reconnect_on_disconnect(false)
            .reconnect_delay(min_delay, max_delay);
        if let Some(attempts) = policy.attempts.filter(|n| *n > 0) {
            builder = builder.max_reconnect_attempts(attempts);
        }

        for name in event::SUBSCRIBED {
            let events = Arc::clone(&self.events);
            builder = builder.on(name, move |payload: Payload, _: Client| {
                let events = Arc::clone(&events);
                async move { events.server_event(generation, name, payload).await }.boxed()
            });
        }

        let events = Arc::clone(&self.events);
        builder = builder.on(Event::Error, move |payload: Payload, _: Client| {
            let events = Arc::clone(&events);
            async move {
                let message = payload_text(payload);
                warn!(error = %message, "Realtime transport error");
                events
                    .publish(generation, SocketEvent::Error(Error::Transport(message)))
                    .await;
            }
            .boxed()
        });

        let events = &self.events;
        let builder = on_state(builder, events, generation, Event::Connect, Connected);
        on_state(builder, events, generation, Event::Close, Disconnected)
    }
}

/// Map a transport lifecycle callback onto a connection state.
fn on_state(
    builder: ClientBuilder,
    events: &Arc<Emitter>,
    generation: u64,
    trigger: Event,
    state: ConnectionState,
) -> ClientBuilder {
    let events = Arc::clone(events);
    builder.on(trigger, move |_: Payload, _: Client| {
        let events = Arc::clone(&events);
        async move { events.link_state(generation, state) }.boxed()
    })
}

/// First argument of a server event, if it carried JSON.
fn first_value(payload: Payload) -> Option<Value> {
    match payload {
        Payload::Text(values) => values.into_iter().next(),
        _ => None,
    }
}

fn payload_text(payload: Payload) -> String {
    match first_value(payload) {
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
        None => "unknown error".to_string(),
    }
}

// ============================================================================
// Link
// ============================================================================

/// A connect() that happened, with its client if the connection opened.
struct Link {
    client: Option<Client>,
}

impl Link {
    async fn close(self, limit: Duration) {
        let Some(client) = self.client else {
            return;
        };
        match tokio::time::timeout(limit, client.disconnect()).await {
            Ok(Ok(())) => trace!("TX: Namespace disconnect"),
            Ok(Err(e)) => debug!(error = %e, "Error closing realtime connection"),
            Err(_) => warn!("Timed out closing realtime connection"),
        }
    }
}

// ============================================================================
// Emitter
// ============================================================================

/// Publishes events and tracks the last connection state.
///
/// Each link gets a generation number. Callbacks of a replaced link are
/// ignored, and a callback waiting for buffer space gives up once its link
/// is replaced.
struct Emitter {
    tx: mpsc::Sender<SocketEvent>,
    state: watch::Sender<ConnectionState>,
    generation: watch::Sender<u64>,
}

impl Emitter {
    fn new(buffer: usize) -> (Self, mpsc::Receiver<SocketEvent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (generation, _) = watch::channel(0);
        (
            Self {
                tx,
                state,
                generation,
            },
            rx,
        )
    }

    fn current(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Retire the current link's callbacks. Returns the next generation.
    fn advance(&self) -> u64 {
        self.generation.send_modify(|g| *g = g.wrapping_add(1));
        *self.generation.borrow()
    }

    fn is_current(&self, generation: u64) -> bool {
        *self.generation.borrow() == generation
    }

    // --- Caller side: never waits for the receiver ---

    fn set_state(&self, state: ConnectionState) {
        debug!(?state, "Connection state changed");
        self.state.send_replace(state);
        self.offer(SocketEvent::ConnectionChanged(state));
    }

    /// Emit `Disconnected` unless it was the last state emitted.
    fn disconnected(&self) {
        if self.current() != ConnectionState::Disconnected {
            self.set_state(ConnectionState::Disconnected);
        }
    }

    fn error(&self, error: Error) {
        self.offer(SocketEvent::Error(error));
    }

    fn offer(&self, event: SocketEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => warn!(?event, "Event buffer full, dropping event"),
            Err(TrySendError::Closed(_)) => trace!("Event receiver dropped"),
        }
    }

    // --- Link side: runs inside Socket.IO callbacks ---

    fn link_state(&self, generation: u64, state: ConnectionState) {
        if !self.is_current(generation) || self.current() == state {
            return;
        }
        self.set_state(state);
    }

    async fn server_event(&self, generation: u64, name: &str, payload: Payload) {
        match SocketEvent::decode(name, first_value(payload)) {
            Some(Ok(event)) => {
                debug!(name, "RX: Event");
                self.publish(generation, event).await;
            }
            Some(Err(e)) => {
                warn!(name, error = %e, "Failed to decode event");
                self.publish(generation, SocketEvent::Error(e)).await;
            }
            None => trace!(name, "RX: Ignoring unknown event"),
        }
    }

    /// Wait for buffer space, giving up if the link is replaced meanwhile.
    async fn publish(&self, generation: u64, event: SocketEvent) {
        if !self.is_current(generation) {
            trace!("Dropping event from a replaced link");
            return;
        }
        let mut replaced = self.generation.subscribe();
        tokio::select! {
            result = self.tx.send(event) => {
                if result.is_err() {
                    trace!("Event receiver dropped");
                }
            }
            _ = superseded(&mut replaced, generation) => {
                trace!("Link replaced while waiting for the receiver");
            }
        }
    }
}

/// Resolves once the generation moves past `generation`.
async fn superseded(rx: &mut watch::Receiver<u64>, generation: u64) {
    loop {
        let current = *rx.borrow_and_update();
        if current != generation {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}
