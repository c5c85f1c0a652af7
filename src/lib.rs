//! # ytmd-companion
//!
//! Client for the YTMDesktop companion server: a REST client for state and
//! player commands plus a realtime event stream over Socket.IO.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ytmd_companion::{CompanionConnector, Settings, SocketEvent};
//!
//! #[tokio::main]
//! async fn main() -> ytmd_companion::Result<()> {
//!     let settings = Settings::new("localhost", 9863, "my-app", "My App", "1.0.0")?
//!         .with_token(std::env::var("YTMD_TOKEN").unwrap_or_default());
//!     let (connector, mut events) = CompanionConnector::new(settings);
//!
//!     connector.socket().connect().await;
//!     connector.rest().play_pause().await?;
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             SocketEvent::StateUpdate(state) => {
//!                 println!("{:?} at {}s", state.player.track_state, state.player.video_progress);
//!             }
//!             SocketEvent::Error(e) => eprintln!("realtime error: {e}"),
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod connector;
pub mod error;
pub mod event;
pub mod rest;
pub mod socket;
pub mod types;

// Internal modules
pub(crate) mod endpoints;

// Re-export main public API
pub use command::Command;
pub use config::{DEFAULT_PORT, Settings, SharedSettings};
pub use connector::CompanionConnector;
pub use error::{ApiError, Error};
pub use event::{ConnectionState, SocketEvent};
pub use rest::RestClient;
pub use socket::{ReconnectPolicy, SocketClient, SocketOptions};
pub use types::*;

/// Result type for ytmd-companion operations.
pub type Result<T> = std::result::Result<T, Error>;
