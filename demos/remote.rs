//! Connect to a companion server and print realtime events.
//!
//! Setup:
//!   1. Copy companion.toml.example to companion.toml
//!   2. Run the pair example and paste the token into companion.toml
//!
//! Run with: cargo run --example remote
//! Run with debug: RUST_LOG=ytmd_companion=debug cargo run --example remote

use std::fs;

use tokio::signal;
use tracing_subscriber::EnvFilter;
use ytmd_companion::{CompanionConnector, ConnectionState, Settings, SocketEvent};

#[tokio::main]
async fn main() {
    // Initialize tracing from RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Loading settings from companion.toml...");

    let contents = match fs::read_to_string("companion.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read companion.toml: {e}");
            eprintln!("Hint: Copy companion.toml.example to companion.toml and fill in your token");
            std::process::exit(1);
        }
    };

    let settings: Settings = match toml::from_str(&contents) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to parse companion.toml: {e}");
            std::process::exit(1);
        }
    };

    if settings.token().is_none() {
        eprintln!("companion.toml has no token; run `cargo run --example pair` first");
        std::process::exit(1);
    }

    let (connector, mut events) = CompanionConnector::new(settings);

    match connector.rest().get_metadata().await {
        Ok(metadata) => println!("Server API versions: {:?}", metadata.api_versions),
        Err(e) => {
            eprintln!("Failed to reach companion server: {e}");
            std::process::exit(1);
        }
    }

    match connector.rest().get_playlists().await {
        Ok(playlists) => {
            println!("{} playlists:", playlists.len());
            for playlist in playlists {
                println!("  {} ({})", playlist.title, playlist.id);
            }
        }
        Err(e) => eprintln!("Failed to list playlists: {e}"),
    }

    connector.socket().connect().await;
    println!();
    println!("Listening for events... (Press Ctrl+C to exit)");
    println!();

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                match event {
                    SocketEvent::ConnectionChanged(ConnectionState::Connected) => {
                        println!("Realtime connected!");
                    }
                    SocketEvent::ConnectionChanged(state) => {
                        println!("Connection state: {state:?}");
                    }
                    SocketEvent::StateUpdate(state) => {
                        let title = state
                            .video
                            .as_ref()
                            .map(|v| format!("{} - {}", v.author, v.title))
                            .unwrap_or_else(|| "(nothing playing)".to_string());
                        println!(
                            "{:?} {:>6.1}s vol={:>3} {}",
                            state.player.track_state,
                            state.player.video_progress,
                            state.player.volume,
                            title
                        );
                    }
                    SocketEvent::PlaylistCreated(playlist) => {
                        println!("Playlist created: {} ({})", playlist.title, playlist.id);
                    }
                    SocketEvent::PlaylistDeleted(id) => {
                        println!("Playlist deleted: {id}");
                    }
                    SocketEvent::Error(e) => {
                        eprintln!("Realtime error: {e}");
                    }
                }
            }
            _ = signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
        }
    }

    connector.socket().disconnect().await;
}
