//! Pair with a companion server and print the token.
//!
//! Enable companion authorization in YTMDesktop first, then confirm the code
//! shown by this program in the desktop app.
//!
//! Run with: cargo run --example pair -- [host]
//! Run with debug: RUST_LOG=ytmd_companion=debug cargo run --example pair

use tracing_subscriber::EnvFilter;
use ytmd_companion::{DEFAULT_PORT, RestClient, Settings};

const APP_ID: &str = "ytmd-companion-demo";
const APP_NAME: &str = "ytmd-companion demo";
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    // Initialize tracing from RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let host = std::env::args().nth(1).unwrap_or_else(|| "localhost".to_string());

    let settings = match Settings::new(&host, DEFAULT_PORT, APP_ID, APP_NAME, APP_VERSION) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid settings: {e}");
            std::process::exit(1);
        }
    };
    let rest = RestClient::new(settings);

    println!("Requesting pairing code from {host}:{DEFAULT_PORT}...");

    let code = match rest.get_auth_code(APP_ID, APP_NAME, APP_VERSION).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Failed to get pairing code: {e}");
            if let Some(api) = e.api_error() {
                eprintln!("  server said: {api}");
            }
            std::process::exit(1);
        }
    };

    println!();
    println!("Pairing code: {code}");
    println!("Confirm it in YTMDesktop within 30 seconds...");
    println!();

    match rest.get_auth_token(APP_ID, &code).await {
        Ok(token) => {
            println!("Success! Add this to companion.toml:");
            println!();
            println!("host = \"{host}\"");
            println!("app_id = \"{APP_ID}\"");
            println!("app_name = \"{APP_NAME}\"");
            println!("app_version = \"{APP_VERSION}\"");
            println!("token = \"{token}\"");
        }
        Err(e) => {
            eprintln!("Pairing failed: {e}");
            std::process::exit(1);
        }
    }
}
