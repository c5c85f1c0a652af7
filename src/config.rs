//! Connection settings for the companion server.

use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use regex::Regex;
use semver::Version;
use serde::Deserialize;

use crate::{Error, Result};

/// Default port of the companion server.
pub const DEFAULT_PORT: u16 = 9863;

static APP_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]{2,32}$").expect("static regex"));

/// Connection settings shared by the REST and realtime clients.
///
/// Host, app id, app name and app version are validated on every assignment.
/// A rejected value leaves the previous one in place.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSettings")]
pub struct Settings {
    host: String,
    port: u16,
    app_id: String,
    app_name: String,
    app_version: String,
    token: Option<String>,
}

/// Unvalidated shape used when loading settings from a config file.
#[derive(Deserialize)]
struct RawSettings {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    app_id: String,
    app_name: String,
    app_version: String,
    #[serde(default)]
    token: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl TryFrom<RawSettings> for Settings {
    type Error = Error;

    fn try_from(raw: RawSettings) -> Result<Self> {
        let settings = Settings::new(
            raw.host,
            raw.port,
            raw.app_id,
            raw.app_name,
            raw.app_version,
        )?;
        Ok(match raw.token {
            Some(token) => settings.with_token(token),
            None => settings,
        })
    }
}

impl Settings {
    /// Create validated settings without a token.
    ///
    /// # Example
    ///
    /// ```
    /// use ytmd_companion::Settings;
    ///
    /// let settings = Settings::new("localhost/", 9863, "my-app", "My App", "1.0.0")?;
    /// assert_eq!(settings.host(), "localhost");
    /// # Ok::<(), ytmd_companion::Error>(())
    /// ```
    pub fn new(
        host: impl Into<String>,
        port: u16,
        app_id: impl Into<String>,
        app_name: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            host: validate_host(host.into())?,
            port,
            app_id: validate_app_id(app_id.into())?,
            app_name: validate_app_name(app_name.into())?,
            app_version: validate_app_version(app_version.into())?,
            token: None,
        })
    }

    /// Attach a token previously obtained through pairing.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Set the host. Strips one trailing `/`; rejects schemes and ports.
    pub fn set_host(&mut self, host: impl Into<String>) -> Result<()> {
        self.host = validate_host(host.into())?;
        Ok(())
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    pub fn set_app_id(&mut self, app_id: impl Into<String>) -> Result<()> {
        self.app_id = validate_app_id(app_id.into())?;
        Ok(())
    }

    pub fn set_app_name(&mut self, app_name: impl Into<String>) -> Result<()> {
        self.app_name = validate_app_name(app_name.into())?;
        Ok(())
    }

    pub fn set_app_version(&mut self, app_version: impl Into<String>) -> Result<()> {
        self.app_version = validate_app_version(app_version.into())?;
        Ok(())
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Base URL of the REST API, e.g. `http://localhost:9863`.
    pub(crate) fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// True when a change from `self` to `other` requires a new realtime
    /// connection.
    pub(crate) fn connection_differs(&self, other: &Settings) -> bool {
        self.host != other.host || self.port != other.port || self.token != other.token
    }
}

pub(crate) fn validate_host(host: String) -> Result<String> {
    if host.is_empty() {
        return Err(Error::configuration("host", "must not be empty"));
    }
    if host.contains("://") {
        return Err(Error::configuration(
            "host",
            "must not contain a protocol like http:// or https://",
        ));
    }
    if host.contains(':') {
        return Err(Error::configuration("host", "must not contain a port"));
    }
    let host = match host.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => host,
    };
    if host.is_empty() {
        return Err(Error::configuration("host", "must not be empty"));
    }
    Ok(host)
}

pub(crate) fn validate_app_id(app_id: String) -> Result<String> {
    if app_id.is_empty() {
        return Err(Error::configuration("app_id", "must not be empty"));
    }
    if !APP_ID_PATTERN.is_match(&app_id) {
        return Err(Error::configuration(
            "app_id",
            "must be 2 to 32 lowercase alphanumeric characters, '_' or '-'",
        ));
    }
    Ok(app_id)
}

pub(crate) fn validate_app_name(app_name: String) -> Result<String> {
    let len = app_name.chars().count();
    if len == 0 {
        return Err(Error::configuration("app_name", "must not be empty"));
    }
    if len < 2 {
        return Err(Error::configuration(
            "app_name",
            "must be at least 2 characters long",
        ));
    }
    if len > 48 {
        return Err(Error::configuration(
            "app_name",
            "must not be longer than 48 characters",
        ));
    }
    Ok(app_name)
}

pub(crate) fn validate_app_version(app_version: String) -> Result<String> {
    if app_version.trim().is_empty() {
        return Err(Error::configuration("app_version", "must not be empty"));
    }
    if let Err(e) = Version::parse(&app_version) {
        return Err(Error::configuration(
            "app_version",
            format!("must be a semantic version like 1.2.3 ({e})"),
        ));
    }
    Ok(app_version)
}

/// Handle to one [`Settings`] value observed by several clients.
///
/// Cloning the handle shares the value; an update through any clone is seen
/// by all of them. Outside the crate the handle is read-only: changes go
/// through [`SocketClient`](crate::SocketClient) or
/// [`CompanionConnector`](crate::CompanionConnector) so the realtime
/// connection follows them.
#[derive(Debug, Clone)]
pub struct SharedSettings {
    inner: Arc<RwLock<Settings>>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> Settings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    /// Set or clear the token, returning the previous one.
    pub(crate) fn set_token(&self, token: Option<String>) -> Option<String> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut guard.token, token)
    }

    /// Replace the settings, returning the previous value.
    pub(crate) fn replace(&self, settings: Settings) -> Settings {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, settings)
    }
}

impl From<Settings> for SharedSettings {
    fn from(settings: Settings) -> Self {
        Self::new(settings)
    }
}
