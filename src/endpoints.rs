//! Companion server endpoint paths.

pub const METADATA: &str = "/metadata";
pub const AUTH_REQUEST_CODE: &str = "/api/v1/auth/requestcode";
pub const AUTH_REQUEST: &str = "/api/v1/auth/request";
pub const STATE: &str = "/api/v1/state";
pub const PLAYLISTS: &str = "/api/v1/playlists";
pub const COMMAND: &str = "/api/v1/command";

/// Socket.IO namespace of the realtime event stream.
pub const REALTIME: &str = "/api/v1/realtime";
