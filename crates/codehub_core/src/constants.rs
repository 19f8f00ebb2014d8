//! Shared constants used across CodeHub crates.

/// Well-known folder every user can see and nobody can delete.
pub const GENERAL_FOLDER_ID: &str = "general";

/// Display name used when the remote folder list lacks the general folder.
pub const GENERAL_FOLDER_NAME: &str = "General";

/// Maximum number of entries retained in the local activity log.
pub const ACTIVITY_LOG_CAPACITY: usize = 50;

/// Number of submissions shown by the recent-only view.
pub const RECENT_SUBMISSIONS_LIMIT: usize = 10;

/// Default port for the stand-in endpoint server.
pub const DEFAULT_PORT: u16 = 38421;

/// Default endpoint URL for CLI clients.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:38421";

/// Default upper bound for request bodies accepted by the endpoint server.
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Default request timeout for remote calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Admin name used when `CODEHUB_ADMIN` is not set.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Uploader recorded when the session has no user name.
pub const ANONYMOUS_USER: &str = "Anonymous";

/// Description stored for uploads without one.
pub const UPLOAD_DEFAULT_DESCRIPTION: &str = "No description provided";

/// Description stored for files created from the editor without one.
pub const EDITOR_DEFAULT_DESCRIPTION: &str = "Created with Code Editor";

/// Prefix of locally generated project ids.
pub const PROJECT_ID_PREFIX: &str = "project_";

/// Prefix of locally generated chat message ids.
pub const CHAT_MESSAGE_ID_PREFIX: &str = "msg_";
