pub(crate) const HEADER_CSP: &str = "content-security-policy";

pub(crate) const DEFAULT_SRC: &str = "default-src";
pub(crate) const SCRIPT_SRC: &str = "script-src";
pub(crate) const STYLE_SRC: &str = "style-src";
pub(crate) const IMG_SRC: &str = "img-src";
pub(crate) const CONNECT_SRC: &str = "connect-src";
pub(crate) const OBJECT_SRC: &str = "object-src";
pub(crate) const WORKER_SRC: &str = "worker-src";
pub(crate) const FRAME_ANCESTORS: &str = "frame-ancestors";
pub(crate) const BASE_URI: &str = "base-uri";

pub(crate) const REPORT_TO: &str = "report-to";

pub(crate) const NONE_SOURCE: &str = "'none'";
pub(crate) const SELF_SOURCE: &str = "'self'";
pub(crate) const UNSAFE_INLINE_SOURCE: &str = "'unsafe-inline'";
pub(crate) const REPORT_SAMPLE_SOURCE: &str = "'report-sample'";
pub(crate) const NONCE_PREFIX: &str = "'nonce-";
pub(crate) const SUFFIX_QUOTE: &str = "'";

pub(crate) const SEMICOLON_SPACE: &[u8] = b"; ";
pub(crate) const DEFAULT_BUFFER_CAPACITY: usize = 1024;

pub(crate) const DEFAULT_NONCE_LENGTH: usize = 16;

/// A nonce shorter than this is treated as absent when building the portal
/// policy, matching the legacy portal's length guard.
pub(crate) const MIN_NONCE_LENGTH: usize = 11;

/// Environment variable names the portal validates at startup.
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ENV_DATA_GRID_LICENSE: &str = "PUBLIC_MUI_DATA_GRID_LICENSE";

/// Prefix marking an environment variable as safe to expose to the browser.
pub const PUBLIC_ENV_PREFIX: &str = "PUBLIC_";

/// Well-known key carrying the process-start timestamp into `window.ENV`.
pub const PUBLIC_DATE_KEY: &str = "PUBLIC_DATE";

/// Global the injector script assigns the public environment to.
pub(crate) const BROWSER_ENV_GLOBAL: &str = "window.ENV";

/// Default emotion-style cache key.
pub(crate) const DEFAULT_STYLE_CACHE_KEY: &str = "css";

pub(crate) const DEFAULT_REPORT_ENDPOINT: &str = "/reporting/csp";
pub(crate) const DEV_WEBSOCKET_ORIGIN: &str = "ws://localhost:*";
