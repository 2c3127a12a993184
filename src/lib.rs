pub mod constants;
pub mod core;
pub mod error;
pub mod middleware;
pub mod prelude;
pub mod render;
pub mod security;
mod utils;

// Re-export commonly used types for convenience
pub use core::{
    now_millis, portal_policy, BrowserEnvironment, CspPolicy, CspPolicyBuilder, Directive,
    GlobalEnvironment, PortalConfig, Source,
};
pub use error::PortalError;
pub use middleware::{csp_middleware, CspExtensions, CspMiddleware};
pub use render::{
    inject_styles, public_env_script, render_critical_styles, render_style_tags, StyleCache,
    StyleChunk, StyleSheet,
};
pub use security::{derive_legacy_nonce, merge_strings, NonceGenerator, RequestNonce};
