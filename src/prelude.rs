pub use crate::core::{
    portal_policy, BrowserEnvironment, CspPolicy, CspPolicyBuilder, GlobalEnvironment,
    PortalConfig, Source,
};
pub use crate::middleware::{csp_middleware, CspExtensions, CspMiddleware};
pub use crate::render::{public_env_script, render_critical_styles, StyleCache, StyleSheet};
pub use crate::security::{NonceGenerator, RequestNonce};
