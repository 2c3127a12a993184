pub mod config;
pub mod directive;
pub mod environment;
pub mod policy;
pub mod source;

pub use config::PortalConfig;
pub use directive::Directive;
pub use environment::{now_millis, BrowserEnvironment, GlobalEnvironment};
pub use policy::{portal_policy, CspPolicy, CspPolicyBuilder};
pub use source::Source;
