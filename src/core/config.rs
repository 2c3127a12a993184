use crate::constants::ENV_DATA_GRID_LICENSE;
use crate::core::environment::{now_millis, BrowserEnvironment, GlobalEnvironment};
use crate::core::policy::{portal_policy, CspPolicy};
use crate::error::PortalError;
use crate::security::nonce::{derive_legacy_nonce, NonceGenerator};
use std::sync::Arc;

/// Everything request handling needs, built once at startup and passed
/// explicitly. Immutable after construction; concurrent requests share it
/// read-only behind the `Arc`.
#[derive(Clone)]
pub struct PortalConfig {
    environment: Arc<GlobalEnvironment>,
    is_development: bool,
    nonce_generator: NonceGenerator,
    public_date: String,
}

impl PortalConfig {
    pub fn new(environment: GlobalEnvironment, is_development: bool) -> Self {
        Self {
            environment: Arc::new(environment),
            is_development,
            nonce_generator: NonceGenerator::default(),
            public_date: now_millis().to_string(),
        }
    }

    #[inline]
    pub fn with_nonce_length(mut self, length: usize) -> Self {
        self.nonce_generator = NonceGenerator::new(length);
        self
    }

    #[inline]
    pub fn environment(&self) -> &GlobalEnvironment {
        &self.environment
    }

    #[inline]
    pub fn is_development(&self) -> bool {
        self.is_development
    }

    /// The process-start timestamp exposed to the browser as `PUBLIC_DATE`.
    #[inline]
    pub fn public_date(&self) -> &str {
        &self.public_date
    }

    /// A fresh nonce for one request.
    #[inline]
    pub fn issue_nonce(&self) -> String {
        self.nonce_generator.generate()
    }

    /// The policy for a response rendered with `nonce`.
    #[inline]
    pub fn policy_for(&self, nonce: &str) -> CspPolicy {
        portal_policy(Some(nonce), self.is_development)
    }

    #[inline]
    pub fn browser_environment(&self) -> BrowserEnvironment {
        self.environment.browser_environment(&self.public_date)
    }

    /// The nonce the legacy deployment would have derived for this
    /// process. Only useful when validating markup produced by it.
    pub fn legacy_nonce(&self) -> Result<String, PortalError> {
        let license = self.environment.public_value(ENV_DATA_GRID_LICENSE)?;
        Ok(derive_legacy_nonce(&self.public_date, license))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(is_development: bool) -> PortalConfig {
        let env = GlobalEnvironment::from_vars([
            ("ALLOWED_ORIGINS", "https://portal.example.com"),
            ("PUBLIC_MUI_DATA_GRID_LICENSE", "license-key-123"),
        ])
        .unwrap();
        PortalConfig::new(env, is_development)
    }

    #[test]
    fn issued_nonces_differ_per_call() {
        let config = config(false);
        assert_ne!(config.issue_nonce(), config.issue_nonce());
    }

    #[test]
    fn policy_for_carries_the_nonce() {
        let config = config(false);
        let nonce = config.issue_nonce();
        let policy = config.policy_for(&nonce);

        assert!(policy.contains_nonce());
        let header = policy.header_value().unwrap();
        assert!(header
            .to_str()
            .unwrap()
            .contains(&format!("'nonce-{}'", nonce)));
    }

    #[test]
    fn browser_environment_uses_process_start_date() {
        let config = config(false);
        let browser = config.browser_environment();

        assert_eq!(browser.get("PUBLIC_DATE").unwrap(), config.public_date());
    }

    #[test]
    fn legacy_nonce_is_stable_for_the_process() {
        let config = config(false);
        assert_eq!(
            config.legacy_nonce().unwrap(),
            config.legacy_nonce().unwrap()
        );
    }
}
