use crate::constants::BROWSER_ENV_GLOBAL;
use crate::core::environment::BrowserEnvironment;
use crate::error::PortalError;

/// Renders the script element that exposes the public environment to the
/// browser. The body assigns the JSON-serialized public subset to
/// `window.ENV`; the nonce lets it execute under the portal policy.
pub fn public_env_script(env: &BrowserEnvironment, nonce: &str) -> Result<String, PortalError> {
    let payload = env.to_json()?;
    Ok(format!(
        "<script data-testid=\"public_env\" nonce=\"{}\">{} = {}</script>",
        nonce, BROWSER_ENV_GLOBAL, payload
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::environment::GlobalEnvironment;

    fn browser_env() -> BrowserEnvironment {
        let env = GlobalEnvironment::from_vars([
            ("ALLOWED_ORIGINS", "https://portal.example.com"),
            ("PUBLIC_MUI_DATA_GRID_LICENSE", "license-key-123"),
        ])
        .unwrap();
        env.browser_environment("1700000000000")
    }

    #[test]
    fn script_assigns_window_env() {
        let script = public_env_script(&browser_env(), "test-nonce-123").unwrap();

        assert!(script.starts_with("<script data-testid=\"public_env\" nonce=\"test-nonce-123\">"));
        assert!(script.contains("window.ENV = {"));
        assert!(script.ends_with("</script>"));
    }

    #[test]
    fn script_payload_round_trips() {
        let env = browser_env();
        let script = public_env_script(&env, "n").unwrap();

        let start = script.find("window.ENV = ").unwrap() + "window.ENV = ".len();
        let end = script.rfind("</script>").unwrap();
        let parsed = BrowserEnvironment::from_injected(Some(&script[start..end])).unwrap();

        assert_eq!(parsed, env);
    }

    #[test]
    fn script_contains_no_private_keys() {
        let script = public_env_script(&browser_env(), "n").unwrap();

        assert!(script.contains("PUBLIC_MUI_DATA_GRID_LICENSE"));
        assert!(script.contains("PUBLIC_DATE"));
        assert!(!script.contains("ALLOWED_ORIGINS"));
    }
}
