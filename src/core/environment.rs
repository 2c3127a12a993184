use crate::constants::{
    ENV_ALLOWED_ORIGINS, ENV_DATA_GRID_LICENSE, PUBLIC_DATE_KEY, PUBLIC_ENV_PREFIX,
};
use crate::error::PortalError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

struct SchemaKey {
    name: &'static str,
    require_non_empty: bool,
}

/// Every variable the portal consumes must be listed here; startup fails
/// otherwise. Values are trimmed before validation.
const ENVIRONMENT_SCHEMA: &[SchemaKey] = &[
    SchemaKey {
        name: ENV_ALLOWED_ORIGINS,
        require_non_empty: false,
    },
    SchemaKey {
        name: ENV_DATA_GRID_LICENSE,
        require_non_empty: true,
    },
];

/// The validated process environment, split into private (server-only) and
/// `PUBLIC_`-prefixed (browser-exposable) entries. Built once at startup and
/// passed by reference afterwards; never read through ambient globals.
#[derive(Debug, Clone)]
pub struct GlobalEnvironment {
    values: IndexMap<String, String>,
    allowed_origins: Vec<String>,
}

impl GlobalEnvironment {
    /// Reads and validates the process environment. Any missing or invalid
    /// required variable is fatal; the caller is expected to abort startup.
    pub fn from_process_env() -> Result<Self, PortalError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, PortalError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let raw: IndexMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut values = IndexMap::with_capacity(ENVIRONMENT_SCHEMA.len());
        for key in ENVIRONMENT_SCHEMA {
            let value = raw.get(key.name).map(|v| v.trim()).ok_or_else(|| {
                PortalError::Configuration(format!(
                    "{} environment variable is required",
                    key.name
                ))
            })?;

            if key.require_non_empty && value.is_empty() {
                return Err(PortalError::Configuration(format!(
                    "{} must not be empty",
                    key.name
                )));
            }

            values.insert(key.name.to_string(), value.to_string());
        }

        let allowed_origins = parse_allowed_origins(&values[ENV_ALLOWED_ORIGINS])?;

        Ok(Self {
            values,
            allowed_origins,
        })
    }

    /// Server-side lookup of any validated variable, private ones included.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Lookup restricted to browser-exposable variables. Private keys are
    /// refused regardless of whether they exist.
    pub fn public_value(&self, key: &str) -> Result<&str, PortalError> {
        if !key.starts_with(PUBLIC_ENV_PREFIX) {
            return Err(PortalError::AccessDenied(key.to_string()));
        }

        self.get(key).ok_or_else(|| {
            PortalError::Configuration(format!("{} is not part of the environment schema", key))
        })
    }

    /// The `PUBLIC_`-prefixed subset plus the well-known `PUBLIC_DATE`
    /// entry, ready for injection into the page.
    pub fn browser_environment(&self, date: &str) -> BrowserEnvironment {
        let mut values: IndexMap<String, String> = self
            .values
            .iter()
            .filter(|(key, _)| key.starts_with(PUBLIC_ENV_PREFIX))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        values.insert(PUBLIC_DATE_KEY.to_string(), date.to_string());

        BrowserEnvironment { values }
    }

    /// Origins the CORS collaborator may admit, parsed and validated at load.
    #[inline]
    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }
}

fn parse_allowed_origins(raw: &str) -> Result<Vec<String>, PortalError> {
    let mut origins = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        Url::parse(entry).map_err(|err| {
            PortalError::Configuration(format!(
                "{} contains an invalid origin '{}': {}",
                ENV_ALLOWED_ORIGINS, entry, err
            ))
        })?;
        origins.push(entry.to_string());
    }
    Ok(origins)
}

/// The browser's view of the environment: exactly the public subset, as it
/// appears in `window.ENV`. Deserializing filters out anything without the
/// public prefix, so a private key can never survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrowserEnvironment {
    values: IndexMap<String, String>,
}

impl BrowserEnvironment {
    /// Reconstructs the environment from the JSON the injector script placed
    /// in the page. `None` means the injector was omitted entirely.
    pub fn from_injected(injected: Option<&str>) -> Result<Self, PortalError> {
        let json = injected.ok_or(PortalError::MissingInjection)?;
        let mut env: Self = serde_json::from_str(json)?;
        env.values
            .retain(|key, _| key.starts_with(PUBLIC_ENV_PREFIX));
        Ok(env)
    }

    pub fn get(&self, key: &str) -> Result<&str, PortalError> {
        if !key.starts_with(PUBLIC_ENV_PREFIX) {
            return Err(PortalError::AccessDenied(key.to_string()));
        }

        self.values.get(key).map(String::as_str).ok_or_else(|| {
            PortalError::Configuration(format!("{} was not injected into the page", key))
        })
    }

    pub fn to_json(&self) -> Result<String, PortalError> {
        Ok(serde_json::to_string(self)?)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Milliseconds since the Unix epoch, the portal's `PUBLIC_DATE` value.
pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
