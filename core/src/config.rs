//! Immutable client configuration.
//!
//! # Design
//! `ClientConfig` is read-only after construction, so a client can be shared
//! across threads without locking. The transport scheme is derived from the
//! hostname on every request rather than cached.

use std::fmt;

use crate::error::{ApiError, Result};
use crate::http::Scheme;

/// Hostname used when none is supplied.
pub const DEFAULT_HOSTNAME: &str = "gocarrot.com";

const ENV_APP_ID: &str = "CARROT_APP_ID";
const ENV_APP_SECRET: &str = "CARROT_APP_SECRET";
const ENV_HOSTNAME: &str = "CARROT_HOSTNAME";

/// Application credentials and the target Carrot host.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    app_id: String,
    app_secret: String,
    hostname: String,
}

impl ClientConfig {
    /// Configuration against the default Carrot host.
    pub fn new(app_id: &str, app_secret: &str) -> Self {
        Self::with_hostname(app_id, app_secret, DEFAULT_HOSTNAME)
    }

    /// Configuration against an explicit `host[:port]`.
    pub fn with_hostname(app_id: &str, app_secret: &str, hostname: &str) -> Self {
        Self {
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
            hostname: hostname.to_string(),
        }
    }

    /// Read `CARROT_APP_ID`, `CARROT_APP_SECRET` and the optional
    /// `CARROT_HOSTNAME` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let app_id = lookup(ENV_APP_ID).ok_or(ApiError::MissingEnv(ENV_APP_ID))?;
        let app_secret = lookup(ENV_APP_SECRET).ok_or(ApiError::MissingEnv(ENV_APP_SECRET))?;
        let hostname = lookup(ENV_HOSTNAME).unwrap_or_else(|| DEFAULT_HOSTNAME.to_string());
        Ok(Self {
            app_id,
            app_secret,
            hostname,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub(crate) fn app_secret(&self) -> &[u8] {
        self.app_secret.as_bytes()
    }

    /// The configured `host[:port]`, as used for the connection.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The host with any `:port` suffix removed, as used in signatures.
    pub fn host_without_port(&self) -> &str {
        match self.hostname.split_once(':') {
            Some((host, _)) => host,
            None => &self.hostname,
        }
    }

    /// Plain HTTP for `localhost`, TLS for everything else.
    pub fn scheme(&self) -> Scheme {
        if self.host_without_port() == "localhost" {
            Scheme::Http
        } else {
            Scheme::Https
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("hostname", &self.hostname)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn new_uses_default_hostname() {
        let config = ClientConfig::new("42", "s3cr3t");
        assert_eq!(config.hostname(), "gocarrot.com");
        assert_eq!(config.scheme(), Scheme::Https);
    }

    #[test]
    fn localhost_with_port_is_plaintext() {
        let config = ClientConfig::with_hostname("42", "s3cr3t", "localhost:8080");
        assert_eq!(config.host_without_port(), "localhost");
        assert_eq!(config.scheme(), Scheme::Http);
    }

    #[test]
    fn localhost_prefix_alone_is_not_enough() {
        let config = ClientConfig::with_hostname("42", "s3cr3t", "localhost.example.com");
        assert_eq!(config.scheme(), Scheme::Https);

        let config = ClientConfig::with_hostname("42", "s3cr3t", "127.0.0.1:3000");
        assert_eq!(config.scheme(), Scheme::Https);
    }

    #[test]
    fn debug_redacts_secret() {
        let config = ClientConfig::new("42", "s3cr3t");
        let printed = format!("{config:?}");
        assert!(!printed.contains("s3cr3t"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn from_lookup_reads_all_keys() {
        let env: HashMap<&str, &str> = [
            ("CARROT_APP_ID", "42"),
            ("CARROT_APP_SECRET", "s3cr3t"),
            ("CARROT_HOSTNAME", "localhost:3000"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config, ClientConfig::with_hostname("42", "s3cr3t", "localhost:3000"));
    }

    #[test]
    fn from_lookup_defaults_hostname() {
        let config = ClientConfig::from_lookup(|k| match k {
            "CARROT_APP_ID" => Some("42".to_string()),
            "CARROT_APP_SECRET" => Some("s3cr3t".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.hostname(), DEFAULT_HOSTNAME);
    }

    #[test]
    fn from_lookup_requires_secret() {
        let err = ClientConfig::from_lookup(|k| match k {
            "CARROT_APP_ID" => Some("42".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::MissingEnv("CARROT_APP_SECRET")));
    }
}
