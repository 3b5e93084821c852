use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("ADLY_JWT_SECRET is still a placeholder")]
    PlaceholderSecret,

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    Google { client_id: String, client_secret: String },
    Dev { email: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub public_url: Url,
    pub provider: ProviderConfig,
    pub session_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = get("ADLY_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("ADLY_JWT_SECRET"))?;
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::PlaceholderSecret);
        }

        let port_raw = var("ADLY_PORT", "3000");
        let port = port_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "ADLY_PORT",
            value: port_raw.clone(),
        })?;

        let public_raw = var("ADLY_PUBLIC_URL", "http://localhost:3000");
        let public_url = Url::parse(&public_raw).map_err(|_| ConfigError::Invalid {
            key: "ADLY_PUBLIC_URL",
            value: public_raw.clone(),
        })?;

        let ttl_raw = var("ADLY_SESSION_TTL_HOURS", "720"); // 30 days
        let session_ttl_hours = ttl_raw
            .parse()
            .ok()
            .filter(|h: &i64| *h > 0)
            .ok_or(ConfigError::Invalid {
                key: "ADLY_SESSION_TTL_HOURS",
                value: ttl_raw.clone(),
            })?;

        let provider = match var("ADLY_AUTH_PROVIDER", "google").as_str() {
            "google" => ProviderConfig::Google {
                client_id: get("ADLY_GOOGLE_CLIENT_ID").ok_or(ConfigError::Missing("ADLY_GOOGLE_CLIENT_ID"))?,
                client_secret: get("ADLY_GOOGLE_CLIENT_SECRET")
                    .ok_or(ConfigError::Missing("ADLY_GOOGLE_CLIENT_SECRET"))?,
            },
            "dev" => ProviderConfig::Dev {
                email: var("ADLY_DEV_EMAIL", "dev@localhost"),
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "ADLY_AUTH_PROVIDER",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            host: var("ADLY_HOST", "0.0.0.0"),
            port,
            db_path: var("ADLY_DB_PATH", "adly.db").into(),
            jwt_secret,
            public_url,
            provider,
            session_ttl_hours,
        })
    }

    /// OAuth callback registered with the provider.
    pub fn redirect_uri(&self) -> String {
        let base = self.public_url.as_str().trim_end_matches('/');
        format!("{}/auth/callback", base)
    }

    pub fn secure_cookies(&self) -> bool {
        self.public_url.scheme() == "https"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_with_dev_provider() {
        let cfg = load(&[("ADLY_JWT_SECRET", "abc"), ("ADLY_AUTH_PROVIDER", "dev")]).unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.session_ttl_hours, 720);
        assert_eq!(cfg.provider, ProviderConfig::Dev { email: "dev@localhost".into() });
        assert_eq!(cfg.redirect_uri(), "http://localhost:3000/auth/callback");
        assert!(!cfg.secure_cookies());
    }

    #[test]
    fn secret_is_required_and_not_a_placeholder() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("ADLY_JWT_SECRET"))));
        assert!(matches!(
            load(&[("ADLY_JWT_SECRET", "dev-secret-change-me")]),
            Err(ConfigError::PlaceholderSecret)
        ));
    }

    #[test]
    fn google_needs_client_credentials() {
        let err = load(&[("ADLY_JWT_SECRET", "abc")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ADLY_GOOGLE_CLIENT_ID")));

        let cfg = load(&[
            ("ADLY_JWT_SECRET", "abc"),
            ("ADLY_GOOGLE_CLIENT_ID", "id"),
            ("ADLY_GOOGLE_CLIENT_SECRET", "shh"),
            ("ADLY_PUBLIC_URL", "https://ads.example.com/"),
        ])
        .unwrap();
        assert_eq!(cfg.redirect_uri(), "https://ads.example.com/auth/callback");
        assert!(cfg.secure_cookies());
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = load(&[("ADLY_JWT_SECRET", "abc"), ("ADLY_AUTH_PROVIDER", "dev"), ("ADLY_PORT", "http")])
            .unwrap_err();
        assert_eq!(err.to_string(), "ADLY_PORT has an invalid value 'http'");
    }
}
