//! Configuration for the remote query endpoint.
//!
//! Each field is layered: an explicit value wins, otherwise a fixed
//! environment variable is consulted. Resolution happens once, before any
//! network activity, and fails with [`AppError::Config`] when a required
//! field is absent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, AppResult};

/// Environment variable holding the base URL of the database API.
pub const DB_URL_ENV: &str = "DB_URL";
/// Environment variable holding the application identifier.
pub const DB_APP_ID_ENV: &str = "DB_APP_ID";
/// Environment variable holding the bearer token.
pub const DB_TOKEN_ENV: &str = "DB_TOKEN";

const MISSING_APP_SCOPED: &str = "Missing database configuration. Provide url, appId, and token in config or set DB_URL, DB_APP_ID, and DB_TOKEN environment variables.";
const MISSING_DIRECT: &str = "Missing database configuration. Provide url and token in config or set DB_URL and DB_TOKEN environment variables.";

/// How the query endpoint is derived from the base URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndpointShape {
    /// `POST {url}/api/{appId}/query`; the application identifier is required.
    #[default]
    AppScoped,
    /// `POST {url}`; no application identifier.
    Direct,
}

impl EndpointShape {
    fn missing_message(&self) -> &'static str {
        match self {
            EndpointShape::AppScoped => MISSING_APP_SCOPED,
            EndpointShape::Direct => MISSING_DIRECT,
        }
    }
}

impl fmt::Display for EndpointShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointShape::AppScoped => write!(f, "app-scoped"),
            EndpointShape::Direct => write!(f, "direct"),
        }
    }
}

impl FromStr for EndpointShape {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "app-scoped" | "app_scoped" | "appscoped" => Ok(EndpointShape::AppScoped),
            "direct" => Ok(EndpointShape::Direct),
            other => Err(AppError::Config(format!("unknown endpoint shape: {}", other))),
        }
    }
}

/// Caller-supplied configuration. Unset fields fall back to the environment.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
    /// Base URL for the database API. Defaults to `DB_URL`.
    pub url: Option<String>,

    /// Application identifier. Defaults to `DB_APP_ID`.
    pub app_id: Option<String>,

    /// Bearer token for the database API. Defaults to `DB_TOKEN`.
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Endpoint layout.
    pub shape: EndpointShape,
}

impl DatabaseConfig {
    /// Creates an empty configuration; every field resolves from the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the process environment into explicit fields.
    ///
    /// Call this once at process entry and pass the result down, so deeper
    /// code never reads the environment itself.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var(DB_URL_ENV).ok(),
            app_id: std::env::var(DB_APP_ID_ENV).ok(),
            token: std::env::var(DB_TOKEN_ENV).ok(),
            shape: EndpointShape::default(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_shape(mut self, shape: EndpointShape) -> Self {
        self.shape = shape;
        self
    }

    /// Resolves the configuration against the process environment.
    pub fn resolve(&self) -> AppResult<ResolvedConfig> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration using `lookup` as the fallback source.
    ///
    /// An explicit field is used even when empty; the fallback is only
    /// consulted for fields that are `None`. Empty values then count as missing.
    pub fn resolve_with<F>(&self, lookup: F) -> AppResult<ResolvedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let layered = |explicit: &Option<String>, key: &str| {
            explicit
                .clone()
                .or_else(|| lookup(key))
                .filter(|value| !value.is_empty())
        };

        let url = layered(&self.url, DB_URL_ENV);
        let token = layered(&self.token, DB_TOKEN_ENV);
        let app_id = match self.shape {
            EndpointShape::AppScoped => layered(&self.app_id, DB_APP_ID_ENV),
            EndpointShape::Direct => None,
        };

        let missing = || AppError::Config(self.shape.missing_message().to_string());
        let (url, token) = match (url, token) {
            (Some(url), Some(token)) => (url, token),
            _ => return Err(missing()),
        };
        if self.shape == EndpointShape::AppScoped && app_id.is_none() {
            return Err(missing());
        }

        // Direct URLs are the POST target itself and are kept verbatim.
        let url = match self.shape {
            EndpointShape::AppScoped => url.trim_end_matches('/').to_string(),
            EndpointShape::Direct => url,
        };
        let resolved = ResolvedConfig {
            url,
            app_id,
            token,
            shape: self.shape,
        };
        resolved.validate().map_err(|e| {
            AppError::Config(format!("Invalid database configuration: {}", e))
        })?;
        Ok(resolved)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("app_id", &self.app_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("shape", &self.shape)
            .finish()
    }
}

/// Fully resolved configuration; every required field is present.
#[derive(Clone, Validate)]
pub struct ResolvedConfig {
    #[validate(url(message = "url must be an absolute URL"))]
    url: String,

    #[validate(length(min = 1, message = "appId must not be empty"))]
    app_id: Option<String>,

    #[validate(length(min = 1, message = "token must not be empty"))]
    token: String,

    shape: EndpointShape,
}

impl ResolvedConfig {
    /// Base URL; trailing slash trimmed for the app-scoped shape only.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn shape(&self) -> EndpointShape {
        self.shape
    }

    /// The URL every query is POSTed to.
    pub fn endpoint(&self) -> String {
        match (self.shape, self.app_id.as_deref()) {
            (EndpointShape::AppScoped, Some(app_id)) => {
                format!("{}/api/{}/query", self.url, app_id)
            }
            _ => self.url.clone(),
        }
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("url", &self.url)
            .field("app_id", &self.app_id)
            .field("token", &"<redacted>")
            .field("shape", &self.shape)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_explicit_values_resolve() {
        let resolved = DatabaseConfig::new()
            .with_url("https://db.example.com")
            .with_app_id("app-1")
            .with_token("secret")
            .resolve_with(no_env)
            .unwrap();

        assert_eq!(resolved.endpoint(), "https://db.example.com/api/app-1/query");
        assert_eq!(resolved.token(), "secret");
    }

    #[test]
    fn test_environment_fallback() {
        let lookup = env(&[
            ("DB_URL", "https://env.example.com"),
            ("DB_APP_ID", "env-app"),
            ("DB_TOKEN", "env-token"),
        ]);
        let resolved = DatabaseConfig::new().resolve_with(lookup).unwrap();

        assert_eq!(resolved.url(), "https://env.example.com");
        assert_eq!(resolved.app_id(), Some("env-app"));
        assert_eq!(resolved.token(), "env-token");
    }

    #[test]
    fn test_explicit_wins_over_environment() {
        let lookup = env(&[("DB_URL", "https://env.example.com"), ("DB_TOKEN", "env-token")]);
        let resolved = DatabaseConfig::new()
            .with_url("https://explicit.example.com")
            .with_app_id("app")
            .resolve_with(lookup)
            .unwrap();

        assert_eq!(resolved.url(), "https://explicit.example.com");
        assert_eq!(resolved.token(), "env-token");
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let err = DatabaseConfig::new()
            .with_url("https://db.example.com")
            .with_app_id("app")
            .resolve_with(no_env)
            .unwrap_err();

        assert!(err.is_config());
        assert_eq!(err.to_string(), MISSING_APP_SCOPED);
    }

    #[test]
    fn test_missing_app_id_is_config_error_when_app_scoped() {
        let err = DatabaseConfig::new()
            .with_url("https://db.example.com")
            .with_token("secret")
            .resolve_with(no_env)
            .unwrap_err();

        assert!(err.is_config());
    }

    #[test]
    fn test_direct_shape_does_not_need_app_id() {
        let resolved = DatabaseConfig::new()
            .with_url("https://db.example.com/query/")
            .with_token("secret")
            .with_shape(EndpointShape::Direct)
            .resolve_with(no_env)
            .unwrap();

        assert_eq!(resolved.endpoint(), "https://db.example.com/query/");
        assert_eq!(resolved.app_id(), None);
    }

    #[test]
    fn test_app_scoped_trims_trailing_slash() {
        let resolved = DatabaseConfig::new()
            .with_url("https://db.example.com/")
            .with_app_id("app")
            .with_token("secret")
            .resolve_with(no_env)
            .unwrap();

        assert_eq!(resolved.endpoint(), "https://db.example.com/api/app/query");
    }

    #[test]
    fn test_direct_shape_missing_token_message() {
        let err = DatabaseConfig::new()
            .with_url("https://db.example.com")
            .with_shape(EndpointShape::Direct)
            .resolve_with(no_env)
            .unwrap_err();

        assert_eq!(err.to_string(), MISSING_DIRECT);
    }

    #[test]
    fn test_explicit_empty_value_does_not_fall_back() {
        let lookup = env(&[("DB_TOKEN", "env-token")]);
        let err = DatabaseConfig::new()
            .with_url("https://db.example.com")
            .with_app_id("app")
            .with_token("")
            .resolve_with(lookup)
            .unwrap_err();

        assert!(err.is_config());
    }

    #[test]
    fn test_malformed_url_is_config_error() {
        let err = DatabaseConfig::new()
            .with_url("not a url")
            .with_app_id("app")
            .with_token("secret")
            .resolve_with(no_env)
            .unwrap_err();

        assert!(err.is_config());
        assert!(err.to_string().starts_with("Invalid database configuration"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = DatabaseConfig::new().with_token("super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));

        let resolved = config
            .with_url("https://db.example.com")
            .with_app_id("app")
            .resolve_with(no_env)
            .unwrap();
        assert!(!format!("{:?}", resolved).contains("super-secret"));
    }

    #[test]
    fn test_shape_from_str() {
        assert_eq!("direct".parse::<EndpointShape>().unwrap(), EndpointShape::Direct);
        assert_eq!("APP-SCOPED".parse::<EndpointShape>().unwrap(), EndpointShape::AppScoped);
        assert!("bogus".parse::<EndpointShape>().is_err());
    }
}
