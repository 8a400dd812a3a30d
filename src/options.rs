//! Client options
//!
//! Options come from `config.toml` in the user config directory, with the API
//! key overridable through the `DEEPGRAM_API_KEY` environment variable (a
//! `.env` file is honoured). Every problem found here is a [`SetupError`]:
//! it is raised before any request is attempted.

use crate::error::SetupError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use url::Url;
use zeroize::Zeroize;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "DEEPGRAM_API_KEY";

const DEFAULT_URL: &str = "https://api.deepgram.com";

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

#[derive(Clone, Deserialize)]
pub struct ClientOptions {
    #[serde(default)]
    api_key: String,
    #[serde(default = "default_url")]
    url: String,
    /// Turn response warnings into errors
    #[serde(default)]
    raise_warnings_as_errors: bool,
    /// Extra headers sent with every request
    #[serde(default)]
    headers: HashMap<String, String>,
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("api_key", &"<redacted>")
            .field("url", &self.url)
            .field("raise_warnings_as_errors", &self.raise_warnings_as_errors)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Get the config file path
fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("deepgram").join("config.toml"))
}

impl ClientOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            url: default_url(),
            raise_warnings_as_errors: false,
            headers: HashMap::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn raise_warnings_as_errors(mut self, enabled: bool) -> Self {
        self.raise_warnings_as_errors = enabled;
        self
    }

    /// Parse options from TOML. The result is not validated yet.
    pub fn from_toml_str(contents: &str) -> Result<Self, SetupError> {
        toml::from_str(contents)
            .map_err(|e| SetupError::new(format!("Invalid client configuration: {}", e)))
    }

    /// Load options from the config file and environment, then validate them
    pub fn load() -> Result<Self, SetupError> {
        Self::load_from(config_path())
    }

    fn load_from(path: Option<PathBuf>) -> Result<Self, SetupError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }

        let mut options = match path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(&path).map_err(|e| {
                    SetupError::new(format!("Failed to read {}: {}", path.display(), e))
                })?;
                info!("Loaded client configuration from: {:?}", path);
                Self::from_toml_str(&contents)?
            }
            _ => Self::default(),
        };

        if let Ok(api_key) = std::env::var(API_KEY_ENV) {
            options.api_key.zeroize();
            options.api_key = api_key;
        }

        options.validate()?;
        Ok(options)
    }

    /// Check the options before they are used for a request
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.api_key.trim().is_empty() {
            return Err(SetupError::new(format!(
                "Deepgram API key is not set (set {} or api_key in config.toml)",
                API_KEY_ENV
            )));
        }

        if self
            .headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case("authorization"))
        {
            return Err(SetupError::new(
                "Authorization header conflicts with api_key; set only one of them",
            ));
        }

        self.base_url().map(|_| ())
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn warnings_are_errors(&self) -> bool {
        self.raise_warnings_as_errors
    }

    /// Base URL of the API. A bare host gets `https://`.
    pub fn base_url(&self) -> Result<Url, SetupError> {
        let raw = self.url.trim().trim_end_matches('/');
        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };

        let url = Url::parse(&with_scheme)
            .map_err(|e| SetupError::new(format!("Invalid API URL `{}`: {}", self.url, e)))?;

        match url.scheme() {
            "http" | "https" | "ws" | "wss" => Ok(url),
            other => Err(SetupError::new(format!(
                "Unsupported URL scheme `{}` in `{}`",
                other, self.url
            ))),
        }
    }

    /// Streaming URL for `endpoint`, e.g. `v1/listen`
    pub fn websocket_url(&self, endpoint: &str) -> Result<Url, SetupError> {
        let mut url = self.base_url()?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            _ => "wss",
        };
        url.set_scheme(scheme)
            .map_err(|_| SetupError::new(format!("Cannot use `{}` for streaming", self.url)))?;
        url.join(endpoint.trim_start_matches('/'))
            .map_err(|e| SetupError::new(format!("Invalid endpoint `{}`: {}", endpoint, e)))
    }
}

impl Drop for ClientOptions {
    fn drop(&mut self) {
        // Clear API key from memory
        self.api_key.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ClientOptions::default();
        assert!(options.api_key().is_empty());
        assert_eq!(options.base_url().unwrap().as_str(), "https://api.deepgram.com/");
        assert!(!options.warnings_are_errors());
    }

    #[test]
    fn test_missing_api_key_is_setup_error() {
        let err = ClientOptions::default().validate().unwrap_err();
        assert!(err.message().contains("API key is not set"));
    }

    #[test]
    fn test_valid_options() {
        let options = ClientOptions::new("secret").with_url("api.deepgram.com");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_authorization_header_conflicts_with_api_key() {
        let options = ClientOptions::new("secret").with_header("Authorization", "Token other");
        let err = options.validate().unwrap_err();
        assert!(err.message().contains("Authorization header conflicts"));
    }

    #[test]
    fn test_unsupported_scheme() {
        let options = ClientOptions::new("secret").with_url("ftp://api.deepgram.com");
        let err = options.validate().unwrap_err();
        assert!(err.message().contains("Unsupported URL scheme `ftp`"));
    }

    #[test]
    fn test_invalid_url() {
        let options = ClientOptions::new("secret").with_url("https://exa mple.com");
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_from_toml() {
        let options = ClientOptions::from_toml_str(
            r#"
            api_key = "secret"
            url = "https://example.com"
            raise_warnings_as_errors = true

            [headers]
            "X-Trace" = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(options.api_key(), "secret");
        assert!(options.warnings_are_errors());
        assert_eq!(options.headers().get("X-Trace"), Some(&"abc".to_string()));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_invalid_toml_is_setup_error() {
        let err = ClientOptions::from_toml_str("api_key = ").unwrap_err();
        assert!(err.message().starts_with("Invalid client configuration"));
    }

    #[test]
    fn test_websocket_url() {
        let options = ClientOptions::new("secret");
        assert_eq!(
            options.websocket_url("v1/listen").unwrap().as_str(),
            "wss://api.deepgram.com/v1/listen"
        );

        let local = ClientOptions::new("secret").with_url("http://localhost:8080/");
        assert_eq!(
            local.websocket_url("/v1/listen").unwrap().as_str(),
            "ws://localhost:8080/v1/listen"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let options = ClientOptions::new("super-secret");
        assert!(!format!("{:?}", options).contains("super-secret"));
    }

    #[test]
    fn test_load_reads_file_and_env_override() {
        let dir = std::env::temp_dir().join(format!("deepgram-options-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(
            &path,
            "api_key = \"from-file\"\nurl = \"http://localhost:8080\"\n",
        )
        .unwrap();

        std::env::remove_var(API_KEY_ENV);
        let options = ClientOptions::load_from(Some(path.clone())).unwrap();
        assert_eq!(options.api_key(), "from-file");
        assert_eq!(options.base_url().unwrap().as_str(), "http://localhost:8080/");

        std::env::set_var(API_KEY_ENV, "from-env");
        let options = ClientOptions::load_from(Some(path.clone())).unwrap();
        assert_eq!(options.api_key(), "from-env");
        assert_eq!(options.base_url().unwrap().as_str(), "http://localhost:8080/");

        let options = ClientOptions::load_from(None).unwrap();
        assert_eq!(options.api_key(), "from-env");
        assert_eq!(options.base_url().unwrap().as_str(), "https://api.deepgram.com/");

        std::env::set_var(API_KEY_ENV, "  ");
        let err = ClientOptions::load_from(None).unwrap_err();
        assert!(err.message().contains("API key is not set"));

        std::env::remove_var(API_KEY_ENV);
        let err = ClientOptions::load_from(Some(dir.join("missing.toml"))).unwrap_err();
        assert!(err.message().contains("API key is not set"));

        fs::write(&path, "api_key = ").unwrap();
        let err = ClientOptions::load_from(Some(path)).unwrap_err();
        assert!(err.message().starts_with("Invalid client configuration"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_config_path() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("deepgram/config.toml"));
        }
    }
}
