use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, VetError};

/// Backend base URL used when no configuration file can be loaded.
pub const FALLBACK_API_BASE_URL: &str = "https://chat.clinicpaws.com/api";

/// Default port for the relay server.
pub const DEFAULT_PORT: u16 = 6543;

/// Top-level configuration for the relay and the chat client.
///
/// Loaded from `public/config.json` by default. A file containing only
/// `{ "apiBaseUrl": "..." }` is valid; every other field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VetConfig {
    /// Base URL of the external REST backend, without trailing path.
    pub api_base_url: String,
    /// Provider forwarded to the backend when a request does not name one.
    pub default_provider: String,
    /// Timeout in seconds for outbound HTTP calls. `0` disables it.
    pub request_timeout_secs: u64,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    pub server: ServerConfig,
    pub client: ClientConfig,
}

impl Default for VetConfig {
    fn default() -> Self {
        Self {
            api_base_url: FALLBACK_API_BASE_URL.to_string(),
            default_provider: "Gemini".to_string(),
            request_timeout_secs: 120,
            log_level: "info".to_string(),
            server: ServerConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl VetConfig {
    /// Load configuration from a JSON file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VetConfig = serde_json::from_str(&content)
            .map_err(|e| VetError::Config(format!("{}: {}", path.display(), e)))?;
        if config.api_base_url.trim().is_empty() {
            return Err(VetError::Config(format!(
                "{}: apiBaseUrl must not be empty",
                path.display()
            )));
        }
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to `VetConfig::default()`.
    ///
    /// The load error is handed back so the caller can report it once
    /// logging is up.
    pub fn load_or_default(path: &Path) -> (Self, Option<VetError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Save the current configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Outbound request timeout, or `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// Relay server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding `chat.html` and other static assets.
    pub public_dir: String,
    /// Origins allowed by CORS. Empty means localhost on `port`.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            public_dir: "public".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Terminal chat client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Base URL of the relay the client talks to.
    pub relay_url: String,
    /// LLM provider requested by the client.
    pub provider: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: format!("http://127.0.0.1:{}", DEFAULT_PORT),
            provider: "Gemini".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = VetConfig::default();
        assert_eq!(config.api_base_url, FALLBACK_API_BASE_URL);
        assert_eq!(config.default_provider, "Gemini");
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 6543);
        assert_eq!(config.server.public_dir, "public");
        assert!(config.server.allowed_origins.is_empty());
        assert_eq!(config.client.relay_url, "http://127.0.0.1:6543");
        assert_eq!(config.client.provider, "Gemini");
    }

    #[test]
    fn test_load_minimal_config() {
        let file = create_temp_config(r#"{ "apiBaseUrl": "http://10.0.0.5:7860" }"#);
        let config = VetConfig::load(file.path()).unwrap();
        assert_eq!(config.api_base_url, "http://10.0.0.5:7860");
        // Everything else falls back to defaults.
        assert_eq!(config.server.port, 6543);
        assert_eq!(config.client.provider, "Gemini");
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"{
            "apiBaseUrl": "http://backend:7860",
            "defaultProvider": "Ollama",
            "requestTimeoutSecs": 0,
            "logLevel": "debug",
            "server": {
                "host": "127.0.0.1",
                "port": 8080,
                "publicDir": "/srv/vetllm",
                "allowedOrigins": ["http://clinic.local"]
            },
            "client": { "relayUrl": "http://relay:8080", "provider": "Ollama" }
        }"#;
        let file = create_temp_config(content);
        let config = VetConfig::load(file.path()).unwrap();
        assert_eq!(config.default_provider, "Ollama");
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.public_dir, "/srv/vetllm");
        assert_eq!(config.server.allowed_origins, vec!["http://clinic.local"]);
        assert_eq!(config.client.relay_url, "http://relay:8080");
    }

    #[test]
    fn test_load_invalid_json() {
        let file = create_temp_config("{ apiBaseUrl: nope");
        let err = VetConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, VetError::Config(_)));
    }

    #[test]
    fn test_load_rejects_empty_base_url() {
        let file = create_temp_config(r#"{ "apiBaseUrl": "  " }"#);
        assert!(VetConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = VetConfig::load(Path::new("/does/not/exist/config.json")).unwrap_err();
        assert!(matches!(err, VetError::Io(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let (config, err) = VetConfig::load_or_default(Path::new("/does/not/exist/config.json"));
        assert_eq!(config, VetConfig::default());
        assert_eq!(config.api_base_url, FALLBACK_API_BASE_URL);
        assert!(matches!(err, Some(VetError::Io(_))));
    }

    #[test]
    fn test_load_or_default_unparsable_file() {
        let file = create_temp_config("not json at all");
        let (config, err) = VetConfig::load_or_default(file.path());
        assert_eq!(config, VetConfig::default());
        assert!(matches!(err, Some(VetError::Config(_))));
    }

    #[test]
    fn test_load_or_default_valid_file() {
        let file = create_temp_config(r#"{ "apiBaseUrl": "http://10.0.0.5:7860" }"#);
        let (config, err) = VetConfig::load_or_default(file.path());
        assert_eq!(config.api_base_url, "http://10.0.0.5:7860");
        assert!(err.is_none());
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = VetConfig::default();
        config.api_base_url = "http://saved:1234".to_string();
        config.server.port = 9000;
        config.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"apiBaseUrl\""));

        let reloaded = VetConfig::load(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_request_timeout() {
        let mut config = VetConfig::default();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(120)));
        config.request_timeout_secs = 5;
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
    }
}
