use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub documents: DocumentConfig,
    pub node: NodeConfig,
    pub rate_limit: RateLimitConfig,
    pub sessions: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_address: String,
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Length of generated document identifiers
    pub id_length: usize,
    /// Serialized content ceiling in bytes
    pub max_content_bytes: usize,
    /// Minimum length for document passwords
    pub min_password_length: usize,
    /// How often the background sweep deletes expired documents (seconds)
    pub sweep_interval_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Minimum length for account passwords
    pub min_password_length: usize,
    /// Signing secret for session tokens. None means a random per-process
    /// secret is generated at startup, invalidating all sessions on restart.
    pub secret: Option<String>,
    /// Mark the session cookie Secure (HTTPS-only deployments)
    pub secure_cookies: bool,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum document creations per window per client
    pub max_creations: u32,
    pub window_seconds: u64,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            id_length: 10,
            max_content_bytes: 256 * 1024,
            min_password_length: 4,
            sweep_interval_seconds: 60,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            secret: None,
            secure_cookies: false,
            ttl_seconds: 7 * 86400, // 7 days
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_creations: 30,
            window_seconds: 60,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let max_content_bytes = std::env::var("MAX_CONTENT_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256 * 1024);

        let sweep_interval_seconds = std::env::var("SWEEP_INTERVAL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let session_ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(7 * 86400);

        let secret = std::env::var("SESSION_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let secure_cookies = std::env::var("SECURE_COOKIES")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let max_creations = std::env::var("RATE_LIMIT_MAX_CREATIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let window_seconds = std::env::var("RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let config = Config {
            documents: DocumentConfig {
                max_content_bytes,
                sweep_interval_seconds,
                ..Default::default()
            },
            node: NodeConfig {
                bind_address,
                data_dir,
            },
            rate_limit: RateLimitConfig {
                max_creations,
                window_seconds,
            },
            sessions: SessionConfig {
                secret,
                secure_cookies,
                ttl_seconds: session_ttl_seconds,
                ..Default::default()
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.documents.max_content_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_CONTENT_BYTES must be greater than 0".to_string(),
            ));
        }
        if self.documents.sweep_interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "SWEEP_INTERVAL_SECONDS must be greater than 0".to_string(),
            ));
        }
        if self.sessions.ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "SESSION_TTL_SECONDS must be greater than 0".to_string(),
            ));
        }
        if self.rate_limit.max_creations == 0 || self.rate_limit.window_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "rate limit window and ceiling must be greater than 0".to_string(),
            ));
        }

        if self.sessions.secret.is_none() {
            tracing::warn!(
                "SESSION_SECRET is not configured. A random signing secret will be \
                 generated at startup; all existing sessions become invalid on restart."
            );
        }

        Ok(())
    }
}
