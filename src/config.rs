use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

/// Listen address of the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// S3-compatible bucket holding meal photos.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// OpenAI-compatible chat-completions endpoint used as the nutrition oracle.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub inference: InferenceConfig,
}

fn required(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("{key} must be set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let server = ServerConfig {
            host: env_or("APP_HOST", "0.0.0.0"),
            port: env_parse_or("APP_PORT", 8080),
        };
        let database_url = required("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: env_or("JWT_ISSUER", "nutrio"),
            audience: env_or("JWT_AUDIENCE", "nutrio-users"),
            ttl_minutes: env_parse_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let storage = StorageConfig {
            endpoint: required("S3_ENDPOINT")?,
            bucket: env_or("S3_BUCKET", "nutrio-meals"),
            access_key: required("S3_ACCESS_KEY")?,
            secret_key: required("S3_SECRET_KEY")?,
            region: env_or("S3_REGION", "us-east-1"),
        };
        let inference = InferenceConfig {
            api_url: env_or(
                "INFERENCE_API_URL",
                "https://openrouter.ai/api/v1/chat/completions",
            ),
            api_key: required("INFERENCE_API_KEY")?,
            model: env_or("INFERENCE_MODEL", "openai/gpt-4o-mini"),
            timeout_secs: env_parse_or("INFERENCE_TIMEOUT_SECS", 60),
        };
        Ok(Self {
            server,
            database_url,
            jwt,
            storage,
            inference,
        })
    }
}
