use anyhow::{Context, anyhow, bail};
use std::{env, fmt, path::PathBuf, time::Duration};
use url::Url;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;
const DEFAULT_JSON_BODY_LIMIT_BYTES: usize = 20 * 1024;
const DEFAULT_CLOUDINARY_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Server configuration loaded from environment variables (and `.env`).
#[derive(Clone)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Database settings
    pub database_url: String,
    pub database_max_connections: u32,

    /// Explicit origins; empty means any origin without credentials.
    pub cors_origins: Vec<String>,

    // Token signing
    pub access_token_secret: String,
    pub access_token_expiry: Duration,
    pub refresh_token_secret: String,
    pub refresh_token_expiry: Duration,

    pub cloudinary: CloudinaryConfig,

    // Uploads
    pub upload_temp_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub json_body_limit_bytes: usize,
}

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub base_url: Url,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("database_max_connections", &self.database_max_connections)
            .field("cors_origins", &self.cors_origins)
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("cloudinary", &self.cloudinary)
            .field("upload_temp_dir", &self.upload_temp_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("json_body_limit_bytes", &self.json_body_limit_bytes)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |key: &str| var(key).ok_or_else(|| anyhow!("{key} must be set"));

        let database_url = required("DATABASE_URL")?;
        if !(database_url.starts_with("postgres://")
            || database_url.starts_with("postgresql://"))
        {
            bail!("Invalid DATABASE_URL: must start with postgres:// or postgresql://");
        }

        let base_url = var("CLOUDINARY_BASE_URL")
            .unwrap_or_else(|| DEFAULT_CLOUDINARY_BASE_URL.to_string());
        let base_url = Url::parse(&base_url)
            .with_context(|| format!("CLOUDINARY_BASE_URL is not a valid URL: {base_url}"))?;

        Ok(Self {
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or(var("SERVER_PORT"), "SERVER_PORT", 8000)?,

            database_url,
            database_max_connections: parse_or(
                var("DATABASE_MAX_CONNECTIONS"),
                "DATABASE_MAX_CONNECTIONS",
                10,
            )?,

            cors_origins: parse_origins(var("CORS_ORIGIN").as_deref()),

            access_token_secret: required("ACCESS_TOKEN_SECRET")?,
            access_token_expiry: parse_duration(
                var("ACCESS_TOKEN_EXPIRY"),
                "ACCESS_TOKEN_EXPIRY",
                "1d",
            )?,
            refresh_token_secret: required("REFRESH_TOKEN_SECRET")?,
            refresh_token_expiry: parse_duration(
                var("REFRESH_TOKEN_EXPIRY"),
                "REFRESH_TOKEN_EXPIRY",
                "10d",
            )?,

            cloudinary: CloudinaryConfig {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
                base_url,
            },

            upload_temp_dir: var("UPLOAD_TEMP_DIR")
                .unwrap_or_else(|| "./public/temp".to_string())
                .into(),
            max_upload_bytes: parse_or(
                var("MAX_UPLOAD_BYTES"),
                "MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            json_body_limit_bytes: parse_or(
                var("JSON_BODY_LIMIT_BYTES"),
                "JSON_BODY_LIMIT_BYTES",
                DEFAULT_JSON_BODY_LIMIT_BYTES,
            )?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

fn parse_duration(value: Option<String>, key: &str, default: &str) -> anyhow::Result<Duration> {
    let raw = value.unwrap_or_else(|| default.to_string());
    let duration = humantime::parse_duration(&raw)
        .with_context(|| format!("{key} is not a valid duration: {raw}"))?;
    if duration.is_zero() {
        bail!("{key} must be greater than zero");
    }
    Ok(duration)
}

/// `*` (or nothing) allows any origin.
fn parse_origins(value: Option<&str>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty() && *origin != "*")
            .map(str::to_string)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgres://vidora@localhost/vidora"),
            ("ACCESS_TOKEN_SECRET", "access-secret"),
            ("REFRESH_TOKEN_SECRET", "refresh-secret"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "secret"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> anyhow::Result<Config> {
        Config::from_lookup(|key| env.get(key).map(|value| value.to_string()))
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let config = load(&base_env()).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.access_token_expiry, Duration::from_secs(86_400));
        assert_eq!(config.refresh_token_expiry, Duration::from_secs(864_000));
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.upload_temp_dir, PathBuf::from("./public/temp"));
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.json_body_limit_bytes, 20 * 1024);
        assert_eq!(
            config.cloudinary.base_url.as_str(),
            "https://api.cloudinary.com/v1_1"
        );
    }

    #[test]
    fn humantime_expiries_and_origin_lists_are_parsed() {
        let mut env = base_env();
        env.insert("ACCESS_TOKEN_EXPIRY", "15m");
        env.insert("CORS_ORIGIN", "https://a.example, https://b.example");
        env.insert("SERVER_PORT", "9090");

        let config = load(&env).unwrap();
        assert_eq!(config.access_token_expiry, Duration::from_secs(900));
        assert_eq!(
            config.cors_origins,
            ["https://a.example", "https://b.example"]
        );
        assert_eq!(config.server_port, 9090);
    }

    #[test]
    fn wildcard_origin_means_any() {
        let mut env = base_env();
        env.insert("CORS_ORIGIN", "*");
        assert!(load(&env).unwrap().cors_origins.is_empty());
    }

    #[test]
    fn missing_secret_is_reported_by_name() {
        let mut env = base_env();
        env.remove("REFRESH_TOKEN_SECRET");
        let err = load(&env).unwrap_err();
        assert!(err.to_string().contains("REFRESH_TOKEN_SECRET"));
    }

    #[test]
    fn non_postgres_urls_are_rejected() {
        let mut env = base_env();
        env.insert("DATABASE_URL", "mysql://localhost/vidora");
        assert!(load(&env).is_err());
    }

    #[test]
    fn garbage_durations_are_rejected() {
        let mut env = base_env();
        env.insert("REFRESH_TOKEN_EXPIRY", "soon");
        assert!(load(&env).is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = load(&base_env()).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("access-secret"));
        assert!(!rendered.contains("postgres://"));
    }
}
