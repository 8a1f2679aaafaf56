use crate::handlers::mock_feed::FeedSettings;
use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use jsonwebtoken::Algorithm;
use std::{env, path::PathBuf, str::FromStr};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_secs: i64,
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub token: TokenSettings,
    pub cors_allowed_origin: Option<String>,
    pub user_directory_path: Option<PathBuf>,
    pub access_policy: Option<String>,
    pub feed: FeedSettings,
}

impl AppConfig {
    /// Loads `.env` (if any), then reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret = get("JWT_SECRET").context("JWT_SECRET must be set")?;

        let algorithm = match get("JWT_ALGORITHM") {
            Some(raw) => parse_algorithm(&raw)?,
            None => Algorithm::HS256,
        };

        let ttl_secs = parse_or("TOKEN_TTL_SECS", get("TOKEN_TTL_SECS"), DEFAULT_TOKEN_TTL_SECS)?;
        if ttl_secs <= 0 {
            bail!("TOKEN_TTL_SECS must be positive, got {}", ttl_secs);
        }

        let defaults = FeedSettings::default();
        let feed = FeedSettings {
            total_pages: parse_or("FEED_TOTAL_PAGES", get("FEED_TOTAL_PAGES"), defaults.total_pages)?,
            max_limit: parse_or("FEED_MAX_LIMIT", get("FEED_MAX_LIMIT"), defaults.max_limit)?,
        };
        if feed.max_limit == 0 {
            bail!("FEED_MAX_LIMIT must be at least 1");
        }

        Ok(AppConfig {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            token: TokenSettings {
                secret,
                algorithm,
                ttl_secs,
            },
            cors_allowed_origin: get("CORS_ALLOWED_ORIGIN"),
            user_directory_path: get("USER_DIRECTORY_PATH").map(PathBuf::from),
            access_policy: get("ACCESS_POLICY"),
            feed,
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has invalid value {:?}", key, raw)),
        None => Ok(default),
    }
}

// Only HMAC algorithms make sense with a shared secret.
fn parse_algorithm(raw: &str) -> Result<Algorithm> {
    let algorithm = Algorithm::from_str(raw.trim())
        .with_context(|| format!("JWT_ALGORITHM has invalid value {:?}", raw))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => bail!("JWT_ALGORITHM {:?} is not an HMAC algorithm", other),
    }
}
