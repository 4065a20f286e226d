use std::time::Duration;

use url::Url;

use crate::constants::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_TABLE};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub watchlist: Vec<String>,
    pub storage: StorageConfig,
    pub telegram: Option<TelegramConfig>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    /// Embedded SQLite file.
    Local { path: String },
    /// Pre-provisioned Supabase table reached over HTTPS.
    Remote(SupabaseConfig),
    /// Process-local store for dry runs; nothing survives the run.
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseConfig {
    pub url: Url,
    pub api_key: String,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let watchlist = parse_watchlist(
            &non_empty(&lookup, "TICKERS").ok_or_else(|| Error::Config("TICKERS not set".into()))?,
        );
        if watchlist.is_empty() {
            return Err(Error::Config("TICKERS contains no symbols".into()));
        }

        let telegram = match (
            non_empty(&lookup, "TELEGRAM_BOT_TOKEN"),
            non_empty(&lookup, "TELEGRAM_CHAT_ID"),
        ) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => None,
        };

        Ok(Config {
            watchlist,
            storage: StorageConfig::from_lookup(&lookup)?,
            telegram,
            request_timeout: request_timeout_from_lookup(&lookup)?,
        })
    }
}

impl StorageConfig {
    /// Storage settings alone, for read-only tools that have no watchlist.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let supabase = match (
            non_empty(&lookup, "SUPABASE_URL"),
            non_empty(&lookup, "SUPABASE_ANON_KEY"),
        ) {
            (Some(url), Some(api_key)) => Some(SupabaseConfig {
                url: Url::parse(&url)?,
                api_key,
                table: non_empty(&lookup, "SUPABASE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            }),
            _ => None,
        };
        let db_name = non_empty(&lookup, "DB_NAME");

        let backend = non_empty(&lookup, "STORE_BACKEND").map(|b| b.to_lowercase());
        let storage = match backend.as_deref() {
            Some("remote") => StorageConfig::Remote(supabase.ok_or_else(|| {
                Error::Config("STORE_BACKEND=remote requires SUPABASE_URL and SUPABASE_ANON_KEY".into())
            })?),
            Some("local") => StorageConfig::Local {
                path: db_name
                    .ok_or_else(|| Error::Config("STORE_BACKEND=local requires DB_NAME".into()))?,
            },
            Some("memory") => StorageConfig::Memory,
            Some(other) => {
                return Err(Error::Config(format!("Unknown STORE_BACKEND: {}", other)));
            }
            None => match (supabase, db_name) {
                (Some(remote), _) => StorageConfig::Remote(remote),
                (None, Some(path)) => StorageConfig::Local { path },
                (None, None) => {
                    return Err(Error::Config("no storage backend configured".into()));
                }
            },
        };

        Ok(storage)
    }
}

pub fn request_timeout_from_env() -> Result<Duration> {
    dotenv::dotenv().ok();

    request_timeout_from_lookup(|key| std::env::var(key).ok())
}

/// `REQUEST_TIMEOUT_SECS`, falling back to the default when unset.
pub fn request_timeout_from_lookup<F>(lookup: F) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    match non_empty(&lookup, "REQUEST_TIMEOUT_SECS") {
        Some(raw) => {
            let secs: u64 = raw
                .parse()
                .map_err(|_| Error::Config(format!("Invalid REQUEST_TIMEOUT_SECS: {}", raw)))?;
            if secs == 0 {
                return Err(Error::Config("REQUEST_TIMEOUT_SECS must be positive".into()));
            }
            Ok(Duration::from_secs(secs))
        }
        None => Ok(DEFAULT_REQUEST_TIMEOUT),
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn parse_watchlist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
