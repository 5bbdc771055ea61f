//! Process configuration.
//!
//! Everything comes from environment variables (optionally seeded from a
//! `.env` file). Secrets have no default; every other value does.

use std::str::FromStr;
use std::time::Duration;

use crate::domain::PriceRules;
use crate::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:pricewatch.db?mode=rwc";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 30 * 60;
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;
pub const DEFAULT_SCRAPER_URL: &str = "http://localhost:8000";
pub const DEFAULT_SCRAPER_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_SCRAPER_RETRY_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_SCRAPER_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPSTREAM_API_URL: &str = "https://api.mercadolibre.com";
pub const DEFAULT_UPSTREAM_AUTH_URL: &str = "https://auth.mercadolivre.com.br/authorization";
pub const DEFAULT_UPSTREAM_DOMAINS: &str = "mercadolivre.com.br,mercadolibre.com";
pub const DEFAULT_EMAIL_API_URL: &str = "https://api.brevo.com/v3/smtp/email";
pub const DEFAULT_EMAIL_FROM_NAME: &str = "Price Monitor";
pub const DEFAULT_INITIAL_FETCH_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_dir: String,
    /// Write the log file as JSON lines instead of plain text.
    pub log_json: bool,
    pub scheduler: SchedulerConfig,
    pub fanout: FanOutConfig,
    pub scraper: ScraperConfig,
    pub upstream: UpstreamConfig,
    pub price_rules: PriceRules,
    pub telegram: TelegramConfig,
    pub email: EmailConfig,
    pub items: ItemConfig,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub check_interval: Duration,
    pub run_on_startup: bool,
}

#[derive(Debug, Clone)]
pub struct FanOutConfig {
    pub max_concurrent_fetches: usize,
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub max_attempts: u32,
    pub retry_base_delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_url: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Hosts (and their subdomains) served by the authenticated API.
    pub domains: Vec<String>,
}

impl UpstreamConfig {
    /// OAuth client configured.
    pub fn has_client(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub from_address: String,
    pub from_name: String,
}

#[derive(Debug, Clone)]
pub struct ItemConfig {
    pub initial_fetch_timeout: Duration,
}

impl AppConfig {
    /// Load `.env` (when present) and read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let string_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let tolerance: f64 = parse_or(&get, "PRICE_TOLERANCE", crate::domain::price::DEFAULT_PRICE_TOLERANCE)?;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(Error::config(format!(
                "PRICE_TOLERANCE must be a non-negative number, got {tolerance}"
            )));
        }
        let resample_hours: i64 = parse_or(
            &get,
            "RESAMPLE_WINDOW_HOURS",
            crate::domain::price::DEFAULT_RESAMPLE_WINDOW_HOURS,
        )?;

        let max_concurrent_fetches: usize =
            parse_or(&get, "MAX_CONCURRENT_FETCHES", DEFAULT_MAX_CONCURRENT_FETCHES)?;
        if max_concurrent_fetches == 0 {
            return Err(Error::config("MAX_CONCURRENT_FETCHES must be at least 1"));
        }

        let check_interval_secs: u64 =
            parse_or(&get, "CHECK_INTERVAL_SECS", DEFAULT_CHECK_INTERVAL_SECS)?;
        if check_interval_secs == 0 {
            return Err(Error::config("CHECK_INTERVAL_SECS must be at least 1"));
        }

        Ok(Self {
            database_url: string_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            log_dir: string_or("LOG_DIR", DEFAULT_LOG_DIR),
            log_json: parse_bool(&get, "LOG_JSON", false)?,
            scheduler: SchedulerConfig {
                check_interval: Duration::from_secs(check_interval_secs),
                run_on_startup: parse_bool(&get, "RUN_ON_STARTUP", false)?,
            },
            fanout: FanOutConfig {
                max_concurrent_fetches,
            },
            scraper: ScraperConfig {
                base_url: string_or("SCRAPER_API_URL", DEFAULT_SCRAPER_URL),
                max_attempts: parse_or(&get, "SCRAPER_MAX_ATTEMPTS", DEFAULT_SCRAPER_MAX_ATTEMPTS)?
                    .max(1),
                retry_base_delay: Duration::from_millis(parse_or(
                    &get,
                    "SCRAPER_RETRY_BASE_DELAY_MS",
                    DEFAULT_SCRAPER_RETRY_BASE_DELAY_MS,
                )?),
                timeout: Duration::from_secs(parse_or(
                    &get,
                    "SCRAPER_TIMEOUT_SECS",
                    DEFAULT_SCRAPER_TIMEOUT_SECS,
                )?),
            },
            upstream: UpstreamConfig {
                api_url: string_or("UPSTREAM_API_URL", DEFAULT_UPSTREAM_API_URL),
                auth_url: string_or("UPSTREAM_AUTH_URL", DEFAULT_UPSTREAM_AUTH_URL),
                client_id: string_or("UPSTREAM_CLIENT_ID", ""),
                client_secret: string_or("UPSTREAM_CLIENT_SECRET", ""),
                redirect_uri: string_or("UPSTREAM_REDIRECT_URI", ""),
                domains: string_or("UPSTREAM_DOMAINS", DEFAULT_UPSTREAM_DOMAINS)
                    .split(',')
                    .map(|d| d.trim().to_ascii_lowercase())
                    .filter(|d| !d.is_empty())
                    .collect(),
            },
            price_rules: PriceRules {
                tolerance,
                resample_window: chrono::Duration::hours(resample_hours.max(0)),
            },
            telegram: TelegramConfig {
                bot_token: get("TELEGRAM_BOT_TOKEN"),
            },
            email: EmailConfig {
                api_key: get("BREVO_API_KEY"),
                api_url: string_or("EMAIL_API_URL", DEFAULT_EMAIL_API_URL),
                from_address: string_or("EMAIL_FROM_ADDRESS", ""),
                from_name: string_or("EMAIL_FROM_NAME", DEFAULT_EMAIL_FROM_NAME),
            },
            items: ItemConfig {
                initial_fetch_timeout: Duration::from_secs(parse_or(
                    &get,
                    "INITIAL_FETCH_TIMEOUT_SECS",
                    DEFAULT_INITIAL_FETCH_TIMEOUT_SECS,
                )?),
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::config(format!("invalid {key}={raw:?}: {e}"))),
    }
}

fn parse_bool<G>(get: &G, key: &str, default: bool) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(Error::config(format!("invalid {key}={v:?}: expected a boolean"))),
        },
    }
}
