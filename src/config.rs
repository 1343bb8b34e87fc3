//! Runtime configuration loaded from the environment.
//!
//! Every option has a default except the mail relay credentials, which the
//! contact endpoint cannot work without.

use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STATIC_DIR: &str = "./public";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_COMPANY_EMAIL: &str = "journeybeyondresultspvtltd@gmail.com";
const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_FIELD_LENGTH: usize = 1000;
const DEFAULT_RATE_LIMIT_MAX: u32 = 3;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Controls how much failure detail reaches API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Production,
    Development,
}

impl RuntimeMode {
    pub fn exposes_error_detail(self) -> bool {
        self == RuntimeMode::Development
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Some(RuntimeMode::Production),
            "development" | "dev" => Some(RuntimeMode::Development),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub allowed_origins: Vec<String>,
    pub body_limit_bytes: usize,
    /// Take the client address from `X-Forwarded-For` / `Forwarded`. Only
    /// safe when a reverse proxy in front of the server overwrites them.
    pub trust_proxy: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            allowed_origins: split_list(DEFAULT_ALLOWED_ORIGINS),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            trust_proxy: false,
        }
    }
}

/// Mail relay endpoint, sender credentials and recipients.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub company_email: String,
    pub send_confirmation: bool,
    pub timeout: Duration,
}

impl MailConfig {
    pub fn new(
        api_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let username = username.into();
        Self {
            api_url: api_url.into(),
            sender: username.clone(),
            username,
            password: password.into(),
            company_email: DEFAULT_COMPANY_EMAIL.to_string(),
            send_confirmation: true,
            timeout: Duration::from_secs(DEFAULT_MAIL_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContactConfig {
    pub max_field_length: usize,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            max_field_length: DEFAULT_MAX_FIELD_LENGTH,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: RuntimeMode,
    pub server: ServerConfig,
    pub mail: MailConfig,
    pub contact: ContactConfig,
}

impl AppConfig {
    /// Production mode with default server and contact settings.
    pub fn new(mail: MailConfig) -> Self {
        Self {
            mode: RuntimeMode::Production,
            server: ServerConfig::default(),
            mail,
            contact: ContactConfig::default(),
        }
    }

    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        let mode = match get("APP_ENV") {
            Some(raw) => RuntimeMode::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                var: "APP_ENV".to_string(),
                reason: format!("expected `production` or `development`, got `{}`", raw),
            })?,
            None => RuntimeMode::Production,
        };

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", get("PORT"), defaults.port)?,
            static_dir: get("STATIC_DIR").unwrap_or(defaults.static_dir),
            allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.allowed_origins),
            body_limit_bytes: parse_or(
                "BODY_LIMIT_BYTES",
                get("BODY_LIMIT_BYTES"),
                defaults.body_limit_bytes,
            )?,
            trust_proxy: match get("TRUST_PROXY") {
                Some(raw) => parse_bool("TRUST_PROXY", &raw)?,
                None => defaults.trust_proxy,
            },
        };

        let api_url = require("MAIL_API_URL")?;
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "MAIL_API_URL".to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }

        let mut mail = MailConfig::new(api_url, require("EMAIL_USER")?, require("EMAIL_PASS")?);
        if let Some(sender) = get("EMAIL_FROM") {
            mail.sender = sender;
        }
        if let Some(company_email) = get("COMPANY_EMAIL") {
            mail.company_email = company_email;
        }
        if let Some(raw) = get("SEND_CONFIRMATION") {
            mail.send_confirmation = parse_bool("SEND_CONFIRMATION", &raw)?;
        }
        let timeout_secs = parse_or(
            "MAIL_TIMEOUT_SECS",
            get("MAIL_TIMEOUT_SECS"),
            DEFAULT_MAIL_TIMEOUT_SECS,
        )?;
        mail.timeout = Duration::from_secs(positive("MAIL_TIMEOUT_SECS", timeout_secs)?);

        let window_secs = parse_or(
            "CONTACT_RATE_LIMIT_WINDOW_SECS",
            get("CONTACT_RATE_LIMIT_WINDOW_SECS"),
            DEFAULT_RATE_LIMIT_WINDOW_SECS,
        )?;
        let contact = ContactConfig {
            max_field_length: positive(
                "CONTACT_MAX_FIELD_LENGTH",
                parse_or(
                    "CONTACT_MAX_FIELD_LENGTH",
                    get("CONTACT_MAX_FIELD_LENGTH"),
                    DEFAULT_MAX_FIELD_LENGTH,
                )?,
            )?,
            rate_limit_max: positive(
                "CONTACT_RATE_LIMIT_MAX",
                parse_or(
                    "CONTACT_RATE_LIMIT_MAX",
                    get("CONTACT_RATE_LIMIT_MAX"),
                    DEFAULT_RATE_LIMIT_MAX,
                )?,
            )?,
            rate_limit_window: Duration::from_secs(positive(
                "CONTACT_RATE_LIMIT_WINDOW_SECS",
                window_secs,
            )?),
        };

        Ok(Self {
            mode,
            server,
            mail,
            contact,
        })
    }
}

fn parse_or<T>(var: &str, raw: Option<String>, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
            var: var.to_string(),
            reason: format!("`{}`: {}", raw, e),
        }),
        None => Ok(default),
    }
}

fn positive<T>(var: &str, value: T) -> ConfigResult<T>
where
    T: PartialOrd + Default,
{
    if value > T::default() {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            var: var.to_string(),
            reason: "must be greater than zero".to_string(),
        })
    }
}

fn parse_bool(var: &str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            reason: format!("expected a boolean, got `{}`", raw),
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
