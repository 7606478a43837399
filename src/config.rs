use crate::errors::AppError;
use crate::range::{MAX_COMPARISON_OFFSET_DAYS, RangeDefaults};
use crate::slots::EndTimeDefault;
use std::{env, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    pub backend_timeout: Duration,
    pub session_cookie: Option<String>,
    pub range_defaults: RangeDefaults,
    pub end_time_default: EndTimeDefault,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match read("PORT") {
            Some(value) => parse_number(&value, "PORT")?,
            None => DEFAULT_PORT,
        };

        let backend_url = read("BACKEND_URL")
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(AppError::validation(format!(
                "BACKEND_URL must be an http(s) URL, got '{backend_url}'"
            )));
        }

        let timeout_secs = match read("BACKEND_TIMEOUT_SECS") {
            Some(value) => parse_number(&value, "BACKEND_TIMEOUT_SECS")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let comparison_offset_days = match read("COMPARISON_OFFSET_DAYS") {
            Some(value) => parse_number(&value, "COMPARISON_OFFSET_DAYS")?,
            None => RangeDefaults::default().comparison_offset_days,
        };
        if comparison_offset_days > MAX_COMPARISON_OFFSET_DAYS {
            return Err(AppError::validation(format!(
                "COMPARISON_OFFSET_DAYS must be at most {MAX_COMPARISON_OFFSET_DAYS}, got {comparison_offset_days}"
            )));
        }

        let end_time_default = match read("END_TIME_DEFAULT") {
            Some(value) => value.parse()?,
            None => EndTimeDefault::default(),
        };

        Ok(Self {
            port,
            backend_url,
            backend_timeout: Duration::from_secs(timeout_secs),
            session_cookie: read("BACKEND_SESSION_COOKIE"),
            range_defaults: RangeDefaults {
                comparison_offset_days,
            },
            end_time_default,
        })
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::validation(format!("{key} must be a number, got '{value}'")))
}
