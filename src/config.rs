use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub grading_endpoint_url: String,
    pub grading_timeout_secs: u64,
    pub api_rps: u32,
    pub cors_allowed_origin: Option<String>,
    pub exam_idle_ttl_secs: u64,
    pub exam_submitted_ttl_secs: u64,
    pub exam_max_sessions_per_applicant: usize,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            grading_endpoint_url: get_env_url("GRADING_ENDPOINT_URL")?,
            grading_timeout_secs: get_env_parse_or("GRADING_TIMEOUT_SECS", 60)?,
            api_rps: get_env_parse("API_RPS")?,
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok(),
            exam_idle_ttl_secs: get_env_parse_or("EXAM_IDLE_TTL_SECS", 3600)?,
            exam_submitted_ttl_secs: get_env_parse_or("EXAM_SUBMITTED_TTL_SECS", 300)?,
            exam_max_sessions_per_applicant: get_env_parse_or("EXAM_MAX_SESSIONS_PER_APPLICANT", 5)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(_) => get_env_parse(name),
        Err(_) => Ok(default),
    }
}

fn get_env_url(name: &str) -> Result<String> {
    let raw = get_env(name)?;
    parse_http_url(&raw).map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

/// Accepts only absolute http(s) URLs.
pub fn parse_http_url(raw: &str) -> std::result::Result<String, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
