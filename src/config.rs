use crate::error::{Error, Result};
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub auth_gateway_secret: String,
    pub token_ttl_hours: i64,
    /// Time zone of the physical workplace; HH:MM stamps and the daily
    /// notification reset are computed in this zone, never UTC.
    pub workplace_timezone: Tz,
    pub api_rps: u32,
    pub uploads_dir: String,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            auth_gateway_secret: get_env("AUTH_GATEWAY_SECRET")?,
            token_ttl_hours: get_env_parse("TOKEN_TTL_HOURS")?,
            workplace_timezone: get_env("WORKPLACE_TIMEZONE")?
                .parse()
                .map_err(|e| Error::Config(format!("Invalid WORKPLACE_TIMEZONE: {}", e)))?,
            api_rps: get_env_parse("API_RPS")?,
            uploads_dir: env::var("UPLOADS_DIR").unwrap_or_else(|_| "/app/uploads".to_string()),
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
