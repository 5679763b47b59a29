//! Environment-sourced configuration.
//!
//! `DATABASE_URL` and `PORT` are required; everything else has a default.

use std::env;

pub const DEFAULT_BANK_KEY_PATH: &str = "bank_keys.json";
const DEFAULT_SETTLEMENT_DEADLINE_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub bank_key_path: String,
    pub settlement_deadline_secs: u64,
}

impl Config {
    /// Read the configuration, panicking on missing or malformed required
    /// values. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let port = env::var("PORT")
            .expect("PORT must be set")
            .parse::<u16>()
            .expect("PORT must be a valid TCP port");
        let bank_key_path =
            env::var("BANK_KEY_PATH").unwrap_or_else(|_| DEFAULT_BANK_KEY_PATH.to_string());
        let settlement_deadline_secs = env::var("SETTLEMENT_DEADLINE_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(DEFAULT_SETTLEMENT_DEADLINE_SECS);

        Self {
            database_url,
            port,
            bank_key_path,
            settlement_deadline_secs,
        }
    }
}
