//! Runtime configuration from flags and environment variables.

use crate::auth::jwt::DEFAULT_TOKEN_TTL_SECS;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

// Work-factor range bcrypt accepts.
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// Longest accepted token lifetime: one year.
const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 3600;

#[derive(Parser, Debug, Clone)]
#[command(name = "leadtrack")]
#[command(about = "Lead tracking API server")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "leadtrack.db")]
    pub database_path: PathBuf,

    /// HMAC secret for signing access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    #[arg(long, env = "TOKEN_TTL_SECS", default_value_t = DEFAULT_TOKEN_TTL_SECS)]
    pub token_ttl_secs: i64,

    /// bcrypt work factor for new password hashes
    #[arg(long, env = "BCRYPT_COST", default_value = "10")]
    pub bcrypt_cost: u32,

    /// Allowed CORS origin (permissive when unset)
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn token_ttl(&self) -> Result<chrono::Duration> {
        chrono::Duration::try_seconds(self.token_ttl_secs)
            .with_context(|| format!("TOKEN_TTL_SECS out of range: {}", self.token_ttl_secs))
    }

    /// Reject values clap accepts but the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            bail!(
                "TOKEN_TTL_SECS must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_SECS,
                self.token_ttl_secs
            );
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}, got {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST,
                self.bcrypt_cost
            );
        }
        Ok(())
    }
}
