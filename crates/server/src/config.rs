// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Startup configuration.
//!
//! Command-line arguments (with environment fallbacks) are validated once
//! into a [`ServerConfig`]; nothing reads the environment after startup.

use clap::Parser;
use clean_aceh::LifecyclePolicy;
use clean_aceh_gateway::MidtransConfig;
use thiserror::Error;
use time::UtcOffset;
use time::macros::format_description;

/// Shortest accepted token signing secret, in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// CleanAceh Server - order and payment lifecycle API
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Supabase project URL. Without it, orders are kept in memory.
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase service role key
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub supabase_service_role_key: Option<String>,

    /// Midtrans server key
    #[arg(long, env = "MIDTRANS_SERVER_KEY", hide_env_values = true)]
    pub midtrans_server_key: Option<String>,

    /// Use the Midtrans production environment
    #[arg(long, env = "MIDTRANS_IS_PRODUCTION", default_value_t = false)]
    pub midtrans_is_production: bool,

    /// Reject payment notifications with a bad signature
    #[arg(long, env = "MIDTRANS_VERIFY_SIGNATURE", default_value_t = false)]
    pub midtrans_verify_signature: bool,

    /// Secret used to verify access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Allowed CORS origin; also the base of payment callback URLs
    #[arg(long, env = "FRONTEND_URL", default_value = "*")]
    pub frontend_url: String,

    /// Port to bind the server to
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Offset in which service dates and times are interpreted
    #[arg(long, env = "SERVICE_UTC_OFFSET", default_value = "+07:00")]
    pub service_utc_offset: String,

    /// Platform fee applied when a booking omits one
    #[arg(long, env = "PLATFORM_FEE", default_value_t = 10_000)]
    pub platform_fee: i64,
}

/// Configuration errors detected at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("{0} must be set")]
    Missing(&'static str),
    /// The token secret is too short.
    #[error("JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters")]
    WeakJwtSecret,
    /// The service offset could not be parsed.
    #[error("SERVICE_UTC_OFFSET '{0}' is not an offset like +07:00")]
    InvalidOffset(String),
    /// The platform fee is negative.
    #[error("PLATFORM_FEE must not be negative, got {0}")]
    NegativePlatformFee(i64),
}

/// Where orders and payments are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// A Supabase project.
    Supabase {
        /// Project URL.
        url: String,
        /// Service role key.
        service_role_key: String,
    },
    /// Process memory; for local development.
    InMemory,
}

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
    /// Storage backend.
    pub store: StoreConfig,
    /// Payment gateway account.
    pub midtrans: MidtransConfig,
    /// Access token secret.
    pub jwt_secret: String,
    /// CORS origin, `*` for any.
    pub frontend_url: String,
    /// Lifecycle settings.
    pub policy: LifecyclePolicy,
}

impl ServerConfig {
    /// Validates command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if a required setting is missing or malformed.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let jwt_secret = args.jwt_secret.ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::WeakJwtSecret);
        }

        let server_key = args
            .midtrans_server_key
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing("MIDTRANS_SERVER_KEY"))?;

        let store = match args.supabase_url.filter(|url| !url.is_empty()) {
            Some(url) => StoreConfig::Supabase {
                url,
                service_role_key: args
                    .supabase_service_role_key
                    .filter(|key| !key.is_empty())
                    .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?,
            },
            None => StoreConfig::InMemory,
        };

        if args.platform_fee < 0 {
            return Err(ConfigError::NegativePlatformFee(args.platform_fee));
        }

        Ok(Self {
            port: args.port,
            store,
            midtrans: MidtransConfig {
                server_key,
                is_production: args.midtrans_is_production,
                verify_signatures: args.midtrans_verify_signature,
            },
            jwt_secret,
            frontend_url: args.frontend_url,
            policy: LifecyclePolicy {
                service_offset: parse_offset(&args.service_utc_offset)?,
                default_platform_fee: args.platform_fee,
            },
        })
    }

    /// Where e-wallet apps send the customer after paying.
    #[must_use]
    pub fn payment_callback_url(&self) -> Option<String> {
        if self.frontend_url == "*" {
            return None;
        }
        Some(format!(
            "{}/payment/result",
            self.frontend_url.trim_end_matches('/')
        ))
    }
}

fn parse_offset(raw: &str) -> Result<UtcOffset, ConfigError> {
    UtcOffset::parse(
        raw.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .map_err(|_| ConfigError::InvalidOffset(raw.to_string()))
}
