use anyhow::{anyhow, Context, Result};
use std::env;

const DEFAULT_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
];

#[derive(Debug, Clone)]
pub struct TicketConfig {
    pub stripe_secret_key: String,
    pub stripe_sku: String,
    pub stripe_api_base: String,
    pub mailgun_domain: String,
    pub mailgun_api_key: String,
    pub mailgun_api_base: String,
    pub mail_from: String,
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub provider_timeout_secs: u64,
}

impl TicketConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(|value| normalize_optional(&value));
        let require = |key: &str| get(key).ok_or_else(|| anyhow!("{key} must be set"));

        let stripe_secret_key = require("STRIPE_SECRET_KEY")?;
        let stripe_sku = require("STRIPE_SKU")?;
        let stripe_api_base =
            get("STRIPE_API_BASE").unwrap_or_else(|| "https://api.stripe.com".to_string());
        let mailgun_domain = require("MAILGUN_DOMAIN")?;
        let mailgun_api_key = require("MAILGUN_API_KEY")?;
        let mailgun_api_base =
            get("MAILGUN_API_BASE").unwrap_or_else(|| "https://api.mailgun.net".to_string());
        let mail_from = get("MAIL_FROM")
            .unwrap_or_else(|| "Informatics Ball <infball@comp-soc.com>".to_string());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT '{value}'"))?,
            None => 8080,
        };
        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|value| parse_list(&value))
            .unwrap_or_else(|| DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect());
        let provider_timeout_secs = get("PROVIDER_TIMEOUT_SECONDS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Self {
            stripe_secret_key,
            stripe_sku,
            stripe_api_base,
            mailgun_domain,
            mailgun_api_key,
            mailgun_api_base,
            mail_from,
            host,
            port,
            cors_allowed_origins,
            provider_timeout_secs: provider_timeout_secs.max(1),
        })
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(normalize_optional)
        .collect()
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
