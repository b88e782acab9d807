use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use common_observability::ChargeMetrics;
use reqwest::Client;
use ticket_service::{
    cors_layer,
    mailer::MailgunMailer,
    payments::StripeClient,
    router,
    validation::PatternUunValidator,
    AppState, TicketConfig,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = TicketConfig::from_env()?;

    let http_client = Client::builder()
        .timeout(Duration::from_secs(config.provider_timeout_secs))
        .build()
        .context("failed to build provider HTTP client")?;
    let payments = StripeClient::new(
        http_client.clone(),
        config.stripe_api_base.clone(),
        config.stripe_secret_key.clone(),
    );
    let mailer = MailgunMailer::new(
        http_client,
        config.mailgun_api_base.clone(),
        config.mailgun_domain.clone(),
        config.mailgun_api_key.clone(),
        config.mail_from.clone(),
    );
    let metrics = ChargeMetrics::new().context("failed to register metrics")?;

    let state = AppState::new(
        Arc::new(payments),
        Arc::new(mailer),
        Arc::new(PatternUunValidator::new()),
        Arc::new(metrics),
        config.stripe_sku.clone(),
    );
    info!(sku = %config.stripe_sku, "Ticket service configured");

    let app = router(state).layer(cors_layer(&config.cors_allowed_origins));

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    info!(%addr, "starting ticket-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
