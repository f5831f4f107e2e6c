//! Process bootstrap: logging, dependency wiring and the HTTP server loop.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::adapters::http::{membership_router, InternalAuthState, MembershipAppState};
use crate::adapters::storage::JsonFileMembershipStore;
use crate::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use crate::application::CheckoutSettings;
use crate::config::{AppConfig, PaymentConfig, ValidationError};
use crate::domain::membership::StripeWebhookVerifier;
use crate::ports::{PaymentError, StoreError};

/// Failures that stop the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("Failed to open membership store: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to create Stripe client: {0}")]
    Stripe(#[from] PaymentError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter. Production logs are JSON.
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Checkout settings derived from the payment configuration.
pub fn checkout_settings(payment: &PaymentConfig) -> CheckoutSettings {
    CheckoutSettings {
        prices: payment.price_table(),
        default_plan: payment.default_plan.trim().to_lowercase(),
        success_url: payment.success_url.clone(),
        cancel_url: payment.cancel_url.clone(),
    }
}

/// Wires adapters into the shared HTTP state.
pub async fn build_state(config: &AppConfig) -> Result<MembershipAppState, StartupError> {
    let store = JsonFileMembershipStore::open(&config.storage.data_file).await?;

    let stripe = StripePaymentAdapter::new(
        StripeConfig::new(config.payment.stripe_api_key.clone())
            .with_base_url(&config.payment.stripe_api_base_url)
            .with_timeout(config.server.request_timeout()),
    )?;

    let settings = checkout_settings(&config.payment);
    if !settings.prices.contains_key(&settings.default_plan) {
        tracing::warn!(plan = %settings.default_plan, "Default plan has no configured price; checkouts without plan_key will fail");
    }

    Ok(MembershipAppState {
        membership_store: Arc::new(store),
        payment_provider: Arc::new(stripe),
        webhook_verifier: Arc::new(StripeWebhookVerifier::new(
            config.payment.stripe_webhook_secret.clone(),
        )),
        checkout_settings: settings,
        internal_auth: InternalAuthState::new(config.auth.internal_api_key.clone()),
    })
}

/// Validates the configuration, binds the listener and serves until a
/// shutdown signal arrives.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    config.validate()?;
    let addr = config.server.socket_addr()?;

    let state = build_state(&config).await?;
    let app = membership_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        data_file = %config.storage.data_file.display(),
        live_mode = config.payment.is_live_mode(),
        "Billing service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Billing service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install CTRL+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received ctrl+C signal"),
        _ = terminate => tracing::info!("Received terminate signal"),
    }
}
