use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use common_http_errors::{ApiError, SuccessBody};
use common_observability::ChargeMetrics;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::mailer::{MailerError, TicketEmail};
use crate::payments::{PaymentProvider, ProviderError};
use crate::purchase::{PurchaseError, PurchaseRequest};

pub const SOLD_OUT_MESSAGE: &str = "Sorry! We have run out of tickets... for now.";
pub const CHARGE_DESCRIPTION: &str = "Informatics Ball Ticket";

#[derive(Debug, Error)]
pub enum ChargeError {
    #[error("{0}")]
    MalformedBody(String),
    #[error(transparent)]
    Invalid(#[from] PurchaseError),
    #[error("{}", SOLD_OUT_MESSAGE)]
    SoldOut,
    /// Inventory lookup or order creation failed.
    #[error("{0}")]
    Provider(ProviderError),
    #[error("{0}")]
    Payment(ProviderError),
    #[error(transparent)]
    Email(MailerError),
}

impl ChargeError {
    pub fn code(&self) -> &'static str {
        match self {
            ChargeError::MalformedBody(_) => "invalid_request",
            ChargeError::Invalid(err) => err.code(),
            ChargeError::SoldOut => "sold_out",
            ChargeError::Provider(_) => "provider_error",
            ChargeError::Payment(_) => "payment_failed",
            ChargeError::Email(_) => "email_failed",
        }
    }
}

impl From<ChargeError> for ApiError {
    fn from(err: ChargeError) -> Self {
        let code = err.code();
        match err {
            ChargeError::SoldOut => ApiError::gone(code, SOLD_OUT_MESSAGE),
            ChargeError::Provider(inner) => ApiError::Internal {
                code,
                message: inner.user_message(),
            },
            ChargeError::Payment(inner) => ApiError::bad_request(code, inner.user_message()),
            other => ApiError::bad_request(code, other.to_string()),
        }
    }
}

pub fn mint_auth_token() -> String {
    Uuid::new_v4().to_string()
}

/// `POST /charge`
pub async fn make_charge(
    State(state): State<AppState>,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<SuccessBody<String>, ApiError> {
    let outcome = match payload {
        Ok(Json(request)) => place_order(&state, request).await,
        Err(rejection) => Err(ChargeError::MalformedBody(rejection.body_text())),
    };
    match outcome {
        Ok(order_id) => Ok(SuccessBody::new(order_id)),
        Err(err) => {
            state.metrics.record_rejection(err.code());
            Err(err.into())
        }
    }
}

/// Validates the purchase, then reserves, pays and confirms a single ticket.
/// Returns the paid order's id.
pub async fn place_order(
    state: &AppState,
    request: PurchaseRequest,
) -> Result<String, ChargeError> {
    let purchase = request.validate(state.uun_validator.as_ref()).map_err(|err| {
        debug!(code = err.code(), "Rejected ticket purchase form");
        err
    })?;

    let sku = state.sku.as_ref();
    let inventory = state.payments.inventory(sku).await.map_err(|err| {
        warn!(?err, sku, "Failed to fetch ticket inventory");
        ChargeError::Provider(err)
    })?;
    if inventory.is_sold_out() {
        info!(sku, "Ticket inventory exhausted");
        return Err(ChargeError::SoldOut);
    }

    let auth_token = mint_auth_token();
    let order = state
        .payments
        .create_order(&purchase.ticket_order(sku, &auth_token))
        .await
        .map_err(|err| {
            warn!(?err, sku, "Failed to create ticket order");
            ChargeError::Provider(err)
        })?;

    let paid = state
        .payments
        .pay_order(&order.id, &purchase.token)
        .await
        .map_err(|err| {
            warn!(?err, order_id = %order.id, "Ticket payment rejected");
            ChargeError::Payment(err)
        })?;

    match paid.charge.clone() {
        Some(charge_id) => {
            spawn_charge_annotation(state.payments.clone(), state.metrics.clone(), charge_id)
        }
        None => debug!(order_id = %paid.id, "Paid order has no charge to annotate"),
    }

    let ticket = TicketEmail {
        name: purchase.full_name,
        email: purchase.email,
        order_id: paid.id.clone(),
        auth_token,
    };
    if let Err(err) = state.mailer.send_ticket(&ticket).await {
        // The card has already been charged at this point and nothing is rolled back.
        state.metrics.email_failures.inc();
        error!(
            ?err,
            order_id = %paid.id,
            email = %ticket.email,
            "Ticket email failed after payment"
        );
        return Err(ChargeError::Email(err));
    }

    state.metrics.orders_placed.inc();
    info!(order_id = %paid.id, "Ticket order placed");
    Ok(paid.id)
}

/// Labels the charge in the provider dashboard. Detached: the request never
/// waits on it and a failure only shows up in logs and metrics.
fn spawn_charge_annotation(
    payments: Arc<dyn PaymentProvider>,
    metrics: Arc<ChargeMetrics>,
    charge_id: String,
) {
    tokio::spawn(async move {
        match payments.describe_charge(&charge_id, CHARGE_DESCRIPTION).await {
            Ok(()) => debug!(%charge_id, "Annotated ticket charge"),
            Err(err) => {
                metrics.annotation_failures.inc();
                warn!(?err, %charge_id, "Failed to annotate ticket charge");
            }
        }
    });
}
