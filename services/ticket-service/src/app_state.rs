use std::sync::Arc;

use common_observability::ChargeMetrics;

use crate::mailer::TicketMailer;
use crate::payments::PaymentProvider;
use crate::validation::UunValidator;

/// Shared application state handed to every handler. Provider clients are
/// injected so tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    pub payments: Arc<dyn PaymentProvider>,
    pub mailer: Arc<dyn TicketMailer>,
    pub uun_validator: Arc<dyn UunValidator>,
    pub metrics: Arc<ChargeMetrics>,
    pub sku: Arc<str>,
}

impl AppState {
    pub fn new(
        payments: Arc<dyn PaymentProvider>,
        mailer: Arc<dyn TicketMailer>,
        uun_validator: Arc<dyn UunValidator>,
        metrics: Arc<ChargeMetrics>,
        sku: impl Into<Arc<str>>,
    ) -> Self {
        Self { payments, mailer, uun_validator, metrics, sku: sku.into() }
    }
}
