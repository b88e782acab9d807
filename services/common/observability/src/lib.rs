use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Counters for the ticket charge flow.
#[derive(Clone)]
pub struct ChargeMetrics {
    pub registry: Registry,
    pub orders_placed: IntCounter,
    pub charge_rejections: IntCounterVec,
    pub annotation_failures: IntCounter,
    pub email_failures: IntCounter,
}

impl ChargeMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let orders_placed = IntCounter::new(
            "ticket_orders_placed_total",
            "Orders created, paid and confirmed by email",
        )?;
        let charge_rejections = IntCounterVec::new(
            Opts::new(
                "ticket_charge_rejections_total",
                "Charge requests that ended in an error response, by error code",
            ),
            &["reason"],
        )?;
        let annotation_failures = IntCounter::new(
            "ticket_charge_annotation_failures_total",
            "Background charge description updates that failed",
        )?;
        let email_failures = IntCounter::new(
            "ticket_email_failures_total",
            "Confirmation emails that failed after the order was paid",
        )?;
        registry.register(Box::new(orders_placed.clone()))?;
        registry.register(Box::new(charge_rejections.clone()))?;
        registry.register(Box::new(annotation_failures.clone()))?;
        registry.register(Box::new(email_failures.clone()))?;
        Ok(Self { registry, orders_placed, charge_rejections, annotation_failures, email_failures })
    }

    pub fn record_rejection(&self, reason: &str) {
        self.charge_rejections.with_label_values(&[reason]).inc();
    }

    /// Prometheus text exposition of every registered metric.
    pub fn encode(&self) -> prometheus::Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}
