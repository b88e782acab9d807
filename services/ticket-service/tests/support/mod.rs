use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use common_observability::ChargeMetrics;
use serde_json::{json, Value};
use tower::ServiceExt;
use ticket_service::mailer::{MailerError, TicketEmail, TicketMailer};
use ticket_service::payments::{Inventory, NewOrder, Order, PaymentProvider, ProviderError};
use ticket_service::validation::PatternUunValidator;
use ticket_service::{router, AppState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentCall {
    Inventory(String),
    CreateOrder(NewOrder),
    PayOrder { order_id: String, source: String },
    DescribeCharge { charge_id: String, description: String },
}

/// Scripted payment provider. Each `fail_*` field, when set, makes that call
/// fail with the given error factory.
#[derive(Default)]
pub struct FakePayments {
    pub quantity: Option<u64>,
    pub fail_inventory: Option<fn() -> ProviderError>,
    pub fail_create: Option<fn() -> ProviderError>,
    pub fail_pay: Option<fn() -> ProviderError>,
    pub fail_describe: bool,
    pub calls: Mutex<Vec<PaymentCall>>,
}

impl FakePayments {
    pub fn in_stock() -> Self {
        Self {
            quantity: Some(25),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<PaymentCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: PaymentCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PaymentProvider for FakePayments {
    async fn inventory(&self, sku: &str) -> Result<Inventory, ProviderError> {
        self.record(PaymentCall::Inventory(sku.to_string()));
        match self.fail_inventory {
            Some(make) => Err(make()),
            None => Ok(Inventory {
                quantity: self.quantity,
            }),
        }
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, ProviderError> {
        self.record(PaymentCall::CreateOrder(order.clone()));
        match self.fail_create {
            Some(make) => Err(make()),
            None => Ok(Order {
                id: "or_test_1".into(),
                charge: None,
            }),
        }
    }

    async fn pay_order(&self, order_id: &str, source: &str) -> Result<Order, ProviderError> {
        self.record(PaymentCall::PayOrder {
            order_id: order_id.into(),
            source: source.into(),
        });
        match self.fail_pay {
            Some(make) => Err(make()),
            None => Ok(Order {
                id: order_id.into(),
                charge: Some("ch_test_1".into()),
            }),
        }
    }

    async fn describe_charge(
        &self,
        charge_id: &str,
        description: &str,
    ) -> Result<(), ProviderError> {
        self.record(PaymentCall::DescribeCharge {
            charge_id: charge_id.into(),
            description: description.into(),
        });
        if self.fail_describe {
            return Err(ProviderError::Transport("connection reset".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeMailer {
    pub fail: bool,
    pub sent: Mutex<Vec<TicketEmail>>,
}

impl FakeMailer {
    pub fn sent(&self) -> Vec<TicketEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketMailer for FakeMailer {
    async fn send_ticket(&self, ticket: &TicketEmail) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(ticket.clone());
        if self.fail {
            return Err(MailerError::Rejected {
                status: 400,
                message: "Mailbox unavailable".into(),
            });
        }
        Ok(())
    }
}

pub struct Harness {
    pub app: Router,
    pub payments: Arc<FakePayments>,
    pub mailer: Arc<FakeMailer>,
    pub metrics: Arc<ChargeMetrics>,
}

pub fn harness(payments: FakePayments, mailer: FakeMailer) -> Harness {
    let payments = Arc::new(payments);
    let mailer = Arc::new(mailer);
    let metrics = Arc::new(ChargeMetrics::new().expect("metrics"));
    let state = AppState::new(
        payments.clone(),
        mailer.clone(),
        Arc::new(PatternUunValidator::new()),
        metrics.clone(),
        "sku_ball_2026",
    );
    Harness {
        app: router(state),
        payments,
        mailer,
        metrics,
    }
}

pub fn valid_body() -> Value {
    json!({
        "token": "tok_visa",
        "fullName": "Ada Lovelace",
        "uun": "s1234567",
        "email": "ada@example.com",
        "over18": true,
        "starter": "soup",
        "main": "beef",
        "dessert": "brownie",
        "specialReqs": "No nuts please"
    })
}

pub fn charge_request(body: &Value) -> Request<Body> {
    Request::builder()
        .uri("/charge")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn post_charge(app: &Router, body: &Value) -> Response {
    app.clone().oneshot(charge_request(body)).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(req).await.unwrap()
}

pub async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 16)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
