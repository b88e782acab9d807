use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

pub const TICKET_CURRENCY: &str = "gbp";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("payment provider returned HTTP {status}")]
    Api {
        status: u16,
        message: Option<String>,
        code: Option<String>,
    },
    #[error("payment provider request failed: {0}")]
    Transport(String),
    #[error("invalid payment provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// The provider's own message when it sent one, otherwise the generic error text.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inventory {
    /// `None` when the provider does not track a finite count.
    pub quantity: Option<u64>,
}

impl Inventory {
    pub fn is_sold_out(&self) -> bool {
        self.quantity == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub sku: String,
    pub quantity: u32,
    pub currency: &'static str,
    pub email: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub charge: Option<String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn inventory(&self, sku: &str) -> Result<Inventory, ProviderError>;
    async fn create_order(&self, order: &NewOrder) -> Result<Order, ProviderError>;
    async fn pay_order(&self, order_id: &str, source: &str) -> Result<Order, ProviderError>;
    async fn describe_charge(
        &self,
        charge_id: &str,
        description: &str,
    ) -> Result<(), ProviderError>;
}

/// Client for the Stripe SKU/Orders REST API.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProviderError> {
        let response = request
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|err| ProviderError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<StripeErrorResponse>(&body)
                .ok()
                .map(|wrapper| wrapper.error);
            let (message, code) = match detail {
                Some(detail) => (detail.message, detail.code),
                None => (None, None),
            };
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
                code,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn inventory(&self, sku: &str) -> Result<Inventory, ProviderError> {
        let url = format!("{}/v1/skus/{}", self.base_url, sku);
        let sku: SkuResponse = self.send(self.client.get(url)).await?;
        Ok(Inventory {
            quantity: sku.inventory.and_then(|inv| inv.quantity),
        })
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, ProviderError> {
        let url = format!("{}/v1/orders", self.base_url);
        self.send(self.client.post(url).form(&order_form(order))).await
    }

    async fn pay_order(&self, order_id: &str, source: &str) -> Result<Order, ProviderError> {
        let url = format!("{}/v1/orders/{}/pay", self.base_url, order_id);
        self.send(self.client.post(url).form(&[("source", source)])).await
    }

    async fn describe_charge(
        &self,
        charge_id: &str,
        description: &str,
    ) -> Result<(), ProviderError> {
        let url = format!("{}/v1/charges/{}", self.base_url, charge_id);
        let _: serde_json::Value = self
            .send(self.client.post(url).form(&[("description", description)]))
            .await?;
        Ok(())
    }
}

fn order_form(order: &NewOrder) -> Vec<(String, String)> {
    let mut form = vec![
        ("currency".to_string(), order.currency.to_string()),
        ("email".to_string(), order.email.clone()),
        ("items[0][type]".to_string(), "sku".to_string()),
        ("items[0][parent]".to_string(), order.sku.clone()),
        ("items[0][quantity]".to_string(), order.quantity.to_string()),
    ];
    for (key, value) in &order.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }
    form
}

#[derive(Debug, Deserialize)]
struct SkuResponse {
    #[serde(default)]
    inventory: Option<SkuInventory>,
}

#[derive(Debug, Deserialize)]
struct SkuInventory {
    #[serde(default)]
    quantity: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}
