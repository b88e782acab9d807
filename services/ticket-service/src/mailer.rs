use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

pub const TICKET_SUBJECT: &str = "Your Informatics Ball ticket";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketEmail {
    pub name: String,
    pub email: String,
    pub order_id: String,
    pub auth_token: String,
}

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("failed to send ticket email: {0}")]
    Transport(String),
}

#[async_trait]
pub trait TicketMailer: Send + Sync {
    async fn send_ticket(&self, ticket: &TicketEmail) -> Result<(), MailerError>;
}

pub fn render_ticket_text(ticket: &TicketEmail) -> String {
    format!(
        "Hi {name},\n\n\
         Thanks for buying a ticket to the Informatics Ball!\n\n\
         Order reference: {order}\n\
         Ticket code: {token}\n\n\
         Please keep this email, your ticket code will be checked at the door.\n\
         If anything is wrong with your order, reply to this email or contact infball@comp-soc.com.\n",
        name = ticket.name,
        order = ticket.order_id,
        token = ticket.auth_token,
    )
}

/// Formats a `to` address with the display name as an RFC 5322 quoted string,
/// so commas and angle brackets in a name stay inside one mailbox.
pub fn recipient(name: &str, email: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    for ch in name.chars() {
        match ch {
            '\\' | '"' => {
                quoted.push('\\');
                quoted.push(ch);
            }
            '\r' | '\n' => quoted.push(' '),
            _ => quoted.push(ch),
        }
    }
    format!("\"{}\" <{}>", quoted.trim(), email)
}

/// Sends ticket confirmations through the Mailgun messages API.
#[derive(Clone)]
pub struct MailgunMailer {
    client: Client,
    base_url: String,
    domain: String,
    api_key: String,
    from: String,
}

impl MailgunMailer {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        domain: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            domain: domain.into(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }
}

#[async_trait]
impl TicketMailer for MailgunMailer {
    async fn send_ticket(&self, ticket: &TicketEmail) -> Result<(), MailerError> {
        let url = format!("{}/v3/{}/messages", self.base_url, self.domain);
        let to = recipient(&ticket.name, &ticket.email);
        let text = render_ticket_text(ticket);
        let form = [
            ("from", self.from.as_str()),
            ("to", to.as_str()),
            ("subject", TICKET_SUBJECT),
            ("text", text.as_str()),
        ];
        let response = self
            .client
            .post(url)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|err| MailerError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<MailgunErrorBody>(&body)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("Mail provider returned HTTP {}", status.as_u16()));
            return Err(MailerError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct MailgunErrorBody {
    #[serde(default)]
    message: Option<String>,
}
