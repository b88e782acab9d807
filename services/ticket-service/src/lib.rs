pub mod app;
pub mod app_state;
pub mod charge_handlers;
pub mod config;
pub mod mailer;
pub mod payments;
pub mod purchase;
pub mod validation;

pub use app::{cors_layer, router};
pub use app_state::AppState;
pub use charge_handlers::{make_charge, place_order, ChargeError};
pub use config::TicketConfig;
