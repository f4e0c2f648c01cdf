//! cw-whatsapp: WhatsApp Business Cloud API side of the bridge
//!
//! Sends text messages through the Graph API send endpoint, parses Meta
//! webhook notifications and answers the webhook verification challenge.

pub mod client;
pub mod error;
pub mod webhook;

pub use client::{CloudApiClient, OutboundMessage};
pub use error::{Result, WhatsAppError};
pub use webhook::{InboundText, WebhookNotification, verify_webhook};
