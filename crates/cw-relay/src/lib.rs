//! cw-relay: routes webhook events between WhatsApp and Chatwoot
//!
//! Inbound WhatsApp messages are recorded in the contact directory,
//! answered with the auto-reply and mirrored into Chatwoot. Incoming
//! Chatwoot messages get the auto-reply on WhatsApp only.

pub mod dispatcher;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use dispatcher::{DispatchReport, WebhookDispatcher};
