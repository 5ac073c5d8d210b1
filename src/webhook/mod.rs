//! Inbound webhook signature verification.
//!
//! Implements the standard-webhooks scheme used by the transcription
//! service: HMAC-SHA256 over `id.timestamp.payload`, base64-encoded, carried
//! as space-separated `v1,<signature>` candidates with a timestamp tolerance
//! window to defeat replay.

mod signature;


pub use signature::{Webhook, WebhookHeaders, WebhookVerificationError};
