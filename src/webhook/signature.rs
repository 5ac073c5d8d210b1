//! HMAC signature verifier for inbound webhook deliveries.

use std::time::{Duration, SystemTime};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::time::{Clock, SystemClock};

type HmacSha256 = Hmac<Sha256>;

/// Marker prefix on signing secrets handed out by the service.
const SECRET_PREFIX: &str = "whsec_";

/// Signature scheme tag this verifier understands.
const SCHEME: &str = "v1";

/// Opaque verification failure.
///
/// Deliberately carries no detail about which check failed (missing header,
/// stale timestamp, signature mismatch) so that responses cannot be used as
/// an oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Webhook verification failed")]
pub struct WebhookVerificationError;

/// The three headers accompanying a webhook delivery.
#[derive(Debug, Clone)]
pub struct WebhookHeaders {
    /// Unique message identifier (`webhook-id`)
    pub id: String,
    /// Delivery time as unix seconds in text (`webhook-timestamp`)
    pub timestamp: String,
    /// Space-separated `scheme,value` signature candidates
    /// (`webhook-signature`)
    pub signature: String,
}

impl WebhookHeaders {
    /// Creates headers from their values.
    pub fn new(
        id: impl Into<String>,
        timestamp: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            signature: signature.into(),
        }
    }

    /// Extracts the webhook headers from an HTTP header map.
    ///
    /// Lookup is case-insensitive per [`http::HeaderMap`] semantics.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookVerificationError`] if any of the three headers is
    /// missing or not valid UTF-8.
    pub fn from_header_map(headers: &http::HeaderMap) -> Result<Self, WebhookVerificationError> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
                .ok_or(WebhookVerificationError)
        };

        Ok(Self {
            id: get("webhook-id")?,
            timestamp: get("webhook-timestamp")?,
            signature: get("webhook-signature")?,
        })
    }
}

/// Stateless webhook signature verifier.
///
/// Holds only the decoded signing key; every [`verify`](Self::verify) call
/// is independent. The payload must be the exact bytes received on the
/// wire; re-serializing it changes the signing input.
///
/// # Example
///
/// ```
/// use salad_transcribe::webhook::{Webhook, WebhookHeaders};
/// use std::time::SystemTime;
///
/// # fn main() -> Result<(), salad_transcribe::webhook::WebhookVerificationError> {
/// let webhook = Webhook::new("whsec_C2FVsBQIhrscChlQIMV+b5sSYspob7oD")?;
/// let payload = br#"{"id":"job_1","status":"succeeded"}"#;
/// let signature = webhook.sign("msg_1", SystemTime::now(), payload);
///
/// let headers = WebhookHeaders::new(
///     "msg_1",
///     webhook.unix_timestamp(SystemTime::now()).to_string(),
///     signature,
/// );
/// webhook.verify(payload, &headers)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Webhook<C = SystemClock> {
    key: Vec<u8>,
    tolerance: Duration,
    clock: C,
}

impl Webhook<SystemClock> {
    /// Default replay tolerance window (5 minutes each direction).
    pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(5 * 60);

    /// Creates a verifier from the signing secret.
    ///
    /// A `whsec_` prefix is stripped before the remainder is
    /// base64-decoded into the raw key.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookVerificationError`] if the secret is empty or not
    /// valid base64.
    pub fn new(secret: &str) -> Result<Self, WebhookVerificationError> {
        if secret.is_empty() {
            return Err(WebhookVerificationError);
        }

        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = BASE64.decode(encoded).map_err(|_| WebhookVerificationError)?;

        Ok(Self {
            key,
            tolerance: Self::DEFAULT_TOLERANCE,
            clock: SystemClock,
        })
    }

    /// Creates a verifier from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookVerificationError`] if the key is empty.
    pub fn from_raw_key(key: Vec<u8>) -> Result<Self, WebhookVerificationError> {
        if key.is_empty() {
            return Err(WebhookVerificationError);
        }

        Ok(Self {
            key,
            tolerance: Self::DEFAULT_TOLERANCE,
            clock: SystemClock,
        })
    }
}

impl<C> Webhook<C> {
    /// Replaces the clock used for timestamp tolerance checks.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> Webhook<C2> {
        Webhook {
            key: self.key,
            tolerance: self.tolerance,
            clock,
        }
    }

    /// Sets the replay tolerance window.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn mac(&self) -> Result<HmacSha256, WebhookVerificationError> {
        HmacSha256::new_from_slice(&self.key).map_err(|_| WebhookVerificationError)
    }

    fn signed_mac(&self, id: &str, timestamp: &str, payload: &[u8]) -> Result<HmacSha256, WebhookVerificationError> {
        let mut mac = self.mac()?;
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }

    /// Converts a time to whole unix seconds, flooring sub-second parts.
    #[must_use]
    pub fn unix_timestamp(&self, time: SystemTime) -> u64 {
        time.duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }

    /// Produces a `v1,<base64>` signature over `id.timestamp.payload`.
    ///
    /// Used by callers that need to originate signed deliveries (local
    /// loops, test fixtures) with the same key material.
    #[must_use]
    pub fn sign(&self, id: &str, timestamp: SystemTime, payload: &[u8]) -> String {
        let ts = self.unix_timestamp(timestamp).to_string();
        let digest = self
            .signed_mac(id, &ts, payload)
            .map_or_else(|_| Vec::new(), |mac| mac.finalize().into_bytes().to_vec());
        format!("{SCHEME},{}", BASE64.encode(digest))
    }
}

impl<C: Clock> Webhook<C> {
    /// Verifies a delivery against its headers.
    ///
    /// The timestamp must fall within the tolerance window of the current
    /// time, and at least one `v1` signature candidate must match the
    /// expected HMAC. Candidates are compared in constant time; a match on
    /// any one succeeds.
    ///
    /// # Errors
    ///
    /// Returns the opaque [`WebhookVerificationError`] on any failure.
    pub fn verify(
        &self,
        payload: &[u8],
        headers: &WebhookHeaders,
    ) -> Result<(), WebhookVerificationError> {
        self.check_timestamp(&headers.timestamp)?;

        for candidate in headers.signature.split(' ') {
            let Some((scheme, value)) = candidate.split_once(',') else {
                continue;
            };
            if scheme != SCHEME {
                continue;
            }
            let Ok(candidate_sig) = BASE64.decode(value) else {
                continue;
            };

            let mac = self.signed_mac(&headers.id, &headers.timestamp, payload)?;
            if mac.verify_slice(&candidate_sig).is_ok() {
                return Ok(());
            }
        }

        Err(WebhookVerificationError)
    }

    /// Verifies a delivery and deserializes the payload.
    ///
    /// # Errors
    ///
    /// Returns the opaque [`WebhookVerificationError`] if verification or
    /// deserialization fails.
    pub fn verify_and_parse<T: serde::de::DeserializeOwned>(
        &self,
        payload: &[u8],
        headers: &WebhookHeaders,
    ) -> Result<T, WebhookVerificationError> {
        self.verify(payload, headers)?;
        serde_json::from_slice(payload).map_err(|_| WebhookVerificationError)
    }

    fn check_timestamp(&self, raw: &str) -> Result<(), WebhookVerificationError> {
        let seconds: u64 = raw.trim().parse().map_err(|_| WebhookVerificationError)?;
        let timestamp = SystemTime::UNIX_EPOCH + Duration::from_secs(seconds);
        let now = self.clock.now();

        let oldest = now
            .checked_sub(self.tolerance)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let newest = now
            .checked_add(self.tolerance)
            .ok_or(WebhookVerificationError)?;

        if timestamp < oldest || timestamp > newest {
            return Err(WebhookVerificationError);
        }
        Ok(())
    }
}

impl<C> std::fmt::Debug for Webhook<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material is never printed.
        f.debug_struct("Webhook")
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}
