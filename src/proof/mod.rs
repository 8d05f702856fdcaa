//! # Proof Service
//!
//! Possession proofs for the two physical handoffs of an order: seller to courier
//! (`seller_pickup`) and courier to recipient (`courier_delivery`).
//!
//! A proof is a signed token:
//!
//! ```text
//! base64url(payload_json) "." base64url(hmac_sha256(secret, payload_json))
//! ```
//!
//! where the payload is `{"orderId", "type", "code", "timestamp"}` with the timestamp in
//! milliseconds. The token is what a QR code would carry; rendering it is the transport's job.
//!
//! Issued proofs are stored on the order itself. Only the latest stored proof for a step is
//! accepted, so re-issuing implicitly revokes the previous token.
//!
//! The numeric delivery code from [`generate_delivery_code`] is the low-security fallback for
//! the final handoff.

use crate::config::ConfigError;
use crate::model::OrderId;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Length of the random proof code.
pub const CODE_LEN: usize = 8;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// The handoff a proof is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofStep {
    SellerPickup,
    CourierDelivery,
}

impl ProofStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProofStep::SellerPickup => "seller_pickup",
            ProofStep::CourierDelivery => "courier_delivery",
        }
    }
}

impl fmt::Display for ProofStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded contents of a proof token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPayload {
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
    #[serde(rename = "type")]
    pub step: ProofStep,
    pub code: String,
    #[serde(rename = "timestamp")]
    pub issued_at_ms: i64,
}

impl ProofPayload {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.issued_at_ms)
    }
}

/// A proof as stored on the order: the token handed out plus what it encodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedProof {
    pub token: String,
    pub payload: ProofPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProofError {
    #[error("proof token is malformed")]
    Malformed,
    #[error("proof token is not valid base64url")]
    Encoding,
    #[error("proof signature does not match")]
    BadSignature,
    #[error("proof payload is invalid: {0}")]
    Payload(String),
    #[error("proof belongs to another order")]
    WrongOrder,
    #[error("proof is for {found}, expected {expected}")]
    WrongStep { expected: ProofStep, found: ProofStep },
    #[error("proof expired")]
    Expired,
    #[error("proof has been superseded by a newer one")]
    Superseded,
    #[error("no {0} proof has been issued for this order")]
    NotIssued(ProofStep),
}

/// Issues, parses and validates proof tokens.
#[derive(Clone)]
pub struct ProofService {
    mac: HmacSha256,
    ttl: Duration,
}

impl fmt::Debug for ProofService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ProofService {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::Invalid {
                key: "PROOF_SECRET",
                reason: "must not be empty".to_string(),
            });
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|e| ConfigError::Invalid {
            key: "PROOF_SECRET",
            reason: e.to_string(),
        })?;
        Ok(Self { mac, ttl })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, order_id: OrderId, step: ProofStep) -> IssuedProof {
        self.issue_at(order_id, step, Utc::now())
    }

    pub fn issue_at(&self, order_id: OrderId, step: ProofStep, now: DateTime<Utc>) -> IssuedProof {
        let payload = ProofPayload {
            order_id,
            step,
            code: random_code(),
            issued_at_ms: now.timestamp_millis(),
        };
        let json = serde_json::json!({
            "orderId": payload.order_id.as_uuid().to_string(),
            "type": payload.step.as_str(),
            "code": payload.code,
            "timestamp": payload.issued_at_ms,
        })
        .to_string();
        IssuedProof {
            token: self.seal(json.as_bytes()),
            payload,
        }
    }

    fn seal(&self, json: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(json);
        let signature = mac.finalize().into_bytes();
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(json),
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    /// Decodes a token and checks its signature. Malformed input is an error, never a panic.
    pub fn parse(&self, token: &str) -> Result<ProofPayload, ProofError> {
        let (body, signature) = token.trim().split_once('.').ok_or(ProofError::Malformed)?;
        if body.is_empty() || signature.is_empty() {
            return Err(ProofError::Malformed);
        }

        let json = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| ProofError::Encoding)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| ProofError::Encoding)?;

        // verify_slice compares in constant time
        let mut mac = self.mac.clone();
        mac.update(&json);
        mac.verify_slice(&signature)
            .map_err(|_| ProofError::BadSignature)?;

        let payload: ProofPayload =
            serde_json::from_slice(&json).map_err(|e| ProofError::Payload(e.to_string()))?;
        if payload.code.is_empty() {
            return Err(ProofError::Payload("empty code".to_string()));
        }
        Ok(payload)
    }

    /// Checks binding and age. Pure in its arguments: the verdict depends only on the payload,
    /// the expected order and step, `now`, and this service's ttl.
    pub fn check(
        &self,
        payload: &ProofPayload,
        expected_order: OrderId,
        expected_step: ProofStep,
        now: DateTime<Utc>,
    ) -> Result<(), ProofError> {
        if payload.order_id != expected_order {
            return Err(ProofError::WrongOrder);
        }
        if payload.step != expected_step {
            return Err(ProofError::WrongStep {
                expected: expected_step,
                found: payload.step,
            });
        }
        let age_ms = now.timestamp_millis() - payload.issued_at_ms;
        if age_ms > self.ttl.num_milliseconds() {
            return Err(ProofError::Expired);
        }
        Ok(())
    }

    pub fn validate(
        &self,
        payload: &ProofPayload,
        expected_order: OrderId,
        expected_step: ProofStep,
        now: DateTime<Utc>,
    ) -> bool {
        self.check(payload, expected_order, expected_step, now)
            .is_ok()
    }

    /// Full check of a presented token against the proof currently stored on the order.
    pub fn verify(
        &self,
        token: &str,
        stored: Option<&IssuedProof>,
        expected_order: OrderId,
        expected_step: ProofStep,
        now: DateTime<Utc>,
    ) -> Result<ProofPayload, ProofError> {
        let payload = self.parse(token)?;
        self.check(&payload, expected_order, expected_step, now)?;
        let stored = stored.ok_or(ProofError::NotIssued(expected_step))?;
        if stored.payload.code != payload.code {
            return Err(ProofError::Superseded);
        }
        Ok(payload)
    }
}

fn random_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Six-digit numeric code for the delivery fallback, in `100000..=999999`.
pub fn generate_delivery_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999u32).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ProofService {
        ProofService::new(b"test-secret", Duration::hours(24)).unwrap()
    }

    #[test]
    fn issued_token_parses_back_to_its_payload() {
        let svc = service();
        let order = OrderId::new();
        let issued = svc.issue(order, ProofStep::SellerPickup);

        assert_eq!(issued.payload.code.len(), CODE_LEN);
        assert!(issued
            .payload
            .code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));

        let parsed = svc.parse(&issued.token).unwrap();
        assert_eq!(parsed, issued.payload);
    }

    #[test]
    fn malformed_tokens_are_rejected_explicitly() {
        let svc = service();
        assert_eq!(svc.parse(""), Err(ProofError::Malformed));
        assert_eq!(svc.parse("no-separator"), Err(ProofError::Malformed));
        assert_eq!(svc.parse("abc."), Err(ProofError::Malformed));
        assert_eq!(svc.parse("!!!.???"), Err(ProofError::Encoding));
        assert_eq!(
            svc.parse(r#"{"orderId":"x","type":"seller_pickup"}"#),
            Err(ProofError::Malformed)
        );
    }

    #[test]
    fn tampered_or_foreign_tokens_fail_the_signature() {
        let svc = service();
        let issued = svc.issue(OrderId::new(), ProofStep::CourierDelivery);

        let (body, sig) = issued.token.split_once('.').unwrap();
        let forged_body = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "orderId": OrderId::new().as_uuid().to_string(),
                "type": "courier_delivery",
                "code": "AAAAAAAA",
                "timestamp": Utc::now().timestamp_millis(),
            })
            .to_string(),
        );
        assert_eq!(
            svc.parse(&format!("{forged_body}.{sig}")),
            Err(ProofError::BadSignature)
        );

        let other = ProofService::new(b"other-secret", Duration::hours(24)).unwrap();
        assert_eq!(other.parse(&issued.token), Err(ProofError::BadSignature));
        assert!(svc.parse(&format!("{body}.{sig}")).is_ok());
    }

    #[test]
    fn signed_garbage_is_a_payload_error() {
        let svc = service();
        let token = svc.seal(b"not json at all");
        assert!(matches!(svc.parse(&token), Err(ProofError::Payload(_))));

        let missing_code = svc.seal(
            serde_json::json!({
                "orderId": OrderId::new().as_uuid().to_string(),
                "type": "seller_pickup",
                "timestamp": 0,
            })
            .to_string()
            .as_bytes(),
        );
        assert!(matches!(svc.parse(&missing_code), Err(ProofError::Payload(_))));
    }

    #[test]
    fn validity_window_is_inclusive_of_ttl() {
        let svc = service();
        let order = OrderId::new();
        let issued_at = Utc::now();
        let proof = svc.issue_at(order, ProofStep::SellerPickup, issued_at);
        let step = ProofStep::SellerPickup;

        assert!(svc.validate(&proof.payload, order, step, issued_at));
        assert!(svc.validate(
            &proof.payload,
            order,
            step,
            issued_at + Duration::hours(24) - Duration::milliseconds(1)
        ));
        assert!(svc.validate(&proof.payload, order, step, issued_at + Duration::hours(24)));
        assert!(!svc.validate(
            &proof.payload,
            order,
            step,
            issued_at + Duration::hours(24) + Duration::milliseconds(1)
        ));
    }

    #[test]
    fn validation_is_bound_to_order_and_step() {
        let svc = service();
        let order = OrderId::new();
        let now = Utc::now();
        let proof = svc.issue_at(order, ProofStep::SellerPickup, now);

        assert_eq!(
            svc.check(&proof.payload, OrderId::new(), ProofStep::SellerPickup, now),
            Err(ProofError::WrongOrder)
        );
        assert_eq!(
            svc.check(&proof.payload, order, ProofStep::CourierDelivery, now),
            Err(ProofError::WrongStep {
                expected: ProofStep::CourierDelivery,
                found: ProofStep::SellerPickup,
            })
        );
        // Same inputs, same verdict.
        assert_eq!(
            svc.validate(&proof.payload, order, ProofStep::SellerPickup, now),
            svc.validate(&proof.payload, order, ProofStep::SellerPickup, now)
        );
    }

    #[test]
    fn reissue_supersedes_the_previous_token() {
        let svc = service();
        let order = OrderId::new();
        let now = Utc::now();
        let first = svc.issue_at(order, ProofStep::CourierDelivery, now);
        let second = svc.issue_at(order, ProofStep::CourierDelivery, now);

        let step = ProofStep::CourierDelivery;
        assert!(svc.verify(&second.token, Some(&second), order, step, now).is_ok());
        if first.payload.code != second.payload.code {
            assert_eq!(
                svc.verify(&first.token, Some(&second), order, step, now),
                Err(ProofError::Superseded)
            );
        }
        assert_eq!(
            svc.verify(&second.token, None, order, step, now),
            Err(ProofError::NotIssued(step))
        );
    }

    #[test]
    fn delivery_codes_are_six_digits() {
        for _ in 0..200 {
            let code = generate_delivery_code();
            assert_eq!(code.len(), 6);
            let value: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn empty_secret_is_a_config_error() {
        assert!(ProofService::new(b"", Duration::hours(24)).is_err());
    }
}
