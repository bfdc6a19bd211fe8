//! Stripe webhook signatures: `Stripe-Signature: t=<unix>,v1=<hex hmac>[,v1=...]`
//! where the HMAC-SHA256 is computed over `"<t>.<raw body>"`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::app_error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age (either direction) of a signature timestamp.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

fn signed_payload_mac(secret: &str, timestamp: &str, payload: &[u8]) -> AppResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Internal("HMAC key rejected".into()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

pub fn sign_webhook_payload(secret: &str, timestamp: i64, payload: &[u8]) -> AppResult<String> {
    let timestamp = timestamp.to_string();
    let mac = signed_payload_mac(secret, &timestamp, payload)?;
    let signature = hex::encode(mac.finalize().into_bytes());
    Ok(format!("t={},v1={}", timestamp, signature))
}

/// Verifies `signature_header` against the raw request body.
pub fn verify_webhook_signature(
    payload: &[u8],
    signature_header: &str,
    webhook_secret: &str,
) -> AppResult<()> {
    verify_webhook_signature_at(
        payload,
        signature_header,
        webhook_secret,
        chrono::Utc::now().timestamp(),
    )
}

pub fn verify_webhook_signature_at(
    payload: &[u8],
    signature_header: &str,
    webhook_secret: &str,
    now: i64,
) -> AppResult<()> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = Some(value),
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| AppError::InvalidSignature("Missing timestamp in signature".into()))?;
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| AppError::InvalidSignature("Invalid timestamp".into()))?;

    if signatures.is_empty() {
        return Err(AppError::InvalidSignature("Missing v1 signature".into()));
    }

    let mac = signed_payload_mac(webhook_secret, timestamp, payload)?;
    // verify_slice compares in constant time.
    let matched = signatures
        .iter()
        .filter_map(|sig| hex::decode(sig).ok())
        .any(|sig| mac.clone().verify_slice(&sig).is_ok());
    if !matched {
        return Err(AppError::InvalidSignature("Signature mismatch".into()));
    }

    if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(AppError::InvalidSignature(
            "Timestamp outside tolerance".into(),
        ));
    }

    Ok(())
}
