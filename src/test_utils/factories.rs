//! Test data factories for webhook payloads, the plan catalog and config.

use std::net::SocketAddr;

use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

use crate::{
    domain::entities::plan::PlanCatalog,
    infra::{
        config::{AppConfig, PlanPrices},
        webhook_signer::sign_webhook_payload,
    },
};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

pub fn test_plan_prices() -> PlanPrices {
    PlanPrices {
        trial: Some("price_trial".into()),
        starter: Some("price_starter".into()),
        growth: Some("price_growth".into()),
    }
}

/// `price_trial`, `price_starter` and `price_growth`.
pub fn test_catalog() -> PlanCatalog {
    test_plan_prices().catalog()
}

pub fn test_config() -> AppConfig {
    AppConfig {
        stripe_secret_key: SecretString::new("sk_test_123".into()),
        stripe_webhook_secret: SecretString::new(TEST_WEBHOOK_SECRET.into()),
        stripe_api_base: Url::parse("https://stripe.invalid/v1").unwrap(),
        plan_prices: test_plan_prices(),
        crm: None,
        crm_api_base: Url::parse("https://crm.invalid").unwrap(),
        crm_default_tag: None,
        site_url: Url::parse("https://ariagroups.xyz").unwrap(),
        cors_origins: Vec::new(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
    }
}

/// A `Stripe-Signature` header for `body`, signed now with the test secret.
pub fn signature_for(body: &[u8]) -> String {
    sign_webhook_payload(TEST_WEBHOOK_SECRET, chrono::Utc::now().timestamp(), body).unwrap()
}

/// `checkout.session.completed` event wrapping `session`.
pub fn checkout_event(session: Value) -> Value {
    json!({
        "id": "evt_checkout",
        "type": "checkout.session.completed",
        "data": { "object": session }
    })
}

/// Subscription lifecycle event with a single item priced at `price_id`.
pub fn subscription_event(
    event_type: &str,
    customer_id: &str,
    status: &str,
    price_id: Option<&str>,
) -> Value {
    let items = match price_id {
        Some(price_id) => json!([{ "id": "si_1", "price": { "id": price_id } }]),
        None => json!([]),
    };
    json!({
        "id": "evt_subscription",
        "type": event_type,
        "data": {
            "object": {
                "id": "sub_1",
                "customer": customer_id,
                "status": status,
                "items": { "object": "list", "data": items }
            }
        }
    })
}
