//! Stripe webhook payloads, narrowed to the shapes reconciliation reads.
//!
//! Parsing happens only after the signature check. Within a handled event
//! type a payload that does not match the expected shape is rejected rather
//! than treated as "no data".

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const SUBSCRIPTION_CREATED: &str = "customer.subscription.created";
pub const SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
pub const SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";

/// Metadata key the checkout endpoint stores the purchased price under.
pub const PRICE_ID_METADATA_KEY: &str = "priceId";

#[derive(Debug, Error)]
pub enum EventParseError {
    #[error("webhook body is not a Stripe event: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("unexpected {event_type} payload: {source}")]
    Payload {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionChange {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone)]
pub enum EventPayload {
    CheckoutCompleted(CheckoutSession),
    Subscription {
        change: SubscriptionChange,
        subscription: Subscription,
    },
    /// Verified event of a type reconciliation does not act on.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: String,
    pub payload: EventPayload,
}

#[derive(Deserialize)]
struct Envelope {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: EnvelopeData,
}

#[derive(Deserialize)]
struct EnvelopeData {
    object: serde_json::Value,
}

impl WebhookEvent {
    pub fn parse(body: &[u8]) -> Result<Self, EventParseError> {
        let envelope: Envelope = serde_json::from_slice(body).map_err(EventParseError::Envelope)?;
        let event_type = envelope.event_type;

        let payload = match event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => {
                EventPayload::CheckoutCompleted(decode(&event_type, envelope.data.object)?)
            }
            SUBSCRIPTION_CREATED | SUBSCRIPTION_UPDATED | SUBSCRIPTION_DELETED => {
                let change = match event_type.as_str() {
                    SUBSCRIPTION_CREATED => SubscriptionChange::Created,
                    SUBSCRIPTION_UPDATED => SubscriptionChange::Updated,
                    _ => SubscriptionChange::Deleted,
                };
                EventPayload::Subscription {
                    change,
                    subscription: decode(&event_type, envelope.data.object)?,
                }
            }
            _ => EventPayload::Ignored,
        };

        Ok(Self {
            id: envelope.id,
            event_type,
            payload,
        })
    }
}

fn decode<T: for<'de> Deserialize<'de>>(
    event_type: &str,
    object: serde_json::Value,
) -> Result<T, EventParseError> {
    serde_json::from_value(object).map_err(|source| EventParseError::Payload {
        event_type: event_type.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub customer: Option<String>,
    pub customer_email: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl CheckoutSession {
    pub fn metadata_price_id(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(PRICE_ID_METADATA_KEY))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
}

/// Customer as returned by the customer API or expanded inline in a subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustomerProfile {
    pub id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
}

/// Subscriptions reference their customer by id unless the sender expanded it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CustomerRef {
    Id(String),
    Expanded(CustomerProfile),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub customer: CustomerRef,
    pub status: String,
    #[serde(default)]
    pub items: SubscriptionItems,
}

impl Subscription {
    /// Price of the first subscription item.
    pub fn price_id(&self) -> Option<&str> {
        self.items
            .data
            .first()
            .and_then(|item| item.price.as_ref())
            .map(|price| price.id.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    pub price: Option<PriceRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceRef {
    pub id: String,
}
