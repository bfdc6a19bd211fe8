use async_trait::async_trait;

use crate::{
    app_error::AppResult,
    domain::entities::webhook_event::CustomerProfile,
};

/// Source tag recorded on every checkout session created by the website.
pub const CHECKOUT_SOURCE: &str = "Aria Website";

/// Metadata stored on the checkout session so the completion webhook can
/// resolve the plan without a line-item lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutMetadata {
    pub plan_name: String,
    pub plan_key: String,
    pub price_id: String,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub price_id: String,
    pub metadata: CheckoutMetadata,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutRedirect {
    pub session_id: String,
    pub url: Option<String>,
}

/// Payment provider operations used by reconciliation and the checkout routes.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn get_customer(&self, customer_id: &str) -> AppResult<CustomerProfile>;

    /// First line item price of a checkout session, for sessions created
    /// without price metadata.
    async fn checkout_session_price_id(&self, session_id: &str) -> AppResult<Option<String>>;

    async fn create_checkout_session(&self, request: &CheckoutRequest)
    -> AppResult<CheckoutRedirect>;

    async fn find_customer_by_email(&self, email: &str) -> AppResult<Option<CustomerProfile>>;

    /// Returns the portal URL.
    async fn create_portal_session(&self, customer_id: &str, return_url: &str)
    -> AppResult<String>;
}
