//! Stub payment gateway with shared, inspectable state.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{CheckoutRedirect, CheckoutRequest, PaymentGateway},
    domain::entities::webhook_event::CustomerProfile,
};

#[derive(Default)]
struct GatewayState {
    session_prices: HashMap<String, String>,
    customers: HashMap<String, CustomerProfile>,
    line_item_lookups: usize,
    customer_lookups: usize,
    last_checkout: Option<CheckoutRequest>,
    last_portal_return_url: Option<String>,
}

/// Clones share state, so a test can keep one handle and give another to the
/// use case under test.
#[derive(Clone, Default)]
pub struct StubPaymentGateway {
    state: Arc<Mutex<GatewayState>>,
    fail_lookups: bool,
}

impl StubPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_price(self, session_id: &str, price_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .session_prices
            .insert(session_id.to_string(), price_id.to_string());
        self
    }

    pub fn with_customer(self, customer_id: &str, email: &str, name: &str) -> Self {
        self.state.lock().unwrap().customers.insert(
            customer_id.to_string(),
            CustomerProfile {
                id: customer_id.to_string(),
                email: Some(email.to_string()),
                phone: None,
                name: Some(name.to_string()),
            },
        );
        self
    }

    /// Customer and line-item lookups fail with a 500.
    pub fn failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    pub fn line_item_lookups(&self) -> usize {
        self.state.lock().unwrap().line_item_lookups
    }

    pub fn customer_lookups(&self) -> usize {
        self.state.lock().unwrap().customer_lookups
    }

    pub fn last_checkout(&self) -> Option<CheckoutRequest> {
        self.state.lock().unwrap().last_checkout.clone()
    }

    pub fn last_portal_return_url(&self) -> Option<String> {
        self.state.lock().unwrap().last_portal_return_url.clone()
    }

    fn lookup_failure(&self) -> AppResult<()> {
        if self.fail_lookups {
            return Err(AppError::Upstream {
                service: "stripe",
                status: 500,
                body: "lookup failed".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for StubPaymentGateway {
    async fn get_customer(&self, customer_id: &str) -> AppResult<CustomerProfile> {
        self.state.lock().unwrap().customer_lookups += 1;
        self.lookup_failure()?;
        self.state
            .lock()
            .unwrap()
            .customers
            .get(customer_id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn checkout_session_price_id(&self, session_id: &str) -> AppResult<Option<String>> {
        self.state.lock().unwrap().line_item_lookups += 1;
        self.lookup_failure()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .session_prices
            .get(session_id)
            .cloned())
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> AppResult<CheckoutRedirect> {
        self.state.lock().unwrap().last_checkout = Some(request.clone());
        Ok(CheckoutRedirect {
            session_id: "cs_test_1".into(),
            url: Some("https://checkout.example/pay/cs_test_1".into()),
        })
    }

    async fn find_customer_by_email(&self, email: &str) -> AppResult<Option<CustomerProfile>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .customers
            .values()
            .find(|c| c.email.as_deref() == Some(email))
            .cloned())
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> AppResult<String> {
        self.state.lock().unwrap().last_portal_return_url = Some(return_url.to_string());
        Ok(format!("https://billing.example/portal/{customer_id}"))
    }
}
