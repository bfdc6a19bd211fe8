//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` wires the real use cases to in-memory ports; the
//! event handler can be swapped for a `RecordingEventHandler` when a test only
//! cares whether the webhook route reached it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        ports::crm::CrmClient,
        use_cases::{
            billing_events::{BillingEventHandler, BillingEventUseCases, EventOutcome},
            checkout::CheckoutUseCases,
            contact_sync::ContactSyncUseCases,
            lead_capture::LeadUseCases,
        },
    },
    domain::entities::webhook_event::WebhookEvent,
    test_utils::{InMemoryCrm, StubPaymentGateway, test_config},
};

// ============================================================================
// RecordingEventHandler
// ============================================================================

/// Records every event it receives and reports it as ignored.
#[derive(Default)]
pub struct RecordingEventHandler {
    events: Mutex<Vec<WebhookEvent>>,
}

impl RecordingEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }
}

#[async_trait]
impl BillingEventHandler for RecordingEventHandler {
    async fn handle(&self, event: WebhookEvent) -> EventOutcome {
        self.events.lock().unwrap().push(event);
        EventOutcome::Ignored
    }
}

// ============================================================================
// TestAppStateBuilder
// ============================================================================

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let crm = Arc::new(InMemoryCrm::new());
/// let app_state = TestAppStateBuilder::new()
///     .with_crm(crm.clone())
///     .with_gateway(StubPaymentGateway::new().with_customer("cus_1", "a@b.c", "Ann"))
///     .build();
/// ```
pub struct TestAppStateBuilder {
    crm: Option<Arc<InMemoryCrm>>,
    gateway: StubPaymentGateway,
    event_handler: Option<Arc<dyn BillingEventHandler>>,
    default_tag: Option<String>,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            crm: Some(Arc::new(InMemoryCrm::new())),
            gateway: StubPaymentGateway::new(),
            event_handler: None,
            default_tag: None,
        }
    }

    pub fn with_crm(mut self, crm: Arc<InMemoryCrm>) -> Self {
        self.crm = Some(crm);
        self
    }

    /// Behaves as if the CRM credentials were not configured.
    pub fn without_crm(mut self) -> Self {
        self.crm = None;
        self
    }

    pub fn with_gateway(mut self, gateway: StubPaymentGateway) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn BillingEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn with_default_tag(mut self, tag: &str) -> Self {
        self.default_tag = Some(tag.to_string());
        self
    }

    pub fn build(self) -> AppState {
        let config = test_config();
        let catalog = Arc::new(config.plan_prices.catalog());
        let gateway = Arc::new(self.gateway);
        let crm = self.crm.map(|crm| crm as Arc<dyn CrmClient>);

        let billing_events = self.event_handler.unwrap_or_else(|| {
            Arc::new(BillingEventUseCases::new(
                gateway.clone(),
                catalog.clone(),
                Arc::new(ContactSyncUseCases::new(crm.clone())),
            ))
        });

        let checkout_use_cases = CheckoutUseCases::new(gateway, catalog, &config.site_url);
        let lead_use_cases = LeadUseCases::new(crm, self.default_tag);

        AppState {
            config: Arc::new(config),
            billing_events,
            checkout_use_cases: Arc::new(checkout_use_cases),
            lead_use_cases: Arc::new(lead_use_cases),
        }
    }
}
