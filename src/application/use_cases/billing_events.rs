use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    application::{
        helpers::contact_parsing::split_display_name,
        ports::payment_provider::PaymentGateway,
        use_cases::contact_sync::{ContactSyncUseCases, SyncError, SyncedContact},
    },
    domain::entities::{
        contact::{
            CHECKOUT_SUCCESS_TAG, ContactIdentity, PAID_CUSTOMER_TAG, STRIPE_TAG, TagMutation,
        },
        plan::{PlanCatalog, PlanDescriptor},
        subscription_status::{Lifecycle, SubscriptionStatus},
        webhook_event::{
            CheckoutSession, CustomerProfile, CustomerRef, EventPayload, Subscription,
            WebhookEvent,
        },
    },
};

/// Result of handling one verified webhook event. Never surfaced to Stripe;
/// the receiver acknowledges every outcome.
#[derive(Debug)]
pub enum EventOutcome {
    /// Event type reconciliation does not act on.
    Ignored,
    /// Handled type, but the subscription status leaves tags alone.
    Unchanged { status: SubscriptionStatus },
    Reconciled(SyncedContact),
    SyncFailed(SyncError),
}

#[async_trait]
pub trait BillingEventHandler: Send + Sync {
    async fn handle(&self, event: WebhookEvent) -> EventOutcome;
}

/// Turns payment events into contact tag changes.
#[derive(Clone)]
pub struct BillingEventUseCases {
    gateway: Arc<dyn PaymentGateway>,
    catalog: Arc<PlanCatalog>,
    contacts: Arc<ContactSyncUseCases>,
}

impl BillingEventUseCases {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        catalog: Arc<PlanCatalog>,
        contacts: Arc<ContactSyncUseCases>,
    ) -> Self {
        Self {
            gateway,
            catalog,
            contacts,
        }
    }

    /// Identity and tag changes for a completed checkout.
    pub async fn interpret_checkout(
        &self,
        session: &CheckoutSession,
    ) -> (ContactIdentity, TagMutation) {
        let details = session.customer_details.clone().unwrap_or_default();
        let (first_name, last_name) = split_display_name(details.name.as_deref());
        let identity = ContactIdentity {
            email: details.email.or_else(|| session.customer_email.clone()),
            phone: details.phone,
            first_name,
            last_name,
        };

        let price_id = self.checkout_price_id(session).await;
        let plan = self.catalog.resolve(price_id.as_deref());
        if plan.is_none() {
            tracing::warn!(
                session_id = %session.id,
                price_id = ?price_id,
                "Checkout completed without a known plan, tagging base markers only"
            );
        }

        (identity, checkout_tags(plan))
    }

    /// Identity and tag changes for a subscription lifecycle event, `None`
    /// when the status leaves tags alone.
    pub async fn interpret_subscription(
        &self,
        subscription: &Subscription,
    ) -> Option<(ContactIdentity, TagMutation)> {
        let status = SubscriptionStatus::from_stripe(&subscription.status);
        let plan = self.catalog.resolve(subscription.price_id());
        let mutation = subscription_tags(status.lifecycle(), plan, &self.catalog)?;

        let identity = match self.subscription_customer(subscription).await {
            Some(customer) => {
                let (first_name, last_name) = split_display_name(customer.name.as_deref());
                ContactIdentity {
                    email: customer.email,
                    phone: customer.phone,
                    first_name,
                    last_name,
                }
            }
            None => ContactIdentity::default(),
        };

        Some((identity, mutation))
    }

    /// Metadata first; sessions created outside the website carry no price
    /// metadata, so fall back to the session's line items.
    async fn checkout_price_id(&self, session: &CheckoutSession) -> Option<String> {
        if let Some(price_id) = session.metadata_price_id() {
            return Some(price_id.to_string());
        }

        match self.gateway.checkout_session_price_id(&session.id).await {
            Ok(price_id) => price_id,
            Err(e) => {
                tracing::warn!(error = %e, session_id = %session.id, "Line item lookup failed");
                None
            }
        }
    }

    async fn subscription_customer(&self, subscription: &Subscription) -> Option<CustomerProfile> {
        match &subscription.customer {
            CustomerRef::Expanded(customer) => Some(customer.clone()),
            CustomerRef::Id(customer_id) => match self.gateway.get_customer(customer_id).await {
                Ok(customer) => Some(customer),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        customer_id = %customer_id,
                        subscription_id = %subscription.id,
                        "Stripe customer fetch failed, syncing without identity"
                    );
                    None
                }
            },
        }
    }

    async fn sync(&self, identity: ContactIdentity, mutation: TagMutation) -> EventOutcome {
        match self.contacts.reconcile(&identity, &mutation).await {
            Ok(synced) => EventOutcome::Reconciled(synced),
            Err(e) => EventOutcome::SyncFailed(e),
        }
    }
}

#[async_trait]
impl BillingEventHandler for BillingEventUseCases {
    #[instrument(skip(self, event), fields(event_id = %event.id, event_type = %event.event_type))]
    async fn handle(&self, event: WebhookEvent) -> EventOutcome {
        let outcome = match &event.payload {
            EventPayload::CheckoutCompleted(session) => {
                let (identity, mutation) = self.interpret_checkout(session).await;
                self.sync(identity, mutation).await
            }
            EventPayload::Subscription { subscription, .. } => {
                match self.interpret_subscription(subscription).await {
                    Some((identity, mutation)) => self.sync(identity, mutation).await,
                    None => EventOutcome::Unchanged {
                        status: SubscriptionStatus::from_stripe(&subscription.status),
                    },
                }
            }
            EventPayload::Ignored => {
                tracing::debug!("Unhandled webhook event type");
                EventOutcome::Ignored
            }
        };

        if let EventOutcome::SyncFailed(e) = &outcome {
            tracing::error!(error = %e, "CRM sync failed, acknowledging event anyway");
        }
        outcome
    }
}

pub fn checkout_tags(plan: Option<&PlanDescriptor>) -> TagMutation {
    let mut add = vec![PAID_CUSTOMER_TAG, STRIPE_TAG];
    if let Some(plan) = plan {
        add.push(plan.label);
        add.push(CHECKOUT_SUCCESS_TAG);
    }
    TagMutation::add_only(add)
}

pub fn subscription_tags(
    lifecycle: Lifecycle,
    plan: Option<&PlanDescriptor>,
    catalog: &PlanCatalog,
) -> Option<TagMutation> {
    let current = plan.map(|p| p.label);
    match lifecycle {
        Lifecycle::Paid => {
            let mut add = vec![PAID_CUSTOMER_TAG, STRIPE_TAG];
            add.extend(current);
            let remove = catalog
                .all_labels()
                .into_iter()
                .filter(|label| Some(*label) != current);
            Some(TagMutation::new(add, remove))
        }
        Lifecycle::Lapsed => {
            let mut remove = catalog.all_labels();
            remove.push(PAID_CUSTOMER_TAG);
            Some(TagMutation::new([STRIPE_TAG], remove))
        }
        Lifecycle::Unchanged => None,
    }
}
