use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use crate::{
    app_error::AppError,
    application::ports::crm::{ContactUpsert, CrmClient},
    domain::entities::contact::{ContactIdentity, TagMutation, filter_tags},
};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("CRM credentials are not configured")]
    NotConfigured,

    #[error("CRM upsert failed: {0}")]
    Upsert(#[source] AppError),

    #[error("CRM upsert response did not include a contact id")]
    MissingContactId,
}

/// What happened to the tag-removal step of a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Nothing was asked to be removed.
    Skipped,
    /// The contact carried none of the tags, no update was sent.
    Unchanged,
    Applied,
    /// Lookup or update failed; the upsert still stands.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedContact {
    pub contact_id: String,
    pub removal: RemovalOutcome,
}

/// Brings a CRM contact's tags in line with a [`TagMutation`].
///
/// The CRM has no atomic add-and-remove, so this upserts with the new tags
/// first and strips stale ones afterwards. Between the two calls a contact may
/// briefly carry both the old and the new plan label.
#[derive(Clone)]
pub struct ContactSyncUseCases {
    crm: Option<Arc<dyn CrmClient>>,
}

impl ContactSyncUseCases {
    /// `crm` is `None` when credentials are missing; every reconcile then fails
    /// with [`SyncError::NotConfigured`] before touching the network.
    pub fn new(crm: Option<Arc<dyn CrmClient>>) -> Self {
        Self { crm }
    }

    pub fn is_configured(&self) -> bool {
        self.crm.is_some()
    }

    #[instrument(skip(self, identity), fields(has_email = identity.email.is_some(), has_phone = identity.phone.is_some()))]
    pub async fn reconcile(
        &self,
        identity: &ContactIdentity,
        mutation: &TagMutation,
    ) -> Result<SyncedContact, SyncError> {
        let Some(crm) = self.crm.as_ref() else {
            tracing::error!("CRM credentials missing, skipping contact sync");
            return Err(SyncError::NotConfigured);
        };

        let upsert = ContactUpsert {
            identity: identity.clone(),
            company_name: None,
            source: None,
            tags: mutation.add.clone(),
        };

        let contact_id = crm
            .upsert_contact(&upsert)
            .await
            .map_err(SyncError::Upsert)?
            .ok_or(SyncError::MissingContactId)?;

        let removal = if mutation.remove.is_empty() {
            RemovalOutcome::Skipped
        } else {
            match remove_tags(crm.as_ref(), &contact_id, &mutation.remove).await {
                Ok(true) => RemovalOutcome::Applied,
                Ok(false) => RemovalOutcome::Unchanged,
                Err(e) => {
                    tracing::warn!(error = %e, contact_id = %contact_id, "Best-effort tag removal failed");
                    RemovalOutcome::Failed
                }
            }
        };

        tracing::info!(contact_id = %contact_id, ?removal, "Contact reconciled");
        Ok(SyncedContact {
            contact_id,
            removal,
        })
    }
}

/// Returns whether an update was sent.
async fn remove_tags(
    crm: &dyn CrmClient,
    contact_id: &str,
    remove: &[String],
) -> Result<bool, AppError> {
    let current = crm.get_contact_tags(contact_id).await?;
    let filtered = filter_tags(&current, remove);
    if filtered.len() == current.len() {
        return Ok(false);
    }
    crm.set_contact_tags(contact_id, &filtered).await?;
    Ok(true)
}
