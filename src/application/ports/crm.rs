use async_trait::async_trait;

use crate::{app_error::AppResult, domain::entities::contact::ContactIdentity};

/// Create-or-update request for a CRM contact. Tags are merged additively by
/// the CRM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactUpsert {
    pub identity: ContactIdentity,
    pub company_name: Option<String>,
    pub source: Option<String>,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait CrmClient: Send + Sync {
    /// Returns the contact id from the CRM response, `None` when the CRM
    /// accepted the request but did not say which contact it touched.
    async fn upsert_contact(&self, contact: &ContactUpsert) -> AppResult<Option<String>>;

    async fn get_contact_tags(&self, contact_id: &str) -> AppResult<Vec<String>>;

    /// Replaces the contact's tag list.
    async fn set_contact_tags(&self, contact_id: &str, tags: &[String]) -> AppResult<()>;

    async fn add_note(&self, contact_id: &str, body: &str) -> AppResult<()>;
}
