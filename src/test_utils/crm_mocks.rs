//! In-memory CRM used in place of the LeadConnector client.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::crm::{ContactUpsert, CrmClient},
};

/// Every request the CRM received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrmCall {
    Upsert(ContactUpsert),
    GetTags { contact_id: String },
    SetTags { contact_id: String, tags: Vec<String> },
    AddNote { contact_id: String, body: String },
}

#[derive(Debug, Clone)]
struct StoredContact {
    email: Option<String>,
    phone: Option<String>,
    tags: Vec<String>,
}

#[derive(Default)]
struct CrmState {
    contacts: HashMap<String, StoredContact>,
    calls: Vec<CrmCall>,
    next_id: usize,
}

impl CrmState {
    fn insert(&mut self, contact: StoredContact) -> String {
        self.next_id += 1;
        let id = format!("contact_{}", self.next_id);
        self.contacts.insert(id.clone(), contact);
        id
    }

    fn find(&self, email: Option<&str>, phone: Option<&str>) -> Option<String> {
        self.contacts
            .iter()
            .find(|(_, c)| {
                (email.is_some() && c.email.as_deref() == email)
                    || (phone.is_some() && c.phone.as_deref() == phone)
            })
            .map(|(id, _)| id.clone())
    }
}

/// Contacts keyed by email or phone, tags merged additively on upsert like the
/// real CRM. Builder methods switch on failure modes.
#[derive(Default)]
pub struct InMemoryCrm {
    state: Mutex<CrmState>,
    omit_contact_id: bool,
    reject_upserts: bool,
    fail_tag_lookups: bool,
    fail_notes: bool,
}

impl InMemoryCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts succeed but the response carries no contact id.
    pub fn omitting_contact_id(mut self) -> Self {
        self.omit_contact_id = true;
        self
    }

    /// Upserts fail with a 422.
    pub fn rejecting_upserts(mut self) -> Self {
        self.reject_upserts = true;
        self
    }

    pub fn failing_tag_lookups(mut self) -> Self {
        self.fail_tag_lookups = true;
        self
    }

    pub fn failing_notes(mut self) -> Self {
        self.fail_notes = true;
        self
    }

    /// Adds a contact without recording a call. Returns its id.
    pub fn seed_contact(&self, email: &str, tags: &[&str]) -> String {
        self.state.lock().unwrap().insert(StoredContact {
            email: Some(email.to_string()),
            phone: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        })
    }

    pub fn tags_of(&self, contact_id: &str) -> BTreeSet<String> {
        self.state
            .lock()
            .unwrap()
            .contacts
            .get(contact_id)
            .map(|c| c.tags.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<CrmCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn contact_count(&self) -> usize {
        self.state.lock().unwrap().contacts.len()
    }
}

fn rejected(status: u16, body: &str) -> AppError {
    AppError::Upstream {
        service: "crm",
        status,
        body: body.to_string(),
    }
}

#[async_trait]
impl CrmClient for InMemoryCrm {
    async fn upsert_contact(&self, contact: &ContactUpsert) -> AppResult<Option<String>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CrmCall::Upsert(contact.clone()));

        if self.reject_upserts {
            return Err(rejected(422, r#"{"message":"rejected"}"#));
        }
        let identity = &contact.identity;
        if !identity.has_key() {
            return Err(rejected(422, r#"{"message":"email or phone required"}"#));
        }

        let id = match state.find(identity.email.as_deref(), identity.phone.as_deref()) {
            Some(id) => id,
            None => state.insert(StoredContact {
                email: identity.email.clone(),
                phone: identity.phone.clone(),
                tags: Vec::new(),
            }),
        };
        if let Some(stored) = state.contacts.get_mut(&id) {
            for tag in &contact.tags {
                if !stored.tags.contains(tag) {
                    stored.tags.push(tag.clone());
                }
            }
        }

        Ok((!self.omit_contact_id).then_some(id))
    }

    async fn get_contact_tags(&self, contact_id: &str) -> AppResult<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CrmCall::GetTags {
            contact_id: contact_id.to_string(),
        });

        if self.fail_tag_lookups {
            return Err(rejected(500, "lookup failed"));
        }
        state
            .contacts
            .get(contact_id)
            .map(|c| c.tags.clone())
            .ok_or(AppError::NotFound)
    }

    async fn set_contact_tags(&self, contact_id: &str, tags: &[String]) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CrmCall::SetTags {
            contact_id: contact_id.to_string(),
            tags: tags.to_vec(),
        });

        let stored = state.contacts.get_mut(contact_id).ok_or(AppError::NotFound)?;
        stored.tags = tags.to_vec();
        Ok(())
    }

    async fn add_note(&self, contact_id: &str, body: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CrmCall::AddNote {
            contact_id: contact_id.to_string(),
            body: body.to_string(),
        });

        if self.fail_notes {
            return Err(rejected(500, "note failed"));
        }
        Ok(())
    }
}
