use std::sync::Arc;

use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        helpers::contact_parsing::split_display_name,
        ports::crm::{ContactUpsert, CrmClient},
        validators::{is_valid_email, non_blank},
    },
    domain::entities::contact::ContactIdentity,
};

pub const DEFAULT_LEAD_SOURCE: &str = "Website";

#[derive(Debug, Clone, Default)]
pub struct UtmFields {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub term: Option<String>,
    pub content: Option<String>,
}

/// A website form submission.
#[derive(Debug, Clone, Default)]
pub struct LeadInput {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
    pub tags: Vec<String>,
    pub source: Option<String>,
    pub page_url: Option<String>,
    pub utm: UtmFields,
    pub user_agent: Option<String>,
    pub client_ip: Option<String>,
}

#[derive(Clone)]
pub struct LeadUseCases {
    crm: Option<Arc<dyn CrmClient>>,
    default_tag: Option<String>,
}

impl LeadUseCases {
    pub fn new(crm: Option<Arc<dyn CrmClient>>, default_tag: Option<String>) -> Self {
        Self { crm, default_tag }
    }

    /// Upserts the lead as a CRM contact and attaches the submission details as
    /// a note. Returns the contact id when the CRM reported one.
    #[instrument(skip(self, lead), fields(source = ?lead.source))]
    pub async fn capture(&self, lead: LeadInput) -> AppResult<Option<String>> {
        let crm = self
            .crm
            .as_ref()
            .ok_or(AppError::NotConfigured("CRM credentials"))?;

        let email = non_blank(lead.email.as_deref());
        let phone = non_blank(lead.phone.as_deref());
        if email.is_none() && phone.is_none() {
            return Err(AppError::InvalidInput(
                "Provide at least email or phone".into(),
            ));
        }
        if let Some(email) = email.as_deref()
            && !is_valid_email(email)
        {
            return Err(AppError::InvalidInput("Invalid email".into()));
        }

        let (first_name, rest_of_name) = split_display_name(
            non_blank(lead.name.as_deref())
                .or_else(|| non_blank(lead.first_name.as_deref()))
                .as_deref(),
        );
        let last_name = non_blank(lead.last_name.as_deref()).or_else(|| {
            if non_blank(lead.name.as_deref()).is_some() {
                rest_of_name
            } else {
                Some(String::new())
            }
        });

        let upsert = ContactUpsert {
            identity: ContactIdentity {
                email,
                phone,
                first_name: first_name.or_else(|| Some(String::new())),
                last_name,
            },
            company_name: non_blank(lead.company.as_deref()),
            source: Some(
                non_blank(lead.source.as_deref()).unwrap_or_else(|| DEFAULT_LEAD_SOURCE.into()),
            ),
            tags: self.lead_tags(&lead.tags),
        };

        let contact_id = crm.upsert_contact(&upsert).await?;

        let note = note_lines(&lead);
        if let Some(contact_id) = contact_id.as_deref()
            && !note.is_empty()
            && let Err(e) = crm.add_note(contact_id, &note.join("\n")).await
        {
            tracing::warn!(error = %e, contact_id, "Failed to attach lead note");
        }

        tracing::info!(contact_id = ?contact_id, "Lead captured");
        Ok(contact_id)
    }

    fn lead_tags(&self, incoming: &[String]) -> Vec<String> {
        self.default_tag
            .iter()
            .chain(incoming)
            .filter_map(|t| non_blank(Some(t.as_str())))
            .collect()
    }
}

fn note_lines(lead: &LeadInput) -> Vec<String> {
    let fields = [
        ("Message", &lead.message),
        ("Page URL", &lead.page_url),
        ("UTM Source", &lead.utm.source),
        ("UTM Medium", &lead.utm.medium),
        ("UTM Campaign", &lead.utm.campaign),
        ("UTM Term", &lead.utm.term),
        ("UTM Content", &lead.utm.content),
        ("UA", &lead.user_agent),
        ("IP", &lead.client_ip),
    ];
    fields
        .into_iter()
        .filter_map(|(label, value)| {
            non_blank(value.as_deref()).map(|v| format!("{label}: {v}"))
        })
        .collect()
}
