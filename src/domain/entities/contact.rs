use std::collections::BTreeSet;

use serde::Serialize;

pub const PAID_CUSTOMER_TAG: &str = "Paid Customer";
pub const STRIPE_TAG: &str = "Stripe";
pub const CHECKOUT_SUCCESS_TAG: &str = "Checkout Success";

/// Who a CRM contact is. The CRM keys upserts on email or phone; either may be
/// absent when the payment provider could not tell us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactIdentity {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ContactIdentity {
    pub fn has_key(&self) -> bool {
        self.email.is_some() || self.phone.is_some()
    }
}

/// Tag changes to apply to one contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMutation {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl TagMutation {
    pub fn add_only<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            add: tags.into_iter().map(Into::into).collect(),
            remove: Vec::new(),
        }
    }

    pub fn new<A, R, S, T>(add: A, remove: R) -> Self
    where
        A: IntoIterator<Item = S>,
        R: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            add: add.into_iter().map(Into::into).collect(),
            remove: remove.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add_set(&self) -> BTreeSet<&str> {
        self.add.iter().map(String::as_str).collect()
    }

    pub fn remove_set(&self) -> BTreeSet<&str> {
        self.remove.iter().map(String::as_str).collect()
    }
}

/// Drops every tag listed in `remove`, keeping the CRM's order for the rest.
pub fn filter_tags(current: &[String], remove: &[String]) -> Vec<String> {
    current
        .iter()
        .filter(|tag| !remove.contains(tag))
        .cloned()
        .collect()
}
