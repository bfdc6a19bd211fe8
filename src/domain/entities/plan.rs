use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Subscription tier sold on the website.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlanKey {
    Trial,
    Starter,
    Growth,
}

impl PlanKey {
    /// CRM tag marking a contact as being on this plan.
    pub fn label(&self) -> &'static str {
        match self {
            PlanKey::Trial => "Plan: 99 Trial",
            PlanKey::Starter => "Plan: 497 Starter",
            PlanKey::Growth => "Plan: 997 Growth",
        }
    }

    /// Normalizes a free-form plan name coming from the UI ("Starter", " growth ").
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDescriptor {
    pub key: PlanKey,
    pub label: &'static str,
}

impl From<PlanKey> for PlanDescriptor {
    fn from(key: PlanKey) -> Self {
        Self {
            key,
            label: key.label(),
        }
    }
}

/// Price id -> plan mapping. Built once from configuration and never mutated.
#[derive(Debug, Clone, Default)]
pub struct PlanCatalog {
    by_price: HashMap<String, PlanDescriptor>,
}

impl PlanCatalog {
    pub fn new<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, PlanKey)>,
        S: Into<String>,
    {
        let by_price = prices
            .into_iter()
            .map(|(price_id, key)| (price_id.into(), PlanDescriptor::from(key)))
            .filter(|(price_id, _)| !price_id.trim().is_empty())
            .collect();
        Self { by_price }
    }

    pub fn resolve(&self, price_id: Option<&str>) -> Option<&PlanDescriptor> {
        price_id.and_then(|id| self.by_price.get(id))
    }

    pub fn is_known_price(&self, price_id: &str) -> bool {
        self.by_price.contains_key(price_id)
    }

    pub fn price_for(&self, key: PlanKey) -> Option<&str> {
        self.by_price
            .iter()
            .find(|(_, plan)| plan.key == key)
            .map(|(price_id, _)| price_id.as_str())
    }

    /// Every plan label the CRM may carry, whether or not its price is configured.
    pub fn all_labels(&self) -> Vec<&'static str> {
        PlanKey::iter().map(|key| key.label()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.by_price.is_empty()
    }
}
