//! Hash joins between ledger names, investment types and risk tiers.
use crate::core::ledger::{ClassificationEntry, RiskEntry};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::warn;

/// Lookup index over the two classification tables.
///
/// Lookups behave like a SQL left join: an unknown name or type yields `None`
/// instead of an error. Duplicate keys keep the first row seen.
#[derive(Debug, Default, Clone)]
pub struct Classifier {
    types: HashMap<String, String>,
    risks: HashMap<String, String>,
}

impl Classifier {
    pub fn new(type_map: &[ClassificationEntry], risk_map: &[RiskEntry]) -> Self {
        let mut types = HashMap::with_capacity(type_map.len());
        for entry in type_map {
            match types.entry(entry.investment_name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(entry.investment_type.clone());
                }
                Entry::Occupied(existing) => warn!(
                    "Duplicate type for investment {}: keeping {}, ignoring {}",
                    entry.investment_name,
                    existing.get(),
                    entry.investment_type
                ),
            }
        }

        let mut risks = HashMap::with_capacity(risk_map.len());
        for entry in risk_map {
            match risks.entry(entry.investment_type.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(entry.risk_tier.clone());
                }
                Entry::Occupied(existing) => warn!(
                    "Duplicate risk tier for type {}: keeping {}, ignoring {}",
                    entry.investment_type,
                    existing.get(),
                    entry.risk_tier
                ),
            }
        }

        Self { types, risks }
    }

    pub fn investment_type(&self, investment_name: &str) -> Option<&str> {
        self.types.get(investment_name).map(String::as_str)
    }

    /// Two-hop lookup: name -> type -> risk tier.
    pub fn risk_tier(&self, investment_name: &str) -> Option<&str> {
        self.investment_type(investment_name)
            .and_then(|t| self.risks.get(t))
            .map(String::as_str)
    }
}
