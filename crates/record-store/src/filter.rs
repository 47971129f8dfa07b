//! Predicates a provider may push down to its backing store.
//!
//! `matches` is the one definition of what each predicate means. Providers
//! that filter natively must agree with it; the query engine re-applies it to
//! whatever a provider returns.

use crate::lenient::non_empty;
use crate::model::{Ein, Foundation, Grant};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantFilter {
    /// Restrict to grants made by these foundations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foundations: Option<BTreeSet<Ein>>,
    /// Inclusive lower bound on the grant amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<u64>,
    /// Inclusive upper bound on the grant amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<u64>,
    /// Exact recipient state, compared case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Substring of the recipient city, compared case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl GrantFilter {
    pub fn for_foundation(ein: Ein) -> Self {
        Self {
            foundations: Some(BTreeSet::from([ein])),
            ..Self::default()
        }
    }

    /// Trims text predicates, drops empty ones, uppercases the state and
    /// lowercases the city needle.
    pub fn normalized(self) -> Self {
        Self {
            foundations: self.foundations,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            state: self
                .state
                .as_deref()
                .and_then(non_empty)
                .map(str::to_uppercase),
            city: self
                .city
                .as_deref()
                .and_then(non_empty)
                .map(str::to_lowercase),
        }
    }

    pub fn has_amount_bounds(&self) -> bool {
        self.min_amount.is_some() || self.max_amount.is_some()
    }

    pub fn matches(&self, grant: &Grant) -> bool {
        if let Some(foundations) = &self.foundations {
            if !foundations.contains(&grant.foundation_ein) {
                return false;
            }
        }

        if self.has_amount_bounds() {
            // An unreported amount never satisfies a bound.
            let Some(amount) = grant.grant_amount else {
                return false;
            };
            if self.min_amount.is_some_and(|min| amount < min) {
                return false;
            }
            if self.max_amount.is_some_and(|max| amount > max) {
                return false;
            }
        }

        if let Some(state) = self.state.as_deref().and_then(non_empty) {
            match grant.state() {
                Some(actual) if actual.eq_ignore_ascii_case(state) => {}
                _ => return false,
            }
        }

        if let Some(city) = self.city.as_deref().and_then(non_empty) {
            match grant.city() {
                Some(actual) if contains_ignore_case(actual, city) => {}
                _ => return false,
            }
        }

        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundationFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eins: Option<BTreeSet<Ein>>,
    /// Substring of the organization name, compared case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FoundationFilter {
    pub fn by_ein(ein: Ein) -> Self {
        Self {
            eins: Some(BTreeSet::from([ein])),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            eins: None,
            name: Some(name.into()),
        }
    }

    pub fn matches(&self, foundation: &Foundation) -> bool {
        if let Some(eins) = &self.eins {
            if !eins.contains(&foundation.ein) {
                return false;
            }
        }
        if let Some(name) = self.name.as_deref().and_then(non_empty) {
            match foundation.name() {
                Some(actual) if contains_ignore_case(actual, name) => {}
                _ => return false,
            }
        }
        true
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
