//! Serialized shapes returned to the presentation layer.
//!
//! Records keep explicit `Option`s; defaults (`0`, `""`, the no-purpose
//! placeholder) are substituted only here.

use crate::aggregate::FoundationStats;
use crate::officers::OfficerView;
use crate::states::StateStat;
use grantscope_protocol::NO_PURPOSE;
use grantscope_record_store::{Foundation, Grant};
use serde::Serialize;

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantView {
    pub foundation_name: String,
    pub foundation_ein: String,
    pub recipient_name: String,
    pub recipient_ein: String,
    pub recipient_city: String,
    pub recipient_state: String,
    pub recipient_country: String,
    pub recipient_relationship: String,
    pub recipient_foundation_status: String,
    pub grant_purpose: String,
    pub grant_amount: u64,
    pub cash_amount: u64,
    pub non_cash_amount: u64,
    pub tax_period: String,
}

impl GrantView {
    pub fn new(grant: &Grant, foundation_name: &str) -> Self {
        Self {
            foundation_name: foundation_name.to_string(),
            foundation_ein: grant.foundation_ein.to_string(),
            recipient_name: text(&grant.recipient_name),
            recipient_ein: text(&grant.recipient_ein),
            recipient_city: text(&grant.recipient_city),
            recipient_state: text(&grant.recipient_state),
            recipient_country: text(&grant.recipient_country),
            recipient_relationship: text(&grant.recipient_relationship),
            recipient_foundation_status: text(&grant.recipient_foundation_status),
            grant_purpose: grant.purpose_text().unwrap_or(NO_PURPOSE).to_string(),
            grant_amount: grant.grant_amount.unwrap_or(0),
            cash_amount: grant.cash_amount.unwrap_or(0),
            non_cash_amount: grant.non_cash_amount.unwrap_or(0),
            tax_period: text(&grant.tax_period),
        }
    }
}

/// Contact and financial fields of a foundation's most recent filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundationProfile {
    pub ein: String,
    pub name: String,
    pub tax_period_end: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub website: String,
    pub legal_domicile_state: String,
    pub formation_year: String,
    pub total_assets_eoy: i64,
    pub fair_market_value_eoy: i64,
    pub total_revenue: i64,
    pub total_expenses: i64,
    pub total_distributions: i64,
    pub investment_income: i64,
    pub is_501c3: bool,
    pub is_private_operating_foundation: bool,
    pub mission_description: String,
}

impl FoundationProfile {
    pub fn new(filing: &Foundation) -> Self {
        Self {
            ein: filing.ein.to_string(),
            name: filing.name().unwrap_or_default().to_string(),
            tax_period_end: text(&filing.tax_period_end),
            address_line1: text(&filing.address_line1),
            address_line2: text(&filing.address_line2),
            city: text(&filing.city),
            state: text(&filing.state),
            zip: text(&filing.zip),
            phone: text(&filing.phone),
            website: text(&filing.website),
            legal_domicile_state: text(&filing.legal_domicile_state),
            formation_year: text(&filing.formation_year),
            total_assets_eoy: filing.total_assets_eoy.unwrap_or(0),
            fair_market_value_eoy: filing.fair_market_value_eoy.unwrap_or(0),
            total_revenue: filing.total_revenue.unwrap_or(0),
            total_expenses: filing.total_expenses.unwrap_or(0),
            total_distributions: filing.total_distributions.unwrap_or(0),
            investment_income: filing.investment_income.unwrap_or(0),
            is_501c3: filing.is_501c3.unwrap_or(false),
            is_private_operating_foundation: filing.is_private_operating_foundation.unwrap_or(false),
            mission_description: text(&filing.mission_description),
        }
    }
}

/// One row of a foundation search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundationSummary {
    pub ein: String,
    pub name: String,
    pub city: String,
    pub state: String,
    #[serde(flatten)]
    pub stats: FoundationStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoundationDetail {
    #[serde(flatten)]
    pub profile: FoundationProfile,
    #[serde(flatten)]
    pub stats: FoundationStats,
    pub grants: Vec<GrantView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoundationStatsReport {
    #[serde(flatten)]
    pub profile: FoundationProfile,
    #[serde(flatten)]
    pub stats: FoundationStats,
    pub states_data: Vec<StateStat>,
    pub top_grants: Vec<GrantView>,
    pub recent_grants: Vec<GrantView>,
    pub officers: Vec<OfficerView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundationBasic {
    pub ein: String,
    pub name: String,
    pub grant_count: usize,
    pub total_amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotInfo {
    pub version: u64,
    /// Milliseconds since the Unix epoch.
    pub built_at_ms: u64,
    pub foundations: usize,
    pub foundations_with_grants: usize,
}
