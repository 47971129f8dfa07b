use crate::error::RecordStoreError;
use crate::lenient::{self, non_empty};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Employer Identification Number: the identity of a foundation.
///
/// Accepts `123456789`, `"123456789"` and `"12-3456789"` on input; always
/// serializes as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Ein(u32);

impl Ein {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Ein {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:09}", self.0)
    }
}

impl From<u32> for Ein {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl FromStr for Ein {
    type Err = RecordStoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let digits: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect();
        if digits.is_empty() || digits.len() > 9 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(RecordStoreError::InvalidEin(raw.to_string()));
        }
        digits
            .parse::<u32>()
            .map(Self)
            .map_err(|_| RecordStoreError::InvalidEin(raw.to_string()))
    }
}

impl<'de> Deserialize<'de> for Ein {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v <= 999_999_999)
                .map(Self)
                .ok_or_else(|| D::Error::custom(format!("invalid EIN {n}"))),
            serde_json::Value::String(s) => s.parse().map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("invalid EIN {other}"))),
        }
    }
}

/// One disbursement from a foundation to a recipient, as reported in a filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    #[serde(alias = "filer_ein", alias = "ein")]
    pub foundation_ein: Ein,
    #[serde(default, deserialize_with = "lenient::text")]
    pub recipient_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub recipient_ein: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub recipient_city: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub recipient_state: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub recipient_country: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub recipient_relationship: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub recipient_foundation_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub grant_purpose: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub grant_amount: Option<u64>,
    #[serde(default, alias = "cash_grant_amount", deserialize_with = "lenient::amount")]
    pub cash_amount: Option<u64>,
    #[serde(
        default,
        alias = "non_cash_grant_amount",
        deserialize_with = "lenient::amount"
    )]
    pub non_cash_amount: Option<u64>,
    #[serde(default, alias = "tax_period_end", deserialize_with = "lenient::text")]
    pub tax_period: Option<String>,
}

impl Grant {
    pub fn new(foundation_ein: Ein, grant_amount: Option<u64>) -> Self {
        Self {
            foundation_ein,
            recipient_name: None,
            recipient_ein: None,
            recipient_city: None,
            recipient_state: None,
            recipient_country: None,
            recipient_relationship: None,
            recipient_foundation_status: None,
            grant_purpose: None,
            grant_amount,
            cash_amount: None,
            non_cash_amount: None,
            tax_period: None,
        }
    }

    pub fn located(mut self, city: impl Into<String>, state: impl Into<String>) -> Self {
        self.recipient_city = Some(city.into());
        self.recipient_state = Some(state.into());
        self
    }

    pub fn purpose(mut self, purpose: impl Into<String>) -> Self {
        self.grant_purpose = Some(purpose.into());
        self
    }

    pub fn period(mut self, tax_period: impl Into<String>) -> Self {
        self.tax_period = Some(tax_period.into());
        self
    }

    /// The amount this grant contributes to aggregates. A zero amount counts as
    /// unreported, matching how filings leave the column blank or zeroed.
    pub fn reported_amount(&self) -> Option<u64> {
        self.grant_amount.filter(|amount| *amount > 0)
    }

    pub fn state(&self) -> Option<&str> {
        self.recipient_state.as_deref().and_then(non_empty)
    }

    pub fn city(&self) -> Option<&str> {
        self.recipient_city.as_deref().and_then(non_empty)
    }

    pub fn purpose_text(&self) -> Option<&str> {
        self.grant_purpose.as_deref().and_then(non_empty)
    }

    pub fn period_text(&self) -> Option<&str> {
        self.tax_period.as_deref().and_then(non_empty)
    }
}

/// One filing snapshot of a foundation. A foundation has one per tax period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Foundation {
    pub ein: Ein,
    #[serde(default, alias = "name", deserialize_with = "lenient::text")]
    pub organization_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub tax_period_end: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub address_line1: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub address_line2: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub zip: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub legal_domicile_state: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub formation_year: Option<String>,
    #[serde(default, deserialize_with = "lenient::signed")]
    pub total_assets_eoy: Option<i64>,
    #[serde(default, deserialize_with = "lenient::signed")]
    pub fair_market_value_eoy: Option<i64>,
    #[serde(default, deserialize_with = "lenient::signed")]
    pub total_revenue: Option<i64>,
    #[serde(default, deserialize_with = "lenient::signed")]
    pub total_expenses: Option<i64>,
    #[serde(default, deserialize_with = "lenient::signed")]
    pub total_distributions: Option<i64>,
    #[serde(default, deserialize_with = "lenient::signed")]
    pub investment_income: Option<i64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_501c3: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_private_operating_foundation: Option<bool>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub mission_description: Option<String>,
}

impl Foundation {
    pub fn new(ein: Ein, organization_name: impl Into<String>) -> Self {
        Self {
            ein,
            organization_name: Some(organization_name.into()),
            tax_period_end: None,
            address_line1: None,
            address_line2: None,
            city: None,
            state: None,
            zip: None,
            phone: None,
            website: None,
            legal_domicile_state: None,
            formation_year: None,
            total_assets_eoy: None,
            fair_market_value_eoy: None,
            total_revenue: None,
            total_expenses: None,
            total_distributions: None,
            investment_income: None,
            is_501c3: None,
            is_private_operating_foundation: None,
            mission_description: None,
        }
    }

    pub fn period(mut self, tax_period_end: impl Into<String>) -> Self {
        self.tax_period_end = Some(tax_period_end.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.organization_name.as_deref().and_then(non_empty)
    }

    /// Picks the most recent filing by `tax_period_end`. Snapshots without a
    /// period sort before any dated one; among equals the first wins.
    pub fn latest<'a, I>(snapshots: I) -> Option<&'a Foundation>
    where
        I: IntoIterator<Item = &'a Foundation>,
    {
        let mut latest: Option<&Foundation> = None;
        for snapshot in snapshots {
            let newer = match latest {
                None => true,
                Some(current) => {
                    snapshot.tax_period_end.as_deref() > current.tax_period_end.as_deref()
                }
            };
            if newer {
                latest = Some(snapshot);
            }
        }
        latest
    }
}

/// An officer, director or trustee listed on a foundation filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Officer {
    #[serde(alias = "ein")]
    pub foundation_ein: Ein,
    #[serde(default, alias = "name", deserialize_with = "lenient::text")]
    pub person_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub compensation: Option<u64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub benefits: Option<u64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub other_compensation: Option<u64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub hours_per_week: Option<f64>,
    #[serde(default, alias = "tax_period_end", deserialize_with = "lenient::text")]
    pub tax_period: Option<String>,
}

impl Officer {
    pub fn new(foundation_ein: Ein, person_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            foundation_ein,
            person_name: Some(person_name.into()),
            title: Some(title.into()),
            compensation: None,
            benefits: None,
            other_compensation: None,
            hours_per_week: None,
            tax_period: None,
        }
    }

    pub fn paid(mut self, compensation: u64) -> Self {
        self.compensation = Some(compensation);
        self
    }
}
