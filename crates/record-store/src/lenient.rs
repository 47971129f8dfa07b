//! Forgiving decoders for optional record fields.
//!
//! Filing data arrives with numbers encoded as floats, quoted strings with
//! thousands separators, empty strings, or garbage. Optional fields degrade to
//! `None` instead of rejecting the whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn amount<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_signed).and_then(|v| u64::try_from(v).ok()))
}

pub(crate) fn signed<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_signed))
}

pub(crate) fn float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_float).filter(|v| v.is_finite()))
}

pub(crate) fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_flag))
}

/// Text fields; numbers are rendered without a fractional part (zip codes and
/// phone numbers often arrive as floats).
pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => non_empty(&s).map(str::to_string),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i.to_string()),
            (None, Some(f)) if f.is_finite() && f.fract() == 0.0 => Some(format!("{f:.0}")),
            (None, Some(f)) => Some(f.to_string()),
            _ => None,
        },
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

pub(crate) fn parse_signed(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_numeric_str(s).map(|f| f.trunc() as i64),
        _ => None,
    }
}

fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }
}

fn parse_numeric_str(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            log::debug!("Ignoring unparseable numeric field: {raw:?}");
            None
        }
    }
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            if s.is_empty() {
                None
            } else {
                Some(matches!(s.as_str(), "true" | "1" | "x" | "t"))
            }
        }
        _ => None,
    }
}

pub(crate) fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "amount")]
        amount: Option<u64>,
        #[serde(default, deserialize_with = "flag")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "text")]
        zip: Option<String>,
        #[serde(default, deserialize_with = "float")]
        hours: Option<f64>,
    }

    fn row(value: serde_json::Value) -> Row {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn amounts_accept_common_encodings() {
        assert_eq!(row(json!({"amount": 1200})).amount, Some(1200));
        assert_eq!(row(json!({"amount": 1200.0})).amount, Some(1200));
        assert_eq!(row(json!({"amount": "1,200"})).amount, Some(1200));
        assert_eq!(row(json!({"amount": "$ 1200.75"})).amount, Some(1200));
    }

    #[test]
    fn amounts_degrade_to_none() {
        assert_eq!(row(json!({"amount": ""})).amount, None);
        assert_eq!(row(json!({"amount": null})).amount, None);
        assert_eq!(row(json!({"amount": "n/a"})).amount, None);
        assert_eq!(row(json!({"amount": -5})).amount, None);
        assert_eq!(row(json!({})).amount, None);
    }

    #[test]
    fn flags_follow_filing_conventions() {
        assert_eq!(row(json!({"flag": "X"})).flag, Some(true));
        assert_eq!(row(json!({"flag": "t"})).flag, Some(true));
        assert_eq!(row(json!({"flag": "false"})).flag, Some(false));
        assert_eq!(row(json!({"flag": 0})).flag, Some(false));
        assert_eq!(row(json!({"flag": ""})).flag, None);
    }

    #[test]
    fn text_renders_float_codes_without_fraction() {
        assert_eq!(row(json!({"zip": 94105.0})).zip.as_deref(), Some("94105"));
        assert_eq!(row(json!({"zip": "  "})).zip, None);
        assert_eq!(row(json!({"hours": "2.5"})).hours, Some(2.5));
    }
}
