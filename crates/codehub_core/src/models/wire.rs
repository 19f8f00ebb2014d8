//! Serde helpers for values the spreadsheet endpoint returns loosely typed.
//!
//! Cells come back as numbers or strings depending on how they were entered,
//! and empty cells come back as `""` rather than `null`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Text(value) => value,
            Self::Int(value) => value.to_string(),
            Self::Float(value) if value.fract() == 0.0 => format!("{}", value as i64),
            Self::Float(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
        }
    }
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Scalar::deserialize(deserializer)?.into_text())
}

pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value
        .map(Scalar::into_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty()))
}

pub(crate) fn text_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .unwrap_or_default())
}

pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Scalar>::deserialize(deserializer)? {
        None => 0,
        Some(Scalar::Int(value)) => value.max(0) as u64,
        Some(Scalar::Float(value)) if value.is_finite() && value > 0.0 => value as u64,
        Some(Scalar::Float(_)) | Some(Scalar::Bool(_)) => 0,
        Some(Scalar::Text(text)) => text.trim().parse::<f64>().map_or(0, |parsed| {
            if parsed.is_finite() && parsed > 0.0 {
                parsed as u64
            } else {
                0
            }
        }),
    };
    Ok(value)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagList {
    List(Vec<Scalar>),
    Joined(String),
}

pub(crate) fn tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Option::<TagList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(TagList::Joined(joined)) => crate::text::parse_tags(&joined),
        Some(TagList::List(items)) => items
            .into_iter()
            .map(Scalar::into_text)
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
    };
    Ok(tags)
}

/// Timestamp cells in any format the sheet produces; unreadable values decode
/// as `None` instead of failing the whole row.
pub(crate) fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(match value {
        Some(Scalar::Int(millis)) => Utc.timestamp_millis_opt(millis).single(),
        Some(Scalar::Float(millis)) if millis.is_finite() => {
            Utc.timestamp_millis_opt(millis as i64).single()
        }
        Some(Scalar::Text(raw)) => parse_timestamp(raw.trim()),
        _ => None,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}
