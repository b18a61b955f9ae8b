use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Monetary value in the smallest currency unit.
pub type Amount = i64;

/// Identifier wrapper for a student's dossier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for an entry of a fee schedule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeItemId(pub String);

impl FeeItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeeItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeeItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One due obligation of a student's fee schedule.
///
/// Schedules are processed in declaration order, so the position of an item
/// decides which obligation absorbs a surplus first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FeeItemRecord")]
pub struct FeeItem {
    pub id: FeeItemId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    pub amount: Amount,
    pub due_date: Option<NaiveDate>,
    pub due_date_extended: bool,
}

impl FeeItem {
    /// Registration fee, which carries no due date.
    pub fn registration(name: impl Into<String>, amount: Amount) -> Self {
        let name = name.into();
        Self {
            id: FeeItemId(name.clone()),
            name,
            original_name: None,
            amount: amount.max(0),
            due_date: None,
            due_date_extended: false,
        }
    }

    pub fn installment(name: impl Into<String>, amount: Amount, due_date: NaiveDate) -> Self {
        let name = name.into();
        Self {
            id: FeeItemId(name.clone()),
            name,
            original_name: None,
            amount: amount.max(0),
            due_date: Some(due_date),
            due_date_extended: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = FeeItemId(id.into());
        self
    }

    pub fn with_original_name(mut self, original_name: impl Into<String>) -> Self {
        self.original_name = Some(original_name.into());
        self
    }

    /// Flag the due date as administratively extended.
    pub fn extended(mut self) -> Self {
        self.due_date_extended = true;
        self
    }

    pub fn is_registration(&self) -> bool {
        let mentions = |label: &str| label.to_lowercase().contains("inscription");
        mentions(&self.name) || self.original_name.as_deref().is_some_and(mentions)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeeItemRecord {
    #[serde(default)]
    id: Option<FeeItemId>,
    name: String,
    #[serde(default)]
    original_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    amount: Amount,
    #[serde(default, deserialize_with = "lenient_date")]
    due_date: Option<NaiveDate>,
    #[serde(default)]
    due_date_extended: bool,
}

impl From<FeeItemRecord> for FeeItem {
    fn from(record: FeeItemRecord) -> Self {
        let id = record
            .id
            .filter(|id| !id.0.trim().is_empty())
            .unwrap_or_else(|| FeeItemId(record.name.clone()));
        Self {
            id,
            name: record.name,
            original_name: record.original_name.filter(|name| !name.trim().is_empty()),
            amount: record.amount.max(0),
            due_date: record.due_date,
            due_date_extended: record.due_date_extended,
        }
    }
}

/// Recorded transaction for a student. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Amount,
    /// Absent when the recorded date was empty or unreadable; allocation never
    /// depends on it.
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_item_id: Option<FeeItemId>,
}

impl Payment {
    pub fn new(amount: Amount, date: NaiveDate, reason: impl Into<String>) -> Self {
        Self {
            amount,
            date: Some(date),
            reason: reason.into(),
            fee_item_id: None,
        }
    }

    /// Link the payment to a fee item explicitly instead of through its reason.
    pub fn for_item(mut self, id: impl Into<String>) -> Self {
        self.fee_item_id = Some(FeeItemId(id.into()));
        self
    }

    /// Only strictly positive payments take part in sums.
    pub fn is_countable(&self) -> bool {
        self.amount > 0
    }
}

/// Parse a monetary cell such as `30000`, `30 000`, `30,000` or `29999.5`.
pub fn parse_amount(raw: &str) -> Option<Amount> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{202f}' && *c != '_')
        .collect();
    if compact.is_empty() {
        return None;
    }

    let normalized = match (compact.rfind(','), compact.contains('.')) {
        (Some(_), true) => compact.replace(',', ""),
        (Some(idx), false) => {
            let fraction = &compact[idx + 1..];
            if fraction.len() == 3 && fraction.chars().all(|c| c.is_ascii_digit()) {
                compact.replace(',', "")
            } else {
                compact.replace(',', ".")
            }
        }
        (None, _) => compact,
    };

    if let Ok(value) = normalized.parse::<Amount>() {
        return Some(value);
    }
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.round() as Amount)
}

/// Parse `YYYY-MM-DD`, `DD/MM/YYYY` or an RFC 3339 / naive timestamp.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(timestamp.date());
        }
    }
    Err(format!(
        "failed to parse '{raw}' as YYYY-MM-DD, DD/MM/YYYY or an ISO timestamp"
    ))
}

/// Best-effort numeric coercion: malformed values collapse to 0.
pub(crate) fn coerce_amount(value: &Value) -> Amount {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|value| value.is_finite())
                    .map(|value| value.round() as Amount)
            })
            .unwrap_or(0),
        Value::String(raw) => parse_amount(raw).unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn lenient_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_amount).unwrap_or(0))
}

pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = lenient_amount(deserializer)?;
    Ok(amount.clamp(0, u32::MAX as Amount) as u32)
}

pub(crate) fn lenient_rate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let rate = match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(raw)) => raw
            .trim()
            .trim_end_matches('%')
            .replace(',', ".")
            .parse::<f64>()
            .unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if rate.is_finite() { rate } else { 0.0 })
}

/// Optional date that degrades to `None` when empty or unreadable.
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| parse_date(&value).ok()))
}
