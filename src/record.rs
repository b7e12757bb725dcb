use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of a managed collection: a blog post, a photo, an application...
///
/// Field names come straight from spreadsheet headers, so lookups ignore
/// case, spaces, `_` and `-` ("Full Name", "fullName" and "full_name" are
/// the same field). Insertion order is preserved for CSV headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` for anything that is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        if let Some(v) = self.fields.get(name) {
            return Some(v);
        }
        let wanted = normalize_key(name);
        self.fields
            .iter()
            .find(|(k, _)| normalize_key(k) == wanted)
            .map(|(_, v)| v)
    }

    /// Scalar text of a field; empty strings and nulls count as missing.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(value_text)
            .filter(|s| !s.trim().is_empty())
    }

    /// Set a field, reusing the existing spelling of the key if there is one.
    pub fn set(&mut self, name: &str, value: Value) {
        let wanted = normalize_key(name);
        let existing = self
            .fields
            .keys()
            .find(|k| normalize_key(k) == wanted)
            .cloned();
        self.fields
            .insert(existing.unwrap_or_else(|| name.to_string()), value);
    }

    /// First parseable timestamp among `names`.
    pub fn timestamp(&self, names: &[&str]) -> Option<DateTime<Utc>> {
        names
            .iter()
            .filter_map(|n| self.get(n))
            .find_map(parse_timestamp)
    }

    /// Copy every field of `other` over this record.
    pub fn merge(&mut self, other: &Record) {
        for (k, v) in &other.fields {
            self.set(k, v.clone());
        }
    }
}

/// Lowercase alphanumerics only.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Render a value the way a spreadsheet cell would show it.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];

/// Accepts RFC 3339, common spreadsheet date formats, epoch milliseconds,
/// and document-store `{seconds, nanoseconds}` objects.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(obj) => {
            let secs = obj
                .get("seconds")
                .or_else(|| obj.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = obj
                .get("nanoseconds")
                .or_else(|| obj.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(secs, u32::try_from(nanos).ok()?).single()
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// Newest first. Records without a usable timestamp keep their relative
/// order and go last.
pub fn sort_newest_first(records: &mut [Record], timestamp_fields: &[&str]) {
    records.sort_by_cached_key(|r| {
        let ts = r.timestamp(timestamp_fields);
        (ts.is_none(), std::cmp::Reverse(ts))
    });
}
