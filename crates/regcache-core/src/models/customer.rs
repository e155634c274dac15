use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A customer as returned by the registry.
///
/// Only the fields used for expiration tracking are typed; everything else the
/// registry sends is kept verbatim in `extra` and written back to the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "id_cliente", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "razao_cliente", default, deserialize_with = "deserialize_name")]
    pub name: String,
    #[serde(rename = "data_cad_cliente", default, with = "remote_date")]
    pub registration_date: Option<NaiveDateTime>,
    #[serde(rename = "data_mod_cliente", default, with = "remote_date")]
    pub modification_date: Option<NaiveDateTime>,
    /// Manual exclusion marker. Absent and `false` both mean "not flagged".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomerRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            registration_date: None,
            modification_date: None,
            flag: None,
            extra: Map::new(),
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.flag == Some(true)
    }

    /// Modification date when present, registration date otherwise
    pub fn effective_date(&self) -> Option<NaiveDateTime> {
        self.modification_date.or(self.registration_date)
    }

    pub fn email(&self) -> Option<&str> {
        self.passthrough_str("email_cliente")
    }

    pub fn phone(&self) -> Option<&str> {
        self.passthrough_str("fone_cliente")
    }

    /// Company tax id (CNPJ)
    pub fn tax_id(&self) -> Option<&str> {
        self.passthrough_str("cnpj_cliente")
    }

    fn passthrough_str(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// The local mirror of the registry, keyed by customer id.
///
/// Serializes as a plain JSON object `{ "<id>": { ...record... } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerCache {
    records: BTreeMap<String, CustomerRecord>,
}

impl CustomerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&CustomerRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut CustomerRecord> {
        self.records.get_mut(id)
    }

    /// Insert a record under its own id, replacing any previous entry
    pub fn insert(&mut self, record: CustomerRecord) -> Option<CustomerRecord> {
        self.records.insert(record.id.clone(), record)
    }

    /// Merge fetched records over the cache. A fetched record fully replaces
    /// the cached one with the same id.
    pub fn merge(&mut self, fetched: BTreeMap<String, CustomerRecord>) {
        self.records.extend(fetched);
    }

    /// Iterate records in id order
    pub fn records(&self) -> impl Iterator<Item = &CustomerRecord> {
        self.records.values()
    }

    pub fn flagged(&self) -> impl Iterator<Item = &CustomerRecord> {
        self.records().filter(|r| r.is_flagged())
    }

    pub fn unflagged(&self) -> impl Iterator<Item = &CustomerRecord> {
        self.records().filter(|r| !r.is_flagged())
    }
}

impl FromIterator<CustomerRecord> for CustomerCache {
    fn from_iter<I: IntoIterator<Item = CustomerRecord>>(iter: I) -> Self {
        let mut cache = CustomerCache::new();
        for record in iter {
            cache.insert(record);
        }
        cache
    }
}

/// The registry sends ids as either strings or numbers
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(s) => Ok(s),
        RawId::Number(n) => Ok(n.to_string()),
    }
}

fn deserialize_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Registry dates arrive as `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` depending on
/// the field; both normalize to a single `NaiveDateTime` here.
mod remote_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::utils::{format_remote_datetime, parse_remote_datetime};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&format_remote_datetime(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_remote_datetime))
    }
}
