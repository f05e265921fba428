use serde::Serialize;
use std::collections::BTreeMap;

/// A single metadata attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    List(Vec<String>),
    Number(u64),
}

/// Attribute name to value, serialized with keys in sorted order
pub type MetadataRecord = BTreeMap<String, MetadataValue>;

/// Insert a text attribute, skipping blank values
pub fn insert_text(record: &mut MetadataRecord, key: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        record.insert(key.to_string(), MetadataValue::Text(value.to_string()));
    }
}

/// Insert a list attribute, dropping blank items; nothing is inserted if no
/// items remain
pub fn insert_list<I, S>(record: &mut MetadataRecord, key: &str, values: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<String> = values
        .into_iter()
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();

    if !items.is_empty() {
        record.insert(key.to_string(), MetadataValue::List(items));
    }
}
