use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::timestamp;

/// Value marking an amenity as missing from the room.
pub const MISSING_VALUE: &str = "no";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: String,
    pub room: String,
    pub date: NaiveDate,
    pub items: BTreeMap<String, String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Checklist {
    pub fn missing_items(&self) -> Vec<String> {
        missing_items(&self.items)
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewChecklist {
    pub room: String,
    pub date: NaiveDate,
    pub items: BTreeMap<String, String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<BTreeMap<String, String>>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Keys whose value is exactly `"no"`, in key order.
pub fn missing_items(items: &BTreeMap<String, String>) -> Vec<String> {
    items
        .iter()
        .filter(|(_, value)| value.as_str() == MISSING_VALUE)
        .map(|(key, _)| key.clone())
        .collect()
}

/// `extra_towels` -> `Extra Towels`.
pub fn humanize_key(key: &str) -> String {
    let mut result = String::with_capacity(key.len());
    let mut at_word_start = true;

    for ch in key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphanumeric() {
            if at_word_start {
                result.extend(ch.to_uppercase());
            } else {
                result.push(ch);
            }
            at_word_start = false;
        } else {
            result.push(ch);
            at_word_start = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn missing_items_lists_only_no_values() {
        let items = items(&[
            ("towels", "yes"),
            ("soap", "no"),
            ("minibar", "no"),
            ("remote", "NO"),
        ]);

        assert_eq!(missing_items(&items), vec!["minibar", "soap"]);
    }

    #[test]
    fn missing_items_is_empty_when_everything_present() {
        let items = items(&[("towels", "yes"), ("soap", "yes")]);
        assert!(missing_items(&items).is_empty());
    }

    #[test]
    fn humanize_key_replaces_underscores_and_capitalizes_words() {
        assert_eq!(humanize_key("extra_towels"), "Extra Towels");
        assert_eq!(humanize_key("tv_remote_2"), "Tv Remote 2");
        assert_eq!(humanize_key("soap"), "Soap");
    }
}
