//! # Decorate
//!
//! Style and data maps attached to every component.
//!
//! Both maps are ordered (`BTreeMap`) so serialization is deterministic and a
//! serialize → deserialize → serialize round trip is byte-identical.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Free-form string-keyed values
pub type StoreData = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decorate {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    style: StoreData,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    data: StoreData,
}

impl Decorate {
    pub fn new(style: Option<StoreData>, data: Option<StoreData>) -> Self {
        Self {
            style: style.unwrap_or_default(),
            data: data.unwrap_or_default(),
        }
    }

    pub fn style(&self) -> &StoreData {
        &self.style
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }

    /// Independent copy of the style map
    pub fn copy_style(&self) -> StoreData {
        self.style.clone()
    }

    /// Independent copy of the data map
    pub fn copy_data(&self) -> StoreData {
        self.data.clone()
    }

    pub fn style_is_empty(&self) -> bool {
        self.style.is_empty()
    }

    pub fn data_is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.style_is_empty() && self.data_is_empty()
    }

    /// Structural equality, used to coalesce adjacent character runs
    pub fn is_same(&self, other: &Decorate) -> bool {
        self == other
    }

    /// Merge a patch into this decorate.
    ///
    /// Keys present in the patch replace existing values, a `null` value
    /// deletes the key and keys absent from the patch are left untouched.
    pub fn modify_decorate(&mut self, style: Option<&StoreData>, data: Option<&StoreData>) {
        if let Some(style) = style {
            merge(&mut self.style, style);
        }
        if let Some(data) = data {
            merge(&mut self.data, data);
        }
    }

    pub fn clear_style(&mut self) {
        self.style.clear();
    }

    pub fn clear_data(&mut self) {
        self.data.clear();
    }
}

fn merge(target: &mut StoreData, patch: &StoreData) {
    for (key, value) in patch {
        if value.is_null() {
            target.remove(key);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Build a `StoreData` from string pairs
pub fn store<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> StoreData
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_copy_style_is_independent() {
        let decorate = Decorate::new(Some(store([("fontWeight", "bold")])), None);

        let mut copy = decorate.copy_style();
        copy.insert("color".to_string(), json!("red"));
        copy.remove("fontWeight");

        assert_eq!(decorate.style().get("fontWeight"), Some(&json!("bold")));
        assert!(decorate.style().get("color").is_none());
    }

    #[test]
    fn test_modify_merges_instead_of_replacing() {
        let mut decorate = Decorate::new(
            Some(store([("fontWeight", "bold"), ("color", "red")])),
            None,
        );

        decorate.modify_decorate(Some(&store([("color", "blue")])), None);

        assert_eq!(decorate.style().get("fontWeight"), Some(&json!("bold")));
        assert_eq!(decorate.style().get("color"), Some(&json!("blue")));
    }

    #[test]
    fn test_null_value_removes_key() {
        let mut decorate = Decorate::new(None, Some(store([("link", "http://a")])));
        let mut patch = StoreData::new();
        patch.insert("link".to_string(), Value::Null);

        decorate.modify_decorate(None, Some(&patch));

        assert!(decorate.data_is_empty());
    }

    #[test]
    fn test_is_same_is_structural() {
        let a = Decorate::new(Some(store([("fontStyle", "italic")])), None);
        let b = Decorate::new(Some(store([("fontStyle", "italic")])), None);
        let c = Decorate::default();

        assert!(a.is_same(&b));
        assert!(!a.is_same(&c));
        assert!(c.is_empty());
    }
}
