//! Immutable identifier → item vocabularies.

use crate::error::{PortalError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single vocabulary entry, optionally carrying a nested vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryItem {
    /// Identifier, unique within its dictionary.
    pub id: String,
    /// Display value.
    pub value: String,
    /// Nested vocabulary for hierarchical terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<Dictionary>,
}

impl DictionaryItem {
    /// Create an item, validating identifier and value.
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let value = value.into();
        if id.trim().is_empty() {
            return Err(PortalError::invalid_identifier(id));
        }
        if value.trim().is_empty() {
            return Err(PortalError::invalid_name(id, value));
        }
        Ok(Self {
            id,
            value,
            sub: None,
        })
    }

    /// Attach a nested vocabulary.
    pub fn with_sub(mut self, sub: Dictionary) -> Self {
        self.sub = Some(sub);
        self
    }
}

/// An immutable mapping from identifier to [`DictionaryItem`].
///
/// Items keep their insertion order. A changed dictionary is a new instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    items: IndexMap<String, DictionaryItem>,
}

impl Dictionary {
    /// Build a dictionary from items. Fails on a duplicate identifier.
    pub fn make(items: impl IntoIterator<Item = DictionaryItem>) -> Result<Self> {
        let mut map = IndexMap::new();
        for item in items {
            if map.contains_key(&item.id) {
                return Err(PortalError::duplicate_identifier(item.id));
            }
            map.insert(item.id.clone(), item);
        }
        Ok(Self { items: map })
    }

    /// Build a dictionary whose identifiers and values are the given strings.
    pub fn from_strings<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        let items = values
            .iter()
            .map(|v| DictionaryItem::new(v.as_ref(), v.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::make(items)
    }

    /// Look up an item by identifier.
    pub fn get(&self, id: &str) -> Option<&DictionaryItem> {
        self.items.get(id)
    }

    /// Look up the display value for an identifier.
    pub fn value_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|item| item.value.as_str())
    }

    /// Items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &DictionaryItem> {
        self.items.values()
    }

    /// Identifiers in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Return a new dictionary with `item` added or replaced.
    pub fn with_item(&self, item: DictionaryItem) -> Self {
        let mut items = self.items.clone();
        items.insert(item.id.clone(), item);
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn get_returns_inserted_item() {
        let gnss = DictionaryItem::new("gnss", "GNSS Data and Products").unwrap();
        let seismo = DictionaryItem::new("seismology", "Seismology").unwrap();
        let dict = Dictionary::make([gnss.clone(), seismo]).unwrap();

        assert_eq!(dict.get("gnss"), Some(&gnss));
        assert_eq!(dict.value_of("seismology"), Some("Seismology"));
        assert_eq!(dict.get("volcanology"), None);
    }

    #[test]
    fn rejects_blank_and_duplicate_entries() {
        assert!(matches!(
            DictionaryItem::new("  ", "x"),
            Err(PortalError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            DictionaryItem::new("x", ""),
            Err(PortalError::InvalidName { .. })
        ));
        assert!(matches!(
            Dictionary::from_strings(&["a", "b", "a"]),
            Err(PortalError::DuplicateIdentifier { .. })
        ));
    }

    #[test]
    fn with_item_leaves_original_untouched() {
        let dict = Dictionary::from_strings(&["a", "b"]).unwrap();
        let changed = dict.with_item(DictionaryItem::new("c", "C").unwrap());

        assert_eq!(dict.len(), 2);
        assert_eq!(changed.ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn nested_vocabulary() {
        let sub = Dictionary::from_strings(&["GPS", "Galileo"]).unwrap();
        let item = DictionaryItem::new("constellation", "Constellation")
            .unwrap()
            .with_sub(sub);
        let dict = Dictionary::make([item]).unwrap();

        let nested = dict.get("constellation").and_then(|i| i.sub.as_ref()).unwrap();
        assert_eq!(nested.value_of("Galileo"), Some("Galileo"));
    }
}
