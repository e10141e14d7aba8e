//! Descriptive attributes stored beside the solvables.
//!
//! Attributes are keyed by the repository-relative index of a solvable (the
//! "entry") and by an [`AttrKey`]. Producers write through the narrow
//! [`AttributeSink`] interface; [`AttrStore`] is the in-memory implementation.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Well-known attribute keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrKey {
    Authors,
    Description,
    DownloadSize,
    Eula,
    Group,
    InstallSize,
    Keywords,
    License,
    MessageDel,
    MessageIns,
    MediaDir,
    MediaFile,
    MediaNr,
    NoSource,
    Source,
    SourceId,
    Summary,
    Time,
}

impl AttrKey {
    pub fn as_str(self) -> &'static str {
        match self {
            AttrKey::Authors => "authors",
            AttrKey::Description => "description",
            AttrKey::DownloadSize => "downloadsize",
            AttrKey::Eula => "eula",
            AttrKey::Group => "group",
            AttrKey::InstallSize => "installsize",
            AttrKey::Keywords => "keywords",
            AttrKey::License => "license",
            AttrKey::MessageDel => "messagedel",
            AttrKey::MessageIns => "messageins",
            AttrKey::MediaDir => "mediadir",
            AttrKey::MediaFile => "mediafile",
            AttrKey::MediaNr => "medianr",
            AttrKey::NoSource => "nosource",
            AttrKey::Source => "source",
            AttrKey::SourceId => "sourceid",
            AttrKey::Summary => "summary",
            AttrKey::Time => "time",
        }
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier into an attribute store's own string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalId(u32);

impl LocalId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// A stored attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum AttrValue {
    /// Presence marker without payload.
    Void,
    Int(u32),
    Str(String),
    /// Opaque bytes, including any terminator the producer chose to store.
    Blob(Vec<u8>),
    LocalIds(Vec<LocalId>),
    IntList(Vec<u32>),
}

/// Typed setters through which decoders emit attributes.
pub trait AttributeSink {
    /// Intern a string in the sink's local table.
    fn local_id(&mut self, text: &str) -> LocalId;

    /// Record that `key` is present without a value.
    fn set_void(&mut self, entry: usize, key: AttrKey);

    fn set_int(&mut self, entry: usize, key: AttrKey, value: u32);

    fn set_string(&mut self, entry: usize, key: AttrKey, value: &str);

    fn set_blob(&mut self, entry: usize, key: AttrKey, value: &[u8]);

    /// Append a local id to the list stored under `key`.
    fn add_local_id(&mut self, entry: usize, key: AttrKey, id: LocalId);

    /// Append an integer to the list stored under `key`.
    fn add_int(&mut self, entry: usize, key: AttrKey, value: u32);
}

/// In-memory attribute store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttrStore {
    strings: IndexSet<String>,
    entries: Vec<Vec<(AttrKey, AttrValue)>>,
}

impl AttrStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored for `key` on `entry`.
    pub fn get(&self, entry: usize, key: AttrKey) -> Option<&AttrValue> {
        self.entries
            .get(entry)?
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// All attributes of `entry` in insertion order.
    pub fn entry(&self, entry: usize) -> &[(AttrKey, AttrValue)] {
        self.entries.get(entry).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Text of a local id.
    pub fn local_str(&self, id: LocalId) -> Option<&str> {
        self.strings.get_index(id.0 as usize).map(String::as_str)
    }

    /// Texts of the local-id list stored under `key`.
    pub fn local_strs(&self, entry: usize, key: AttrKey) -> Vec<&str> {
        match self.get(entry, key) {
            Some(AttrValue::LocalIds(ids)) => {
                ids.iter().filter_map(|id| self.local_str(*id)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Number of entries with storage allocated.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Vec::is_empty)
    }

    fn put(&mut self, entry: usize, key: AttrKey, value: AttrValue) {
        let attrs = self.attrs_mut(entry);
        match attrs.iter().position(|(k, _)| *k == key) {
            Some(pos) => attrs[pos].1 = value,
            None => attrs.push((key, value)),
        }
    }

    fn attrs_mut(&mut self, entry: usize) -> &mut Vec<(AttrKey, AttrValue)> {
        if self.entries.len() <= entry {
            self.entries.resize_with(entry + 1, Vec::new);
        }
        &mut self.entries[entry]
    }
}

impl AttributeSink for AttrStore {
    fn local_id(&mut self, text: &str) -> LocalId {
        if let Some(idx) = self.strings.get_index_of(text) {
            return LocalId(idx as u32);
        }
        let (idx, _) = self.strings.insert_full(text.to_string());
        LocalId(idx as u32)
    }

    fn set_void(&mut self, entry: usize, key: AttrKey) {
        self.put(entry, key, AttrValue::Void);
    }

    fn set_int(&mut self, entry: usize, key: AttrKey, value: u32) {
        self.put(entry, key, AttrValue::Int(value));
    }

    fn set_string(&mut self, entry: usize, key: AttrKey, value: &str) {
        self.put(entry, key, AttrValue::Str(value.to_string()));
    }

    fn set_blob(&mut self, entry: usize, key: AttrKey, value: &[u8]) {
        self.put(entry, key, AttrValue::Blob(value.to_vec()));
    }

    fn add_local_id(&mut self, entry: usize, key: AttrKey, id: LocalId) {
        let attrs = self.attrs_mut(entry);
        match attrs.iter().position(|(k, _)| *k == key) {
            Some(pos) => match &mut attrs[pos].1 {
                AttrValue::LocalIds(ids) => ids.push(id),
                other => *other = AttrValue::LocalIds(vec![id]),
            },
            None => attrs.push((key, AttrValue::LocalIds(vec![id]))),
        }
    }

    fn add_int(&mut self, entry: usize, key: AttrKey, value: u32) {
        let attrs = self.attrs_mut(entry);
        match attrs.iter().position(|(k, _)| *k == key) {
            Some(pos) => match &mut attrs[pos].1 {
                AttrValue::IntList(values) => values.push(value),
                other => *other = AttrValue::IntList(vec![value]),
            },
            None => attrs.push((key, AttrValue::IntList(vec![value]))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_replace_previous_value() {
        let mut store = AttrStore::new();
        store.set_string(0, AttrKey::Summary, "first");
        store.set_string(0, AttrKey::Summary, "second");
        assert_eq!(
            store.get(0, AttrKey::Summary),
            Some(&AttrValue::Str("second".into()))
        );
        assert_eq!(store.entry(0).len(), 1);
    }

    #[test]
    fn list_setters_append() {
        let mut store = AttrStore::new();
        let a = store.local_id("System/Base");
        let b = store.local_id("Productivity");
        store.add_local_id(3, AttrKey::Group, a);
        store.add_local_id(3, AttrKey::Group, b);
        store.add_int(3, AttrKey::SourceId, 7);
        store.add_int(3, AttrKey::SourceId, 9);
        assert_eq!(store.local_strs(3, AttrKey::Group), vec!["System/Base", "Productivity"]);
        assert_eq!(store.get(3, AttrKey::SourceId), Some(&AttrValue::IntList(vec![7, 9])));
        assert_eq!(store.len(), 4);
        assert!(store.entry(0).is_empty());
    }

    #[test]
    fn local_ids_are_interned() {
        let mut store = AttrStore::new();
        let a = store.local_id("GPL-2.0");
        let b = store.local_id("GPL-2.0");
        assert_eq!(a, b);
        assert_eq!(store.local_str(a), Some("GPL-2.0"));
    }

    #[test]
    fn void_and_blob_values() {
        let mut store = AttrStore::new();
        assert!(store.is_empty());
        store.set_void(1, AttrKey::NoSource);
        store.set_blob(1, AttrKey::Description, b"text\0");
        assert_eq!(store.get(1, AttrKey::NoSource), Some(&AttrValue::Void));
        assert_eq!(
            store.get(1, AttrKey::Description),
            Some(&AttrValue::Blob(b"text\0".to_vec()))
        );
        assert!(store.get(1, AttrKey::Eula).is_none());
        assert!(store.get(5, AttrKey::Eula).is_none());
    }

    #[test]
    fn serializes_with_key_names() {
        let mut store = AttrStore::new();
        store.set_int(0, AttrKey::DownloadSize, 12);
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["entries"][0][0][0], "downloadsize");
        assert_eq!(json["entries"][0][0][1]["type"], "int");
        assert_eq!(json["entries"][0][0][1]["value"], 12);
    }
}
