//! Cluster aggregates and the summaries that hold them.
//!
//! A cluster is created from its first record and mutated only through `absorb`.
//! Set-valued fields are kept as sets and linearized when serialized.

use crate::domain::similarity::char_set;
use crate::domain::{HashField, MessageRecord, Sender};
use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};
use std::collections::{BTreeSet, HashSet};

/// Exact-hash equivalence class of media records.
#[derive(Debug, Clone)]
pub struct HashCluster {
    pub field: HashField,
    pub hash_value: String,
    pub first_share: String,
    pub total: usize,
    pub groups_shared: BTreeSet<Option<String>>,
    pub users_shared: BTreeSet<Option<Sender>>,
    pub filenames: BTreeSet<Option<String>>,
    pub messages: Vec<MessageRecord>,
}

impl HashCluster {
    /// Open a cluster for `hash_value` seeded with its first record.
    pub fn open(field: HashField, hash_value: impl Into<String>, first: MessageRecord) -> Self {
        let mut cluster = Self {
            field,
            hash_value: hash_value.into(),
            first_share: first.data.clone(),
            total: 0,
            groups_shared: BTreeSet::new(),
            users_shared: BTreeSet::new(),
            filenames: BTreeSet::new(),
            messages: Vec::new(),
        };
        cluster.absorb(first);
        cluster
    }

    pub fn absorb(&mut self, record: MessageRecord) {
        if record.data < self.first_share {
            self.first_share = record.data.clone();
        }
        self.total += 1;
        self.groups_shared.insert(record.group_name.clone());
        self.users_shared.insert(record.sender.clone());
        self.filenames.insert(record.file.clone());
        self.messages.push(record);
    }

    pub fn total_groups(&self) -> usize {
        self.groups_shared.len()
    }

    pub fn total_users(&self) -> usize {
        self.users_shared.len()
    }
}

impl Serialize for HashCluster {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // The hash is echoed under the method's own name ("checksum" or "phash").
        let mut map = serializer.serialize_map(Some(9))?;
        map.serialize_entry(self.field.as_str(), &self.hash_value)?;
        map.serialize_entry("first_share", &self.first_share)?;
        map.serialize_entry("total", &self.total)?;
        map.serialize_entry("total_groups", &self.total_groups())?;
        map.serialize_entry("total_users", &self.total_users())?;
        map.serialize_entry("groups_shared", &self.groups_shared)?;
        map.serialize_entry("users_shared", &self.users_shared)?;
        map.serialize_entry("filenames", &self.filenames)?;
        map.serialize_entry("messages", &self.messages)?;
        map.end()
    }
}

/// Near-duplicate text cluster. Membership is always tested against `text`, the anchor.
#[derive(Debug, Clone)]
pub struct TextCluster {
    /// Output key: the anchor's message id, suffixed when that id was already taken.
    pub key: String,
    pub text: String,
    pub first_share: String,
    pub total: usize,
    pub groups_shared: BTreeSet<Option<String>>,
    pub users_shared: BTreeSet<Option<Sender>>,
    pub message_ids: Vec<i64>,
    pub messages: Vec<MessageRecord>,
    anchor_chars: HashSet<char>,
}

impl TextCluster {
    pub fn open(key: String, text: String, first: MessageRecord) -> Self {
        let mut cluster = Self {
            key,
            anchor_chars: char_set(&text),
            text,
            first_share: first.data.clone(),
            total: 0,
            groups_shared: BTreeSet::new(),
            users_shared: BTreeSet::new(),
            message_ids: Vec::new(),
            messages: Vec::new(),
        };
        cluster.absorb(first);
        cluster
    }

    /// Distinct characters of the anchor text, computed once at creation.
    pub fn anchor_chars(&self) -> &HashSet<char> {
        &self.anchor_chars
    }

    pub fn absorb(&mut self, record: MessageRecord) {
        if record.data < self.first_share {
            self.first_share = record.data.clone();
        }
        self.total += 1;
        self.groups_shared.insert(record.group_name.clone());
        self.users_shared.insert(record.sender.clone());
        self.message_ids.push(record.message_id);
        self.messages.push(record);
    }

    pub fn total_groups(&self) -> usize {
        self.groups_shared.len()
    }

    pub fn total_users(&self) -> usize {
        self.users_shared.len()
    }
}

impl Serialize for TextCluster {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let no_files: [Option<String>; 0] = [];
        let mut s = serializer.serialize_struct("TextCluster", 10)?;
        s.serialize_field("first_share", &self.first_share)?;
        s.serialize_field("total", &self.total)?;
        s.serialize_field("total_groups", &self.total_groups())?;
        s.serialize_field("total_users", &self.total_users())?;
        s.serialize_field("groups_shared", &self.groups_shared)?;
        s.serialize_field("users_shared", &self.users_shared)?;
        s.serialize_field("messages_IDs", &self.message_ids)?;
        s.serialize_field("filenames", &no_files)?;
        s.serialize_field("text", &self.text)?;
        s.serialize_field("messages", &self.messages)?;
        s.end()
    }
}

/// Hash clusters in first-seen order. Serializes as `{hash_value: cluster}`.
#[derive(Debug, Clone, Default)]
pub struct HashSummary {
    pub clusters: Vec<HashCluster>,
}

impl HashSummary {
    pub fn get(&self, hash_value: &str) -> Option<&HashCluster> {
        self.clusters.iter().find(|c| c.hash_value == hash_value)
    }
}

impl Serialize for HashSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.clusters.len()))?;
        for cluster in &self.clusters {
            map.serialize_entry(&cluster.hash_value, cluster)?;
        }
        map.end()
    }
}

/// Text clusters in creation order. Serializes as `{key: cluster}`.
#[derive(Debug, Clone, Default)]
pub struct TextSummary {
    pub clusters: Vec<TextCluster>,
}

impl TextSummary {
    pub fn get(&self, key: &str) -> Option<&TextCluster> {
        self.clusters.iter().find(|c| c.key == key)
    }
}

impl Serialize for TextSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.clusters.len()))?;
        for cluster in &self.clusters {
            map.serialize_entry(&cluster.key, cluster)?;
        }
        map.end()
    }
}

/// Result of one run, whichever pipeline produced it.
#[derive(Debug, Clone)]
pub enum Summary {
    Hashes(HashSummary),
    Texts(TextSummary),
}

impl Summary {
    pub fn cluster_count(&self) -> usize {
        match self {
            Summary::Hashes(h) => h.clusters.len(),
            Summary::Texts(t) => t.clusters.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cluster_count() == 0
    }

    /// One row of headline numbers per cluster, in output order.
    pub fn digest(&self) -> Vec<DigestRow> {
        match self {
            Summary::Hashes(h) => h
                .clusters
                .iter()
                .map(|c| DigestRow {
                    key: c.hash_value.clone(),
                    first_share: c.first_share.clone(),
                    total: c.total,
                    total_groups: c.total_groups(),
                    total_users: c.total_users(),
                })
                .collect(),
            Summary::Texts(t) => t
                .clusters
                .iter()
                .map(|c| DigestRow {
                    key: c.key.clone(),
                    first_share: c.first_share.clone(),
                    total: c.total,
                    total_groups: c.total_groups(),
                    total_users: c.total_users(),
                })
                .collect(),
        }
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Summary::Hashes(h) => h.serialize(serializer),
            Summary::Texts(t) => t.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRow {
    pub key: String,
    pub first_share: String,
    pub total: usize,
    pub total_groups: usize,
    pub total_users: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: i64, data: &str, group: &str, sender: i64) -> MessageRecord {
        serde_json::from_value(json!({
            "message_id": id,
            "group_name": group,
            "sender": sender,
            "data": data,
            "mediatype": "image",
            "file": format!("{id}.jpg"),
            "checksum": "abc123"
        }))
        .unwrap()
    }

    #[test]
    fn test_first_share_tracks_earliest() {
        let mut cluster = HashCluster::open(
            HashField::Checksum,
            "abc123",
            record(1, "2020-01-05 10:00:00", "A", 1),
        );
        cluster.absorb(record(2, "2020-01-03 09:00:00", "A", 1));
        cluster.absorb(record(3, "2020-01-04 09:00:00", "B", 2));

        assert_eq!(cluster.first_share, "2020-01-03 09:00:00");
        assert_eq!(cluster.total, 3);
        assert_eq!(cluster.total, cluster.messages.len());
        assert_eq!(cluster.total_groups(), 2);
        assert_eq!(cluster.total_users(), 2);
        assert_eq!(cluster.filenames.len(), 3);
    }

    #[test]
    fn test_hash_cluster_serializes_method_name() {
        let cluster = HashCluster::open(
            HashField::Checksum,
            "abc123",
            record(1, "2020-01-05 10:00:00", "A", 1),
        );
        let value = serde_json::to_value(&cluster).unwrap();
        assert_eq!(value["checksum"], "abc123");
        assert_eq!(value["total"], 1);
        assert_eq!(value["total_groups"], 1);
        assert_eq!(value["groups_shared"], json!(["A"]));
        assert_eq!(value["users_shared"], json!([1]));
        assert_eq!(value["filenames"], json!(["1.jpg"]));
        assert_eq!(value["messages"][0]["message_id"], 1);
    }

    #[test]
    fn test_text_cluster_shape() {
        let first = record(10, "2020-01-05 10:00:00", "A", 1);
        let mut cluster = TextCluster::open("10".to_string(), "hello world".to_string(), first);
        cluster.absorb(record(11, "2020-01-05 11:00:00", "B", 1));

        let value = serde_json::to_value(&cluster).unwrap();
        assert_eq!(value["messages_IDs"], json!([10, 11]));
        assert_eq!(value["text"], "hello world");
        assert_eq!(value["filenames"], json!([]));
        assert_eq!(value["total_users"], 1);
        assert_eq!(value["total_groups"], 2);
    }

    #[test]
    fn test_summary_keeps_insertion_order() {
        let summary = Summary::Hashes(HashSummary {
            clusters: vec![
                HashCluster::open(HashField::Checksum, "zzz", record(1, "2020-01-01 00:00:00", "A", 1)),
                HashCluster::open(HashField::Checksum, "aaa", record(2, "2020-01-01 00:00:00", "A", 1)),
            ],
        });
        let text = serde_json::to_string(&summary).unwrap();
        assert!(text.find("\"zzz\"").unwrap() < text.find("\"aaa\"").unwrap());

        let keys: Vec<String> = summary.digest().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["zzz", "aaa"]);
    }
}
