//! Exact-hash grouping of media records.

use crate::domain::clusters::{HashCluster, HashSummary};
use crate::domain::{DomainError, HashField, MediaKind, MessageRecord};
use std::collections::HashMap;

/// What happened to a record offered to a grouper or clusterer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// Opened a new cluster.
    Opened,
    /// Joined an existing cluster.
    Joined,
    Skipped(SkipReason),
}

impl Offer {
    pub fn is_absorbed(self) -> bool {
        !matches!(self, Offer::Skipped(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not the kind of record this pipeline looks at.
    Ineligible,
    /// Hash field absent or empty.
    MissingHash,
    /// Text absent or shorter than the configured minimum.
    TooShort,
}

/// Groups records of one media kind by the value of one hash field.
pub struct HashGrouper {
    kind: MediaKind,
    field: HashField,
    clusters: Vec<HashCluster>,
    index: HashMap<String, usize>,
}

impl HashGrouper {
    /// Fails when `field` is not populated for `kind` (phash exists for images only).
    pub fn new(kind: MediaKind, field: HashField) -> Result<Self, DomainError> {
        if !kind.supports(field) {
            return Err(DomainError::IncompatibleMethod {
                media_type: kind.to_string(),
                method: field.as_str().to_string(),
            });
        }
        Ok(Self {
            kind,
            field,
            clusters: Vec::new(),
            index: HashMap::new(),
        })
    }

    pub fn offer(&mut self, record: MessageRecord) -> Offer {
        if record.mediatype != Some(self.kind) {
            return Offer::Skipped(SkipReason::Ineligible);
        }
        let Some(hash) = self.field.value_of(&record) else {
            return Offer::Skipped(SkipReason::MissingHash);
        };

        if let Some(&i) = self.index.get(hash) {
            self.clusters[i].absorb(record);
            return Offer::Joined;
        }
        let hash = hash.to_string();
        self.index.insert(hash.clone(), self.clusters.len());
        self.clusters.push(HashCluster::open(self.field, hash, record));
        Offer::Opened
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn finish(self) -> HashSummary {
        HashSummary {
            clusters: self.clusters,
        }
    }
}

/// Group a whole sequence in one call.
pub fn group(
    records: impl IntoIterator<Item = MessageRecord>,
    kind: MediaKind,
    field: HashField,
) -> Result<HashSummary, DomainError> {
    let mut grouper = HashGrouper::new(kind, field)?;
    for record in records {
        grouper.offer(record);
    }
    Ok(grouper.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn media(id: i64, kind: &str, checksum: &str, group: &str) -> MessageRecord {
        let phash = if kind == "image" {
            json!(format!("p{checksum}"))
        } else {
            json!(null)
        };
        serde_json::from_value(json!({
            "message_id": id,
            "group_name": group,
            "sender": id * 10,
            "data": "2020-09-18 10:00:00",
            "mediatype": kind,
            "file": format!("{id}.bin"),
            "checksum": checksum,
            "phash": phash
        }))
        .unwrap()
    }

    #[test]
    fn test_groups_same_hash_together() {
        let records = vec![
            media(1, "image", "abc", "A"),
            media(2, "image", "def", "A"),
            media(3, "image", "abc", "B"),
        ];
        let summary = group(records, MediaKind::Image, HashField::Checksum).unwrap();

        assert_eq!(summary.clusters.len(), 2);
        let abc = summary.get("abc").unwrap();
        assert_eq!(abc.total, 2);
        let ids: Vec<i64> = abc.messages.iter().map(|m| m.message_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(abc.total_groups(), 2);
        assert_eq!(summary.clusters[0].hash_value, "abc");
        assert_eq!(summary.clusters[1].hash_value, "def");
    }

    #[test]
    fn test_ignores_other_kinds_and_empty_hashes() {
        let mut grouper = HashGrouper::new(MediaKind::Video, HashField::Checksum).unwrap();
        assert_eq!(
            grouper.offer(media(1, "image", "abc", "A")),
            Offer::Skipped(SkipReason::Ineligible)
        );
        assert_eq!(
            grouper.offer(media(2, "video", "", "A")),
            Offer::Skipped(SkipReason::MissingHash)
        );
        assert_eq!(grouper.offer(media(3, "video", "abc", "A")), Offer::Opened);
        assert_eq!(grouper.offer(media(4, "video", "abc", "B")), Offer::Joined);

        let summary = grouper.finish();
        assert_eq!(summary.clusters.len(), 1);
        assert!(summary.get("").is_none());
        assert_eq!(summary.clusters[0].total, 2);
    }

    #[test]
    fn test_text_records_are_ineligible() {
        let text: MessageRecord = serde_json::from_value(json!({
            "message_id": 9,
            "data": "2020-09-18 10:00:00",
            "mediatype": null,
            "content": "hello"
        }))
        .unwrap();
        let mut grouper = HashGrouper::new(MediaKind::Other, HashField::Checksum).unwrap();
        assert_eq!(grouper.offer(text), Offer::Skipped(SkipReason::Ineligible));
        assert!(grouper.is_empty());
    }

    #[test]
    fn test_groups_by_phash() {
        let records = vec![
            media(1, "image", "abc", "A"),
            media(2, "image", "abc", "A"),
        ];
        let summary = group(records, MediaKind::Image, HashField::Phash).unwrap();
        assert_eq!(summary.clusters.len(), 1);
        assert_eq!(summary.clusters[0].hash_value, "pabc");
    }

    #[test]
    fn test_rejects_phash_for_audio() {
        assert!(matches!(
            HashGrouper::new(MediaKind::Audio, HashField::Phash),
            Err(DomainError::IncompatibleMethod { .. })
        ));
    }
}
