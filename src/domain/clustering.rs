//! Greedy near-duplicate clustering of message texts.
//!
//! Single pass, first-fit: each text joins the first cluster (in creation order) whose
//! anchor scores at least `threshold`, otherwise it anchors a new cluster. Anchors never
//! change, so results depend on input order. Cost is O(n·k) for k open clusters.

use crate::domain::clusters::{TextCluster, TextSummary};
use crate::domain::grouping::{Offer, SkipReason};
use crate::domain::similarity::{char_set, jaccard_sets};
use crate::domain::{DomainError, MessageRecord};
use std::collections::HashSet;

pub const DEFAULT_MIN_SIZE: usize = 200;
pub const DEFAULT_THRESHOLD: f64 = 0.75;

pub struct TextClusterer {
    min_size: usize,
    threshold: f64,
    include_captions: bool,
    clusters: Vec<TextCluster>,
    keys: HashSet<String>,
}

impl TextClusterer {
    /// `threshold` must lie in (0, 1].
    pub fn new(min_size: usize, threshold: f64) -> Result<Self, DomainError> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(DomainError::InvalidParameter(format!(
                "threshold must be in (0, 1], got {threshold}"
            )));
        }
        Ok(Self {
            min_size,
            threshold,
            include_captions: false,
            clusters: Vec::new(),
            keys: HashSet::new(),
        })
    }

    /// Also cluster the captions of media records.
    pub fn with_captions(mut self, include: bool) -> Self {
        self.include_captions = include;
        self
    }

    pub fn offer(&mut self, record: MessageRecord) -> Offer {
        if !record.is_text() && !self.include_captions {
            return Offer::Skipped(SkipReason::Ineligible);
        }
        let text = match record.content.as_deref() {
            Some(t) if record.content_len() >= self.min_size => t,
            _ => return Offer::Skipped(SkipReason::TooShort),
        };

        let chars = char_set(text);
        let threshold = self.threshold;
        if let Some(cluster) = self
            .clusters
            .iter_mut()
            .find(|c| jaccard_sets(&chars, c.anchor_chars()) >= threshold)
        {
            cluster.absorb(record);
            return Offer::Joined;
        }

        let text = text.to_string();
        let key = self.claim_key(record.message_id);
        self.clusters.push(TextCluster::open(key, text, record));
        Offer::Opened
    }

    /// Anchor ids are only unique within one collection run; a repeated id gets a suffix.
    fn claim_key(&mut self, message_id: i64) -> String {
        let mut key = message_id.to_string();
        let mut n = 2;
        while self.keys.contains(&key) {
            key = format!("{message_id}-{n}");
            n += 1;
        }
        self.keys.insert(key.clone());
        key
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn finish(self) -> TextSummary {
        TextSummary {
            clusters: self.clusters,
        }
    }
}

/// Cluster a whole sequence in one call (text-only records).
pub fn cluster(
    records: impl IntoIterator<Item = MessageRecord>,
    min_size: usize,
    threshold: f64,
) -> Result<TextSummary, DomainError> {
    let mut clusterer = TextClusterer::new(min_size, threshold)?;
    for record in records {
        clusterer.offer(record);
    }
    Ok(clusterer.finish())
}
