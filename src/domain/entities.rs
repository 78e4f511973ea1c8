//! Domain entities. Pure data structures for the core business.
//!
//! `MessageRecord` mirrors one line of a collector day file. Everything the collector
//! writes that the engine does not interpret is kept in `extra` so records round-trip.

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One collected message, as written by the collector (one JSON object per line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub message_id: i64,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub sender: Option<Sender>,
    /// `YYYY-MM-DD HH:MM:SS`. Compared as a string when tracking first shares.
    pub data: String,
    /// `None` marks a text-only record.
    #[serde(default)]
    pub mediatype: Option<MediaKind>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub phash: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageRecord {
    pub fn is_text(&self) -> bool {
        self.mediatype.is_none()
    }

    /// Length of `content` in characters. Absent content counts as zero.
    pub fn content_len(&self) -> usize {
        self.content.as_deref().map_or(0, |c| c.chars().count())
    }
}

/// Opaque author identifier. The collector writes numeric ids; string ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sender {
    Id(i64),
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Other,
}

impl MediaKind {
    /// Hash fields the collector populates for this kind. Only images carry a phash.
    pub fn supports(self, field: HashField) -> bool {
        match field {
            HashField::Checksum => true,
            HashField::Phash => self == MediaKind::Image,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
            MediaKind::Other => "other",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record field used as the exact-match key for media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashField {
    /// MD5 of the file bytes.
    Checksum,
    /// Perceptual hash, images only.
    Phash,
}

impl HashField {
    pub fn as_str(self) -> &'static str {
        match self {
            HashField::Checksum => "checksum",
            HashField::Phash => "phash",
        }
    }

    /// The record's value for this field; empty strings count as absent.
    pub fn value_of(self, record: &MessageRecord) -> Option<&str> {
        let value = match self {
            HashField::Checksum => record.checksum.as_deref(),
            HashField::Phash => record.phash.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Which pipeline a run uses: exact-hash grouping of one media kind, or text clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryTarget {
    Media { kind: MediaKind, field: HashField },
    Text,
}

impl SummaryTarget {
    /// Parse the `media_type` / `comparison_method` pair given by the operator.
    ///
    /// `media_type` is one of `images|audios|videos|others|texts`; `comparison_method`
    /// is `checksum|phash` for media and `jaccard` for texts.
    pub fn parse(media_type: &str, comparison_method: &str) -> Result<Self, DomainError> {
        let incompatible = || DomainError::IncompatibleMethod {
            media_type: media_type.to_string(),
            method: comparison_method.to_string(),
        };

        let kind = match media_type {
            "images" => MediaKind::Image,
            "audios" => MediaKind::Audio,
            "videos" => MediaKind::Video,
            "others" => MediaKind::Other,
            "texts" => {
                return match comparison_method {
                    "jaccard" => Ok(SummaryTarget::Text),
                    _ => Err(incompatible()),
                };
            }
            other => return Err(DomainError::UnsupportedMediaType(other.to_string())),
        };

        let field = match comparison_method {
            "checksum" => HashField::Checksum,
            "phash" => HashField::Phash,
            _ => return Err(incompatible()),
        };
        if !kind.supports(field) {
            return Err(incompatible());
        }
        Ok(SummaryTarget::Media { kind, field })
    }

    /// Singular record kind used in default output names (`image`, ..., `text`).
    pub fn record_kind(&self) -> &'static str {
        match self {
            SummaryTarget::Media { kind, .. } => kind.as_str(),
            SummaryTarget::Text => "text",
        }
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            SummaryTarget::Media { field, .. } => field.as_str(),
            SummaryTarget::Text => "jaccard",
        }
    }
}
