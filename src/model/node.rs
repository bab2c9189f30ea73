/// Website node definitions
///
/// A `WebsiteNode` is one `<url>` or `<sitemap>` entry discovered while walking
/// a sitemap hierarchy, together with the provenance of the crawl that found it.
use crate::model::timestamp::parse_last_modified;
use crate::url::network_location;
use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flattened fields of a sitemap entry, in document order
pub type FieldMap = IndexMap<String, FieldValue>;

/// A single flattened field: leaf text or a nested group of fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Map(FieldMap),
}

impl FieldValue {
    /// Returns the text of a leaf field
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Map(_) => None,
        }
    }
}

/// Discriminates leaf page entries from nested sitemap entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    /// A `<url>` entry of a URL set
    #[serde(rename = "URL")]
    Url,

    /// A `<sitemap>` entry of a sitemap index
    #[serde(rename = "SITEMAP")]
    Sitemap,
}

impl NodeKind {
    /// Classifies a namespace-stripped tag name
    ///
    /// Tags ending in `url` are URL entries, tags ending in `sitemap` are
    /// sitemap entries; anything else is unknown.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.ends_with("url") {
            Some(Self::Url)
        } else if tag.ends_with("sitemap") {
            Some(Self::Sitemap)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "URL",
            Self::Sitemap => "SITEMAP",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a crawl was started by hand or by a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessedByType {
    #[default]
    Manual,
    Scheduled,
}

impl ProcessedByType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for ProcessedByType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Crawl provenance attached to every emitted node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMeta {
    /// Identifier shared by all nodes of one crawl run
    pub processed_by: String,

    /// Start of the crawl run
    pub processed_at: DateTime<Utc>,

    /// Manual or scheduled run
    pub processed_by_type: ProcessedByType,

    /// When this particular node was created
    pub created_at: DateTime<Utc>,
}

/// One entry discovered while walking a sitemap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebsiteNode {
    /// Absolute URL of the entry itself
    #[serde(rename = "loc")]
    pub location: String,

    /// URL of the sitemap document that listed this entry
    #[serde(rename = "parent")]
    pub parent_location: String,

    /// Network location (`host[:port]`) of `location`
    pub domain: String,

    #[serde(rename = "element_type")]
    pub kind: NodeKind,

    #[serde(rename = "lastmod")]
    pub last_modified: Option<DateTime<FixedOffset>>,

    pub priority: Option<f64>,

    #[serde(rename = "changefreq")]
    pub change_frequency: Option<String>,

    /// Declared fields other than `loc`, `lastmod`, `priority` and `changefreq`
    #[serde(rename = "properties")]
    pub extra_properties: FieldMap,

    pub meta: NodeMeta,
}

impl WebsiteNode {
    /// Builds a node from the flattened fields of a sitemap entry
    ///
    /// The recognized fields are removed from `fields` and parsed; whatever
    /// remains becomes `extra_properties`. Unparsable `lastmod` and `priority`
    /// values are treated as absent.
    pub fn from_fields(
        location: String,
        parent_location: &str,
        kind: NodeKind,
        mut fields: FieldMap,
        meta: NodeMeta,
    ) -> Self {
        fields.shift_remove("loc");

        let last_modified = take_text(&mut fields, "lastmod").and_then(|raw| {
            let parsed = parse_last_modified(&raw);
            if parsed.is_none() {
                tracing::debug!("Ignoring unparsable lastmod '{}' for {}", raw, location);
            }
            parsed
        });

        let priority = take_text(&mut fields, "priority").and_then(|raw| {
            match raw.trim().parse::<f64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::debug!("Ignoring non-numeric priority '{}' for {}", raw, location);
                    None
                }
            }
        });

        let change_frequency = take_text(&mut fields, "changefreq").filter(|s| !s.is_empty());

        Self {
            domain: network_location(&location),
            location,
            parent_location: parent_location.to_string(),
            kind,
            last_modified,
            priority,
            change_frequency,
            extra_properties: fields,
            meta,
        }
    }

    pub fn is_sitemap(&self) -> bool {
        self.kind == NodeKind::Sitemap
    }
}

/// Removes `key` from `fields`, returning its text if it was a leaf
fn take_text(fields: &mut FieldMap, key: &str) -> Option<String> {
    match fields.shift_remove(key)? {
        FieldValue::Text(text) => Some(text),
        FieldValue::Map(_) => None,
    }
}
