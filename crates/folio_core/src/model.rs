//! Core content and view models

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const FALLBACK_LANGUAGE: &str = "en";

/// Per-language title/teaser of a blog list entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemLocale {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    pub id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub read_time: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Legacy nesting some bundles still carry; the normalizer drains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItemData {
    #[serde(default)]
    pub post_meta: Option<PostMeta>,
}

/// One blog list entry. Clickability requires a resolved `post_meta.id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: i64,
    #[serde(default)]
    pub locales: BTreeMap<String, ItemLocale>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub post_meta: Option<PostMeta>,
    #[serde(default)]
    pub raw: Option<RawItemData>,
}

impl ContentItem {
    /// The post id this item links to, if any. Items without one render
    /// as plain cards and never navigate.
    pub fn resolved_post_id(&self) -> Option<&str> {
        if let Some(meta) = &self.post_meta {
            if !meta.id.trim().is_empty() {
                return Some(meta.id.as_str());
            }
        }
        if let Some(meta) = self.raw.as_ref().and_then(|raw| raw.post_meta.as_ref()) {
            if !meta.id.trim().is_empty() {
                return Some(meta.id.as_str());
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BundleLocale {
    #[serde(default)]
    pub description: Option<String>,
}

/// The wrapper a content bundle deserializes into. `items` is the ordered
/// display list; `raw_items` is the backing list keyed by item id, which may
/// carry post metadata the display list lacks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBundle {
    #[serde(default)]
    pub locales: BTreeMap<String, BundleLocale>,
    #[serde(default)]
    pub items: Vec<ContentItem>,
    #[serde(default)]
    pub raw_items: Vec<ContentItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostBody {
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A full article, fetched lazily when a post is selected and discarded on
/// the way back to the list. Never cached across selections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default)]
    pub title: BTreeMap<String, String>,
    #[serde(default)]
    pub description: BTreeMap<String, String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub read_time: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub content: BTreeMap<String, PostBody>,
}

impl Post {
    pub fn title_in(&self, language: &str) -> &str {
        localized(&self.title, language)
            .map(String::as_str)
            .unwrap_or("Untitled")
    }

    pub fn description_in(&self, language: &str) -> Option<&str> {
        localized(&self.description, language).map(String::as_str)
    }

    pub fn body_in(&self, language: &str) -> Option<&PostBody> {
        localized(&self.content, language)
    }

    /// Long human-readable form of `date`, e.g. "September 5, 2025".
    pub fn formatted_date(&self) -> Option<String> {
        let date = parse_post_date(self.date.as_deref()?)?;
        Some(format!(
            "{} {}, {}",
            date.format("%B"),
            date.day(),
            date.year()
        ))
    }
}

/// Looks up the active language, falling back to `en`.
pub fn localized<'a, T>(map: &'a BTreeMap<String, T>, language: &str) -> Option<&'a T> {
    map.get(language).or_else(|| map.get(FALLBACK_LANGUAGE))
}

pub fn parse_post_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// What the blog section currently shows. The mode = post iff a post id is
/// selected invariant holds by construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    List,
    Post(String),
}

impl ViewState {
    pub fn selected_id(&self) -> Option<&str> {
        match self {
            ViewState::List => None,
            ViewState::Post(id) => Some(id.as_str()),
        }
    }

    pub fn is_post(&self) -> bool {
        matches!(self, ViewState::Post(_))
    }
}
