//! Blog item normalization
//!
//! Content bundles grew several homes for a post id over time. This pass
//! runs once at load time and settles every item on `post_meta`, so
//! downstream code only ever reads the canonical shape.

use std::collections::BTreeMap;

use crate::model::{ContentBundle, ContentItem, PostMeta};

/// Returns a new list where every item that can resolve a post id carries it
/// in `post_meta`. Resolution order: the item's own `post_meta.id`, then the
/// bundle's backing list keyed by item id, then the legacy `raw` nesting.
/// Items that resolve nowhere pass through unchanged and stay non-clickable.
pub fn normalize_items(items: &[ContentItem], bundle: &ContentBundle) -> Vec<ContentItem> {
    let backing = backing_meta_by_id(bundle);
    items
        .iter()
        .map(|item| {
            if has_post_id(item.post_meta.as_ref()) {
                return item.clone();
            }
            if let Some(meta) = backing.get(&item.id) {
                return with_meta(item, (*meta).clone());
            }
            if let Some(meta) = item
                .raw
                .as_ref()
                .and_then(|raw| raw.post_meta.as_ref())
                .filter(|meta| !meta.id.trim().is_empty())
            {
                return with_meta(item, meta.clone());
            }
            item.clone()
        })
        .collect()
}

fn backing_meta_by_id(bundle: &ContentBundle) -> BTreeMap<i64, &PostMeta> {
    bundle
        .raw_items
        .iter()
        .filter_map(|item| {
            item.post_meta
                .as_ref()
                .filter(|meta| !meta.id.trim().is_empty())
                .map(|meta| (item.id, meta))
        })
        .collect()
}

fn with_meta(item: &ContentItem, meta: PostMeta) -> ContentItem {
    let mut enriched = item.clone();
    enriched.post_meta = Some(meta);
    enriched
}

fn has_post_id(meta: Option<&PostMeta>) -> bool {
    meta.is_some_and(|meta| !meta.id.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawItemData;

    fn item(id: i64) -> ContentItem {
        ContentItem {
            id,
            locales: BTreeMap::new(),
            img: None,
            post_meta: None,
            raw: None,
        }
    }

    fn meta(id: &str) -> PostMeta {
        PostMeta {
            id: id.to_string(),
            date: None,
            read_time: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn backing_list_fills_missing_meta() {
        let mut first = item(1);
        first.post_meta = Some(meta("a"));
        let second = item(2);

        let mut backing = item(2);
        backing.post_meta = Some(meta("b"));
        let bundle = ContentBundle {
            raw_items: vec![backing],
            ..ContentBundle::default()
        };

        let normalized = normalize_items(&[first.clone(), second], &bundle);
        assert_eq!(normalized[0], first);
        assert_eq!(normalized[1].resolved_post_id(), Some("b"));
    }

    #[test]
    fn own_meta_wins_over_backing_list() {
        let mut entry = item(1);
        entry.post_meta = Some(meta("own"));
        let mut backing = item(1);
        backing.post_meta = Some(meta("backing"));
        let bundle = ContentBundle {
            raw_items: vec![backing],
            ..ContentBundle::default()
        };

        let normalized = normalize_items(&[entry], &bundle);
        assert_eq!(normalized[0].resolved_post_id(), Some("own"));
    }

    #[test]
    fn legacy_raw_nesting_is_third_choice() {
        let mut entry = item(3);
        entry.raw = Some(RawItemData {
            post_meta: Some(meta("legacy")),
        });

        let normalized = normalize_items(&[entry], &ContentBundle::default());
        assert_eq!(normalized[0].post_meta.as_ref().map(|m| m.id.as_str()), Some("legacy"));
    }

    #[test]
    fn unresolved_items_pass_through_unchanged() {
        let entry = item(4);
        let normalized = normalize_items(&[entry.clone()], &ContentBundle::default());
        assert_eq!(normalized[0], entry);
        assert_eq!(normalized[0].resolved_post_id(), None);
    }

    #[test]
    fn input_is_not_mutated() {
        let entry = item(2);
        let mut backing = item(2);
        backing.post_meta = Some(meta("b"));
        let bundle = ContentBundle {
            raw_items: vec![backing],
            ..ContentBundle::default()
        };

        let items = vec![entry];
        let normalized = normalize_items(&items, &bundle);
        assert!(items[0].post_meta.is_none());
        assert_eq!(normalized[0].resolved_post_id(), Some("b"));
    }

    #[test]
    fn blank_backing_ids_are_skipped() {
        let entry = item(5);
        let mut backing = item(5);
        backing.post_meta = Some(meta(""));
        let bundle = ContentBundle {
            raw_items: vec![backing],
            ..ContentBundle::default()
        };

        let normalized = normalize_items(&[entry], &bundle);
        assert_eq!(normalized[0].resolved_post_id(), None);
    }
}
