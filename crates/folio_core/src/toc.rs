//! Table-of-contents outline and active-section tracking

use crate::model::Section;

/// Anchors whose top offset is within this many pixels of the viewport top
/// (or above it) count as scrolled past.
pub const ACTIVE_THRESHOLD_PX: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub id: String,
    pub title: String,
}

/// Measured anchor position of one rendered section, viewport-relative.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionOffset {
    pub id: String,
    pub top: f64,
}

/// Derives the navigable outline of a post body. Sections without an id get
/// a positional anchor so every entry stays clickable.
pub fn build_outline(sections: &[Section]) -> Vec<OutlineEntry> {
    sections
        .iter()
        .enumerate()
        .map(|(index, section)| OutlineEntry {
            id: section
                .id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("section-{index}")),
            title: section.title.clone(),
        })
        .collect()
}

/// The section currently in view: among all anchors at or above the
/// threshold, the last one in document order, that being the header the
/// reader most recently scrolled past. Stateless; callers re-run it per
/// scroll tick and once on mount.
pub fn active_section(offsets: &[SectionOffset], threshold: f64) -> Option<&str> {
    offsets
        .iter()
        .rev()
        .find(|offset| offset.top <= threshold)
        .map(|offset| offset.id.as_str())
}
