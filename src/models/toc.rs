//! Container metadata: title, author and table of contents.
//!
//! Page numbers are 1-indexed and inclusive throughout.

use serde::{Deserialize, Serialize};

use super::PageRange;

/// One chapter of the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub title: String,
    pub start_page: usize,
    pub end_page: usize,
}

impl TocEntry {
    pub fn new(title: impl Into<String>, start_page: usize, end_page: usize) -> Self {
        Self {
            title: title.into(),
            start_page,
            end_page,
        }
    }
}

/// A bookmark pointing at a single page.
///
/// Produced by sidecar metadata and document outlines; turned into
/// [`TocEntry`] ranges by [`chapters_from_markers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterMarker {
    pub title: String,
    pub page: usize,
}

impl ChapterMarker {
    pub fn new(title: impl Into<String>, page: usize) -> Self {
        Self {
            title: title.into(),
            page,
        }
    }
}

/// Optional container metadata block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Seconds since the Unix epoch, stored in the TOC header
    pub timestamp: u32,
    pub toc: Vec<TocEntry>,
}

impl Metadata {
    /// True when nothing would be written to a metadata block
    pub fn is_empty(&self) -> bool {
        self.title.as_deref().map_or(true, str::is_empty)
            && self.author.as_deref().map_or(true, str::is_empty)
            && self.toc.is_empty()
    }
}

/// Current time as a 32-bit Unix timestamp (saturating)
pub fn current_timestamp() -> u32 {
    u32::try_from(chrono::Utc::now().timestamp().max(0)).unwrap_or(u32::MAX)
}

/// Turn page bookmarks into contiguous chapter ranges.
///
/// Markers are ordered by page; each chapter ends one page before the next
/// marker, the last one at `total_pages`. Markers outside `1..=total_pages`
/// are dropped.
pub fn chapters_from_markers(markers: &[ChapterMarker], total_pages: usize) -> Vec<TocEntry> {
    let mut sorted: Vec<&ChapterMarker> = markers
        .iter()
        .filter(|m| m.page >= 1 && m.page <= total_pages)
        .collect();
    sorted.sort_by_key(|m| m.page);

    let mut chapters = Vec::with_capacity(sorted.len());
    for (i, marker) in sorted.iter().enumerate() {
        let end = match sorted.get(i + 1) {
            Some(next) => next.page.saturating_sub(1),
            None => total_pages,
        };
        if end >= marker.page {
            chapters.push(TocEntry::new(marker.title.clone(), marker.page, end));
        }
    }
    chapters
}

/// Shift every chapter by `offset` pages.
pub fn shift_chapters(toc: &[TocEntry], offset: usize) -> Vec<TocEntry> {
    toc.iter()
        .map(|c| TocEntry::new(c.title.clone(), c.start_page + offset, c.end_page + offset))
        .collect()
}

/// Clip chapters to `range` and renumber them so the range starts at page 1.
///
/// Chapters that do not intersect the range are dropped.
pub fn clip_chapters(toc: &[TocEntry], range: PageRange) -> Vec<TocEntry> {
    toc.iter()
        .filter(|c| c.start_page <= range.end && c.end_page >= range.start)
        .map(|c| {
            let start = c.start_page.max(range.start) - range.start + 1;
            let end = c.end_page.min(range.end) - range.start + 1;
            TocEntry::new(c.title.clone(), start, end)
        })
        .collect()
}
