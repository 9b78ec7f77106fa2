//! Original page to output page bookkeeping.
//!
//! Segmentation may turn one source page into several output pages. The
//! mapping records that expansion so chapter lists expressed in source page
//! numbers can be rewritten for the output.

use std::collections::HashMap;

use crate::models::TocEntry;

/// One recorded source page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingEntry {
    pub original_page: usize,
    /// 1-indexed first output page
    pub output_start: usize,
    pub output_count: usize,
}

/// Ordered record of how source pages expanded.
#[derive(Debug, Clone, Default)]
pub struct PageMapping {
    entries: Vec<MappingEntry>,
    by_original: HashMap<usize, usize>,
    total: usize,
}

impl PageMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `original_page` produced `output_count` pages.
    pub fn add_original_page(&mut self, original_page: usize, output_count: usize) {
        let entry = MappingEntry {
            original_page,
            output_start: self.total + 1,
            output_count,
        };
        self.by_original
            .entry(original_page)
            .or_insert(self.entries.len());
        self.entries.push(entry);
        self.total += output_count;
    }

    /// First output page of `original_page`.
    ///
    /// Pages never recorded map to themselves.
    pub fn output_page_for(&self, original_page: usize) -> usize {
        self.by_original
            .get(&original_page)
            .map(|&i| self.entries[i].output_start)
            .unwrap_or(original_page)
    }

    pub fn total_output_pages(&self) -> usize {
        self.total
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Rewrite a chapter list from source pages to output pages.
    ///
    /// Chapters are ordered by start page. Each remapped chapter ends right
    /// before the next one starts and the last ends at the final output
    /// page, so the result is contiguous and gapless. Chapters left empty by
    /// the remap are dropped.
    pub fn remap_toc(&self, toc: &[TocEntry]) -> Vec<TocEntry> {
        let total = self.total;
        let mut ordered: Vec<&TocEntry> = toc.iter().collect();
        ordered.sort_by_key(|c| c.start_page);

        let mut out = Vec::with_capacity(ordered.len());
        for (i, chapter) in ordered.iter().enumerate() {
            let start = self.output_page_for(chapter.start_page).max(1);
            let end = match ordered.get(i + 1) {
                Some(next) => self.output_page_for(next.start_page).saturating_sub(1),
                None => total,
            }
            .min(total);
            if start <= end {
                out.push(TocEntry::new(chapter.title.clone(), start, end));
            }
        }
        out
    }
}
