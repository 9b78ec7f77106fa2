//! Assertion helpers for tests.

use pretty_assertions::assert_eq;

use xtcpress::format::{decode_container, DecodedContainer};
use xtcpress::rendering::Artifact;

/// Container bytes of an artifact, failing the test otherwise
pub fn container_of(artifact: &Artifact) -> &[u8] {
    artifact
        .as_container()
        .unwrap_or_else(|| panic!("Expected container artifact, got {:?}", artifact))
}

/// Decode and check the page count
pub fn assert_page_count(bytes: &[u8], expected: usize) -> DecodedContainer<'_> {
    let decoded = decode_container(bytes).expect("container should decode");
    assert_eq!(
        decoded.pages.len(),
        expected,
        "Expected {} pages, got {}",
        expected,
        decoded.pages.len()
    );
    decoded
}

/// Every chapter range is non-empty and they tile `[1, total]` in order
pub fn assert_contiguous_toc(toc: &[xtcpress::models::TocEntry], total: usize) {
    assert!(!toc.is_empty(), "Expected a non-empty table of contents");
    assert_eq!(toc[0].start_page, 1, "First chapter should start at page 1");
    for pair in toc.windows(2) {
        assert_eq!(
            pair[1].start_page,
            pair[0].end_page + 1,
            "Chapters {:?} and {:?} leave a gap or overlap",
            pair[0],
            pair[1]
        );
    }
    for chapter in toc {
        assert!(chapter.start_page <= chapter.end_page, "Empty chapter {:?}", chapter);
    }
    assert_eq!(toc[toc.len() - 1].end_page, total, "Last chapter should end at {}", total);
}
