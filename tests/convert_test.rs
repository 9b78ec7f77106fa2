//! End-to-end conversion: sources through the pipeline into artifacts.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use xtcpress::error::ConvertError;
use xtcpress::models::{ConvertConfig, Orientation, OutputFormat, SplitMode, TocEntry};
use xtcpress::rendering::Artifact;
use xtcpress::services::{
    convert, convert_batch, convert_path, ArchiveSource, ConversionContext, PageMapping,
    PageSource,
};

fn landscape(split_mode: SplitMode) -> ConversionContext {
    ConversionContext::open(ConvertConfig {
        orientation: Orientation::Landscape,
        split_mode,
        ..small_config()
    })
    .unwrap()
}

#[test]
fn test_toc_remap_example() {
    let mut mapping = PageMapping::new();
    for page in 1..=12 {
        mapping.add_original_page(page, if page == 5 { 2 } else { 1 });
    }
    let toc = vec![
        TocEntry::new("Ch1", 1, 4),
        TocEntry::new("Ch2", 5, 9),
        TocEntry::new("Ch3", 10, 12),
    ];

    let remapped = mapping.remap_toc(&toc);
    assert_contiguous_toc(&remapped, 13);
    assert_eq!(remapped[1], TocEntry::new("Ch2", 5, 10));
}

#[test]
fn test_comic_folder_with_bookmarks() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("My Comic");
    write_page(&folder.join("page1.png"), 40, 100, 30);
    write_page(&folder.join("page2.png"), 100, 40, 200);
    write_page(&folder.join("page10.png"), 100, 40, 90);
    std::fs::write(
        folder.join("ComicInfo.xml"),
        r#"<?xml version="1.0"?>
<ComicInfo>
  <Title>My Comic</Title>
  <Writer>A. Writer</Writer>
  <Pages>
    <Page Image="0" Bookmark="Intro"/>
    <Page Image="1" Bookmark="Main"/>
  </Pages>
</ComicInfo>"#,
    )
    .unwrap();

    let ctx = landscape(SplitMode::Split);
    let artifact = convert_path(&ctx, &folder, OutputFormat::Xtc, &mut |_| {}).unwrap();
    let decoded = assert_page_count(container_of(&artifact), 4);

    let meta = decoded.metadata().unwrap();
    assert_eq!(meta.title.as_deref(), Some("My Comic"));
    assert_eq!(meta.author.as_deref(), Some("A. Writer"));
    assert_eq!(
        meta.toc,
        vec![TocEntry::new("Intro", 1, 2), TocEntry::new("Main", 3, 4)]
    );
    for page in &decoded.pages {
        assert_eq!((page.width as usize, page.height as usize), (TEST_WIDTH, TEST_HEIGHT));
    }
}

#[test]
fn test_natural_page_order() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("book");
    write_page(&folder.join("p10.png"), 30, 10, 0);
    write_page(&folder.join("p2.png"), 20, 10, 0);
    write_page(&folder.join("p1.png"), 10, 10, 0);

    let source = ArchiveSource::open_dir(&folder).unwrap();
    let widths: Vec<usize> = (0..source.page_count())
        .map(|i| match source.load_page(i).unwrap() {
            xtcpress::services::SourcePage::Raster(r) => r.width(),
            other => panic!("expected raster, got {:?}", other),
        })
        .collect();
    assert_eq!(widths, vec![10, 20, 30]);
}

#[test]
fn test_overlap_segments_named_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("strip.png");
    write_page(&image, 30, 200, 128);

    let ctx = landscape(SplitMode::Overlap);
    let artifact = convert_path(&ctx, &image, OutputFormat::Png, &mut |_| {}).unwrap();
    match artifact {
        Artifact::Pages(pages) => {
            assert!(pages.len() >= 3, "got {} segments", pages.len());
            for (i, page) in pages.iter().enumerate() {
                let letter = char::from(b'a' + i as u8);
                assert_eq!(page.name, format!("00001_3_{letter}.png"));
            }
        }
        other => panic!("expected pages, got {:?}", other),
    }
}

#[test]
fn test_batch_continues_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_image_folder(dir.path(), "good", 2, (16, 16));
    let missing = dir.path().join("missing.png");
    let corrupt = dir.path().join("corrupt.xtc");
    std::fs::write(&corrupt, b"XTC\0\x01\x00").unwrap();

    let ctx = small_context();
    let items = convert_batch(
        &ctx,
        &[missing.clone(), good.clone(), corrupt.clone()],
        OutputFormat::Xtc,
    );

    assert_eq!(items.len(), 3);
    assert!(items[0].outcome.is_err());
    assert!(items[2].outcome.is_err());
    let artifact = items[1].outcome.as_ref().unwrap();
    assert_page_count(container_of(artifact), 2);

    let out = dir.path().join("out/good.xtc");
    artifact.write_to(&out).unwrap();
    assert!(out.exists());
}

#[test]
fn test_closed_context_refuses_work() {
    let dir = tempfile::tempdir().unwrap();
    let folder = write_image_folder(dir.path(), "book", 1, (8, 8));

    let mut ctx = small_context();
    ctx.close();
    let result = convert_path(&ctx, &folder, OutputFormat::Xtc, &mut |_| {});
    assert!(matches!(result, Err(ConvertError::ContextClosed)));
}

#[test]
fn test_cancel_between_pages() {
    let dir = tempfile::tempdir().unwrap();
    let folder = write_image_folder(dir.path(), "book", 5, (8, 8));
    let source = ArchiveSource::open_dir(&folder).unwrap();

    let ctx = small_context();
    let handle = ctx.cancel_handle();
    let mut pages_done = 0;
    let result = convert(&ctx, &source, OutputFormat::Xtc, &mut |_| {
        pages_done += 1;
        handle.cancel();
    });

    assert!(matches!(result, Err(ConvertError::Cancelled)));
    assert_eq!(pages_done, 1);
}
