//! Merging several inputs into one output and splitting one input by page
//! ranges.
//!
//! When both sides are containers, page blobs are copied without decoding
//! so content is preserved bit for bit. Any other combination goes through
//! the full pipeline.

use std::path::{Path, PathBuf};

use super::context::ConversionContext;
use super::converter::Pipeline;
use super::sources::{open_source, PageSource};
use crate::error::{ConvertError, ValidationError};
use crate::format::xtc::{ContainerBuilder, ContainerLayout};
use crate::format::{detect_input, InputKind};
use crate::models::toc::current_timestamp;
use crate::models::{
    clip_chapters, parse_ranges, shift_chapters, Metadata, OutputFormat, PageRange, TocEntry,
};
use crate::rendering::Artifact;

fn input_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Detect every input and require a single kind.
fn common_kind(inputs: &[PathBuf]) -> Result<InputKind, ConvertError> {
    let (first, rest) = inputs.split_first().ok_or(ValidationError::NoInputs)?;
    let kind = detect_input(first)?;
    for input in rest {
        let other = detect_input(input)?;
        if other != kind {
            return Err(ValidationError::MixedInputTypes {
                first: format!("{} ({})", first.display(), kind),
                other: format!("{} ({})", input.display(), other),
            }
            .into());
        }
    }
    Ok(kind)
}

/// Merge inputs in order into one artifact.
///
/// `on_progress` is called once per finished input.
pub fn merge(
    ctx: &ConversionContext,
    inputs: &[PathBuf],
    format: OutputFormat,
    on_progress: &mut dyn FnMut(f32),
) -> Result<Artifact, ConvertError> {
    ctx.checkpoint()?;
    let kind = common_kind(inputs)?;
    tracing::info!(inputs = inputs.len(), %kind, %format, "Merging");

    if kind == InputKind::Container && format == OutputFormat::Xtc {
        let files = inputs
            .iter()
            .map(|p| -> Result<(String, Vec<u8>), ConvertError> {
                Ok((input_name(p), std::fs::read(p)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Artifact::Container(merge_containers(ctx, &files, on_progress)?));
    }

    let mut pipeline = Pipeline::new(ctx, format);
    let mut title = None;
    let mut author = None;
    let mut total = 0;

    for (i, input) in inputs.iter().enumerate() {
        let source = open_source(input)?;
        let count = source.page_count();
        let meta = source.metadata();
        if i == 0 {
            title = meta.title.clone().or_else(|| Some(source.name().to_string()));
            author = meta.author.clone();
        }
        let chapters = input_chapters(&meta.chapters, source.name(), count);
        pipeline.add_pages(source.as_ref(), 0..count, &chapters, &mut |_, _| {})?;
        total += count;
        on_progress((i + 1) as f32 / inputs.len() as f32);
    }

    if total == 0 {
        return Err(ValidationError::NoPages("merge inputs".to_string()).into());
    }
    pipeline.finish(title, author)
}

/// Chapters of one merge input, clipped to its own `count` pages.
///
/// An input without chapters becomes one chapter named after it.
fn input_chapters(chapters: &[TocEntry], name: &str, count: usize) -> Vec<TocEntry> {
    let clipped = clip_chapters(chapters, PageRange::new(1, count));
    if clipped.is_empty() && count > 0 {
        vec![TocEntry::new(name, 1, count)]
    } else {
        clipped
    }
}

/// Concatenate containers without decoding their pages.
///
/// `files` are `(name, bytes)` pairs. Every container is parsed before any
/// output is assembled.
pub fn merge_containers(
    ctx: &ConversionContext,
    files: &[(String, Vec<u8>)],
    on_progress: &mut dyn FnMut(f32),
) -> Result<Vec<u8>, ConvertError> {
    if files.is_empty() {
        return Err(ValidationError::NoInputs.into());
    }
    let layouts = files
        .iter()
        .map(|(_, bytes)| ContainerLayout::parse(bytes))
        .collect::<Result<Vec<_>, _>>()?;
    if layouts.iter().all(|l| l.page_count() == 0) {
        return Err(ValidationError::NoPages("merge inputs".to_string()).into());
    }

    let mut builder = ContainerBuilder::new();
    let mut toc = Vec::new();

    for (i, ((name, bytes), layout)) in files.iter().zip(&layouts).enumerate() {
        let offset = builder.page_count();
        for page in 0..layout.page_count() {
            ctx.checkpoint()?;
            let raw = layout.raw_page(bytes, page)?;
            builder.push_raw(raw.blob.to_vec(), raw.width, raw.height);
        }
        toc.extend(shift_chapters(
            &input_chapters(layout.toc(), name, layout.page_count()),
            offset,
        ));
        tracing::debug!(input = %name, pages = layout.page_count(), "Copied container pages");
        on_progress((i + 1) as f32 / files.len() as f32);
    }

    let first = layouts[0].metadata.as_ref();
    let config = ctx.config();
    let metadata = Metadata {
        title: config
            .title
            .clone()
            .or_else(|| first.and_then(|m| m.title.clone()))
            .or_else(|| Some(files[0].0.clone())),
        author: config
            .author
            .clone()
            .or_else(|| first.and_then(|m| m.author.clone())),
        timestamp: current_timestamp(),
        toc,
    };
    Ok(builder.finish(Some(&metadata))?)
}

/// Split one input into an artifact per page range.
///
/// `ranges` uses the `"1-3,7,9-12"` syntax and is validated against the
/// input's page count before any page is processed. `on_progress` is called
/// once per finished range.
pub fn split(
    ctx: &ConversionContext,
    input: &Path,
    ranges: &str,
    format: OutputFormat,
    on_progress: &mut dyn FnMut(f32),
) -> Result<Vec<Artifact>, ConvertError> {
    ctx.checkpoint()?;
    let kind = detect_input(input)?;
    tracing::info!(input = %input.display(), %kind, ranges, %format, "Splitting");

    if kind == InputKind::Container && format == OutputFormat::Xtc {
        let bytes = std::fs::read(input)?;
        let outputs = split_container(ctx, &bytes, ranges, on_progress)?;
        return Ok(outputs.into_iter().map(Artifact::Container).collect());
    }

    let source = open_source(input)?;
    split_source(ctx, source.as_ref(), ranges, format, on_progress)
}

/// Slice a container's pages per range without decoding them.
pub fn split_container(
    ctx: &ConversionContext,
    bytes: &[u8],
    ranges: &str,
    on_progress: &mut dyn FnMut(f32),
) -> Result<Vec<Vec<u8>>, ConvertError> {
    let layout = ContainerLayout::parse(bytes)?;
    let ranges = parse_ranges(ranges, layout.page_count())?;
    let source_meta = layout.metadata.as_ref();

    let mut outputs = Vec::with_capacity(ranges.len());
    for (i, range) in ranges.iter().enumerate() {
        let mut builder = ContainerBuilder::new();
        for page in range.indices() {
            ctx.checkpoint()?;
            let raw = layout.raw_page(bytes, page)?;
            builder.push_raw(raw.blob.to_vec(), raw.width, raw.height);
        }

        let config = ctx.config();
        let metadata = Metadata {
            title: config
                .title
                .clone()
                .or_else(|| source_meta.and_then(|m| m.title.clone())),
            author: config
                .author
                .clone()
                .or_else(|| source_meta.and_then(|m| m.author.clone())),
            timestamp: current_timestamp(),
            toc: clip_chapters(layout.toc(), *range),
        };
        outputs.push(builder.finish(Some(&metadata))?);
        tracing::debug!(%range, "Split range");
        on_progress((i + 1) as f32 / ranges.len() as f32);
    }
    Ok(outputs)
}

/// Run each range of `source` through the full pipeline.
///
/// Only the pages a range needs are loaded.
pub fn split_source(
    ctx: &ConversionContext,
    source: &dyn PageSource,
    ranges: &str,
    format: OutputFormat,
    on_progress: &mut dyn FnMut(f32),
) -> Result<Vec<Artifact>, ConvertError> {
    let ranges = parse_ranges(ranges, source.page_count())?;
    let meta = source.metadata();

    let mut outputs = Vec::with_capacity(ranges.len());
    for (i, range) in ranges.iter().enumerate() {
        let mut pipeline = Pipeline::new(ctx, format);
        let chapters = clip_chapters(&meta.chapters, *range);
        pipeline.add_pages(source, range.indices(), &chapters, &mut |_, _| {})?;
        outputs.push(pipeline.finish(meta.title.clone(), meta.author.clone())?);
        on_progress((i + 1) as f32 / ranges.len() as f32);
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::xtc::decode_container;
    use crate::models::ConvertConfig;
    use crate::services::sources::DocumentSource;
    use eink_dither::{MonoBitmap, RasterImage};
    use pretty_assertions::assert_eq;

    fn ctx() -> ConversionContext {
        ConversionContext::open(ConvertConfig::default()).unwrap()
    }

    fn container(pages: &[u8], metadata: Option<&Metadata>) -> Vec<u8> {
        let mut builder = ContainerBuilder::new();
        for &fill in pages {
            builder
                .push_bitmap(&MonoBitmap::from_packed(16, 2, vec![fill; 4]).unwrap())
                .unwrap();
        }
        builder.finish(metadata).unwrap()
    }

    #[test]
    fn test_merge_containers_copies_blobs() {
        let a = container(&[0x0F], None);
        let b = container(&[0xF0, 0xAA], None);
        let merged = merge_containers(
            &ctx(),
            &[("a".to_string(), a.clone()), ("b".to_string(), b.clone())],
            &mut |_| {},
        )
        .unwrap();

        let merged = decode_container(&merged).unwrap();
        let a = decode_container(&a).unwrap();
        let b = decode_container(&b).unwrap();
        assert_eq!(merged.pages.len(), 3);
        assert_eq!(merged.pages[0].blob, a.pages[0].blob);
        assert_eq!(merged.pages[1].blob, b.pages[0].blob);
        assert_eq!(merged.pages[2].blob, b.pages[1].blob);

        let meta = merged.metadata().unwrap();
        assert_eq!(meta.title.as_deref(), Some("a"));
        assert_eq!(
            meta.toc,
            vec![TocEntry::new("a", 1, 1), TocEntry::new("b", 2, 3)]
        );
    }

    #[test]
    fn test_merge_shifts_existing_toc() {
        let meta = Metadata {
            title: Some("Vol 1".to_string()),
            author: Some("Someone".to_string()),
            toc: vec![TocEntry::new("One", 1, 1), TocEntry::new("Two", 2, 2)],
            ..Default::default()
        };
        let a = container(&[1, 2], None);
        let b = container(&[3, 4], Some(&meta));
        let merged = merge_containers(
            &ctx(),
            &[("first".to_string(), a), ("second".to_string(), b)],
            &mut |_| {},
        )
        .unwrap();

        let merged = decode_container(&merged).unwrap();
        let meta = merged.metadata().unwrap();
        assert_eq!(meta.title.as_deref(), Some("first"));
        assert_eq!(meta.author, None);
        assert_eq!(
            meta.toc,
            vec![
                TocEntry::new("first", 1, 2),
                TocEntry::new("One", 3, 3),
                TocEntry::new("Two", 4, 4),
            ]
        );
    }

    #[test]
    fn test_merge_clips_toc_to_each_input() {
        let meta = Metadata {
            toc: vec![TocEntry::new("X", 1, 50), TocEntry::new("Gone", 60, 70)],
            ..Default::default()
        };
        let a = container(&[1, 2], Some(&meta));
        let b = container(&[3], None);
        let merged = merge_containers(
            &ctx(),
            &[("a".to_string(), a), ("b".to_string(), b)],
            &mut |_| {},
        )
        .unwrap();

        let merged = decode_container(&merged).unwrap();
        assert_eq!(merged.pages.len(), 3);
        assert_eq!(
            merged.metadata().unwrap().toc,
            vec![TocEntry::new("X", 1, 2), TocEntry::new("b", 3, 3)]
        );
    }

    #[test]
    fn test_merge_rejects_bad_container() {
        let good = container(&[1], None);
        let result = merge_containers(
            &ctx(),
            &[("good".to_string(), good), ("bad".to_string(), b"XTC\0".to_vec())],
            &mut |_| {},
        );
        assert!(matches!(result, Err(ConvertError::Format(_))));
    }

    #[test]
    fn test_split_container_slices() {
        let source = container(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9], None);
        let mut progress = Vec::new();
        let outputs = split_container(&ctx(), &source, "1-3,4-10", &mut |f| progress.push(f)).unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(progress, vec![0.5, 1.0]);
        let source = decode_container(&source).unwrap();
        let first = decode_container(&outputs[0]).unwrap();
        let second = decode_container(&outputs[1]).unwrap();
        assert_eq!(first.pages.len(), 3);
        assert_eq!(second.pages.len(), 7);
        for (i, page) in first.pages.iter().chain(&second.pages).enumerate() {
            assert_eq!(page.blob, source.pages[i].blob);
        }
    }

    #[test]
    fn test_split_overlapping_ranges_clip_toc() {
        let meta = Metadata {
            title: Some("Book".to_string()),
            toc: vec![TocEntry::new("A", 1, 4), TocEntry::new("B", 5, 6)],
            ..Default::default()
        };
        let source = container(&[0, 1, 2, 3, 4, 5], Some(&meta));
        let outputs = split_container(&ctx(), &source, "3-5,1-6", &mut |_| {}).unwrap();

        let first = decode_container(&outputs[0]).unwrap();
        assert_eq!(first.pages.len(), 3);
        assert_eq!(first.metadata().unwrap().title.as_deref(), Some("Book"));
        assert_eq!(
            first.metadata().unwrap().toc,
            vec![TocEntry::new("A", 1, 2), TocEntry::new("B", 3, 3)]
        );
        let second = decode_container(&outputs[1]).unwrap();
        assert_eq!(second.pages.len(), 6);
        assert_eq!(second.metadata().unwrap().toc, meta.toc);
    }

    #[test]
    fn test_split_invalid_ranges() {
        let source = container(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9], None);
        for ranges in ["5-2", "0-3", "9-11", "x"] {
            let mut called = false;
            let result = split_container(&ctx(), &source, ranges, &mut |_| called = true);
            assert!(
                matches!(result, Err(ConvertError::Validation(_))),
                "{ranges} should be rejected"
            );
            assert!(!called);
        }
    }

    #[test]
    fn test_split_source_through_pipeline() {
        let pages = vec![RasterImage::filled_rgba(30, 50, [0, 0, 0, 255]); 5];
        let source = DocumentSource::new("doc", pages);
        let outputs = split_source(&ctx(), &source, "2-3,5", OutputFormat::Xtc, &mut |_| {}).unwrap();

        let counts: Vec<_> = outputs
            .iter()
            .map(|a| decode_container(a.as_container().unwrap()).unwrap().pages.len())
            .collect();
        assert_eq!(counts, vec![2, 1]);
    }

    #[test]
    fn test_common_kind() {
        let dir = tempfile::tempdir().unwrap();
        let c = dir.path().join("a.xtc");
        std::fs::write(&c, container(&[0], None)).unwrap();

        assert!(matches!(
            common_kind(&[]),
            Err(ConvertError::Validation(ValidationError::NoInputs))
        ));
        assert_eq!(common_kind(&[c.clone(), c.clone()]).unwrap(), InputKind::Container);
        assert!(matches!(
            common_kind(&[c, dir.path().to_path_buf()]),
            Err(ConvertError::Validation(ValidationError::MixedInputTypes { .. }))
        ));
    }
}
