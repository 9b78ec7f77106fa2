//! The conversion pipeline.
//!
//! Every source page goes through preprocess, segment and dither, one page
//! at a time, and the resulting device pages are handed to a [`PageSink`]
//! in reading order. Pages that are already XTG-encoded skip straight to
//! the sink.

use eink_dither::{MonoBitmap, RasterImage};
use std::ops::Range;
use std::path::{Path, PathBuf};

use super::context::ConversionContext;
use super::page_mapping::PageMapping;
use super::sources::{open_source, PageSource, SourcePage};
use crate::error::{ConvertError, ValidationError};
use crate::format::xtc::{ContainerBuilder, RawPage};
use crate::models::toc::current_timestamp;
use crate::models::{shift_chapters, Metadata, OutputFormat, TocEntry};
use crate::rendering::{sink_for, Artifact, PageSink, PageTag};

/// Deterministic name of an output page: `00012_2_a`
pub fn page_name(original_page: usize, tag: &PageTag) -> String {
    format!("{:05}_{}", original_page, tag.label())
}

/// Preprocess, segment and dither one raster into device pages.
pub fn render_page(ctx: &ConversionContext, raster: &RasterImage) -> Vec<(PageTag, MonoBitmap)> {
    let gray = ctx.ditherer().preprocess(raster);
    ctx.segmenter()
        .segment(&gray)
        .into_iter()
        .map(|segment| (segment.tag, ctx.ditherer().dither(segment.image)))
        .collect()
}

/// Single pass of pages into one sink, tracking the page mapping.
pub(crate) struct Pipeline<'a> {
    ctx: &'a ConversionContext,
    sink: Box<dyn PageSink>,
    mapping: PageMapping,
    chapters: Vec<TocEntry>,
    original_pages: usize,
}

impl<'a> Pipeline<'a> {
    pub(crate) fn new(ctx: &'a ConversionContext, format: OutputFormat) -> Self {
        Self {
            ctx,
            sink: sink_for(format),
            mapping: PageMapping::new(),
            chapters: Vec::new(),
            original_pages: 0,
        }
    }

    /// Run pages `indices` of `source`.
    ///
    /// `chapters` are numbered relative to the first page added here and
    /// are shifted to the pipeline's running page count.
    pub(crate) fn add_pages(
        &mut self,
        source: &dyn PageSource,
        indices: Range<usize>,
        chapters: &[TocEntry],
        on_page: &mut dyn FnMut(usize, usize),
    ) -> Result<(), ConvertError> {
        let offset = self.original_pages;
        let total = indices.len();
        for (done, index) in indices.enumerate() {
            self.ctx.checkpoint()?;
            let page = source.load_page(index)?;
            self.push_page(page)?;
            on_page(done + 1, total);
        }
        self.chapters.extend(shift_chapters(chapters, offset));
        Ok(())
    }

    fn push_page(&mut self, page: SourcePage) -> Result<(), ConvertError> {
        self.original_pages += 1;
        let original = self.original_pages;

        let produced = match page {
            SourcePage::Raster(raster) => {
                let rendered = render_page(self.ctx, &raster);
                drop(raster);
                for (tag, bitmap) in &rendered {
                    self.sink.push_bitmap(&page_name(original, tag), bitmap)?;
                }
                rendered.len()
            }
            SourcePage::Encoded {
                blob,
                width,
                height,
            } => {
                let page = RawPage {
                    blob: &blob,
                    width,
                    height,
                };
                self.sink
                    .push_encoded(&page_name(original, &PageTag::Spread), page)?;
                1
            }
        };

        self.mapping.add_original_page(original, produced);
        Ok(())
    }

    /// Remap chapters to output pages and produce the artifact.
    ///
    /// Title and author from the config take precedence over the ones given.
    pub(crate) fn finish(
        self,
        title: Option<String>,
        author: Option<String>,
    ) -> Result<Artifact, ConvertError> {
        let config = self.ctx.config();
        let metadata = Metadata {
            title: config.title.clone().or(title),
            author: config.author.clone().or(author),
            timestamp: current_timestamp(),
            toc: self.mapping.remap_toc(&self.chapters),
        };
        tracing::debug!(
            source_pages = self.original_pages,
            output_pages = self.mapping.total_output_pages(),
            chapters = metadata.toc.len(),
            "Finishing output"
        );
        self.sink.finish(Some(&metadata))
    }
}

/// Encode rasters straight into a container.
///
/// `metadata` chapters are given in source page numbers and are remapped to
/// the pages segmentation produced.
pub fn encode_pages(
    ctx: &ConversionContext,
    pages: Vec<RasterImage>,
    metadata: Option<&Metadata>,
) -> Result<Vec<u8>, ConvertError> {
    ctx.checkpoint()?;
    let mut builder = ContainerBuilder::new();
    let mut mapping = PageMapping::new();

    for (i, page) in pages.into_iter().enumerate() {
        ctx.checkpoint()?;
        let rendered = render_page(ctx, &page);
        mapping.add_original_page(i + 1, rendered.len());
        for (_, bitmap) in &rendered {
            builder.push_bitmap(bitmap)?;
        }
    }

    let metadata = metadata.map(|m| Metadata {
        toc: mapping.remap_toc(&m.toc),
        ..m.clone()
    });
    Ok(builder.finish(metadata.as_ref())?)
}

/// Convert every page of `source`.
///
/// `on_progress` receives the fraction of pages done.
pub fn convert(
    ctx: &ConversionContext,
    source: &dyn PageSource,
    format: OutputFormat,
    on_progress: &mut dyn FnMut(f32),
) -> Result<Artifact, ConvertError> {
    ctx.checkpoint()?;
    let total = source.page_count();
    if total == 0 {
        return Err(ValidationError::NoPages(source.name().to_string()).into());
    }

    tracing::info!(
        source = %source.name(),
        kind = %source.kind(),
        pages = total,
        %format,
        "Converting"
    );

    let meta = source.metadata();
    let mut pipeline = Pipeline::new(ctx, format);
    pipeline.add_pages(source, 0..total, &meta.chapters, &mut |done, total| {
        on_progress(done as f32 / total as f32)
    })?;
    pipeline.finish(meta.title, meta.author)
}

/// Open and convert one path.
pub fn convert_path(
    ctx: &ConversionContext,
    input: &Path,
    format: OutputFormat,
    on_progress: &mut dyn FnMut(f32),
) -> Result<Artifact, ConvertError> {
    let source = open_source(input)?;
    convert(ctx, source.as_ref(), format, on_progress)
}

/// Outcome of one input of a batch
#[derive(Debug)]
pub struct BatchItem {
    pub input: PathBuf,
    /// The artifact, or a description of why conversion failed
    pub outcome: Result<Artifact, String>,
}

/// Convert inputs independently.
///
/// A failing input is recorded in its item and does not stop the others.
pub fn convert_batch(
    ctx: &ConversionContext,
    inputs: &[PathBuf],
    format: OutputFormat,
) -> Vec<BatchItem> {
    inputs
        .iter()
        .map(|input| {
            let outcome = convert_path(ctx, input, format, &mut |fraction| {
                tracing::debug!(input = %input.display(), progress = fraction, "Progress");
            })
            .map_err(|e| {
                tracing::warn!(input = %input.display(), error = %e, "Conversion failed");
                e.to_string()
            });
            BatchItem {
                input: input.clone(),
                outcome,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::xtc::decode_container;
    use crate::format::InputKind;
    use crate::models::{ConvertConfig, DisplaySpec, Orientation, SplitMode};
    use crate::services::sources::{DocumentSource, SourceMetadata};
    use eink_dither::DitherAlgorithm;
    use pretty_assertions::assert_eq;

    fn small_config() -> ConvertConfig {
        ConvertConfig {
            display: DisplaySpec::from_dimensions(48, 80).unwrap(),
            dither: DitherAlgorithm::None,
            ..Default::default()
        }
    }

    fn page(width: usize, height: usize) -> RasterImage {
        RasterImage::filled_rgba(width, height, [40, 40, 40, 255])
    }

    #[test]
    fn test_page_name() {
        assert_eq!(page_name(1, &PageTag::Spread), "00001_0_spread");
        assert_eq!(page_name(42, &PageTag::Half(1)), "00042_2_b");
        assert_eq!(page_name(7, &PageTag::Overlap(2)), "00007_3_c");
    }

    #[test]
    fn test_convert_document_with_outline() {
        let ctx = ConversionContext::open(small_config()).unwrap();
        let resolver = |d: &str| -> Option<usize> { d.parse().ok() };
        let source = DocumentSource::new("doc", vec![page(48, 80); 3]).with_outline(
            vec![
                crate::services::OutlineNode::new("A", "1"),
                crate::services::OutlineNode::new("B", "3"),
            ],
            Box::new(resolver),
        );

        let mut progress = Vec::new();
        let artifact = convert(&ctx, &source, OutputFormat::Xtc, &mut |f| progress.push(f)).unwrap();
        assert_eq!(progress.last().copied(), Some(1.0));
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));

        let decoded = decode_container(artifact.as_container().unwrap()).unwrap();
        assert_eq!(decoded.pages.len(), 3);
        assert_eq!(
            decoded.metadata().unwrap().toc,
            vec![TocEntry::new("A", 1, 2), TocEntry::new("B", 3, 3)]
        );
    }

    #[test]
    fn test_split_pages_remap_toc() {
        let config = ConvertConfig {
            orientation: Orientation::Landscape,
            split_mode: SplitMode::Split,
            ..small_config()
        };
        let ctx = ConversionContext::open(config).unwrap();
        let resolver = |d: &str| -> Option<usize> { d.parse().ok() };
        // Tall pages split in two
        let source = DocumentSource::new("doc", vec![page(40, 100); 2]).with_outline(
            vec![
                crate::services::OutlineNode::new("One", "1"),
                crate::services::OutlineNode::new("Two", "2"),
            ],
            Box::new(resolver),
        );

        let artifact = convert(&ctx, &source, OutputFormat::Xtc, &mut |_| {}).unwrap();
        let decoded = decode_container(artifact.as_container().unwrap()).unwrap();
        assert_eq!(decoded.pages.len(), 4);
        assert_eq!(
            decoded.metadata().unwrap().toc,
            vec![TocEntry::new("One", 1, 2), TocEntry::new("Two", 3, 4)]
        );
    }

    #[test]
    fn test_png_output_names() {
        let ctx = ConversionContext::open(small_config()).unwrap();
        let source = DocumentSource::new("doc", vec![page(10, 10); 2]);

        match convert(&ctx, &source, OutputFormat::Png, &mut |_| {}).unwrap() {
            Artifact::Pages(pages) => {
                let names: Vec<_> = pages.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["00001_0_spread.png", "00002_0_spread.png"]);
            }
            other => panic!("expected pages, got {:?}", other),
        }
    }

    #[test]
    fn test_config_title_overrides_source() {
        let config = ConvertConfig {
            title: Some("Override".to_string()),
            ..small_config()
        };
        let ctx = ConversionContext::open(config).unwrap();
        let source = DocumentSource::new("doc", vec![page(10, 10)]).with_title("Source");

        let artifact = convert(&ctx, &source, OutputFormat::Xtc, &mut |_| {}).unwrap();
        let decoded = decode_container(artifact.as_container().unwrap()).unwrap();
        assert_eq!(decoded.metadata().unwrap().title.as_deref(), Some("Override"));
    }

    #[test]
    fn test_empty_source_is_rejected() {
        let ctx = ConversionContext::open(small_config()).unwrap();
        let source = DocumentSource::new("empty", Vec::new());
        assert!(matches!(
            convert(&ctx, &source, OutputFormat::Xtc, &mut |_| {}),
            Err(ConvertError::Validation(ValidationError::NoPages(_)))
        ));
    }

    #[test]
    fn test_cancelled_conversion_produces_nothing() {
        let ctx = ConversionContext::open(small_config()).unwrap();
        let source = DocumentSource::new("doc", vec![page(10, 10); 4]);
        let handle = ctx.cancel_handle();

        let mut seen = 0;
        let result = convert(&ctx, &source, OutputFormat::Xtc, &mut |_| {
            seen += 1;
            if seen == 2 {
                handle.cancel();
            }
        });
        assert!(matches!(result, Err(ConvertError::Cancelled)));
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_encode_pages_remaps_metadata() {
        let config = ConvertConfig {
            orientation: Orientation::Landscape,
            split_mode: SplitMode::Split,
            ..small_config()
        };
        let ctx = ConversionContext::open(config).unwrap();
        let metadata = Metadata {
            title: Some("T".to_string()),
            toc: vec![TocEntry::new("Wide", 1, 1), TocEntry::new("Tall", 2, 2)],
            ..Default::default()
        };

        let bytes = encode_pages(&ctx, vec![page(100, 40), page(40, 100)], Some(&metadata)).unwrap();
        let decoded = decode_container(&bytes).unwrap();
        assert_eq!(decoded.pages.len(), 3);
        assert_eq!(
            decoded.metadata().unwrap().toc,
            vec![TocEntry::new("Wide", 1, 1), TocEntry::new("Tall", 2, 3)]
        );
    }

    #[test]
    fn test_encode_pages_without_metadata() {
        let ctx = ConversionContext::open(small_config()).unwrap();
        let bytes = encode_pages(&ctx, vec![page(48, 80)], None).unwrap();
        let decoded = decode_container(&bytes).unwrap();
        assert!(!decoded.header().has_metadata());
        assert_eq!(decoded.pages[0].width, 48);
    }

    struct Failing;

    impl PageSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn kind(&self) -> InputKind {
            InputKind::Document
        }
        fn page_count(&self) -> usize {
            2
        }
        fn metadata(&self) -> SourceMetadata {
            SourceMetadata::default()
        }
        fn load_page(&self, index: usize) -> Result<SourcePage, ConvertError> {
            if index == 0 {
                Ok(SourcePage::Raster(page(8, 8)))
            } else {
                Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated entry").into())
            }
        }
    }

    #[test]
    fn test_page_failure_aborts_conversion() {
        let ctx = ConversionContext::open(small_config()).unwrap();
        let err = convert(&ctx, &Failing, OutputFormat::Xtc, &mut |_| {}).unwrap_err();
        assert!(err.to_string().contains("truncated entry"));
    }

    #[test]
    fn test_batch_records_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        image::GrayImage::from_pixel(8, 8, image::Luma([0]))
            .save(&good)
            .unwrap();
        let bad = dir.path().join("bad.txt");
        std::fs::write(&bad, b"not an image").unwrap();

        let ctx = ConversionContext::open(small_config()).unwrap();
        let items = convert_batch(&ctx, &[bad.clone(), good.clone()], OutputFormat::Xtc);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].input, bad);
        assert!(items[0].outcome.is_err());
        assert!(items[1].outcome.is_ok());
    }
}
