//! Page sources: readers that yield source pages one at a time.
//!
//! Archive-like inputs are seen through the small [`ArchiveEntry`]
//! capability trait so the pipeline never depends on a particular archive
//! library's entry type.

use eink_dither::{PixelFormat, RasterImage};
use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::comic_info::{parse_comic_info, ComicInfo, COMIC_INFO_FILE};
use super::outline::{flatten_outline, DestinationResolver, OutlineNode};
use crate::error::{ConvertError, ValidationError};
use crate::format::xtc::ContainerLayout;
use crate::format::{detect_input, is_image_path, InputKind};
use crate::models::{chapters_from_markers, TocEntry};

/// One entry of an archive or archive-like tree
pub trait ArchiveEntry {
    /// Path inside the archive, `/`-separated
    fn path(&self) -> &str;

    fn is_directory(&self) -> bool;

    /// Read the entry's bytes.
    fn read_bytes(&self) -> io::Result<Vec<u8>>;
}

/// Entry of an extracted archive on disk
#[derive(Debug, Clone)]
pub struct FsEntry {
    path: String,
    full_path: PathBuf,
    directory: bool,
}

impl ArchiveEntry for FsEntry {
    fn path(&self) -> &str {
        &self.path
    }

    fn is_directory(&self) -> bool {
        self.directory
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.full_path)
    }
}

/// Entry held in memory. Paths ending in `/` are directories.
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    path: String,
    bytes: Vec<u8>,
}

impl MemoryEntry {
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}

impl ArchiveEntry for MemoryEntry {
    fn path(&self) -> &str {
        &self.path
    }

    fn is_directory(&self) -> bool {
        self.path.ends_with('/')
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// List every entry below `root`.
pub fn read_dir_entries(root: &Path) -> io::Result<Vec<FsEntry>> {
    let mut entries = Vec::new();
    for item in WalkDir::new(root).min_depth(1).follow_links(false) {
        let item = item.map_err(io::Error::from)?;
        let relative = item.path().strip_prefix(root).unwrap_or(item.path());
        let path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push(FsEntry {
            path,
            full_path: item.path().to_path_buf(),
            directory: item.file_type().is_dir(),
        });
    }
    Ok(entries)
}

/// Numeric-aware, case-insensitive ordering: `page2` sorts before `page10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natord::compare_ignore_case(a, b)
}

/// One source page as handed to the pipeline
#[derive(Debug, Clone)]
pub enum SourcePage {
    /// Decoded raster that still needs preprocessing and dithering
    Raster(RasterImage),
    /// Already device-ready XTG blob
    Encoded {
        blob: Vec<u8>,
        width: u16,
        height: u16,
    },
}

/// Best-effort metadata of a source, chapters in source page numbers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub chapters: Vec<TocEntry>,
}

/// A reader of ordered source pages.
pub trait PageSource {
    /// Display name, usually the input's file stem
    fn name(&self) -> &str;

    fn kind(&self) -> InputKind;

    fn page_count(&self) -> usize;

    fn metadata(&self) -> SourceMetadata;

    /// Load page `index` (0-based).
    fn load_page(&self, index: usize) -> Result<SourcePage, ConvertError>;
}

/// Decode image bytes into a gray or RGBA raster.
pub fn decode_image(bytes: &[u8]) -> Result<RasterImage, ConvertError> {
    let image = image::load_from_memory(bytes)?;
    let color = image.color();
    let raster = if color.has_color() || color.has_alpha() {
        let rgba = image.to_rgba8();
        let (w, h) = rgba.dimensions();
        RasterImage::new(w as usize, h as usize, PixelFormat::Rgba, rgba.into_raw())?
    } else {
        let gray = image.to_luma8();
        let (w, h) = gray.dimensions();
        RasterImage::new(w as usize, h as usize, PixelFormat::Gray, gray.into_raw())?
    };
    Ok(raster)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Pages of an archive: its image entries in natural order.
pub struct ArchiveSource {
    name: String,
    pages: Vec<Box<dyn ArchiveEntry>>,
    comic_info: Option<ComicInfo>,
}

impl ArchiveSource {
    /// Build from archive entries.
    ///
    /// Directories, dotfiles, `__MACOSX` resource forks and non-image files
    /// are ignored. A `ComicInfo.xml` sidecar is read if present; failures
    /// to read it leave the source without metadata.
    pub fn from_entries(name: impl Into<String>, entries: Vec<Box<dyn ArchiveEntry>>) -> Self {
        let name = name.into();
        let mut comic_info = None;
        let mut pages = Vec::new();

        for entry in entries {
            if entry.is_directory() {
                continue;
            }
            let path = entry.path();
            if path.split('/').any(|part| part == "__MACOSX") || file_name(path).starts_with('.')
            {
                continue;
            }
            if file_name(path).eq_ignore_ascii_case(COMIC_INFO_FILE) {
                if comic_info.is_none() {
                    comic_info = read_comic_info(entry.as_ref());
                }
                continue;
            }
            if is_image_path(path) {
                pages.push(entry);
            }
        }
        pages.sort_by(|a, b| natural_cmp(a.path(), b.path()));

        tracing::debug!(
            source = %name,
            pages = pages.len(),
            comic_info = comic_info.is_some(),
            "Opened archive"
        );
        Self {
            name,
            pages,
            comic_info,
        }
    }

    /// Read an extracted archive directory.
    pub fn open_dir(root: &Path) -> Result<Self, ConvertError> {
        let entries = read_dir_entries(root)?
            .into_iter()
            .map(|e| Box::new(e) as Box<dyn ArchiveEntry>)
            .collect();
        Ok(Self::from_entries(stem(root), entries))
    }

    pub fn comic_info(&self) -> Option<&ComicInfo> {
        self.comic_info.as_ref()
    }
}

fn read_comic_info(entry: &dyn ArchiveEntry) -> Option<ComicInfo> {
    let bytes = match entry.read_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(%e, path = entry.path(), "Failed to read ComicInfo.xml");
            return None;
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    match parse_comic_info(&text) {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!(%e, path = entry.path(), "Ignoring unparsable ComicInfo.xml");
            None
        }
    }
}

impl PageSource for ArchiveSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> InputKind {
        InputKind::ImageFolder
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn metadata(&self) -> SourceMetadata {
        match &self.comic_info {
            Some(info) => SourceMetadata {
                title: info.title.clone(),
                author: info.writer.clone(),
                chapters: chapters_from_markers(&info.bookmarks, self.pages.len()),
            },
            None => SourceMetadata::default(),
        }
    }

    fn load_page(&self, index: usize) -> Result<SourcePage, ConvertError> {
        let entry = self
            .pages
            .get(index)
            .ok_or_else(|| ValidationError::NoPages(format!("{} page {}", self.name, index + 1)))?;
        let bytes = entry.read_bytes()?;
        Ok(SourcePage::Raster(decode_image(&bytes)?))
    }
}

/// A single image file as a one-page source
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    name: String,
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: &Path) -> Self {
        Self {
            name: stem(path),
            path: path.to_path_buf(),
        }
    }
}

impl PageSource for ImageFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> InputKind {
        InputKind::Image
    }

    fn page_count(&self) -> usize {
        1
    }

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata::default()
    }

    fn load_page(&self, index: usize) -> Result<SourcePage, ConvertError> {
        if index != 0 {
            return Err(ValidationError::NoPages(format!("{} page {}", self.name, index + 1)).into());
        }
        let bytes = std::fs::read(&self.path)?;
        Ok(SourcePage::Raster(decode_image(&bytes)?))
    }
}

/// An existing container; its pages pass through without re-dithering
#[derive(Debug, Clone)]
pub struct XtcSource {
    name: String,
    bytes: Vec<u8>,
    layout: ContainerLayout,
}

impl XtcSource {
    /// Parse container bytes. Header and index are validated up front.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ConvertError> {
        let layout = ContainerLayout::parse(&bytes)?;
        Ok(Self {
            name: name.into(),
            bytes,
            layout,
        })
    }

    pub fn open(path: &Path) -> Result<Self, ConvertError> {
        Self::from_bytes(stem(path), std::fs::read(path)?)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn layout(&self) -> &ContainerLayout {
        &self.layout
    }
}

impl PageSource for XtcSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> InputKind {
        InputKind::Container
    }

    fn page_count(&self) -> usize {
        self.layout.page_count()
    }

    fn metadata(&self) -> SourceMetadata {
        match &self.layout.metadata {
            Some(meta) => SourceMetadata {
                title: meta.title.clone(),
                author: meta.author.clone(),
                chapters: meta.toc.clone(),
            },
            None => SourceMetadata::default(),
        }
    }

    fn load_page(&self, index: usize) -> Result<SourcePage, ConvertError> {
        let page = self.layout.raw_page(&self.bytes, index)?;
        Ok(SourcePage::Encoded {
            blob: page.blob.to_vec(),
            width: page.width,
            height: page.height,
        })
    }
}

/// Pages rendered by a document reader, with an optional outline.
pub struct DocumentSource {
    name: String,
    pages: Vec<RasterImage>,
    title: Option<String>,
    author: Option<String>,
    outline: Vec<OutlineNode>,
    resolver: Option<Box<dyn DestinationResolver>>,
}

impl DocumentSource {
    pub fn new(name: impl Into<String>, pages: Vec<RasterImage>) -> Self {
        Self {
            name: name.into(),
            pages,
            title: None,
            author: None,
            outline: Vec::new(),
            resolver: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Attach the document outline and the resolver for its destinations.
    pub fn with_outline(
        mut self,
        outline: Vec<OutlineNode>,
        resolver: Box<dyn DestinationResolver>,
    ) -> Self {
        self.outline = outline;
        self.resolver = Some(resolver);
        self
    }
}

impl PageSource for DocumentSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> InputKind {
        InputKind::Document
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn metadata(&self) -> SourceMetadata {
        let chapters = match &self.resolver {
            Some(resolver) => {
                let markers = flatten_outline(&self.outline, resolver.as_ref());
                chapters_from_markers(&markers, self.pages.len())
            }
            None => Vec::new(),
        };
        SourceMetadata {
            title: self.title.clone(),
            author: self.author.clone(),
            chapters,
        }
    }

    fn load_page(&self, index: usize) -> Result<SourcePage, ConvertError> {
        self.pages
            .get(index)
            .cloned()
            .map(SourcePage::Raster)
            .ok_or_else(|| ValidationError::NoPages(format!("{} page {}", self.name, index + 1)).into())
    }
}

/// Open the right source for a path.
pub fn open_source(path: &Path) -> Result<Box<dyn PageSource>, ConvertError> {
    let source: Box<dyn PageSource> = match detect_input(path)? {
        InputKind::ImageFolder => Box::new(ArchiveSource::open_dir(path)?),
        InputKind::Container => Box::new(XtcSource::open(path)?),
        InputKind::Image => Box::new(ImageFileSource::new(path)),
        InputKind::Document => {
            return Err(ValidationError::UnsupportedInput(path.display().to_string()).into())
        }
    };
    Ok(source)
}
