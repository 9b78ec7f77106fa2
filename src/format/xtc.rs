//! XTC: multi-page container of XTG page blobs.
//!
//! ```text
//! header      48 bytes (56 with metadata)
//! metadata    256 bytes: title[128] author[112] toc header[16]   (optional)
//! toc         chapter count x 96 bytes                            (optional)
//! index       page count x 16 bytes
//! data        page blobs, concatenated in page order
//! ```
//!
//! All integers are little-endian. Index offsets are absolute offsets into
//! the container.

use eink_dither::{MonoBitmap, RasterImage};
use serde::Serialize;

use super::bytes::{
    read_fixed_str, read_u16_le, read_u32_le, read_u64_le, take, to_usize, write_fixed_str,
};
use super::xtg::{decode_xtg, encode_xtg};
use crate::error::{FormatError, ValidationError};
use crate::models::{Metadata, TocEntry};

pub const XTC_MAGIC: [u8; 4] = *b"XTC\0";
pub const XTC_VERSION: u16 = 1;

pub const HEADER_LEN: usize = 48;
pub const HEADER_LEN_WITH_METADATA: usize = 56;
pub const METADATA_LEN: usize = 256;
pub const TITLE_LEN: usize = 128;
pub const AUTHOR_LEN: usize = 112;
pub const TOC_HEADER_LEN: usize = 16;
pub const TOC_ENTRY_LEN: usize = 96;
pub const TOC_TITLE_LEN: usize = 80;
pub const INDEX_ENTRY_LEN: usize = 16;

/// First flag word when a metadata block is present: bytes `[0, 1, 0, 1]`.
pub const METADATA_FLAGS: u32 = u32::from_le_bytes([0, 1, 0, 1]);

/// Container header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerHeader {
    pub version: u16,
    pub page_count: u16,
    pub flags: [u32; 2],
    /// 0 when there is no metadata block
    pub metadata_offset: u64,
    pub index_offset: u64,
    pub data_offset: u64,
    /// Only present in the 56-byte form
    pub toc_entries_offset: Option<u64>,
}

impl ContainerHeader {
    pub fn has_metadata(&self) -> bool {
        self.metadata_offset != 0
    }

    /// Encoded size of this header
    pub fn encoded_len(&self) -> usize {
        if self.toc_entries_offset.is_some() {
            HEADER_LEN_WITH_METADATA
        } else {
            HEADER_LEN
        }
    }

    pub fn read(bytes: &[u8]) -> Result<Self, FormatError> {
        let magic = take(bytes, 0, 4, "XTC header")?;
        if magic != XTC_MAGIC {
            return Err(FormatError::BadMagic {
                expected: "XTC\\0",
                found: magic.to_vec(),
            });
        }
        let base = take(bytes, 0, HEADER_LEN, "XTC header")?;
        let metadata_offset = read_u64_le(base, 16)?;
        let toc_entries_offset = if metadata_offset != 0 {
            let ext = take(bytes, 0, HEADER_LEN_WITH_METADATA, "XTC header")?;
            Some(read_u64_le(ext, HEADER_LEN)?)
        } else {
            None
        };

        Ok(Self {
            version: read_u16_le(base, 4)?,
            page_count: read_u16_le(base, 6)?,
            flags: [read_u32_le(base, 8)?, read_u32_le(base, 12)?],
            metadata_offset,
            index_offset: read_u64_le(base, 24)?,
            data_offset: read_u64_le(base, 32)?,
            toc_entries_offset,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&XTC_MAGIC);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.page_count.to_le_bytes());
        out.extend_from_slice(&self.flags[0].to_le_bytes());
        out.extend_from_slice(&self.flags[1].to_le_bytes());
        out.extend_from_slice(&self.metadata_offset.to_le_bytes());
        out.extend_from_slice(&self.index_offset.to_le_bytes());
        out.extend_from_slice(&self.data_offset.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes());
        if let Some(toc) = self.toc_entries_offset {
            out.extend_from_slice(&toc.to_le_bytes());
        }
    }
}

/// One page index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageIndexEntry {
    /// Absolute byte offset of the page blob
    pub offset: u64,
    pub length: u32,
    pub width: u16,
    pub height: u16,
}

impl PageIndexEntry {
    fn read(entry: &[u8]) -> Result<Self, FormatError> {
        Ok(Self {
            offset: read_u64_le(entry, 0)?,
            length: read_u32_le(entry, 8)?,
            width: read_u16_le(entry, 12)?,
            height: read_u16_le(entry, 14)?,
        })
    }
}

/// A page blob with the dimensions recorded for it in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPage<'a> {
    pub blob: &'a [u8],
    pub width: u16,
    pub height: u16,
}

/// Assemble a container from already-encoded page blobs.
///
/// A metadata block is written only when `metadata` carries a title, an
/// author or at least one chapter.
pub fn encode_container(
    pages: &[RawPage<'_>],
    metadata: Option<&Metadata>,
) -> Result<Vec<u8>, ValidationError> {
    let page_count =
        u16::try_from(pages.len()).map_err(|_| ValidationError::TooManyPages(pages.len()))?;
    let metadata = metadata.filter(|m| !m.is_empty());

    let (header_len, meta_len, chapter_count) = match metadata {
        Some(m) => {
            let count = u16::try_from(m.toc.len())
                .map_err(|_| ValidationError::TooManyChapters(m.toc.len()))?;
            (HEADER_LEN_WITH_METADATA, METADATA_LEN, count)
        }
        None => (HEADER_LEN, 0, 0),
    };
    let toc_offset = header_len + meta_len;
    let index_offset = toc_offset + TOC_ENTRY_LEN * chapter_count as usize;
    let data_offset = index_offset + INDEX_ENTRY_LEN * pages.len();
    let data_len: usize = pages.iter().map(|p| p.blob.len()).sum();

    let header = ContainerHeader {
        version: XTC_VERSION,
        page_count,
        flags: if metadata.is_some() {
            [METADATA_FLAGS, 0]
        } else {
            [0, 0]
        },
        metadata_offset: if metadata.is_some() { header_len as u64 } else { 0 },
        index_offset: index_offset as u64,
        data_offset: data_offset as u64,
        toc_entries_offset: metadata.map(|_| toc_offset as u64),
    };

    let mut out = Vec::with_capacity(data_offset + data_len);
    header.write(&mut out);

    if let Some(m) = metadata {
        write_fixed_str(&mut out, m.title.as_deref().unwrap_or(""), TITLE_LEN);
        write_fixed_str(&mut out, m.author.as_deref().unwrap_or(""), AUTHOR_LEN);
        out.extend_from_slice(&m.timestamp.to_le_bytes());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&chapter_count.to_le_bytes());
        out.extend_from_slice(&[0u8; 8]);
        for chapter in &m.toc {
            write_fixed_str(&mut out, &chapter.title, TOC_TITLE_LEN);
            out.extend_from_slice(&page_number(chapter.start_page)?.to_le_bytes());
            out.extend_from_slice(&page_number(chapter.end_page)?.to_le_bytes());
            out.extend_from_slice(&[0u8; 12]);
        }
    }
    debug_assert_eq!(out.len(), index_offset);

    let mut running = data_offset as u64;
    for page in pages {
        let length = u32::try_from(page.blob.len()).map_err(|_| {
            ValidationError::DimensionsTooLarge {
                width: page.width as usize,
                height: page.height as usize,
            }
        })?;
        out.extend_from_slice(&running.to_le_bytes());
        out.extend_from_slice(&length.to_le_bytes());
        out.extend_from_slice(&page.width.to_le_bytes());
        out.extend_from_slice(&page.height.to_le_bytes());
        running += length as u64;
    }

    for page in pages {
        out.extend_from_slice(page.blob);
    }
    Ok(out)
}

fn page_number(page: usize) -> Result<u16, ValidationError> {
    u16::try_from(page).map_err(|_| ValidationError::TooManyPages(page))
}

/// Owned page blobs accumulated one page at a time.
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    pages: Vec<(Vec<u8>, u16, u16)>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// XTG-encode and append a bitmap.
    pub fn push_bitmap(&mut self, bitmap: &MonoBitmap) -> Result<(), ValidationError> {
        let blob = encode_xtg(bitmap)?;
        let (w, h) = super::xtg::checked_dimensions(bitmap.width(), bitmap.height())?;
        self.push_raw(blob, w, h);
        Ok(())
    }

    /// Append an already-encoded blob unchanged.
    pub fn push_raw(&mut self, blob: Vec<u8>, width: u16, height: u16) {
        self.pages.push((blob, width, height));
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn finish(&self, metadata: Option<&Metadata>) -> Result<Vec<u8>, ValidationError> {
        let raw: Vec<RawPage<'_>> = self
            .pages
            .iter()
            .map(|(blob, width, height)| RawPage {
                blob,
                width: *width,
                height: *height,
            })
            .collect();
        encode_container(&raw, metadata)
    }
}

/// Header, metadata and index of a container, without any page data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerLayout {
    pub header: ContainerHeader,
    pub metadata: Option<Metadata>,
    pub index: Vec<PageIndexEntry>,
}

impl ContainerLayout {
    /// Parse and bounds-check a container.
    ///
    /// Every index entry is verified to point inside the data section, after
    /// the previous page's blob, so later blob slicing cannot fail.
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        let header = ContainerHeader::read(bytes)?;
        let metadata = if header.has_metadata() {
            Some(read_metadata(bytes, &header)?)
        } else {
            None
        };

        let count = header.page_count as usize;
        let index_offset = to_usize(header.index_offset, "index offset")?;
        let data_offset = header.data_offset;
        let region = take(bytes, index_offset, count * INDEX_ENTRY_LEN, "page index")?;

        let mut index: Vec<PageIndexEntry> = Vec::with_capacity(count);
        let mut previous_end = data_offset;
        for (page, entry) in region.chunks_exact(INDEX_ENTRY_LEN).enumerate() {
            let entry = PageIndexEntry::read(entry)?;
            let end = match entry.offset.checked_add(entry.length as u64) {
                Some(end) if entry.offset >= data_offset && end <= bytes.len() as u64 => end,
                _ => {
                    return Err(FormatError::BlobOutOfBounds {
                        page,
                        offset: entry.offset,
                        length: entry.length,
                        size: bytes.len(),
                    })
                }
            };
            // Blobs are laid out in page order without overlap.
            if page > 0 && entry.offset < previous_end {
                return Err(FormatError::IndexOrder {
                    page,
                    previous: page - 1,
                    offset: entry.offset,
                    previous_end,
                });
            }
            previous_end = end;
            index.push(entry);
        }

        Ok(Self {
            header,
            metadata,
            index,
        })
    }

    pub fn page_count(&self) -> usize {
        self.index.len()
    }

    /// Chapters of the embedded table of contents (empty if none)
    pub fn toc(&self) -> &[TocEntry] {
        self.metadata
            .as_ref()
            .map(|m| m.toc.as_slice())
            .unwrap_or_default()
    }

    /// Slice the blob of page `page` (0-based) out of `bytes`.
    pub fn raw_page<'a>(&self, bytes: &'a [u8], page: usize) -> Result<RawPage<'a>, FormatError> {
        let entry = self.index.get(page).ok_or(FormatError::Truncated {
            what: "page index",
            needed: page + 1,
            available: self.index.len(),
        })?;
        let offset = to_usize(entry.offset, "page offset")?;
        Ok(RawPage {
            blob: take(bytes, offset, entry.length as usize, "page blob")?,
            width: entry.width,
            height: entry.height,
        })
    }
}

fn read_metadata(bytes: &[u8], header: &ContainerHeader) -> Result<Metadata, FormatError> {
    let offset = to_usize(header.metadata_offset, "metadata offset")?;
    let block = take(bytes, offset, METADATA_LEN, "metadata")?;
    let title = read_fixed_str(&block[..TITLE_LEN]);
    let author = read_fixed_str(&block[TITLE_LEN..TITLE_LEN + AUTHOR_LEN]);
    let toc_header = TITLE_LEN + AUTHOR_LEN;
    let timestamp = read_u32_le(block, toc_header)?;
    let count = read_u16_le(block, toc_header + 6)? as usize;

    let toc_offset = match header.toc_entries_offset {
        Some(o) => to_usize(o, "toc offset")?,
        None => offset + METADATA_LEN,
    };
    let entries = take(bytes, toc_offset, count * TOC_ENTRY_LEN, "table of contents")?;
    let mut toc = Vec::with_capacity(count);
    for entry in entries.chunks_exact(TOC_ENTRY_LEN) {
        toc.push(TocEntry::new(
            read_fixed_str(&entry[..TOC_TITLE_LEN]),
            read_u16_le(entry, TOC_TITLE_LEN)? as usize,
            read_u16_le(entry, TOC_TITLE_LEN + 2)? as usize,
        ));
    }

    Ok(Metadata {
        title: Some(title).filter(|s| !s.is_empty()),
        author: Some(author).filter(|s| !s.is_empty()),
        timestamp,
        toc,
    })
}

/// A container decoded to raw page blobs borrowed from its buffer.
#[derive(Debug, Clone)]
pub struct DecodedContainer<'a> {
    pub layout: ContainerLayout,
    pub pages: Vec<RawPage<'a>>,
}

impl DecodedContainer<'_> {
    pub fn header(&self) -> &ContainerHeader {
        &self.layout.header
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.layout.metadata.as_ref()
    }

    /// Fully decode every page bitmap.
    pub fn decode_bitmaps(&self) -> Result<Vec<MonoBitmap>, FormatError> {
        self.pages.iter().map(|p| decode_xtg(p.blob)).collect()
    }

    /// Fully decode every page into an RGBA raster.
    pub fn decode_rasters(&self) -> Result<Vec<RasterImage>, FormatError> {
        self.pages
            .iter()
            .map(|p| Ok(decode_xtg(p.blob)?.to_rgba()))
            .collect()
    }
}

/// Decode a container to its header, index and raw page blobs.
///
/// Page bitmaps are not decoded; see [`DecodedContainer::decode_bitmaps`].
pub fn decode_container(bytes: &[u8]) -> Result<DecodedContainer<'_>, FormatError> {
    let layout = ContainerLayout::parse(bytes)?;
    let pages = (0..layout.page_count())
        .map(|i| layout.raw_page(bytes, i))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DecodedContainer { layout, pages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eink_dither::GrayImage;
    use pretty_assertions::assert_eq;

    fn page(width: usize, height: usize, seed: u8) -> MonoBitmap {
        let pixels = (0..width * height)
            .map(|i| if (i as u8).wrapping_mul(seed) % 3 == 0 { 255 } else { 0 })
            .collect();
        MonoBitmap::from_gray(&GrayImage::new(width, height, pixels).unwrap())
    }

    fn build(pages: &[MonoBitmap], metadata: Option<&Metadata>) -> Vec<u8> {
        let mut builder = ContainerBuilder::new();
        for p in pages {
            builder.push_bitmap(p).unwrap();
        }
        builder.finish(metadata).unwrap()
    }

    #[test]
    fn test_header_without_metadata() {
        let bytes = build(&[page(16, 2, 3), page(16, 2, 5)], None);
        let header = ContainerHeader::read(&bytes).unwrap();

        assert_eq!(&bytes[0..4], b"XTC\0");
        assert_eq!(header.version, 1);
        assert_eq!(header.page_count, 2);
        assert_eq!(header.flags, [0, 0]);
        assert_eq!(header.metadata_offset, 0);
        assert_eq!(header.index_offset, 48);
        assert_eq!(header.data_offset, 48 + 32);
        assert_eq!(header.toc_entries_offset, None);
        assert_eq!(&bytes[40..48], &[0u8; 8]);
    }

    #[test]
    fn test_header_with_metadata() {
        let metadata = Metadata {
            title: Some("Title".into()),
            author: None,
            timestamp: 1_700_000_000,
            toc: vec![TocEntry::new("One", 1, 1), TocEntry::new("Two", 2, 3)],
        };
        let bytes = build(&[page(8, 1, 1), page(8, 1, 2), page(8, 1, 3)], Some(&metadata));
        let header = ContainerHeader::read(&bytes).unwrap();

        assert_eq!(&bytes[8..12], &[0, 1, 0, 1]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 0]);
        assert_eq!(header.metadata_offset, 56);
        assert_eq!(header.toc_entries_offset, Some(312));
        assert_eq!(header.index_offset, 56 + 256 + 96 * 2);
        assert_eq!(header.data_offset, header.index_offset + 16 * 3);
        assert_eq!(header.encoded_len(), 56);
    }

    #[test]
    fn test_metadata_round_trip() {
        let metadata = Metadata {
            title: Some("Ünïcode title".into()),
            author: Some("Someone".into()),
            timestamp: 42,
            toc: vec![TocEntry::new("Prologue", 1, 2)],
        };
        let bytes = build(&[page(8, 1, 1), page(8, 1, 2)], Some(&metadata));
        let decoded = decode_container(&bytes).unwrap();
        assert_eq!(decoded.metadata(), Some(&metadata));
    }

    #[test]
    fn test_empty_metadata_is_omitted() {
        let bytes = build(&[page(8, 1, 1)], Some(&Metadata::default()));
        let header = ContainerHeader::read(&bytes).unwrap();
        assert_eq!(header.encoded_len(), 48);
        assert!(!header.has_metadata());
    }

    #[test]
    fn test_long_title_truncated_to_field() {
        let metadata = Metadata {
            title: Some("x".repeat(300)),
            ..Default::default()
        };
        let bytes = build(&[page(8, 1, 1)], Some(&metadata));
        let decoded = decode_container(&bytes).unwrap();
        assert_eq!(decoded.metadata().unwrap().title.as_ref().unwrap().len(), 127);
    }

    #[test]
    fn test_index_offsets_are_absolute_and_contiguous() {
        let pages = [page(16, 4, 1), page(24, 2, 7), page(8, 8, 2)];
        let bytes = build(&pages, None);
        let decoded = decode_container(&bytes).unwrap();

        let mut expected = decoded.header().data_offset;
        for entry in &decoded.layout.index {
            assert_eq!(entry.offset, expected);
            expected += entry.length as u64;
        }
        assert_eq!(expected as usize, bytes.len());
        assert_eq!(decoded.layout.index[1].width, 24);
        assert_eq!(decoded.layout.index[1].height, 2);
    }

    #[test]
    fn test_raw_blobs_match_xtg_encoding() {
        let pages = [page(10, 3, 1), page(10, 3, 4)];
        let bytes = build(&pages, None);
        let decoded = decode_container(&bytes).unwrap();

        for (raw, bitmap) in decoded.pages.iter().zip(&pages) {
            assert_eq!(raw.blob, encode_xtg(bitmap).unwrap().as_slice());
        }
        assert_eq!(decoded.decode_bitmaps().unwrap(), pages.to_vec());
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = build(&[page(8, 1, 1)], None);
        bytes[2] = b'G';
        assert!(matches!(
            decode_container(&bytes),
            Err(FormatError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_truncated_header() {
        let bytes = build(&[page(8, 1, 1)], None);
        assert!(matches!(
            decode_container(&bytes[..30]),
            Err(FormatError::Truncated { .. })
        ));
    }

    #[test]
    fn test_page_count_exceeds_index() {
        let mut bytes = build(&[page(8, 1, 1)], None);
        bytes[6] = 9;
        assert!(decode_container(&bytes).is_err());
    }

    #[test]
    fn test_blob_out_of_bounds() {
        let mut bytes = build(&[page(8, 1, 1)], None);
        // Inflate the first entry's length
        bytes[48 + 8] = 200;
        assert!(matches!(
            decode_container(&bytes),
            Err(FormatError::BlobOutOfBounds { page: 0, .. })
        ));
    }

    #[test]
    fn test_decreasing_offsets_rejected() {
        let mut bytes = build(&[page(8, 1, 1), page(8, 1, 2)], None);
        // Point the second entry at the first page's blob
        let first_offset: [u8; 8] = bytes[48..56].try_into().unwrap();
        bytes[64..72].copy_from_slice(&first_offset);
        assert!(matches!(
            decode_container(&bytes),
            Err(FormatError::IndexOrder {
                page: 1,
                previous: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_overlapping_blobs_rejected() {
        let mut bytes = build(&[page(8, 1, 1), page(8, 1, 2)], None);
        // Stretch the first blob into the second
        bytes[48 + 8] += 1;
        assert!(matches!(
            decode_container(&bytes),
            Err(FormatError::IndexOrder { page: 1, .. })
        ));
    }

    #[test]
    fn test_decode_rasters() {
        let bytes = build(&[page(8, 2, 1), page(8, 2, 2)], None);
        let rasters = decode_container(&bytes).unwrap().decode_rasters().unwrap();
        assert_eq!(rasters.len(), 2);
        for raster in &rasters {
            assert_eq!((raster.width(), raster.height()), (8, 2));
            for px in raster.data().chunks_exact(4) {
                assert_eq!(px[3], 255);
                assert!(px[0] == 0 || px[0] == 255);
                assert_eq!(px[0], px[1]);
                assert_eq!(px[1], px[2]);
            }
        }
        let bitmaps = decode_container(&bytes).unwrap().decode_bitmaps().unwrap();
        assert_eq!(rasters[0].data()[0] == 255, bitmaps[0].is_white(0, 0));
    }

    #[test]
    fn test_zero_pages() {
        let bytes = encode_container(&[], None).unwrap();
        assert_eq!(bytes.len(), 48);
        assert_eq!(decode_container(&bytes).unwrap().pages.len(), 0);
    }
}
