//! Page sinks: where finished 1-bit pages go.

use eink_dither::MonoBitmap;
use std::io::Cursor;
use std::path::Path;

use crate::error::ConvertError;
use crate::format::xtc::{ContainerBuilder, RawPage};
use crate::format::xtg::decode_xtg;
use crate::models::{Metadata, OutputFormat};

/// An output file of the PNG sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPage {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Result of one conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// A complete XTC container
    Container(Vec<u8>),
    /// One PNG per output page, named in reading order
    Pages(Vec<NamedPage>),
}

impl Artifact {
    /// Container bytes, if this is a container
    pub fn as_container(&self) -> Option<&[u8]> {
        match self {
            Artifact::Container(bytes) => Some(bytes),
            Artifact::Pages(_) => None,
        }
    }

    /// Write a container to `path`, or the pages into directory `path`.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        match self {
            Artifact::Container(bytes) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, bytes)
            }
            Artifact::Pages(pages) => {
                std::fs::create_dir_all(path)?;
                for page in pages {
                    std::fs::write(path.join(&page.name), &page.bytes)?;
                }
                Ok(())
            }
        }
    }
}

/// Consumer of finished pages in reading order.
pub trait PageSink {
    /// Accept a freshly dithered page.
    fn push_bitmap(&mut self, name: &str, bitmap: &MonoBitmap) -> Result<(), ConvertError>;

    /// Accept a page that is already XTG-encoded.
    fn push_encoded(&mut self, name: &str, page: RawPage<'_>) -> Result<(), ConvertError>;

    fn page_count(&self) -> usize;

    /// Produce the artifact.
    fn finish(self: Box<Self>, metadata: Option<&Metadata>) -> Result<Artifact, ConvertError>;
}

/// Create the sink for an output format
pub fn sink_for(format: OutputFormat) -> Box<dyn PageSink> {
    match format {
        OutputFormat::Xtc => Box::new(XtcSink::default()),
        OutputFormat::Png => Box::new(PngSink::default()),
    }
}

/// Collects pages into an XTC container
#[derive(Debug, Default)]
pub struct XtcSink {
    builder: ContainerBuilder,
}

impl PageSink for XtcSink {
    fn push_bitmap(&mut self, _name: &str, bitmap: &MonoBitmap) -> Result<(), ConvertError> {
        self.builder.push_bitmap(bitmap)?;
        Ok(())
    }

    fn push_encoded(&mut self, _name: &str, page: RawPage<'_>) -> Result<(), ConvertError> {
        self.builder
            .push_raw(page.blob.to_vec(), page.width, page.height);
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.builder.page_count()
    }

    fn finish(self: Box<Self>, metadata: Option<&Metadata>) -> Result<Artifact, ConvertError> {
        Ok(Artifact::Container(self.builder.finish(metadata)?))
    }
}

/// Writes each page as a 1-bit grayscale PNG
#[derive(Debug, Default)]
pub struct PngSink {
    pages: Vec<NamedPage>,
}

impl PageSink for PngSink {
    fn push_bitmap(&mut self, name: &str, bitmap: &MonoBitmap) -> Result<(), ConvertError> {
        self.pages.push(NamedPage {
            name: format!("{name}.png"),
            bytes: encode_png(bitmap)?,
        });
        Ok(())
    }

    fn push_encoded(&mut self, name: &str, page: RawPage<'_>) -> Result<(), ConvertError> {
        let bitmap = decode_xtg(page.blob)?;
        self.push_bitmap(name, &bitmap)
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn finish(self: Box<Self>, _metadata: Option<&Metadata>) -> Result<Artifact, ConvertError> {
        Ok(Artifact::Pages(self.pages))
    }
}

/// Encode a packed bitmap as a 1-bit grayscale PNG.
///
/// PNG's 1-bit grayscale uses the same bit order and polarity (1 = white)
/// as the packed bitmap, so rows are written unchanged.
pub fn encode_png(bitmap: &MonoBitmap) -> Result<Vec<u8>, png::EncodingError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder =
            png::Encoder::new(&mut buf, bitmap.width() as u32, bitmap.height() as u32);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::One);
        encoder.set_compression(png::Compression::Best);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(bitmap.data())?;
    }
    Ok(buf.into_inner())
}
