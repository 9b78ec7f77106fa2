//! ComicInfo.xml sidecar parsing.
//!
//! Only the fields that end up in container metadata are read: `Title`,
//! `Writer` and page bookmarks (`<Page Image="n" Bookmark="..."/>`).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::models::ChapterMarker;

/// Sidecar file name, matched case-insensitively
pub const COMIC_INFO_FILE: &str = "ComicInfo.xml";

/// Metadata read from a ComicInfo.xml sidecar
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComicInfo {
    pub title: Option<String>,
    pub writer: Option<String>,
    /// Bookmarks with 1-indexed pages
    pub bookmarks: Vec<ChapterMarker>,
}

/// Parse ComicInfo.xml text.
pub fn parse_comic_info(xml: &str) -> Result<ComicInfo, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut info = ComicInfo::default();
    let mut current: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = element_name(e)?;
                if name == "Page" {
                    read_page(e, &mut info)?;
                }
                current = Some(name);
            }
            Ok(Event::Empty(ref e)) => {
                if element_name(e)? == "Page" {
                    read_page(e, &mut info)?;
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| format!("Text decode error: {}", e))?;
                let text = text.trim();
                match current.as_deref() {
                    Some("Title") if !text.is_empty() => info.title = Some(text.to_string()),
                    Some("Writer") if !text.is_empty() => info.writer = Some(text.to_string()),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(info)
}

fn element_name(element: &BytesStart) -> Result<String, String> {
    let binding = element.name();
    std::str::from_utf8(binding.as_ref())
        .map(str::to_string)
        .map_err(|_| "Invalid UTF-8 in element name".to_string())
}

fn read_page(element: &BytesStart, info: &mut ComicInfo) -> Result<(), String> {
    let mut image: Option<usize> = None;
    let mut bookmark: Option<String> = None;

    for attr in element.attributes() {
        let attr = attr.map_err(|e| format!("Attribute error: {}", e))?;
        let value = attr
            .unescape_value()
            .map_err(|e| format!("Attribute decode error: {}", e))?;
        match attr.key.as_ref() {
            b"Image" => image = value.trim().parse().ok(),
            b"Bookmark" => bookmark = Some(value.trim().to_string()),
            _ => {}
        }
    }

    if let (Some(image), Some(title)) = (image, bookmark) {
        if !title.is_empty() {
            info.bookmarks.push(ChapterMarker::new(title, image + 1));
        }
    }
    Ok(())
}
