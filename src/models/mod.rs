pub mod config;
pub mod display_spec;
pub mod page_range;
pub mod toc;

pub use config::{ConvertConfig, Orientation, OutputFormat, SplitMode, CONFIG_ENV};
pub use display_spec::{DisplaySpec, TARGET_H, TARGET_W};
pub use page_range::{parse_ranges, PageRange};
pub use toc::{
    chapters_from_markers, clip_chapters, shift_chapters, ChapterMarker, Metadata, TocEntry,
};
