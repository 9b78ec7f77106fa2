pub mod comic_info;
pub mod context;
pub mod converter;
pub mod merge_split;
pub mod outline;
pub mod page_mapping;
pub mod sources;

pub use comic_info::{parse_comic_info, ComicInfo};
pub use context::{CancelHandle, ConversionContext};
pub use converter::{
    convert, convert_batch, convert_path, encode_pages, page_name, render_page, BatchItem,
};
pub use merge_split::{merge, merge_containers, split, split_container, split_source};
pub use outline::{flatten_outline, DestinationResolver, OutlineNode};
pub use page_mapping::{MappingEntry, PageMapping};
pub use sources::{
    decode_image, natural_cmp, open_source, read_dir_entries, ArchiveEntry, ArchiveSource,
    DocumentSource, FsEntry, ImageFileSource, MemoryEntry, PageSource, SourceMetadata,
    SourcePage, XtcSource,
};
