//! Binary page formats: XTG single pages and XTC containers.

pub mod bytes;
pub mod detect;
pub mod xtc;
pub mod xtg;

pub use detect::{detect_input, has_xtc_magic, is_image_path, InputKind, IMAGE_EXTENSIONS};
pub use xtc::{
    decode_container, encode_container, ContainerBuilder, ContainerHeader, ContainerLayout,
    DecodedContainer, PageIndexEntry, RawPage,
};
pub use xtg::{decode_xtg, decode_xtg_raster, encode_xtg, XtgHeader};
