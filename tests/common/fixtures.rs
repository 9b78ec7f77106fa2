//! Test fixtures: bitmaps, containers and image folders.

use eink_dither::MonoBitmap;
use std::path::{Path, PathBuf};

use xtcpress::format::ContainerBuilder;
use xtcpress::models::{ConvertConfig, DisplaySpec, Metadata};
use xtcpress::services::ConversionContext;

/// Small display so pipeline tests stay fast
pub const TEST_WIDTH: usize = 48;
pub const TEST_HEIGHT: usize = 80;

/// Config for a 48x80 panel with plain thresholding
pub fn small_config() -> ConvertConfig {
    ConvertConfig {
        display: DisplaySpec::from_dimensions(TEST_WIDTH, TEST_HEIGHT).unwrap(),
        dither: eink_dither::DitherAlgorithm::None,
        ..Default::default()
    }
}

pub fn small_context() -> ConversionContext {
    ConversionContext::open(small_config()).unwrap()
}

/// 16x4 bitmap whose rows are filled with `seed`-derived bytes
pub fn pattern_bitmap(seed: u8) -> MonoBitmap {
    let data = (0..8u8).map(|i| seed.wrapping_mul(31).wrapping_add(i)).collect();
    MonoBitmap::from_packed(16, 4, data).unwrap()
}

/// Container with one pattern page per seed
pub fn container_bytes(seeds: &[u8], metadata: Option<&Metadata>) -> Vec<u8> {
    let mut builder = ContainerBuilder::new();
    for &seed in seeds {
        builder.push_bitmap(&pattern_bitmap(seed)).unwrap();
    }
    builder.finish(metadata).unwrap()
}

/// Write a container file and return its path
pub fn write_container(dir: &Path, name: &str, seeds: &[u8], metadata: Option<&Metadata>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, container_bytes(seeds, metadata)).unwrap();
    path
}

/// Write a gray PNG page
pub fn write_page(path: &Path, width: u32, height: u32, value: u8) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image::GrayImage::from_pixel(width, height, image::Luma([value]))
        .save(path)
        .unwrap();
}

/// Folder of `count` pages named 1.png..count.png
pub fn write_image_folder(dir: &Path, name: &str, count: usize, size: (u32, u32)) -> PathBuf {
    let folder = dir.join(name);
    std::fs::create_dir_all(&folder).unwrap();
    for i in 1..=count {
        write_page(&folder.join(format!("{i}.png")), size.0, size.1, (i * 20) as u8);
    }
    folder
}
