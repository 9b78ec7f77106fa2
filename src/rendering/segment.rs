//! Page segmentation: one preprocessed source page becomes 1..N
//! device-shaped pages.

use eink_dither::{resize_with_padding, rotate_cw, GrayImage};

use crate::models::{DisplaySpec, Orientation, SplitMode};

/// Fewest overlap segments tried
pub const MIN_OVERLAP_SEGMENTS: usize = 3;
/// Most overlap segments produced
pub const MAX_OVERLAP_SEGMENTS: usize = 10;
/// Segment count grows while consecutive segments overlap less than this
/// share of their height.
pub const MAX_SHIFT_RATIO: f64 = 0.95;

/// Position of an output page within its source page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTag {
    /// Whole source page
    Spread,
    /// Top (0) or bottom (1) half
    Half(usize),
    /// Overlap segment `i`
    Overlap(usize),
}

impl PageTag {
    /// Sortable label: `0_spread`, `2_a`, `2_b`, `3_a`, `3_b`, ...
    pub fn label(&self) -> String {
        match self {
            PageTag::Spread => "0_spread".to_string(),
            PageTag::Half(i) => format!("2_{}", letter(*i)),
            PageTag::Overlap(i) => format!("3_{}", letter(*i)),
        }
    }
}

fn letter(i: usize) -> char {
    char::from(b'a' + (i % 26) as u8)
}

/// A device-shaped grayscale page, ready for dithering
#[derive(Debug, Clone)]
pub struct Segment {
    pub tag: PageTag,
    pub image: GrayImage,
}

/// Vertical layout of overlapping segments over a tall page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapPlan {
    pub count: usize,
    pub shift: usize,
    pub segment_height: usize,
}

impl OverlapPlan {
    /// Plan segments for a `src_width x src_height` page shown rotated on a
    /// `target_width x target_height` panel.
    ///
    /// After rotation the source width spans the panel height, so one
    /// segment covers `floor(target_width / (target_height / src_width))`
    /// source rows.
    pub fn compute(
        src_width: usize,
        src_height: usize,
        target_width: usize,
        target_height: usize,
    ) -> Self {
        let segment_height = (target_width * src_width / target_height.max(1)).max(1);

        let shift_for = |n: usize| -> usize {
            let seg = segment_height as f64;
            let shift = seg - (seg * n as f64 - src_height as f64) / (n - 1) as f64;
            shift.floor().max(1.0) as usize
        };

        let mut count = MIN_OVERLAP_SEGMENTS;
        let mut shift = shift_for(count);
        while shift as f64 / segment_height as f64 > MAX_SHIFT_RATIO && count < MAX_OVERLAP_SEGMENTS {
            count += 1;
            shift = shift_for(count);
        }

        Self {
            count,
            shift,
            segment_height,
        }
    }

    /// `(y, height)` of every segment. The last one runs to the bottom edge.
    pub fn bands(&self, src_height: usize) -> Vec<(usize, usize)> {
        (0..self.count)
            .map(|i| {
                let y = (self.shift * i).min(src_height.saturating_sub(1));
                let height = if i + 1 == self.count {
                    src_height - y
                } else {
                    self.segment_height
                };
                (y, height.max(1))
            })
            .collect()
    }
}

/// Decides how each source page fans out onto the device.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    spec: DisplaySpec,
    orientation: Orientation,
    split_mode: SplitMode,
}

impl Segmenter {
    pub fn new(spec: DisplaySpec, orientation: Orientation, split_mode: SplitMode) -> Self {
        Self {
            spec,
            orientation,
            split_mode,
        }
    }

    pub fn spec(&self) -> DisplaySpec {
        self.spec
    }

    /// Produce the device-shaped pages for one preprocessed source page.
    pub fn segment(&self, page: &GrayImage) -> Vec<Segment> {
        let (w, h) = (page.width(), page.height());

        if self.orientation == Orientation::Portrait {
            return vec![Segment {
                tag: PageTag::Spread,
                image: self.fit(page),
            }];
        }

        let tall = h > w;
        match self.split_mode {
            SplitMode::Split if tall => {
                let top = h / 2;
                vec![
                    Segment {
                        tag: PageTag::Half(0),
                        image: self.fit_rotated(&page.rows(0, top)),
                    },
                    Segment {
                        tag: PageTag::Half(1),
                        image: self.fit_rotated(&page.rows(top, h - top)),
                    },
                ]
            }
            SplitMode::Overlap if tall => {
                let plan = OverlapPlan::compute(w, h, self.spec.width, self.spec.height);
                tracing::debug!(
                    segments = plan.count,
                    shift = plan.shift,
                    segment_height = plan.segment_height,
                    "Overlap split"
                );
                plan.bands(h)
                    .into_iter()
                    .enumerate()
                    .map(|(i, (y, band))| Segment {
                        tag: PageTag::Overlap(i),
                        image: self.fit_rotated(&page.rows(y, band)),
                    })
                    .collect()
            }
            _ => vec![Segment {
                tag: PageTag::Spread,
                image: self.fit_rotated(page),
            }],
        }
    }

    fn fit(&self, image: &GrayImage) -> GrayImage {
        resize_with_padding(image, self.spec.width, self.spec.height)
    }

    fn fit_rotated(&self, image: &GrayImage) -> GrayImage {
        self.fit(&rotate_cw(image))
    }
}
