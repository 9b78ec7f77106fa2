//! Error diffusion kernel definitions.
//!
//! Each kernel specifies how quantization error is distributed to
//! neighboring pixels that have not been visited yet.

/// An error diffusion kernel.
///
/// Each entry is an offset `(dx, dy)` and a weight. A neighbor receives
/// `error * weight / divisor`.
///
/// # Error Propagation
///
/// The total error propagated is `sum(weights) / divisor`. Floyd-Steinberg
/// and Sierra Lite propagate 100%; Atkinson propagates 75% and discards the
/// rest, which lightens midtones.
///
/// # Buffer Sizing
///
/// `max_dy` is how many rows ahead the kernel reaches, so the error buffer
/// needs `max_dy + 1` rows.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    /// (dx, dy, weight) entries. `dy` is never negative and entries with
    /// `dy == 0` always have `dx > 0`, so error only reaches unvisited pixels.
    pub entries: &'static [(i32, i32, u8)],

    /// Total divisor for normalizing weights.
    pub divisor: u8,

    /// Maximum dy value in entries.
    pub max_dy: usize,
}

/// Atkinson dithering kernel.
///
/// Six neighbors receive 1/8 each (75% total).
///
/// ```text
///        X   1   1
///    1   1   1
///        1
/// ```
pub const ATKINSON: Kernel = Kernel {
    entries: &[
        (1, 0, 1),  // right
        (2, 0, 1),  // two right
        (-1, 1, 1), // bottom-left
        (0, 1, 1),  // bottom
        (1, 1, 1),  // bottom-right
        (0, 2, 1),  // two below
    ],
    divisor: 8,
    max_dy: 2,
};

/// Floyd-Steinberg dithering kernel.
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[
        (1, 0, 7),  // right
        (-1, 1, 3), // bottom-left
        (0, 1, 5),  // bottom
        (1, 1, 1),  // bottom-right
    ],
    divisor: 16,
    max_dy: 1,
};

/// Sierra Lite dithering kernel.
///
/// ```text
///    X   2
///    1   1
/// ```
pub const SIERRA_LITE: Kernel = Kernel {
    entries: &[(1, 0, 2), (-1, 1, 1), (0, 1, 1)],
    divisor: 4,
    max_dy: 1,
};
