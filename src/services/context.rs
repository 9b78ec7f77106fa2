//! Conversion session state.

use eink_dither::EinkDitherer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ConvertError;
use crate::models::{ConvertConfig, DisplaySpec};
use crate::rendering::Segmenter;

/// Cloneable cancellation flag, checked between pages.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Running conversions stop at the next page.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Validated settings and shared state for a series of conversions.
///
/// Opened once, passed to every conversion call, closed when done. Calls on
/// a closed context fail with [`ConvertError::ContextClosed`].
#[derive(Debug)]
pub struct ConversionContext {
    config: ConvertConfig,
    spec: DisplaySpec,
    ditherer: EinkDitherer,
    segmenter: Segmenter,
    cancel: CancelHandle,
    open: bool,
}

impl ConversionContext {
    pub fn open(config: ConvertConfig) -> Result<Self, ConvertError> {
        let spec = DisplaySpec::from_dimensions(config.display.width, config.display.height)?;
        let options = config.preprocess_options();
        if options.contrast != config.contrast {
            tracing::warn!(
                requested = config.contrast,
                used = options.contrast,
                "Contrast level clamped"
            );
        }
        let ditherer = EinkDitherer::new()
            .preprocess_options(options)
            .algorithm(config.dither);
        let segmenter = Segmenter::new(spec, config.orientation, config.split_mode);

        tracing::debug!(
            width = spec.width,
            height = spec.height,
            dither = %config.dither,
            orientation = ?config.orientation,
            split_mode = ?config.split_mode,
            "Opened conversion context"
        );

        Ok(Self {
            config,
            spec,
            ditherer,
            segmenter,
            cancel: CancelHandle::new(),
            open: true,
        })
    }

    /// End the session. Further conversions fail.
    pub fn close(&mut self) {
        if self.open {
            tracing::debug!("Closed conversion context");
        }
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Handle that can cancel conversions running on this context.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Fail if the context is closed or cancellation was requested.
    pub fn checkpoint(&self) -> Result<(), ConvertError> {
        if !self.open {
            return Err(ConvertError::ContextClosed);
        }
        if self.cancel.is_cancelled() {
            return Err(ConvertError::Cancelled);
        }
        Ok(())
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn spec(&self) -> DisplaySpec {
        self.spec
    }

    pub fn ditherer(&self) -> &EinkDitherer {
        &self.ditherer
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }
}
