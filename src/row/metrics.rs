//! Process-wide row sizing configuration.
//!
//! Layout code estimates a row's height before the row exists, so the font
//! size is a property of the process rather than of any row instance. It is
//! installed once (usually from the resolved config) and never changes
//! afterwards. The minimum row height is a constant no configuration lowers.
//!
//! One terminal line is `default_font_size * line_spacing` layout units.

use crate::row::wrap::wrap_text;
use std::sync::OnceLock;
use thiserror::Error;

/// Default body font size in layout units.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Floor height of any message row in layout units.
pub const MINIMUM_ROW_HEIGHT: f32 = 30.0;

/// Default line height as a multiple of the font size.
pub const DEFAULT_LINE_SPACING: f32 = 1.25;

static INSTALLED: OnceLock<RowMetrics> = OnceLock::new();

/// Errors raised when building or installing [`RowMetrics`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    /// Metrics were already installed (or already read) for this process.
    #[error("Row metrics are already installed for this process")]
    AlreadyInstalled,

    /// A value was non-finite or out of range.
    #[error("Invalid row metric {field}: {value}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
}

/// Sizing values shared by every row in the process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    default_font_size: f32,
    line_spacing: f32,
}

impl Default for RowMetrics {
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
            line_spacing: DEFAULT_LINE_SPACING,
        }
    }
}

impl RowMetrics {
    /// Build metrics with the default line spacing.
    ///
    /// # Errors
    ///
    /// `font_size` must be finite and positive.
    pub fn new(font_size: f32) -> Result<Self, MetricsError> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(MetricsError::Invalid {
                field: "default_font_size",
                value: font_size,
            });
        }
        Ok(Self {
            default_font_size: font_size,
            line_spacing: DEFAULT_LINE_SPACING,
        })
    }

    /// Replace the line spacing factor.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Invalid`] unless `spacing` is finite and positive.
    pub fn with_line_spacing(mut self, spacing: f32) -> Result<Self, MetricsError> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(MetricsError::Invalid {
                field: "line_spacing",
                value: spacing,
            });
        }
        self.line_spacing = spacing;
        Ok(self)
    }

    /// Install `metrics` as the process-wide value.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::AlreadyInstalled`] if metrics were installed
    /// before, or if [`RowMetrics::current`] already fell back to defaults.
    pub fn install(metrics: RowMetrics) -> Result<&'static RowMetrics, MetricsError> {
        INSTALLED
            .set(metrics)
            .map_err(|_| MetricsError::AlreadyInstalled)?;
        tracing::debug!(?metrics, "Row metrics installed");
        Ok(INSTALLED.get_or_init(RowMetrics::default))
    }

    /// The process-wide metrics, falling back to defaults when nothing was
    /// installed.
    pub fn current() -> &'static RowMetrics {
        INSTALLED.get_or_init(RowMetrics::default)
    }

    /// Font size used to estimate row heights.
    pub fn default_font_size(&self) -> f32 {
        self.default_font_size
    }

    /// Floor height of a row; always [`MINIMUM_ROW_HEIGHT`].
    pub fn minimum_row_height(&self) -> f32 {
        MINIMUM_ROW_HEIGHT
    }

    /// Line spacing factor.
    pub fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    /// Height of one text line (and of one terminal line) in layout units.
    pub fn line_height(&self) -> f32 {
        self.default_font_size * self.line_spacing
    }

    /// Estimated height of a row showing `text` in `columns` columns.
    ///
    /// Never less than [`minimum_row_height`](Self::minimum_row_height).
    pub fn estimate_height(&self, text: &str, columns: u16) -> f32 {
        self.height_for_lines(wrap_text(text, usize::from(columns)).len())
    }

    /// Height of a row holding `lines` text lines, floored at the minimum.
    pub fn height_for_lines(&self, lines: usize) -> f32 {
        (lines as f32 * self.line_height()).max(MINIMUM_ROW_HEIGHT)
    }

    /// Convert a layout height to whole terminal lines (at least one).
    pub fn terminal_rows(&self, height: f32) -> u16 {
        let rows = (height / self.line_height()).ceil();
        if rows >= f32::from(u16::MAX) {
            u16::MAX
        } else {
            (rows as u16).max(1)
        }
    }
}
