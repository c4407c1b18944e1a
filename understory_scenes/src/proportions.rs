// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fit-to-viewport sizing: the largest rectangle of a fixed aspect ratio that
//! fits entirely inside the viewport.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Size;
//! use understory_scenes::proportions::AspectRatio;
//!
//! let ratio: AspectRatio = "16:9".parse().unwrap();
//! // Wide viewport: height is the limiting side.
//! assert_eq!(ratio.fit(Size::new(2000.0, 900.0)), Size::new(1600.0, 900.0));
//! // Tall viewport: width is the limiting side.
//! assert_eq!(ratio.fit(Size::new(1600.0, 2000.0)), Size::new(1600.0, 900.0));
//! ```

use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use kurbo::Size;

use crate::error::ParseAspectRatioError;
use crate::types::Host;

/// A width:height ratio such as `16:9`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AspectRatio {
    width: u32,
    height: u32,
}

impl AspectRatio {
    /// Create a ratio. Returns `None` if either side is zero.
    pub const fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            None
        } else {
            Some(Self { width, height })
        }
    }

    /// Width component.
    pub const fn width(self) -> u32 {
        self.width
    }

    /// Height component.
    pub const fn height(self) -> u32 {
        self.height
    }

    /// Width divided by height.
    pub fn ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Largest size of this ratio that fits within `viewport`.
    ///
    /// Tries the full viewport width first; if the derived height overflows,
    /// uses the full height instead. No rounding is applied.
    pub fn fit(self, viewport: Size) -> Size {
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        // Multiply before dividing so exact ratios such as 16:9 stay exact.
        let mut width = viewport.width;
        let mut height = viewport.width * h / w;

        if height > viewport.height {
            width = viewport.height * w / h;
            height = viewport.height;
        }

        Size::new(width, height)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = ParseAspectRatioError;

    /// Parse `"W:H"`, or the resolution form `"WxH"` (e.g. `"1280x720"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(':')
            .or_else(|| s.split_once('x'))
            .ok_or_else(|| ParseAspectRatioError::MissingSeparator(s.to_string()))?;
        let component = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| ParseAspectRatioError::InvalidComponent(part.to_string()))
        };
        Self::new(component(w)?, component(h)?).ok_or(ParseAspectRatioError::Zero)
    }
}

/// Format `value` followed by `unit`, e.g. `10` and `"%"` → `"10%"`.
pub fn to_unit(value: f64, unit: &str) -> String {
    format!("{value}{unit}")
}

/// Format `value` as a CSS pixel length.
pub fn to_px(value: f64) -> String {
    to_unit(value, "px")
}

/// Size `host` to the largest `ratio` rectangle fitting `viewport`.
///
/// Writes `width` and `height` inline styles as `"<number>px"`.
pub fn set_proportions<H: Host + ?Sized>(host: &mut H, ratio: AspectRatio, viewport: Size) {
    let size = ratio.fit(viewport);
    host.set_style("width", Some(&to_px(size.width)));
    host.set_style("height", Some(&to_px(size.height)));
}

/// Remove the inline sizing written by [`set_proportions`].
pub fn clear_proportions<H: Host + ?Sized>(host: &mut H) {
    host.set_style("width", None);
    host.set_style("height", None);
}
