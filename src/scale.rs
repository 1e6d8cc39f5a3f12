//! Mapping between genomic (domain) coordinates and pixels.

use crate::error::LayoutError;

/// A domain ↔ pixel mapping supplied to layers by their panel.
pub trait Scale {
    fn forward(&self, domain: f64) -> f64;
    fn invert(&self, pixel: f64) -> f64;
}

/// Linear interpolation between two domain values and two pixel values.
/// Either interval may be descending (y axes grow downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self, LayoutError> {
        for (what, value) in [
            ("domain start", domain.0),
            ("domain end", domain.1),
            ("range start", range.0),
            ("range end", range.1),
        ] {
            if !value.is_finite() {
                return Err(LayoutError::NonFinite {
                    what: what.to_string(),
                });
            }
        }
        if domain.0 == domain.1 {
            return Err(LayoutError::EmptyWindow {
                start: domain.0,
                end: domain.1,
            });
        }
        if range.0 == range.1 {
            return Err(LayoutError::DegenerateScale);
        }
        Ok(Self { domain, range })
    }

    #[inline(always)]
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    #[inline(always)]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }
}

impl Scale for LinearScale {
    fn forward(&self, domain: f64) -> f64 {
        let t = (domain - self.domain.0) / (self.domain.1 - self.domain.0);
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    fn invert(&self, pixel: f64) -> f64 {
        let t = (pixel - self.range.0) / (self.range.1 - self.range.0);
        self.domain.0 + t * (self.domain.1 - self.domain.0)
    }
}
