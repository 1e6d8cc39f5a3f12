use crate::error::LocusError;
use serde::{Deserialize, Serialize};

/// Index of the first breakpoint `value` is strictly below, or `breaks.len()`.
///
/// Missing and NaN values land in bucket 0. A value equal to a breakpoint
/// belongs to the bucket above it.
pub fn bucket(value: Option<f64>, breaks: &[f64]) -> usize {
    let Some(x) = value.filter(|x| !x.is_nan()) else {
        return 0;
    };
    breaks
        .iter()
        .position(|&b| x < b)
        .unwrap_or(breaks.len())
}

/// Discrete fill scale: `palette[i]` colors bucket `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub breaks: Vec<f64>,
    pub palette: Vec<String>,
}

impl ColorScale {
    /// LD (r²) coloring: grey for unknown, then blue through red.
    pub fn ld() -> Self {
        Self {
            breaks: vec![0.0, 0.2, 0.4, 0.6, 0.8],
            palette: ["#B8B8B8", "#357ebd", "#46b8da", "#5cb85c", "#eea236", "#d43f3a"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<(), LocusError> {
        if self.palette.len() != self.breaks.len() + 1 {
            return Err(LocusError::Config(format!(
                "color scale needs {} colors for {} breaks, got {}",
                self.breaks.len() + 1,
                self.breaks.len(),
                self.palette.len()
            )));
        }
        if self.breaks.iter().any(|b| !b.is_finite()) {
            return Err(LocusError::Config(
                "color scale breaks must be finite".to_string(),
            ));
        }
        if self.breaks.windows(2).any(|w| w[0] >= w[1]) {
            return Err(LocusError::Config(
                "color scale breaks must be strictly ascending".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fill(&self, value: Option<f64>) -> &str {
        let idx = bucket(value, &self.breaks).min(self.palette.len().saturating_sub(1));
        self.palette.get(idx).map(String::as_str).unwrap_or("#000000")
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::ld()
    }
}
