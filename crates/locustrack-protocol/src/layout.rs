use serde::{Deserialize, Serialize};

/// Horizontal anchoring of a gene label within its display range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Pixel extent a gene occupies on its track, label room included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub start: f64,
    pub end: f64,
    pub width: f64,
    pub text_anchor: TextAnchor,
}

impl DisplayRange {
    /// x coordinate a label with this range's anchor is drawn at.
    pub fn label_x(&self) -> f64 {
        match self.text_anchor {
            TextAnchor::Start => self.start,
            TextAnchor::Middle => self.start + self.width / 2.0,
            TextAnchor::End => self.end,
        }
    }
}

/// The display range projected back into genomic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayDomain {
    pub start: f64,
    pub end: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenePlacement {
    /// 1-based track number.
    pub track: usize,
    pub display_range: DisplayRange,
    pub display_domain: DisplayDomain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_x_follows_anchor() {
        let mut range = DisplayRange {
            start: 10.0,
            end: 90.0,
            width: 80.0,
            text_anchor: TextAnchor::Middle,
        };
        assert_eq!(range.label_x(), 50.0);
        range.text_anchor = TextAnchor::Start;
        assert_eq!(range.label_x(), 10.0);
        range.text_anchor = TextAnchor::End;
        assert_eq!(range.label_x(), 90.0);
    }

    #[test]
    fn test_anchor_serializes_lowercase() {
        let text = serde_json::to_string(&TextAnchor::End).unwrap();
        assert_eq!(text, "\"end\"");
        assert_eq!(TextAnchor::Start.as_str(), "start");
    }
}
