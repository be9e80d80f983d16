//! Media descriptor models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a video's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// 16:9
    Landscape,
    /// 9:16
    Portrait,
    /// Anything else
    Other,
}

impl Orientation {
    /// Classify a frame size.
    ///
    /// The ratio is rounded to two decimal places, so minor encoding variance
    /// around 16:9 (1.78) and 9:16 (0.56) still lands in the right bin.
    pub fn classify(width: u32, height: u32) -> Self {
        if height == 0 {
            return Orientation::Other;
        }

        let ratio = width as f64 / height as f64;
        match (ratio * 100.0).round() as i64 {
            178 => Orientation::Landscape,
            56 => Orientation::Portrait,
            _ => Orientation::Other,
        }
    }

    /// Path segment used in storage keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Facts derived from probing a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MediaDescriptor {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Classified orientation
    pub orientation: Orientation,
}

impl MediaDescriptor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            orientation: Orientation::classify(width, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_canonical_sizes() {
        assert_eq!(Orientation::classify(1920, 1080), Orientation::Landscape);
        assert_eq!(Orientation::classify(1080, 1920), Orientation::Portrait);
        assert_eq!(Orientation::classify(640, 480), Orientation::Other);
    }

    #[test]
    fn test_classify_tolerates_rounding() {
        // 854x480 is 1.779...
        assert_eq!(Orientation::classify(854, 480), Orientation::Landscape);
        // 608x1080 is 0.562...
        assert_eq!(Orientation::classify(608, 1080), Orientation::Portrait);
        // Square and ultra-wide stay out of both bins
        assert_eq!(Orientation::classify(1080, 1080), Orientation::Other);
        assert_eq!(Orientation::classify(2560, 1080), Orientation::Other);
    }

    #[test]
    fn test_classify_zero_height() {
        assert_eq!(Orientation::classify(1920, 0), Orientation::Other);
        assert_eq!(Orientation::classify(0, 0), Orientation::Other);
    }

    #[test]
    fn test_descriptor_carries_orientation() {
        let descriptor = MediaDescriptor::new(1280, 720);
        assert_eq!(descriptor.orientation, Orientation::Landscape);
        assert_eq!(descriptor.orientation.as_str(), "landscape");
    }
}
