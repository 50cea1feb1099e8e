//! Input side: what a text recognizer hands back for one frame.
//!
//! Coordinates here are image pixels. [`Recognition::into_lines`] turns the
//! block → line → element hierarchy into flat, normalized [`TextLine`]s.

use std::path::Path;

use geo::{coord, Coord, Rect};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    util::{normalize_point, normalize_rect},
    Error, Result, TextElement, TextLine,
};

/// Axis-aligned box in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn to_rect(self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.x, y: self.y },
            coord! { x: self.x + self.width, y: self.y + self.height },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedElement {
    pub text: String,
    pub frame: PixelRect,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecognizedLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_points: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub elements: Vec<RecognizedElement>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecognizedBlock {
    #[serde(default)]
    pub lines: Vec<RecognizedLine>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recognition {
    #[serde(default)]
    pub blocks: Vec<RecognizedBlock>,
}

impl Recognition {
    pub fn line_count(&self) -> usize {
        self.blocks.iter().map(|block| block.lines.len()).sum()
    }

    /// Flattens all blocks into lines, dividing every coordinate by the image
    /// size so the result lives in `[0,1]×[0,1]`.
    #[instrument(level = "debug", skip(self), fields(lines = self.line_count()))]
    pub fn into_lines(self, width: u32, height: u32) -> Vec<TextLine> {
        let (width, height) = (width as f64, height as f64);
        self.blocks
            .into_iter()
            .flat_map(|block| block.lines)
            .map(|line| {
                let elements = line
                    .elements
                    .into_iter()
                    .map(|element| TextElement {
                        text: element.text,
                        bounds: normalize_rect(element.frame.to_rect(), width, height),
                    })
                    .collect();
                let corner_points = line.corner_points.map(|points| {
                    points
                        .into_iter()
                        .map(|[x, y]| normalize_point(Coord { x, y }, width, height))
                        .collect()
                });
                TextLine::from_elements(elements, corner_points)
            })
            .collect()
    }
}

/// A video frame handed to the recognizer.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: DynamicImage,
}

impl Frame {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Anything that can turn a frame into recognized text.
///
/// Implementations may block; the pipeline calls them off the async executor.
pub trait TextRecognizer: Send + Sync + 'static {
    fn recognize(&self, frame: &Frame) -> Result<Recognition>;
}

impl<F> TextRecognizer for F
where
    F: Fn(&Frame) -> Result<Recognition> + Send + Sync + 'static,
{
    fn recognize(&self, frame: &Frame) -> Result<Recognition> {
        self(frame)
    }
}

/// A recognition result saved together with the size of its source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub width: u32,
    pub height: u32,
    #[serde(flatten)]
    pub recognition: Recognition,
}

impl RecordedFrame {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let frame: Self = serde_json::from_str(&raw)?;
        log::debug!(
            "Loaded {} recognized lines from {path:?} ({}x{})",
            frame.recognition.line_count(),
            frame.width,
            frame.height
        );
        Ok(frame)
    }

    pub fn into_lines(self) -> Vec<TextLine> {
        self.recognition.into_lines(self.width, self.height)
    }
}
