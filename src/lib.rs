use std::collections::HashSet;

mod config;
mod error;
pub mod pipeline;
pub mod recognition;
pub mod render;
mod result;
pub mod rows;
pub mod util;

pub use config::*;
pub use error::*;
pub use pipeline::{FrameProcessor, LatestAnnotations};
pub use recognition::{Frame, Recognition, RecordedFrame, TextRecognizer};
pub use render::{ImageSurface, RenderSurface};
pub use result::*;
use tracing::instrument;
pub use util::DisplayTransform;

pub struct RowFilterBuilder {
    tolerance: f64,
    keywords: Vec<String>,
}

impl RowFilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: RowFilterConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            keywords: config.keywords,
        }
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Replaces the keyword list.
    pub fn keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    #[instrument(skip(self), level = "debug")]
    pub fn build(self) -> Result<RowFilter> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidTolerance(self.tolerance));
        }
        if self.keywords.is_empty() {
            return Err(Error::NoKeywords);
        }
        if let Some(index) = self.keywords.iter().position(|it| it.trim().is_empty()) {
            return Err(Error::BlankKeyword(index));
        }
        let mut keywords = self
            .keywords
            .iter()
            .map(|it| it.trim().to_lowercase())
            .collect::<Vec<_>>();
        let mut seen = HashSet::new();
        keywords.retain(|it| seen.insert(it.clone()));
        log::debug!(
            "Row filter with tolerance {} and keywords {keywords:?}",
            self.tolerance
        );
        Ok(RowFilter {
            tolerance: self.tolerance,
            keywords,
        })
    }
}

impl Default for RowFilterBuilder {
    fn default() -> Self {
        Self::from_config(RowFilterConfig::default())
    }
}

/// Clusters the recognized lines of a frame into rows and keeps the ones
/// relevant to the configured keywords.
#[derive(Debug, Clone)]
pub struct RowFilter {
    tolerance: f64,
    keywords: Vec<String>,
}

impl RowFilter {
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn classify(&self, lines: &[TextLine]) -> Vec<bool> {
        rows::classify(lines, &self.keywords)
    }

    pub fn rescue(&self, lines: &[TextLine], excluded: &[bool]) -> Vec<bool> {
        rows::rescue(lines, excluded, self.tolerance)
    }

    /// Assigns rows and exclusion flags to a frame's lines.
    ///
    /// A frame without lines, or whose lines have no width at all, comes back
    /// empty: there is nothing to annotate. Keyword lines are dropped in that
    /// case too, since they have no row to be placed on.
    #[instrument(skip(self, lines), fields(count = lines.len()))]
    pub fn cluster(&self, mut lines: Vec<TextLine>) -> Vec<TextLine> {
        if !rows::assign_rows(&mut lines) {
            return Vec::new();
        }
        let excluded = self.classify(&lines);
        let excluded = self.rescue(&lines, &excluded);
        for (line, excluded) in lines.iter_mut().zip(excluded) {
            line.excluded = excluded;
        }
        log::debug!(
            "{} of {} lines kept",
            lines.iter().filter(|it| !it.excluded).count(),
            lines.len()
        );
        lines
    }

    pub fn group(&self, lines: &[TextLine]) -> Vec<RowGroup> {
        rows::group_rows(lines, self.tolerance)
    }

    /// Clusters the lines and builds everything to draw for them.
    #[instrument(skip(self, lines, transform), fields(count = lines.len()))]
    pub fn annotate(&self, lines: Vec<TextLine>, transform: &DisplayTransform) -> FrameAnnotations {
        let lines = self.cluster(lines);
        let table = self.group(&lines);
        FrameAnnotations::build(&lines, table, transform)
    }
}

impl Default for RowFilter {
    fn default() -> Self {
        Self {
            tolerance: rows::ROW_TOLERANCE,
            keywords: NUTRITION_KEYWORDS.iter().map(|it| it.to_string()).collect(),
        }
    }
}
