use geo::{coord, Coord, Polygon, Rect};

/// A single recognized word, in normalized image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub text: String,
    pub bounds: Rect<f64>,
}

/// A recognized line of text within one frame.
///
/// `row` stays `None` until the line has been clustered. `excluded` lines are
/// not drawn and do not contribute to the results table.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub bounds: Rect<f64>,
    pub row: Option<f64>,
    pub corner_points: Option<Vec<Coord<f64>>>,
    pub elements: Vec<TextElement>,
    pub excluded: bool,
}

impl TextLine {
    /// Builds a line from its elements, joining their text with single spaces.
    ///
    /// The line box is `min(x)`, `min(y)` over the elements, with the *sum* of
    /// their widths and heights as its size. Lines without elements collapse
    /// to an empty box at the origin.
    pub fn from_elements(
        elements: Vec<TextElement>,
        corner_points: Option<Vec<Coord<f64>>>,
    ) -> Self {
        let text = elements
            .iter()
            .map(|it| it.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let bounds = summed_bounds(&elements);
        Self {
            text,
            bounds,
            row: None,
            corner_points,
            elements,
            excluded: false,
        }
    }

    pub fn width(&self) -> f64 {
        self.bounds.width()
    }
}

fn summed_bounds(elements: &[TextElement]) -> Rect<f64> {
    if elements.is_empty() {
        return Rect::new(Coord::zero(), Coord::zero());
    }
    let x = elements
        .iter()
        .map(|it| it.bounds.min().x)
        .fold(f64::INFINITY, f64::min);
    let y = elements
        .iter()
        .map(|it| it.bounds.min().y)
        .fold(f64::INFINITY, f64::min);
    let width = elements.iter().map(|it| it.bounds.width()).sum::<f64>();
    let height = elements.iter().map(|it| it.bounds.height()).sum::<f64>();
    Rect::new(
        coord! { x: x, y: y },
        coord! { x: x + width, y: y + height },
    )
}

/// One row of the results table.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    pub row: f64,
    pub texts: Vec<String>,
}

/// A highlight polygon in display coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub outline: Polygon<f64>,
}

/// A floating text label in display coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub rect: Rect<f64>,
}

/// Everything that gets drawn for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameAnnotations {
    pub shapes: Vec<Shape>,
    pub labels: Vec<Label>,
    pub table: Vec<RowGroup>,
}

impl FrameAnnotations {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.labels.is_empty() && self.table.is_empty()
    }
}
