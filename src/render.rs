//! Output side: turning clustered lines into draw requests.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::{
    drawing::{draw_hollow_polygon_mut, draw_hollow_rect_mut},
    rect::Rect as PixelRect,
};
use tracing::instrument;

use crate::{
    util::{to_imageproc_points, DisplayTransform},
    FrameAnnotations, Label, RowGroup, Shape, TextLine,
};

const SHAPE_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const LABEL_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Something annotations can be drawn on.
pub trait RenderSurface {
    /// Removes every shape, label and table drawn so far.
    fn clear(&mut self);
    fn draw_shape(&mut self, shape: &Shape);
    fn place_label(&mut self, label: &Label);
    /// Replaces the results table.
    fn show_table(&mut self, rows: &[RowGroup]);
}

impl FrameAnnotations {
    /// Builds the draw requests for the kept lines of a clustered frame.
    ///
    /// `table` is passed in already grouped so the row tolerance stays owned
    /// by the filter.
    #[instrument(level = "debug", skip_all, fields(lines = lines.len()))]
    pub fn build(lines: &[TextLine], table: Vec<RowGroup>, transform: &DisplayTransform) -> Self {
        let kept = lines.iter().filter(|line| !line.excluded);

        let shapes = kept
            .clone()
            .filter_map(|line| line.corner_points.as_deref())
            .map(|points| Shape {
                outline: transform.polygon(points),
            })
            .collect::<Vec<_>>();

        let labels = kept
            .flat_map(|line| &line.elements)
            .map(|element| Label {
                text: element.text.clone(),
                rect: transform.rect(element.bounds),
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Built {} shapes, {} labels and {} table rows",
            shapes.len(),
            labels.len(),
            table.len()
        );
        Self {
            shapes,
            labels,
            table,
        }
    }

    /// Clears the surface, then draws this frame onto it.
    pub fn apply(&self, surface: &mut impl RenderSurface) {
        surface.clear();
        for shape in &self.shapes {
            surface.draw_shape(shape);
        }
        for label in &self.labels {
            surface.place_label(label);
        }
        if !self.table.is_empty() {
            surface.show_table(&self.table);
        }
    }
}

/// Rasterizes annotations on top of a copy of a frame.
///
/// Label text is not rendered (no font is bundled); label boxes are outlined
/// and the texts are kept alongside the table for callers to read back.
#[derive(Debug, Clone)]
pub struct ImageSurface {
    background: RgbaImage,
    canvas: RgbaImage,
    labels: Vec<Label>,
    table: Vec<RowGroup>,
}

impl ImageSurface {
    pub fn new(image: &DynamicImage) -> Self {
        let background = image.to_rgba8();
        Self {
            canvas: background.clone(),
            background,
            labels: Vec::new(),
            table: Vec::new(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn table(&self) -> &[RowGroup] {
        &self.table
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }
}

impl RenderSurface for ImageSurface {
    fn clear(&mut self) {
        self.canvas.clone_from(&self.background);
        self.labels.clear();
        self.table.clear();
    }

    fn draw_shape(&mut self, shape: &Shape) {
        let points = to_imageproc_points(&shape.outline);
        if points.len() < 2 || points.first() == points.last() {
            log::trace!("Skipping degenerate shape {:?}", shape.outline);
            return;
        }
        draw_hollow_polygon_mut(&mut self.canvas, &points, SHAPE_COLOR);
    }

    fn place_label(&mut self, label: &Label) {
        let min = label.rect.min();
        let rect = PixelRect::at(min.x.round() as i32, min.y.round() as i32).of_size(
            (label.rect.width().round() as u32).max(1),
            (label.rect.height().round() as u32).max(1),
        );
        draw_hollow_rect_mut(&mut self.canvas, rect, LABEL_COLOR);
        self.labels.push(label.clone());
    }

    fn show_table(&mut self, rows: &[RowGroup]) {
        self.table = rows.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use geo::{coord, Rect};

    use super::*;
    use crate::TextElement;

    fn kept_line(text: &str, excluded: bool) -> TextLine {
        let bounds = Rect::new(coord! { x: 0.1, y: 0.1 }, coord! { x: 0.3, y: 0.2 });
        TextLine {
            text: text.to_string(),
            bounds,
            row: Some(1.0),
            corner_points: Some(vec![
                coord! { x: 0.1, y: 0.1 },
                coord! { x: 0.3, y: 0.1 },
                coord! { x: 0.3, y: 0.2 },
                coord! { x: 0.1, y: 0.2 },
            ]),
            elements: vec![TextElement {
                text: text.to_string(),
                bounds,
            }],
            excluded,
        }
    }

    #[test]
    fn only_kept_lines_are_annotated() {
        let lines = vec![kept_line("Sugar", false), kept_line("Protein", true)];
        let transform = DisplayTransform::aspect_fill((100, 100), (100.0, 100.0));
        let annotations = FrameAnnotations::build(&lines, vec![], &transform);
        assert_eq!(annotations.shapes.len(), 1);
        assert_eq!(annotations.labels.len(), 1);
        assert_eq!(annotations.labels[0].text, "Sugar");
        let rect = annotations.labels[0].rect;
        assert!((rect.min().x - 10.0).abs() < 1e-9);
        assert!((rect.max().y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn lines_without_corners_draw_no_shape() {
        let mut line = kept_line("Salt", false);
        line.corner_points = None;
        let annotations =
            FrameAnnotations::build(&[line], vec![], &DisplayTransform::identity());
        assert!(annotations.shapes.is_empty());
        assert_eq!(annotations.labels.len(), 1);
    }

    #[test]
    fn image_surface_draws_and_clears() {
        let image = DynamicImage::new_rgba8(100, 100);
        let mut surface = ImageSurface::new(&image);
        let lines = vec![kept_line("Fat", false)];
        let table = vec![RowGroup {
            row: 1.0,
            texts: vec!["Fat".into()],
        }];
        let transform = DisplayTransform::aspect_fill((100, 100), (100.0, 100.0));
        FrameAnnotations::build(&lines, table, &transform).apply(&mut surface);

        assert_eq!(surface.labels().len(), 1);
        assert_eq!(surface.table().len(), 1);
        assert!(surface.image().pixels().any(|it| *it == SHAPE_COLOR));

        FrameAnnotations::default().apply(&mut surface);
        assert!(surface.labels().is_empty());
        assert!(surface.table().is_empty());
        assert!(surface.image().pixels().all(|it| *it == Rgba([0, 0, 0, 0])));
    }
}
