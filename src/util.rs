use geo::{coord, Coord, LineString, Polygon, Rect};
use imageproc::point::Point;
use nalgebra::{Matrix3, Point2, Vector2};

/// Rounds half away from zero to `places` decimal places.
pub(crate) fn round_to(value: f64, places: u32) -> f64 {
    let divisor = 10f64.powi(places as i32);
    (value * divisor).round() / divisor
}

/// Maps normalized image coordinates (`[0,1]×[0,1]`) onto a display.
///
/// Uses aspect-fill: the image is scaled until it covers the whole display,
/// then centred, so whatever overflows is cropped equally on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    matrix: Matrix3<f64>,
}

impl DisplayTransform {
    pub fn aspect_fill(image_size: (u32, u32), display_size: (f64, f64)) -> Self {
        let (image_width, image_height) = (image_size.0 as f64, image_size.1 as f64);
        let (display_width, display_height) = display_size;
        let scale = (display_width / image_width).max(display_height / image_height);
        let scaled = Vector2::new(image_width * scale, image_height * scale);
        let offset = Vector2::new(
            (display_width - scaled.x) / 2.0,
            (display_height - scaled.y) / 2.0,
        );
        log::trace!(
            "Aspect fill from (w: {image_width}, h: {image_height}) onto (w: {display_width}, h: {display_height}), scale {scale}, offset {offset:?}."
        );
        Self {
            matrix: Matrix3::new_nonuniform_scaling(&scaled).append_translation(&offset),
        }
    }

    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    pub fn point(&self, point: Coord<f64>) -> Coord<f64> {
        let mapped = self.matrix.transform_point(&Point2::new(point.x, point.y));
        coord! { x: mapped.x, y: mapped.y }
    }

    pub fn rect(&self, rect: Rect<f64>) -> Rect<f64> {
        Rect::new(self.point(rect.min()), self.point(rect.max()))
    }

    pub fn polygon(&self, points: &[Coord<f64>]) -> Polygon<f64> {
        let points = points.iter().map(|it| self.point(*it)).collect();
        Polygon::new(LineString::new(points), vec![])
    }
}

/// Divides pixel coordinates by the image size.
pub(crate) fn normalize_point(point: Coord<f64>, width: f64, height: f64) -> Coord<f64> {
    coord! { x: point.x / width, y: point.y / height }
}

pub(crate) fn normalize_rect(rect: Rect<f64>, width: f64, height: f64) -> Rect<f64> {
    Rect::new(
        normalize_point(rect.min(), width, height),
        normalize_point(rect.max(), width, height),
    )
}

/// Polygon outline as imageproc points, without the closing point geo adds.
pub(crate) fn to_imageproc_points(polygon: &Polygon<f64>) -> Vec<Point<f32>> {
    let exterior = polygon.exterior();
    let mut points = exterior
        .coords()
        .map(|it| Point::new(it.x as f32, it.y as f32))
        .collect::<Vec<_>>();
    if exterior.is_closed() && points.len() > 1 {
        points.pop();
    }
    points
}
