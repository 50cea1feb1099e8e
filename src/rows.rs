//! Row clustering for recognized text lines.
//!
//! Lines are placed in "row space" by dividing the horizontal centre of
//! their box by the average line width of the frame. Lines whose row values
//! are closer than the tolerance are treated as sitting on the same row.

use std::collections::HashSet;

use float_ord::FloatOrd;
use tracing::instrument;
use unicode_general_category::{get_general_category, GeneralCategory};

use crate::{util::round_to, RowGroup, TextLine};

/// Default distance below which two row values count as the same row.
pub const ROW_TOLERANCE: f64 = 0.5;

/// Row values are rounded to this many decimal places.
pub const ROW_DECIMAL_PLACES: u32 = 2;

pub fn almost_equal(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

/// Mean line width, or `None` when there is nothing to divide by.
pub(crate) fn average_width(lines: &[TextLine]) -> Option<f64> {
    if lines.is_empty() {
        return None;
    }
    let average = lines.iter().map(TextLine::width).sum::<f64>() / lines.len() as f64;
    (average.is_finite() && average > 0.0).then_some(average)
}

pub(crate) fn row_coordinate(line: &TextLine, average_width: f64) -> f64 {
    let centre = line.width() / 2.0 + line.bounds.min().x;
    round_to(centre / average_width, ROW_DECIMAL_PLACES)
}

/// Writes a row value into every line. Returns `false` (and leaves the lines
/// untouched) if the frame has no usable average width.
#[instrument(level = "debug", skip(lines), fields(count = lines.len()))]
pub(crate) fn assign_rows(lines: &mut [TextLine]) -> bool {
    let Some(average) = average_width(lines) else {
        log::debug!("No usable average line width, skipping row assignment.");
        return false;
    };
    log::trace!("Average line width: {average}");
    for line in lines.iter_mut() {
        line.row = Some(row_coordinate(line, average));
    }
    true
}

/// First pass: a line is excluded unless its lowercased text contains one of
/// the keywords. Keywords are expected to be lowercase already.
#[instrument(level = "debug", skip_all)]
pub fn classify(lines: &[TextLine], keywords: &[String]) -> Vec<bool> {
    lines
        .iter()
        .map(|line| {
            let text = line.text.to_lowercase();
            !keywords.iter().any(|keyword| text.contains(keyword.as_str()))
        })
        .collect()
}

/// Second pass: excluded lines starting with a digit are kept when another
/// line with different text on the same row survived the first pass.
///
/// Only the flags handed in are consulted, so a line rescued here never
/// rescues another one. The result has one flag per line; lines past the end
/// of `excluded` count as excluded by the first pass.
#[instrument(level = "debug", skip_all)]
pub fn rescue(lines: &[TextLine], excluded: &[bool], tolerance: f64) -> Vec<bool> {
    if lines.len() != excluded.len() {
        log::warn!(
            "Got {} exclusion flags for {} lines, treating missing flags as excluded",
            excluded.len(),
            lines.len()
        );
    }
    let flag = |index: usize| excluded.get(index).copied().unwrap_or(true);
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let is_excluded = flag(index);
            if !is_excluded || !starts_with_digit(&line.text) {
                return is_excluded;
            }
            let Some(row) = line.row else {
                return true;
            };
            let has_anchor = lines.iter().enumerate().any(|(other_index, other)| {
                !flag(other_index)
                    && other.text != line.text
                    && other
                        .row
                        .is_some_and(|other_row| almost_equal(other_row, row, tolerance))
            });
            if has_anchor {
                log::trace!("Keeping {:?} next to a labelled row", line.text);
            }
            !has_anchor
        })
        .collect()
}

/// Any Unicode decimal digit (`Nd`) counts, so `٣` and `５` do but `½` does not.
fn starts_with_digit(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|it| get_general_category(it) == GeneralCategory::DecimalNumber)
}

/// Groups the kept lines into table rows, ordered by row value.
///
/// Every kept line's row value is used in turn as a bucket key; a line joins
/// the first bucket it is close enough to. Each text appears at most once in
/// the whole table.
#[instrument(level = "debug", skip(lines), fields(count = lines.len()))]
pub fn group_rows(lines: &[TextLine], tolerance: f64) -> Vec<RowGroup> {
    let kept = lines
        .iter()
        .filter(|line| !line.excluded)
        .filter_map(|line| Some((line.row?, line.text.as_str())))
        .collect::<Vec<_>>();

    let mut placed = HashSet::new();
    let mut groups: Vec<RowGroup> = Vec::new();
    for &(anchor, _) in &kept {
        for &(row, text) in &kept {
            if !almost_equal(row, anchor, tolerance) || !placed.insert(text) {
                continue;
            }
            match groups.iter_mut().find(|group| group.row == anchor) {
                Some(group) => group.texts.push(text.to_string()),
                None => groups.push(RowGroup {
                    row: anchor,
                    texts: vec![text.to_string()],
                }),
            }
        }
    }
    groups.sort_by_key(|group| FloatOrd(group.row));
    groups
}
