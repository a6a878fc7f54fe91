// src/geometry.rs
//
// Normalized center/size boxes -> axis-aligned extents, plus the
// overlap/containment classifier the predicate rules are built on.
//
// The y axis is flipped here (y_center' = 1 - y_center) so that increasing
// y means "further back/up" in the scene. The front/behind and above/below
// rules depend on this orientation; every y comparison downstream is in
// flipped space.

use crate::records::DetectedObject;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_center: f64,
    pub x_min: f64,
    pub x_max: f64,
    /// Flipped: 1 - input y_center.
    pub y_center: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Extent {
    pub fn from_bbox(bbox: &[f64; 4]) -> Self {
        let [x_center, y_center, width, height] = *bbox;
        let y_center = 1.0 - y_center;
        Self {
            x_center,
            x_min: x_center - width / 2.0,
            x_max: x_center + width / 2.0,
            y_center,
            y_min: y_center - height / 2.0,
            y_max: y_center + height / 2.0,
        }
    }

    pub fn of(object: &DetectedObject) -> Self {
        Self::from_bbox(&object.bounding_box)
    }
}

/// Spatial relationship between two boxes.
///
/// Containment is tested with inclusive bounds, partial overlap with strict
/// ones: boxes that only touch at a boundary count as containment, never as
/// partial overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// The second box lies entirely within the first.
    SecondWithinFirst,
    /// The first box lies entirely within the second.
    FirstWithinSecond,
    /// Strict interval overlap on both axes, no full containment.
    Partial,
    Disjoint,
}

pub fn classify_overlap(first: &Extent, second: &Extent) -> Overlap {
    if first.x_min <= second.x_min
        && second.x_max <= first.x_max
        && first.y_min <= second.y_min
        && second.y_max <= first.y_max
    {
        Overlap::SecondWithinFirst
    } else if second.x_min <= first.x_min
        && first.x_max <= second.x_max
        && second.y_min <= first.y_min
        && first.y_max <= second.y_max
    {
        Overlap::FirstWithinSecond
    } else if first.x_min < second.x_max
        && second.x_min < first.x_max
        && first.y_min < second.y_max
        && second.y_min < first.y_max
    {
        Overlap::Partial
    } else {
        Overlap::Disjoint
    }
}
