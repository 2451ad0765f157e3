//! Axis-aligned bounding boxes.

use nalgebra::Point2;

/// An axis-aligned bounding box in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Lower-left corner.
    pub min: Point2<f64>,
    /// Upper-right corner.
    pub max: Point2<f64>,
}

impl BoundingBox {
    /// Compute the bounding box of a sequence of points.
    ///
    /// Returns `None` for an empty sequence.
    pub fn from_points<'a, It>(points: It) -> Option<Self>
    where
        It: IntoIterator<Item = &'a Point2<f64>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(mut min, mut max), p| {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            (min, max)
        });
        Some(Self { min, max })
    }

    /// Extent along the x-axis.
    #[inline]
    pub fn x_dimension(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along the y-axis.
    #[inline]
    pub fn y_dimension(&self) -> f64 {
        self.max.y - self.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_extent() {
        let pts = [
            Point2::new(1.0, -2.0),
            Point2::new(4.0, 0.5),
            Point2::new(-0.5, 3.0),
        ];
        let bb = BoundingBox::from_points(&pts).unwrap();
        assert_eq!(bb.min, Point2::new(-0.5, -2.0));
        assert_eq!(bb.max, Point2::new(4.0, 3.0));
        assert_eq!(bb.x_dimension(), 4.5);
        assert_eq!(bb.y_dimension(), 5.0);
    }

    #[test]
    fn test_bounding_box_empty() {
        let pts: Vec<Point2<f64>> = Vec::new();
        assert!(BoundingBox::from_points(&pts).is_none());
    }

    #[test]
    fn test_bounding_box_single_point() {
        let pts = [Point2::new(2.0, 3.0)];
        let bb = BoundingBox::from_points(&pts).unwrap();
        assert_eq!(bb.x_dimension(), 0.0);
        assert_eq!(bb.y_dimension(), 0.0);
    }
}
