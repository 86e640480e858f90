use crate::error::{GeometryError, OperationError, Result};
use crate::math::{Point2, Tolerance};

use super::Aabb2;

/// Largest number of cells a single subdivision may produce.
pub const MAX_SUBDIVISION_CELLS: usize = 1 << 24;

/// Width and height of a rectangular cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectSize {
    /// Extent along x.
    pub dx: f64,
    /// Extent along y.
    pub dy: f64,
}

/// An axis-aligned rectangle stored as four corners.
///
/// Corners are numbered clockwise from the top-left:
///
/// ```text
/// 0 ---- 1
/// |      |
/// 3 ---- 2
/// ```
///
/// Every constructor validates its input, so a `Rect` always has positive
/// extent and canonical corner order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    corners: [Point2; 4],
}

impl Rect {
    /// Creates a rectangle from its bounds.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the extent is not positive
    /// along both axes.
    pub fn from_bounds(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self> {
        if !(xmax > xmin && ymax > ymin) {
            return Err(GeometryError::Degenerate(format!(
                "rectangle ({xmin}, {ymin}) - ({xmax}, {ymax}) has no extent"
            ))
            .into());
        }
        Ok(Self {
            corners: [
                Point2::new(xmin, ymax),
                Point2::new(xmax, ymax),
                Point2::new(xmax, ymin),
                Point2::new(xmin, ymin),
            ],
        })
    }

    /// Creates a rectangle from four consecutive corners of a closed outline.
    ///
    /// The outline may start at any corner and run in either direction; the
    /// result is stored in canonical clockwise order from the top-left.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidGeometry` if the corners do not outline an
    /// axis-aligned rectangle, or `GeometryError::Degenerate` if it has no extent.
    pub fn from_corners(corners: [Point2; 4], tol: Tolerance) -> Result<Self> {
        let same_y = |a: &Point2, b: &Point2| tol.nearly_equal(a.y, b.y);
        let same_x = |a: &Point2, b: &Point2| tol.nearly_equal(a.x, b.x);
        let [c0, c1, c2, c3] = &corners;

        let starts_horizontal =
            same_y(c0, c1) && same_x(c1, c2) && same_y(c2, c3) && same_x(c3, c0);
        let starts_vertical =
            same_x(c0, c1) && same_y(c1, c2) && same_x(c2, c3) && same_y(c3, c0);
        if !(starts_horizontal || starts_vertical) {
            return Err(GeometryError::InvalidGeometry(format!(
                "corners {:?} do not form an axis-aligned rectangle",
                corners.map(|p| (p.x, p.y))
            ))
            .into());
        }

        let xmin = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let xmax = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let ymin = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let ymax = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Self::from_bounds(xmin, ymin, xmax, ymax)
    }

    /// Creates a rectangle from a polygon ring, using its first four points.
    ///
    /// Rings usually repeat the first point at the end; extra points are ignored.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidGeometry` if the ring has fewer than four
    /// points or does not outline an axis-aligned rectangle.
    pub fn from_ring(points: &[Point2], tol: Tolerance) -> Result<Self> {
        match points {
            [a, b, c, d, ..] => Self::from_corners([*a, *b, *c, *d], tol),
            _ => Err(GeometryError::InvalidGeometry(format!(
                "ring has {} points, a rectangle needs 4",
                points.len()
            ))
            .into()),
        }
    }

    /// Returns the corners clockwise from the top-left.
    #[must_use]
    pub fn corners(&self) -> &[Point2; 4] {
        &self.corners
    }

    /// Returns the rectangle size.
    #[must_use]
    pub fn size(&self) -> RectSize {
        let [p0, p1, _, p3] = &self.corners;
        RectSize {
            dx: (p1.x - p0.x).abs(),
            dy: (p3.y - p0.y).abs(),
        }
    }

    /// Returns the rectangle area.
    #[must_use]
    pub fn area(&self) -> f64 {
        let size = self.size();
        size.dx * size.dy
    }

    /// Returns the rectangle center.
    #[must_use]
    pub fn centroid(&self) -> Point2 {
        let [p0, _, p2, _] = &self.corners;
        Point2::new(0.5 * (p0.x + p2.x), 0.5 * (p0.y + p2.y))
    }

    /// Returns the bounding box.
    #[must_use]
    pub fn bounds(&self) -> Aabb2 {
        let [p0, _, p2, _] = self.corners;
        Aabb2::new(Point2::new(p0.x, p2.y), Point2::new(p2.x, p0.y))
    }

    /// Partitions the rectangle into `nrows` × `ncols` equal sub-rectangles.
    ///
    /// Sub-rectangles are returned row-major, top row first, left column first.
    /// Grid lines are interpolated from the bounds (not accumulated), and the
    /// outer lines reproduce the bounds exactly.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if either factor is zero or the
    /// split would exceed [`MAX_SUBDIVISION_CELLS`].
    pub fn subdivide(&self, nrows: usize, ncols: usize) -> Result<Vec<Rect>> {
        let count = nrows
            .checked_mul(ncols)
            .filter(|&count| count > 0 && count <= MAX_SUBDIVISION_CELLS)
            .ok_or_else(|| {
                OperationError::InvalidInput(format!(
                    "cannot split a cell into {nrows} x {ncols} parts"
                ))
            })?;
        let bounds = self.bounds();
        let xs: Vec<f64> = (0..=ncols)
            .map(|j| grid_line(bounds.min.x, bounds.max.x, j, ncols))
            .collect();
        // Rows are numbered from the top, so y runs from max to min.
        let ys: Vec<f64> = (0..=nrows)
            .map(|i| grid_line(bounds.max.y, bounds.min.y, i, nrows))
            .collect();

        let mut cells = Vec::with_capacity(count);
        for row in ys.windows(2) {
            for col in xs.windows(2) {
                cells.push(Self::from_bounds(col[0], row[1], col[1], row[0])?);
            }
        }
        Ok(cells)
    }
}

/// Position of grid line `i` out of `count` intervals between `start` and `end`.
#[allow(clippy::cast_precision_loss)]
fn grid_line(start: f64, end: f64, i: usize, count: usize) -> f64 {
    if i == 0 {
        start
    } else if i == count {
        end
    } else {
        start + (end - start) * (i as f64 / count as f64)
    }
}
