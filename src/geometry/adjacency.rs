//! Directional adjacency between two rectangular cells.
//!
//! Neighbor positions around a cell `0` are numbered:
//!
//! ```text
//! | 8 | 1 | 5 |
//! | 4 | 0 | 2 |
//! | 7 | 3 | 6 |
//! ```
//!
//! Only edge neighbors (1 to 4) take part in topology checks. Corner touches
//! (5 to 8) and non-neighbors (-1) are still reported so callers can see them.

use crate::math::{vector_between, Point2, Tolerance, Vector2};

use super::Rect;

/// Side of a cell shared with an edge neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Neighbor above (code 1).
    Above,
    /// Neighbor to the right (code 2).
    Right,
    /// Neighbor below (code 3).
    Below,
    /// Neighbor to the left (code 4).
    Left,
}

impl Side {
    /// Returns `true` for left/right neighbors, whose shared edge is vertical.
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Right | Side::Left)
    }

    /// Returns the side seen from the neighbor.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Side::Above => Side::Below,
            Side::Right => Side::Left,
            Side::Below => Side::Above,
            Side::Left => Side::Right,
        }
    }
}

/// Corner of a cell touched by a diagonal neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CornerTouch {
    /// Top-right corner (code 5).
    TopRight,
    /// Bottom-right corner (code 6).
    BottomRight,
    /// Bottom-left corner (code 7).
    BottomLeft,
    /// Top-left corner (code 8).
    TopLeft,
}

/// Relationship of a neighbor `b` as seen from a cell `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adjacency {
    /// Both cells have the same four corners.
    Overlap,
    /// The cells share an edge, completely or partially.
    Edge(Side),
    /// The cells only share one corner.
    Corner(CornerTouch),
    /// Not a neighbor in a valid grid.
    Detached,
}

impl Adjacency {
    /// Numeric code: -1 detached, 0 overlap, 1..4 edges, 5..8 corners.
    #[must_use]
    pub fn code(self) -> i8 {
        match self {
            Adjacency::Detached => -1,
            Adjacency::Overlap => 0,
            Adjacency::Edge(Side::Above) => 1,
            Adjacency::Edge(Side::Right) => 2,
            Adjacency::Edge(Side::Below) => 3,
            Adjacency::Edge(Side::Left) => 4,
            Adjacency::Corner(CornerTouch::TopRight) => 5,
            Adjacency::Corner(CornerTouch::BottomRight) => 6,
            Adjacency::Corner(CornerTouch::BottomLeft) => 7,
            Adjacency::Corner(CornerTouch::TopLeft) => 8,
        }
    }

    /// Returns the shared side for edge neighbors.
    #[must_use]
    pub fn side(self) -> Option<Side> {
        match self {
            Adjacency::Edge(side) => Some(side),
            _ => None,
        }
    }
}

type Rule = fn(&[Point2; 4], &[Point2; 4], Tolerance) -> Option<Adjacency>;

/// Classification rules, tried in order. The first match wins, and a pair no
/// rule matches is detached.
const RULES: [Rule; 4] = [exact_overlap, exact_edge, corner_touch, partial_edge];

/// Classifies where `b` lies relative to `a`.
#[must_use]
pub fn classify_adjacency(a: &Rect, b: &Rect, tol: Tolerance) -> Adjacency {
    let (p, q) = (a.corners(), b.corners());
    RULES
        .iter()
        .find_map(|rule| rule(p, q, tol))
        .unwrap_or(Adjacency::Detached)
}

fn exact_overlap(p: &[Point2; 4], q: &[Point2; 4], tol: Tolerance) -> Option<Adjacency> {
    p.iter()
        .zip(q)
        .all(|(a, b)| tol.points_coincide(a, b))
        .then_some(Adjacency::Overlap)
}

fn exact_edge(p: &[Point2; 4], q: &[Point2; 4], tol: Tolerance) -> Option<Adjacency> {
    let on = |i: usize, j: usize| tol.points_coincide(&p[i], &q[j]);
    let side = if on(0, 3) && on(1, 2) {
        Side::Above
    } else if on(1, 0) && on(2, 3) {
        Side::Right
    } else if on(2, 1) && on(3, 0) {
        Side::Below
    } else if on(3, 2) && on(0, 1) {
        Side::Left
    } else {
        return None;
    };
    Some(Adjacency::Edge(side))
}

fn corner_touch(p: &[Point2; 4], q: &[Point2; 4], tol: Tolerance) -> Option<Adjacency> {
    let on = |i: usize, j: usize| tol.points_coincide(&p[i], &q[j]);
    let corner = if on(1, 3) {
        CornerTouch::TopRight
    } else if on(2, 0) {
        CornerTouch::BottomRight
    } else if on(3, 1) {
        CornerTouch::BottomLeft
    } else if on(0, 2) {
        CornerTouch::TopLeft
    } else {
        return None;
    };
    Some(Adjacency::Corner(corner))
}

/// Edge neighbors of a different size: no corner pair coincides, but the two
/// gaps between the edge end points run along the shared grid line.
fn partial_edge(p: &[Point2; 4], q: &[Point2; 4], tol: Tolerance) -> Option<Adjacency> {
    let x_axis = Vector2::new(1.0, 0.0);
    let y_axis = Vector2::new(0.0, 1.0);
    let along = |v1: Vector2, v2: Vector2, axis: &Vector2| {
        tol.colinear(&v1, &v2) && tol.colinear(&v1, axis) && tol.colinear(&v2, axis)
    };

    let side = if along(
        vector_between(&q[3], &p[0]),
        vector_between(&p[1], &q[2]),
        &x_axis,
    ) {
        Side::Above
    } else if along(
        vector_between(&q[3], &p[2]),
        vector_between(&p[1], &q[0]),
        &y_axis,
    ) {
        Side::Right
    } else if along(
        vector_between(&q[0], &p[3]),
        vector_between(&p[2], &q[1]),
        &x_axis,
    ) {
        Side::Below
    } else if along(
        vector_between(&q[2], &p[3]),
        vector_between(&p[0], &q[1]),
        &y_axis,
    ) {
        Side::Left
    } else {
        return None;
    };
    Some(Adjacency::Edge(side))
}
