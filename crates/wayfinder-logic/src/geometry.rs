//! Planar geometry adapters used by the wayfinding core.
//!
//! Rooms are convex polygons, doors are segments on their boundary. Everything
//! here is plain `f64` math on small value types; the shape library of the
//! surrounding simulation is only ever asked these few questions.

use serde::{Deserialize, Serialize};

/// Tolerance for "on the boundary" and "same point" comparisons.
pub const EPSILON: f64 = 1e-9;

/// Integer path costs are distances in micrometres, so graph searches can use
/// `Ord` costs without losing meaningful precision.
pub const COST_SCALE: f64 = 1e6;

/// Metric distance → integer search cost.
pub fn to_cost(distance: f64) -> u64 {
    (distance.max(0.0) * COST_SCALE).round() as u64
}

/// Integer search cost → metric distance.
pub fn from_cost(cost: u64) -> f64 {
    cost as f64 / COST_SCALE
}

/// 2D point / vector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Rotate 90° counter-clockwise.
    pub fn perp(&self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Shorten this vector to at most `max_len`, keeping its direction.
    pub fn clamp_length(&self, max_len: f64) -> Self {
        let len = self.length();
        if len > max_len && len > 0.0 {
            *self * (max_len / len)
        } else {
            *self
        }
    }

    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.distance(other) <= tolerance
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

/// A closed line segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> f64 {
        self.a.distance(&self.b)
    }

    pub fn midpoint(&self) -> Vec2 {
        self.a.midpoint(&self.b)
    }

    /// Parameter in [0, 1] of the projection of `p` onto this segment.
    pub fn project(&self, p: Vec2) -> f64 {
        let ab = self.b - self.a;
        let len_sq = ab.dot(&ab);
        if len_sq <= EPSILON * EPSILON {
            return 0.0;
        }
        ((p - self.a).dot(&ab) / len_sq).clamp(0.0, 1.0)
    }

    pub fn point_at(&self, t: f64) -> Vec2 {
        self.a + (self.b - self.a) * t
    }

    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        self.point_at(self.project(p))
    }

    pub fn distance_to(&self, p: Vec2) -> f64 {
        self.closest_point(p).distance(&p)
    }
}

/// Closest point on segment `ab` to `p`.
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    Segment::new(a, b).closest_point(p)
}

fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b - a).cross(&(c - a))
}

/// Proper intersection test: true when the two segments cross at a single
/// point interior to both. Touching at endpoints or collinear overlap does
/// not count.
pub fn segments_cross(p: &Segment, q: &Segment) -> bool {
    let d1 = orientation(q.a, q.b, p.a);
    let d2 = orientation(q.a, q.b, p.b);
    let d3 = orientation(p.a, p.b, q.a);
    let d4 = orientation(p.a, p.b, q.b);

    let scale = (p.length() * q.length()).max(1.0);
    let eps = EPSILON * scale;
    ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
}

/// Convex polygon with counter-clockwise vertices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConvexPolygon {
    vertices: Vec<Vec2>,
}

impl ConvexPolygon {
    /// Build a polygon from its boundary vertices. Clockwise input is
    /// reversed. Returns `None` for fewer than three vertices or zero area.
    pub fn new(mut vertices: Vec<Vec2>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let signed = signed_area(&vertices);
        if signed.abs() <= EPSILON {
            return None;
        }
        if signed < 0.0 {
            vertices.reverse();
        }
        Some(Self { vertices })
    }

    /// Axis-aligned rectangle from its min corner and size.
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        Self::new(vec![
            Vec2::new(x, y),
            Vec2::new(x + width, y),
            Vec2::new(x + width, y + height),
            Vec2::new(x, y + height),
        ])
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Boundary edges in order, each from vertex i to vertex i+1.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| Segment::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }

    pub fn area(&self) -> f64 {
        signed_area(&self.vertices).abs()
    }

    /// Area centroid.
    pub fn centroid(&self) -> Vec2 {
        let n = self.vertices.len();
        let mut cx = 0.0;
        let mut cy = 0.0;
        let mut a2 = 0.0;
        for i in 0..n {
            let p = self.vertices[i];
            let q = self.vertices[(i + 1) % n];
            let c = p.cross(&q);
            a2 += c;
            cx += (p.x + q.x) * c;
            cy += (p.y + q.y) * c;
        }
        Vec2::new(cx / (3.0 * a2), cy / (3.0 * a2))
    }

    /// Point-in-convex-polygon, boundary inclusive.
    pub fn contains(&self, p: Vec2) -> bool {
        self.edges().all(|e| orientation(e.a, e.b, p) >= -EPSILON * e.length().max(1.0))
    }

    /// Point-in-convex-polygon, boundary exclusive.
    pub fn contains_strict(&self, p: Vec2) -> bool {
        self.edges().all(|e| orientation(e.a, e.b, p) > EPSILON * e.length().max(1.0))
    }

    /// Index of the boundary edge `p` lies on, if any.
    pub fn edge_containing(&self, p: Vec2, tolerance: f64) -> Option<usize> {
        self.edges()
            .enumerate()
            .filter(|(_, e)| e.distance_to(p) <= tolerance)
            .min_by(|(_, a), (_, b)| a.distance_to(p).total_cmp(&b.distance_to(p)))
            .map(|(i, _)| i)
    }

    /// Index of the boundary edge nearest to `p`.
    pub fn nearest_edge(&self, p: Vec2) -> usize {
        self.edges()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance_to(p).total_cmp(&b.distance_to(p)))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

fn signed_area(vertices: &[Vec2]) -> f64 {
    let n = vertices.len();
    let mut sum = 0.0;
    for i in 0..n {
        sum += vertices[i].cross(&vertices[(i + 1) % n]);
    }
    sum / 2.0
}

/// Whether the straight line from `from` to `to` stays clear of the room's
/// walls. `from` is expected to lie on or inside the polygon.
///
/// The line is obstructed when it properly crosses a boundary edge, or when
/// `to` lies outside and the line leaves `from` through the room's interior
/// (which, for a convex room, means it exits through the far wall).
pub fn has_line_of_sight(polygon: &ConvexPolygon, from: Vec2, to: Vec2) -> bool {
    if from.approx_eq(&to, EPSILON) {
        return true;
    }
    if polygon.contains(to) {
        return true;
    }
    let sight = Segment::new(from, to);
    if polygon.edges().any(|e| segments_cross(&sight, &e)) {
        return false;
    }
    let step = (to - from).normalize() * (1e-6 * (1.0 + from.length()));
    !polygon.contains_strict(from + step)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> ConvexPolygon {
        ConvexPolygon::rect(0.0, 0.0, 10.0, 10.0).unwrap()
    }

    #[test]
    fn test_vec2_operations() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);
        assert_eq!(a + b, Vec2::new(5.0, 8.0));
        assert_eq!(b - a, Vec2::new(3.0, 4.0));
        assert_eq!((b - a).length(), 5.0);
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(a.perp(), Vec2::new(-2.0, 1.0));
    }

    #[test]
    fn test_clamp_length() {
        let v = Vec2::new(3.0, 4.0);
        let c = v.clamp_length(2.5);
        assert!((c.length() - 2.5).abs() < 1e-12);
        assert_eq!(v.clamp_length(10.0), v);
    }

    #[test]
    fn test_polygon_rejects_degenerate() {
        assert!(ConvexPolygon::new(vec![Vec2::ZERO, Vec2::new(1.0, 0.0)]).is_none());
        assert!(ConvexPolygon::new(vec![
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0)
        ])
        .is_none());
    }

    #[test]
    fn test_clockwise_input_is_normalized() {
        let cw = ConvexPolygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 4.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(4.0, 0.0),
        ])
        .unwrap();
        assert!(cw.contains(Vec2::new(2.0, 2.0)));
        assert!(!cw.contains(Vec2::new(5.0, 2.0)));
    }

    #[test]
    fn test_contains_boundary() {
        let sq = square();
        assert!(sq.contains(Vec2::new(5.0, 5.0)));
        assert!(sq.contains(Vec2::new(10.0, 5.0)));
        assert!(!sq.contains_strict(Vec2::new(10.0, 5.0)));
        assert!(!sq.contains(Vec2::new(10.1, 5.0)));
    }

    #[test]
    fn test_centroid_and_area() {
        let sq = square();
        assert!((sq.area() - 100.0).abs() < 1e-9);
        assert!(sq.centroid().approx_eq(&Vec2::new(5.0, 5.0), 1e-9));

        let tri = ConvexPolygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(0.0, 3.0),
        ])
        .unwrap();
        assert!(tri.centroid().approx_eq(&Vec2::new(1.0, 1.0), 1e-9));
    }

    #[test]
    fn test_segments_cross() {
        let a = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Segment::new(Vec2::new(0.0, 10.0), Vec2::new(10.0, 0.0));
        assert!(segments_cross(&a, &b));

        // Shared endpoint is not a crossing
        let c = Segment::new(Vec2::new(10.0, 10.0), Vec2::new(20.0, 0.0));
        assert!(!segments_cross(&a, &c));

        // Parallel
        let d = Segment::new(Vec2::new(0.0, 1.0), Vec2::new(10.0, 11.0));
        assert!(!segments_cross(&a, &d));
    }

    #[test]
    fn test_closest_point_on_segment() {
        let p = closest_point_on_segment(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(4.0, 3.0),
        );
        assert!(p.approx_eq(&Vec2::new(4.0, 0.0), 1e-12));

        let clamped = closest_point_on_segment(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(-5.0, 3.0),
        );
        assert!(clamped.approx_eq(&Vec2::ZERO, 1e-12));
    }

    #[test]
    fn test_line_of_sight_from_boundary() {
        let sq = square();
        let target = Vec2::new(20.0, 5.0);
        // Facing wall sees the target
        assert!(has_line_of_sight(&sq, Vec2::new(10.0, 0.0), target));
        assert!(has_line_of_sight(&sq, Vec2::new(10.0, 10.0), target));
        // Far wall looks through the room
        assert!(!has_line_of_sight(&sq, Vec2::new(0.0, 5.0), target));
        assert!(!has_line_of_sight(&sq, Vec2::new(0.0, 0.0), target));
    }

    #[test]
    fn test_line_of_sight_along_wall() {
        let sq = square();
        // Sliding along the bottom wall toward a point beyond the corner
        assert!(has_line_of_sight(&sq, Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0)));
    }

    #[test]
    fn test_line_of_sight_inside_target() {
        let sq = square();
        assert!(has_line_of_sight(&sq, Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_edge_containing() {
        let sq = square();
        assert_eq!(sq.edge_containing(Vec2::new(5.0, 0.0), 1e-6), Some(0));
        assert_eq!(sq.edge_containing(Vec2::new(10.0, 5.0), 1e-6), Some(1));
        assert_eq!(sq.edge_containing(Vec2::new(5.0, 5.0), 1e-6), None);
        assert_eq!(sq.nearest_edge(Vec2::new(5.0, 9.0)), 2);
    }
}
