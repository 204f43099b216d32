//! Shape outlines in the object's local 2x2 unit space.
//!
//! Outlines feed both the filled mesh and the selection border, so they are
//! computed once per shape kind and shared through [`OutlineCache`].

use kurbo::{BezPath, Point};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_6, TAU};
use std::sync::Arc;

/// Inner radius of the star relative to its outer radius.
pub const STAR_INNER_RADIUS: f64 = 0.45;
/// Half-height of the diamond.
pub const DIAMOND_HALF_HEIGHT: f64 = 1.2;

/// The shape drawn by a `shape` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Triangle,
    Hexagon,
    Star,
    Diamond,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Triangle,
        ShapeKind::Hexagon,
        ShapeKind::Star,
        ShapeKind::Diamond,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Star => "star",
            ShapeKind::Diamond => "diamond",
        }
    }

    /// Parse a stored shape tag. Unknown tags fall back to a rectangle.
    pub fn parse(tag: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(tag))
            .unwrap_or_default()
    }
}

impl Serialize for ShapeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ShapeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ShapeKind::parse(&tag))
    }
}

/// Vertex loop for the filled shape. The first vertex is not repeated.
pub fn outline(kind: ShapeKind, circle_segments: usize) -> Vec<Point> {
    match kind {
        ShapeKind::Rectangle => vec![
            Point::new(-1.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, -1.0),
            Point::new(-1.0, -1.0),
        ],
        ShapeKind::Circle => regular_polygon(circle_segments.max(3), 0.0),
        ShapeKind::Triangle => {
            let h = 3f64.sqrt();
            vec![
                Point::new(0.0, 2.0 * h / 3.0),
                Point::new(-1.0, -h / 3.0),
                Point::new(1.0, -h / 3.0),
            ]
        }
        ShapeKind::Hexagon => regular_polygon(6, FRAC_PI_6),
        ShapeKind::Star => (0..10)
            .map(|i| {
                let angle = i as f64 / 10.0 * TAU + FRAC_PI_2;
                let r = if i % 2 == 0 { 1.0 } else { STAR_INNER_RADIUS };
                Point::new(angle.cos() * r, angle.sin() * r)
            })
            .collect(),
        ShapeKind::Diamond => vec![
            Point::new(0.0, DIAMOND_HALF_HEIGHT),
            Point::new(1.0, 0.0),
            Point::new(0.0, -DIAMOND_HALF_HEIGHT),
            Point::new(-1.0, 0.0),
        ],
    }
}

/// Closed polyline for the selection border (first vertex repeated at the end).
pub fn border(kind: ShapeKind, circle_segments: usize) -> Vec<Point> {
    let mut points = outline(kind, circle_segments);
    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    points
}

/// Closed path through the given vertices.
pub fn to_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(*first);
        for p in iter {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

fn regular_polygon(sides: usize, phase: f64) -> Vec<Point> {
    (0..sides)
        .map(|i| {
            let angle = i as f64 / sides as f64 * TAU + phase;
            Point::new(angle.cos(), angle.sin())
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum OutlineKey {
    Fill(ShapeKind),
    Border(ShapeKind),
}

/// Memoized outlines. Style changes re-query this rather than recomputing.
#[derive(Debug)]
pub struct OutlineCache {
    circle_segments: usize,
    border_circle_segments: usize,
    entries: HashMap<OutlineKey, Arc<[Point]>>,
}

impl OutlineCache {
    pub fn new(circle_segments: usize, border_circle_segments: usize) -> Self {
        Self {
            circle_segments,
            border_circle_segments,
            entries: HashMap::new(),
        }
    }

    pub fn outline(&mut self, kind: ShapeKind) -> Arc<[Point]> {
        let segments = self.circle_segments;
        self.entries
            .entry(OutlineKey::Fill(kind))
            .or_insert_with(|| outline(kind, segments).into())
            .clone()
    }

    pub fn border(&mut self, kind: ShapeKind) -> Arc<[Point]> {
        let segments = self.border_circle_segments;
        self.entries
            .entry(OutlineKey::Border(kind))
            .or_insert_with(|| border(kind, segments).into())
            .clone()
    }

    /// Number of outlines computed so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OutlineCache {
    fn default() -> Self {
        Self::new(48, 64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_vertex_counts() {
        assert_eq!(outline(ShapeKind::Rectangle, 48).len(), 4);
        assert_eq!(outline(ShapeKind::Circle, 48).len(), 48);
        assert_eq!(outline(ShapeKind::Triangle, 48).len(), 3);
        assert_eq!(outline(ShapeKind::Hexagon, 48).len(), 6);
        assert_eq!(outline(ShapeKind::Star, 48).len(), 10);
        assert_eq!(outline(ShapeKind::Diamond, 48).len(), 4);
    }

    #[test]
    fn test_triangle_is_centroid_centered() {
        let pts = outline(ShapeKind::Triangle, 0);
        let cx: f64 = pts.iter().map(|p| p.x).sum::<f64>() / 3.0;
        let cy: f64 = pts.iter().map(|p| p.y).sum::<f64>() / 3.0;
        assert!(cx.abs() < 1e-9);
        assert!(cy.abs() < 1e-9);
        // Equilateral with side 2.
        assert!((pts[1].distance(pts[2]) - 2.0).abs() < 1e-9);
        assert!((pts[0].distance(pts[1]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_hexagon_first_vertex_rotated() {
        let pts = outline(ShapeKind::Hexagon, 0);
        assert!(close(pts[0], Point::new(FRAC_PI_6.cos(), FRAC_PI_6.sin())));
        for p in &pts {
            assert!((p.to_vec2().hypot() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_star_alternates_radius() {
        let pts = outline(ShapeKind::Star, 0);
        assert!(close(pts[0], Point::new(0.0, 1.0)));
        for (i, p) in pts.iter().enumerate() {
            let expected = if i % 2 == 0 { 1.0 } else { STAR_INNER_RADIUS };
            assert!((p.to_vec2().hypot() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_diamond_vertices() {
        let pts = outline(ShapeKind::Diamond, 0);
        assert!(close(pts[0], Point::new(0.0, 1.2)));
        assert!(close(pts[1], Point::new(1.0, 0.0)));
        assert!(close(pts[2], Point::new(0.0, -1.2)));
        assert!(close(pts[3], Point::new(-1.0, 0.0)));
    }

    #[test]
    fn test_border_is_closed() {
        for kind in ShapeKind::ALL {
            let pts = border(kind, 64);
            assert!(close(pts[0], pts[pts.len() - 1]));
        }
        assert_eq!(border(ShapeKind::Circle, 64).len(), 65);
    }

    #[test]
    fn test_cache_memoizes() {
        let mut cache = OutlineCache::default();
        let a = cache.outline(ShapeKind::Star);
        let b = cache.outline(ShapeKind::Star);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.outline(ShapeKind::Circle).len(), 48);
        assert_eq!(cache.border(ShapeKind::Circle).len(), 65);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_parse_unknown_falls_back() {
        assert_eq!(ShapeKind::parse("hexagon"), ShapeKind::Hexagon);
        assert_eq!(ShapeKind::parse("blob"), ShapeKind::Rectangle);
        let kind: ShapeKind = serde_json::from_str("\"Diamond\"").unwrap();
        assert_eq!(kind, ShapeKind::Diamond);
    }

    #[test]
    fn test_to_path_closes() {
        let path = to_path(&outline(ShapeKind::Rectangle, 0));
        assert_eq!(path.elements().len(), 5);
    }
}
