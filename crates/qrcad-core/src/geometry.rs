//! Geometric primitives for module outlines.
//!
//! A module outline is a closed polyline whose vertices may carry a
//! "bulge": `tan(θ/4)` of the circular arc that starts at the vertex and
//! ends at the next one. A bulge of zero is a straight segment, a
//! positive bulge sweeps counter-clockwise. Keeping arcs on the vertex
//! rather than as separate entities means every module stays a single
//! closed profile downstream.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("invalid render config: {0}")]
    InvalidConfig(String),

    #[error("matrix must not be empty")]
    EmptyMatrix,

    #[error("matrix row {row} has {actual} cells, expected {expected}")]
    NonSquareMatrix {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

// ── Primitives ────────────────────────────────────────────────────────

/// A 2D point in drawing coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Bulge value of a quarter-circle arc: `tan(90° / 4)`.
pub fn quarter_arc_bulge() -> f64 {
    std::f64::consts::FRAC_PI_8.tan()
}

/// A polyline vertex with an optional arc bulge.
///
/// `bulge` is `tan(θ/4)` for the included angle θ of the arc from this
/// vertex to the next; `0.0` is a straight segment and a positive value
/// sweeps counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub bulge: f64,
}

impl Vertex {
    /// A vertex starting a straight segment.
    pub fn straight(x: f64, y: f64) -> Self {
        Self { x, y, bulge: 0.0 }
    }

    /// A vertex starting a circular arc.
    pub fn arc(x: f64, y: f64, bulge: f64) -> Self {
        Self { x, y, bulge }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_arc(&self) -> bool {
        self.bulge != 0.0
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn union(&self, other: &BBox) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}

// ── Module outline and drawing ────────────────────────────────────────

/// One dark module's closed outline. The last vertex implicitly
/// connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleShape {
    pub vertices: Vec<Vertex>,
}

impl ModuleShape {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn arc_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_arc()).count()
    }

    /// Signed area over the vertex points (shoelace formula). Arc
    /// segments contribute their chord only, which is enough to decide
    /// winding direction.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.vertices[i].x * self.vertices[j].y;
            area -= self.vertices[j].x * self.vertices[i].y;
        }
        area / 2.0
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn bounding_box(&self) -> Option<BBox> {
        let points: Vec<Point> = self.vertices.iter().map(Vertex::point).collect();
        BBox::from_points(&points)
    }
}

/// The full drawing: an ordered list of module outlines on one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub layer_name: String,
    pub shapes: Vec<ModuleShape>,
}

impl Drawing {
    pub fn new(layer_name: &str) -> Self {
        Self {
            layer_name: layer_name.to_string(),
            shapes: Vec::new(),
        }
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn bounding_box(&self) -> Option<BBox> {
        self.shapes
            .iter()
            .filter_map(ModuleShape::bounding_box)
            .reduce(|a, b| a.union(&b))
    }
}
