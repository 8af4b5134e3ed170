//! Module-outline geometry emitter.
//!
//! Converts a boolean module grid into one closed polyline loop per dark
//! module, placed in drawing coordinates. With a corner radius each
//! corner becomes a quarter-circle arc carried as a bulge on the vertex
//! that starts it, so every module remains a single closed profile.
//!
//! Winding convention: all outlines are counter-clockwise, so every arc
//! bulge is `+tan(π/8)`.

use serde::{Deserialize, Serialize};

use crate::geometry::{quarter_arc_bulge, Drawing, GeometryError, ModuleShape, Vertex};
use crate::matrix::{finder_pattern_modules, Matrix};

/// Grid row 0 is the top scan line while drawing Y grows upward. When
/// set, row 0 is placed at maximum Y so the drawing matches the symbol
/// visually. Flip this to change the convention without touching the
/// arc math.
const ROW_ZERO_AT_MAX_Y: bool = true;

/// Parameters for one emit run.
///
/// The finder-pattern radii default to `corner_radius` when unset.
/// Every radius is clamped to `[0, module_size / 2]` before use; beyond
/// half the module size, opposite arcs of one module would overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Side length of one module in drawing units.
    pub module_size: f64,
    /// Corner radius for body modules. 0 emits plain squares.
    pub corner_radius: f64,
    /// Quiet-zone width in modules, applied as a placement offset.
    pub border: u32,
    /// Layer every entity is tagged with.
    pub layer_name: String,
    /// Radius override for the finder-pattern frame modules.
    pub eye_frame_radius: Option<f64>,
    /// Radius override for the finder-pattern eye modules.
    pub eye_ball_radius: Option<f64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            module_size: 1.0,
            corner_radius: 0.0,
            border: 4,
            layer_name: "QR".to_string(),
            eye_frame_radius: None,
            eye_ball_radius: None,
        }
    }
}

impl RenderConfig {
    /// Clamp a radius into the geometrically valid range for this
    /// module size. Out-of-range values are not an error.
    pub fn clamped_radius(&self, radius: f64) -> f64 {
        radius.max(0.0).min(self.module_size / 2.0)
    }
}

/// Emit one closed outline per dark module.
///
/// Pure and deterministic: identical inputs produce identical drawings,
/// shapes ordered row-major (top row first, left to right). Fails only
/// on a non-positive module size, an empty layer name, or an empty
/// matrix; radii are clamped, never rejected.
pub fn emit(matrix: &Matrix, config: &RenderConfig) -> Result<Drawing, GeometryError> {
    if !(config.module_size > 0.0) || !config.module_size.is_finite() {
        return Err(GeometryError::InvalidConfig(format!(
            "module_size must be positive, got {}",
            config.module_size
        )));
    }
    if config.layer_name.is_empty() {
        return Err(GeometryError::InvalidConfig(
            "layer_name must not be empty".to_string(),
        ));
    }
    if matrix.is_empty() {
        return Err(GeometryError::EmptyMatrix);
    }

    let body_radius = config.clamped_radius(config.corner_radius);
    let frame_radius =
        config.clamped_radius(config.eye_frame_radius.unwrap_or(config.corner_radius));
    let ball_radius =
        config.clamped_radius(config.eye_ball_radius.unwrap_or(config.corner_radius));

    let (frame, eyes) = if frame_radius != body_radius || ball_radius != body_radius {
        finder_pattern_modules(matrix)
    } else {
        Default::default()
    };

    let size = matrix.size();
    let mut drawing = Drawing::new(&config.layer_name);
    for row in 0..size {
        for col in 0..size {
            if !matrix.get(row, col) {
                continue;
            }
            let radius = if eyes.contains(&(col, row)) {
                ball_radius
            } else if frame.contains(&(col, row)) {
                frame_radius
            } else {
                body_radius
            };
            let x0 = (config.border as usize + col) as f64 * config.module_size;
            let y_index = if ROW_ZERO_AT_MAX_Y { size - 1 - row } else { row };
            let y0 = (config.border as usize + y_index) as f64 * config.module_size;
            drawing
                .shapes
                .push(module_outline(x0, y0, config.module_size, radius));
        }
    }

    log::debug!(
        "emitted {} module outlines on layer '{}'",
        drawing.shape_count(),
        drawing.layer_name
    );
    Ok(drawing)
}

/// One module outline with its lower-left corner at `(x0, y0)`.
fn module_outline(x0: f64, y0: f64, side: f64, radius: f64) -> ModuleShape {
    if radius <= 0.0 {
        square_outline(x0, y0, side)
    } else {
        rounded_outline(x0, y0, side, radius)
    }
}

fn square_outline(x0: f64, y0: f64, side: f64) -> ModuleShape {
    let (x1, y1) = (x0 + side, y0 + side);
    ModuleShape::new(vec![
        Vertex::straight(x0, y0),
        Vertex::straight(x1, y0),
        Vertex::straight(x1, y1),
        Vertex::straight(x0, y1),
    ])
}

/// Rounded module: four straight edges alternating with four quarter
/// arcs, counter-clockwise from the bottom edge. At `radius == side/2`
/// the straight segments collapse to zero length but all eight vertices
/// are still emitted, leaving a closed loop of four arcs.
fn rounded_outline(x0: f64, y0: f64, side: f64, radius: f64) -> ModuleShape {
    let k = quarter_arc_bulge();
    let (x1, y1) = (x0 + side, y0 + side);
    let r = radius;
    ModuleShape::new(vec![
        Vertex::straight(x0 + r, y0), // bottom edge, left to right
        Vertex::arc(x1 - r, y0, k),   // bottom-right corner
        Vertex::straight(x1, y0 + r), // right edge, upward
        Vertex::arc(x1, y1 - r, k),   // top-right corner
        Vertex::straight(x1 - r, y1), // top edge, right to left
        Vertex::arc(x0 + r, y1, k),   // top-left corner
        Vertex::straight(x0, y1 - r), // left edge, downward
        Vertex::arc(x0, y0 + r, k),   // bottom-left corner, closes the loop
    ])
}
