//! # QRCad Core
//!
//! QR matrix model, encoder boundary, and the module-outline geometry
//! emitter that turns a boolean module grid into closed polyline loops
//! with bulge-encoded arc corners.
//!
//! This crate is the heart of qrcad: everything geometric lives here,
//! everything file-shaped lives in `qrcad-io`.

pub mod emitter;
pub mod encode;
pub mod geometry;
pub mod matrix;

pub use emitter::{emit, RenderConfig};
pub use encode::{EncodeError, ErrorCorrection, WifiAuth};
pub use geometry::{BBox, Drawing, GeometryError, ModuleShape, Point, Vertex};
pub use matrix::Matrix;
