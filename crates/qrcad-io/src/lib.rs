//! # QRCad I/O
//!
//! File-shaped concerns around the qrcad core: the minimal DXF document
//! writer CAD tools import, a reader for the same subset so generated
//! files can be round-trip checked, a PNG preview renderer, and the JSON
//! render-settings format.

pub mod dxf;
pub mod preview;
pub mod settings;

pub use dxf::{write_drawing_string, DxfError, DxfReader, DxfWriter};
pub use preview::{render_preview, save_preview, PreviewConfig, PreviewError};
pub use settings::{RenderSettings, SettingsError};
