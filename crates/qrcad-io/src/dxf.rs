//! Minimal DXF (R12-level) document writer and reader.
//!
//! A DXF file is a flat stream of tag/value pairs: a numeric group code
//! on one line, its value on the next. The writer emits a HEADER
//! section, a TABLES section declaring the single layer, and an ENTITIES
//! section with one closed `LWPOLYLINE` per module outline. Each vertex
//! carries its bulge as group 42, so rounded corners need no separate
//! ARC entities and every module stays one closed profile.
//!
//! The reader understands exactly the subset the writer produces. It
//! exists so generated files can be round-trip checked without a CAD
//! package in the loop.

use std::io::{self, Write};

use thiserror::Error;

use qrcad_core::{Drawing, ModuleShape, Vertex};

// ── Group codes ───────────────────────────────────────────────────────

mod group_code {
    /// Entity/record marker.
    pub const MARKER: &str = "0";
    /// Section or table name.
    pub const NAME: &str = "2";
    /// Linetype name.
    pub const LINETYPE: &str = "6";
    /// Layer name.
    pub const LAYER: &str = "8";
    /// Vertex X.
    pub const X: &str = "10";
    /// Vertex Y.
    pub const Y: &str = "20";
    /// Arc bulge of the segment starting at the current vertex.
    pub const BULGE: &str = "42";
    /// Color number.
    pub const COLOR: &str = "62";
    /// 16-bit flags (closed polyline, table entry count).
    pub const FLAGS: &str = "70";
    /// LWPOLYLINE vertex count.
    pub const VERTEX_COUNT: &str = "90";
}

/// Bulges below this are written as straight segments.
const BULGE_EPSILON: f64 = 1e-9;

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum DxfError {
    #[error("write error: {0}")]
    Write(#[from] io::Error),

    #[error("malformed DXF at line {line}: {message}")]
    Malformed { line: usize, message: String },
}

// ── Writer ────────────────────────────────────────────────────────────

pub struct DxfWriter<W: Write> {
    writer: W,
}

impl<W: Write> DxfWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a complete DXF document for the drawing.
    pub fn write(&mut self, drawing: &Drawing) -> Result<(), DxfError> {
        self.write_header()?;
        self.write_layer_table(&drawing.layer_name)?;

        self.write_pair(group_code::MARKER, "SECTION")?;
        self.write_pair(group_code::NAME, "ENTITIES")?;
        for shape in &drawing.shapes {
            self.write_polyline(shape, &drawing.layer_name)?;
        }
        self.write_pair(group_code::MARKER, "ENDSEC")?;
        self.write_pair(group_code::MARKER, "EOF")?;

        log::debug!(
            "wrote {} LWPOLYLINE entities on layer '{}'",
            drawing.shape_count(),
            drawing.layer_name
        );
        Ok(())
    }

    fn write_pair(&mut self, code: &str, value: &str) -> Result<(), DxfError> {
        writeln!(self.writer, "{code}")?;
        writeln!(self.writer, "{value}")?;
        Ok(())
    }

    fn write_header(&mut self) -> Result<(), DxfError> {
        self.write_pair(group_code::MARKER, "SECTION")?;
        self.write_pair(group_code::NAME, "HEADER")?;
        self.write_pair(group_code::MARKER, "ENDSEC")
    }

    fn write_layer_table(&mut self, layer: &str) -> Result<(), DxfError> {
        self.write_pair(group_code::MARKER, "SECTION")?;
        self.write_pair(group_code::NAME, "TABLES")?;
        self.write_pair(group_code::MARKER, "TABLE")?;
        self.write_pair(group_code::NAME, "LAYER")?;
        self.write_pair(group_code::FLAGS, "1")?;
        self.write_pair(group_code::MARKER, "LAYER")?;
        self.write_pair(group_code::NAME, layer)?;
        self.write_pair(group_code::FLAGS, "0")?;
        self.write_pair(group_code::COLOR, "7")?;
        self.write_pair(group_code::LINETYPE, "CONTINUOUS")?;
        self.write_pair(group_code::MARKER, "ENDTAB")?;
        self.write_pair(group_code::MARKER, "ENDSEC")
    }

    fn write_polyline(&mut self, shape: &ModuleShape, layer: &str) -> Result<(), DxfError> {
        self.write_pair(group_code::MARKER, "LWPOLYLINE")?;
        self.write_pair(group_code::LAYER, layer)?;
        self.write_pair(group_code::VERTEX_COUNT, &shape.vertex_count().to_string())?;
        // Flag bit 1: closed polyline.
        self.write_pair(group_code::FLAGS, "1")?;
        for vertex in &shape.vertices {
            self.write_pair(group_code::X, &format!("{:.6}", vertex.x))?;
            self.write_pair(group_code::Y, &format!("{:.6}", vertex.y))?;
            if vertex.bulge.abs() > BULGE_EPSILON {
                self.write_pair(group_code::BULGE, &format!("{:.6}", vertex.bulge))?;
            }
        }
        Ok(())
    }
}

/// Render a drawing to an in-memory DXF document.
pub fn write_drawing_string(drawing: &Drawing) -> Result<String, DxfError> {
    let mut buffer = Vec::new();
    DxfWriter::new(&mut buffer).write(drawing)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

// ── Reader ────────────────────────────────────────────────────────────

pub struct DxfReader;

#[derive(Default)]
struct PendingPolyline {
    layer: Option<String>,
    declared_count: Option<usize>,
    vertices: Vec<Vertex>,
    pending_x: Option<f64>,
    start_line: usize,
}

impl PendingPolyline {
    fn finish(self) -> Result<(ModuleShape, Option<String>), DxfError> {
        if self.pending_x.is_some() {
            return Err(DxfError::Malformed {
                line: self.start_line,
                message: "polyline vertex has X but no Y".to_string(),
            });
        }
        if let Some(declared) = self.declared_count {
            if declared != self.vertices.len() {
                return Err(DxfError::Malformed {
                    line: self.start_line,
                    message: format!(
                        "polyline declares {} vertices but carries {}",
                        declared,
                        self.vertices.len()
                    ),
                });
            }
        }
        Ok((ModuleShape::new(self.vertices), self.layer))
    }
}

impl DxfReader {
    /// Parse a DXF document produced by [`DxfWriter`] back into a
    /// [`Drawing`].
    pub fn parse(text: &str) -> Result<Drawing, DxfError> {
        let pairs = Self::tag_value_pairs(text)?;

        let mut shapes: Vec<ModuleShape> = Vec::new();
        let mut table_layer: Option<String> = None;
        let mut entity_layer: Option<String> = None;

        let mut section: Option<String> = None;
        let mut awaiting_section_name = false;
        let mut awaiting_table_layer = false;
        let mut current: Option<PendingPolyline> = None;

        for (line, code, value) in pairs {
            if code == group_code::MARKER {
                if let Some(pending) = current.take() {
                    let (shape, layer) = pending.finish()?;
                    if entity_layer.is_none() {
                        entity_layer = layer;
                    }
                    shapes.push(shape);
                }
                match value {
                    "SECTION" => awaiting_section_name = true,
                    "ENDSEC" => section = None,
                    "LWPOLYLINE" if section.as_deref() == Some("ENTITIES") => {
                        current = Some(PendingPolyline {
                            start_line: line,
                            ..PendingPolyline::default()
                        });
                    }
                    "LAYER" if section.as_deref() == Some("TABLES") => {
                        awaiting_table_layer = true;
                    }
                    _ => {}
                }
                continue;
            }

            if code == group_code::NAME {
                if awaiting_section_name {
                    section = Some(value.to_string());
                    awaiting_section_name = false;
                } else if awaiting_table_layer {
                    table_layer = Some(value.to_string());
                    awaiting_table_layer = false;
                }
                continue;
            }

            let Some(pending) = current.as_mut() else {
                continue;
            };
            match code {
                group_code::LAYER => pending.layer = Some(value.to_string()),
                group_code::VERTEX_COUNT => {
                    pending.declared_count =
                        Some(value.parse().map_err(|_| DxfError::Malformed {
                            line,
                            message: format!("invalid vertex count '{value}'"),
                        })?);
                }
                group_code::X => {
                    if pending.pending_x.is_some() {
                        return Err(DxfError::Malformed {
                            line,
                            message: "vertex X repeated without Y".to_string(),
                        });
                    }
                    pending.pending_x = Some(Self::parse_f64(value, line)?);
                }
                group_code::Y => {
                    let x = pending.pending_x.take().ok_or(DxfError::Malformed {
                        line,
                        message: "vertex Y without preceding X".to_string(),
                    })?;
                    pending
                        .vertices
                        .push(Vertex::straight(x, Self::parse_f64(value, line)?));
                }
                group_code::BULGE => {
                    let bulge = Self::parse_f64(value, line)?;
                    let vertex = pending.vertices.last_mut().ok_or(DxfError::Malformed {
                        line,
                        message: "bulge without a vertex".to_string(),
                    })?;
                    vertex.bulge = bulge;
                }
                // Flags and styling codes carry nothing we need to
                // rebuild the geometry.
                _ => {}
            }
        }

        if let Some(pending) = current.take() {
            let (shape, layer) = pending.finish()?;
            if entity_layer.is_none() {
                entity_layer = layer;
            }
            shapes.push(shape);
        }

        let layer_name = table_layer
            .or(entity_layer)
            .unwrap_or_else(|| "0".to_string());
        let mut drawing = Drawing::new(&layer_name);
        drawing.shapes = shapes;
        log::debug!(
            "parsed {} LWPOLYLINE entities on layer '{}'",
            drawing.shape_count(),
            drawing.layer_name
        );
        Ok(drawing)
    }

    fn tag_value_pairs(text: &str) -> Result<Vec<(usize, &str, &str)>, DxfError> {
        let mut pairs = Vec::new();
        let mut lines = text.lines().enumerate();
        while let Some((n, code)) = lines.next() {
            let code = code.trim();
            if code.is_empty() {
                continue;
            }
            let Some((_, value)) = lines.next() else {
                return Err(DxfError::Malformed {
                    line: n + 1,
                    message: format!("group code {code} without a value"),
                });
            };
            pairs.push((n + 1, code, value.trim()));
        }
        Ok(pairs)
    }

    fn parse_f64(value: &str, line: usize) -> Result<f64, DxfError> {
        value.parse().map_err(|_| DxfError::Malformed {
            line,
            message: format!("invalid number '{value}'"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrcad_core::geometry::quarter_arc_bulge;
    use qrcad_core::{emit, encode, ErrorCorrection, RenderConfig};

    fn sample_drawing(corner_radius: f64) -> Drawing {
        let matrix = encode::encode_text("dxf sample", ErrorCorrection::Medium).unwrap();
        let config = RenderConfig {
            module_size: 2.0,
            corner_radius,
            ..RenderConfig::default()
        };
        emit(&matrix, &config).unwrap()
    }

    fn assert_drawings_close(a: &Drawing, b: &Drawing, tolerance: f64) {
        assert_eq!(a.layer_name, b.layer_name);
        assert_eq!(a.shape_count(), b.shape_count());
        for (sa, sb) in a.shapes.iter().zip(&b.shapes) {
            assert_eq!(sa.vertex_count(), sb.vertex_count());
            for (va, vb) in sa.vertices.iter().zip(&sb.vertices) {
                assert!((va.x - vb.x).abs() < tolerance);
                assert!((va.y - vb.y).abs() < tolerance);
                assert!((va.bulge - vb.bulge).abs() < tolerance);
            }
        }
    }

    #[test]
    fn test_document_structure() {
        let text = write_drawing_string(&sample_drawing(0.0)).unwrap();
        assert!(text.starts_with("0\nSECTION\n2\nHEADER\n"));
        assert!(text.ends_with("0\nEOF\n"));
        assert!(text.contains("2\nTABLES\n"));
        assert!(text.contains("6\nCONTINUOUS\n"));
        assert!(text.contains("2\nENTITIES\n"));
    }

    #[test]
    fn test_one_entity_per_dark_module() {
        let drawing = sample_drawing(0.5);
        let text = write_drawing_string(&drawing).unwrap();
        let entities = text.matches("LWPOLYLINE").count();
        assert_eq!(entities, drawing.shape_count());
    }

    #[test]
    fn test_square_modules_carry_no_bulge_code() {
        let text = write_drawing_string(&sample_drawing(0.0)).unwrap();
        assert!(!text.contains("\n42\n"));
    }

    #[test]
    fn test_rounded_modules_carry_bulge_code() {
        let text = write_drawing_string(&sample_drawing(0.5)).unwrap();
        let expected = format!("{:.6}", quarter_arc_bulge());
        assert!(text.contains(&format!("42\n{expected}\n")));
    }

    #[test]
    fn test_round_trip_squares() {
        let drawing = sample_drawing(0.0);
        let text = write_drawing_string(&drawing).unwrap();
        let parsed = DxfReader::parse(&text).unwrap();
        assert_drawings_close(&drawing, &parsed, 1e-6);
    }

    #[test]
    fn test_round_trip_rounded() {
        let drawing = sample_drawing(0.5);
        let text = write_drawing_string(&drawing).unwrap();
        let parsed = DxfReader::parse(&text).unwrap();
        assert_drawings_close(&drawing, &parsed, 1e-6);
    }

    #[test]
    fn test_layer_name_survives_round_trip() {
        let matrix = encode::encode_text("layers", ErrorCorrection::Low).unwrap();
        let config = RenderConfig {
            layer_name: "CUT".to_string(),
            ..RenderConfig::default()
        };
        let drawing = emit(&matrix, &config).unwrap();
        let parsed = DxfReader::parse(&write_drawing_string(&drawing).unwrap()).unwrap();
        assert_eq!(parsed.layer_name, "CUT");
    }

    #[test]
    fn test_reader_rejects_dangling_group_code() {
        let text = "0\nSECTION\n2";
        match DxfReader::parse(text) {
            Err(DxfError::Malformed { .. }) => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_reader_rejects_vertex_count_mismatch() {
        let text = concat!(
            "0\nSECTION\n2\nENTITIES\n",
            "0\nLWPOLYLINE\n8\nQR\n90\n4\n70\n1\n",
            "10\n0.0\n20\n0.0\n",
            "10\n1.0\n20\n0.0\n",
            "0\nENDSEC\n0\nEOF\n",
        );
        match DxfReader::parse(text) {
            Err(DxfError::Malformed { message, .. }) => {
                assert!(message.contains("declares 4"));
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_reader_rejects_bulge_without_vertex() {
        let text = concat!(
            "0\nSECTION\n2\nENTITIES\n",
            "0\nLWPOLYLINE\n8\nQR\n42\n0.414214\n",
            "0\nENDSEC\n0\nEOF\n",
        );
        assert!(matches!(
            DxfReader::parse(text),
            Err(DxfError::Malformed { .. })
        ));
    }

    #[test]
    fn test_empty_document_parses_to_empty_drawing() {
        let drawing = Drawing::new("QR");
        let text = write_drawing_string(&drawing).unwrap();
        let parsed = DxfReader::parse(&text).unwrap();
        assert_eq!(parsed.layer_name, "QR");
        assert_eq!(parsed.shape_count(), 0);
    }
}
