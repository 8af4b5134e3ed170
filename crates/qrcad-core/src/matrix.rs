//! Boolean module grid and symbol-structure helpers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geometry::GeometryError;

/// A module coordinate as `(col, row)`, matching the matrix orientation.
pub type ModuleCoord = (usize, usize);

/// A square grid of QR modules. Cell `(row, col)` is `true` when the
/// module is dark. Row 0 is the top scan line of the symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    size: usize,
    cells: Vec<bool>,
}

impl Matrix {
    /// An all-light matrix of the given size.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![false; size * size],
        }
    }

    /// Build a matrix from row vectors, rejecting ragged input.
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self, GeometryError> {
        let size = rows.len();
        let mut matrix = Matrix::new(size);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != size {
                return Err(GeometryError::NonSquareMatrix {
                    row,
                    expected: size,
                    actual: cells.len(),
                });
            }
            for (col, &dark) in cells.iter().enumerate() {
                matrix.set(row, col, dark);
            }
        }
        Ok(matrix)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Whether the module at `(row, col)` is dark. Panics when out of
    /// bounds, like slice indexing.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.size + col]
    }

    pub fn set(&mut self, row: usize, col: usize, dark: bool) {
        self.cells[row * self.size + col] = dark;
    }

    pub fn dark_count(&self) -> usize {
        self.cells.iter().filter(|&&dark| dark).count()
    }
}

/// Infer the quiet-zone padding embedded in a matrix.
///
/// Matrices produced by [`crate::encode`] carry no padding and return 0;
/// matrices arriving from elsewhere often have the quiet zone baked in.
/// The zone is the minimum dark x/y coordinate.
pub fn detect_quiet_zone(matrix: &Matrix) -> usize {
    let size = matrix.size();
    if size == 0 {
        return 0;
    }
    let mut min_col = size;
    let mut min_row = size;
    for row in 0..size {
        for col in 0..size {
            if matrix.get(row, col) {
                min_col = min_col.min(col);
                min_row = min_row.min(row);
            }
        }
    }
    if min_col == size || min_row == size {
        return 0;
    }
    min_col.min(min_row)
}

/// Locate the dark modules of the three 7×7 finder patterns.
///
/// Returns `(frame, eyes)` as `(col, row)` sets: `eyes` is the centre
/// 3×3 of each finder, `frame` the remaining dark finder modules. These
/// sets let the emitter round finder corners differently from the body.
/// Matrices smaller than one finder pattern yield empty sets.
pub fn finder_pattern_modules(matrix: &Matrix) -> (HashSet<ModuleCoord>, HashSet<ModuleCoord>) {
    let size = matrix.size();
    let mut frame = HashSet::new();
    let mut eyes = HashSet::new();
    if size < 7 {
        return (frame, eyes);
    }

    let quiet_zone = detect_quiet_zone(matrix);
    let far = match (size - quiet_zone).checked_sub(7) {
        Some(far) if far >= quiet_zone => far,
        _ => return (frame, eyes),
    };

    // Top-left, top-right, bottom-left.
    let origins = [(quiet_zone, quiet_zone), (far, quiet_zone), (quiet_zone, far)];

    for (origin_col, origin_row) in origins {
        for dy in 0..7 {
            for dx in 0..7 {
                let col = origin_col + dx;
                let row = origin_row + dy;
                if !matrix.get(row, col) {
                    continue;
                }
                if (2..=4).contains(&dx) && (2..=4).contains(&dy) {
                    eyes.insert((col, row));
                } else {
                    frame.insert((col, row));
                }
            }
        }
    }

    (frame, eyes)
}
