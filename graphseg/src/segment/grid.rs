use std::ops::Index;

use crate::error::GridError;

/// A grid cell, identified by its coordinate alone.
///
/// Ordering is row-major: by `row`, then `col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pixel {
    pub row: u32,
    pub col: u32,
}

impl Pixel {
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Immutable rectangular grid of colors with row-major storage.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid<C> {
    width: u32,
    height: u32,
    cells: Vec<C>,
}

impl<C> PixelGrid<C> {
    /// Build a grid from a flat row-major buffer of exactly `width * height` cells.
    pub fn from_buf(width: u32, height: u32, cells: Vec<C>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid);
        }
        let expected = checked_len(width as usize, height as usize)?;
        if cells.len() != expected {
            return Err(GridError::BufferLength {
                expected,
                found: cells.len(),
            });
        }
        Ok(Self { width, height, cells })
    }

    /// Wrap a buffer whose length is already known to be `width * height`.
    pub(crate) fn from_parts(width: u32, height: u32, cells: Vec<C>) -> Self {
        debug_assert_eq!(cells.len(), width as usize * height as usize);
        Self { width, height, cells }
    }

    /// Build a grid from a list of rows, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<C>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid);
        }
        let len = checked_len(width, height)?;

        let mut cells = Vec::with_capacity(len);
        for (row, cols) in rows.into_iter().enumerate() {
            if cols.len() != width {
                return Err(GridError::RaggedRow {
                    row,
                    expected: width,
                    found: cols.len(),
                });
            }
            cells.extend(cols);
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells (`width * height`).
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a grid has at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn contains(&self, p: Pixel) -> bool {
        p.row < self.height && p.col < self.width
    }

    /// Flattened row-major index of `p`, if it lies inside the grid.
    #[inline]
    pub fn index_of(&self, p: Pixel) -> Option<usize> {
        self.contains(p)
            .then(|| p.row as usize * self.width as usize + p.col as usize)
    }

    /// Pixel at a flattened row-major index.
    #[inline]
    pub fn pixel_at(&self, index: usize) -> Pixel {
        pixel_at(self.width, index)
    }

    #[inline]
    pub fn get(&self, p: Pixel) -> Option<&C> {
        self.index_of(p).map(|i| &self.cells[i])
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| Pixel::new(row, col)))
    }

    /// Row-major cell slice.
    #[inline]
    pub fn as_slice(&self) -> &[C] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[C]> {
        self.cells.chunks_exact(self.width as usize)
    }

    pub fn into_vec(self) -> Vec<C> {
        self.cells
    }

    /// Apply `f` to every cell, keeping the dimensions.
    pub fn map<D>(&self, f: impl FnMut(&C) -> D) -> PixelGrid<D> {
        PixelGrid::from_parts(self.width, self.height, self.cells.iter().map(f).collect())
    }
}

impl<C> Index<Pixel> for PixelGrid<C> {
    type Output = C;

    /// Panics if `p` is outside the grid.
    fn index(&self, p: Pixel) -> &C {
        match self.get(p) {
            Some(c) => c,
            None => panic!(
                "pixel ({}, {}) outside {}x{} grid",
                p.row, p.col, self.width, self.height
            ),
        }
    }
}

#[inline]
pub(crate) fn pixel_at(width: u32, index: usize) -> Pixel {
    let w = width as usize;
    Pixel::new((index / w) as u32, (index % w) as u32)
}

/// Cell count, bounded so every index fits in a `u32`.
fn checked_len(width: usize, height: usize) -> Result<usize, GridError> {
    width
        .checked_mul(height)
        .filter(|&n| n <= u32::MAX as usize)
        .ok_or(GridError::TooLarge { width, height })
}
