use thiserror::Error;

use crate::segment::grid::Pixel;

/// Malformed input grid.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("grid must have at least one row and one column")]
    EmptyGrid,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("buffer holds {found} cells, expected {expected}")]
    BufferLength { expected: usize, found: usize },

    #[error("grid dimensions {width}x{height} exceed the addressable cell count")]
    TooLarge { width: usize, height: usize },
}

/// Broken disjoint-set forest precondition.
///
/// These indicate a bug in the caller rather than bad input data.
#[derive(Debug, Error, PartialEq)]
pub enum ForestError {
    #[error("pixel ({row}, {col}) has no node in the forest")]
    OutOfBounds { row: u32, col: u32 },

    #[error("pixel ({row}, {col}) is not the representative of its segment")]
    NotRepresentative { row: u32, col: u32 },

    #[error("cannot union pixel ({row}, {col}) with itself")]
    SelfUnion { row: u32, col: u32 },
}

impl ForestError {
    pub(crate) fn out_of_bounds(p: Pixel) -> Self {
        ForestError::OutOfBounds { row: p.row, col: p.col }
    }

    pub(crate) fn not_representative(p: Pixel) -> Self {
        ForestError::NotRepresentative { row: p.row, col: p.col }
    }
}

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("granularity must be positive and finite, got {0}")]
    InvalidGranularity(f64),

    #[error("distance between {a:?} and {b:?} is {weight}, expected a non-negative number")]
    InvalidWeight { weight: f64, a: Pixel, b: Pixel },

    #[error("internal consistency violation: {0}")]
    Forest(#[from] ForestError),

    #[error("config parse error: {0}")]
    Config(String),
}
