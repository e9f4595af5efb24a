pub mod error;
pub mod color;
pub mod segment;

pub use color::{ColorDistance, Euclidean, Manhattan, Rgb};
pub use error::{ForestError, GridError, SegmentError};
pub use segment::driver::{segment, Segmentation, SegmentStats, Segmenter, SegmenterConfig};
pub use segment::forest::{Partition, Segment};
pub use segment::grid::{Pixel, PixelGrid};
pub use segment::recolor::{MeanColor, Palette, RandomPalette};
