use tracing::{debug, debug_span, info};

use crate::color::ColorDistance;
use crate::error::{ForestError, SegmentError};

use super::edges::{build_edges, Edge};
use super::forest::{DisjointSetForest, Partition};
use super::grid::{Pixel, PixelGrid};
use super::recolor::{recolor, Palette};

/// Segmenter configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SegmenterConfig {
    /// Scale of the merge threshold. Larger values yield fewer, larger
    /// segments. Must be positive and finite.
    pub granularity: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self { granularity: 300.0 }
    }
}

impl SegmenterConfig {
    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.granularity.is_finite() && self.granularity > 0.0 {
            Ok(())
        } else {
            Err(SegmentError::InvalidGranularity(self.granularity))
        }
    }

    /// Parse a config from TOML, e.g. `granularity = 500.0`.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SegmentError> {
        let config: SegmenterConfig =
            toml::from_str(toml_str).map_err(|e| SegmentError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Counters collected during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentStats {
    /// Edges in the grid graph.
    pub edges: usize,
    /// Edges that merged two segments.
    pub merges: usize,
    /// Segments in the final partition.
    pub segments: usize,
}

/// Result of a segmentation run.
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub partition: Partition,
    pub stats: SegmentStats,
}

impl Segmentation {
    /// Paint every segment of `grid` with the color `palette` assigns it.
    pub fn recolor<C, P>(&self, grid: &PixelGrid<C>, palette: &P) -> PixelGrid<P::Output>
    where
        C: Sync,
        P: Palette<C>,
    {
        recolor(&self.partition, grid, palette)
    }
}

/// Greedy graph-based segmenter.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    pub config: SegmenterConfig,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Segment `grid`, weighting edges with `distance`.
    pub fn segment<C, D>(
        &self,
        grid: &PixelGrid<C>,
        distance: &D,
    ) -> Result<Segmentation, SegmentError>
    where
        D: ColorDistance<C> + ?Sized,
    {
        self.config.validate()?;
        let granularity = self.config.granularity;
        let _span = debug_span!(
            "segment",
            width = grid.width(),
            height = grid.height(),
            granularity
        )
        .entered();

        let edges = build_edges(grid, distance)?;
        debug!(edges = edges.len(), "built edge set");

        let mut forest = DisjointSetForest::new(grid.width(), grid.height());
        let mut merges = 0;
        for edge in &edges {
            if process_edge(&mut forest, edge, granularity)? {
                merges += 1;
            }
        }
        debug!(merges, "processed edges");

        let partition = forest.segments();
        let stats = SegmentStats {
            edges: edges.len(),
            merges,
            segments: partition.len(),
        };
        info!(
            edges = stats.edges,
            segments = stats.segments,
            "segmentation finished"
        );

        Ok(Segmentation { partition, stats })
    }
}

/// Segment `grid` with a one-off [`Segmenter`].
pub fn segment<C, D>(
    grid: &PixelGrid<C>,
    distance: &D,
    granularity: f64,
) -> Result<Segmentation, SegmentError>
where
    D: ColorDistance<C> + ?Sized,
{
    Segmenter::new(SegmenterConfig { granularity }).segment(grid, distance)
}

/// The weight an edge between segments `r1` and `r2` must stay strictly below
/// for them to merge.
///
/// Both arguments must be representatives.
pub fn merge_threshold(
    forest: &DisjointSetForest,
    r1: Pixel,
    r2: Pixel,
    granularity: f64,
) -> Result<f64, ForestError> {
    let bound1 = forest.internal_distance(r1)? + granularity / forest.size(r1)? as f64;
    let bound2 = forest.internal_distance(r2)? + granularity / forest.size(r2)? as f64;
    Ok(bound1.min(bound2))
}

/// Apply the merge rule to one edge. Returns whether the edge merged two
/// segments.
///
/// Edges must be fed in ascending [`Edge`] order for the result to match a
/// full run.
pub fn process_edge(
    forest: &mut DisjointSetForest,
    edge: &Edge,
    granularity: f64,
) -> Result<bool, ForestError> {
    let r1 = forest.find(edge.a)?;
    let r2 = forest.find(edge.b)?;
    if r1 == r2 {
        return Ok(false);
    }

    if edge.weight < merge_threshold(forest, r1, r2, granularity)? {
        forest.union(r1, r2, edge.weight)?;
        Ok(true)
    } else {
        Ok(false)
    }
}
