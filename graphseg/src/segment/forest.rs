use crate::error::ForestError;

use super::grid::{pixel_at, Pixel};

const UNSET: u32 = u32::MAX;

#[derive(Debug, Clone)]
struct Node {
    /// `None` while this node is the representative of its segment.
    parent: Option<u32>,
    rank: u32,
    /// Valid only while `parent` is `None`.
    size: u32,
    /// Valid only while `parent` is `None`.
    internal_distance: f64,
}

impl Node {
    fn singleton() -> Self {
        Self {
            parent: None,
            rank: 0,
            size: 1,
            internal_distance: 0.0,
        }
    }
}

/// Disjoint-set forest over a fixed grid, one node per cell.
///
/// Nodes live in an arena indexed by flattened row-major coordinate, and each
/// representative carries its segment's size and internal distance. Uses full
/// path compression on `find` and union by rank.
#[derive(Debug, Clone)]
pub struct DisjointSetForest {
    width: u32,
    height: u32,
    nodes: Vec<Node>,
    roots: usize,
}

impl DisjointSetForest {
    /// Create a forest of `width * height` singleton segments.
    pub fn new(width: u32, height: u32) -> Self {
        let n = width as usize * height as usize;
        Self {
            width,
            height,
            nodes: vec![Node::singleton(); n],
            roots: n,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of nodes (one per grid cell).
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of segments currently in the forest.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.roots
    }

    #[inline]
    fn index(&self, p: Pixel) -> Result<usize, ForestError> {
        if p.row < self.height && p.col < self.width {
            Ok(p.row as usize * self.width as usize + p.col as usize)
        } else {
            Err(ForestError::out_of_bounds(p))
        }
    }

    #[inline]
    fn root_index(&self, p: Pixel) -> Result<usize, ForestError> {
        let idx = self.index(p)?;
        match self.nodes[idx].parent {
            None => Ok(idx),
            Some(_) => Err(ForestError::not_representative(p)),
        }
    }

    /// Find the representative of the segment containing `p`.
    ///
    /// Every node on the walked path is re-pointed directly at the root.
    pub fn find(&mut self, p: Pixel) -> Result<Pixel, ForestError> {
        let start = self.index(p)?;
        let root = self.find_root(start);
        Ok(pixel_at(self.width, root))
    }

    fn find_root(&mut self, start: usize) -> usize {
        let mut root = start;
        while let Some(parent) = self.nodes[root].parent {
            root = parent as usize;
        }

        let mut cur = start;
        while let Some(parent) = self.nodes[cur].parent {
            self.nodes[cur].parent = Some(root as u32);
            cur = parent as usize;
        }

        root
    }

    /// Whether `p` is currently the representative of its segment.
    pub fn is_representative(&self, p: Pixel) -> Result<bool, ForestError> {
        let idx = self.index(p)?;
        Ok(self.nodes[idx].parent.is_none())
    }

    /// Merge the segments represented by `p1` and `p2`. Returns the surviving
    /// representative.
    ///
    /// Both arguments must be distinct representatives. The lower-rank root is
    /// attached under the higher-rank one; on a tie `p2` goes under `p1`. The
    /// survivor's internal distance is set to `internal_distance`.
    pub fn union(
        &mut self,
        p1: Pixel,
        p2: Pixel,
        internal_distance: f64,
    ) -> Result<Pixel, ForestError> {
        let i1 = self.root_index(p1)?;
        let i2 = self.root_index(p2)?;
        if i1 == i2 {
            return Err(ForestError::SelfUnion {
                row: p1.row,
                col: p1.col,
            });
        }

        let (root, child) = if self.nodes[i1].rank >= self.nodes[i2].rank {
            if self.nodes[i1].rank == self.nodes[i2].rank {
                self.nodes[i1].rank += 1;
            }
            (i1, i2)
        } else {
            (i2, i1)
        };

        self.nodes[child].parent = Some(root as u32);
        self.nodes[root].size += self.nodes[child].size;
        self.nodes[root].internal_distance = internal_distance;
        self.roots -= 1;

        Ok(pixel_at(self.width, root))
    }

    /// Size of the segment represented by `p`.
    pub fn size(&self, p: Pixel) -> Result<u32, ForestError> {
        self.root_index(p).map(|i| self.nodes[i].size)
    }

    /// Internal distance of the segment represented by `p`.
    pub fn internal_distance(&self, p: Pixel) -> Result<f64, ForestError> {
        self.root_index(p).map(|i| self.nodes[i].internal_distance)
    }

    /// Rank of the node for `p`. Meaningful for representatives only.
    pub fn rank(&self, p: Pixel) -> Result<u32, ForestError> {
        self.index(p).map(|i| self.nodes[i].rank)
    }

    /// Group every cell by its representative.
    ///
    /// Segments are ordered by their first member in row-major order, and
    /// members within a segment are row-major too.
    pub fn segments(&mut self) -> Partition {
        let n = self.nodes.len();
        let mut slot = vec![UNSET; n];
        let mut labels = Vec::with_capacity(n);
        let mut segments: Vec<Segment> = Vec::with_capacity(self.roots);

        for idx in 0..n {
            let rep_idx = self.find_root(idx);

            if slot[rep_idx] == UNSET {
                slot[rep_idx] = segments.len() as u32;
                segments.push(Segment {
                    representative: pixel_at(self.width, rep_idx),
                    members: Vec::with_capacity(self.nodes[rep_idx].size as usize),
                });
            }
            let label = slot[rep_idx];
            segments[label as usize].members.push(pixel_at(self.width, idx));
            labels.push(label);
        }

        Partition {
            width: self.width,
            height: self.height,
            segments,
            labels,
        }
    }
}

/// One segment of a finished partition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub representative: Pixel,
    /// Row-major member list; includes the representative.
    pub members: Vec<Pixel>,
}

impl Segment {
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Final grouping of grid cells into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    width: u32,
    height: u32,
    segments: Vec<Segment>,
    /// Segment index per cell, row-major.
    labels: Vec<u32>,
}

impl Partition {
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Per-cell segment indices in row-major order.
    #[inline]
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Index into [`segments`](Self::segments) of the segment holding `p`.
    pub fn label(&self, p: Pixel) -> Option<usize> {
        if p.row >= self.height || p.col >= self.width {
            return None;
        }
        let idx = p.row as usize * self.width as usize + p.col as usize;
        Some(self.labels[idx] as usize)
    }

    /// The segment holding `p`.
    pub fn segment_of(&self, p: Pixel) -> Option<&Segment> {
        self.label(p).map(|l| &self.segments[l])
    }

    /// The segment whose representative is `rep`.
    pub fn get(&self, rep: Pixel) -> Option<&Segment> {
        self.segment_of(rep).filter(|s| s.representative == rep)
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}

impl<'a> IntoIterator for &'a Partition {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(row: u32, col: u32) -> Pixel {
        Pixel::new(row, col)
    }

    #[test]
    fn new_forest_is_all_singletons() {
        let mut forest = DisjointSetForest::new(3, 2);
        assert_eq!(forest.len(), 6);
        assert_eq!(forest.segment_count(), 6);
        for row in 0..2 {
            for col in 0..3 {
                let p = px(row, col);
                assert_eq!(forest.find(p).unwrap(), p);
                assert_eq!(forest.size(p).unwrap(), 1);
                assert_eq!(forest.internal_distance(p).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn find_out_of_bounds_fails() {
        let mut forest = DisjointSetForest::new(3, 2);
        assert_eq!(
            forest.find(px(2, 0)),
            Err(ForestError::OutOfBounds { row: 2, col: 0 })
        );
        assert_eq!(
            forest.find(px(0, 3)),
            Err(ForestError::OutOfBounds { row: 0, col: 3 })
        );
    }

    #[test]
    fn union_equal_rank_attaches_second_under_first() {
        let mut forest = DisjointSetForest::new(2, 1);
        let root = forest.union(px(0, 0), px(0, 1), 0.5).unwrap();
        assert_eq!(root, px(0, 0));
        assert_eq!(forest.find(px(0, 1)).unwrap(), px(0, 0));
        assert_eq!(forest.rank(px(0, 0)).unwrap(), 1);
        assert_eq!(forest.size(px(0, 0)).unwrap(), 2);
        assert_eq!(forest.segment_count(), 1);
    }

    #[test]
    fn union_lower_rank_goes_under_higher() {
        let mut forest = DisjointSetForest::new(3, 1);
        // {0,1} has rank 1; {2} has rank 0
        forest.union(px(0, 0), px(0, 1), 0.0).unwrap();
        let root = forest.union(px(0, 2), px(0, 0), 0.0).unwrap();
        assert_eq!(root, px(0, 0));
        assert_eq!(forest.rank(px(0, 0)).unwrap(), 1);
        assert_eq!(forest.size(px(0, 0)).unwrap(), 3);
    }

    #[test]
    fn union_statistics_overwrite_internal_distance() {
        // A = {0,1,2} with internal distance 0.2, B = {3,4} with 0.5
        let mut forest = DisjointSetForest::new(5, 1);
        let a = forest.union(px(0, 0), px(0, 1), 0.1).unwrap();
        let a = forest.union(a, px(0, 2), 0.2).unwrap();
        let b = forest.union(px(0, 3), px(0, 4), 0.5).unwrap();
        assert_eq!(forest.size(a).unwrap(), 3);
        assert_eq!(forest.internal_distance(a).unwrap(), 0.2);
        assert_eq!(forest.size(b).unwrap(), 2);
        assert_eq!(forest.internal_distance(b).unwrap(), 0.5);

        let root = forest.union(a, b, 0.4).unwrap();
        assert_eq!(forest.size(root).unwrap(), 5);
        assert_eq!(forest.internal_distance(root).unwrap(), 0.4);
    }

    #[test]
    fn union_requires_representatives() {
        let mut forest = DisjointSetForest::new(3, 1);
        forest.union(px(0, 0), px(0, 1), 0.0).unwrap();
        assert_eq!(
            forest.union(px(0, 1), px(0, 2), 0.0),
            Err(ForestError::NotRepresentative { row: 0, col: 1 })
        );
        assert_eq!(
            forest.union(px(0, 2), px(0, 1), 0.0),
            Err(ForestError::NotRepresentative { row: 0, col: 1 })
        );
        // Nothing changed
        assert_eq!(forest.segment_count(), 2);
    }

    #[test]
    fn union_with_self_fails() {
        let mut forest = DisjointSetForest::new(2, 1);
        assert_eq!(
            forest.union(px(0, 1), px(0, 1), 0.0),
            Err(ForestError::SelfUnion { row: 0, col: 1 })
        );
    }

    #[test]
    fn stats_require_representative() {
        let mut forest = DisjointSetForest::new(2, 1);
        forest.union(px(0, 0), px(0, 1), 0.3).unwrap();
        assert!(matches!(
            forest.size(px(0, 1)),
            Err(ForestError::NotRepresentative { .. })
        ));
        assert!(matches!(
            forest.internal_distance(px(0, 1)),
            Err(ForestError::NotRepresentative { .. })
        ));
        assert!(!forest.is_representative(px(0, 1)).unwrap());
        assert!(forest.is_representative(px(0, 0)).unwrap());
    }

    #[test]
    fn find_compresses_path() {
        // Build a chain of height 2: 3 -> 2 -> 0 via rank-ordered unions
        let mut forest = DisjointSetForest::new(4, 1);
        forest.union(px(0, 0), px(0, 1), 0.0).unwrap();
        forest.union(px(0, 2), px(0, 3), 0.0).unwrap();
        forest.union(px(0, 0), px(0, 2), 0.0).unwrap();
        assert_eq!(forest.nodes[3].parent, Some(2));

        assert_eq!(forest.find(px(0, 3)).unwrap(), px(0, 0));
        assert_eq!(forest.nodes[3].parent, Some(0));
        assert_eq!(forest.nodes[2].parent, Some(0));
    }

    #[test]
    fn find_is_idempotent() {
        let mut forest = DisjointSetForest::new(3, 3);
        forest.union(px(0, 0), px(1, 1), 0.0).unwrap();
        forest.union(px(2, 2), px(0, 0), 0.0).unwrap();
        let first = forest.find(px(2, 2)).unwrap();
        for _ in 0..5 {
            assert_eq!(forest.find(px(2, 2)).unwrap(), first);
        }
    }

    #[test]
    fn segments_grouped_in_row_major_order() {
        // Segments: X = {(0,0), (1,1)}, Y = {(0,1), (1,0)}
        let mut forest = DisjointSetForest::new(2, 2);
        forest.union(px(1, 1), px(0, 0), 0.0).unwrap();
        forest.union(px(1, 0), px(0, 1), 0.0).unwrap();

        let partition = forest.segments();
        assert_eq!(partition.len(), 2);
        let segs = partition.segments();
        assert_eq!(segs[0].representative, px(1, 1));
        assert_eq!(segs[0].members, vec![px(0, 0), px(1, 1)]);
        assert_eq!(segs[1].representative, px(1, 0));
        assert_eq!(segs[1].members, vec![px(0, 1), px(1, 0)]);
        assert_eq!(partition.labels(), &[0, 1, 1, 0]);

        assert_eq!(partition.get(px(1, 1)).unwrap().len(), 2);
        assert!(partition.get(px(0, 0)).is_none());
        assert_eq!(partition.segment_of(px(0, 0)).unwrap().representative, px(1, 1));
        assert_eq!(partition.label(px(2, 0)), None);
    }

    #[test]
    fn segment_sizes_sum_to_cell_count() {
        let mut forest = DisjointSetForest::new(4, 4);
        forest.union(px(0, 0), px(0, 1), 0.0).unwrap();
        forest.union(px(3, 3), px(2, 2), 0.0).unwrap();
        let r = forest.find(px(2, 2)).unwrap();
        forest.union(r, px(1, 1), 0.0).unwrap();

        let reps: Vec<Pixel> = forest.segments().iter().map(|s| s.representative).collect();
        let partition = forest.segments();
        let total: usize = partition.iter().map(Segment::len).sum();
        assert_eq!(total, 16);
        for (seg, rep) in partition.iter().zip(reps) {
            assert_eq!(forest.size(rep).unwrap() as usize, seg.len());
        }
    }
}
