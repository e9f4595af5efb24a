use std::cmp::Ordering;

use crate::color::ColorDistance;
use crate::error::SegmentError;

use super::grid::{Pixel, PixelGrid};

/// Forward neighbor offsets as (drow, dcol): east, southeast, south, southwest.
///
/// Every target is later in row-major order than its source, so each
/// undirected adjacency is produced once, always with `a < b`.
const NEIGHBOR_OFFSETS: [(i64, i64); 4] = [(0, 1), (1, 1), (1, 0), (1, -1)];

/// A weighted undirected edge between two adjacent pixels, with `a < b`.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub a: Pixel,
    pub b: Pixel,
    pub weight: f64,
}

impl Ord for Edge {
    /// Ascending weight, ties broken by endpoint coordinates.
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| self.a.cmp(&other.a))
            .then_with(|| self.b.cmp(&other.b))
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Edge {}

/// Number of edges `build_edges` produces for a `width x height` grid.
pub fn edge_count(width: u32, height: u32) -> usize {
    let w = width as usize;
    let h = height as usize;
    // east + south + two diagonals
    h * w.saturating_sub(1) + h.saturating_sub(1) * w + 2 * h.saturating_sub(1) * w.saturating_sub(1)
}

/// Build the 8-connected grid graph and return its edges sorted by [`Edge::cmp`].
///
/// Weights come from `distance`; a negative or NaN weight is rejected.
pub fn build_edges<C, D>(grid: &PixelGrid<C>, distance: &D) -> Result<Vec<Edge>, SegmentError>
where
    D: ColorDistance<C> + ?Sized,
{
    let w = grid.width() as i64;
    let h = grid.height() as i64;
    let cells = grid.as_slice();
    let mut edges = Vec::with_capacity(edge_count(grid.width(), grid.height()));

    for row in 0..h {
        for col in 0..w {
            let a = Pixel::new(row as u32, col as u32);
            let ca = &cells[(row * w + col) as usize];

            for &(dr, dc) in &NEIGHBOR_OFFSETS {
                let nr = row + dr;
                let nc = col + dc;
                if nr >= h || nc < 0 || nc >= w {
                    continue;
                }

                let b = Pixel::new(nr as u32, nc as u32);
                let weight = distance.distance(ca, &cells[(nr * w + nc) as usize]);
                // Also rejects NaN.
                if !(weight >= 0.0) {
                    return Err(SegmentError::InvalidWeight { weight, a, b });
                }
                // -0.0 sorts below 0.0 under total_cmp
                let weight = if weight == 0.0 { 0.0 } else { weight };

                edges.push(Edge { a, b, weight });
            }
        }
    }

    edges.sort();
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Euclidean;

    fn make_grid(w: u32, h: u32, cells: &[u8]) -> PixelGrid<u8> {
        PixelGrid::from_buf(w, h, cells.to_vec()).unwrap()
    }

    #[test]
    fn single_pixel_has_no_edges() {
        let grid = make_grid(1, 1, &[7]);
        let edges = build_edges(&grid, &Euclidean).unwrap();
        assert!(edges.is_empty());
        assert_eq!(edge_count(1, 1), 0);
    }

    #[test]
    fn two_by_two_has_six_edges() {
        let grid = make_grid(2, 2, &[0; 4]);
        let edges = build_edges(&grid, &Euclidean).unwrap();
        // 2 horizontal, 2 vertical, 2 diagonal
        assert_eq!(edges.len(), 6);
        assert_eq!(edge_count(2, 2), 6);
    }

    #[test]
    fn count_matches_formula() {
        for (w, h) in [(1, 5), (5, 1), (3, 4), (7, 2)] {
            let grid = make_grid(w, h, &vec![0; (w * h) as usize]);
            let edges = build_edges(&grid, &Euclidean).unwrap();
            assert_eq!(edges.len(), edge_count(w, h), "{w}x{h}");
        }
    }

    #[test]
    fn each_adjacency_emitted_once() {
        let grid = make_grid(4, 3, &[0; 12]);
        let edges = build_edges(&grid, &Euclidean).unwrap();
        let mut pairs: Vec<(Pixel, Pixel)> = edges.iter().map(|e| (e.a, e.b)).collect();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), edges.len());

        for e in &edges {
            assert!(e.a < e.b);
            let dr = e.b.row as i64 - e.a.row as i64;
            let dc = e.b.col as i64 - e.a.col as i64;
            assert!(dr.abs() <= 1 && dc.abs() <= 1 && (dr, dc) != (0, 0));
        }
    }

    #[test]
    fn sorted_by_weight_then_coordinates() {
        #[rustfmt::skip]
        let cells = [
            0, 10, 10,
            0,  0, 30,
        ];
        let grid = make_grid(3, 2, &cells);
        let edges = build_edges(&grid, &Euclidean).unwrap();
        for pair in edges.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].weight <= pair[1].weight);
        }
        // Zero-weight ties start with the lowest coordinate pair.
        assert_eq!(edges[0].a, Pixel::new(0, 0));
        assert_eq!(edges[0].b, Pixel::new(1, 0));
        assert_eq!(edges.last().unwrap().weight, 30.0);
    }

    #[test]
    fn southwest_neighbor_included() {
        let grid = make_grid(2, 2, &[0, 5, 9, 0]);
        let edges = build_edges(&grid, &Euclidean).unwrap();
        let sw = edges
            .iter()
            .find(|e| e.a == Pixel::new(0, 1) && e.b == Pixel::new(1, 0))
            .expect("southwest edge");
        assert_eq!(sw.weight, 4.0);
    }

    #[test]
    fn negative_weight_rejected() {
        let grid = make_grid(2, 1, &[0, 1]);
        let err = build_edges(&grid, &|_: &u8, _: &u8| -1.0).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidWeight { weight, .. } if weight == -1.0));
    }

    #[test]
    fn nan_weight_rejected() {
        let grid = make_grid(2, 1, &[0, 1]);
        let err = build_edges(&grid, &|_: &u8, _: &u8| f64::NAN).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidWeight { .. }));
    }
}
