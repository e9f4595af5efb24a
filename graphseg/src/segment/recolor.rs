//! Painting a finished partition back onto a grid.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::color::Rgb;

use super::forest::{Partition, Segment};
use super::grid::PixelGrid;

/// Chooses the output color of each segment.
///
/// `color` is called once per segment, possibly from several threads at once,
/// so it should depend only on its arguments.
pub trait Palette<C>: Sync {
    type Output: Copy + Send + Sync;

    /// Color for the segment at `index` in the partition.
    fn color(&self, index: usize, segment: &Segment, grid: &PixelGrid<C>) -> Self::Output;
}

/// A random RGB color per segment, reproducible from `seed`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPalette {
    pub seed: u64,
}

impl RandomPalette {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl<C> Palette<C> for RandomPalette {
    type Output = Rgb;

    fn color(&self, index: usize, _segment: &Segment, _grid: &PixelGrid<C>) -> Rgb {
        let mut rng = Pcg32::seed_from_u64(self.seed.wrapping_add(index as u64));
        rng.gen()
    }
}

/// Paint each segment with the rounded per-channel mean of its members.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanColor;

impl<const N: usize> Palette<[u8; N]> for MeanColor {
    type Output = [u8; N];

    fn color(&self, _index: usize, segment: &Segment, grid: &PixelGrid<[u8; N]>) -> [u8; N] {
        let mut sums = [0u64; N];
        for &p in &segment.members {
            for (sum, &c) in sums.iter_mut().zip(&grid[p]) {
                *sum += c as u64;
            }
        }
        let n = segment.members.len().max(1) as u64;
        sums.map(|sum| ((sum + n / 2) / n) as u8)
    }
}

impl Palette<u8> for MeanColor {
    type Output = u8;

    fn color(&self, _index: usize, segment: &Segment, grid: &PixelGrid<u8>) -> u8 {
        let sum: u64 = segment.members.iter().map(|&p| grid[p] as u64).sum();
        let n = segment.members.len().max(1) as u64;
        ((sum + n / 2) / n) as u8
    }
}

/// Build an output grid where every cell holds its segment's palette color.
///
/// Segment colors are computed independently of one another (in parallel with
/// the `parallel` feature); each output cell is then read from its segment's
/// color. Panics if `partition` and `grid` differ in size.
pub fn recolor<C, P>(
    partition: &Partition,
    grid: &PixelGrid<C>,
    palette: &P,
) -> PixelGrid<P::Output>
where
    C: Sync,
    P: Palette<C> + ?Sized,
{
    assert_eq!(
        (partition.width(), partition.height()),
        (grid.width(), grid.height()),
        "partition and grid dimensions differ"
    );

    #[cfg(feature = "parallel")]
    let cells: Vec<P::Output> = {
        let colors: Vec<P::Output> = partition
            .segments()
            .par_iter()
            .enumerate()
            .map(|(i, segment)| palette.color(i, segment, grid))
            .collect();
        partition
            .labels()
            .par_iter()
            .map(|&label| colors[label as usize])
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let cells: Vec<P::Output> = {
        let colors: Vec<P::Output> = partition
            .segments()
            .iter()
            .enumerate()
            .map(|(i, segment)| palette.color(i, segment, grid))
            .collect();
        partition
            .labels()
            .iter()
            .map(|&label| colors[label as usize])
            .collect()
    };

    PixelGrid::from_parts(partition.width(), partition.height(), cells)
}
