//! Pairwise color distances used as edge weights.

/// An 8-bit RGB color.
pub type Rgb = [u8; 3];

/// A symmetric, non-negative dissimilarity between two colors.
///
/// Any closure `Fn(&C, &C) -> f64` is a distance, which keeps stub metrics in
/// tests to a one-liner.
pub trait ColorDistance<C>: Sync {
    fn distance(&self, a: &C, b: &C) -> f64;
}

impl<C, F> ColorDistance<C> for F
where
    F: Fn(&C, &C) -> f64 + Sync,
{
    #[inline]
    fn distance(&self, a: &C, b: &C) -> f64 {
        self(a, b)
    }
}

/// Euclidean (L2) distance over channel values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

/// Manhattan (L1) distance over channel values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl ColorDistance<u8> for Euclidean {
    #[inline]
    fn distance(&self, a: &u8, b: &u8) -> f64 {
        (*a as f64 - *b as f64).abs()
    }
}

impl<const N: usize> ColorDistance<[u8; N]> for Euclidean {
    #[inline]
    fn distance(&self, a: &[u8; N], b: &[u8; N]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(&x, &y)| {
                let d = x as f64 - y as f64;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl ColorDistance<u8> for Manhattan {
    #[inline]
    fn distance(&self, a: &u8, b: &u8) -> f64 {
        a.abs_diff(*b) as f64
    }
}

impl<const N: usize> ColorDistance<[u8; N]> for Manhattan {
    #[inline]
    fn distance(&self, a: &[u8; N], b: &[u8; N]) -> f64 {
        a.iter().zip(b).map(|(&x, &y)| x.abs_diff(y) as f64).sum()
    }
}
