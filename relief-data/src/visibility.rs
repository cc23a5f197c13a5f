//! Visibility statistics over a reconstruction's point tracks.

use crate::types::Reconstruction;
use std::collections::BTreeMap;

/// Track-length histogram and the derived multi-view ratio.
///
/// Computed fresh from a loaded reconstruction; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilityStats {
    histogram: BTreeMap<usize, usize>,
    total: usize,
}

impl VisibilityStats {
    pub fn from_reconstruction(recon: &Reconstruction) -> Self {
        Self::from_track_lengths(recon.points.iter().map(|p| p.track_length()))
    }

    pub fn from_track_lengths<I: IntoIterator<Item = usize>>(lengths: I) -> Self {
        let mut stats = Self::default();
        for len in lengths {
            *stats.histogram.entry(len).or_insert(0) += 1;
            stats.total += 1;
        }
        stats
    }

    /// Total number of points counted.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of points observed by two or more images.
    pub fn multi_view_count(&self) -> usize {
        self.histogram.range(2..).map(|(_, count)| count).sum()
    }

    /// Fraction of points observed by two or more images, in `[0, 1]`.
    /// An empty set has ratio `0.0`.
    pub fn multi_view_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.multi_view_count() as f64 / self.total as f64
        }
    }

    /// `(track_length, count)` pairs in ascending track-length order.
    pub fn buckets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.histogram.iter().map(|(&len, &count)| (len, count))
    }

    /// Share of the total held by `count`, as a percentage.
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }
}
