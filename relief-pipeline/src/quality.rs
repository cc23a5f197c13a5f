//! Multi-view quality gate.
//!
//! The gate is advisory: a low multi-view ratio produces a warning with
//! remediation hints, never an error. Only an empty point set is fatal.

use crate::constants::MIN_MULTI_VIEW_RATIO;
use crate::error::PipelineError;
use relief_data::{Reconstruction, VisibilityStats, load_reconstruction};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Suggested ways to recover from poor multi-view coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    SkipRefine,
    IncreaseQueryBudget,
    AddOverlappingImages,
}

impl Remediation {
    pub const ALL: [Remediation; 3] = [
        Remediation::SkipRefine,
        Remediation::IncreaseQueryBudget,
        Remediation::AddOverlappingImages,
    ];
}

impl fmt::Display for Remediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Remediation::SkipRefine => "skip the mesh refinement step",
            Remediation::IncreaseQueryBudget => "increase the query frame and query point budgets",
            Remediation::AddOverlappingImages => "add more input images with overlapping views",
        })
    }
}

/// Raised when too few points are seen from more than one image.
#[derive(Debug, Clone, PartialEq)]
pub struct LowVisibilityAdvisory {
    pub ratio: f64,
    pub threshold: f64,
    pub remediations: Vec<Remediation>,
}

/// Outcome of the gate: statistics plus an optional advisory.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub stats: VisibilityStats,
    pub advisory: Option<LowVisibilityAdvisory>,
}

impl QualityReport {
    pub fn evaluate(stats: VisibilityStats) -> Self {
        let ratio = stats.multi_view_ratio();
        let advisory = (ratio < MIN_MULTI_VIEW_RATIO).then(|| LowVisibilityAdvisory {
            ratio,
            threshold: MIN_MULTI_VIEW_RATIO,
            remediations: Remediation::ALL.to_vec(),
        });
        Self { stats, advisory }
    }

    pub fn multi_view_ratio(&self) -> f64 {
        self.stats.multi_view_ratio()
    }

    pub fn has_advisory(&self) -> bool {
        self.advisory.is_some()
    }

    pub fn log(&self) {
        info!("Track length distribution ({} points):", self.stats.total());
        for (len, count) in self.stats.buckets() {
            info!(
                "  {:>3} views: {:>8} points ({:5.1}%)",
                len,
                count,
                self.stats.percentage(count)
            );
        }
        info!(
            "Multi-view ratio: {:.3} ({} of {} points seen by 2+ images)",
            self.multi_view_ratio(),
            self.stats.multi_view_count(),
            self.stats.total()
        );

        if let Some(advisory) = &self.advisory {
            warn!(
                "Only {:.1}% of points are seen by 2+ images (threshold {:.0}%); \
                 meshing may be poor",
                advisory.ratio * 100.0,
                advisory.threshold * 100.0
            );
            for (i, remedy) in advisory.remediations.iter().enumerate() {
                warn!("  {}. {}", i + 1, remedy);
            }
        }
    }
}

/// Evaluate an already loaded reconstruction. Empty point sets are fatal.
pub fn evaluate_reconstruction(
    recon: &Reconstruction,
    sparse_dir: &Path,
) -> Result<QualityReport, PipelineError> {
    if recon.is_empty() {
        return Err(PipelineError::EmptyReconstruction(sparse_dir.to_path_buf()));
    }
    let report = QualityReport::evaluate(VisibilityStats::from_reconstruction(recon));
    report.log();
    Ok(report)
}

/// Load the sparse model and run the gate on it.
#[tracing::instrument(skip_all, fields(sparse = %sparse_dir.display()))]
pub fn check_quality(sparse_dir: &Path) -> Result<QualityReport, PipelineError> {
    let recon = load_reconstruction(sparse_dir)?;
    evaluate_reconstruction(&recon, sparse_dir)
}
