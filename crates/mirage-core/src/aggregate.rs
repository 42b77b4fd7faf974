use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::align::{align, AlignedPair};
use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::error::{MirageError, Result};
use crate::frame::Sequence;
use crate::metrics::{msssim, perceptual, score_pair, Direction, MetricKind, MetricParams};

/// Cooperative cancellation handle, checked once per frame index.
///
/// Cloning shares the flag, so an interactive caller can keep one end and
/// hand the other to a long batch comparison.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A per-frame metric failure, recorded instead of aborting the run.
#[derive(Clone, Debug, Serialize)]
pub struct FrameFailure {
    pub index: usize,
    pub reason: String,
}

/// Scores of one metric across an aligned sequence.
///
/// `per_frame` holds one score per pair, NaN where the frame failed. The
/// aggregate `mean` averages finite scores only; +infinity entries (PSNR on
/// identical frames) are counted in `perfect_match_count` instead of
/// poisoning the average. `mean` is `None` when no frame yielded a finite
/// score.
#[derive(Clone, Debug, Serialize)]
pub struct MetricResult {
    pub kind: MetricKind,
    pub per_frame: Vec<f64>,
    pub mean: Option<f64>,
    pub finite_count: usize,
    pub perfect_match_count: usize,
    pub failures: Vec<FrameFailure>,
}

/// Results for one comparison run: one entry per requested metric kind, plus
/// the kinds that were unavailable as a whole (perceptual scorer missing).
#[derive(Debug, Serialize)]
pub struct ComparisonReport {
    pub frame_count: usize,
    pub results: Vec<MetricResult>,
    pub unavailable: Vec<UnavailableMetric>,
}

#[derive(Clone, Debug, Serialize)]
pub struct UnavailableMetric {
    pub kind: MetricKind,
    pub reason: String,
}

/// One candidate's report within a batch comparison.
#[derive(Debug, Serialize)]
pub struct CandidateReport {
    pub candidate: usize,
    pub report: ComparisonReport,
}

/// Candidate ordering for one metric, best first. Candidates without a
/// defined aggregate rank last.
#[derive(Clone, Debug, Serialize)]
pub struct MetricRanking {
    pub kind: MetricKind,
    pub ordering: Vec<usize>,
}

/// Batch comparison of several predicted sequences against one ground truth.
#[derive(Debug, Serialize)]
pub struct BatchComparison {
    pub candidates: Vec<CandidateReport>,
    pub rankings: Vec<MetricRanking>,
}

/// Compute one metric across all aligned pairs.
///
/// Per-frame failures become NaN sentinels plus a recorded reason; the run
/// only errors on cancellation or when the metric kind is unavailable as a
/// whole (no perceptual scorer).
pub fn compute_metric(
    kind: MetricKind,
    pairs: &[AlignedPair],
    params: &MetricParams,
    cancel: &CancelToken,
) -> Result<MetricResult> {
    if kind == MetricKind::Lpips {
        perceptual::ensure_loaded()?;
    }

    let scores: Vec<std::result::Result<f64, String>> =
        if pairs.len() >= PARALLEL_FRAME_THRESHOLD {
            pairs
                .par_iter()
                .map(|pair| {
                    if cancel.is_cancelled() {
                        Err(String::new())
                    } else {
                        score_frame(kind, pair, params)
                    }
                })
                .collect()
        } else {
            let mut scores = Vec::with_capacity(pairs.len());
            for pair in pairs {
                if cancel.is_cancelled() {
                    return Err(MirageError::Cancelled);
                }
                scores.push(score_frame(kind, pair, params));
            }
            scores
        };

    if cancel.is_cancelled() {
        return Err(MirageError::Cancelled);
    }

    let mut per_frame = Vec::with_capacity(scores.len());
    let mut failures = Vec::new();
    let mut finite_sum = 0.0f64;
    let mut finite_count = 0usize;
    let mut perfect_match_count = 0usize;

    for (index, outcome) in scores.into_iter().enumerate() {
        match outcome {
            Ok(score) => {
                per_frame.push(score);
                if score.is_finite() {
                    finite_sum += score;
                    finite_count += 1;
                } else if score == f64::INFINITY {
                    perfect_match_count += 1;
                }
            }
            Err(reason) => {
                per_frame.push(f64::NAN);
                failures.push(FrameFailure { index, reason });
            }
        }
    }

    let mean = (finite_count > 0).then(|| finite_sum / finite_count as f64);
    debug!(
        kind = %kind,
        frames = per_frame.len(),
        finite = finite_count,
        perfect = perfect_match_count,
        failed = failures.len(),
        "Metric computed"
    );

    Ok(MetricResult {
        kind,
        per_frame,
        mean,
        finite_count,
        perfect_match_count,
        failures,
    })
}

/// Compute several metrics over the same aligned pairs.
///
/// An unavailable kind (perceptual scorer missing or failed to load) is
/// reported as such; the remaining kinds still run.
pub fn compute_metrics(
    kinds: &[MetricKind],
    pairs: &[AlignedPair],
    params: &MetricParams,
    cancel: &CancelToken,
) -> Result<ComparisonReport> {
    let mut results = Vec::new();
    let mut unavailable = Vec::new();

    for &kind in kinds {
        match compute_metric(kind, pairs, params, cancel) {
            Ok(result) => results.push(result),
            Err(MirageError::Resource(reason)) => {
                unavailable.push(UnavailableMetric { kind, reason });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(ComparisonReport {
        frame_count: pairs.len(),
        results,
        unavailable,
    })
}

/// Compare several candidate sequences against one ground truth and rank
/// them per metric by that metric's better direction.
pub fn compare_candidates(
    ground_truth: &Sequence,
    candidates: &[Sequence],
    kinds: &[MetricKind],
    params: &MetricParams,
    cancel: &CancelToken,
) -> Result<BatchComparison> {
    if candidates.is_empty() {
        return Err(MirageError::EmptySequence);
    }

    info!(
        candidates = candidates.len(),
        kinds = kinds.len(),
        "Batch comparison started"
    );

    let mut reports = Vec::with_capacity(candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        let pairs = align(ground_truth, candidate)?;
        let report = compute_metrics(kinds, &pairs, params, cancel)?;
        reports.push(CandidateReport {
            candidate: i,
            report,
        });
    }

    let rankings = kinds
        .iter()
        .map(|&kind| rank_candidates(kind, &reports))
        .collect();

    Ok(BatchComparison {
        candidates: reports,
        rankings,
    })
}

fn rank_candidates(kind: MetricKind, reports: &[CandidateReport]) -> MetricRanking {
    let mut keyed: Vec<(usize, Option<f64>)> = reports
        .iter()
        .map(|cr| {
            let mean = cr
                .report
                .results
                .iter()
                .find(|r| r.kind == kind)
                .and_then(|r| r.mean);
            (cr.candidate, mean)
        })
        .collect();

    keyed.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(x), Some(y)) => match kind.direction() {
            Direction::LowerIsBetter => x.total_cmp(y),
            Direction::HigherIsBetter => y.total_cmp(x),
        },
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    MetricRanking {
        kind,
        ordering: keyed.into_iter().map(|(i, _)| i).collect(),
    }
}

/// Score one frame, falling back to the largest feasible MS-SSIM scale count
/// when the frame is too small for the requested one.
fn score_frame(
    kind: MetricKind,
    pair: &AlignedPair,
    params: &MetricParams,
) -> std::result::Result<f64, String> {
    match kind {
        MetricKind::MsSsim => match msssim::ms_ssim(pair, params) {
            Err(MirageError::FrameTooSmall { max_scales, .. }) if max_scales >= 1 => {
                debug!(
                    index = pair.index(),
                    scales = max_scales,
                    "Frame too small for requested MS-SSIM scales, reducing"
                );
                let reduced = MetricParams {
                    msssim_scales: max_scales,
                    ..params.clone()
                };
                msssim::ms_ssim(pair, &reduced).map_err(|e| e.to_string())
            }
            other => other.map_err(|e| e.to_string()),
        },
        _ => score_pair(kind, pair, params).map_err(|e| e.to_string()),
    }
}
