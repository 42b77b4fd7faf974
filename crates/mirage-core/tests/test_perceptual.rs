mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_abs_diff_eq;

use common::{pair_of, solid_frame};
use mirage_core::aggregate::{compute_metric, CancelToken};
use mirage_core::align::AlignedPair;
use mirage_core::error::{MirageError, Result};
use mirage_core::metrics::{perceptual, MetricKind, MetricParams};

struct CountingScorer {
    calls: Arc<AtomicUsize>,
}

impl perceptual::PerceptualScorer for CountingScorer {
    fn name(&self) -> &str {
        "counting-test-scorer"
    }

    fn score(&self, _pair: &AlignedPair) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(0.125)
    }
}

// The scorer registry is process-wide, so install, double-install and
// scoring are exercised in one test to keep ordering deterministic.
#[test]
fn test_installed_scorer_backs_the_lpips_metric() {
    let calls = Arc::new(AtomicUsize::new(0));

    assert!(!perceptual::is_installed());

    let loader_calls = calls.clone();
    perceptual::install(move || {
        Ok(Box::new(CountingScorer {
            calls: loader_calls.clone(),
        }) as Box<dyn perceptual::PerceptualScorer>)
    })
    .unwrap();

    assert!(perceptual::is_installed());
    assert!(matches!(
        perceptual::install(|| Err(MirageError::Resource("unused".into()))),
        Err(MirageError::Resource(_))
    ));

    let frame = solid_frame(8, 8, 3, 0.5);
    let pairs = vec![pair_of(&frame, &frame); 3];
    let result = compute_metric(
        MetricKind::Lpips,
        &pairs,
        &MetricParams::default(),
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(result.per_frame.len(), 3);
    assert_abs_diff_eq!(result.mean.unwrap(), 0.125, epsilon = 1e-12);
    assert_eq!(calls.load(Ordering::Relaxed), 3);
    assert!(result.failures.is_empty());
}
