use std::sync::OnceLock;

use tracing::info;

use crate::align::AlignedPair;
use crate::error::{MirageError, Result};

/// A learned perceptual distance between two aligned frames (LPIPS-style).
///
/// Implementations wrap a pretrained feature network behind this narrow
/// contract; the engine never reimplements the network. `score` must be safe
/// to call concurrently — the loaded weights are read-only after
/// initialization.
pub trait PerceptualScorer: Send + Sync {
    fn name(&self) -> &str;

    /// Perceptual distance for one pair. Lower is better.
    fn score(&self, pair: &AlignedPair) -> Result<f64>;
}

type Loader = Box<dyn Fn() -> Result<Box<dyn PerceptualScorer>> + Send + Sync>;
type LoadOutcome = std::result::Result<Box<dyn PerceptualScorer>, String>;

static LOADER: OnceLock<Loader> = OnceLock::new();
static SCORER: OnceLock<LoadOutcome> = OnceLock::new();

/// Register the process-wide perceptual scorer loader.
///
/// The loader runs at most once, on first use, so the network weights are
/// only pulled in when a perceptual comparison is actually requested.
/// Installing twice is an error: the loaded instance lives for the process
/// lifetime and cannot be swapped out.
pub fn install(
    loader: impl Fn() -> Result<Box<dyn PerceptualScorer>> + Send + Sync + 'static,
) -> Result<()> {
    LOADER
        .set(Box::new(loader))
        .map_err(|_| MirageError::Resource("perceptual scorer already installed".into()))
}

pub fn is_installed() -> bool {
    LOADER.get().is_some()
}

/// Force the lazy load and report whether the perceptual metric is usable.
///
/// A failed load is cached: the metric stays unavailable for the process
/// lifetime, other metrics are unaffected.
pub fn ensure_loaded() -> Result<()> {
    instance().map(|_| ())
}

/// Score one pair with the installed scorer.
pub fn score(pair: &AlignedPair) -> Result<f64> {
    instance()?.score(pair)
}

fn instance() -> Result<&'static dyn PerceptualScorer> {
    let Some(loader) = LOADER.get() else {
        return Err(MirageError::Resource(
            "no perceptual scorer installed".into(),
        ));
    };

    let outcome = SCORER.get_or_init(|| match loader() {
        Ok(scorer) => {
            info!(scorer = scorer.name(), "Perceptual scorer loaded");
            Ok(scorer)
        }
        Err(e) => Err(e.to_string()),
    });

    match outcome {
        Ok(scorer) => Ok(scorer.as_ref()),
        Err(e) => Err(MirageError::Resource(format!(
            "perceptual scorer failed to load: {e}"
        ))),
    }
}
