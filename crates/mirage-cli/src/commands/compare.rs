use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use mirage_core::aggregate::{
    compute_metric, CancelToken, ComparisonReport, UnavailableMetric,
};
use mirage_core::align::align;
use mirage_core::error::MirageError;
use mirage_core::metrics::MetricKind;

use crate::config::ToolConfig;
use crate::gif;
use crate::summary;

#[derive(Args)]
pub struct CompareArgs {
    /// Ground-truth GIF
    pub ground_truth: PathBuf,

    /// Predicted GIF
    pub predicted: PathBuf,

    /// Metrics to compute (comma-separated; lpips requires an installed scorer)
    #[arg(long, value_delimiter = ',', default_value = "mse,mae,psnr,ssim,ms-ssim")]
    pub metrics: Vec<String>,

    /// Print a per-frame score table
    #[arg(long)]
    pub per_frame: bool,

    /// Emit a machine-readable JSON report
    #[arg(long)]
    pub json: bool,

    /// TOML config with metric parameters
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    ground_truth: String,
    predicted: String,
    #[serde(flatten)]
    report: &'a ComparisonReport,
}

pub fn run(args: &CompareArgs) -> Result<()> {
    let config = ToolConfig::load_or_default(args.config.as_deref())?;
    let kinds = parse_kinds(&args.metrics)?;

    let truth = gif::load_gif(&args.ground_truth)?;
    let predicted = gif::load_gif(&args.predicted)?;
    let pairs = align(&truth, &predicted)?;

    let pb = ProgressBar::new(kinds.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );

    let cancel = CancelToken::new();
    let mut results = Vec::new();
    let mut unavailable = Vec::new();
    for &kind in &kinds {
        pb.set_message(format!("Computing {kind}"));
        match compute_metric(kind, &pairs, &config.metrics, &cancel) {
            Ok(result) => results.push(result),
            Err(MirageError::Resource(reason)) => {
                unavailable.push(UnavailableMetric { kind, reason });
            }
            Err(e) => return Err(e.into()),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let report = ComparisonReport {
        frame_count: pairs.len(),
        results,
        unavailable,
    };

    if args.json {
        let json = JsonReport {
            ground_truth: args.ground_truth.display().to_string(),
            predicted: args.predicted.display().to_string(),
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    summary::print_compare_summary(
        &args.ground_truth.display().to_string(),
        &args.predicted.display().to_string(),
        &report,
    );
    if args.per_frame {
        summary::print_per_frame_table(&report);
    }
    Ok(())
}

pub fn parse_kinds(names: &[String]) -> Result<Vec<MetricKind>> {
    names
        .iter()
        .map(|name| Ok(name.parse::<MetricKind>()?))
        .collect()
}
