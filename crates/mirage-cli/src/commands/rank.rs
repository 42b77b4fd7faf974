use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use mirage_core::aggregate::{compare_candidates, BatchComparison, CancelToken};
use mirage_core::frame::Sequence;

use crate::commands::compare::parse_kinds;
use crate::config::ToolConfig;
use crate::gif;
use crate::summary;

#[derive(Args)]
pub struct RankArgs {
    /// Ground-truth GIF
    pub ground_truth: PathBuf,

    /// Candidate GIFs to rank against the ground truth
    #[arg(required = true)]
    pub candidates: Vec<PathBuf>,

    /// Metrics to compute (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "mse,psnr,ssim")]
    pub metrics: Vec<String>,

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
    candidates: &'a [String],
    #[serde(flatten)]
    batch: &'a BatchComparison,
}

pub fn run(args: &RankArgs) -> Result<()> {
    let config = ToolConfig::load_or_default(args.config.as_deref())?;
    let kinds = parse_kinds(&args.metrics)?;

    let truth = gif::load_gif(&args.ground_truth)?;
    let candidates: Vec<Sequence> = args
        .candidates
        .iter()
        .map(|path| gif::load_gif(path))
        .collect::<Result<_>>()?;

    let batch = compare_candidates(
        &truth,
        &candidates,
        &kinds,
        &config.metrics,
        &CancelToken::new(),
    )?;

    let names: Vec<String> = args
        .candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    if args.json {
        let json = JsonReport {
            ground_truth: args.ground_truth.display().to_string(),
            candidates: &names,
            batch: &batch,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    summary::print_rank_summary(&args.ground_truth.display().to_string(), &names, &batch);
    Ok(())
}
