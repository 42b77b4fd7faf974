use console::Style;

use mirage_core::aggregate::{BatchComparison, ComparisonReport, MetricResult};
use mirage_core::metrics::Direction;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    good: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            good: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

/// Render one score for display: finite values with six decimals, perfect
/// matches as "inf", failed frames as "failed".
pub fn format_score(score: f64) -> String {
    if score.is_nan() {
        "failed".to_string()
    } else if score.is_infinite() {
        "inf".to_string()
    } else {
        format!("{score:.6}")
    }
}

fn format_mean(result: &MetricResult) -> String {
    match result.mean {
        Some(mean) => format!("{mean:.6}"),
        None => "undefined".to_string(),
    }
}

pub fn print_compare_summary(truth: &str, predicted: &str, report: &ComparisonReport) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Comparison"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();
    println!("  {:<14}{}", s.label.apply_to("Truth"), s.path.apply_to(truth));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Predicted"),
        s.path.apply_to(predicted)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(report.frame_count)
    );
    println!();

    println!(
        "  {:<10}{:>12}  {:>7}  {:>7}  {:>7}",
        s.header.apply_to("Metric"),
        "Mean",
        "Finite",
        "Perfect",
        "Failed"
    );
    for result in &report.results {
        println!(
            "  {:<10}{:>12}  {:>7}  {:>7}  {:>7}",
            s.value.apply_to(result.kind),
            s.good.apply_to(format_mean(result)),
            result.finite_count,
            result.perfect_match_count,
            result.failures.len()
        );
    }
    for missing in &report.unavailable {
        println!(
            "  {:<10}{}",
            s.value.apply_to(missing.kind),
            s.disabled.apply_to(format!("unavailable ({})", missing.reason))
        );
    }
    println!();
}

pub fn print_per_frame_table(report: &ComparisonReport) {
    let s = Styles::new();

    print!("  {:>6}", s.header.apply_to("Frame"));
    for result in &report.results {
        print!("  {:>12}", s.header.apply_to(result.kind));
    }
    println!();

    for index in 0..report.frame_count {
        print!("  {:>6}", index);
        for result in &report.results {
            print!("  {:>12}", format_score(result.per_frame[index]));
        }
        println!();
    }
    println!();
}

pub fn print_rank_summary(truth: &str, candidates: &[String], batch: &BatchComparison) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Ranking"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();
    println!("  {:<14}{}", s.label.apply_to("Truth"), s.path.apply_to(truth));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Candidates"),
        s.value.apply_to(candidates.len())
    );
    println!();

    for ranking in &batch.rankings {
        let direction = match ranking.kind.direction() {
            Direction::LowerIsBetter => "lower is better",
            Direction::HigherIsBetter => "higher is better",
        };
        println!(
            "  {} {}",
            s.header.apply_to(ranking.kind),
            s.label.apply_to(format!("({direction})"))
        );

        for (place, &candidate) in ranking.ordering.iter().enumerate() {
            let mean = batch
                .candidates
                .iter()
                .find(|c| c.candidate == candidate)
                .and_then(|c| c.report.results.iter().find(|r| r.kind == ranking.kind))
                .and_then(|r| r.mean);
            let shown = match mean {
                Some(m) => format!("{m:.6}"),
                None => "undefined".to_string(),
            };
            println!(
                "    {}. {:<30} {}",
                s.label.apply_to(place + 1),
                s.value.apply_to(&candidates[candidate]),
                s.good.apply_to(shown)
            );
        }
        println!();
    }
}
